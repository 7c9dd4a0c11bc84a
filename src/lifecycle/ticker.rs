// Shared countdown scheduler
// One tick task serves every visible record instead of one timer each

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::countdown::countdown;
use crate::models::WarrantyRecord;

pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Distributes a once-per-second wall-clock tick to countdown displays.
///
/// A single spawned task keeps resource usage bounded regardless of how
/// many records are on screen. Each displayed record holds a
/// [`CountdownSubscription`]; dropping it releases the record from the
/// tick, and no ordering between subscribers is guaranteed.
pub struct CountdownTicker {
    tick: watch::Sender<DateTime<Utc>>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl CountdownTicker {
    pub fn new() -> Self {
        let (tick, _) = watch::channel(Utc::now());
        Self {
            tick,
            handle: Mutex::new(None),
        }
    }

    /// Start the tick task. Must be called from within a tokio runtime;
    /// calling it while already running is a no-op.
    pub fn start(&self) {
        let mut guard = self.handle.lock();
        if guard.is_some() {
            return;
        }

        let tick = self.tick.clone();
        *guard = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(TICK_PERIOD);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                tick.send_replace(Utc::now());
            }
        }));
    }

    /// Subscribe a record's countdown display to the shared tick.
    pub fn subscribe(&self, record: &WarrantyRecord) -> CountdownSubscription {
        CountdownSubscription {
            expiry_date: record.expiry_date,
            rx: self.tick.subscribe(),
        }
    }

    /// Stop the tick task. Existing subscriptions stop receiving updates
    /// but remain readable via [`CountdownSubscription::current`].
    pub fn stop(&self) {
        if let Some(handle) = self.handle.lock().take() {
            handle.abort();
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.lock().is_some()
    }
}

impl Default for CountdownTicker {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for CountdownTicker {
    fn drop(&mut self) {
        self.stop();
    }
}

/// One record's view of the shared tick.
pub struct CountdownSubscription {
    expiry_date: Option<DateTime<Utc>>,
    rx: watch::Receiver<DateTime<Utc>>,
}

impl CountdownSubscription {
    /// Wait for the next tick and return the refreshed countdown string.
    /// Returns `None` once the ticker has been dropped.
    pub async fn next(&mut self) -> Option<String> {
        self.rx.changed().await.ok()?;
        let now = *self.rx.borrow_and_update();
        Some(countdown(self.expiry_date, now))
    }

    /// Countdown string as of the most recent tick, without waiting.
    pub fn current(&self) -> String {
        countdown(self.expiry_date, *self.rx.borrow())
    }
}
