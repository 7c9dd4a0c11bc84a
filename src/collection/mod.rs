// Record collection store
// Holds the last-fetched snapshot and keeps it consistent with the
// backing service by replacing it wholesale on every mutation.

pub mod filter;

use chrono::{DateTime, Utc};
use log::{debug, warn};
use parking_lot::RwLock;
use std::sync::Arc;

use crate::api::WarrantyService;
use crate::error::WalletError;
use crate::models::{CollectionStats, WarrantyRecord, WarrantyStatus};
use filter::{filter_records, FilterTab};

/// Process-wide cache of fetched warranty records.
///
/// The snapshot is immutable between refreshes and replaced as a whole,
/// never merged incrementally, so readers can never observe a mix of
/// pre- and post-mutation data.
pub struct CollectionStore<S: WarrantyService> {
    service: Arc<S>,
    records: RwLock<Vec<WarrantyRecord>>,
}

impl<S: WarrantyService> CollectionStore<S> {
    pub fn new(service: Arc<S>) -> Self {
        Self {
            service,
            records: RwLock::new(Vec::new()),
        }
    }

    /// Replace the snapshot with the server's current record set.
    ///
    /// On failure the previous snapshot stays in place
    /// (stale-but-available beats empty-on-error) and the error is both
    /// logged and returned for the caller to surface if it wants to.
    pub async fn refresh(&self) -> Result<(), WalletError> {
        match self.service.fetch_all().await {
            Ok(records) => {
                debug!("Refreshed collection: {} records", records.len());
                *self.records.write() = records;
                Ok(())
            }
            Err(e) => {
                warn!("Failed to refresh warranties, keeping previous snapshot: {}", e);
                Err(e)
            }
        }
    }

    /// Delete a record, then refresh unconditionally.
    ///
    /// No local splice: one extra round trip buys a snapshot that is
    /// guaranteed to match the backing store.
    pub async fn remove(&self, id: &str) -> Result<(), WalletError> {
        self.service.delete(id).await?;
        self.refresh().await
    }

    /// Current snapshot, in server display order.
    pub fn snapshot(&self) -> Vec<WarrantyRecord> {
        self.records.read().clone()
    }

    /// Snapshot subset for the selected tab, classified at `now`.
    pub fn filtered(&self, tab: FilterTab, now: DateTime<Utc>) -> Vec<WarrantyRecord> {
        filter_records(&self.records.read(), tab, now)
    }

    /// Dashboard aggregates over the snapshot, derived at `now`.
    pub fn stats(&self, now: DateTime<Utc>) -> CollectionStats {
        let records = self.records.read();
        let mut stats = CollectionStats {
            total_asset_value: 0.0,
            total_count: records.len(),
            active_count: 0,
            expiring_soon_count: 0,
            expired_count: 0,
        };

        for record in records.iter() {
            stats.total_asset_value += record.asset_price.unwrap_or(0.0);
            match record.status_at(now) {
                WarrantyStatus::Active => stats.active_count += 1,
                WarrantyStatus::ExpiringSoon => stats.expiring_soon_count += 1,
                WarrantyStatus::Expired => stats.expired_count += 1,
                WarrantyStatus::Unknown => {}
            }
        }

        stats
    }
}
