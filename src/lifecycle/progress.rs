// Coverage-elapsed ratio
use chrono::{DateTime, Utc};

/// Normalized coverage progress in [0, 100].
///
/// Returns 0 when either date is absent or the window has zero or
/// negative length. Linear in elapsed time and clamped at both ends,
/// so it is non-decreasing in `now` for a fixed record.
pub fn progress(
    invoice_date: Option<DateTime<Utc>>,
    expiry_date: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> f64 {
    let (invoice, expiry) = match (invoice_date, expiry_date) {
        (Some(invoice), Some(expiry)) => (invoice, expiry),
        _ => return 0.0,
    };

    let total = (expiry - invoice).num_milliseconds();
    if total <= 0 {
        return 0.0;
    }

    let elapsed = (now - invoice).num_milliseconds();
    (elapsed as f64 / total as f64 * 100.0).clamp(0.0, 100.0)
}
