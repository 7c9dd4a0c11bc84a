// Status derivation from the coverage window
use chrono::{DateTime, Duration, Utc};

use crate::models::WarrantyStatus;

/// Records within this many days of expiry classify as EXPIRING_SOON.
pub const EXPIRY_WARNING_WINDOW_DAYS: i64 = 7;

/// Classify a record's coverage at `now`.
///
/// Pure and deterministic: the result depends only on the expiry date
/// and the comparison instant, so it must be re-derived on every tick
/// rather than cached. Status can flip from Active to ExpiringSoon to
/// Expired with no data mutation at all.
pub fn classify(expiry_date: Option<DateTime<Utc>>, now: DateTime<Utc>) -> WarrantyStatus {
    let expiry = match expiry_date {
        Some(expiry) => expiry,
        None => return WarrantyStatus::Unknown,
    };

    if expiry < now {
        return WarrantyStatus::Expired;
    }

    if expiry - now <= Duration::days(EXPIRY_WARNING_WINDOW_DAYS) {
        return WarrantyStatus::ExpiringSoon;
    }

    WarrantyStatus::Active
}
