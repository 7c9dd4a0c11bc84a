// Warranty record data models
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::lifecycle::{classifier, countdown, progress};

/// Derived lifecycle classification of a record at a given instant.
///
/// Never stored as the source of truth: always recomputed from the
/// record's dates so a record fetched yesterday reclassifies correctly
/// today without a write.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WarrantyStatus {
    Active,
    ExpiringSoon,
    Expired,
    Unknown,
}

/// A purchased product and its coverage window, as returned by the
/// persistence service.
///
/// Any `status` field the server includes is dropped at deserialization;
/// status is a pure function of the dates and the current instant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WarrantyRecord {
    pub id: String,
    pub product_name: Option<String>,
    pub merchant_name: Option<String>,
    pub serial_number: Option<String>,
    pub model_number: Option<String>,
    pub invoice_number: Option<String>,
    pub payment_method: Option<String>,
    pub invoice_date: Option<DateTime<Utc>>,
    pub expiry_date: Option<DateTime<Utc>>,
    pub asset_price: Option<f64>,
}

impl WarrantyRecord {
    /// Classify this record at `now`.
    pub fn status_at(&self, now: DateTime<Utc>) -> WarrantyStatus {
        classifier::classify(self.expiry_date, now)
    }

    /// Coverage-elapsed ratio in [0, 100] at `now`.
    pub fn progress_at(&self, now: DateTime<Utc>) -> f64 {
        progress::progress(self.invoice_date, self.expiry_date, now)
    }

    /// Human-readable remaining-time string at `now`.
    pub fn countdown_at(&self, now: DateTime<Utc>) -> String {
        countdown::countdown(self.expiry_date, now)
    }
}

/// Aggregates over a collection snapshot, derived at read time.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CollectionStats {
    /// Sum of asset prices; records without a price count as zero.
    pub total_asset_value: f64,
    pub total_count: usize,
    pub active_count: usize,
    pub expiring_soon_count: usize,
    pub expired_count: usize,
}
