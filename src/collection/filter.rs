// Category tabs over the record collection
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::WalletError;
use crate::models::{WarrantyRecord, WarrantyStatus};

/// Dashboard tab selection.
///
/// A closed enum so an unrecognized tab cannot reach the filter at all;
/// the string boundary rejects unknown names instead of silently
/// falling back to `All`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FilterTab {
    All,
    Active,
    ExpiringSoon,
    Expired,
}

impl FilterTab {
    fn matches(&self, status: WarrantyStatus) -> bool {
        match self {
            FilterTab::All => true,
            FilterTab::Active => status == WarrantyStatus::Active,
            FilterTab::ExpiringSoon => status == WarrantyStatus::ExpiringSoon,
            FilterTab::Expired => status == WarrantyStatus::Expired,
        }
    }
}

impl FromStr for FilterTab {
    type Err = WalletError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ALL" => Ok(FilterTab::All),
            "ACTIVE" => Ok(FilterTab::Active),
            "EXPIRING_SOON" => Ok(FilterTab::ExpiringSoon),
            "EXPIRED" => Ok(FilterTab::Expired),
            other => Err(WalletError::Validation(format!(
                "Unknown filter tab: {:?}",
                other
            ))),
        }
    }
}

/// Select the records whose status at `now` matches the tab.
///
/// Status is re-derived per record at call time, so the result is
/// always consistent with the current classification. Input order is
/// preserved.
pub fn filter_records(
    records: &[WarrantyRecord],
    tab: FilterTab,
    now: DateTime<Utc>,
) -> Vec<WarrantyRecord> {
    records
        .iter()
        .filter(|record| tab.matches(record.status_at(now)))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn record(id: &str, expiry: Option<DateTime<Utc>>) -> WarrantyRecord {
        WarrantyRecord {
            id: id.to_string(),
            product_name: None,
            merchant_name: None,
            serial_number: None,
            model_number: None,
            invoice_number: None,
            payment_method: None,
            invoice_date: None,
            expiry_date: expiry,
            asset_price: None,
        }
    }

    fn fixture() -> (Vec<WarrantyRecord>, DateTime<Utc>) {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let records = vec![
            record("active", Some(now + Duration::days(120))),
            record("expired", Some(now - Duration::days(3))),
            record("soon", Some(now + Duration::days(2))),
            record("unknown", None),
            record("active-2", Some(now + Duration::days(60))),
        ];
        (records, now)
    }

    #[test]
    fn all_tab_returns_everything_in_order() {
        let (records, now) = fixture();
        let filtered = filter_records(&records, FilterTab::All, now);
        let ids: Vec<&str> = filtered.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["active", "expired", "soon", "unknown", "active-2"]);
    }

    #[test]
    fn all_tab_on_empty_input_is_empty() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        assert!(filter_records(&[], FilterTab::All, now).is_empty());
    }

    #[test]
    fn each_tab_matches_only_its_derived_status() {
        let (records, now) = fixture();

        let active = filter_records(&records, FilterTab::Active, now);
        assert_eq!(
            active.iter().map(|r| r.id.as_str()).collect::<Vec<_>>(),
            vec!["active", "active-2"]
        );

        let soon = filter_records(&records, FilterTab::ExpiringSoon, now);
        assert_eq!(soon.len(), 1);
        assert_eq!(soon[0].id, "soon");

        let expired = filter_records(&records, FilterTab::Expired, now);
        assert_eq!(expired.len(), 1);
        assert_eq!(expired[0].id, "expired");

        for record in &records {
            for (tab, status) in [
                (FilterTab::Active, WarrantyStatus::Active),
                (FilterTab::ExpiringSoon, WarrantyStatus::ExpiringSoon),
                (FilterTab::Expired, WarrantyStatus::Expired),
            ] {
                let included = filter_records(std::slice::from_ref(record), tab, now).len() == 1;
                assert_eq!(included, record.status_at(now) == status);
            }
        }
    }

    #[test]
    fn filtering_tracks_the_clock() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let records = vec![record("w", Some(now + Duration::days(30)))];

        assert_eq!(filter_records(&records, FilterTab::Active, now).len(), 1);
        // The same snapshot reclassifies once enough time has passed.
        let later = now + Duration::days(40);
        assert!(filter_records(&records, FilterTab::Active, later).is_empty());
        assert_eq!(filter_records(&records, FilterTab::Expired, later).len(), 1);
    }

    #[test]
    fn tab_names_parse_and_unknown_names_fail() {
        assert_eq!("ALL".parse::<FilterTab>().unwrap(), FilterTab::All);
        assert_eq!(
            "EXPIRING_SOON".parse::<FilterTab>().unwrap(),
            FilterTab::ExpiringSoon
        );
        assert!(matches!(
            "RECENT".parse::<FilterTab>(),
            Err(WalletError::Validation(_))
        ));
    }
}
