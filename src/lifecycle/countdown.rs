// Remaining-time formatting for countdown displays
use chrono::{DateTime, Duration, Utc};

/// Above this many remaining days the countdown collapses to a
/// days-only display, avoiding second-level churn for far-future dates.
pub const COARSE_DISPLAY_MIN_DAYS: i64 = 7;

/// Format the time remaining until `expiry_date` as seen from `now`.
pub fn countdown(expiry_date: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    let expiry = match expiry_date {
        Some(expiry) => expiry,
        None => return "Unknown".to_string(),
    };

    let remaining = expiry - now;
    if remaining < Duration::zero() {
        return "Expired".to_string();
    }

    let days = remaining.num_days();
    if days > COARSE_DISPLAY_MIN_DAYS {
        return format!("{} days", days);
    }

    let hours = remaining.num_hours() - days * 24;
    let minutes = remaining.num_minutes() - remaining.num_hours() * 60;
    let seconds = remaining.num_seconds() - remaining.num_minutes() * 60;
    format!("{}d {}h {}m {}s", days, hours, minutes, seconds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn base() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn missing_expiry_reads_unknown() {
        assert_eq!(countdown(None, base()), "Unknown");
    }

    #[test]
    fn past_expiry_reads_expired() {
        let now = base();
        assert_eq!(countdown(Some(now - Duration::seconds(1)), now), "Expired");
    }

    #[test]
    fn far_future_collapses_to_days() {
        let now = base();
        assert_eq!(countdown(Some(now + Duration::days(45)), now), "45 days");
    }

    #[test]
    fn near_expiry_shows_full_breakdown() {
        let now = base();
        let expiry = now
            + Duration::days(2)
            + Duration::hours(3)
            + Duration::minutes(4)
            + Duration::seconds(5);
        assert_eq!(countdown(Some(expiry), now), "2d 3h 4m 5s");
    }

    #[test]
    fn boundary_day_count_uses_breakdown() {
        let now = base();
        let expiry = now + Duration::days(COARSE_DISPLAY_MIN_DAYS);
        assert_eq!(countdown(Some(expiry), now), "7d 0h 0m 0s");
    }

    #[test]
    fn expiring_this_instant_is_not_expired() {
        let now = base();
        assert_eq!(countdown(Some(now), now), "0d 0h 0m 0s");
    }
}
