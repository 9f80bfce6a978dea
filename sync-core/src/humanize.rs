//! Human-readable renderings of raw daemon values.

use chrono::{DateTime, Utc};

/// Relative last-seen time, e.g. `"5 minutes ago"`.
///
/// The daemon reports never-seen devices with the Unix epoch (or Go's zero
/// time); anything at or before the epoch renders as `"never"`. All
/// arithmetic is in UTC so the result does not depend on the local timezone.
pub fn last_seen(seen: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    let seen = match seen {
        Some(ts) if ts.timestamp() > 0 => ts,
        _ => return "never".to_string(),
    };

    let secs = (now - seen).num_seconds();
    if secs < 60 {
        "just now".to_string()
    } else if secs < 3600 {
        plural(secs / 60, "minute")
    } else if secs < 86400 {
        plural(secs / 3600, "hour")
    } else {
        plural(secs / 86400, "day")
    }
}

fn plural(n: i64, unit: &str) -> String {
    if n == 1 {
        format!("1 {} ago", unit)
    } else {
        format!("{} {}s ago", n, unit)
    }
}

/// Byte count in binary units, e.g. `"1.5 MiB"`.
pub fn bytes(n: u64) -> String {
    const UNITS: [&str; 6] = ["B", "KiB", "MiB", "GiB", "TiB", "PiB"];
    if n < 1024 {
        return format!("{} B", n);
    }
    let mut value = n as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", value, UNITS[unit])
}

/// Uptime, e.g. `"2d 3h 4m"`.
pub fn uptime(secs: u64) -> String {
    let days = secs / 86400;
    let hours = (secs % 86400) / 3600;
    let minutes = (secs % 3600) / 60;
    if days > 0 {
        format!("{}d {}h {}m", days, hours, minutes)
    } else if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else if minutes > 0 {
        format!("{}m", minutes)
    } else {
        format!("{}s", secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, FixedOffset, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn epoch_sentinel_is_never() {
        let epoch = DateTime::parse_from_rfc3339("1970-01-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(last_seen(Some(epoch), now()), "never");
        assert_eq!(last_seen(None, now()), "never");
    }

    #[test]
    fn epoch_sentinel_is_never_in_any_offset() {
        // Same instant expressed with a non-UTC offset.
        let tokyo = FixedOffset::east_opt(9 * 3600).unwrap();
        let epoch = tokyo
            .with_ymd_and_hms(1970, 1, 1, 9, 0, 0)
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(last_seen(Some(epoch), now()), "never");
    }

    #[test]
    fn go_zero_time_is_never() {
        let zero = DateTime::parse_from_rfc3339("0001-01-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(last_seen(Some(zero), now()), "never");
    }

    #[test]
    fn relative_ranges() {
        assert_eq!(last_seen(Some(now() - Duration::seconds(5)), now()), "just now");
        assert_eq!(last_seen(Some(now() - Duration::minutes(1)), now()), "1 minute ago");
        assert_eq!(last_seen(Some(now() - Duration::minutes(7)), now()), "7 minutes ago");
        assert_eq!(last_seen(Some(now() - Duration::hours(3)), now()), "3 hours ago");
        assert_eq!(last_seen(Some(now() - Duration::days(2)), now()), "2 days ago");
    }

    #[test]
    fn byte_units() {
        assert_eq!(bytes(0), "0 B");
        assert_eq!(bytes(1023), "1023 B");
        assert_eq!(bytes(1536), "1.5 KiB");
        assert_eq!(bytes(5 * 1024 * 1024), "5.0 MiB");
    }

    #[test]
    fn uptime_formats() {
        assert_eq!(uptime(42), "42s");
        assert_eq!(uptime(125), "2m");
        assert_eq!(uptime(3 * 3600 + 60), "3h 1m");
        assert_eq!(uptime(2 * 86400 + 3 * 3600 + 4 * 60), "2d 3h 4m");
    }
}
