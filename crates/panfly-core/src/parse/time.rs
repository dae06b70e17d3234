// Timestamp parsing against an ordered layout list.
//
// No match yields `None`, never an error.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

const DATETIME_LAYOUTS: &[&str] = &[
    "%Y/%m/%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%b %d %H:%M:%S %Y GMT",
    "%b %d %H:%M:%S %Y",
    "%a %b %d %H:%M:%S %Y",
];

const DATE_LAYOUTS: &[&str] = &["%B %d, %Y", "%b %d, %Y", "%Y/%m/%d", "%Y-%m-%d"];

/// Parse an appliance timestamp. Appliance clocks are reported without a
/// zone and are taken as UTC.
pub(crate) fn parse_time(raw: &str) -> Option<DateTime<Utc>> {
    let normalized = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    let value = normalized.as_str();
    if value.is_empty() || value == "0" || value.eq_ignore_ascii_case("never") {
        return None;
    }

    if value.bytes().all(|b| b.is_ascii_digit()) {
        return value
            .parse::<i64>()
            .ok()
            .filter(|secs| *secs > 0)
            .and_then(|secs| DateTime::from_timestamp(secs, 0));
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }

    DATETIME_LAYOUTS
        .iter()
        .find_map(|layout| NaiveDateTime::parse_from_str(value, layout).ok())
        .or_else(|| {
            DATE_LAYOUTS
                .iter()
                .find_map(|layout| NaiveDate::parse_from_str(value, layout).ok())
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
        .map(|naive| naive.and_utc())
}

/// `"10 days, 2:03:04"`, `"1 day, 0:00:05"` or `"2:03:04"` to seconds.
/// Values that overflow `u64` count as unparseable (0).
pub(crate) fn parse_uptime(raw: &str) -> u64 {
    let raw = raw.trim();
    let (days, clock) = match raw.split_once(',') {
        Some((days, clock)) => (days, clock.trim()),
        None if raw.contains(':') => ("", raw),
        None => (raw, ""),
    };

    let days: u64 = days
        .split_whitespace()
        .next()
        .and_then(|d| d.parse().ok())
        .unwrap_or(0);

    let clock_secs = clock
        .split(':')
        .map(|part| part.trim().parse::<u64>().ok())
        .collect::<Option<Vec<u64>>>()
        .map_or(Some(0), |parts| {
            parts
                .iter()
                .try_fold(0_u64, |acc, v| acc.checked_mul(60)?.checked_add(*v))
        });

    days.checked_mul(86_400)
        .zip(clock_secs)
        .and_then(|(days, clock)| days.checked_add(clock))
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn layouts() {
        let slash = parse_time("2024/03/12 10:00:05").expect("slash layout");
        assert_eq!((slash.year(), slash.month(), slash.second()), (2024, 3, 5));

        let gmt = parse_time("Jan  5 23:59:59 2027 GMT").expect("gmt layout");
        assert_eq!((gmt.year(), gmt.day()), (2027, 5));

        let ctime = parse_time("Tue Mar 12 10:00:00 2024").expect("ctime layout");
        assert_eq!(ctime.hour(), 10);

        let license = parse_time("November 30, 2025").expect("long date layout");
        assert_eq!(license.month(), 11);

        let epoch = parse_time("1700000000").expect("epoch");
        assert_eq!(epoch.timestamp(), 1_700_000_000);

        assert!(parse_time("2024-03-12T10:00:00Z").is_some());
    }

    #[test]
    fn unparseable_is_none() {
        assert_eq!(parse_time(""), None);
        assert_eq!(parse_time("0"), None);
        assert_eq!(parse_time("Never"), None);
        assert_eq!(parse_time("yesterday-ish"), None);
    }

    #[test]
    fn uptime() {
        assert_eq!(parse_uptime("10 days, 2:03:04"), 10 * 86_400 + 7_384);
        assert_eq!(parse_uptime("1 day, 0:00:05"), 86_405);
        assert_eq!(parse_uptime("2:03:04"), 7_384);
        assert_eq!(parse_uptime("3 days"), 3 * 86_400);
        assert_eq!(parse_uptime("garbage"), 0);
    }

    #[test]
    fn uptime_overflow_is_zero() {
        assert_eq!(parse_uptime("999999999999999999 days, 0:00:00"), 0);
        assert_eq!(parse_uptime("1 day, 18446744073709551615:00:00"), 0);
        assert_eq!(parse_uptime("213503982334601 days, 23:59:59"), 0);
    }
}
