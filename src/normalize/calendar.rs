// Activity calendars and streaks

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

use crate::models::common::{count_from_str, count_from_value};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Streaks {
    pub current: u64,
    pub longest: u64,
}

/// Parses a LeetCode-style submission calendar (`{"<unix seconds>": count}`).
///
/// The calendar may arrive as an object or as a JSON-encoded string of one.
/// Timestamps falling on the same UTC day are summed. Returns `None` when the
/// value is not a calendar at all.
pub fn calendar_from_unix(value: &Value) -> Option<BTreeMap<String, u64>> {
    let decoded;
    let object = match value {
        Value::Object(object) => object,
        Value::String(text) => {
            decoded = serde_json::from_str::<Value>(text).ok()?;
            decoded.as_object()?
        }
        _ => return None,
    };

    let mut calendar = BTreeMap::new();
    for (timestamp, count) in object {
        let Some(seconds) = count_from_str(timestamp) else {
            continue;
        };
        let Some(count) = count_from_value(count) else {
            continue;
        };
        let Some(moment) = i64::try_from(seconds).ok().and_then(|s| DateTime::<Utc>::from_timestamp(s, 0)) else {
            continue;
        };
        let day = moment.date_naive().format(DATE_FORMAT).to_string();
        let total = calendar.entry(day).or_insert(0u64);
        *total = total.saturating_add(count);
    }
    Some(calendar)
}

/// Current and longest runs of consecutive active days.
///
/// The current streak is still alive when the last active day is yesterday.
pub fn compute_streaks(calendar: &BTreeMap<String, u64>, today: NaiveDate) -> Streaks {
    let active: BTreeSet<NaiveDate> = calendar
        .iter()
        .filter(|(_, count)| **count > 0)
        .filter_map(|(day, _)| NaiveDate::parse_from_str(day, DATE_FORMAT).ok())
        .filter(|day| *day <= today)
        .collect();

    if active.is_empty() {
        return Streaks::default();
    }

    let mut longest = 0;
    let mut run = 0;
    let mut previous: Option<NaiveDate> = None;
    for day in &active {
        run = match previous {
            Some(prev) if *day == prev + Duration::days(1) => run + 1,
            _ => 1,
        };
        longest = longest.max(run);
        previous = Some(*day);
    }

    let yesterday = today - Duration::days(1);
    let mut check = if active.contains(&today) {
        Some(today)
    } else if active.contains(&yesterday) {
        Some(yesterday)
    } else {
        None
    };

    let mut current = 0;
    while let Some(day) = check.filter(|day| active.contains(day)) {
        current += 1;
        check = day.pred_opt();
    }

    Streaks {
        current,
        longest: longest.max(current),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, DATE_FORMAT).unwrap()
    }

    fn calendar(days: &[(&str, u64)]) -> BTreeMap<String, u64> {
        days.iter().map(|(d, c)| (d.to_string(), *c)).collect()
    }

    #[test]
    fn unix_calendar_groups_by_utc_day() {
        // 2024-01-01T00:00:00Z and 2024-01-01T12:00:00Z, then 2024-01-02
        let value = json!({"1704067200": 2, "1704110400": "3", "1704153600": 1, "junk": 4});
        let parsed = calendar_from_unix(&value).unwrap();
        assert_eq!(parsed.get("2024-01-01"), Some(&5));
        assert_eq!(parsed.get("2024-01-02"), Some(&1));
        assert_eq!(parsed.len(), 2);
    }

    #[test]
    fn unix_calendar_accepts_encoded_string() {
        let value = json!("{\"1704067200\": 4}");
        let parsed = calendar_from_unix(&value).unwrap();
        assert_eq!(parsed.get("2024-01-01"), Some(&4));
        assert!(calendar_from_unix(&json!(12)).is_none());
        assert!(calendar_from_unix(&json!("not json")).is_none());
    }

    #[test]
    fn same_day_counts_saturate() {
        let value = json!({"1704067200": u64::MAX, "1704110400": 7});
        let parsed = calendar_from_unix(&value).unwrap();
        assert_eq!(parsed.get("2024-01-01"), Some(&u64::MAX));
    }

    #[test]
    fn current_streak_counts_back_from_today() {
        let cal = calendar(&[("2025-03-08", 1), ("2025-03-09", 2), ("2025-03-10", 1)]);
        let streaks = compute_streaks(&cal, day("2025-03-10"));
        assert_eq!(streaks, Streaks { current: 3, longest: 3 });
    }

    #[test]
    fn streak_survives_when_yesterday_was_active() {
        let cal = calendar(&[("2025-03-08", 1), ("2025-03-09", 2)]);
        let streaks = compute_streaks(&cal, day("2025-03-10"));
        assert_eq!(streaks.current, 2);
    }

    #[test]
    fn broken_streak_keeps_longest_run() {
        let cal = calendar(&[
            ("2025-01-01", 1),
            ("2025-01-02", 1),
            ("2025-01-03", 1),
            ("2025-01-04", 0),
            ("2025-02-01", 5),
        ]);
        let streaks = compute_streaks(&cal, day("2025-03-10"));
        assert_eq!(streaks, Streaks { current: 0, longest: 3 });
    }

    #[test]
    fn future_and_empty_days_are_ignored() {
        let cal = calendar(&[("2025-03-10", 0), ("2025-12-31", 9)]);
        assert_eq!(compute_streaks(&cal, day("2025-03-10")), Streaks::default());
    }
}
