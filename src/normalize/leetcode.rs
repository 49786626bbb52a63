use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;

use super::calendar::{calendar_from_unix, compute_streaks};
use super::{apply_rules, bound_activity, extract_count, extract_text, reconstruct_breakdown, CategorySeed, FieldDefault, FieldRule};
use crate::models::common::{count_from_value, saturating_total};
use crate::models::{ActivityEntry, NormalizedStats, Platform};

const DIFFICULTIES: [&str; 3] = ["Easy", "Medium", "Hard"];

const RULES: &[FieldRule] = &[
    FieldRule::new("totalSolved", &["/totalSolved"], FieldDefault::Derived),
    FieldRule::new("totalEasy", &["/totalEasy"], FieldDefault::Fallback("Easy.total")),
    FieldRule::new("totalMedium", &["/totalMedium"], FieldDefault::Fallback("Medium.total")),
    FieldRule::new("totalHard", &["/totalHard"], FieldDefault::Fallback("Hard.total")),
    FieldRule::new("easySolved", &["/easySolved"], FieldDefault::Derived),
    FieldRule::new("mediumSolved", &["/mediumSolved"], FieldDefault::Derived),
    FieldRule::new("hardSolved", &["/hardSolved"], FieldDefault::Derived),
    FieldRule::new(
        "ranking",
        &["/ranking", "/matchedUser/profile/ranking"],
        FieldDefault::Fallback("rankPosition"),
    ),
    FieldRule::new(
        "contributionPoints",
        &["/contributionPoints", "/contributionPoint"],
        FieldDefault::Fallback("contributionPoints"),
    ),
    FieldRule::new(
        "reputation",
        &["/reputation", "/matchedUser/profile/reputation"],
        FieldDefault::Fallback("reputation"),
    ),
    FieldRule::new("totalQuestions", &["/totalQuestions"], FieldDefault::Derived),
];

pub(super) fn normalize(username: &str, payload: &Value, fallback: &NormalizedStats, today: NaiveDate) -> NormalizedStats {
    let fields = apply_rules(payload, RULES, fallback);
    let reported = [
        fields.reported_value("easySolved"),
        fields.reported_value("mediumSolved"),
        fields.reported_value("hardSolved"),
    ];
    let accepted = accepted_by_difficulty(payload);
    let ceilings = [
        fields.get_or("totalEasy", 0),
        fields.get_or("totalMedium", 0),
        fields.get_or("totalHard", 0),
    ];

    let mut seeds: Vec<CategorySeed> = DIFFICULTIES
        .iter()
        .enumerate()
        .map(|(index, &label)| CategorySeed {
            label,
            reported: reported[index].or(accepted[index]),
            ceiling: ceilings[index],
        })
        .collect();

    let any_reported = seeds.iter().any(|seed| seed.reported.is_some());
    let total_solved = match fields.reported_value("totalSolved") {
        Some(total) => total,
        None if any_reported => saturating_total(seeds.iter().filter_map(|seed| seed.reported)),
        None => {
            // Neither a total nor any category: show the sample split rather
            // than piling the sample total onto the first difficulty.
            for seed in &mut seeds {
                seed.reported = fallback.lookup(&format!("{}.solved", seed.label));
            }
            fallback.total_solved
        }
    };
    let breakdown = reconstruct_breakdown(total_solved, &seeds);

    let category_total = saturating_total(ceilings);
    let total_questions = fields.get("totalQuestions").unwrap_or(if category_total > 0 {
        category_total
    } else {
        fallback.highlight("totalQuestions").unwrap_or_default()
    });

    let (calendar, streaks) = match payload.get("submissionCalendar").and_then(calendar_from_unix) {
        Some(calendar) => {
            let streaks = compute_streaks(&calendar, today);
            (calendar, (streaks.current, streaks.longest))
        }
        None => (
            fallback.calendar.clone(),
            (fallback.current_streak_days, fallback.longest_streak_days),
        ),
    };

    let recent_activity = match payload.get("recentSubmissions").and_then(Value::as_array) {
        Some(submissions) => bound_activity(submissions.iter().filter_map(submission_entry).collect()),
        None => fallback.recent_activity.clone(),
    };

    let mut highlights = fallback.highlights.clone();
    highlights.insert("contributionPoints".to_string(), fields.get_or("contributionPoints", 0));
    highlights.insert("reputation".to_string(), fields.get_or("reputation", 0));
    highlights.insert("totalQuestions".to_string(), total_questions);

    NormalizedStats {
        platform: Platform::LeetCode,
        username: extract_text(payload, &["/username", "/matchedUser/username"]).unwrap_or_else(|| username.to_string()),
        total_solved,
        breakdown,
        rank_position: fields.get_or("ranking", fallback.rank_position),
        current_streak_days: streaks.0,
        longest_streak_days: streaks.1,
        recent_activity,
        calendar,
        highlights,
    }
}

/// Per-difficulty counts from `matchedUser.submitStats.acSubmissionNum`.
fn accepted_by_difficulty(payload: &Value) -> [Option<u64>; 3] {
    let mut counts = [None; 3];
    let Some(entries) = payload
        .pointer("/matchedUser/submitStats/acSubmissionNum")
        .and_then(Value::as_array)
    else {
        return counts;
    };

    for entry in entries {
        let Some(difficulty) = entry.get("difficulty").and_then(Value::as_str) else {
            continue;
        };
        let Some(index) = DIFFICULTIES
            .iter()
            .position(|label| label.eq_ignore_ascii_case(difficulty))
        else {
            continue;
        };
        if let Some(count) = extract_count(entry, &["/count"]) {
            counts[index] = Some(count);
        }
    }
    counts
}

fn submission_entry(submission: &Value) -> Option<ActivityEntry> {
    let title = submission.get("title").and_then(Value::as_str)?.trim();
    if title.is_empty() {
        return None;
    }

    let text = |key: &str| {
        submission
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(String::from)
    };

    let occurred_at = submission
        .get("timestamp")
        .and_then(count_from_value)
        .and_then(|seconds| i64::try_from(seconds).ok())
        .and_then(|seconds| DateTime::<Utc>::from_timestamp(seconds, 0));

    Some(ActivityEntry {
        title: title.to_string(),
        url: text("titleSlug").map(|slug| format!("https://leetcode.com/problems/{slug}/")),
        status: text("statusDisplay"),
        language: text("lang"),
        occurred_at,
    })
}
