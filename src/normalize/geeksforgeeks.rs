use serde_json::Value;

use super::{apply_rules, extract_text, reconstruct_breakdown, CategorySeed, FieldDefault, FieldRule};
use crate::models::common::saturating_total;
use crate::models::{ActivityEntry, NormalizedStats, Platform};

/// Category key in `solvedStats`, display label, padding added to the solved
/// count to estimate problems available, and how many recent questions to show.
const CATEGORIES: [(&str, &str, u64, usize); 4] = [
    ("basic", "Basic", 50, 2),
    ("easy", "Easy", 100, 2),
    ("medium", "Medium", 150, 1),
    ("hard", "Hard", 50, 1),
];

const MAX_RECENT: usize = 5;

const RULES: &[FieldRule] = &[
    FieldRule::new(
        "totalProblemsSolved",
        &["/info/totalProblemsSolved", "/totalProblemsSolved"],
        FieldDefault::Derived,
    ),
    FieldRule::new("basic", &["/solvedStats/basic/count"], FieldDefault::Derived),
    FieldRule::new("easy", &["/solvedStats/easy/count"], FieldDefault::Derived),
    FieldRule::new("medium", &["/solvedStats/medium/count"], FieldDefault::Derived),
    FieldRule::new("hard", &["/solvedStats/hard/count"], FieldDefault::Derived),
    FieldRule::new(
        "instituteRank",
        &["/info/instituteRank", "/instituteRank"],
        FieldDefault::Fallback("rankPosition"),
    ),
    FieldRule::new(
        "currentStreak",
        &["/info/currentStreak", "/currentStreak"],
        FieldDefault::Fallback("currentStreakDays"),
    ),
    FieldRule::new(
        "maxStreak",
        &["/info/maxStreak", "/maxStreak"],
        FieldDefault::Fallback("longestStreakDays"),
    ),
    FieldRule::new(
        "codingScore",
        &["/info/codingScore", "/codingScore"],
        FieldDefault::Fallback("codingScore"),
    ),
    FieldRule::new(
        "monthlyScore",
        &["/info/monthlyScore", "/monthlyScore"],
        FieldDefault::Fallback("monthlyScore"),
    ),
];

pub(super) fn normalize(username: &str, payload: &Value, fallback: &NormalizedStats) -> NormalizedStats {
    let fields = apply_rules(payload, RULES, fallback);

    let mut seeds: Vec<CategorySeed> = CATEGORIES
        .iter()
        .map(|&(key, label, padding, _)| {
            let reported = fields.reported_value(key);
            let ceiling = match reported {
                Some(count) => count.saturating_add(padding),
                None => fallback
                    .lookup(&format!("{label}.total"))
                    .unwrap_or(padding),
            };
            CategorySeed {
                label,
                reported,
                ceiling,
            }
        })
        .collect();

    let any_reported = seeds.iter().any(|seed| seed.reported.is_some());
    let total_solved = match fields.get("totalProblemsSolved") {
        Some(total) => total,
        None if any_reported => saturating_total(seeds.iter().filter_map(|seed| seed.reported)),
        None => {
            // Nothing usable at all: keep the sample breakdown as well.
            for seed in &mut seeds {
                seed.reported = fallback.lookup(&format!("{}.solved", seed.label));
            }
            fallback.total_solved
        }
    };
    let breakdown = reconstruct_breakdown(total_solved, &seeds);

    let recent = recent_questions(payload);
    let recent_activity = if recent.is_empty() {
        fallback.recent_activity.clone()
    } else {
        recent
    };

    let mut highlights = fallback.highlights.clone();
    highlights.insert("codingScore".to_string(), fields.get_or("codingScore", 0));
    highlights.insert("monthlyScore".to_string(), fields.get_or("monthlyScore", 0));

    NormalizedStats {
        platform: Platform::GeeksForGeeks,
        username: extract_text(payload, &["/info/userName", "/userName"]).unwrap_or_else(|| username.to_string()),
        total_solved,
        breakdown,
        rank_position: fields.get_or("instituteRank", fallback.rank_position),
        current_streak_days: fields.get_or("currentStreak", fallback.current_streak_days),
        longest_streak_days: fields.get_or("maxStreak", fallback.longest_streak_days),
        recent_activity,
        calendar: fallback.calendar.clone(),
        highlights,
    }
}

// The API has no submission history, so the first few solved questions of
// each category stand in for it.
fn recent_questions(payload: &Value) -> Vec<ActivityEntry> {
    let mut entries = Vec::new();
    for (key, _, _, take) in CATEGORIES {
        let Some(questions) = payload
            .pointer(&format!("/solvedStats/{key}/questions"))
            .and_then(Value::as_array)
        else {
            continue;
        };

        let picked = questions
            .iter()
            .filter_map(|question| {
                let title = question.get("question").and_then(Value::as_str)?.trim();
                (!title.is_empty()).then(|| ActivityEntry {
                    title: title.to_string(),
                    url: question
                        .get("questionUrl")
                        .and_then(Value::as_str)
                        .map(String::from),
                    status: Some("Solved".to_string()),
                    language: None,
                    occurred_at: None,
                })
            })
            .take(take);
        entries.extend(picked);
    }
    entries.truncate(MAX_RECENT);
    entries
}

#[cfg(test)]
mod tests {
    use super::super::normalize;
    use super::*;
    use crate::fallback::fallback_stats;
    use serde_json::json;

    fn gfg(payload: Value) -> NormalizedStats {
        normalize(Platform::GeeksForGeeks, "octocat", &payload)
    }

    fn questions(prefix: &str, count: usize) -> Value {
        (0..count)
            .map(|n| json!({ "question": format!("{prefix} {n}"), "questionUrl": format!("https://gfg.example/{prefix}-{n}") }))
            .collect()
    }

    #[test]
    fn api_payload_is_mapped() {
        let stats = gfg(json!({
            "info": {
                "userName": "octo-gfg",
                "fullName": "Octo Cat",
                "institute": "Somewhere",
                "instituteRank": "12",
                "currentStreak": 4,
                "maxStreak": 30,
                "codingScore": 500,
                "monthlyScore": 20,
                "totalProblemsSolved": 60
            },
            "solvedStats": {
                "basic": { "count": 10, "questions": questions("basic", 3) },
                "easy": { "count": 20, "questions": questions("easy", 3) },
                "medium": { "count": 25, "questions": questions("medium", 3) },
                "hard": { "count": 5, "questions": questions("hard", 3) }
            }
        }));

        assert_eq!(stats.username, "octo-gfg");
        assert_eq!(stats.total_solved, 60);
        assert_eq!(stats.breakdown_sum(), 60);
        assert_eq!(stats.breakdown_entry("Basic").unwrap().total, 60);
        assert_eq!(stats.breakdown_entry("Medium").unwrap().total, 175);
        assert_eq!(stats.rank_position, 12);
        assert_eq!(stats.current_streak_days, 4);
        assert_eq!(stats.longest_streak_days, 30);
        assert_eq!(stats.highlight("codingScore"), Some(500));
        assert_eq!(stats.highlight("monthlyScore"), Some(20));

        let titles: Vec<&str> = stats.recent_activity.iter().map(|entry| entry.title.as_str()).collect();
        assert_eq!(titles, vec!["basic 0", "basic 1", "easy 0", "easy 1", "medium 0"]);
    }

    #[test]
    fn total_without_breakdown_is_reconstructed_in_category_order() {
        let stats = gfg(json!({ "info": { "totalProblemsSolved": 100 } }));
        let solved: Vec<u64> = stats.breakdown.iter().map(|entry| entry.solved).collect();
        // Fallback ceilings: basic 68, easy 151
        assert_eq!(solved, vec![68, 32, 0, 0]);
        assert_eq!(stats.breakdown_sum(), 100);
    }

    #[test]
    fn total_defaults_to_sum_of_reported_categories() {
        let stats = gfg(json!({
            "solvedStats": { "easy": { "count": 7 }, "hard": { "count": "2" } }
        }));
        assert_eq!(stats.total_solved, 9);
        assert_eq!(stats.breakdown_sum(), 9);
        assert_eq!(stats.breakdown_entry("Basic").unwrap().solved, 0);
        assert_eq!(stats.username, "octocat");
    }

    #[test]
    fn unrelated_payload_keeps_fallback_values_per_field() {
        let fallback = fallback_stats(Platform::GeeksForGeeks);
        let stats = gfg(json!({ "message": "user not found" }));

        assert_eq!(stats.total_solved, fallback.total_solved);
        assert_eq!(stats.breakdown, fallback.breakdown);
        assert_eq!(stats.longest_streak_days, 1544);
        assert_eq!(stats.recent_activity, fallback.recent_activity);
    }

    #[test]
    fn huge_counts_saturate_instead_of_panicking() {
        let stats = gfg(json!({
            "solvedStats": { "easy": { "count": u64::MAX }, "hard": { "count": 2 } }
        }));
        assert_eq!(stats.total_solved, u64::MAX);
        assert_eq!(stats.breakdown_sum(), u64::MAX);
        assert_eq!(stats.breakdown_entry("Easy").unwrap().total, u64::MAX);
        assert_eq!(stats.breakdown_entry("Hard").unwrap().total, 52);
    }
}
