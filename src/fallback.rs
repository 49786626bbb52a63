//! Hand-authored sample datasets shown when every live source fails.
//!
//! Each platform has exactly one instance, built on first use and never
//! mutated afterwards. Callers clone it verbatim.

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::OnceLock;

use crate::models::{ActivityEntry, DifficultyCount, NormalizedStats, Platform};

static GITHUB: OnceLock<NormalizedStats> = OnceLock::new();
static LEETCODE: OnceLock<NormalizedStats> = OnceLock::new();
static GEEKSFORGEEKS: OnceLock<NormalizedStats> = OnceLock::new();

pub fn fallback_stats(platform: Platform) -> &'static NormalizedStats {
    match platform {
        Platform::GitHub => GITHUB.get_or_init(github_sample),
        Platform::LeetCode => LEETCODE.get_or_init(leetcode_sample),
        Platform::GeeksForGeeks => GEEKSFORGEEKS.get_or_init(gfg_sample),
    }
}

fn highlights(pairs: &[(&str, u64)]) -> BTreeMap<String, u64> {
    pairs.iter().map(|(name, value)| (name.to_string(), *value)).collect()
}

fn leetcode_submission(title: &str, slug: &str, language: &str, timestamp: i64) -> ActivityEntry {
    ActivityEntry {
        title: title.to_string(),
        url: Some(format!("https://leetcode.com/problems/{slug}/")),
        status: Some("Accepted".to_string()),
        language: Some(language.to_string()),
        occurred_at: DateTime::<Utc>::from_timestamp(timestamp, 0),
    }
}

fn gfg_submission(title: &str, slug: &str, language: &str) -> ActivityEntry {
    ActivityEntry {
        title: title.to_string(),
        url: Some(format!("https://practice.geeksforgeeks.org/problems/{slug}")),
        status: Some("Solved".to_string()),
        language: Some(language.to_string()),
        occurred_at: None,
    }
}

fn leetcode_sample() -> NormalizedStats {
    NormalizedStats {
        platform: Platform::LeetCode,
        username: "arbazkhanark23".to_string(),
        total_solved: 187,
        breakdown: vec![
            DifficultyCount::new("Easy", 95, 700),
            DifficultyCount::new("Medium", 80, 1500),
            DifficultyCount::new("Hard", 12, 600),
        ],
        rank_position: 42356,
        current_streak_days: 0,
        longest_streak_days: 0,
        recent_activity: vec![
            leetcode_submission("Two Sum", "two-sum", "JavaScript", 1_748_736_000),
            leetcode_submission("Reverse Linked List", "reverse-linked-list", "TypeScript", 1_748_649_600),
            leetcode_submission(
                "Binary Tree Inorder Traversal",
                "binary-tree-inorder-traversal",
                "Python",
                1_748_563_200,
            ),
            leetcode_submission("Trapping Rain Water", "trapping-rain-water", "Java", 1_748_476_800),
        ],
        calendar: BTreeMap::new(),
        highlights: highlights(&[
            ("contributionPoints", 245),
            ("reputation", 320),
            ("totalQuestions", 2800),
        ]),
    }
}

fn gfg_sample() -> NormalizedStats {
    NormalizedStats {
        platform: Platform::GeeksForGeeks,
        username: "arbaazkhanark23".to_string(),
        total_solved: 138,
        breakdown: vec![
            DifficultyCount::new("Basic", 18, 68),
            DifficultyCount::new("Easy", 51, 151),
            DifficultyCount::new("Medium", 59, 209),
            DifficultyCount::new("Hard", 10, 60),
        ],
        rank_position: 107,
        current_streak_days: 1,
        longest_streak_days: 1544,
        recent_activity: vec![
            gfg_submission("Print Linked List Elements", "print-linked-list-elements", "C++"),
            gfg_submission("Queue using Linked List", "implement-queue-using-linked-list", "Python"),
            gfg_submission("Preorder Traversal", "preorder-traversal", "Java"),
            gfg_submission("Binary Search", "binary-search", "C++"),
        ],
        calendar: BTreeMap::new(),
        highlights: highlights(&[("codingScore", 368), ("monthlyScore", 4)]),
    }
}

fn github_sample() -> NormalizedStats {
    NormalizedStats {
        platform: Platform::GitHub,
        username: "Arbazkhanark".to_string(),
        total_solved: 412,
        breakdown: vec![
            DifficultyCount::new("2025", 298, 298),
            DifficultyCount::new("2024", 114, 114),
        ],
        rank_position: 0,
        current_streak_days: 0,
        longest_streak_days: 0,
        recent_activity: Vec::new(),
        calendar: BTreeMap::new(),
        highlights: highlights(&[
            ("commitsThisYear", 0),
            ("followers", 12),
            ("following", 9),
            ("publicGists", 1),
            ("publicRepos", 24),
        ]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_platform_has_a_consistent_sample() {
        for platform in Platform::ALL {
            let stats = fallback_stats(platform);
            assert_eq!(stats.platform, platform);
            assert_eq!(stats.breakdown_sum(), stats.total_solved, "{platform}");
            for entry in &stats.breakdown {
                assert!(entry.solved <= entry.total, "{platform} {}", entry.label);
            }
        }
    }

    #[test]
    fn fallback_is_a_single_shared_instance() {
        let first = fallback_stats(Platform::LeetCode) as *const NormalizedStats;
        let second = fallback_stats(Platform::LeetCode) as *const NormalizedStats;
        assert_eq!(first, second);
    }

    #[test]
    fn leetcode_sample_activity_is_newest_first() {
        let activity = &fallback_stats(Platform::LeetCode).recent_activity;
        assert!(activity.windows(2).all(|pair| pair[0].occurred_at >= pair[1].occurred_at));
        assert_eq!(activity[0].title, "Two Sum");
    }
}
