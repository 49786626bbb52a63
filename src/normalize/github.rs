use chrono::{Datelike, NaiveDate};
use serde_json::{json, Value};
use std::collections::BTreeMap;

use super::calendar::{compute_streaks, DATE_FORMAT};
use super::{apply_rules, bound_activity, FieldDefault, FieldRule};
use crate::models::common::saturating_total;
use crate::models::{
    ActivityEntry, DifficultyCount, GitHubCommit, GitHubContributions, MonthlyCommits, NormalizedStats, Platform,
};

const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

const RULES: &[FieldRule] = &[
    FieldRule::new("publicRepos", &["/profile/public_repos"], FieldDefault::Fallback("publicRepos")),
    FieldRule::new("followers", &["/profile/followers"], FieldDefault::Fallback("followers")),
    FieldRule::new("following", &["/profile/following"], FieldDefault::Fallback("following")),
    FieldRule::new("publicGists", &["/profile/public_gists"], FieldDefault::Fallback("publicGists")),
];

/// Bundles the three GitHub subjects into the document [`normalize`] reads.
pub fn github_document(contributions: Value, profile: Option<Value>, commits: Option<Value>) -> Value {
    json!({
        "contributions": contributions,
        "profile": profile.unwrap_or(Value::Null),
        "commits": commits.unwrap_or(Value::Null),
    })
}

/// True when a contributions response carries any year totals or days.
pub fn has_contributions(contributions: &Value) -> bool {
    parse_contributions(contributions).is_some()
}

fn parse_contributions(value: &Value) -> Option<GitHubContributions> {
    if !value.is_object() {
        return None;
    }
    serde_json::from_value::<GitHubContributions>(value.clone())
        .ok()
        .filter(|contributions| !contributions.years.is_empty() || !contributions.contributions.is_empty())
}

/// Commit counts per calendar month of `year`, January first.
pub fn commits_per_month(commits: &[GitHubCommit], year: i32) -> Vec<MonthlyCommits> {
    let mut counts = [0u64; 12];
    for date in commits.iter().filter_map(GitHubCommit::authored_at) {
        if date.year() == year {
            counts[date.month0() as usize] += 1;
        }
    }

    MONTH_NAMES
        .iter()
        .zip(counts)
        .map(|(&month, commits)| MonthlyCommits { month, commits })
        .collect()
}

pub(super) fn normalize(username: &str, payload: &Value, fallback: &NormalizedStats, today: NaiveDate) -> NormalizedStats {
    let fields = apply_rules(payload, RULES, fallback);

    let contributions = payload.get("contributions").and_then(parse_contributions);

    let commits: Option<Vec<GitHubCommit>> = payload
        .get("commits")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| serde_json::from_value(item.clone()).ok())
                .collect()
        });

    let mut stats = match &contributions {
        Some(contributions) => from_contributions(username, contributions, fallback, today),
        None => NormalizedStats {
            username: username.to_string(),
            ..fallback.clone()
        },
    };

    let mut highlights = fallback.highlights.clone();
    for rule in RULES {
        highlights.insert(rule.target.to_string(), fields.get_or(rule.target, 0));
    }

    if let Some(commits) = &commits {
        let this_year: u64 = commits_per_month(commits, today.year())
            .iter()
            .map(|month| month.commits)
            .sum();
        highlights.insert("commitsThisYear".to_string(), this_year);
        stats.recent_activity = bound_activity(commits.iter().map(commit_entry).collect());
    }

    if let Some(login) = payload.pointer("/profile/login").and_then(Value::as_str) {
        stats.username = login.to_string();
    }
    stats.highlights = highlights;
    stats
}

fn from_contributions(
    username: &str,
    contributions: &GitHubContributions,
    fallback: &NormalizedStats,
    today: NaiveDate,
) -> NormalizedStats {
    let mut calendar = BTreeMap::new();
    for day in &contributions.contributions {
        if let Ok(date) = NaiveDate::parse_from_str(&day.date, DATE_FORMAT) {
            let total = calendar.entry(date.format(DATE_FORMAT).to_string()).or_insert(0u64);
            *total = total.saturating_add(day.count);
        }
    }

    let mut years: Vec<DifficultyCount> = contributions
        .years
        .iter()
        .map(|year| DifficultyCount::new(year.year.trim(), year.total, year.total))
        .collect();
    years.sort_by(|a, b| b.label.cmp(&a.label));
    years.dedup_by(|a, b| a.label == b.label);

    let total_solved = if years.is_empty() {
        saturating_total(calendar.values().copied())
    } else {
        saturating_total(years.iter().map(|year| year.solved))
    };

    let streaks = compute_streaks(&calendar, today);

    NormalizedStats {
        platform: Platform::GitHub,
        username: username.to_string(),
        total_solved,
        breakdown: years,
        rank_position: fallback.rank_position,
        current_streak_days: streaks.current,
        longest_streak_days: streaks.longest,
        recent_activity: Vec::new(),
        calendar,
        highlights: BTreeMap::new(),
    }
}

fn commit_entry(commit: &GitHubCommit) -> ActivityEntry {
    let summary = commit.summary();
    ActivityEntry {
        title: if summary.is_empty() {
            commit.sha.chars().take(7).collect()
        } else {
            summary.to_string()
        },
        url: commit.html_url.clone(),
        status: Some("Committed".to_string()),
        language: None,
        occurred_at: commit.authored_at(),
    }
}
