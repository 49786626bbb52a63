//! Converts upstream payloads of unknown shape into [`NormalizedStats`].
//!
//! Every platform describes its numeric fields with a table of
//! [`FieldRule`]s: a target name, JSON pointers to try in order, and what to
//! use when none of them holds a count. Normalization never fails; a payload
//! that is not an object, or is an empty one, yields the platform's fallback
//! dataset unchanged.

pub mod calendar;
mod geeksforgeeks;
mod github;
mod leetcode;

use chrono::{NaiveDate, Utc};
use serde_json::Value;
use std::cmp::Reverse;
use std::collections::BTreeMap;

use crate::fallback::fallback_stats;
use crate::models::common::{count_from_value, saturating_total};
use crate::models::{ActivityEntry, DifficultyCount, NormalizedStats, Platform, MAX_RECENT_ACTIVITY};

pub use github::{commits_per_month, github_document, has_contributions};

/// What to use when none of a rule's sources is present.
#[derive(Debug, Clone, Copy)]
pub enum FieldDefault {
    /// A field of the platform's fallback dataset, by [`NormalizedStats::lookup`] key.
    Fallback(&'static str),
    Constant(u64),
    /// Left empty; the platform code derives it from other fields.
    Derived,
}

#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub target: &'static str,
    /// JSON pointers, most preferred first.
    pub sources: &'static [&'static str],
    pub default: FieldDefault,
}

impl FieldRule {
    pub const fn new(target: &'static str, sources: &'static [&'static str], default: FieldDefault) -> Self {
        Self {
            target,
            sources,
            default,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Resolved {
    value: Option<u64>,
    reported: bool,
}

/// Outcome of applying a rule table to one payload.
#[derive(Debug, Clone, Default)]
pub struct Fields {
    resolved: BTreeMap<&'static str, Resolved>,
}

impl Fields {
    pub fn get(&self, target: &str) -> Option<u64> {
        self.resolved.get(target).and_then(|field| field.value)
    }

    pub fn get_or(&self, target: &str, default: u64) -> u64 {
        self.get(target).unwrap_or(default)
    }

    /// True when the value came from the payload rather than a default.
    pub fn reported(&self, target: &str) -> bool {
        self.resolved.get(target).is_some_and(|field| field.reported)
    }

    /// The value only when the payload reported it.
    pub fn reported_value(&self, target: &str) -> Option<u64> {
        self.resolved
            .get(target)
            .filter(|field| field.reported)
            .and_then(|field| field.value)
    }
}

/// First source pointer that holds a count.
pub fn extract_count(payload: &Value, sources: &[&str]) -> Option<u64> {
    sources
        .iter()
        .filter_map(|pointer| payload.pointer(pointer))
        .find_map(count_from_value)
}

/// First source pointer that holds a non-blank string.
pub fn extract_text(payload: &Value, sources: &[&str]) -> Option<String> {
    sources
        .iter()
        .filter_map(|pointer| payload.pointer(pointer))
        .filter_map(Value::as_str)
        .map(str::trim)
        .find(|text| !text.is_empty())
        .map(String::from)
}

pub fn apply_rules(payload: &Value, rules: &[FieldRule], fallback: &NormalizedStats) -> Fields {
    let resolved = rules
        .iter()
        .map(|rule| {
            let field = match extract_count(payload, rule.sources) {
                Some(value) => Resolved {
                    value: Some(value),
                    reported: true,
                },
                None => Resolved {
                    value: match rule.default {
                        FieldDefault::Fallback(key) => fallback.lookup(key),
                        FieldDefault::Constant(value) => Some(value),
                        FieldDefault::Derived => None,
                    },
                    reported: false,
                },
            };
            (rule.target, field)
        })
        .collect();

    Fields { resolved }
}

/// One category of a difficulty breakdown before reconciliation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategorySeed {
    pub label: &'static str,
    /// Solved count the upstream reported, if any.
    pub reported: Option<u64>,
    /// Problems available in the category.
    pub ceiling: u64,
}

/// Fills in categories the upstream did not report.
///
/// Reported counts are kept as-is. Missing categories, in order, take
/// `min(ceiling, remaining)` of what `total_solved` leaves unassigned. Any
/// remainder after that lands on the last missing category so the breakdown
/// sums to `total_solved`.
pub fn reconstruct_breakdown(total_solved: u64, seeds: &[CategorySeed]) -> Vec<DifficultyCount> {
    let reported_sum = saturating_total(seeds.iter().filter_map(|seed| seed.reported));
    let mut remaining = total_solved.saturating_sub(reported_sum);

    let mut breakdown: Vec<DifficultyCount> = Vec::with_capacity(seeds.len());
    let mut last_missing = None;
    for (index, seed) in seeds.iter().enumerate() {
        let solved = match seed.reported {
            Some(solved) => solved,
            None => {
                let solved = seed.ceiling.min(remaining);
                remaining -= solved;
                last_missing = Some(index);
                solved
            }
        };
        breakdown.push(DifficultyCount::new(seed.label, solved, seed.ceiling));
    }

    if let Some(index) = last_missing {
        breakdown[index].solved = breakdown[index].solved.saturating_add(remaining);
    }
    breakdown
}

/// Sorts newest first (undated entries keep their order, after dated ones) and caps the list.
pub fn bound_activity(mut entries: Vec<ActivityEntry>) -> Vec<ActivityEntry> {
    entries.sort_by_key(|entry| Reverse(entry.occurred_at));
    entries.truncate(MAX_RECENT_ACTIVITY);
    entries
}

/// Normalizes a payload as of today (UTC).
pub fn normalize(platform: Platform, username: &str, payload: &Value) -> NormalizedStats {
    normalize_at(platform, username, payload, Utc::now().date_naive())
}

pub fn normalize_at(platform: Platform, username: &str, payload: &Value, today: NaiveDate) -> NormalizedStats {
    let fallback = fallback_stats(platform);

    let is_empty = payload.as_object().map_or(true, |object| object.is_empty());
    if is_empty {
        return fallback.clone();
    }

    if let Some(stats) = already_normalized(platform, payload) {
        return stats;
    }

    match platform {
        Platform::LeetCode => leetcode::normalize(username, payload, fallback, today),
        Platform::GeeksForGeeks => geeksforgeeks::normalize(username, payload, fallback),
        Platform::GitHub => github::normalize(username, payload, fallback, today),
    }
}

fn already_normalized(platform: Platform, payload: &Value) -> Option<NormalizedStats> {
    serde_json::from_value::<NormalizedStats>(payload.clone())
        .ok()
        .filter(|stats| stats.platform == platform)
}
