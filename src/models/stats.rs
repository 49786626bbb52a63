use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use super::common::{first_query_value, saturating_total};

/// Coding platforms the stats pipeline knows how to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    GitHub,
    LeetCode,
    GeeksForGeeks,
}

impl Platform {
    pub const ALL: [Platform; 3] = [Platform::GitHub, Platform::LeetCode, Platform::GeeksForGeeks];

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::GitHub => "github",
            Platform::LeetCode => "leetcode",
            Platform::GeeksForGeeks => "geeksforgeeks",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Platform::GitHub => "GitHub",
            Platform::LeetCode => "LeetCode",
            Platform::GeeksForGeeks => "GeeksforGeeks",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown platform: {0}")]
pub struct UnknownPlatform(pub String);

impl FromStr for Platform {
    type Err = UnknownPlatform;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "github" => Ok(Platform::GitHub),
            "leetcode" => Ok(Platform::LeetCode),
            "geeksforgeeks" | "gfg" => Ok(Platform::GeeksForGeeks),
            _ => Err(UnknownPlatform(s.to_string())),
        }
    }
}

#[derive(Debug, Default)]
pub struct StatsQuery {
    pub username: Option<String>,
}

impl StatsQuery {
    pub fn from_raw(raw: Option<&str>) -> Self {
        Self {
            username: first_query_value(raw, "username"),
        }
    }
}

/// One fetch cycle's subject: who to look up and where, in priority order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsRequest {
    pub platform: Platform,
    pub username: String,
    pub candidates: Vec<String>,
}

impl StatsRequest {
    pub fn new(platform: Platform, username: impl Into<String>, candidates: Vec<String>) -> Self {
        Self {
            platform,
            username: username.into(),
            candidates,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DifficultyCount {
    pub label: String,
    pub solved: u64,
    pub total: u64,
}

impl DifficultyCount {
    pub fn new(label: impl Into<String>, solved: u64, total: u64) -> Self {
        Self {
            label: label.into(),
            solved,
            total,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ActivityEntry {
    pub title: String,
    pub url: Option<String>,
    pub status: Option<String>,
    pub language: Option<String>,
    pub occurred_at: Option<DateTime<Utc>>,
}

/// The single shape every platform's payload is converted into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NormalizedStats {
    pub platform: Platform,
    pub username: String,
    pub total_solved: u64,
    pub breakdown: Vec<DifficultyCount>,
    pub rank_position: u64,
    pub current_streak_days: u64,
    pub longest_streak_days: u64,
    /// Newest first, at most `MAX_RECENT_ACTIVITY` entries.
    pub recent_activity: Vec<ActivityEntry>,
    /// `YYYY-MM-DD` -> activity count.
    pub calendar: BTreeMap<String, u64>,
    pub highlights: BTreeMap<String, u64>,
}

pub const MAX_RECENT_ACTIVITY: usize = 10;

impl NormalizedStats {
    pub fn breakdown_entry(&self, label: &str) -> Option<&DifficultyCount> {
        self.breakdown
            .iter()
            .find(|entry| entry.label.eq_ignore_ascii_case(label))
    }

    pub fn breakdown_sum(&self) -> u64 {
        saturating_total(self.breakdown.iter().map(|entry| entry.solved))
    }

    pub fn highlight(&self, name: &str) -> Option<u64> {
        self.highlights.get(name).copied()
    }

    /// Looks up a numeric field by name.
    ///
    /// Accepts the top-level counters (`totalSolved`, `rankPosition`,
    /// `currentStreakDays`, `longestStreakDays`), breakdown cells as
    /// `<label>.solved` / `<label>.total`, and any highlight name.
    pub fn lookup(&self, key: &str) -> Option<u64> {
        match key {
            "totalSolved" => Some(self.total_solved),
            "rankPosition" => Some(self.rank_position),
            "currentStreakDays" => Some(self.current_streak_days),
            "longestStreakDays" => Some(self.longest_streak_days),
            _ => match key.split_once('.') {
                Some((label, "solved")) => self.breakdown_entry(label).map(|entry| entry.solved),
                Some((label, "total")) => self.breakdown_entry(label).map(|entry| entry.total),
                _ => self.highlight(key),
            },
        }
    }
}

/// Where a snapshot's numbers came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DataSource {
    Live { endpoint: String },
    Fallback,
}

/// Result of one completed fetch cycle for a platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSnapshot {
    /// Username the cycle was run for (the fallback data carries its own).
    pub subject: String,
    pub stats: NormalizedStats,
    pub source: DataSource,
    pub advisory: Option<String>,
    pub request_token: u64,
    pub fetched_at: DateTime<Utc>,
}

impl StatsSnapshot {
    pub fn is_fallback(&self) -> bool {
        matches!(self.source, DataSource::Fallback)
    }
}
