use serde::{Deserialize, Serialize};
use validator::Validate;

use super::common::{deserialize_lenient_count, first_query_value};

// Contribution calendar as served by the github-contributions mirror
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GitHubContributions {
    #[serde(default)]
    pub years: Vec<ContributionYear>,
    #[serde(default)]
    pub contributions: Vec<ContributionDay>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContributionYear {
    pub year: String,
    #[serde(default, deserialize_with = "deserialize_lenient_count")]
    pub total: u64,
    pub range: Option<ContributionRange>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContributionRange {
    pub start: String,
    pub end: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContributionDay {
    pub date: String,
    #[serde(default, deserialize_with = "deserialize_lenient_count")]
    pub count: u64,
    pub color: Option<String>,
    pub intensity: Option<serde_json::Value>,
}

// GitHub REST API: GET /repos/{owner}/{repo}/commits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubCommit {
    pub sha: String,
    pub html_url: Option<String>,
    pub commit: CommitDetail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitDetail {
    pub message: String,
    pub author: Option<CommitAuthor>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitAuthor {
    pub name: Option<String>,
    pub date: Option<chrono::DateTime<chrono::Utc>>,
}

impl GitHubCommit {
    pub fn authored_at(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        self.commit.author.as_ref().and_then(|author| author.date)
    }

    /// First line of the commit message.
    pub fn summary(&self) -> &str {
        self.commit.message.lines().next().unwrap_or_default().trim()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyCommits {
    pub month: &'static str,
    pub commits: u64,
}

/// Query string of the contributions proxy.
#[derive(Debug, Default, Validate)]
pub struct ContributionsQuery {
    // GitHub logins are at most 39 characters
    #[validate(length(max = 39))]
    pub username: Option<String>,
}

impl ContributionsQuery {
    pub fn from_raw(raw: Option<&str>) -> Self {
        Self {
            username: first_query_value(raw, "username"),
        }
    }
}
