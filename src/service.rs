use chrono::{NaiveDate, Utc};
use dashmap::DashMap;
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::fallback::fallback_stats;
use crate::fetch::{endpoint_url, CandidateError, CandidateFailure, FetchError, FetchOutcome, HttpFetcher};
use crate::models::{DataSource, Platform, StatsRequest, StatsSnapshot};
use crate::normalize::{github_document, has_contributions, normalize_at};

#[derive(Debug, Default)]
struct Slot {
    latest_token: u64,
    snapshot: Option<StatsSnapshot>,
}

/// Latest committed snapshot per platform.
///
/// Every fetch cycle takes a token before it starts. A cycle may only commit
/// while its token is still the newest one issued for its platform, so a slow
/// cycle can never overwrite the result of one started after it.
#[derive(Debug, Clone, Default)]
pub struct StatsBoard {
    slots: Arc<DashMap<Platform, Slot>>,
}

impl StatsBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&self, platform: Platform) -> u64 {
        let mut slot = self.slots.entry(platform).or_default();
        slot.latest_token += 1;
        slot.latest_token
    }

    /// Returns false when the snapshot was discarded as stale.
    pub fn commit(&self, platform: Platform, snapshot: StatsSnapshot) -> bool {
        let mut slot = self.slots.entry(platform).or_default();
        if snapshot.request_token != slot.latest_token {
            warn!(
                "Discarding stale {} result (token {}, latest {})",
                platform, snapshot.request_token, slot.latest_token
            );
            return false;
        }
        slot.snapshot = Some(snapshot);
        true
    }

    pub fn latest(&self, platform: Platform) -> Option<StatsSnapshot> {
        self.slots.get(&platform).and_then(|slot| slot.snapshot.clone())
    }
}

/// Turns a fetch result into the snapshot a cycle commits.
///
/// Success is normalized; exhaustion substitutes the platform's fallback
/// verbatim together with a single advisory message.
pub fn resolve_cycle(
    request: &StatsRequest,
    result: Result<FetchOutcome, FetchError>,
    token: u64,
    today: NaiveDate,
) -> StatsSnapshot {
    let (stats, source, advisory) = match result {
        Ok(outcome) => (
            normalize_at(request.platform, &request.username, &outcome.payload, today),
            DataSource::Live {
                endpoint: outcome.endpoint,
            },
            None,
        ),
        Err(error) => {
            warn!(
                "All {} sources failed for {}, using sample data: {}",
                request.platform.display_name(),
                request.username,
                error
            );
            (
                fallback_stats(request.platform).clone(),
                DataSource::Fallback,
                Some(advisory_for(request.platform, &error)),
            )
        }
    };

    StatsSnapshot {
        subject: request.username.clone(),
        stats,
        source,
        advisory,
        request_token: token,
        fetched_at: Utc::now(),
    }
}

pub fn advisory_for(platform: Platform, error: &FetchError) -> String {
    match platform {
        Platform::LeetCode => "All API endpoints failed. Using demo data.".to_string(),
        Platform::GeeksForGeeks => format!(
            "Failed to load GeeksforGeeks data: {}. Showing sample data.",
            error.reason()
        ),
        Platform::GitHub => format!("Failed to fetch GitHub data: {}. Showing sample data.", error.reason()),
    }
}

/// Runs fetch cycles against the configured upstreams and keeps the results.
#[derive(Debug, Clone)]
pub struct StatsService {
    config: Arc<AppConfig>,
    fetcher: HttpFetcher,
    board: StatsBoard,
}

impl StatsService {
    pub fn new(config: Arc<AppConfig>, fetcher: HttpFetcher) -> Self {
        Self {
            config,
            fetcher,
            board: StatsBoard::new(),
        }
    }

    /// Candidates for the platform's primary subject, in priority order.
    pub fn request_for(&self, platform: Platform, username: &str) -> StatsRequest {
        let bases: &[String] = match platform {
            Platform::LeetCode => &self.config.leetcode_api_urls,
            Platform::GeeksForGeeks => &self.config.gfg_api_urls,
            Platform::GitHub => std::slice::from_ref(&self.config.contributions_api_url),
        };

        let candidates = bases
            .iter()
            .filter_map(|base| match endpoint_url(base, &[username]) {
                Ok(url) => Some(url.to_string()),
                Err(e) => {
                    warn!("Skipping invalid {} endpoint '{}': {}", platform, base, e);
                    None
                }
            })
            .collect();

        StatsRequest::new(platform, username, candidates)
    }

    /// Starts a new cycle for `platform` and commits its result.
    pub async fn refresh(&self, platform: Platform, username: Option<&str>) -> StatsSnapshot {
        let username = username
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| self.config.default_username(platform));

        let request = self.request_for(platform, username);
        let token = self.board.begin(platform);
        let today = Utc::now().date_naive();

        let snapshot = match platform {
            Platform::GitHub => self.github_cycle(&request, token, today).await,
            _ => {
                let result = self.fetcher.fetch(&request).await;
                resolve_cycle(&request, result, token, today)
            }
        };

        if self.board.commit(platform, snapshot.clone()) {
            info!(
                "📊 {} stats for {} committed (token {}, fallback: {})",
                platform.display_name(),
                snapshot.subject,
                token,
                snapshot.is_fallback()
            );
        }
        snapshot
    }

    /// The committed snapshot for this subject, running a cycle when there is none.
    pub async fn current(&self, platform: Platform, username: Option<&str>) -> StatsSnapshot {
        let wanted = username
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| self.config.default_username(platform));

        match self.board.latest(platform) {
            Some(snapshot) if snapshot.subject == wanted => snapshot,
            _ => self.refresh(platform, Some(wanted)).await,
        }
    }

    // Contributions decide between live and sample data; profile and commits
    // only enrich a live result.
    async fn github_cycle(&self, request: &StatsRequest, token: u64, today: NaiveDate) -> StatsSnapshot {
        let outcome = match self.fetcher.fetch(request).await {
            Ok(outcome) => outcome,
            Err(error) => return resolve_cycle(request, Err(error), token, today),
        };

        if !has_contributions(&outcome.payload) {
            let error = FetchError::Exhausted {
                failures: vec![CandidateFailure {
                    endpoint: outcome.endpoint,
                    error: CandidateError::Unusable("no contribution data in response".to_string()),
                }],
            };
            return resolve_cycle(request, Err(error), token, today);
        }

        let username = request.username.as_str();
        let repo = self.config.github_repo.as_str();
        let profile = self.fetch_optional("profile", &["users", username], None).await;
        let commits = self
            .fetch_optional("commits", &["repos", username, repo, "commits"], Some(("per_page", "100")))
            .await;

        let mut missing = Vec::new();
        if profile.is_none() {
            missing.push("profile");
        }
        if commits.is_none() {
            missing.push("commits");
        }

        let document = github_document(outcome.payload, profile, commits);
        let mut snapshot = resolve_cycle(
            request,
            Ok(FetchOutcome {
                payload: document,
                ..outcome
            }),
            token,
            today,
        );

        if !missing.is_empty() {
            snapshot.advisory = Some(format!(
                "Partial GitHub data: {} unavailable.",
                missing.join(" and ")
            ));
        }
        snapshot
    }

    async fn fetch_optional(&self, subject: &str, segments: &[&str], query: Option<(&str, &str)>) -> Option<Value> {
        let mut url = match endpoint_url(&self.config.github_api_url, segments) {
            Ok(url) => url,
            Err(e) => {
                warn!("Invalid GitHub API URL for {}: {}", subject, e);
                return None;
            }
        };
        if let Some((key, value)) = query {
            url.query_pairs_mut().append_pair(key, value);
        }

        match self.fetcher.get_json(url.to_string()).await {
            Ok(payload) => Some(payload),
            Err(e) => {
                warn!("Failed to fetch GitHub {}: {}", subject, e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
    }

    fn exhausted() -> FetchError {
        FetchError::Exhausted {
            failures: vec![
                CandidateFailure {
                    endpoint: "https://one.example/u".into(),
                    error: CandidateError::Transport("connection refused".into()),
                },
                CandidateFailure {
                    endpoint: "https://two.example/u".into(),
                    error: CandidateError::Status(502),
                },
            ],
        }
    }

    fn service() -> StatsService {
        let config = AppConfig::default();
        let fetcher = HttpFetcher::new(&config.user_agent, config.fetch_timeout).unwrap();
        StatsService::new(Arc::new(config), fetcher)
    }

    #[test]
    fn exhaustion_substitutes_exact_fallback_with_one_advisory() {
        for platform in Platform::ALL {
            let request = StatsRequest::new(platform, "octocat", vec!["https://one.example/u".into()]);
            let snapshot = resolve_cycle(&request, Err(exhausted()), 1, today());

            assert_eq!(&snapshot.stats, fallback_stats(platform));
            assert_eq!(snapshot.source, DataSource::Fallback);
            assert!(snapshot.advisory.is_some());
            assert_eq!(snapshot.subject, "octocat");
        }
    }

    #[test]
    fn advisories_name_the_failure() {
        let error = exhausted();
        assert_eq!(
            advisory_for(Platform::LeetCode, &error),
            "All API endpoints failed. Using demo data."
        );
        assert_eq!(
            advisory_for(Platform::GeeksForGeeks, &error),
            "Failed to load GeeksforGeeks data: HTTP error! status: 502. Showing sample data."
        );
        assert!(advisory_for(Platform::GitHub, &FetchError::NoCandidates).contains("no candidate endpoints"));
    }

    #[test]
    fn unusable_contributions_name_the_reason() {
        let error = FetchError::Exhausted {
            failures: vec![CandidateFailure {
                endpoint: "https://contrib.example/octocat".into(),
                error: CandidateError::Unusable("no contribution data in response".into()),
            }],
        };
        assert_eq!(
            advisory_for(Platform::GitHub, &error),
            "Failed to fetch GitHub data: no contribution data in response. Showing sample data."
        );
    }

    #[test]
    fn success_is_normalized_without_advisory() {
        let request = StatsRequest::new(Platform::LeetCode, "octocat", vec!["https://one.example/u".into()]);
        let outcome = FetchOutcome {
            endpoint: "https://one.example/u".into(),
            payload: json!({ "totalSolved": 12 }),
            attempts: 1,
        };
        let snapshot = resolve_cycle(&request, Ok(outcome), 4, today());

        assert_eq!(snapshot.stats.total_solved, 12);
        assert_eq!(snapshot.stats.breakdown_sum(), 12);
        assert_eq!(
            snapshot.source,
            DataSource::Live {
                endpoint: "https://one.example/u".into()
            }
        );
        assert!(snapshot.advisory.is_none());
        assert_eq!(snapshot.request_token, 4);
    }

    #[test]
    fn stale_cycle_cannot_overwrite_newer_result() {
        let board = StatsBoard::new();
        let request = StatsRequest::new(Platform::LeetCode, "octocat", vec![]);

        let slow = board.begin(Platform::LeetCode);
        let fast = board.begin(Platform::LeetCode);
        assert!(fast > slow);

        let fast_snapshot = resolve_cycle(&request, Err(FetchError::NoCandidates), fast, today());
        assert!(board.commit(Platform::LeetCode, fast_snapshot));

        let slow_snapshot = resolve_cycle(
            &request,
            Ok(FetchOutcome {
                endpoint: "https://slow.example".into(),
                payload: json!({ "totalSolved": 1 }),
                attempts: 1,
            }),
            slow,
            today(),
        );
        assert!(!board.commit(Platform::LeetCode, slow_snapshot));

        let latest = board.latest(Platform::LeetCode).unwrap();
        assert_eq!(latest.request_token, fast);
        assert!(latest.is_fallback());
    }

    #[test]
    fn tokens_are_independent_per_platform() {
        let board = StatsBoard::new();
        assert_eq!(board.begin(Platform::GitHub), 1);
        assert_eq!(board.begin(Platform::GitHub), 2);
        assert_eq!(board.begin(Platform::LeetCode), 1);
        assert!(board.latest(Platform::GeeksForGeeks).is_none());
    }

    #[test]
    fn requests_follow_configured_priority() {
        let service = service();

        let leetcode = service.request_for(Platform::LeetCode, "octocat");
        assert_eq!(
            leetcode.candidates,
            vec![
                "https://leetcode-api-faisalshohag.vercel.app/octocat",
                "https://leetcode-stats-api.herokuapp.com/octocat",
                "https://leetcodestats.cyclic.app/octocat",
            ]
        );

        let github = service.request_for(Platform::GitHub, "octocat");
        assert_eq!(
            github.candidates,
            vec!["https://github-contributions.vercel.app/api/v1/octocat"]
        );
    }
}
