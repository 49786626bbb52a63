use std::future::Future;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use serde_json::Value;
use tracing::{debug, info, warn};
use url::Url;

use crate::models::StatsRequest;

/// Why a single candidate endpoint was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CandidateError {
    #[error("request failed: {0}")]
    Transport(String),

    #[error("HTTP error! status: {0}")]
    Status(u16),

    #[error("invalid JSON body: {0}")]
    Decode(String),

    #[error("{0}")]
    Unusable(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateFailure {
    pub endpoint: String,
    pub error: CandidateError,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("no candidate endpoints configured")]
    NoCandidates,

    #[error("all {} candidate endpoints failed", .failures.len())]
    Exhausted { failures: Vec<CandidateFailure> },
}

impl FetchError {
    pub fn last_failure(&self) -> Option<&CandidateFailure> {
        match self {
            FetchError::NoCandidates => None,
            FetchError::Exhausted { failures } => failures.last(),
        }
    }

    /// Short reason suitable for an advisory message.
    pub fn reason(&self) -> String {
        match self.last_failure() {
            Some(failure) => failure.error.to_string(),
            None => self.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FetchOutcome {
    pub endpoint: String,
    pub payload: Value,
    /// Number of candidates tried, including the successful one.
    pub attempts: usize,
}

/// Tries each candidate once, in order, and stops at the first success.
pub async fn first_success<F, Fut>(candidates: &[String], mut fetch: F) -> Result<FetchOutcome, FetchError>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<Value, CandidateError>>,
{
    if candidates.is_empty() {
        return Err(FetchError::NoCandidates);
    }

    let mut failures = Vec::new();
    for (index, endpoint) in candidates.iter().enumerate() {
        debug!("Trying API: {}", endpoint);
        match fetch(endpoint.clone()).await {
            Ok(payload) => {
                info!("Success with API: {}", endpoint);
                return Ok(FetchOutcome {
                    endpoint: endpoint.clone(),
                    payload,
                    attempts: index + 1,
                });
            }
            Err(error) => {
                warn!("Failed with {}: {}", endpoint, error);
                failures.push(CandidateFailure {
                    endpoint: endpoint.clone(),
                    error,
                });
            }
        }
    }

    Err(FetchError::Exhausted { failures })
}

/// Appends path segments to a base URL, percent-encoding each one.
pub fn endpoint_url(base: &str, segments: &[&str]) -> Result<Url, url::ParseError> {
    let mut url = Url::parse(base)?;
    {
        let mut path = url
            .path_segments_mut()
            .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?;
        path.pop_if_empty();
        path.extend(segments);
    }
    Ok(url)
}

/// Shared HTTP client for every upstream call.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(user_agent: &str, timeout: Duration) -> reqwest::Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .user_agent(user_agent.to_string())
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self { client })
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    /// One GET attempt: 2xx with a JSON body, or a candidate failure.
    pub async fn get_json(&self, url: String) -> Result<Value, CandidateError> {
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| CandidateError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CandidateError::Status(status.as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| CandidateError::Transport(e.to_string()))?;

        serde_json::from_slice(&body).map_err(|e| CandidateError::Decode(e.to_string()))
    }

    pub async fn fetch(&self, request: &StatsRequest) -> Result<FetchOutcome, FetchError> {
        debug!(
            "Fetching {} stats for {} ({} candidates)",
            request.platform,
            request.username,
            request.candidates.len()
        );
        first_success(&request.candidates, |url| self.get_json(url)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    fn urls(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| format!("https://{name}.example")).collect()
    }

    #[tokio::test]
    async fn third_candidate_wins_after_two_failures() {
        let candidates = urls(&["first", "second", "third"]);
        let calls = Arc::new(Mutex::new(Vec::new()));

        let recorder = Arc::clone(&calls);
        let outcome = first_success(&candidates, move |url: String| {
            let recorder = Arc::clone(&recorder);
            async move {
                recorder.lock().unwrap().push(url.clone());
                if url.contains("first") {
                    Err(CandidateError::Transport("connection refused".into()))
                } else if url.contains("second") {
                    Err(CandidateError::Status(503))
                } else {
                    Ok(json!({"totalSolved": 300}))
                }
            }
        })
        .await
        .unwrap();

        assert_eq!(outcome.payload, json!({"totalSolved": 300}));
        assert_eq!(outcome.endpoint, candidates[2]);
        assert_eq!(outcome.attempts, 3);
        assert_eq!(*calls.lock().unwrap(), candidates);
    }

    #[tokio::test]
    async fn first_success_stops_trying() {
        let candidates = urls(&["first", "second"]);
        let calls = Arc::new(Mutex::new(0usize));

        let counter = Arc::clone(&calls);
        let outcome = first_success(&candidates, move |_url: String| {
            let counter = Arc::clone(&counter);
            async move {
                *counter.lock().unwrap() += 1;
                Ok(json!({"ok": true}))
            }
        })
        .await
        .unwrap();

        assert_eq!(outcome.endpoint, candidates[0]);
        assert_eq!(outcome.attempts, 1);
        assert_eq!(*calls.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn exhaustion_reports_every_failure_in_order() {
        let candidates = urls(&["a", "b", "c"]);

        let error = first_success(&candidates, |url: String| async move {
            if url.contains("b") {
                Err(CandidateError::Decode("expected value at line 1 column 1".into()))
            } else {
                Err(CandidateError::Status(500))
            }
        })
        .await
        .unwrap_err();

        let FetchError::Exhausted { failures } = &error else {
            panic!("expected exhaustion, got {error:?}");
        };
        assert_eq!(failures.len(), 3);
        assert_eq!(failures[0].endpoint, candidates[0]);
        assert!(matches!(failures[1].error, CandidateError::Decode(_)));
        assert_eq!(error.reason(), "HTTP error! status: 500");
    }

    #[tokio::test]
    async fn empty_candidate_list_is_rejected() {
        let error = first_success(&[], |_url: String| async move { Ok(json!({})) })
            .await
            .unwrap_err();
        assert_eq!(error, FetchError::NoCandidates);
        assert!(error.last_failure().is_none());
    }

    #[test]
    fn endpoint_url_appends_encoded_segments() {
        let url = endpoint_url("https://github-contributions.vercel.app/api/v1", &["octocat"]).unwrap();
        assert_eq!(url.as_str(), "https://github-contributions.vercel.app/api/v1/octocat");

        let trailing = endpoint_url("https://api.example/", &["users", "a b"]).unwrap();
        assert_eq!(trailing.as_str(), "https://api.example/users/a%20b");

        let slash = endpoint_url("https://api.example", &["x/y"]).unwrap();
        assert_eq!(slash.as_str(), "https://api.example/x%2Fy");

        assert!(endpoint_url("not a url", &["x"]).is_err());
    }
}
