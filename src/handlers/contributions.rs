use axum::{
    extract::{Path, RawQuery, State},
    http::header::{CACHE_CONTROL, CONTENT_TYPE},
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde_json::Value;
use tracing::{debug, info};
use validator::Validate;

use crate::errors::{AppError, Result};
use crate::fetch::endpoint_url;
use crate::models::ContributionsQuery;
use crate::AppState;

pub const CONTRIBUTIONS_CACHE_CONTROL: &str = "s-maxage=3600, stale-while-revalidate";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/github-contributions", get(github_contributions))
        .route("/github-contributions-direct/:username", get(relay_direct))
}

/// Same-origin proxy for the contribution graph.
pub async fn github_contributions(
    State(state): State<AppState>,
    RawQuery(raw): RawQuery,
) -> Result<Response> {
    let query = ContributionsQuery::from_raw(raw.as_deref());
    let username = query
        .username
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .ok_or_else(|| AppError::BadRequest("Username is required".to_string()))?;

    query
        .validate()
        .map_err(|e| AppError::BadRequest(format!("Validation error: {}", e)))?;

    let url = endpoint_url(&state.config.contributions_api_url, &[username]).map_err(AppError::proxy)?;
    debug!("Proxying contributions for {} via {}", username, url);

    let response = state
        .fetcher
        .client()
        .get(url)
        .send()
        .await
        .map_err(AppError::proxy)?;

    let status = response.status();
    if !status.is_success() {
        return Err(AppError::Upstream(status));
    }

    let body: Value = response.json().await.map_err(AppError::proxy)?;
    info!("✅ Contributions for {} served", username);

    Ok(([(CACHE_CONTROL, CONTRIBUTIONS_CACHE_CONTROL)], Json(body)).into_response())
}

// Mirrors the deployment rewrite: status, content type and body pass through untouched.
pub async fn relay_direct(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Response> {
    let url = endpoint_url(&state.config.contributions_api_url, &[username.as_str()]).map_err(AppError::proxy)?;

    let upstream = state
        .fetcher
        .client()
        .get(url)
        .send()
        .await
        .map_err(AppError::proxy)?;

    let status = upstream.status();
    let content_type = upstream.headers().get(CONTENT_TYPE).cloned();
    let body = upstream.bytes().await.map_err(AppError::proxy)?;

    let mut response = (status, body).into_response();
    if let Some(content_type) = content_type {
        response.headers_mut().insert(CONTENT_TYPE, content_type);
    }
    Ok(response)
}
