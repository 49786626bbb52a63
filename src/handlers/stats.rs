use axum::{
    extract::{Path, RawQuery, State},
    response::Json,
    routing::{get, post},
    Router,
};

use crate::errors::Result;
use crate::models::{Platform, StatsQuery, StatsSnapshot};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/:platform", get(get_stats))
        .route("/:platform/refresh", post(refresh_stats))
}

/// Latest snapshot for the platform, fetching one first if needed.
pub async fn get_stats(
    State(state): State<AppState>,
    Path(platform): Path<String>,
    RawQuery(raw): RawQuery,
) -> Result<Json<StatsSnapshot>> {
    let platform: Platform = platform.parse()?;
    let query = StatsQuery::from_raw(raw.as_deref());
    let snapshot = state.stats.current(platform, query.username.as_deref()).await;
    Ok(Json(snapshot))
}

pub async fn refresh_stats(
    State(state): State<AppState>,
    Path(platform): Path<String>,
    RawQuery(raw): RawQuery,
) -> Result<Json<StatsSnapshot>> {
    let platform: Platform = platform.parse()?;
    let query = StatsQuery::from_raw(raw.as_deref());
    let snapshot = state.stats.refresh(platform, query.username.as_deref()).await;
    Ok(Json(snapshot))
}
