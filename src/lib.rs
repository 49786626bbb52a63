use axum::{
    http::{header, HeaderValue},
    response::Json,
    routing::get,
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{set_header::SetResponseHeaderLayer, trace::TraceLayer};

pub mod config;
pub mod errors;
pub mod fallback;
pub mod fetch;
pub mod handlers;
pub mod models;
pub mod normalize;
pub mod service;

use config::AppConfig;
use fetch::HttpFetcher;
use handlers::{contributions, stats};
use service::StatsService;

pub const ALLOWED_METHODS: &str = "GET,DELETE,PATCH,POST,PUT";
pub const ALLOWED_HEADERS: &str = "X-CSRF-Token, X-Requested-With, Accept, Accept-Version, Content-Length, Content-MD5, Content-Type, Date, X-Api-Version";

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub fetcher: HttpFetcher,
    pub stats: StatsService,
}

impl AppState {
    pub fn new(config: AppConfig) -> reqwest::Result<Self> {
        let config = Arc::new(config);
        let fetcher = HttpFetcher::new(&config.user_agent, config.fetch_timeout)?;
        let stats = StatsService::new(Arc::clone(&config), fetcher.clone());

        Ok(Self { config, fetcher, stats })
    }
}

pub fn app(state: AppState) -> Router {
    // Wildcard origin together with credentials, so the headers are written
    // directly rather than negotiated by a CORS layer.
    let cors_headers = ServiceBuilder::new()
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_CREDENTIALS,
            HeaderValue::from_static("true"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(ALLOWED_METHODS),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(ALLOWED_HEADERS),
        ));

    let api = Router::new()
        .route("/health", get(health_check))
        .merge(contributions::router())
        .nest("/stats", stats::router());

    Router::new()
        .nest("/api", api)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_headers),
        )
        .with_state(state)
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "folio-stats",
        "timestamp": chrono::Utc::now(),
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "contributions": "/api/github-contributions",
            "contributions_direct": "/api/github-contributions-direct/:username",
            "stats": "/api/stats/:platform",
            "refresh": "/api/stats/:platform/refresh",
            "health": "/api/health"
        }
    }))
}
