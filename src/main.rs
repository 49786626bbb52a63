use std::net::SocketAddr;

use tracing::info;
use tracing_subscriber::EnvFilter;

use folio_stats::{app, config::AppConfig, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("folio_stats=info,tower_http=info,info")),
        )
        .init();

    let config = AppConfig::from_env();
    let addr = format!("{}:{}", config.host, config.port);

    info!(
        "🔗 Upstreams: contributions={} github={} leetcode={} gfg={}",
        config.contributions_api_url,
        config.github_api_url,
        config.leetcode_api_urls.len(),
        config.gfg_api_urls.len()
    );

    let state = AppState::new(config)?;
    let app = app(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("🚀 Server starting on http://{}", listener.local_addr()?);

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await?;

    Ok(())
}
