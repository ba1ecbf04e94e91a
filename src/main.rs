use std::sync::Arc;

use anyhow::Context;
use tower_http::cors::CorsLayer;

use pro_onboard::config::ServiceConfig;
use pro_onboard::onboarding::{GateRouteState, OnboardingGate, onboarding_routes};
use pro_onboard::store::{Database, LibSqlBackend};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = ServiceConfig::from_env();

    eprintln!("Pro Onboard v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   API: http://{}/api/onboarding", config.bind_addr);
    eprintln!("   Database: {}", config.db_path.display());

    // ── Database ─────────────────────────────────────────────────────────
    let db: Arc<dyn Database> = Arc::new(
        LibSqlBackend::new_local(&config.db_path)
            .await
            .with_context(|| format!("Failed to open database at {}", config.db_path.display()))?,
    );

    // ── Gate + HTTP surface ─────────────────────────────────────────────
    let gate = Arc::new(OnboardingGate::new(db));
    let app = onboarding_routes(GateRouteState { gate }).layer(CorsLayer::permissive());

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;
    tracing::info!(addr = %config.bind_addr, "Onboarding gate listening");

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
