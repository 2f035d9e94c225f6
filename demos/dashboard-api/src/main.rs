mod error;
mod routes;
mod state;

use std::sync::Arc;
use std::time::Duration;

use axum::routing::get;
use axum::Router;
use paydash_sdk::{AsyncDashboardSdk, DashboardConfig};
use tower_http::cors::CorsLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = DashboardConfig::from_env()?;
    let currency = config.currency.clone();

    info!("initializing dashboard SDK");
    let sdk = AsyncDashboardSdk::builder()
        .config(config)
        .load_timeout(Duration::from_secs(30))
        .build()
        .await?;
    info!("SDK ready");

    let state = Arc::new(AppState { sdk, currency });

    let app = Router::new()
        .route("/api/dashboard", get(routes::dashboard::get_dashboard))
        .route(
            "/api/transactions/recent",
            get(routes::dashboard::recent_transactions),
        )
        .route("/api/customers", get(routes::directory::list_customers))
        .route("/api/merchants", get(routes::directory::list_merchants))
        .route(
            "/api/merchants/{id}/performance",
            get(routes::directory::merchant_performance),
        )
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr = "0.0.0.0:3000";
    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
