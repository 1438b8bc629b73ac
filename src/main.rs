use std::sync::Arc;

use anyhow::Result;
use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;
use tracing::{info, Level};
use tracing_subscriber::fmt::format::FmtSpan;

use ridelink_admin::{
    AdminConfig, DatabasePool, OutlierService, RankingService, RecalculationOrchestrator,
    TrustApiState,
};

#[tokio::main]
async fn main() -> Result<()> {
    let config = AdminConfig::from_env().map_err(|e| {
        eprintln!("Configuration error: {}", e);
        e
    })?;

    init_logging(&config)?;

    info!("Starting RideLink trust score engine");

    let db = Arc::new(
        DatabasePool::new(
            &config.database.postgres_url,
            config.database.max_connections,
        )
        .await?,
    );
    db.init_schema().await?;

    let stats = db.stats();
    let ranking = Arc::new(RankingService::new(stats.clone()));
    let outliers = Arc::new(OutlierService::new(stats.clone()));
    let recalc = Arc::new(RecalculationOrchestrator::new(stats.clone(), db.audit()));

    let app = Router::new()
        .merge(ridelink_admin::create_trust_router(TrustApiState {
            stats,
            ranking,
            outliers,
            recalc,
        }))
        .route("/health", get(|| async { "OK" }))
        .layer(TraceLayer::new_for_http());

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind to {}: {}", bind_addr, e))?;

    info!("Trust engine listening on {}", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

fn init_logging(config: &AdminConfig) -> Result<()> {
    let log_level = match config.logging.level.to_lowercase().as_str() {
        "error" => Level::ERROR,
        "warn" => Level::WARN,
        "info" => Level::INFO,
        "debug" => Level::DEBUG,
        "trace" => Level::TRACE,
        _ => Level::INFO,
    };

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_span_events(if config.logging.log_requests {
            FmtSpan::NEW | FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        })
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to set logging subscriber: {}", e))?;

    Ok(())
}
