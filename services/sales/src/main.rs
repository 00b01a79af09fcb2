use std::time::Duration;

use sea_orm::Database;
use tracing::{info, warn};

use revenda_core::tracing::init_tracing;
use revenda_sales::config::SalesConfig;
use revenda_sales::domain::types::ApprovalPolicy;
use revenda_sales::jobs::scheduler::ReconciliationScheduler;
use revenda_sales::router::build_router;
use revenda_sales::state::AppState;

#[tokio::main]
async fn main() {
    init_tracing();

    let config = SalesConfig::from_env();

    let db = Database::connect(&config.database_url)
        .await
        .expect("failed to connect to database");

    let state = AppState::new(db, &config);

    if state.approval_policy == ApprovalPolicy::AutoApprove {
        warn!(
            "AUTO_APPROVE_PENDING is enabled: pending sales are approved without a \
             payment-confirmation signal; do not run this in production"
        );
    }

    // Background reconciliation: pending resolution + webhook delivery.
    let scheduler = ReconciliationScheduler::new(state.reconciliation_sweep());
    scheduler.start(Duration::from_secs(config.sweep_interval_secs));

    // HTTP server
    let router = build_router(state);
    let http_addr = format!("0.0.0.0:{}", config.sales_port);
    let listener = tokio::net::TcpListener::bind(&http_addr)
        .await
        .expect("failed to bind");

    info!("sales service listening on {http_addr}");
    axum::serve(listener, router).await.expect("server error");
}
