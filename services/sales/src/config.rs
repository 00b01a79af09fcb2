use crate::domain::types::ApprovalPolicy;

/// Sales service configuration loaded from environment variables.
#[derive(Debug)]
pub struct SalesConfig {
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// TCP port for the HTTP server (default 3001). Env var: `SALES_PORT`.
    pub sales_port: u16,
    /// Base URL of the vehicle catalog service (default
    /// "http://localhost:3000"). Env var: `VEHICLE_CATALOG_URL`.
    pub vehicle_catalog_url: String,
    /// Webhook endpoint notified of approved sales. Env var: `WEBHOOK_URL`;
    /// defaults to `<catalog>/api/webhook/payment`.
    pub webhook_url: String,
    /// Reconciliation interval in seconds (default 10). Env var:
    /// `SWEEP_INTERVAL_SECS`.
    pub sweep_interval_secs: u64,
    /// Auto-approve pending sales on each sweep (default false). Demo
    /// shortcut only. Env var: `AUTO_APPROVE_PENDING`.
    pub auto_approve_pending: bool,
}

impl SalesConfig {
    pub fn from_env() -> Self {
        let vehicle_catalog_url = std::env::var("VEHICLE_CATALOG_URL")
            .unwrap_or_else(|_| "http://localhost:3000".to_owned());
        let webhook_url = std::env::var("WEBHOOK_URL")
            .unwrap_or_else(|_| format!("{vehicle_catalog_url}/api/webhook/payment"));
        Self {
            database_url: std::env::var("DATABASE_URL").expect("DATABASE_URL"),
            sales_port: std::env::var("SALES_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3001),
            vehicle_catalog_url,
            webhook_url,
            sweep_interval_secs: std::env::var("SWEEP_INTERVAL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),
            auto_approve_pending: std::env::var("AUTO_APPROVE_PENDING")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
        }
    }

    pub fn approval_policy(&self) -> ApprovalPolicy {
        if self.auto_approve_pending {
            ApprovalPolicy::AutoApprove
        } else {
            ApprovalPolicy::RequireConfirmation
        }
    }
}
