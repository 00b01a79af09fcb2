use std::future::Future;

use sea_orm::DatabaseConnection;

use crate::config::SalesConfig;
use crate::domain::types::ApprovalPolicy;
use crate::error::SalesServiceError;
use crate::infra::db::{DbSaleRepository, DbWebhookLogRepository};
use crate::infra::vehicles::HttpVehicleCatalog;
use crate::jobs::scheduler::Sweeper;
use crate::usecase::sweep::{ReconciliationSweep, SweepReport};
use crate::usecase::webhook::WebhookNotifier;

/// The production reconciliation pass, wired to the database-backed
/// repositories.
pub type DbReconciliationSweep = ReconciliationSweep<DbSaleRepository, DbWebhookLogRepository>;

impl Sweeper for DbReconciliationSweep {
    fn sweep(&self) -> impl Future<Output = Result<SweepReport, SalesServiceError>> + Send {
        self.run_once()
    }
}

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub http: reqwest::Client,
    pub vehicle_catalog_url: String,
    pub webhook_url: String,
    pub approval_policy: ApprovalPolicy,
}

impl AppState {
    pub fn new(db: DatabaseConnection, config: &SalesConfig) -> Self {
        Self {
            db,
            http: reqwest::Client::new(),
            vehicle_catalog_url: config.vehicle_catalog_url.clone(),
            webhook_url: config.webhook_url.clone(),
            approval_policy: config.approval_policy(),
        }
    }

    pub fn sale_repo(&self) -> DbSaleRepository {
        DbSaleRepository {
            db: self.db.clone(),
        }
    }

    pub fn webhook_log_repo(&self) -> DbWebhookLogRepository {
        DbWebhookLogRepository {
            db: self.db.clone(),
        }
    }

    pub fn vehicle_catalog(&self) -> HttpVehicleCatalog {
        HttpVehicleCatalog::new(self.http.clone(), self.vehicle_catalog_url.clone())
    }

    pub fn webhook_notifier(&self) -> WebhookNotifier<DbWebhookLogRepository> {
        WebhookNotifier::new(
            self.http.clone(),
            self.webhook_url.clone(),
            self.webhook_log_repo(),
        )
    }

    pub fn reconciliation_sweep(&self) -> DbReconciliationSweep {
        ReconciliationSweep::new(
            self.sale_repo(),
            self.approval_policy,
            self.webhook_notifier(),
        )
    }
}
