#![allow(async_fn_in_trait)]

use chrono::{DateTime, Utc};
use uuid::Uuid;

use revenda_core::pagination::PageRequest;

use crate::domain::types::{Sale, SaleStatus, Vehicle, WebhookAttempt};
use crate::error::SalesServiceError;

/// Partial update applied through [`SaleRepository::update_fields`]. `None`
/// fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct SaleChanges {
    pub status: Option<SaleStatus>,
    pub approved_at: Option<Option<DateTime<Utc>>>,
    pub webhook_notified: Option<bool>,
    pub webhook_attempts: Option<i32>,
}

/// Repository for sale records. The store provides per-row consistency for
/// every single-record operation; the service adds no locking of its own.
pub trait SaleRepository: Send + Sync {
    async fn create(&self, sale: &Sale) -> Result<(), SalesServiceError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Sale>, SalesServiceError>;

    async fn find_by_payment_code(&self, code: &str) -> Result<Option<Sale>, SalesServiceError>;

    /// All sales for a vehicle, newest first.
    async fn list_by_vehicle(&self, vehicle_id: &str) -> Result<Vec<Sale>, SalesServiceError>;

    /// All sales for a buyer CPF, newest first.
    async fn list_by_cpf(&self, cpf: &str) -> Result<Vec<Sale>, SalesServiceError>;

    /// Paginated listing of every sale, newest first.
    async fn list_all(&self, page: PageRequest) -> Result<Vec<Sale>, SalesServiceError>;

    /// Apply a partial update. Returns the refreshed record, `None` if the
    /// sale does not exist.
    async fn update_fields(
        &self,
        id: Uuid,
        changes: SaleChanges,
    ) -> Result<Option<Sale>, SalesServiceError>;

    /// Transition a sale's status, optionally stamping the approval time.
    /// Returns `true` if a row was updated.
    async fn set_status(
        &self,
        id: Uuid,
        status: SaleStatus,
        approved_at: Option<DateTime<Utc>>,
    ) -> Result<bool, SalesServiceError>;

    /// Pending sales, oldest first, capped at `limit`.
    async fn list_pending(&self, limit: u64) -> Result<Vec<Sale>, SalesServiceError>;

    /// Approved sales not yet notified with fewer than `max_attempts`
    /// delivery attempts, oldest approval first, capped at `limit`.
    async fn list_approved_unnotified(
        &self,
        limit: u64,
        max_attempts: i32,
    ) -> Result<Vec<Sale>, SalesServiceError>;

    /// Bump the delivery attempt counter by one. Returns `true` if a row was
    /// updated.
    async fn increment_webhook_attempts(&self, id: Uuid) -> Result<bool, SalesServiceError>;

    /// Mark the sale as successfully notified. Returns `true` if a row was
    /// updated.
    async fn mark_webhook_notified(&self, id: Uuid) -> Result<bool, SalesServiceError>;
}

/// Append-only store for webhook delivery attempts.
pub trait WebhookLogRepository: Send + Sync {
    async fn insert(&self, attempt: &WebhookAttempt) -> Result<(), SalesServiceError>;

    /// Attempts for one sale, oldest first.
    async fn list_by_sale(&self, sale_id: Uuid) -> Result<Vec<WebhookAttempt>, SalesServiceError>;
}

/// Port for querying the vehicle catalog service.
pub trait VehicleCatalogPort: Send + Sync {
    async fn find_by_id(&self, vehicle_id: &str) -> Result<Option<Vehicle>, SalesServiceError>;
}
