use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use revenda_core::pagination::PageRequest;
use revenda_sales::domain::repository::{
    SaleChanges, SaleRepository, VehicleCatalogPort, WebhookLogRepository,
};
use revenda_sales::domain::types::{
    PaymentMethod, Sale, SaleStatus, Vehicle, VehicleStatus, WebhookAttempt,
    generate_payment_code,
};
use revenda_sales::error::SalesServiceError;

/// A CPF that satisfies both check digits.
pub const VALID_CPF: &str = "52998224725";

// ── MemSaleStore ─────────────────────────────────────────────────────────────

/// In-memory sale store shared across use cases in one test.
#[derive(Clone, Default)]
pub struct MemSaleStore {
    sales: Arc<Mutex<Vec<Sale>>>,
}

impl MemSaleStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(sales: Vec<Sale>) -> Self {
        Self {
            sales: Arc::new(Mutex::new(sales)),
        }
    }

    pub fn get(&self, id: Uuid) -> Sale {
        self.sales
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.id == id)
            .cloned()
            .expect("sale should exist in store")
    }

    pub fn len(&self) -> usize {
        self.sales.lock().unwrap().len()
    }
}

impl SaleRepository for MemSaleStore {
    async fn create(&self, sale: &Sale) -> Result<(), SalesServiceError> {
        self.sales.lock().unwrap().push(sale.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Sale>, SalesServiceError> {
        Ok(self.sales.lock().unwrap().iter().find(|s| s.id == id).cloned())
    }

    async fn find_by_payment_code(&self, code: &str) -> Result<Option<Sale>, SalesServiceError> {
        Ok(self
            .sales
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.payment_code == code)
            .cloned())
    }

    async fn list_by_vehicle(&self, vehicle_id: &str) -> Result<Vec<Sale>, SalesServiceError> {
        Ok(self
            .sales
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.vehicle_id == vehicle_id)
            .cloned()
            .collect())
    }

    async fn list_by_cpf(&self, cpf: &str) -> Result<Vec<Sale>, SalesServiceError> {
        Ok(self
            .sales
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.buyer_cpf == cpf)
            .cloned()
            .collect())
    }

    async fn list_all(&self, page: PageRequest) -> Result<Vec<Sale>, SalesServiceError> {
        let page = page.clamped();
        Ok(self
            .sales
            .lock()
            .unwrap()
            .iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .cloned()
            .collect())
    }

    async fn update_fields(
        &self,
        id: Uuid,
        changes: SaleChanges,
    ) -> Result<Option<Sale>, SalesServiceError> {
        let mut guard = self.sales.lock().unwrap();
        let Some(sale) = guard.iter_mut().find(|s| s.id == id) else {
            return Ok(None);
        };
        if let Some(status) = changes.status {
            sale.status = status;
        }
        if let Some(approved_at) = changes.approved_at {
            sale.approved_at = approved_at;
        }
        if let Some(notified) = changes.webhook_notified {
            sale.webhook_notified = notified;
        }
        if let Some(attempts) = changes.webhook_attempts {
            sale.webhook_attempts = attempts;
        }
        sale.updated_at = Utc::now();
        Ok(Some(sale.clone()))
    }

    async fn set_status(
        &self,
        id: Uuid,
        status: SaleStatus,
        approved_at: Option<DateTime<Utc>>,
    ) -> Result<bool, SalesServiceError> {
        let mut guard = self.sales.lock().unwrap();
        match guard.iter_mut().find(|s| s.id == id) {
            Some(sale) => {
                sale.status = status;
                if approved_at.is_some() {
                    sale.approved_at = approved_at;
                }
                sale.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list_pending(&self, limit: u64) -> Result<Vec<Sale>, SalesServiceError> {
        let mut pending: Vec<Sale> = self
            .sales
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.status == SaleStatus::Pending)
            .cloned()
            .collect();
        pending.sort_by_key(|s| s.created_at);
        pending.truncate(limit as usize);
        Ok(pending)
    }

    async fn list_approved_unnotified(
        &self,
        limit: u64,
        max_attempts: i32,
    ) -> Result<Vec<Sale>, SalesServiceError> {
        let mut due: Vec<Sale> = self
            .sales
            .lock()
            .unwrap()
            .iter()
            .filter(|s| {
                s.status == SaleStatus::Approved
                    && !s.webhook_notified
                    && s.webhook_attempts < max_attempts
            })
            .cloned()
            .collect();
        due.sort_by_key(|s| s.approved_at);
        due.truncate(limit as usize);
        Ok(due)
    }

    async fn increment_webhook_attempts(&self, id: Uuid) -> Result<bool, SalesServiceError> {
        let mut guard = self.sales.lock().unwrap();
        match guard.iter_mut().find(|s| s.id == id) {
            Some(sale) => {
                sale.webhook_attempts += 1;
                sale.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn mark_webhook_notified(&self, id: Uuid) -> Result<bool, SalesServiceError> {
        let mut guard = self.sales.lock().unwrap();
        match guard.iter_mut().find(|s| s.id == id) {
            Some(sale) => {
                sale.webhook_notified = true;
                sale.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

// ── MemWebhookLog ────────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MemWebhookLog {
    attempts: Arc<Mutex<Vec<WebhookAttempt>>>,
}

impl MemWebhookLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared handle to the attempt list for post-execution inspection.
    pub fn handle(&self) -> Arc<Mutex<Vec<WebhookAttempt>>> {
        Arc::clone(&self.attempts)
    }
}

impl WebhookLogRepository for MemWebhookLog {
    async fn insert(&self, attempt: &WebhookAttempt) -> Result<(), SalesServiceError> {
        self.attempts.lock().unwrap().push(attempt.clone());
        Ok(())
    }

    async fn list_by_sale(&self, sale_id: Uuid) -> Result<Vec<WebhookAttempt>, SalesServiceError> {
        Ok(self
            .attempts
            .lock()
            .unwrap()
            .iter()
            .filter(|a| a.sale_id == sale_id)
            .cloned()
            .collect())
    }
}

// ── MockCatalog ──────────────────────────────────────────────────────────────

pub struct MockCatalog {
    pub vehicles: Vec<Vehicle>,
}

impl MockCatalog {
    pub fn single_for_sale(id: &str, price: &str) -> Self {
        Self {
            vehicles: vec![Vehicle {
                id: id.to_owned(),
                price: price.to_owned(),
                status: VehicleStatus::ForSale,
            }],
        }
    }
}

impl VehicleCatalogPort for MockCatalog {
    async fn find_by_id(&self, vehicle_id: &str) -> Result<Option<Vehicle>, SalesServiceError> {
        Ok(self.vehicles.iter().find(|v| v.id == vehicle_id).cloned())
    }
}

// ── Fixtures ─────────────────────────────────────────────────────────────────

pub fn test_sale(vehicle_id: &str, status: SaleStatus) -> Sale {
    let now = Utc::now();
    Sale {
        id: Uuid::new_v4(),
        vehicle_id: vehicle_id.to_owned(),
        buyer_cpf: VALID_CPF.to_owned(),
        amount_paid: "85000.00".parse().unwrap(),
        payment_method: PaymentMethod::Pix,
        status,
        payment_code: generate_payment_code(),
        created_at: now,
        updated_at: now,
        approved_at: (status == SaleStatus::Approved).then_some(now),
        webhook_notified: false,
        webhook_attempts: 0,
    }
}

/// Spin up a throwaway webhook receiver that answers every POST with
/// `status` and records received payloads. Returns its URL and the payload
/// log.
pub async fn webhook_receiver(
    status: axum::http::StatusCode,
) -> (String, Arc<Mutex<Vec<serde_json::Value>>>) {
    use axum::routing::post;

    let received: Arc<Mutex<Vec<serde_json::Value>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&received);
    let app = axum::Router::new().route(
        "/hook",
        post(move |axum::Json(body): axum::Json<serde_json::Value>| {
            let sink = Arc::clone(&sink);
            async move {
                sink.lock().unwrap().push(body);
                status
            }
        }),
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}/hook"), received)
}
