use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use revenda_core::pagination::PageRequest;

use crate::domain::types::{PaymentMethod, Sale, SaleStatus, WebhookAttempt};
use crate::error::SalesServiceError;
use crate::state::AppState;
use crate::usecase::sale::{
    CancelSaleUseCase, CreateSaleInput, CreateSaleUseCase, GetSaleUseCase, ListSalesByCpfUseCase,
    ListSalesByVehicleUseCase, ListSalesUseCase,
};

// ── Response types ───────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct SaleResponse {
    pub id: String,
    pub vehicle_id: String,
    pub buyer_cpf: String,
    pub amount_paid: Decimal,
    pub payment_method: PaymentMethod,
    pub status: SaleStatus,
    pub payment_code: String,
    #[serde(serialize_with = "revenda_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[serde(serialize_with = "revenda_core::serde::to_rfc3339_ms")]
    pub updated_at: chrono::DateTime<chrono::Utc>,
    pub approved_at: Option<String>,
    pub webhook_notified: bool,
    pub webhook_attempts: i32,
}

impl From<Sale> for SaleResponse {
    fn from(sale: Sale) -> Self {
        Self {
            id: sale.id.to_string(),
            vehicle_id: sale.vehicle_id,
            buyer_cpf: sale.buyer_cpf,
            amount_paid: sale.amount_paid,
            payment_method: sale.payment_method,
            status: sale.status,
            payment_code: sale.payment_code,
            created_at: sale.created_at,
            updated_at: sale.updated_at,
            approved_at: sale
                .approved_at
                .as_ref()
                .map(revenda_core::serde::rfc3339_ms),
            webhook_notified: sale.webhook_notified,
            webhook_attempts: sale.webhook_attempts,
        }
    }
}

// ── POST /sales ──────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CreateSaleRequest {
    pub vehicle_id: String,
    pub buyer_cpf: String,
    pub amount_paid: Decimal,
    pub payment_method: PaymentMethod,
}

pub async fn create_sale(
    State(state): State<AppState>,
    Json(body): Json<CreateSaleRequest>,
) -> Result<(StatusCode, Json<SaleResponse>), SalesServiceError> {
    let usecase = CreateSaleUseCase {
        sales: state.sale_repo(),
        vehicles: state.vehicle_catalog(),
    };
    let sale = usecase
        .execute(CreateSaleInput {
            vehicle_id: body.vehicle_id,
            buyer_cpf: body.buyer_cpf,
            amount_paid: body.amount_paid,
            payment_method: body.payment_method,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(sale.into())))
}

// ── GET /sales/{id} ──────────────────────────────────────────────────────────

pub async fn get_sale(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SaleResponse>, SalesServiceError> {
    let usecase = GetSaleUseCase {
        sales: state.sale_repo(),
    };
    let sale = usecase.execute(id).await?;
    Ok(Json(sale.into()))
}

// ── GET /sales ───────────────────────────────────────────────────────────────

#[derive(Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub struct ListSalesQuery {
    pub cpf: Option<String>,
    pub vehicle_id: Option<String>,
    pub per_page: Option<u32>,
    pub page: Option<u32>,
}

pub async fn list_sales(
    State(state): State<AppState>,
    Query(query): Query<ListSalesQuery>,
) -> Result<Json<Vec<SaleResponse>>, SalesServiceError> {
    let sales = if let Some(vehicle_id) = query.vehicle_id {
        ListSalesByVehicleUseCase {
            sales: state.sale_repo(),
        }
        .execute(&vehicle_id)
        .await?
    } else if let Some(cpf) = query.cpf {
        ListSalesByCpfUseCase {
            sales: state.sale_repo(),
        }
        .execute(&cpf)
        .await?
    } else {
        ListSalesUseCase {
            sales: state.sale_repo(),
        }
        .execute(PageRequest::from_parts(query.per_page, query.page))
        .await?
    };
    Ok(Json(sales.into_iter().map(SaleResponse::from).collect()))
}

// ── DELETE /sales/{id} ───────────────────────────────────────────────────────

pub async fn cancel_sale(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SaleResponse>, SalesServiceError> {
    let usecase = CancelSaleUseCase {
        sales: state.sale_repo(),
    };
    let sale = usecase.execute(id).await?;
    Ok(Json(sale.into()))
}

// ── GET /sales/{id}/webhook-attempts ─────────────────────────────────────────

#[derive(Serialize)]
pub struct WebhookAttemptResponse {
    pub url: String,
    pub payload: serde_json::Value,
    pub status_code: i32,
    pub response: Option<String>,
    #[serde(serialize_with = "revenda_core::serde::to_rfc3339_ms")]
    pub attempted_at: chrono::DateTime<chrono::Utc>,
    pub success: bool,
}

impl From<WebhookAttempt> for WebhookAttemptResponse {
    fn from(attempt: WebhookAttempt) -> Self {
        Self {
            url: attempt.url,
            payload: attempt.payload,
            status_code: attempt.status_code,
            response: attempt.response,
            attempted_at: attempt.attempted_at,
            success: attempt.success,
        }
    }
}

/// Operational view of the attempt log: a sale that silently exhausted its
/// retry budget is only visible here.
pub async fn list_webhook_attempts(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<WebhookAttemptResponse>>, SalesServiceError> {
    use crate::domain::repository::{SaleRepository, WebhookLogRepository};

    let repo = state.sale_repo();
    if repo.find_by_id(id).await?.is_none() {
        return Err(SalesServiceError::SaleNotFound);
    }
    let attempts = state.webhook_log_repo().list_by_sale(id).await?;
    Ok(Json(
        attempts.into_iter().map(WebhookAttemptResponse::from).collect(),
    ))
}
