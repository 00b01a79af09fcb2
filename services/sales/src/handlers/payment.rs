use axum::{Json, extract::State};
use serde::Deserialize;

use crate::domain::types::PaymentOutcome;
use crate::error::SalesServiceError;
use crate::handlers::sale::SaleResponse;
use crate::state::AppState;
use crate::usecase::payment::ResolvePaymentUseCase;
use crate::usecase::sweep::SweepReport;

// ── POST /webhook/payment ────────────────────────────────────────────────────

/// Callback body sent by the payment provider. `payment_code` is the
/// idempotency key issued at sale creation.
#[derive(Deserialize)]
pub struct PaymentCallbackRequest {
    pub payment_code: String,
    pub status: PaymentOutcome,
}

pub async fn resolve_payment(
    State(state): State<AppState>,
    Json(body): Json<PaymentCallbackRequest>,
) -> Result<Json<SaleResponse>, SalesServiceError> {
    let usecase = ResolvePaymentUseCase {
        sales: state.sale_repo(),
    };
    let sale = usecase.execute(&body.payment_code, body.status).await?;
    Ok(Json(sale.into()))
}

// ── POST /admin/webhook/process ──────────────────────────────────────────────

/// On-demand reconciliation pass, outside the scheduler's timer.
pub async fn process_webhooks(
    State(state): State<AppState>,
) -> Result<Json<SweepReport>, SalesServiceError> {
    let report = state.reconciliation_sweep().run_once().await?;
    Ok(Json(report))
}
