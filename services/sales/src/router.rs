use axum::{
    Router,
    routing::{delete, get, post},
};

use revenda_core::health::{healthz, readyz};
use revenda_core::middleware::request_id_layer;

use crate::handlers::{
    payment::{process_webhooks, resolve_payment},
    sale::{cancel_sale, create_sale, get_sale, list_sales, list_webhook_attempts},
};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Sales
        .route("/sales", post(create_sale))
        .route("/sales", get(list_sales))
        .route("/sales/{id}", get(get_sale))
        .route("/sales/{id}", delete(cancel_sale))
        .route("/sales/{id}/webhook-attempts", get(list_webhook_attempts))
        // Payment-provider callback
        .route("/webhook/payment", post(resolve_payment))
        // Operations
        .route("/admin/webhook/process", post(process_webhooks))
        .layer(request_id_layer())
        .with_state(state)
}
