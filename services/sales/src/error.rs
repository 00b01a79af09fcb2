use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use rust_decimal::Decimal;

/// Sales service domain error variants.
///
/// Validation errors are rejected before any mutation; domain conflicts
/// after lookups but before mutation. Delivery failures are never surfaced
/// here — the webhook engine folds them into its boolean outcome.
#[derive(Debug, thiserror::Error)]
pub enum SalesServiceError {
    #[error("invalid buyer CPF")]
    InvalidCpf,
    #[error("amount paid must be greater than zero")]
    InvalidAmount,
    #[error("amount paid ({paid}) does not match the vehicle price ({price})")]
    AmountMismatch { paid: Decimal, price: Decimal },
    #[error("vehicle price could not be read as a decimal amount")]
    PriceConversion,
    #[error("vehicle not found")]
    VehicleNotFound,
    #[error("vehicle is not available for sale")]
    VehicleUnavailable,
    #[error("vehicle has already been sold")]
    VehicleAlreadySold,
    #[error("sale not found")]
    SaleNotFound,
    #[error("sale has already been processed")]
    AlreadyProcessed,
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl SalesServiceError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidCpf => "INVALID_CPF",
            Self::InvalidAmount => "INVALID_AMOUNT",
            Self::AmountMismatch { .. } => "AMOUNT_MISMATCH",
            Self::PriceConversion => "PRICE_CONVERSION",
            Self::VehicleNotFound => "VEHICLE_NOT_FOUND",
            Self::VehicleUnavailable => "VEHICLE_UNAVAILABLE",
            Self::VehicleAlreadySold => "VEHICLE_ALREADY_SOLD",
            Self::SaleNotFound => "SALE_NOT_FOUND",
            Self::AlreadyProcessed => "SALE_ALREADY_PROCESSED",
            Self::Internal(_) => "INTERNAL",
        }
    }
}

impl IntoResponse for SalesServiceError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::InvalidCpf
            | Self::InvalidAmount
            | Self::AmountMismatch { .. }
            | Self::PriceConversion => StatusCode::BAD_REQUEST,
            Self::VehicleNotFound | Self::SaleNotFound => StatusCode::NOT_FOUND,
            Self::VehicleUnavailable | Self::VehicleAlreadySold | Self::AlreadyProcessed => {
                StatusCode::CONFLICT
            }
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if let Self::Internal(ref e) = self {
            tracing::error!(error = %e, kind = "INTERNAL", "internal error");
        }
        let body = serde_json::json!({
            "kind": self.kind(),
            "message": self.to_string(),
        });
        (status, axum::Json(body)).into_response()
    }
}
