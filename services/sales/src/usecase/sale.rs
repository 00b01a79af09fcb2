use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use revenda_core::pagination::PageRequest;

use crate::domain::repository::{SaleChanges, SaleRepository, VehicleCatalogPort};
use crate::domain::types::{
    PaymentMethod, Sale, SaleStatus, generate_payment_code, validate_cpf,
};
use crate::error::SalesServiceError;

/// Difference between amount paid and the listed price that still counts as
/// an exact payment.
const AMOUNT_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2); // 0.01

// ── CreateSale ───────────────────────────────────────────────────────────────

pub struct CreateSaleInput {
    pub vehicle_id: String,
    pub buyer_cpf: String,
    pub amount_paid: Decimal,
    pub payment_method: PaymentMethod,
}

pub struct CreateSaleUseCase<S: SaleRepository, V: VehicleCatalogPort> {
    pub sales: S,
    pub vehicles: V,
}

impl<S: SaleRepository, V: VehicleCatalogPort> CreateSaleUseCase<S, V> {
    pub async fn execute(&self, input: CreateSaleInput) -> Result<Sale, SalesServiceError> {
        if !validate_cpf(&input.buyer_cpf) {
            return Err(SalesServiceError::InvalidCpf);
        }
        if input.amount_paid <= Decimal::ZERO {
            return Err(SalesServiceError::InvalidAmount);
        }

        let vehicle = self
            .vehicles
            .find_by_id(&input.vehicle_id)
            .await?
            .ok_or(SalesServiceError::VehicleNotFound)?;
        if !vehicle.status.is_for_sale() {
            return Err(SalesServiceError::VehicleUnavailable);
        }

        let price: Decimal = vehicle
            .price
            .trim()
            .parse()
            .map_err(|_| SalesServiceError::PriceConversion)?;
        if (input.amount_paid - price).abs() > AMOUNT_TOLERANCE {
            return Err(SalesServiceError::AmountMismatch {
                paid: input.amount_paid,
                price,
            });
        }

        // One approved sale per vehicle. Rejected, canceled and still-pending
        // sales do not block a new attempt.
        let existing = self.sales.list_by_vehicle(&input.vehicle_id).await?;
        if existing.iter().any(|s| s.status == SaleStatus::Approved) {
            return Err(SalesServiceError::VehicleAlreadySold);
        }

        let now = Utc::now();
        let sale = Sale {
            id: Uuid::new_v4(),
            vehicle_id: input.vehicle_id,
            buyer_cpf: input.buyer_cpf,
            amount_paid: input.amount_paid,
            payment_method: input.payment_method,
            status: SaleStatus::Pending,
            payment_code: generate_payment_code(),
            created_at: now,
            updated_at: now,
            approved_at: None,
            webhook_notified: false,
            webhook_attempts: 0,
        };
        self.sales.create(&sale).await?;
        Ok(sale)
    }
}

// ── GetSale ──────────────────────────────────────────────────────────────────

pub struct GetSaleUseCase<S: SaleRepository> {
    pub sales: S,
}

impl<S: SaleRepository> GetSaleUseCase<S> {
    pub async fn execute(&self, id: Uuid) -> Result<Sale, SalesServiceError> {
        self.sales
            .find_by_id(id)
            .await?
            .ok_or(SalesServiceError::SaleNotFound)
    }
}

// ── ListSales ────────────────────────────────────────────────────────────────

pub struct ListSalesByVehicleUseCase<S: SaleRepository> {
    pub sales: S,
}

impl<S: SaleRepository> ListSalesByVehicleUseCase<S> {
    pub async fn execute(&self, vehicle_id: &str) -> Result<Vec<Sale>, SalesServiceError> {
        self.sales.list_by_vehicle(vehicle_id).await
    }
}

pub struct ListSalesByCpfUseCase<S: SaleRepository> {
    pub sales: S,
}

impl<S: SaleRepository> ListSalesByCpfUseCase<S> {
    pub async fn execute(&self, cpf: &str) -> Result<Vec<Sale>, SalesServiceError> {
        if !validate_cpf(cpf) {
            return Err(SalesServiceError::InvalidCpf);
        }
        self.sales.list_by_cpf(cpf).await
    }
}

pub struct ListSalesUseCase<S: SaleRepository> {
    pub sales: S,
}

impl<S: SaleRepository> ListSalesUseCase<S> {
    pub async fn execute(&self, page: PageRequest) -> Result<Vec<Sale>, SalesServiceError> {
        self.sales.list_all(page.clamped()).await
    }
}

// ── CancelSale ───────────────────────────────────────────────────────────────

pub struct CancelSaleUseCase<S: SaleRepository> {
    pub sales: S,
}

impl<S: SaleRepository> CancelSaleUseCase<S> {
    /// Cancel a sale that has not been resolved yet. Approved, rejected and
    /// already-canceled sales are immutable here.
    pub async fn execute(&self, id: Uuid) -> Result<Sale, SalesServiceError> {
        let sale = self
            .sales
            .find_by_id(id)
            .await?
            .ok_or(SalesServiceError::SaleNotFound)?;
        if sale.status.is_terminal() {
            return Err(SalesServiceError::AlreadyProcessed);
        }
        self.sales
            .update_fields(
                id,
                SaleChanges {
                    status: Some(SaleStatus::Canceled),
                    ..Default::default()
                },
            )
            .await?
            .ok_or(SalesServiceError::SaleNotFound)
    }
}
