use chrono::Utc;

use crate::domain::repository::SaleRepository;
use crate::domain::types::{PaymentOutcome, Sale, SaleStatus};
use crate::error::SalesServiceError;

// ── ResolvePayment ───────────────────────────────────────────────────────────

/// Applies a payment-provider callback to the sale identified by its payment
/// code. Terminal statuses reject re-resolution, which makes duplicate
/// callbacks safe.
pub struct ResolvePaymentUseCase<S: SaleRepository> {
    pub sales: S,
}

impl<S: SaleRepository> ResolvePaymentUseCase<S> {
    pub async fn execute(
        &self,
        payment_code: &str,
        outcome: PaymentOutcome,
    ) -> Result<Sale, SalesServiceError> {
        let sale = self
            .sales
            .find_by_payment_code(payment_code)
            .await?
            .ok_or(SalesServiceError::SaleNotFound)?;

        if !matches!(sale.status, SaleStatus::Pending | SaleStatus::Processing) {
            return Err(SalesServiceError::AlreadyProcessed);
        }

        let (status, approved_at) = match outcome {
            PaymentOutcome::Approved => (SaleStatus::Approved, Some(Utc::now())),
            PaymentOutcome::Rejected => (SaleStatus::Rejected, None),
        };
        self.sales.set_status(sale.id, status, approved_at).await?;

        // Return the refreshed record, not the stale pre-transition copy.
        self.sales
            .find_by_id(sale.id)
            .await?
            .ok_or(SalesServiceError::SaleNotFound)
    }
}
