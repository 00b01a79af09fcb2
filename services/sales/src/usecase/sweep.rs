use std::time::Duration;

use chrono::Utc;
use serde::Serialize;

use crate::domain::repository::{SaleRepository, WebhookLogRepository};
use crate::domain::types::{
    ApprovalPolicy, DELIVERY_PACING_MS, MAX_WEBHOOK_ATTEMPTS, PENDING_SWEEP_LIMIT, Sale,
    SaleStatus, WEBHOOK_SWEEP_LIMIT,
};
use crate::error::SalesServiceError;
use crate::usecase::webhook::WebhookNotifier;

/// What one reconciliation pass did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    /// Pending sales promoted to approved.
    pub approved: usize,
    /// Webhooks delivered successfully.
    pub delivered: usize,
}

// ── Pending-resolution sweep ─────────────────────────────────────────────────

/// Promotes sales stuck in `pending`, gated by [`ApprovalPolicy`].
///
/// With `AutoApprove` every fetched pending sale is transitioned straight to
/// approved with no payment-confirmation signal — the reference behavior,
/// useful for demos, unsafe for production. The default policy leaves
/// pending sales to the payment callback and makes this sweep a no-op.
pub struct ApprovePendingSweep<S: SaleRepository> {
    pub sales: S,
    pub policy: ApprovalPolicy,
}

impl<S: SaleRepository> ApprovePendingSweep<S> {
    pub async fn execute(&self) -> Result<usize, SalesServiceError> {
        if self.policy == ApprovalPolicy::RequireConfirmation {
            tracing::debug!("approval policy requires confirmation; skipping pending sweep");
            return Ok(0);
        }

        let pending = self.sales.list_pending(PENDING_SWEEP_LIMIT).await?;
        if pending.is_empty() {
            return Ok(0);
        }
        tracing::info!(count = pending.len(), "auto-approving pending sales");

        let mut approved = 0;
        for sale in &pending {
            match self
                .sales
                .set_status(sale.id, SaleStatus::Approved, Some(Utc::now()))
                .await
            {
                Ok(true) => approved += 1,
                // Resolved between fetch and update — nothing to do.
                Ok(false) => {}
                Err(e) => {
                    tracing::error!(sale_id = %sale.id, error = %e, "failed to auto-approve sale");
                }
            }
        }
        Ok(approved)
    }
}

// ── Webhook delivery sweep ───────────────────────────────────────────────────

/// Drives the delivery engine over every approved, un-notified sale that
/// still has retry budget.
///
/// The attempt counter is incremented *before* the delivery call: a crash
/// between increment and confirmation burns one budget unit, which bounds
/// the number of sends at `MAX_WEBHOOK_ATTEMPTS` even across restarts.
/// A sale that exhausts its budget without success stays un-notified and is
/// simply no longer selected; the attempt log is the only trace.
pub struct WebhookSweep<S: SaleRepository, L: WebhookLogRepository> {
    pub sales: S,
    pub notifier: WebhookNotifier<L>,
    /// Pause between consecutive deliveries. Tests set this to zero.
    pub pacing: Duration,
}

impl<S: SaleRepository, L: WebhookLogRepository> WebhookSweep<S, L> {
    pub fn new(sales: S, notifier: WebhookNotifier<L>) -> Self {
        Self {
            sales,
            notifier,
            pacing: Duration::from_millis(DELIVERY_PACING_MS),
        }
    }

    pub async fn execute(&self) -> Result<usize, SalesServiceError> {
        let due = self
            .sales
            .list_approved_unnotified(WEBHOOK_SWEEP_LIMIT, MAX_WEBHOOK_ATTEMPTS)
            .await?;
        if due.is_empty() {
            return Ok(0);
        }
        tracing::info!(count = due.len(), "processing webhook deliveries");

        let mut delivered = 0;
        for (i, sale) in due.iter().enumerate() {
            if i > 0 && !self.pacing.is_zero() {
                tokio::time::sleep(self.pacing).await;
            }
            match self.deliver_one(sale).await {
                Ok(true) => delivered += 1,
                Ok(false) => {}
                // One failing sale must not abort the rest of the batch.
                Err(e) => {
                    tracing::error!(sale_id = %sale.id, error = %e, "webhook processing failed");
                }
            }
        }
        Ok(delivered)
    }

    async fn deliver_one(&self, sale: &Sale) -> Result<bool, SalesServiceError> {
        self.sales.increment_webhook_attempts(sale.id).await?;
        let delivered = self.notifier.notify_approved_sale(sale).await?;
        if delivered {
            self.sales.mark_webhook_notified(sale.id).await?;
        } else {
            tracing::warn!(
                sale_id = %sale.id,
                attempt = sale.webhook_attempts + 1,
                max = MAX_WEBHOOK_ATTEMPTS,
                "webhook delivery attempt failed"
            );
        }
        Ok(delivered)
    }
}

// ── Combined reconciliation pass ─────────────────────────────────────────────

/// One full reconciliation pass: resolve stuck pending sales, then deliver
/// due webhooks. Each phase's failure is logged and does not prevent the
/// other from running; the first error is still reported to the caller.
pub struct ReconciliationSweep<S: SaleRepository + Clone, L: WebhookLogRepository> {
    pub approvals: ApprovePendingSweep<S>,
    pub webhooks: WebhookSweep<S, L>,
}

impl<S: SaleRepository + Clone, L: WebhookLogRepository> ReconciliationSweep<S, L> {
    pub fn new(sales: S, policy: ApprovalPolicy, notifier: WebhookNotifier<L>) -> Self {
        Self {
            approvals: ApprovePendingSweep {
                sales: sales.clone(),
                policy,
            },
            webhooks: WebhookSweep::new(sales, notifier),
        }
    }

    pub async fn run_once(&self) -> Result<SweepReport, SalesServiceError> {
        let mut report = SweepReport::default();
        let mut first_error = None;

        match self.approvals.execute().await {
            Ok(n) => report.approved = n,
            Err(e) => {
                tracing::error!(error = %e, "pending-resolution sweep failed");
                first_error = Some(e);
            }
        }
        match self.webhooks.execute().await {
            Ok(n) => report.delivered = n,
            Err(e) => {
                tracing::error!(error = %e, "webhook sweep failed");
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(report),
        }
    }
}
