use anyhow::Context as _;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, sea_query::Expr,
};
use uuid::Uuid;

use revenda_core::pagination::PageRequest;
use revenda_sales_schema::{sales, webhook_logs};

use crate::domain::repository::{
    SaleChanges, SaleRepository, WebhookLogRepository,
};
use crate::domain::types::{PaymentMethod, Sale, SaleStatus, WebhookAttempt};
use crate::error::SalesServiceError;

// ── Sale repository ──────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbSaleRepository {
    pub db: DatabaseConnection,
}

impl SaleRepository for DbSaleRepository {
    async fn create(&self, sale: &Sale) -> Result<(), SalesServiceError> {
        sales::ActiveModel {
            id: Set(sale.id),
            vehicle_id: Set(sale.vehicle_id.clone()),
            buyer_cpf: Set(sale.buyer_cpf.clone()),
            amount_paid: Set(sale.amount_paid),
            payment_method: Set(sale.payment_method.as_str().to_owned()),
            status: Set(sale.status.as_str().to_owned()),
            payment_code: Set(sale.payment_code.clone()),
            created_at: Set(sale.created_at),
            updated_at: Set(sale.updated_at),
            approved_at: Set(sale.approved_at),
            webhook_notified: Set(sale.webhook_notified),
            webhook_attempts: Set(sale.webhook_attempts),
        }
        .insert(&self.db)
        .await
        .context("create sale")?;
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Sale>, SalesServiceError> {
        let model = sales::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find sale by id")?;
        model.map(sale_from_model).transpose()
    }

    async fn find_by_payment_code(&self, code: &str) -> Result<Option<Sale>, SalesServiceError> {
        let model = sales::Entity::find()
            .filter(sales::Column::PaymentCode.eq(code))
            .one(&self.db)
            .await
            .context("find sale by payment code")?;
        model.map(sale_from_model).transpose()
    }

    async fn list_by_vehicle(&self, vehicle_id: &str) -> Result<Vec<Sale>, SalesServiceError> {
        let models = sales::Entity::find()
            .filter(sales::Column::VehicleId.eq(vehicle_id))
            .order_by_desc(sales::Column::CreatedAt)
            .all(&self.db)
            .await
            .context("list sales by vehicle")?;
        models.into_iter().map(sale_from_model).collect()
    }

    async fn list_by_cpf(&self, cpf: &str) -> Result<Vec<Sale>, SalesServiceError> {
        let models = sales::Entity::find()
            .filter(sales::Column::BuyerCpf.eq(cpf))
            .order_by_desc(sales::Column::CreatedAt)
            .all(&self.db)
            .await
            .context("list sales by cpf")?;
        models.into_iter().map(sale_from_model).collect()
    }

    async fn list_all(&self, page: PageRequest) -> Result<Vec<Sale>, SalesServiceError> {
        let page = page.clamped();
        let models = sales::Entity::find()
            .order_by_desc(sales::Column::CreatedAt)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await
            .context("list all sales")?;
        models.into_iter().map(sale_from_model).collect()
    }

    async fn update_fields(
        &self,
        id: Uuid,
        changes: SaleChanges,
    ) -> Result<Option<Sale>, SalesServiceError> {
        let mut am = sales::ActiveModel {
            id: Set(id),
            ..Default::default()
        };
        if let Some(status) = changes.status {
            am.status = Set(status.as_str().to_owned());
        }
        if let Some(approved_at) = changes.approved_at {
            am.approved_at = Set(approved_at);
        }
        if let Some(notified) = changes.webhook_notified {
            am.webhook_notified = Set(notified);
        }
        if let Some(attempts) = changes.webhook_attempts {
            am.webhook_attempts = Set(attempts);
        }
        am.updated_at = Set(Utc::now());
        match am.update(&self.db).await {
            Ok(model) => Ok(Some(sale_from_model(model)?)),
            Err(sea_orm::DbErr::RecordNotFound(_)) => Ok(None),
            Err(e) => Err(anyhow::Error::new(e).context("update sale fields").into()),
        }
    }

    async fn set_status(
        &self,
        id: Uuid,
        status: SaleStatus,
        approved_at: Option<DateTime<Utc>>,
    ) -> Result<bool, SalesServiceError> {
        let mut update = sales::Entity::update_many()
            .filter(sales::Column::Id.eq(id))
            .col_expr(sales::Column::Status, Expr::value(status.as_str()))
            .col_expr(sales::Column::UpdatedAt, Expr::value(Utc::now()));
        if let Some(ts) = approved_at {
            update = update.col_expr(sales::Column::ApprovedAt, Expr::value(ts));
        }
        let result = update.exec(&self.db).await.context("set sale status")?;
        Ok(result.rows_affected > 0)
    }

    async fn list_pending(&self, limit: u64) -> Result<Vec<Sale>, SalesServiceError> {
        let models = sales::Entity::find()
            .filter(sales::Column::Status.eq(SaleStatus::Pending.as_str()))
            .order_by_asc(sales::Column::CreatedAt)
            .limit(limit)
            .all(&self.db)
            .await
            .context("list pending sales")?;
        models.into_iter().map(sale_from_model).collect()
    }

    async fn list_approved_unnotified(
        &self,
        limit: u64,
        max_attempts: i32,
    ) -> Result<Vec<Sale>, SalesServiceError> {
        let models = sales::Entity::find()
            .filter(sales::Column::Status.eq(SaleStatus::Approved.as_str()))
            .filter(sales::Column::WebhookNotified.eq(false))
            .filter(sales::Column::WebhookAttempts.lt(max_attempts))
            .order_by_asc(sales::Column::ApprovedAt)
            .limit(limit)
            .all(&self.db)
            .await
            .context("list approved sales pending notification")?;
        models.into_iter().map(sale_from_model).collect()
    }

    async fn increment_webhook_attempts(&self, id: Uuid) -> Result<bool, SalesServiceError> {
        // Single-statement bump; the store's row lock is the only
        // concurrency control.
        let result = sales::Entity::update_many()
            .filter(sales::Column::Id.eq(id))
            .col_expr(
                sales::Column::WebhookAttempts,
                Expr::col(sales::Column::WebhookAttempts).add(1),
            )
            .col_expr(sales::Column::UpdatedAt, Expr::value(Utc::now()))
            .exec(&self.db)
            .await
            .context("increment webhook attempts")?;
        Ok(result.rows_affected > 0)
    }

    async fn mark_webhook_notified(&self, id: Uuid) -> Result<bool, SalesServiceError> {
        let result = sales::Entity::update_many()
            .filter(sales::Column::Id.eq(id))
            .col_expr(sales::Column::WebhookNotified, Expr::value(true))
            .col_expr(sales::Column::UpdatedAt, Expr::value(Utc::now()))
            .exec(&self.db)
            .await
            .context("mark webhook notified")?;
        Ok(result.rows_affected > 0)
    }
}

/// Typed mapping from a `sales` row to the domain struct. Unknown status or
/// payment-method strings mean the row was written by something newer (or
/// corrupted) and surface as infrastructure errors rather than defaults.
fn sale_from_model(model: sales::Model) -> Result<Sale, SalesServiceError> {
    let status = SaleStatus::from_str(&model.status)
        .with_context(|| format!("unknown sale status {:?}", model.status))?;
    let payment_method = PaymentMethod::from_str(&model.payment_method)
        .with_context(|| format!("unknown payment method {:?}", model.payment_method))?;
    Ok(Sale {
        id: model.id,
        vehicle_id: model.vehicle_id,
        buyer_cpf: model.buyer_cpf,
        amount_paid: model.amount_paid,
        payment_method,
        status,
        payment_code: model.payment_code,
        created_at: model.created_at,
        updated_at: model.updated_at,
        approved_at: model.approved_at,
        webhook_notified: model.webhook_notified,
        webhook_attempts: model.webhook_attempts,
    })
}

// ── Webhook attempt log repository ───────────────────────────────────────────

#[derive(Clone)]
pub struct DbWebhookLogRepository {
    pub db: DatabaseConnection,
}

impl WebhookLogRepository for DbWebhookLogRepository {
    async fn insert(&self, attempt: &WebhookAttempt) -> Result<(), SalesServiceError> {
        webhook_logs::ActiveModel {
            id: Set(attempt.id),
            sale_id: Set(attempt.sale_id),
            url: Set(attempt.url.clone()),
            payload: Set(attempt.payload.clone()),
            status_code: Set(attempt.status_code),
            response: Set(attempt.response.clone()),
            attempted_at: Set(attempt.attempted_at),
            success: Set(attempt.success),
        }
        .insert(&self.db)
        .await
        .context("insert webhook attempt")?;
        Ok(())
    }

    async fn list_by_sale(&self, sale_id: Uuid) -> Result<Vec<WebhookAttempt>, SalesServiceError> {
        let models = webhook_logs::Entity::find()
            .filter(webhook_logs::Column::SaleId.eq(sale_id))
            .order_by_asc(webhook_logs::Column::AttemptedAt)
            .all(&self.db)
            .await
            .context("list webhook attempts")?;
        Ok(models.into_iter().map(attempt_from_model).collect())
    }
}

fn attempt_from_model(model: webhook_logs::Model) -> WebhookAttempt {
    WebhookAttempt {
        id: model.id,
        sale_id: model.sale_id,
        url: model.url,
        payload: model.payload,
        status_code: model.status_code,
        response: model.response,
        attempted_at: model.attempted_at,
        success: model.success,
    }
}
