use sea_orm::entity::prelude::*;

/// Vehicle-sale order, tracked through the payment lifecycle.
///
/// `status` and `payment_method` are stored as their wire strings
/// ("pending", "credit_card", ...) and parsed into domain enums by the
/// repository mapping layer.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "sales")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub vehicle_id: String,
    pub buyer_cpf: String,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub amount_paid: Decimal,
    pub payment_method: String,
    pub status: String,
    #[sea_orm(unique)]
    pub payment_code: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
    pub approved_at: Option<chrono::DateTime<chrono::Utc>>,
    pub webhook_notified: bool,
    pub webhook_attempts: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::webhook_logs::Entity")]
    WebhookLogs,
}

impl Related<super::webhook_logs::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::WebhookLogs.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
