use sea_orm::entity::prelude::*;

/// One outbound webhook delivery attempt. Append-only: rows are inserted by
/// the delivery engine and never updated or deleted.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "webhook_logs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub sale_id: Uuid,
    pub url: String,
    pub payload: Json,
    /// HTTP status of the remote response; 0 when no response was received
    /// (timeout or transport failure).
    pub status_code: i32,
    pub response: Option<String>,
    pub attempted_at: chrono::DateTime<chrono::Utc>,
    pub success: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::sales::Entity",
        from = "Column::SaleId",
        to = "super::sales::Column::Id"
    )]
    Sale,
}

impl Related<super::sales::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Sale.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
