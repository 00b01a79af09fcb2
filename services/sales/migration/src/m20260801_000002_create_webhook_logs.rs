use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(WebhookLogs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(WebhookLogs::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(WebhookLogs::SaleId).uuid().not_null())
                    .col(ColumnDef::new(WebhookLogs::Url).string_len(500).not_null())
                    .col(ColumnDef::new(WebhookLogs::Payload).json_binary().not_null())
                    .col(
                        ColumnDef::new(WebhookLogs::StatusCode)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(WebhookLogs::Response).text())
                    .col(
                        ColumnDef::new(WebhookLogs::AttemptedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(WebhookLogs::Success)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(WebhookLogs::Table, WebhookLogs::SaleId)
                            .to(Sales::Table, Sales::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_webhook_logs_sale_id")
                    .table(WebhookLogs::Table)
                    .col(WebhookLogs::SaleId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_webhook_logs_success")
                    .table(WebhookLogs::Table)
                    .col(WebhookLogs::Success)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(WebhookLogs::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum WebhookLogs {
    Table,
    Id,
    SaleId,
    Url,
    Payload,
    StatusCode,
    Response,
    AttemptedAt,
    Success,
}

#[derive(Iden)]
enum Sales {
    Table,
    Id,
}
