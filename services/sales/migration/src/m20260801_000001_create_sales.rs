use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Sales::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Sales::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Sales::VehicleId).string_len(50).not_null())
                    .col(ColumnDef::new(Sales::BuyerCpf).string_len(11).not_null())
                    .col(
                        ColumnDef::new(Sales::AmountPaid)
                            .decimal_len(10, 2)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Sales::PaymentMethod)
                            .string_len(20)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Sales::Status)
                            .string_len(20)
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(Sales::PaymentCode)
                            .string_len(100)
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Sales::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Sales::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Sales::ApprovedAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(Sales::WebhookNotified)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Sales::WebhookAttempts)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_sales_status")
                    .table(Sales::Table)
                    .col(Sales::Status)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_sales_vehicle_id")
                    .table(Sales::Table)
                    .col(Sales::VehicleId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_sales_buyer_cpf")
                    .table(Sales::Table)
                    .col(Sales::BuyerCpf)
                    .to_owned(),
            )
            .await?;
        // Covers the webhook sweep query (approved + not yet notified).
        manager
            .create_index(
                Index::create()
                    .name("idx_sales_webhook_pending")
                    .table(Sales::Table)
                    .col(Sales::WebhookNotified)
                    .col(Sales::Status)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Sales::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Sales {
    Table,
    Id,
    VehicleId,
    BuyerCpf,
    AmountPaid,
    PaymentMethod,
    Status,
    PaymentCode,
    CreatedAt,
    UpdatedAt,
    ApprovedAt,
    WebhookNotified,
    WebhookAttempts,
}
