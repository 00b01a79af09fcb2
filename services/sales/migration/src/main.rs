use sea_orm_migration::prelude::*;

#[tokio::main]
async fn main() {
    cli::run_cli(revenda_sales_migration::Migrator).await;
}
