use sea_orm_migration::prelude::*;

#[tokio::main]
async fn main() {
    cli::run_cli(airlytics_monitor_migration::Migrator).await;
}
