use sea_orm_migration::prelude::*;

mod m20260315_000001_create_users;
mod m20260315_000002_create_cities;
mod m20260315_000003_create_pollution_readings;
mod m20260315_000004_create_city_daily_summaries;
mod m20260315_000005_create_otp_tokens;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260315_000001_create_users::Migration),
            Box::new(m20260315_000002_create_cities::Migration),
            Box::new(m20260315_000003_create_pollution_readings::Migration),
            Box::new(m20260315_000004_create_city_daily_summaries::Migration),
            Box::new(m20260315_000005_create_otp_tokens::Migration),
        ]
    }
}
