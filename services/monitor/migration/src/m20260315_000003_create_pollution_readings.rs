use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let mut table = Table::create();
        table
            .table(PollutionReadings::Table)
            .if_not_exists()
            .col(
                ColumnDef::new(PollutionReadings::Id)
                    .big_integer()
                    .not_null()
                    .auto_increment()
                    .primary_key(),
            )
            .col(ColumnDef::new(PollutionReadings::CityId).integer().not_null())
            .col(ColumnDef::new(PollutionReadings::UserId).uuid())
            .col(
                ColumnDef::new(PollutionReadings::RecordedAt)
                    .timestamp_with_time_zone()
                    .not_null(),
            )
            .col(ColumnDef::new(PollutionReadings::Aqi).integer().not_null());
        for pollutant in [
            PollutionReadings::Pm25,
            PollutionReadings::Pm10,
            PollutionReadings::Co,
            PollutionReadings::No2,
            PollutionReadings::So2,
            PollutionReadings::O3,
        ] {
            table.col(ColumnDef::new(pollutant).double().not_null().default(0.0));
        }
        table
            .col(
                ColumnDef::new(PollutionReadings::DominantPollutant)
                    .string_len(8)
                    .not_null(),
            )
            .col(
                ColumnDef::new(PollutionReadings::AqiCategory)
                    .string_len(32)
                    .not_null(),
            )
            .col(ColumnDef::new(PollutionReadings::Temperature).double())
            .col(ColumnDef::new(PollutionReadings::Humidity).double())
            .col(ColumnDef::new(PollutionReadings::WindSpeed).double())
            .col(ColumnDef::new(PollutionReadings::DataSource).string())
            .col(
                ColumnDef::new(PollutionReadings::CreatedAt)
                    .timestamp_with_time_zone()
                    .not_null(),
            )
            .col(
                ColumnDef::new(PollutionReadings::UpdatedAt)
                    .timestamp_with_time_zone()
                    .not_null(),
            )
            .foreign_key(
                ForeignKey::create()
                    .from(PollutionReadings::Table, PollutionReadings::CityId)
                    .to(Cities::Table, Cities::Id)
                    .on_delete(ForeignKeyAction::Cascade),
            )
            .foreign_key(
                ForeignKey::create()
                    .from(PollutionReadings::Table, PollutionReadings::UserId)
                    .to(Users::Table, Users::Id)
                    .on_delete(ForeignKeyAction::SetNull),
            );
        manager.create_table(table.to_owned()).await?;

        manager
            .create_index(
                Index::create()
                    .table(PollutionReadings::Table)
                    .col(PollutionReadings::CityId)
                    .col(PollutionReadings::RecordedAt)
                    .name("idx_pollution_readings_city_id_recorded_at")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PollutionReadings::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum PollutionReadings {
    Table,
    Id,
    CityId,
    UserId,
    RecordedAt,
    Aqi,
    Pm25,
    Pm10,
    Co,
    No2,
    So2,
    O3,
    DominantPollutant,
    AqiCategory,
    Temperature,
    Humidity,
    WindSpeed,
    DataSource,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Cities {
    Table,
    Id,
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
}
