use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let mut table = Table::create();
        table
            .table(CityDailySummaries::Table)
            .if_not_exists()
            .col(
                ColumnDef::new(CityDailySummaries::Id)
                    .big_integer()
                    .not_null()
                    .auto_increment()
                    .primary_key(),
            )
            .col(ColumnDef::new(CityDailySummaries::CityId).integer().not_null())
            .col(ColumnDef::new(CityDailySummaries::Date).date().not_null())
            .col(ColumnDef::new(CityDailySummaries::AvgAqi).double().not_null())
            .col(ColumnDef::new(CityDailySummaries::MinAqi).integer().not_null())
            .col(ColumnDef::new(CityDailySummaries::MaxAqi).integer().not_null());
        for column in [
            CityDailySummaries::AvgPm25,
            CityDailySummaries::AvgPm10,
            CityDailySummaries::AvgCo,
            CityDailySummaries::AvgNo2,
            CityDailySummaries::AvgSo2,
            CityDailySummaries::AvgO3,
        ] {
            table.col(ColumnDef::new(column).double().not_null().default(0.0));
        }
        table
            .col(
                ColumnDef::new(CityDailySummaries::DominantPollutant)
                    .string_len(8)
                    .not_null(),
            )
            .col(
                ColumnDef::new(CityDailySummaries::TrendScore)
                    .double()
                    .not_null()
                    .default(0.0),
            )
            .col(
                ColumnDef::new(CityDailySummaries::ReadingCount)
                    .integer()
                    .not_null()
                    .default(0),
            )
            .col(
                ColumnDef::new(CityDailySummaries::UpdatedAt)
                    .timestamp_with_time_zone()
                    .not_null(),
            )
            .foreign_key(
                ForeignKey::create()
                    .from(CityDailySummaries::Table, CityDailySummaries::CityId)
                    .to(Cities::Table, Cities::Id)
                    .on_delete(ForeignKeyAction::Cascade),
            );
        manager.create_table(table.to_owned()).await?;

        manager
            .create_index(
                Index::create()
                    .table(CityDailySummaries::Table)
                    .col(CityDailySummaries::CityId)
                    .col(CityDailySummaries::Date)
                    .unique()
                    .name("uq_city_daily_summaries_city_id_date")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CityDailySummaries::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum CityDailySummaries {
    Table,
    Id,
    CityId,
    Date,
    AvgAqi,
    MinAqi,
    MaxAqi,
    AvgPm25,
    AvgPm10,
    AvgCo,
    AvgNo2,
    AvgSo2,
    AvgO3,
    DominantPollutant,
    TrendScore,
    ReadingCount,
    UpdatedAt,
}

#[derive(Iden)]
enum Cities {
    Table,
    Id,
}
