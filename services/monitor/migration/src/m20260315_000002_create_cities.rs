use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Cities::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Cities::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Cities::Slug).string().not_null().unique_key())
                    .col(ColumnDef::new(Cities::Name).string().not_null())
                    .col(ColumnDef::new(Cities::Latitude).double().not_null())
                    .col(ColumnDef::new(Cities::Longitude).double().not_null())
                    .col(ColumnDef::new(Cities::Region).string())
                    .col(ColumnDef::new(Cities::Country).string().not_null())
                    .col(
                        ColumnDef::new(Cities::IsIndian)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Cities::Population).big_integer())
                    .col(ColumnDef::new(Cities::Timezone).string())
                    .col(
                        ColumnDef::new(Cities::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(Cities::Table)
                    .col(Cities::Name)
                    .name("idx_cities_name")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Cities::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Cities {
    Table,
    Id,
    Slug,
    Name,
    Latitude,
    Longitude,
    Region,
    Country,
    IsIndian,
    Population,
    Timezone,
    CreatedAt,
}
