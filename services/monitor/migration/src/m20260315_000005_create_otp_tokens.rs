use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(OtpTokens::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(OtpTokens::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(OtpTokens::UserId).uuid())
                    .col(ColumnDef::new(OtpTokens::Email).string().not_null())
                    .col(ColumnDef::new(OtpTokens::CodeHash).string().not_null())
                    .col(
                        ColumnDef::new(OtpTokens::IssuedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(OtpTokens::ExpiresAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(OtpTokens::ConsumedAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(OtpTokens::AttemptCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(OtpTokens::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(OtpTokens::Table, OtpTokens::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(OtpTokens::Table)
                    .col(OtpTokens::Email)
                    .name("idx_otp_tokens_email")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(OtpTokens::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum OtpTokens {
    Table,
    Id,
    UserId,
    Email,
    CodeHash,
    IssuedAt,
    ExpiresAt,
    ConsumedAt,
    AttemptCount,
    CreatedAt,
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
}
