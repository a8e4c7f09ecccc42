use sea_orm::entity::prelude::*;

/// Registered account. Sign-in is a password check followed by an email OTP.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    #[sea_orm(unique)]
    pub email: String,
    /// bcrypt hash of the account password.
    pub password_hash: String,
    pub role: i16,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::pollution_readings::Entity")]
    PollutionReadings,
    #[sea_orm(has_many = "super::otp_tokens::Entity")]
    OtpTokens,
}

impl Related<super::pollution_readings::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PollutionReadings.def()
    }
}

impl Related<super::otp_tokens::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OtpTokens.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
