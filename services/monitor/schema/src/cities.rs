use sea_orm::entity::prelude::*;

/// Monitored city. Reference data, written by seeding or admins.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "cities")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub slug: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub region: Option<String>,
    pub country: String,
    pub is_indian: bool,
    pub population: Option<i64>,
    pub timezone: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::pollution_readings::Entity")]
    PollutionReadings,
    #[sea_orm(has_many = "super::city_daily_summaries::Entity")]
    CityDailySummaries,
}

impl Related<super::pollution_readings::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PollutionReadings.def()
    }
}

impl Related<super::city_daily_summaries::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CityDailySummaries.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
