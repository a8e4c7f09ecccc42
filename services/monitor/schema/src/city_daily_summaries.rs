use sea_orm::entity::prelude::*;

/// Per-city, per-UTC-day rollup of readings. Unique on `(city_id, date)`.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "city_daily_summaries")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub city_id: i32,
    pub date: chrono::NaiveDate,
    pub avg_aqi: f64,
    pub min_aqi: i32,
    pub max_aqi: i32,
    pub avg_pm25: f64,
    pub avg_pm10: f64,
    pub avg_co: f64,
    pub avg_no2: f64,
    pub avg_so2: f64,
    pub avg_o3: f64,
    pub dominant_pollutant: String,
    pub trend_score: f64,
    pub reading_count: i32,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::cities::Entity",
        from = "Column::CityId",
        to = "super::cities::Column::Id",
        on_delete = "Cascade"
    )]
    City,
}

impl Related<super::cities::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::City.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
