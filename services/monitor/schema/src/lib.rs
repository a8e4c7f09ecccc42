//! sea-orm entities for the monitor service.

pub mod cities;
pub mod city_daily_summaries;
pub mod otp_tokens;
pub mod pollution_readings;
pub mod users;
