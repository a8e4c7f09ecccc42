pub mod analytics;
pub mod repository;
pub mod types;
