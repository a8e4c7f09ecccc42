//! Auth types shared across Airlytics crates.
//!
//! Provides JWT issue/validation, the access-token cookie builders, and the
//! `Viewer` / `Member` request extractors.

pub mod cookie;
pub mod identity;
pub mod token;
