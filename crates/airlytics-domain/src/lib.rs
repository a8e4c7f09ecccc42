//! Domain types shared across Airlytics crates.
//!
//! This crate contains only pure types and functions with no framework dependencies.
//! Import in `usecase/` and `domain/` layers; never depend on `infra/` from here.

pub mod aqi;
pub mod city;
pub mod email;
pub mod pagination;
pub mod password;
pub mod pollutant;
pub mod user;
