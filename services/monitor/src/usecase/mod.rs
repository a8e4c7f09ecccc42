pub mod analytics;
pub mod city;
pub mod login;
pub mod otp;
pub mod reading;
mod secret;
pub mod token;
pub mod user;
