pub mod analytics;
pub mod city;
pub mod otp;
pub mod reading;
pub mod token;
pub mod user;
