pub mod clock;
pub mod db;
pub mod mail;
pub mod otp;
pub mod rate_limit;
