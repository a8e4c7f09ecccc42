mod helpers;

mod http_test;
mod login_test;
mod otp_test;
