use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use airlytics_domain::password::PasswordError;

use crate::domain::types::OtpFailure;

/// Failure reported by a mail transport.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MailError {
    #[error("mail credentials are not configured")]
    MissingCredentials,
    #[error("mail provider rejected the message: {0}")]
    Rejected(String),
    #[error("mail transport failed: {0}")]
    Transport(String),
}

/// Monitor service domain error variants.
#[derive(Debug, thiserror::Error)]
pub enum MonitorError {
    #[error("user not found")]
    UserNotFound,
    #[error("city not found")]
    CityNotFound,
    #[error("reading not found")]
    ReadingNotFound,
    #[error("user already exists")]
    UserAlreadyExists,
    #[error("invalid email")]
    InvalidEmail,
    #[error("invalid name")]
    InvalidName,
    #[error("{0}")]
    WeakPassword(#[from] PasswordError),
    #[error("invalid credentials")]
    InvalidCredentials { email_suggestion: Option<String> },
    #[error("too many requests, try again later")]
    RateLimited,
    #[error("invalid reading: {0}")]
    InvalidReading(String),
    #[error("forbidden")]
    Forbidden,
    #[error("{}", .0.message())]
    Otp(OtpFailure),
    #[error("failed to deliver OTP email")]
    DeliveryFailed(#[source] MailError),
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl MonitorError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::CityNotFound => "CITY_NOT_FOUND",
            Self::ReadingNotFound => "READING_NOT_FOUND",
            Self::UserAlreadyExists => "USER_ALREADY_EXISTS",
            Self::InvalidEmail => "INVALID_EMAIL",
            Self::InvalidName => "INVALID_NAME",
            Self::WeakPassword(_) => "WEAK_PASSWORD",
            Self::InvalidCredentials { .. } => "INVALID_CREDENTIALS",
            Self::RateLimited => "RATE_LIMITED",
            Self::InvalidReading(_) => "INVALID_READING",
            Self::Forbidden => "FORBIDDEN",
            Self::Otp(failure) => failure.reason(),
            Self::DeliveryFailed(_) => "DELIVERY_FAILED",
            Self::Internal(_) => "INTERNAL",
        }
    }
}

impl IntoResponse for MonitorError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::UserNotFound | Self::CityNotFound | Self::ReadingNotFound => {
                StatusCode::NOT_FOUND
            }
            Self::UserAlreadyExists => StatusCode::CONFLICT,
            Self::InvalidEmail
            | Self::InvalidName
            | Self::WeakPassword(_)
            | Self::InvalidReading(_) => StatusCode::BAD_REQUEST,
            Self::InvalidCredentials { .. } => StatusCode::UNAUTHORIZED,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::Otp(OtpFailure::AttemptsExceeded) => StatusCode::TOO_MANY_REQUESTS,
            Self::Otp(_) => StatusCode::BAD_REQUEST,
            Self::DeliveryFailed(_) => StatusCode::BAD_GATEWAY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        // 4xx are expected client errors and already visible in the trace layer.
        if let Self::Internal(ref e) = self {
            tracing::error!(error = ?e, kind = "INTERNAL", "internal error");
        }
        let mut body = serde_json::json!({
            "kind": self.kind(),
            "message": self.to_string(),
        });
        if let Self::InvalidCredentials {
            email_suggestion: Some(suggestion),
        } = &self
        {
            body["email_suggestion"] = serde_json::Value::from(suggestion.as_str());
        }
        (status, axum::Json(body)).into_response()
    }
}
