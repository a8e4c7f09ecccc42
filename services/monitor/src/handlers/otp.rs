use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};

use crate::domain::types::{IssuedOtp, OTP_TTL_SECS, VerifyOutcome};
use crate::error::MonitorError;
use crate::state::AppState;
use crate::usecase::login::{LoginInput, LoginUseCase};
use crate::usecase::otp::{IssueOtpUseCase, VerifyOtpInput, VerifyOtpUseCase};

// ── POST /auth/otp ────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct IssueOtpRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct IssueOtpResponse {
    #[serde(flatten)]
    pub otp: IssuedOtp,
    pub expires_in_minutes: i64,
}

pub async fn issue_otp(
    State(state): State<AppState>,
    Json(body): Json<IssueOtpRequest>,
) -> Result<(StatusCode, Json<IssueOtpResponse>), MonitorError> {
    let usecase = LoginUseCase {
        users: state.user_repo(),
        issue: IssueOtpUseCase {
            store: state.otp_store(),
            mailer: state.mailer(),
            clock: state.clock(),
            policy: state.otp.policy,
            expose_codes: state.otp.expose_codes,
            hash_cost: state.otp.hash_cost,
        },
    };
    let otp = usecase
        .execute(LoginInput {
            email: body.email,
            password: body.password,
        })
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(IssueOtpResponse {
            otp,
            expires_in_minutes: OTP_TTL_SECS / 60,
        }),
    ))
}

// ── POST /auth/otp/verify ─────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct VerifyOtpRequest {
    pub email: String,
    pub otp: String,
}

#[derive(Serialize)]
pub struct VerifyOtpResponse {
    pub verified: bool,
}

pub async fn verify_otp(
    State(state): State<AppState>,
    Json(body): Json<VerifyOtpRequest>,
) -> Result<Json<VerifyOtpResponse>, MonitorError> {
    let usecase = VerifyOtpUseCase {
        store: state.otp_store(),
        clock: state.clock(),
    };
    let outcome = usecase
        .execute(VerifyOtpInput {
            email: body.email,
            code: body.otp,
        })
        .await?;
    match outcome {
        VerifyOutcome::Verified { .. } => Ok(Json(VerifyOtpResponse { verified: true })),
        VerifyOutcome::Failed(failure) => Err(MonitorError::Otp(failure)),
    }
}
