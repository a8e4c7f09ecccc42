use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use axum_extra::extract::CookieJar;
use serde::{Deserialize, Serialize};

use airlytics_auth_types::cookie::{clear_access_token_cookie, set_access_token_cookie};

use crate::domain::types::User;
use crate::error::MonitorError;
use crate::state::AppState;
use crate::usecase::otp::VerifyOtpUseCase;
use crate::usecase::token::{CreateTokenInput, CreateTokenUseCase};

// ── POST /auth/token ──────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CreateTokenRequest {
    pub email: String,
    pub otp: String,
}

#[derive(Serialize)]
pub struct CreateTokenResponse {
    pub access_token: String,
    /// Unix seconds.
    pub expires_at: u64,
    pub user: User,
}

pub async fn create_token(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<CreateTokenRequest>,
) -> Result<impl IntoResponse, MonitorError> {
    let usecase = CreateTokenUseCase {
        users: state.user_repo(),
        verify: VerifyOtpUseCase {
            store: state.otp_store(),
            clock: state.clock(),
        },
        jwt_secret: state.jwt_secret.clone(),
    };

    let out = usecase
        .execute(CreateTokenInput {
            email: body.email,
            code: body.otp,
        })
        .await?;

    let jar = set_access_token_cookie(jar, out.access_token.clone(), state.cookie_domain.clone());
    let body = CreateTokenResponse {
        access_token: out.access_token,
        expires_at: out.access_token_exp,
        user: out.user,
    };
    Ok((StatusCode::CREATED, jar, Json(body)))
}

// ── DELETE /auth/token ────────────────────────────────────────────────────────

pub async fn revoke_token(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    let jar = clear_access_token_cookie(jar, state.cookie_domain.clone());
    (StatusCode::NO_CONTENT, jar)
}
