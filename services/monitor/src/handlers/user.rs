use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;

use airlytics_auth_types::identity::Member;

use crate::domain::types::User;
use crate::error::MonitorError;
use crate::state::AppState;
use crate::usecase::user::{GetUserUseCase, RegisterUserInput, RegisterUserUseCase};

// ── POST /users ──────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct RegisterUserRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

pub async fn register_user(
    State(state): State<AppState>,
    Json(body): Json<RegisterUserRequest>,
) -> Result<(StatusCode, Json<User>), MonitorError> {
    let usecase = RegisterUserUseCase {
        repo: state.user_repo(),
        clock: state.clock(),
        hash_cost: state.password_hash_cost,
    };
    let user = usecase
        .execute(RegisterUserInput {
            name: body.name,
            email: body.email,
            password: body.password,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(user)))
}

// ── GET /users/@me ───────────────────────────────────────────────────────────

pub async fn get_me(
    Member(info): Member,
    State(state): State<AppState>,
) -> Result<Json<User>, MonitorError> {
    let usecase = GetUserUseCase {
        repo: state.user_repo(),
    };
    Ok(Json(usecase.execute(info.user_id).await?))
}
