use uuid::Uuid;

use airlytics_domain::email::{normalize_email, sanitize_name};
use airlytics_domain::password::validate_password_strength;
use airlytics_domain::user::UserRole;

use crate::domain::repository::{Clock, UserRepository};
use crate::domain::types::User;
use crate::error::MonitorError;
use crate::usecase::secret::hash_secret;

const MAX_NAME_CHARS: usize = 100;

// ── RegisterUser ─────────────────────────────────────────────────────────────

pub struct RegisterUserInput {
    pub name: String,
    pub email: String,
    pub password: String,
}

pub struct RegisterUserUseCase<R: UserRepository, C: Clock> {
    pub repo: R,
    pub clock: C,
    pub hash_cost: u32,
}

impl<R: UserRepository, C: Clock> RegisterUserUseCase<R, C> {
    pub async fn execute(&self, input: RegisterUserInput) -> Result<User, MonitorError> {
        let name = sanitize_name(&input.name);
        if name.is_empty() || name.chars().count() > MAX_NAME_CHARS {
            return Err(MonitorError::InvalidName);
        }
        let email = normalize_email(&input.email).map_err(|_| MonitorError::InvalidEmail)?;
        validate_password_strength(&input.password, &email, &name)?;

        if self.repo.find_by_email(&email).await?.is_some() {
            return Err(MonitorError::UserAlreadyExists);
        }

        let password_hash = hash_secret(input.password, self.hash_cost).await?;
        let now = self.clock.now();
        let user = User {
            id: Uuid::new_v4(),
            name,
            email,
            password_hash,
            role: UserRole::Member,
            created_at: now,
            updated_at: now,
        };
        self.repo.create(&user).await?;
        tracing::info!(user_id = %user.id, "user registered");
        Ok(user)
    }
}

// ── GetUser ──────────────────────────────────────────────────────────────────

pub struct GetUserUseCase<R: UserRepository> {
    pub repo: R,
}

impl<R: UserRepository> GetUserUseCase<R> {
    pub async fn execute(&self, user_id: Uuid) -> Result<User, MonitorError> {
        self.repo
            .find_by_id(user_id)
            .await?
            .ok_or(MonitorError::UserNotFound)
    }
}
