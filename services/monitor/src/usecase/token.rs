use airlytics_auth_types::token::issue_access_token;
use airlytics_domain::email::normalize_email;

use crate::domain::repository::{Clock, OtpRepository, UserRepository};
use crate::domain::types::{User, VerifyOutcome};
use crate::error::MonitorError;
use crate::usecase::otp::{VerifyOtpInput, VerifyOtpUseCase};

pub struct CreateTokenInput {
    pub email: String,
    pub code: String,
}

pub struct CreateTokenOutput {
    pub access_token: String,
    pub access_token_exp: u64,
    pub user: User,
}

/// Exchange a verified OTP for an access token.
pub struct CreateTokenUseCase<U, S, C>
where
    U: UserRepository,
    S: OtpRepository,
    C: Clock,
{
    pub users: U,
    pub verify: VerifyOtpUseCase<S, C>,
    pub jwt_secret: String,
}

impl<U, S, C> CreateTokenUseCase<U, S, C>
where
    U: UserRepository,
    S: OtpRepository,
    C: Clock,
{
    pub async fn execute(&self, input: CreateTokenInput) -> Result<CreateTokenOutput, MonitorError> {
        let email = normalize_email(&input.email).map_err(|_| MonitorError::InvalidEmail)?;

        // 1. The code is spent even if no account exists for the email.
        let outcome = self
            .verify
            .execute(VerifyOtpInput {
                email: email.clone(),
                code: input.code,
            })
            .await?;
        let bound_user = match outcome {
            VerifyOutcome::Verified { user_id } => user_id,
            VerifyOutcome::Failed(failure) => return Err(MonitorError::Otp(failure)),
        };

        // 2. Resolve the account the code was issued for
        let user = match bound_user {
            Some(user_id) => self.users.find_by_id(user_id).await?,
            None => self.users.find_by_email(&email).await?,
        }
        .ok_or(MonitorError::UserNotFound)?;

        // 3. Sign
        let now_secs = u64::try_from(self.verify.clock.now().timestamp()).unwrap_or_default();
        let (access_token, access_token_exp) =
            issue_access_token(user.id, user.role, &self.jwt_secret, now_secs).map_err(|e| {
                MonitorError::Internal(anyhow::Error::new(e).context("issue access token"))
            })?;

        tracing::info!(user_id = %user.id, "access token issued");
        Ok(CreateTokenOutput {
            access_token,
            access_token_exp,
            user,
        })
    }
}
