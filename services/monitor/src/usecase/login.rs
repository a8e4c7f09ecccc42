use airlytics_domain::email::{normalize_email, suggest_email_correction};

use crate::domain::repository::{Clock, Mailer, OtpRepository, UserRepository};
use crate::domain::types::IssuedOtp;
use crate::error::MonitorError;
use crate::usecase::otp::{IssueOtpInput, IssueOtpUseCase};
use crate::usecase::secret::secret_matches;

pub struct LoginInput {
    pub email: String,
    pub password: String,
}

/// First sign-in factor: check the password, then mail a one-time code bound to the account.
pub struct LoginUseCase<U, S, M, C>
where
    U: UserRepository,
    S: OtpRepository,
    M: Mailer,
    C: Clock,
{
    pub users: U,
    pub issue: IssueOtpUseCase<S, M, C>,
}

impl<U, S, M, C> LoginUseCase<U, S, M, C>
where
    U: UserRepository,
    S: OtpRepository,
    M: Mailer,
    C: Clock,
{
    pub async fn execute(&self, input: LoginInput) -> Result<IssuedOtp, MonitorError> {
        let email = normalize_email(&input.email).map_err(|_| MonitorError::InvalidEmail)?;

        let Some(user) = self.users.find_by_email(&email).await? else {
            // Only an unknown address gets a typo hint.
            tracing::info!(email = %email, "login for unknown email");
            return Err(MonitorError::InvalidCredentials {
                email_suggestion: suggest_email_correction(&email),
            });
        };

        if !secret_matches(input.password, user.password_hash.clone()).await? {
            tracing::info!(user_id = %user.id, "login with wrong password");
            return Err(MonitorError::InvalidCredentials {
                email_suggestion: None,
            });
        }

        self.issue
            .execute(IssueOtpInput {
                email,
                user_id: Some(user.id),
            })
            .await
    }
}
