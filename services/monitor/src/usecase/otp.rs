use chrono::Duration;
use rand::RngExt;
use uuid::Uuid;

use airlytics_domain::email::normalize_email;

use crate::domain::repository::{Clock, MailMessage, Mailer, OtpRepository};
use crate::domain::types::{
    IssuedOtp, OTP_LEN, OTP_TTL_SECS, OtpFailure, OtpRecord, VerifyOutcome,
};
use crate::error::MonitorError;
use crate::usecase::secret::{hash_secret, secret_matches};

/// What `issue` does when the mail transport fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeliveryPolicy {
    /// Surface the failure as `DeliveryFailed`; nothing is stored.
    #[default]
    Strict,
    /// Log the failure, store the code anyway and hand it back to the caller.
    Fallback,
}

fn generate_code() -> String {
    let code = rand::rng().random_range(0..10u32.pow(OTP_LEN as u32));
    format!("{code:0width$}", width = OTP_LEN)
}

fn otp_message(to: &str, code: &str) -> MailMessage {
    let minutes = OTP_TTL_SECS / 60;
    MailMessage {
        to: to.to_owned(),
        subject: "Your Airlytics Login OTP".to_owned(),
        text: format!(
            "Your Airlytics login code is {code}. It is valid for {minutes} minutes.\n\
             If you did not request this code, you can ignore this email."
        ),
        html: format!(
            "<p>Your Airlytics login code is</p>\
             <p style=\"font-size:24px;font-weight:bold;letter-spacing:4px\">{code}</p>\
             <p>It is valid for {minutes} minutes.</p>\
             <p>If you did not request this code, you can ignore this email.</p>"
        ),
    }
}

// ── IssueOtp ──────────────────────────────────────────────────────────────────

pub struct IssueOtpInput {
    pub email: String,
    /// Account the code is issued for. Set by login after the password check.
    pub user_id: Option<Uuid>,
}

pub struct IssueOtpUseCase<S, M, C>
where
    S: OtpRepository,
    M: Mailer,
    C: Clock,
{
    pub store: S,
    pub mailer: M,
    pub clock: C,
    pub policy: DeliveryPolicy,
    /// Return the code even after a successful delivery. Test and debug setups only.
    pub expose_codes: bool,
    pub hash_cost: u32,
}

impl<S, M, C> IssueOtpUseCase<S, M, C>
where
    S: OtpRepository,
    M: Mailer,
    C: Clock,
{
    pub async fn execute(&self, input: IssueOtpInput) -> Result<IssuedOtp, MonitorError> {
        let email = normalize_email(&input.email).map_err(|_| MonitorError::InvalidEmail)?;

        let code = generate_code();
        let code_hash = hash_secret(code.clone(), self.hash_cost).await?;

        // Any earlier code stops working now, whether or not delivery succeeds.
        self.store.invalidate(&email).await?;

        let fallback = match self.mailer.send(&otp_message(&email, &code)).await {
            Ok(()) => false,
            Err(e) => match self.policy {
                DeliveryPolicy::Strict => {
                    tracing::error!(email = %email, error = %e, "otp delivery failed");
                    return Err(MonitorError::DeliveryFailed(e));
                }
                DeliveryPolicy::Fallback => {
                    tracing::warn!(email = %email, error = %e, "otp delivery failed, using fallback");
                    true
                }
            },
        };

        let now = self.clock.now();
        let record = OtpRecord {
            id: Uuid::new_v4(),
            user_id: input.user_id,
            email: email.clone(),
            code_hash,
            issued_at: now,
            expires_at: now + Duration::seconds(OTP_TTL_SECS),
            attempt_count: 0,
            consumed_at: None,
        };
        self.store.replace_active(&record).await?;
        tracing::info!(email = %email, fallback, "otp issued");

        Ok(IssuedOtp {
            expires_at: record.expires_at,
            code: (fallback || self.expose_codes).then_some(code),
            fallback,
        })
    }
}

// ── VerifyOtp ─────────────────────────────────────────────────────────────────

pub struct VerifyOtpInput {
    pub email: String,
    pub code: String,
}

pub struct VerifyOtpUseCase<S, C>
where
    S: OtpRepository,
    C: Clock,
{
    pub store: S,
    pub clock: C,
}

impl<S, C> VerifyOtpUseCase<S, C>
where
    S: OtpRepository,
    C: Clock,
{
    /// Check `code` against the current record for `email`.
    ///
    /// Expected failures come back as `VerifyOutcome::Failed`; `Err` is reserved for
    /// store failures.
    pub async fn execute(&self, input: VerifyOtpInput) -> Result<VerifyOutcome, MonitorError> {
        let Ok(email) = normalize_email(&input.email) else {
            return Ok(VerifyOutcome::Failed(OtpFailure::NotFound));
        };
        let Some(record) = self.store.find_current(&email).await? else {
            return Ok(VerifyOutcome::Failed(OtpFailure::NotFound));
        };

        let now = self.clock.now();
        if record.is_expired(now) {
            self.store.remove(&record).await?;
            return Ok(VerifyOutcome::Failed(OtpFailure::Expired));
        }
        if record.is_locked() {
            return Ok(VerifyOutcome::Failed(OtpFailure::AttemptsExceeded));
        }

        let code = input.code.trim();
        let well_formed = code.len() == OTP_LEN && code.bytes().all(|b| b.is_ascii_digit());
        if !well_formed || !secret_matches(code.to_owned(), record.code_hash.clone()).await? {
            let attempts = self.store.record_failed_attempt(&record).await?;
            tracing::debug!(email = %email, attempts, "otp mismatch");
            return Ok(VerifyOutcome::Failed(OtpFailure::Mismatch));
        }

        self.store.consume(&record, now).await?;
        Ok(VerifyOutcome::Verified {
            user_id: record.user_id,
        })
    }
}
