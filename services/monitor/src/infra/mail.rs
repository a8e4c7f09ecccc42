use std::sync::Arc;

use anyhow::Context as _;
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use serde_json::json;

use crate::config::{MailConfig, SmtpConfig};
use crate::domain::repository::{MailMessage, Mailer};
use crate::error::MailError;

const MAILERSEND_URL: &str = "https://api.mailersend.com/v1/email";

// ── SMTP ──────────────────────────────────────────────────────────────────────

/// STARTTLS SMTP relay.
#[derive(Clone)]
pub struct SmtpMailer {
    transport: Arc<AsyncSmtpTransport<Tokio1Executor>>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(config: &SmtpConfig) -> anyhow::Result<Self> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .context("build smtp transport")?
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ))
            .port(config.port)
            .build();
        let from = format!("{} <{}>", config.from_name, config.from_email)
            .parse()
            .context("parse smtp sender")?;
        Ok(Self {
            transport: Arc::new(transport),
            from,
        })
    }
}

impl Mailer for SmtpMailer {
    async fn send(&self, message: &MailMessage) -> Result<(), MailError> {
        let to: Mailbox = message
            .to
            .parse()
            .map_err(|e| MailError::Rejected(format!("invalid recipient: {e}")))?;
        let email = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(message.subject.clone())
            .multipart(MultiPart::alternative_plain_html(
                message.text.clone(),
                message.html.clone(),
            ))
            .map_err(|e| MailError::Rejected(e.to_string()))?;

        self.transport
            .send(email)
            .await
            .map_err(|e| MailError::Transport(e.to_string()))?;
        Ok(())
    }
}

// ── MailerSend ────────────────────────────────────────────────────────────────

/// MailerSend HTTP API.
#[derive(Clone)]
pub struct MailerSendMailer {
    client: reqwest::Client,
    api_key: String,
    sender: String,
    endpoint: String,
}

impl MailerSendMailer {
    pub fn new(api_key: String, sender: String) -> Self {
        Self::with_endpoint(api_key, sender, MAILERSEND_URL.to_owned())
    }

    pub fn with_endpoint(api_key: String, sender: String, endpoint: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            sender,
            endpoint,
        }
    }
}

impl Mailer for MailerSendMailer {
    async fn send(&self, message: &MailMessage) -> Result<(), MailError> {
        let body = json!({
            "from": { "email": self.sender, "name": "Airlytics" },
            "to": [{ "email": message.to }],
            "subject": message.subject,
            "text": message.text,
            "html": message.html,
        });
        let resp = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| MailError::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let detail = resp.text().await.unwrap_or_default();
            return Err(MailError::Rejected(format!("status {status}: {detail}")));
        }
        Ok(())
    }
}

// ── AppMailer ─────────────────────────────────────────────────────────────────

/// The transport picked at startup.
#[derive(Clone)]
pub enum AppMailer {
    Smtp(SmtpMailer),
    MailerSend(MailerSendMailer),
    /// No credentials configured; every send fails.
    Disabled,
}

impl AppMailer {
    pub fn from_config(config: &MailConfig) -> anyhow::Result<Self> {
        Ok(match config {
            MailConfig::Smtp(smtp) => Self::Smtp(SmtpMailer::new(smtp)?),
            MailConfig::MailerSend { api_key, sender } => {
                Self::MailerSend(MailerSendMailer::new(api_key.clone(), sender.clone()))
            }
            MailConfig::Disabled => Self::Disabled,
        })
    }

    pub fn transport_name(&self) -> &'static str {
        match self {
            Self::Smtp(_) => "smtp",
            Self::MailerSend(_) => "mailersend",
            Self::Disabled => "disabled",
        }
    }
}

impl Mailer for AppMailer {
    async fn send(&self, message: &MailMessage) -> Result<(), MailError> {
        match self {
            Self::Smtp(mailer) => mailer.send(message).await,
            Self::MailerSend(mailer) => mailer.send(message).await,
            Self::Disabled => Err(MailError::MissingCredentials),
        }
    }
}
