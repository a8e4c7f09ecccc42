use crate::domain::types::OVERVIEW_DEFAULT_LIMIT;
use crate::usecase::otp::DeliveryPolicy;

const DEFAULT_HASH_COST: u32 = 10;
const DEFAULT_AUTH_BURST: u32 = 10;
const DEFAULT_AUTH_PER_MINUTE: u32 = 5;

/// Where OTP records live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtpStoreKind {
    Memory,
    Database,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtpSettings {
    pub store: OtpStoreKind,
    pub policy: DeliveryPolicy,
    /// Return codes in issue responses. Env var: `OTP_EXPOSE_CODES`.
    pub expose_codes: bool,
    /// bcrypt cost for stored code hashes. Env var: `OTP_HASH_COST`.
    pub hash_cost: u32,
    /// Env var: `OTP_SWEEP_INTERVAL_SECS`.
    pub sweep_interval_secs: u64,
}

/// Token bucket applied per client to the sign-in and registration routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitSettings {
    /// Requests a client may make back to back. Env var: `AUTH_RATE_LIMIT_BURST`.
    pub burst: u32,
    /// Sustained requests per minute. Env var: `AUTH_RATE_LIMIT_PER_MINUTE`.
    pub per_minute: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from_email: String,
    pub from_name: String,
}

/// Outgoing mail transport. SMTP wins when both are configured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MailConfig {
    Smtp(SmtpConfig),
    MailerSend { api_key: String, sender: String },
    Disabled,
}

/// Monitor service configuration loaded from environment variables.
#[derive(Debug)]
pub struct MonitorConfig {
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// HMAC secret for signing JWT access tokens.
    pub jwt_secret: String,
    /// Cookie domain attribute (root domain, e.g. "example.com").
    pub cookie_domain: String,
    /// TCP port to listen on (default 3120). Env var: `MONITOR_PORT`.
    pub monitor_port: u16,
    pub otp: OtpSettings,
    /// bcrypt cost for account passwords. Env var: `PASSWORD_HASH_COST`.
    pub password_hash_cost: u32,
    pub auth_rate_limit: RateLimitSettings,
    pub mail: MailConfig,
    /// Env var: `OVERVIEW_DEFAULT_LIMIT`.
    pub overview_default_limit: u64,
}

impl MonitorConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Self {
        let set = |key: &str| var(key).filter(|v| !v.trim().is_empty());
        let flag = |key: &str| {
            set(key).is_some_and(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true"))
        };

        let smtp = match (
            set("SMTP_HOST"),
            set("SMTP_USERNAME"),
            set("SMTP_PASSWORD"),
            set("SMTP_FROM_EMAIL"),
        ) {
            (Some(host), Some(username), Some(password), Some(from_email)) => Some(SmtpConfig {
                host,
                port: set("SMTP_PORT")
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(587),
                username,
                password,
                from_email,
                from_name: set("SMTP_FROM_NAME").unwrap_or_else(|| "Airlytics Security".to_owned()),
            }),
            _ => None,
        };
        let mail = match (smtp, set("MAILERSEND_API_KEY"), set("SENDER_EMAIL")) {
            (Some(smtp), _, _) => MailConfig::Smtp(smtp),
            (None, Some(api_key), Some(sender)) => MailConfig::MailerSend { api_key, sender },
            _ => MailConfig::Disabled,
        };

        Self {
            database_url: var("DATABASE_URL").expect("DATABASE_URL"),
            jwt_secret: var("JWT_SECRET").expect("JWT_SECRET"),
            cookie_domain: var("COOKIE_DOMAIN").expect("COOKIE_DOMAIN"),
            monitor_port: set("MONITOR_PORT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(3120),
            otp: OtpSettings {
                store: match set("OTP_STORE").as_deref().map(str::trim) {
                    Some("database") => OtpStoreKind::Database,
                    _ => OtpStoreKind::Memory,
                },
                policy: if flag("OTP_DELIVERY_FALLBACK") {
                    DeliveryPolicy::Fallback
                } else {
                    DeliveryPolicy::Strict
                },
                expose_codes: flag("OTP_EXPOSE_CODES"),
                hash_cost: set("OTP_HASH_COST")
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(DEFAULT_HASH_COST),
                sweep_interval_secs: set("OTP_SWEEP_INTERVAL_SECS")
                    .and_then(|v| v.parse().ok())
                    .filter(|secs| *secs > 0)
                    .unwrap_or(60),
            },
            password_hash_cost: set("PASSWORD_HASH_COST")
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_HASH_COST),
            auth_rate_limit: RateLimitSettings {
                burst: set("AUTH_RATE_LIMIT_BURST")
                    .and_then(|v| v.parse().ok())
                    .filter(|burst| *burst > 0)
                    .unwrap_or(DEFAULT_AUTH_BURST),
                per_minute: set("AUTH_RATE_LIMIT_PER_MINUTE")
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(DEFAULT_AUTH_PER_MINUTE),
            },
            mail,
            overview_default_limit: set("OVERVIEW_DEFAULT_LIMIT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(OVERVIEW_DEFAULT_LIMIT),
        }
    }
}
