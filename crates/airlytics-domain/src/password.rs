//! Password strength rules applied at registration.

use crate::email::sanitize_name;

pub const MIN_PASSWORD_CHARS: usize = 8;

/// Pieces of personal data shorter than this are not checked against the password.
const MIN_PERSONAL_TOKEN_CHARS: usize = 3;

const COMMON_PASSWORDS: [&str; 15] = [
    "password",
    "password1",
    "password123",
    "123456",
    "123456789",
    "qwerty",
    "abc123",
    "letmein",
    "welcome",
    "admin",
    "iloveyou",
    "monkey",
    "dragon",
    "football",
    "sunshine",
];

/// Why a password was rejected. The display text is shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PasswordError {
    #[error("Password must be at least 8 characters long")]
    TooShort,
    #[error("Password is too common. Choose a more unique password.")]
    Common,
    #[error("Password must include at least one uppercase letter")]
    MissingUppercase,
    #[error("Password must include at least one lowercase letter")]
    MissingLowercase,
    #[error("Password must include at least one number")]
    MissingDigit,
    #[error("Password must include at least one special character")]
    MissingSpecial,
    #[error("Password cannot contain parts of your name or email")]
    ContainsPersonalInfo,
}

/// Check `password` against the strength rules.
///
/// `email` and `name` are the account's own values; a password containing the email's
/// local part or any word of the name is rejected.
pub fn validate_password_strength(
    password: &str,
    email: &str,
    name: &str,
) -> Result<(), PasswordError> {
    if password.chars().count() < MIN_PASSWORD_CHARS {
        return Err(PasswordError::TooShort);
    }

    let lowered = password.to_lowercase();
    if COMMON_PASSWORDS.contains(&lowered.as_str()) {
        return Err(PasswordError::Common);
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(PasswordError::MissingUppercase);
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        return Err(PasswordError::MissingLowercase);
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(PasswordError::MissingDigit);
    }
    if password.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(PasswordError::MissingSpecial);
    }

    if personal_tokens(email, name).any(|token| lowered.contains(&token)) {
        return Err(PasswordError::ContainsPersonalInfo);
    }
    Ok(())
}

fn personal_tokens(email: &str, name: &str) -> impl Iterator<Item = String> {
    let local = email
        .trim()
        .to_lowercase()
        .split('@')
        .next()
        .unwrap_or_default()
        .to_owned();
    let words: Vec<String> = sanitize_name(name)
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .map(str::to_owned)
        .collect();
    std::iter::once(local)
        .chain(words)
        .filter(|token| token.chars().count() >= MIN_PERSONAL_TOKEN_CHARS)
}
