//! bcrypt hashing for passwords and OTP codes, run off the async executor.

use anyhow::Context as _;

use crate::error::MonitorError;

pub(crate) async fn hash_secret(secret: String, cost: u32) -> Result<String, MonitorError> {
    let hash = tokio::task::spawn_blocking(move || bcrypt::hash(secret, cost))
        .await
        .context("join hash task")?
        .context("hash secret")?;
    Ok(hash)
}

pub(crate) async fn secret_matches(secret: String, hash: String) -> Result<bool, MonitorError> {
    let matches = tokio::task::spawn_blocking(move || bcrypt::verify(secret, &hash))
        .await
        .context("join verify task")?
        .context("verify secret hash")?;
    Ok(matches)
}
