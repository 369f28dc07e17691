//! Auth command handler.
//!
//! There is no interactive consent flow here; the refresh token in the credentials file is the
//! long-lived grant. This command only proves the exchange works.

use crate::api::TokenProvider;
use crate::commands::Out;
use crate::{Config, Result};
use anyhow::Context;
use tracing::info;

/// Handles the `finapp auth` command: exchanges the stored refresh token for an access token and
/// reports until when it is valid. Fails with the raw token-endpoint response when the exchange
/// does not produce an access token.
pub async fn auth(config: &Config) -> Result<Out<String>> {
    let mut token_provider = TokenProvider::load(&config.credentials_path())
        .await
        .context("Unable to load the credentials file, run 'finapp init' first")?;
    let _ = token_provider
        .token_with_refresh()
        .await
        .context("Unable to exchange the refresh token")?;

    let expiry = match token_provider.expires_at() {
        Some(at) => at.to_rfc3339(),
        None => "unknown".to_string(),
    };
    info!("The refresh token is valid");
    Ok(Out::new(
        format!("Access token obtained, valid until {expiry}"),
        expiry,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::TestEnv;

    #[tokio::test]
    async fn test_auth_missing_credentials_is_error() {
        let env = TestEnv::new().await;
        // the test environment has no credentials file
        let result = auth(&env.config()).await;
        assert!(result.is_err());
        let message = format!("{:#}", result.unwrap_err());
        assert!(message.contains("credentials"));
    }
}
