use serde::Deserialize;

use crate::foundation::error::{SpotDiffError, SpotDiffResult};

/// Environment variable holding the OAuth token JSON.
pub const TOKEN_ENV: &str = "YOUTUBE_TOKEN_JSON";
/// Environment variable holding the OAuth client secrets JSON.
pub const CLIENT_SECRETS_ENV: &str = "YOUTUBE_CLIENT_SECRETS_JSON";

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct TokenInfo {
    /// Access token, possibly expired.
    pub token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct ClientSecrets {
    pub client_id: String,
    pub client_secret: String,
    pub token_uri: String,
}

#[derive(Deserialize)]
struct SecretsFile {
    installed: ClientSecrets,
}

/// OAuth material needed to upload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Credentials {
    pub token: TokenInfo,
    pub client: ClientSecrets,
}

impl Credentials {
    /// Parse the token and client secrets documents.
    pub fn from_json_strs(token_json: &str, client_secrets_json: &str) -> SpotDiffResult<Self> {
        let token: TokenInfo = serde_json::from_str(token_json)
            .map_err(|e| SpotDiffError::publish(format!("parse {TOKEN_ENV}: {e}")))?;
        let secrets: SecretsFile = serde_json::from_str(client_secrets_json)
            .map_err(|e| SpotDiffError::publish(format!("parse {CLIENT_SECRETS_ENV}: {e}")))?;
        if token.token.trim().is_empty() && token.refresh_token.is_none() {
            return Err(SpotDiffError::publish(format!(
                "{TOKEN_ENV} has neither a token nor a refresh_token"
            )));
        }
        Ok(Self {
            token,
            client: secrets.installed,
        })
    }

    /// Read both credential values from the environment.
    ///
    /// Fails when either variable is unset or empty.
    pub fn from_env() -> SpotDiffResult<Self> {
        let token = env_value(TOKEN_ENV)?;
        let secrets = env_value(CLIENT_SECRETS_ENV)?;
        Self::from_json_strs(&token, &secrets)
    }
}

fn env_value(name: &str) -> SpotDiffResult<String> {
    match std::env::var(name) {
        Ok(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(SpotDiffError::publish(format!(
            "{name} must be set to upload"
        ))),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/publish/credentials.rs"]
mod tests;
