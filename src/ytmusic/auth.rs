use std::path::Path;

use chrono::Utc;
use serde::Deserialize;

use crate::ytmusic::error::CatalogError;

/// Contents of the `oauth.json` credentials file.
#[derive(Debug, Clone, Deserialize)]
pub struct OAuthCredentials {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    /// Expiry as a unix timestamp, when known.
    #[serde(default)]
    pub expires_at: Option<i64>,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

impl OAuthCredentials {
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        if !path.exists() {
            return Err(CatalogError::MissingCredentials(path.to_path_buf()));
        }
        let contents =
            std::fs::read_to_string(path).map_err(|source| CatalogError::UnreadableCredentials {
                path: path.to_path_buf(),
                source,
            })?;
        let credentials: Self = serde_json::from_str(&contents).map_err(|source| {
            CatalogError::MalformedCredentials {
                path: path.to_path_buf(),
                source,
            }
        })?;

        if credentials.is_expired(Utc::now().timestamp()) {
            return Err(CatalogError::ExpiredToken);
        }
        Ok(credentials)
    }

    pub fn is_expired(&self, now: i64) -> bool {
        self.expires_at.is_some_and(|expires_at| expires_at <= now)
    }

    pub fn authorization(&self) -> String {
        format!("{} {}", self.token_type, self.access_token)
    }
}
