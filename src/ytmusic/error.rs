use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error(
        "No file '{0}' exists. Have you logged in to YouTube Music? Create it with an OAuth token first"
    )]
    MissingCredentials(PathBuf),

    #[error("Failed to read credentials file '{path}'")]
    UnreadableCredentials {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON decode error in credentials file '{path}', log in to YouTube Music again")]
    MalformedCredentials {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("YouTube Music access token expired, log in again")]
    ExpiredToken,

    #[error("Request to '{endpoint}' failed")]
    Http {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Invalid endpoint url")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Unexpected response from '{endpoint}': {reason}")]
    UnexpectedResponse { endpoint: String, reason: String },
}

impl CatalogError {
    pub fn unexpected(endpoint: &str, reason: impl Into<String>) -> Self {
        Self::UnexpectedResponse {
            endpoint: endpoint.to_string(),
            reason: reason.into(),
        }
    }
}
