use reqwest::Client;
use reqwest::header::AUTHORIZATION;
use serde_json::{Value, json};
use url::Url;

use crate::ytmusic::auth::OAuthCredentials;
use crate::ytmusic::error::CatalogError;

pub const BASE_URL: &str = "https://music.youtube.com/youtubei/v1/";
const ORIGIN: &str = "https://music.youtube.com";
const CLIENT_NAME: &str = "WEB_REMIX";
const CLIENT_VERSION: &str = "1.20241127.01.00";

/// Client context sent with every InnerTube request.
fn context() -> Value {
    json!({
        "client": {
            "clientName": CLIENT_NAME,
            "clientVersion": CLIENT_VERSION,
            "hl": "en",
        },
        "user": {},
    })
}

/// POST `body` to an InnerTube endpoint and return the decoded JSON response.
///
/// `endpoint` is relative to the base url, e.g. `"search"` or `"browse/edit_playlist"`.
pub async fn post(
    client: &Client,
    base_url: &Url,
    credentials: &OAuthCredentials,
    endpoint: &str,
    query: &[(&str, &str)],
    mut body: Value,
) -> Result<Value, CatalogError> {
    let url = base_url.join(endpoint)?;
    body["context"] = context();

    let http_error = |source| CatalogError::Http {
        endpoint: endpoint.to_string(),
        source,
    };

    tracing::debug!("POST {}", url);
    client
        .post(url)
        .query(&[("alt", "json")])
        .query(query)
        .header(AUTHORIZATION, credentials.authorization())
        .header("X-Origin", ORIGIN)
        .header("Origin", ORIGIN)
        .json(&body)
        .send()
        .await
        .map_err(http_error)?
        .error_for_status()
        .map_err(http_error)?
        .json::<Value>()
        .await
        .map_err(http_error)
}

/// Text of the first run of a `{"runs": [{"text": ...}]}` object at `pointer`.
pub fn first_run_text<'a>(value: &'a Value, pointer: &str) -> Option<&'a str> {
    value
        .pointer(pointer)?
        .pointer("/runs/0/text")?
        .as_str()
}
