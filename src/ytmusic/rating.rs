use reqwest::Client;
use serde_json::json;
use url::Url;

use crate::model::Rating;
use crate::ytmusic::auth::OAuthCredentials;
use crate::ytmusic::error::CatalogError;
use crate::ytmusic::request::post;

fn rating_endpoint(rating: Rating) -> &'static str {
    match rating {
        Rating::Like => "like/like",
    }
}

/// Endpoint
/// - `POST like/like`
pub async fn rate_track(
    client: &Client,
    base_url: &Url,
    credentials: &OAuthCredentials,
    video_id: &str,
    rating: Rating,
) -> Result<(), CatalogError> {
    let body = json!({ "target": { "videoId": video_id } });
    post(
        client,
        base_url,
        credentials,
        rating_endpoint(rating),
        &[],
        body,
    )
    .await?;
    Ok(())
}
