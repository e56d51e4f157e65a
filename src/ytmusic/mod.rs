//! Minimal YouTube Music InnerTube API: search, playlists and ratings.
//!
//! Every request is a JSON `POST` to `https://music.youtube.com/youtubei/v1/<endpoint>`
//! authorized with an OAuth bearer token. Responses are deeply nested renderer
//! trees, so they are walked as `serde_json::Value` instead of typed structs.

pub mod auth;
pub mod error;
pub mod playlist;
pub mod rating;
pub mod request;
pub mod search;

pub use self::auth::OAuthCredentials;
pub use self::error::CatalogError;
