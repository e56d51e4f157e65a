use color_eyre::eyre::Result;
use reqwest::Client;
use url::Url;

use crate::model::{Candidate, PlaylistSummary, Privacy, Rating, ResultKind};
use crate::ports::catalog::DestinationCatalog;
use crate::ytmusic::OAuthCredentials;
use crate::ytmusic::request::BASE_URL;
use crate::ytmusic::{playlist, rating, search};

pub struct YtMusicHttpAdapter {
    client: Client,
    base_url: Url,
    credentials: OAuthCredentials,
}

impl YtMusicHttpAdapter {
    pub fn new(credentials: OAuthCredentials) -> Result<Self> {
        Ok(Self {
            client: Client::builder()
                .user_agent("Mozilla/5.0 (X11; Linux x86_64; rv:128.0) Gecko/20100101 Firefox/128.0")
                .build()?,
            base_url: Url::parse(BASE_URL)?,
            credentials,
        })
    }
}

#[async_trait::async_trait]
impl DestinationCatalog for YtMusicHttpAdapter {
    async fn search(&self, query: &str, kind: ResultKind) -> Result<Vec<Candidate>> {
        Ok(search::search(&self.client, &self.base_url, &self.credentials, query, kind).await?)
    }

    async fn search_suggestions(&self, query: &str) -> Result<Vec<String>> {
        Ok(
            search::search_suggestions(&self.client, &self.base_url, &self.credentials, query)
                .await?,
        )
    }

    async fn create_playlist(
        &self,
        title: &str,
        description: &str,
        privacy: Privacy,
    ) -> Result<String> {
        Ok(playlist::create_playlist(
            &self.client,
            &self.base_url,
            &self.credentials,
            title,
            description,
            privacy,
        )
        .await?)
    }

    async fn get_playlist(&self, playlist_id: &str) -> Result<PlaylistSummary> {
        Ok(
            playlist::get_playlist(&self.client, &self.base_url, &self.credentials, playlist_id)
                .await?,
        )
    }

    async fn list_playlists(&self, limit: usize) -> Result<Vec<PlaylistSummary>> {
        Ok(
            playlist::list_playlists(&self.client, &self.base_url, &self.credentials, limit)
                .await?,
        )
    }

    async fn add_playlist_items(
        &self,
        playlist_id: &str,
        ids: &[String],
        allow_duplicates: bool,
    ) -> Result<()> {
        Ok(playlist::add_playlist_items(
            &self.client,
            &self.base_url,
            &self.credentials,
            playlist_id,
            ids,
            allow_duplicates,
        )
        .await?)
    }

    async fn rate_track(&self, id: &str, rating: Rating) -> Result<()> {
        Ok(rating::rate_track(&self.client, &self.base_url, &self.credentials, id, rating).await?)
    }
}
