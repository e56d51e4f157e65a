use color_eyre::eyre::Result;

use crate::model::{Candidate, PlaylistSummary, Privacy, Rating, ResultKind};

/// Port trait wrapping the destination catalog capabilities used by the sync engine.
///
/// Implementations live in `ytmusic::client` (production) or test mocks.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait DestinationCatalog: Send + Sync {
    async fn search(&self, query: &str, kind: ResultKind) -> Result<Vec<Candidate>>;

    async fn search_suggestions(&self, query: &str) -> Result<Vec<String>>;

    async fn create_playlist(
        &self,
        title: &str,
        description: &str,
        privacy: Privacy,
    ) -> Result<String>;

    async fn get_playlist(&self, playlist_id: &str) -> Result<PlaylistSummary>;

    async fn list_playlists(&self, limit: usize) -> Result<Vec<PlaylistSummary>>;

    async fn add_playlist_items(
        &self,
        playlist_id: &str,
        ids: &[String],
        allow_duplicates: bool,
    ) -> Result<()>;

    async fn rate_track(&self, id: &str, rating: Rating) -> Result<()>;
}
