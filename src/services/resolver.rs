use std::str::FromStr;
use std::time::Duration;

use color_eyre::eyre::{Result, WrapErr, ensure};

use crate::model::Privacy;
use crate::ports::catalog::DestinationCatalog;
use crate::retry::RetryPolicy;
use crate::spotify_export::LIKED_SENTINEL;

/// How many library playlists are scanned when looking one up by name.
const LIBRARY_SCAN_LIMIT: usize = 5000;

/// Destination argument of a copy: where the tracks should end up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DestinationRef {
    /// `LIKED`: rate the tracks instead of adding them to a playlist.
    Liked,
    /// A playlist id, used as is after checking it exists.
    Id(String),
    /// `+name`: the library playlist with this title, created when missing.
    Name(String),
    /// Empty: a new playlist named after the source playlist.
    Auto,
}

impl FromStr for DestinationRef {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Ok(if s.is_empty() {
            DestinationRef::Auto
        } else if s == LIKED_SENTINEL {
            DestinationRef::Liked
        } else if let Some(name) = s.strip_prefix('+') {
            DestinationRef::Name(name.to_string())
        } else {
            DestinationRef::Id(s.to_string())
        })
    }
}

pub struct PlaylistResolver<'a, C: DestinationCatalog> {
    catalog: &'a C,
    retry: &'a RetryPolicy,
    privacy: Privacy,
    settle: Duration,
}

impl<'a, C: DestinationCatalog> PlaylistResolver<'a, C> {
    pub fn new(catalog: &'a C, retry: &'a RetryPolicy, privacy: Privacy, settle: Duration) -> Self {
        Self {
            catalog,
            retry,
            privacy,
            settle,
        }
    }

    /// Turn a destination reference into a playlist id, or `None` for liked tracks.
    ///
    /// `source_name` names the playlist created for [`DestinationRef::Auto`].
    pub async fn resolve(
        &self,
        destination: &DestinationRef,
        source_name: &str,
    ) -> Result<Option<String>> {
        match destination {
            DestinationRef::Liked => Ok(None),
            DestinationRef::Id(id) => {
                let playlist = self.catalog.get_playlist(id).await.wrap_err_with(|| {
                    format!(
                        "Unable to find YouTube Music playlist {id}. Make sure the id is correct, \
                         it should be something like 'PL_DhcdsaJ7echjfdsaJFhdsWUd73HJFca'"
                    )
                })?;
                log::info!("== Youtube Playlist: {}", playlist.title);
                Ok(Some(playlist.id))
            }
            DestinationRef::Name(name) => self.find_or_create(name).await.map(Some),
            DestinationRef::Auto => {
                log::info!("No playlist name or ID provided, creating playlist...");
                self.create(source_name).await.map(Some)
            }
        }
    }

    pub async fn find_or_create(&self, name: &str) -> Result<String> {
        match self.find_by_name(name).await? {
            Some(id) => Ok(id),
            None => self.create(name).await,
        }
    }

    /// Exact title match over the user's library playlists.
    pub async fn find_by_name(&self, name: &str) -> Result<Option<String>> {
        let playlists = self
            .catalog
            .list_playlists(LIBRARY_SCAN_LIMIT)
            .await
            .wrap_err_with(|| format!("Attempting to look up playlist '{name}' failed"))?;
        let id = playlists
            .into_iter()
            .find(|p| p.title == name)
            .map(|p| p.id);
        log::info!("Looking up playlist '{}': id={:?}", name, id);
        Ok(id)
    }

    /// Create a playlist titled (and described) `name`. Retries like track
    /// writes do, but running out of retries is fatal here.
    pub async fn create(&self, name: &str) -> Result<String> {
        ensure!(!name.is_empty(), "Cannot create a playlist without a name");

        let id = self
            .retry
            .run(&format!("create_playlist: {name}"), || {
                self.catalog.create_playlist(name, name, self.privacy)
            })
            .await
            .wrap_err_with(|| {
                format!("Could not create playlist \"{name}\" after multiple retries")
            })?;
        log::info!("NOTE: Created playlist '{}' with ID: {}", name, id);

        // The new id is not usable right away.
        tokio::time::sleep(self.settle).await;
        Ok(id)
    }
}
