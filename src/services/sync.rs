use std::time::Duration;

use color_eyre::eyre::Result;
use tokio_util::sync::CancellationToken;

use crate::matching::MatchOutcome;
use crate::model::{Privacy, ResultKind, TrackDescriptor};
use crate::ports::catalog::DestinationCatalog;
use crate::services::copier::{Copier, CopyOptions, CopyReport};
use crate::services::resolver::{DestinationRef, PlaylistResolver};
use crate::session::{SessionLog, SessionState};
use crate::spotify_export::{SourcePlaylist, SpotifyExport};

#[derive(Debug, Clone)]
pub struct SyncSettings {
    pub copy: CopyOptions,
    /// Copy playlists oldest addition first.
    pub reverse_playlist: bool,
    pub privacy: Privacy,
    pub playlist_settle: Duration,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            copy: CopyOptions::default(),
            reverse_playlist: true,
            privacy: Privacy::Private,
            playlist_settle: Duration::from_secs(1),
        }
    }
}

/// Result of a diagnostic search for one track.
#[derive(Debug)]
pub struct SearchReport {
    pub query: String,
    pub suggestions: Vec<String>,
    pub outcome: MatchOutcome,
}

/// Library level operations: resolves destinations and runs one copier
/// session per source collection, all sharing one session log.
pub struct SyncService<C: DestinationCatalog> {
    catalog: C,
    settings: SyncSettings,
    log: SessionLog,
    cancel: CancellationToken,
}

impl<C: DestinationCatalog> SyncService<C> {
    pub fn new(
        catalog: C,
        settings: SyncSettings,
        log: SessionLog,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            catalog,
            settings,
            log,
            cancel,
        }
    }

    fn resolver(&self) -> PlaylistResolver<'_, C> {
        PlaylistResolver::new(
            &self.catalog,
            &self.settings.copy.retry,
            self.settings.privacy,
            self.settings.playlist_settle,
        )
    }

    /// `Ok(None)` when the shutdown signal fires before `future` is done.
    async fn until_cancelled<T>(
        &self,
        future: impl Future<Output = Result<T>>,
    ) -> Result<Option<T>> {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Ok(None),
            value = future => value.map(Some),
        }
    }

    async fn run_copy(
        &mut self,
        label: &str,
        tracks: Vec<TrackDescriptor>,
        target: Option<&str>,
    ) -> Result<CopyReport> {
        let copier = Copier::new(&self.catalog, &self.settings.copy, self.cancel.clone());
        let session = SessionState::begin(&mut self.log, label)?;
        copier.copy(tracks, target, session).await
    }

    /// Copy one source playlist to one destination.
    pub async fn copy_playlist(
        &mut self,
        export: &SpotifyExport,
        source: &SourcePlaylist,
        destination: &DestinationRef,
    ) -> Result<CopyReport> {
        log::info!("Using search algo n°: {}", self.settings.copy.strategy);
        let playlist = export.find_playlist(source)?;
        let resolved = self
            .until_cancelled(self.resolver().resolve(destination, &playlist.display_name()))
            .await?;
        let Some(target) = resolved else {
            log::warn!("Interrupted before copying {}", playlist.display_name());
            return Ok(CopyReport::cancelled());
        };

        let tracks = playlist.tracks(self.settings.reverse_playlist);
        let label = format!("playlist {} -> {}", playlist.display_name(), target_label(&target));
        self.run_copy(&label, tracks, target.as_deref()).await
    }

    /// Copy every source playlist except the liked songs into a destination
    /// playlist of the same name, creating the ones that are missing.
    ///
    /// Stops early when a run is interrupted; no playlist is looked up or
    /// created after a shutdown signal.
    pub async fn copy_all_playlists(&mut self, export: &SpotifyExport) -> Result<Vec<CopyReport>> {
        let mut reports = Vec::new();
        for playlist in export.user_playlists() {
            let name = playlist.display_name();
            let resolved = self
                .until_cancelled(self.resolver().find_or_create(&name))
                .await?;
            let Some(target) = resolved else {
                log::warn!("Interrupted before copying {}", name);
                reports.push(CopyReport::cancelled());
                return Ok(reports);
            };

            let tracks = playlist.tracks(self.settings.reverse_playlist);
            let label = format!("playlist {} -> {}", name, target);
            let report = self.run_copy(&label, tracks, Some(&target)).await?;
            reports.push(report);
            if report.interrupted {
                return Ok(reports);
            }
            log::info!("\nPlaylist done!\n");
        }
        log::info!("All done!");
        Ok(reports)
    }

    /// Like every track of the source "Liked Songs".
    pub async fn load_liked(&mut self, export: &SpotifyExport) -> Result<CopyReport> {
        self.copy_playlist(export, &SourcePlaylist::LikedSongs, &DestinationRef::Liked)
            .await
    }

    /// Like every track of every saved album.
    pub async fn load_liked_albums(&mut self, export: &SpotifyExport) -> Result<CopyReport> {
        let tracks = export.liked_album_tracks();
        self.run_copy("liked albums -> liked", tracks, None).await
    }

    pub async fn create_playlist(&self, name: &str) -> Result<String> {
        self.resolver().create(name).await
    }

    /// Look a single track up the same way a copy would, without writing anything.
    pub async fn search(&self, track: &TrackDescriptor) -> Result<SearchReport> {
        let query = track.search_query();
        let suggestions = self.catalog.search_suggestions(&query).await?;
        let candidates = self.catalog.search(&query, ResultKind::Songs).await?;
        if candidates.is_empty() {
            return Err(crate::matching::LookupError::NoResults { query }.into());
        }

        let outcome = self
            .settings
            .copy
            .strategy
            .matcher()
            .resolve(track, &candidates, &self.catalog)
            .await?;
        Ok(SearchReport {
            query,
            suggestions,
            outcome,
        })
    }
}

fn target_label(target: &Option<String>) -> &str {
    target.as_deref().unwrap_or("liked")
}
