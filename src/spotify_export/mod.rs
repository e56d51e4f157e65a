//! Reader for the Spotify library export (spotify-backup `playlists.json`).

mod types;

use std::path::Path;
use std::str::FromStr;

use color_eyre::eyre::{Result, WrapErr, eyre};
use serde_json::Value;

use crate::model::TrackDescriptor;

pub use self::types::{SpotifyExport, SpotifyPlaylist};
use self::types::{SpotifyAlbumTrack, SpotifyTrack};

/// Name of the virtual playlist holding the user's liked songs.
pub const LIKED_SONGS: &str = "Liked Songs";

/// Source playlist argument value selecting the liked songs.
pub const LIKED_SENTINEL: &str = "LIKED";

/// Which source playlist to read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourcePlaylist {
    LikedSongs,
    Id(String),
}

impl FromStr for SourcePlaylist {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s == LIKED_SENTINEL {
            Ok(SourcePlaylist::LikedSongs)
        } else {
            Ok(SourcePlaylist::Id(s.to_string()))
        }
    }
}

impl SpotifyExport {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("Failed to read Spotify export: {}", path.display()))?;
        Self::parse(&contents)
            .wrap_err_with(|| format!("Failed to parse Spotify export: {}", path.display()))
    }

    pub fn parse(contents: &str) -> Result<Self> {
        Ok(serde_json::from_str(contents)?)
    }

    pub fn find_playlist(&self, selector: &SourcePlaylist) -> Result<&SpotifyPlaylist> {
        let found = match selector {
            SourcePlaylist::LikedSongs => self.playlists.iter().find(|p| p.name == LIKED_SONGS),
            SourcePlaylist::Id(id) => self
                .playlists
                .iter()
                .find(|p| p.id.as_deref() == Some(id.as_str())),
        };
        found.ok_or_else(|| eyre!("Could not find Spotify playlist {:?}", selector))
    }

    /// Every playlist except the liked songs.
    pub fn user_playlists(&self) -> impl Iterator<Item = &SpotifyPlaylist> {
        self.playlists.iter().filter(|p| p.name != LIKED_SONGS)
    }

    /// Tracks of every saved album, album by album.
    pub fn liked_album_tracks(&self) -> Vec<TrackDescriptor> {
        let mut tracks = Vec::new();
        for saved in &self.albums {
            let album = &saved.album;
            for item in &album.tracks.items {
                match serde_json::from_value::<SpotifyAlbumTrack>(item.clone()) {
                    Ok(track) if !track.artists.is_empty() => {
                        tracks.push(TrackDescriptor::new(
                            track.name,
                            track.artists[0].name.clone(),
                            album.name.clone(),
                        ));
                    }
                    _ => log::warn!(
                        "Album track seems to be malformed, skipping. Album: {:?} Track: {}",
                        album.name,
                        item
                    ),
                }
            }
        }
        tracks
    }
}

impl SpotifyPlaylist {
    /// Name to use on the destination; unnamed playlists get one derived from their id.
    pub fn display_name(&self) -> String {
        if self.name.is_empty() {
            format!(
                "Unnamed Spotify Playlist {}",
                self.id.as_deref().unwrap_or_default()
            )
        } else {
            self.name.clone()
        }
    }

    pub fn entry_count(&self) -> usize {
        self.tracks.as_array().map(Vec::len).unwrap_or(0)
    }

    /// Tracks of this playlist. The export lists the newest addition first, so
    /// `reverse` restores the order they were added in.
    ///
    /// Null or incomplete entries are skipped with a warning.
    pub fn tracks(&self, reverse: bool) -> Vec<TrackDescriptor> {
        let entries: &[Value] = self.tracks.as_array().map(Vec::as_slice).unwrap_or(&[]);

        let mut tracks: Vec<TrackDescriptor> = entries.iter().filter_map(entry_to_track).collect();
        if reverse {
            tracks.reverse();
        }
        tracks
    }
}

fn entry_to_track(entry: &Value) -> Option<TrackDescriptor> {
    let track = match entry.get("track") {
        Some(track) if !track.is_null() => track,
        _ => {
            log::warn!("Spotify track seems to be malformed, skipping. Track: {}", entry);
            return None;
        }
    };

    match serde_json::from_value::<SpotifyTrack>(track.clone()) {
        Ok(track) => match track.artists.into_iter().next() {
            Some(artist) => Some(TrackDescriptor::new(track.name, artist.name, track.album.name)),
            None => {
                log::warn!(
                    "Spotify track has no artists, skipping. Track: {:?}",
                    track.name
                );
                None
            }
        },
        Err(e) => {
            log::warn!(
                "Spotify track seems to be malformed ({}), skipping. Track: {}",
                e,
                entry
            );
            None
        }
    }
}
