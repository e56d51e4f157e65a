use std::fmt;

use serde::{Deserialize, Serialize};

/// One source track as read from the export.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TrackDescriptor {
    pub title: String,
    pub artist: String,
    pub album: String,
}

impl TrackDescriptor {
    pub fn new(
        title: impl Into<String>,
        artist: impl Into<String>,
        album: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            artist: artist.into(),
            album: album.into(),
        }
    }

    /// The query sent to the destination search for this track.
    pub fn search_query(&self) -> String {
        format!("{} {}", self.title, self.artist)
    }
}

impl fmt::Display for TrackDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {} - {}", self.title, self.artist, self.album)
    }
}

/// Which result shelf a destination search is restricted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResultKind {
    Songs,
    Videos,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateArtist {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateAlbum {
    pub name: String,
}

/// A destination search result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub id: String,
    pub title: String,
    pub artists: Vec<CandidateArtist>,
    pub album: Option<CandidateAlbum>,
    pub kind: ResultKind,
}

impl Candidate {
    /// Name of the first credited artist, if any.
    pub fn primary_artist(&self) -> Option<&str> {
        self.artists.first().map(|a| a.name.as_str())
    }

    pub fn album_name(&self) -> Option<&str> {
        self.album.as_ref().map(|a| a.name.as_str())
    }

    pub fn url(&self) -> String {
        format!("https://youtu.be/{}", self.id)
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {} - {} - {}",
            self.title,
            self.primary_artist().unwrap_or("<Unknown>"),
            self.album_name().unwrap_or("no-album"),
            self.id
        )
    }
}

/// Visibility of a playlist created on the destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Privacy {
    #[default]
    Private,
    Public,
    Unlisted,
}

impl Privacy {
    pub fn as_api_str(&self) -> &'static str {
        match self {
            Privacy::Private => "PRIVATE",
            Privacy::Public => "PUBLIC",
            Privacy::Unlisted => "UNLISTED",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rating {
    Like,
}

/// Summary of a destination playlist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistSummary {
    pub id: String,
    pub title: String,
}
