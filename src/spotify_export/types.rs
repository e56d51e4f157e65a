use serde::Deserialize;
use serde_json::Value;

/// Top level of a spotify-backup `playlists.json` export.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SpotifyExport {
    #[serde(default)]
    pub playlists: Vec<SpotifyPlaylist>,
    /// Saved ("liked") albums, present when the export included them.
    #[serde(default)]
    pub albums: Vec<SavedAlbum>,
}

/// Playlist as stored in the export. `tracks` is normally an array of
/// playlist entries but is left untyped so one odd playlist cannot make the
/// whole document unreadable.
#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyPlaylist {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub tracks: Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SavedAlbum {
    #[serde(default)]
    pub album: SpotifyAlbumWithTracks,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SpotifyAlbumWithTracks {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub tracks: SpotifyAlbumTracks,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SpotifyAlbumTracks {
    #[serde(default)]
    pub items: Vec<Value>,
}

/// Track object inside a playlist entry.
#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyTrack {
    pub name: String,
    pub artists: Vec<SpotifyArtist>,
    pub album: SpotifyAlbum,
}

/// Track object inside a saved album; the album is implied.
#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyAlbumTrack {
    pub name: String,
    pub artists: Vec<SpotifyArtist>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyArtist {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyAlbum {
    pub name: String,
}
