use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::model::{Candidate, CandidateAlbum, CandidateArtist, ResultKind};
use crate::session::SessionLog;

pub fn candidate(id: &str, title: &str, artist: &str, album: Option<&str>) -> Candidate {
    Candidate {
        id: id.to_string(),
        title: title.to_string(),
        artists: vec![CandidateArtist {
            name: artist.to_string(),
        }],
        album: album.map(|name| CandidateAlbum {
            name: name.to_string(),
        }),
        kind: ResultKind::Songs,
    }
}

pub fn video(id: &str, title: &str, channel: &str) -> Candidate {
    Candidate {
        kind: ResultKind::Videos,
        ..candidate(id, title, channel, None)
    }
}

/// A session log backed by a file in a fresh temp directory.
pub fn temp_log() -> (TempDir, PathBuf, SessionLog) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.csv");
    let log = SessionLog::open(&path).unwrap();
    (dir, path, log)
}

pub fn read_log(path: &Path) -> String {
    std::fs::read_to_string(path).unwrap()
}
