use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;

use chrono::Local;
use color_eyre::eyre::{Result, WrapErr};

use crate::model::{Candidate, TrackDescriptor};
use crate::session::SessionCounters;

/// Append-only CSV record of everything that needs a human look after a run.
///
/// Every row starts with a local timestamp. A blank row closes each session
/// and each fallback pair.
pub struct SessionLog {
    writer: csv::Writer<Box<dyn Write + Send>>,
}

impl SessionLog {
    /// Open (or create) the log file in append mode.
    pub fn open(path: &Path) -> Result<Self> {
        let file: File = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .wrap_err_with(|| format!("Failed to open session log: {}", path.display()))?;
        Ok(Self::from_writer(Box::new(file)))
    }

    fn from_writer(writer: Box<dyn Write + Send>) -> Self {
        let writer = csv::WriterBuilder::new()
            .flexible(true)
            .has_headers(false)
            .from_writer(writer);
        Self { writer }
    }

    fn row(&mut self, fields: &[&str]) -> Result<()> {
        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
        self.writer
            .write_record(std::iter::once(timestamp.as_str()).chain(fields.iter().copied()))
            .wrap_err("Failed to write session log row")
    }

    /// A record with no fields would be written as `""`, so the blank line
    /// goes straight to the underlying writer.
    fn separator(&mut self) -> Result<()> {
        self.flush()?;
        self.writer
            .get_mut()
            .write_all(b"\n")
            .wrap_err("Failed to write session log separator")
    }

    pub fn start_session(&mut self, label: &str) -> Result<()> {
        self.row(&["SESSION_START", label])?;
        self.flush()
    }

    /// Record a low-confidence fallback: the source track followed by the
    /// candidate that was used anyway.
    pub fn fallback(&mut self, track: &TrackDescriptor, candidate: &Candidate) -> Result<()> {
        self.row(&["Spotify", &track.title, &track.artist, &track.album])?;
        self.row(&[
            "YouTubeMusic",
            &candidate.title,
            candidate.primary_artist().unwrap_or("<Unknown>"),
            candidate.album_name().unwrap_or("no-album"),
            &candidate.url(),
        ])?;
        self.separator()
    }

    pub fn duplicate(&mut self, track: &TrackDescriptor, candidate: &Candidate) -> Result<()> {
        self.row(&[
            "DUPLICATE",
            &candidate.title,
            candidate.primary_artist().unwrap_or("<Unknown>"),
            candidate.album_name().unwrap_or("no-album"),
            &candidate.url(),
        ])?;
        self.row(&["SKIPPED", &track.title, &track.artist, &track.album])
    }

    pub fn lookup_error(&mut self, track: &TrackDescriptor, reason: &str) -> Result<()> {
        self.row(&[
            "LOOKUP_ERROR",
            &track.title,
            &track.artist,
            &track.album,
            reason,
        ])
    }

    pub fn write_error(
        &mut self,
        track: &TrackDescriptor,
        candidate: &Candidate,
        reason: &str,
    ) -> Result<()> {
        self.row(&[
            "WRITE_ERROR",
            &track.title,
            &track.artist,
            &candidate.url(),
            reason,
        ])
    }

    pub fn end_session(&mut self, counters: &SessionCounters) -> Result<()> {
        self.row(&[
            "SESSION_END",
            &format!("total={}", counters.total_tracks),
            &format!("processed={}", counters.processed_tracks),
            &format!("duplicates={}", counters.duplicates),
            &format!("lookup_errors={}", counters.lookup_errors),
            &format!("unconfident={}", counters.unconfident_matches),
            &format!("write_errors={}", counters.write_errors),
        ])?;
        self.separator()?;
        self.flush()
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush().wrap_err("Failed to flush session log")
    }
}

impl Drop for SessionLog {
    fn drop(&mut self) {
        if let Err(e) = self.writer.flush() {
            log::error!("Failed to flush session log on close: {}", e);
        }
    }
}
