//! Per-run state of a synchronization: counters, the set of destination ids
//! already applied, and a borrowed handle on the session log.
//!
//! A [`SessionState`] is created at the start of one copier run and closed
//! with [`SessionState::finish`]. If it is dropped without being finished
//! (early `?` return, panic unwinding) the end-of-session summary is still
//! written.

mod log_file;

use std::collections::HashSet;

use color_eyre::eyre::Result;

use crate::model::{Candidate, TrackDescriptor};

pub use self::log_file::SessionLog;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionCounters {
    pub total_tracks: usize,
    pub processed_tracks: usize,
    pub duplicates: usize,
    pub lookup_errors: usize,
    pub unconfident_matches: usize,
    pub write_errors: usize,
}

pub struct SessionState<'log> {
    counters: SessionCounters,
    applied: HashSet<String>,
    log: &'log mut SessionLog,
    finished: bool,
}

impl<'log> SessionState<'log> {
    pub fn begin(log: &'log mut SessionLog, label: &str) -> Result<Self> {
        log.start_session(label)?;
        Ok(Self {
            counters: SessionCounters::default(),
            applied: HashSet::new(),
            log,
            finished: false,
        })
    }

    pub fn counters(&self) -> &SessionCounters {
        &self.counters
    }

    pub fn applied_count(&self) -> usize {
        self.applied.len()
    }

    pub fn set_total(&mut self, total: usize) {
        self.counters.total_tracks = total;
    }

    pub fn track_processed(&mut self) {
        self.counters.processed_tracks += 1;
    }

    /// Mark `candidate` as applied. Returns `true` if it was already applied
    /// earlier in this run, in which case the duplicate is counted and logged.
    pub fn apply(&mut self, track: &TrackDescriptor, candidate: &Candidate) -> Result<bool> {
        if self.applied.insert(candidate.id.clone()) {
            return Ok(false);
        }
        self.counters.duplicates += 1;
        self.log.duplicate(track, candidate)?;
        Ok(true)
    }

    pub fn record_fallback(&mut self, track: &TrackDescriptor, candidate: &Candidate) -> Result<()> {
        self.counters.unconfident_matches += 1;
        self.log.fallback(track, candidate)
    }

    pub fn record_lookup_error(&mut self, track: &TrackDescriptor, reason: &str) -> Result<()> {
        self.counters.lookup_errors += 1;
        self.log.lookup_error(track, reason)
    }

    pub fn record_write_error(
        &mut self,
        track: &TrackDescriptor,
        candidate: &Candidate,
        reason: &str,
    ) -> Result<()> {
        self.counters.write_errors += 1;
        self.log.write_error(track, candidate, reason)
    }

    /// Write the end-of-session summary and return the final counters.
    pub fn finish(mut self) -> Result<SessionCounters> {
        self.finished = true;
        self.log.end_session(&self.counters)?;
        Ok(self.counters)
    }
}

impl Drop for SessionState<'_> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        if let Err(e) = self.log.end_session(&self.counters) {
            log::error!("Failed to write session summary: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{candidate, read_log, temp_log};

    #[test]
    fn test_apply_detects_duplicates() {
        let (_dir, path, mut log) = temp_log();
        let track = TrackDescriptor::new("A", "X", "Alb");
        let mut session = SessionState::begin(&mut log, "test").unwrap();

        assert!(!session.apply(&track, &candidate("1", "A", "X", None)).unwrap());
        assert!(session.apply(&track, &candidate("1", "A", "X", None)).unwrap());
        assert!(!session.apply(&track, &candidate("2", "A", "X", None)).unwrap());

        assert_eq!(session.counters().duplicates, 1);
        assert_eq!(session.applied_count(), 2);
        session.finish().unwrap();

        let contents = read_log(&path);
        assert_eq!(contents.matches("DUPLICATE").count(), 1);
        assert_eq!(contents.matches("SKIPPED").count(), 1);
    }

    #[test]
    fn test_fallback_writes_pair() {
        let (_dir, path, mut log) = temp_log();
        let track = TrackDescriptor::new("B", "Y", "Alb2");
        let mut session = SessionState::begin(&mut log, "test").unwrap();
        session
            .record_fallback(&track, &candidate("2", "Other", "Y", None))
            .unwrap();
        let counters = session.finish().unwrap();
        assert_eq!(counters.unconfident_matches, 1);

        let contents = read_log(&path);
        assert!(contents.contains("Spotify,B,Y,Alb2"));
        assert!(contents.contains("YouTubeMusic,Other,Y,no-album,https://youtu.be/2"));
    }

    #[test]
    fn test_sessions_and_fallback_pairs_end_with_blank_line() {
        let (_dir, path, mut log) = temp_log();
        let track = TrackDescriptor::new("B", "Y", "Alb2");
        let mut session = SessionState::begin(&mut log, "blank").unwrap();
        session
            .record_fallback(&track, &candidate("2", "Other", "Y", None))
            .unwrap();
        session.finish().unwrap();

        let contents = read_log(&path);
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 6);
        assert!(lines[1].contains(",Spotify,B,Y,Alb2"));
        assert!(lines[2].contains(",YouTubeMusic,Other,"));
        assert_eq!(lines[3], "");
        assert!(lines[4].contains(",SESSION_END,"));
        assert_eq!(lines[5], "");
        assert!(!contents.contains("\"\""));
        assert!(contents.ends_with("\n\n"));
    }

    #[test]
    fn test_drop_without_finish_writes_summary() {
        let (_dir, path, mut log) = temp_log();
        {
            let mut session = SessionState::begin(&mut log, "interrupted").unwrap();
            session.set_total(5);
            session.track_processed();
        }
        log.flush().unwrap();

        let contents = read_log(&path);
        assert!(contents.contains("SESSION_START,interrupted"));
        assert!(contents.contains("SESSION_END,total=5,processed=1"));
    }

    #[test]
    fn test_every_row_is_timestamped() {
        let (_dir, path, mut log) = temp_log();
        let session = SessionState::begin(&mut log, "ts").unwrap();
        session.finish().unwrap();

        let contents = read_log(&path);
        for line in contents.lines().filter(|l| !l.is_empty()) {
            let first = line.split(',').next().unwrap();
            assert!(
                chrono::NaiveDateTime::parse_from_str(first, "%Y-%m-%d %H:%M:%S").is_ok(),
                "row without timestamp: {line}"
            );
        }
    }
}
