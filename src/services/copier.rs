use std::time::Duration;

use color_eyre::eyre::Result;
use tokio_util::sync::CancellationToken;

use crate::matching::{LookupError, MatchOutcome, Strategy};
use crate::model::{Candidate, Rating, ResultKind, TrackDescriptor};
use crate::ports::catalog::DestinationCatalog;
use crate::retry::RetryPolicy;
use crate::session::{SessionCounters, SessionState};

/// Knobs for one copier run.
#[derive(Debug, Clone)]
pub struct CopyOptions {
    pub strategy: Strategy,
    pub dry_run: bool,
    /// Pause after every track, to stay under the destination's rate limits.
    pub track_sleep: Duration,
    pub retry: RetryPolicy,
}

impl Default for CopyOptions {
    fn default() -> Self {
        Self {
            strategy: Strategy::default(),
            dry_run: false,
            track_sleep: Duration::from_millis(100),
            retry: RetryPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CopyReport {
    pub counters: SessionCounters,
    /// The run was stopped by a shutdown signal.
    pub interrupted: bool,
}

impl CopyReport {
    /// Report for a run stopped before its first track.
    pub fn cancelled() -> Self {
        Self {
            counters: SessionCounters::default(),
            interrupted: true,
        }
    }
}

/// Copies source tracks into a destination playlist, or likes them when no
/// playlist is given.
pub struct Copier<'a, C: DestinationCatalog> {
    catalog: &'a C,
    options: &'a CopyOptions,
    cancel: CancellationToken,
}

impl<'a, C: DestinationCatalog> Copier<'a, C> {
    pub fn new(catalog: &'a C, options: &'a CopyOptions, cancel: CancellationToken) -> Self {
        Self {
            catalog,
            options,
            cancel,
        }
    }

    /// Run one session over `tracks`. The session summary is always written,
    /// also when the run is interrupted.
    ///
    /// Per-track failures are counted and logged; only session log I/O
    /// failures abort the run. A shutdown signal is honoured during a lookup,
    /// during the pause between tracks and while a write is retried; a track
    /// that has been applied is always counted as processed.
    #[tracing::instrument(skip_all, fields(tracks = tracks.len(), playlist = ?target))]
    pub async fn copy(
        &self,
        tracks: Vec<TrackDescriptor>,
        target: Option<&str>,
        mut session: SessionState<'_>,
    ) -> Result<CopyReport> {
        let total = tracks.len();
        session.set_total(total);

        let mut interrupted = false;
        for track in &tracks {
            log::info!("Spotify:   {}", track);

            let Some(lookup) = self.until_cancelled(self.lookup(track)).await else {
                interrupted = true;
                break;
            };
            let outcome = match lookup {
                Ok(outcome) => outcome,
                Err(e) => {
                    tracing::error!("Unable to look up song on YouTube Music: {}", e);
                    session.record_lookup_error(track, &e.to_string())?;
                    continue;
                }
            };

            let write_cut_short = self
                .apply_track(track, &outcome, target, &mut session)
                .await?;
            session.track_processed();
            log::info!(
                "[{}/{}] {}",
                session.counters().processed_tracks,
                total,
                track
            );
            if write_cut_short {
                interrupted = true;
                break;
            }

            if !self.options.track_sleep.is_zero()
                && self
                    .until_cancelled(tokio::time::sleep(self.options.track_sleep))
                    .await
                    .is_none()
            {
                interrupted = true;
                break;
            }
        }

        if interrupted {
            tracing::warn!(
                "Interrupted after {} of {} tracks",
                session.counters().processed_tracks,
                total
            );
        }

        let added = session.applied_count();
        let counters = session.finish()?;
        log::info!(
            "Added {} tracks, encountered {} duplicates, {} errors, {} incomplete matches",
            added,
            counters.duplicates,
            counters.lookup_errors + counters.write_errors,
            counters.unconfident_matches
        );
        Ok(CopyReport {
            counters,
            interrupted,
        })
    }

    /// `None` when the shutdown signal fires first.
    async fn until_cancelled<T>(&self, future: impl Future<Output = T>) -> Option<T> {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => None,
            value = future => Some(value),
        }
    }

    /// Records the match and writes it. Returns `true` when a shutdown signal
    /// cut the write short.
    async fn apply_track(
        &self,
        track: &TrackDescriptor,
        outcome: &MatchOutcome,
        target: Option<&str>,
        session: &mut SessionState<'_>,
    ) -> Result<bool> {
        let candidate = outcome.candidate();
        if outcome.needs_review() {
            session.record_fallback(track, candidate)?;
        }
        log::info!("Youtube:   {}", candidate);

        if session.apply(track, candidate)? {
            log::info!("(DUPLICATE, this track has already been added)");
        }
        if self.options.dry_run {
            return Ok(false);
        }

        match self.until_cancelled(self.write(candidate, target)).await {
            Some(Ok(())) => Ok(false),
            Some(Err(e)) => {
                tracing::error!("Giving up on {}: {:#}", candidate.url(), e);
                session.record_write_error(track, candidate, &format!("{e:#}"))?;
                Ok(false)
            }
            None => {
                tracing::warn!("Interrupted while writing {}", candidate.url());
                session.record_write_error(
                    track,
                    candidate,
                    "interrupted before the write was confirmed",
                )?;
                Ok(true)
            }
        }
    }

    async fn lookup(&self, track: &TrackDescriptor) -> Result<MatchOutcome, LookupError> {
        let query = track.search_query();
        let candidates = self
            .catalog
            .search(&query, ResultKind::Songs)
            .await
            .map_err(LookupError::Catalog)?;
        if candidates.is_empty() {
            return Err(LookupError::NoResults { query });
        }

        self.options
            .strategy
            .matcher()
            .resolve(track, &candidates, self.catalog)
            .await
    }

    async fn write(&self, candidate: &Candidate, target: Option<&str>) -> Result<()> {
        match target {
            Some(playlist_id) => {
                let ids = [candidate.id.clone()];
                let label = format!("add_playlist_items: {} {}", playlist_id, candidate.id);
                self.options
                    .retry
                    .run(&label, || {
                        self.catalog.add_playlist_items(playlist_id, &ids, false)
                    })
                    .await
            }
            None => {
                let label = format!("rate_track: {}", candidate.id);
                self.options
                    .retry
                    .run(&label, || self.catalog.rate_track(&candidate.id, Rating::Like))
                    .await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use color_eyre::eyre::eyre;
    use mockall::predicate::{always, eq};

    use super::*;
    use crate::ports::catalog::MockDestinationCatalog;
    use crate::test_utils::{candidate, read_log, temp_log};

    fn options(strategy: Strategy) -> CopyOptions {
        CopyOptions {
            strategy,
            dry_run: false,
            track_sleep: Duration::ZERO,
            retry: RetryPolicy::immediate(10),
        }
    }

    #[tokio::test]
    async fn test_exact_and_fallback_scenario() {
        let mut catalog = MockDestinationCatalog::new();
        catalog
            .expect_search()
            .with(eq("A X"), eq(ResultKind::Songs))
            .returning(|_, _| {
                Ok(vec![
                    candidate("0", "A", "X", Some("Other")),
                    candidate("1", "A", "X", Some("Alb1")),
                ])
            });
        catalog
            .expect_search()
            .with(eq("B Y"), eq(ResultKind::Songs))
            .returning(|_, _| Ok(vec![candidate("2", "Different", "Z", None)]));
        catalog
            .expect_add_playlist_items()
            .with(eq("PL1"), always(), eq(false))
            .times(2)
            .returning(|_, _, _| Ok(()));

        let (_dir, path, mut log) = temp_log();
        let session = SessionState::begin(&mut log, "scenario").unwrap();
        let options = options(Strategy::ExactThenRelaxed);
        let copier = Copier::new(&catalog, &options, CancellationToken::new());

        let tracks = vec![
            TrackDescriptor::new("A", "X", "Alb1"),
            TrackDescriptor::new("B", "Y", "Alb2"),
        ];
        let report = copier.copy(tracks, Some("PL1"), session).await.unwrap();

        assert!(!report.interrupted);
        assert_eq!(
            report.counters,
            SessionCounters {
                total_tracks: 2,
                processed_tracks: 2,
                duplicates: 0,
                lookup_errors: 0,
                unconfident_matches: 1,
                write_errors: 0,
            }
        );
        let contents = read_log(&path);
        assert_eq!(contents.matches(",Spotify,").count(), 1);
        assert!(contents.contains("Spotify,B,Y,Alb2"));
    }

    #[tokio::test]
    async fn test_same_fallback_candidate_counts_duplicate() {
        let mut catalog = MockDestinationCatalog::new();
        catalog
            .expect_search()
            .returning(|_, _| Ok(vec![candidate("same", "Unrelated", "Q", None)]));
        catalog
            .expect_rate_track()
            .with(eq("same"), eq(Rating::Like))
            .times(2)
            .returning(|_, _| Ok(()));

        let (_dir, _path, mut log) = temp_log();
        let session = SessionState::begin(&mut log, "dupes").unwrap();
        let options = options(Strategy::ExactThenRelaxed);
        let copier = Copier::new(&catalog, &options, CancellationToken::new());

        let tracks = vec![
            TrackDescriptor::new("A", "X", "Alb1"),
            TrackDescriptor::new("B", "Y", "Alb2"),
        ];
        let report = copier.copy(tracks, None, session).await.unwrap();

        assert_eq!(report.counters.duplicates, 1);
        assert_eq!(report.counters.unconfident_matches, 2);
        assert_eq!(report.counters.processed_tracks, 2);
    }

    #[tokio::test]
    async fn test_write_succeeding_on_third_attempt() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let mut catalog = MockDestinationCatalog::new();
        catalog.expect_search().returning(|query, _| {
            let id = query.to_string();
            Ok(vec![candidate(&id, &id, "X", None)])
        });
        let counter = attempts.clone();
        catalog.expect_rate_track().returning(move |id, _| {
            if id == "first X" && counter.fetch_add(1, Ordering::SeqCst) < 2 {
                Err(eyre!("HTTP 503"))
            } else {
                Ok(())
            }
        });

        let (_dir, _path, mut log) = temp_log();
        let session = SessionState::begin(&mut log, "retry").unwrap();
        let options = options(Strategy::FirstResult);
        let copier = Copier::new(&catalog, &options, CancellationToken::new());

        let tracks = vec![
            TrackDescriptor::new("first", "X", ""),
            TrackDescriptor::new("second", "X", ""),
        ];
        let report = copier.copy(tracks, None, session).await.unwrap();

        assert_eq!(attempts.load(Ordering::SeqCst), 3);
        assert_eq!(report.counters.lookup_errors, 0);
        assert_eq!(report.counters.write_errors, 0);
        assert_eq!(report.counters.processed_tracks, 2);
    }

    #[tokio::test]
    async fn test_exhausted_write_is_counted_and_run_continues() {
        let mut catalog = MockDestinationCatalog::new();
        catalog
            .expect_search()
            .returning(|query, _| Ok(vec![candidate(query, query, "X", None)]));
        catalog
            .expect_add_playlist_items()
            .returning(|_, ids, _| {
                if ids[0] == "bad X" {
                    Err(eyre!("HTTP 500"))
                } else {
                    Ok(())
                }
            });

        let (_dir, path, mut log) = temp_log();
        let session = SessionState::begin(&mut log, "exhausted").unwrap();
        let options = CopyOptions {
            retry: RetryPolicy::immediate(2),
            ..options(Strategy::FirstResult)
        };
        let copier = Copier::new(&catalog, &options, CancellationToken::new());

        let tracks = vec![
            TrackDescriptor::new("bad", "X", ""),
            TrackDescriptor::new("good", "X", ""),
        ];
        let report = copier.copy(tracks, Some("PL1"), session).await.unwrap();

        assert_eq!(report.counters.write_errors, 1);
        assert_eq!(report.counters.processed_tracks, 2);
        assert!(read_log(&path).contains("WRITE_ERROR"));
    }

    #[tokio::test]
    async fn test_lookup_errors_are_skipped() {
        let mut catalog = MockDestinationCatalog::new();
        catalog
            .expect_search()
            .with(eq("Nothing X"), always())
            .returning(|_, _| Ok(vec![]));
        catalog
            .expect_search()
            .with(eq("Broken X"), always())
            .returning(|_, _| Err(eyre!("connection reset")));
        catalog
            .expect_search()
            .with(eq("Fine X"), always())
            .returning(|_, _| Ok(vec![candidate("f", "Fine", "X", None)]));
        catalog.expect_rate_track().times(1).returning(|_, _| Ok(()));

        let (_dir, path, mut log) = temp_log();
        let session = SessionState::begin(&mut log, "errors").unwrap();
        let options = options(Strategy::FirstResult);
        let copier = Copier::new(&catalog, &options, CancellationToken::new());

        let tracks = vec![
            TrackDescriptor::new("Nothing", "X", ""),
            TrackDescriptor::new("Broken", "X", ""),
            TrackDescriptor::new("Fine", "X", ""),
        ];
        let report = copier.copy(tracks, None, session).await.unwrap();

        assert_eq!(report.counters.lookup_errors, 2);
        assert_eq!(report.counters.processed_tracks, 1);
        assert_eq!(report.counters.total_tracks, 3);
        assert_eq!(read_log(&path).matches("LOOKUP_ERROR").count(), 2);
    }

    #[tokio::test]
    async fn test_dry_run_writes_nothing() {
        let mut catalog = MockDestinationCatalog::new();
        catalog
            .expect_search()
            .returning(|_, _| Ok(vec![candidate("1", "A", "X", None)]));
        catalog.expect_add_playlist_items().never();
        catalog.expect_rate_track().never();

        let (_dir, _path, mut log) = temp_log();
        let session = SessionState::begin(&mut log, "dry").unwrap();
        let options = CopyOptions {
            dry_run: true,
            ..options(Strategy::FirstResult)
        };
        let copier = Copier::new(&catalog, &options, CancellationToken::new());

        let report = copier
            .copy(vec![TrackDescriptor::new("A", "X", "")], Some("PL1"), session)
            .await
            .unwrap();
        assert_eq!(report.counters.processed_tracks, 1);
    }

    #[tokio::test]
    async fn test_second_run_against_same_playlist_is_idempotent() {
        // The destination skips ids it already holds, so a rerun adds nothing new.
        let members = Arc::new(std::sync::Mutex::new(std::collections::BTreeSet::new()));
        let mut catalog = MockDestinationCatalog::new();
        catalog
            .expect_search()
            .returning(|query, _| Ok(vec![candidate(&query[..1], query, "X", None)]));
        let set = members.clone();
        catalog
            .expect_add_playlist_items()
            .returning(move |_, ids, _| {
                set.lock().unwrap().extend(ids.iter().cloned());
                Ok(())
            });

        let options = options(Strategy::FirstResult);
        let copier = Copier::new(&catalog, &options, CancellationToken::new());
        let tracks = vec![
            TrackDescriptor::new("a1", "X", ""),
            TrackDescriptor::new("b1", "X", ""),
            TrackDescriptor::new("a2", "X", ""),
        ];

        let (_dir, _path, mut log) = temp_log();
        let first = copier
            .copy(
                tracks.clone(),
                Some("PL1"),
                SessionState::begin(&mut log, "first").unwrap(),
            )
            .await
            .unwrap();
        let after_first = members.lock().unwrap().clone();
        let second = copier
            .copy(
                tracks,
                Some("PL1"),
                SessionState::begin(&mut log, "second").unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(*members.lock().unwrap(), after_first);
        assert_eq!(after_first.len(), 2);
        assert_eq!(first.counters.duplicates, 1);
        assert_eq!(second.counters.duplicates, 1);
    }

    #[tokio::test]
    async fn test_cancelled_run_still_writes_summary() {
        let mut catalog = MockDestinationCatalog::new();
        catalog.expect_search().never();

        let (_dir, path, mut log) = temp_log();
        let session = SessionState::begin(&mut log, "cancelled").unwrap();
        let options = options(Strategy::FirstResult);
        let cancel = CancellationToken::new();
        cancel.cancel();
        let copier = Copier::new(&catalog, &options, cancel);

        let report = copier
            .copy(vec![TrackDescriptor::new("A", "X", "")], None, session)
            .await
            .unwrap();

        assert!(report.interrupted);
        assert_eq!(report.counters.processed_tracks, 0);
        assert!(read_log(&path).contains("SESSION_END,total=1,processed=0"));
    }

    #[tokio::test]
    async fn test_signal_during_write_lets_the_track_finish() {
        let cancel = CancellationToken::new();
        let mut catalog = MockDestinationCatalog::new();
        catalog
            .expect_search()
            .with(eq("A X"), always())
            .times(1)
            .returning(|_, _| Ok(vec![candidate("a", "A", "X", None)]));
        catalog.expect_search().with(eq("B X"), always()).never();
        let signal = cancel.clone();
        catalog
            .expect_rate_track()
            .with(eq("a"), eq(Rating::Like))
            .times(1)
            .returning(move |_, _| {
                signal.cancel();
                Ok(())
            });

        let (_dir, path, mut log) = temp_log();
        let session = SessionState::begin(&mut log, "signal").unwrap();
        let options = CopyOptions {
            track_sleep: Duration::from_millis(50),
            ..options(Strategy::FirstResult)
        };
        let copier = Copier::new(&catalog, &options, cancel);

        let tracks = vec![
            TrackDescriptor::new("A", "X", ""),
            TrackDescriptor::new("B", "X", ""),
        ];
        let report = copier.copy(tracks, None, session).await.unwrap();

        assert!(report.interrupted);
        assert_eq!(report.counters.processed_tracks, 1);
        assert_eq!(report.counters.write_errors, 0);
        assert!(read_log(&path).contains("SESSION_END,total=2,processed=1,"));
    }

    #[tokio::test]
    async fn test_signal_during_write_backoff_counts_the_track() {
        let cancel = CancellationToken::new();
        let mut catalog = MockDestinationCatalog::new();
        catalog
            .expect_search()
            .returning(|_, _| Ok(vec![candidate("a", "A", "X", None)]));
        let signal = cancel.clone();
        catalog
            .expect_add_playlist_items()
            .times(1)
            .returning(move |_, _, _| {
                signal.cancel();
                Err(eyre!("HTTP 503"))
            });

        let (_dir, path, mut log) = temp_log();
        let session = SessionState::begin(&mut log, "backoff").unwrap();
        let options = CopyOptions {
            retry: RetryPolicy {
                max_retries: 3,
                initial_delay: Duration::from_secs(60),
                factor: 2.0,
                max_delay: Duration::from_secs(600),
            },
            ..options(Strategy::FirstResult)
        };
        let copier = Copier::new(&catalog, &options, cancel);

        let tracks = vec![
            TrackDescriptor::new("A", "X", ""),
            TrackDescriptor::new("B", "X", ""),
        ];
        let report = copier.copy(tracks, Some("PL1"), session).await.unwrap();

        assert!(report.interrupted);
        assert_eq!(report.counters.processed_tracks, 1);
        assert_eq!(report.counters.write_errors, 1);
        let contents = read_log(&path);
        assert!(contents.contains("interrupted before the write was confirmed"));
        assert!(contents.contains("SESSION_END,total=2,processed=1,"));
    }
}
