use crate::matching::normalize::normalize_string;
use crate::matching::{CandidateMatcher, LookupError, MatchOutcome, MissLog, first};
use crate::model::{Candidate, TrackDescriptor};
use crate::ports::catalog::DestinationCatalog;

/// Title, artist and album compared after canonicalization.
pub struct NormalizedMatcher;

#[derive(Debug, PartialEq, Eq)]
struct NormalizedTrack {
    title: String,
    artist: String,
    album: String,
}

impl NormalizedTrack {
    fn from_descriptor(track: &TrackDescriptor) -> Self {
        Self {
            title: normalize_string(&track.title),
            artist: normalize_string(&track.artist),
            album: normalize_string(&track.album),
        }
    }

    fn from_candidate(candidate: &Candidate) -> Self {
        Self {
            title: normalize_string(&candidate.title),
            artist: normalize_string(candidate.primary_artist().unwrap_or_default()),
            album: normalize_string(candidate.album_name().unwrap_or_default()),
        }
    }
}

#[async_trait::async_trait]
impl CandidateMatcher for NormalizedMatcher {
    async fn resolve(
        &self,
        track: &TrackDescriptor,
        candidates: &[Candidate],
        _catalog: &dyn DestinationCatalog,
    ) -> Result<MatchOutcome, LookupError> {
        let wanted = NormalizedTrack::from_descriptor(track);
        let mut misses = MissLog::default();
        for candidate in candidates {
            if NormalizedTrack::from_candidate(candidate) == wanted {
                return Ok(MatchOutcome::Confident(candidate.clone()));
            }
            misses.miss(candidate);
        }

        let fallback = first(track, candidates)?;
        tracing::info!("\t-->NOT FOUND. using first result: {}", fallback.url());
        Ok(MatchOutcome::NeedsReview(fallback))
    }
}
