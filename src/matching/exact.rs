use crate::matching::{CandidateMatcher, LookupError, MatchOutcome, MissLog, first};
use crate::model::{Candidate, TrackDescriptor};
use crate::ports::catalog::DestinationCatalog;

/// Exact title/artist/album equality, then exact title/artist, then the top
/// result flagged for review.
pub struct ExactMatcher;

fn same_song(track: &TrackDescriptor, candidate: &Candidate) -> bool {
    candidate.title == track.title && candidate.primary_artist() == Some(track.artist.as_str())
}

#[async_trait::async_trait]
impl CandidateMatcher for ExactMatcher {
    async fn resolve(
        &self,
        track: &TrackDescriptor,
        candidates: &[Candidate],
        _catalog: &dyn DestinationCatalog,
    ) -> Result<MatchOutcome, LookupError> {
        let mut misses = MissLog::default();
        for candidate in candidates {
            if same_song(track, candidate) && candidate.album_name() == Some(track.album.as_str())
            {
                return Ok(MatchOutcome::Confident(candidate.clone()));
            }
            misses.miss(candidate);
        }

        // Singles often come without album metadata on the destination.
        tracing::info!("\t-->Performing album-independent matching...");
        if let Some(candidate) = candidates.iter().find(|c| same_song(track, c)) {
            return Ok(MatchOutcome::Confident(candidate.clone()));
        }

        let fallback = first(track, candidates)?;
        tracing::info!("\t-->NOT FOUND. using first result: {}", fallback.url());
        Ok(MatchOutcome::NeedsReview(fallback))
    }
}
