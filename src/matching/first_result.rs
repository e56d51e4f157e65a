use crate::matching::{CandidateMatcher, LookupError, MatchOutcome, first};
use crate::model::{Candidate, TrackDescriptor};
use crate::ports::catalog::DestinationCatalog;

/// Trusts the destination's ranking and takes the top result.
pub struct FirstResultMatcher;

#[async_trait::async_trait]
impl CandidateMatcher for FirstResultMatcher {
    async fn resolve(
        &self,
        track: &TrackDescriptor,
        candidates: &[Candidate],
        _catalog: &dyn DestinationCatalog,
    ) -> Result<MatchOutcome, LookupError> {
        first(track, candidates).map(MatchOutcome::Confident)
    }
}
