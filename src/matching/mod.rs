//! Track matching: choosing which destination search result stands for a
//! source track.
//!
//! Each [`Strategy`] maps to one [`CandidateMatcher`] implementation. The
//! matchers are pure apart from the secondary video search of the fuzzy
//! strategy; recording fallbacks in the session log is left to the caller.

mod exact;
mod first_result;
mod fuzzy;
pub mod normalize;
mod normalized;

use std::fmt;

use crate::model::{Candidate, TrackDescriptor};
use crate::ports::catalog::DestinationCatalog;

pub use self::exact::ExactMatcher;
pub use self::first_result::FirstResultMatcher;
pub use self::fuzzy::FuzzyMatcher;
pub use self::normalized::NormalizedMatcher;

/// A track could not be resolved to any destination candidate.
#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error("no search results for \"{query}\"")]
    NoResults { query: String },

    #[error("did not find {title} by {artist} from {album}")]
    Unresolved {
        title: String,
        artist: String,
        album: String,
    },

    #[error("destination lookup failed: {0:#}")]
    Catalog(color_eyre::Report),
}

impl LookupError {
    pub fn unresolved(track: &TrackDescriptor) -> Self {
        Self::Unresolved {
            title: track.title.clone(),
            artist: track.artist.clone(),
            album: track.album.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchOutcome {
    /// The candidate satisfied the strategy's matching rules.
    Confident(Candidate),
    /// Best-effort pick that should be reviewed by hand.
    NeedsReview(Candidate),
}

impl MatchOutcome {
    pub fn candidate(&self) -> &Candidate {
        match self {
            MatchOutcome::Confident(c) | MatchOutcome::NeedsReview(c) => c,
        }
    }

    pub fn needs_review(&self) -> bool {
        matches!(self, MatchOutcome::NeedsReview(_))
    }
}

#[async_trait::async_trait]
pub trait CandidateMatcher: Send + Sync {
    /// Pick a candidate for `track` out of `candidates`, which are ordered by
    /// the destination's own relevance ranking.
    async fn resolve(
        &self,
        track: &TrackDescriptor,
        candidates: &[Candidate],
        catalog: &dyn DestinationCatalog,
    ) -> Result<MatchOutcome, LookupError>;
}

/// Matching algorithm selector, numbered as on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strategy {
    #[default]
    FirstResult,
    ExactThenRelaxed,
    BracketInsensitive,
    NormalizedMetadata,
}

impl Strategy {
    pub fn matcher(self) -> &'static dyn CandidateMatcher {
        match self {
            Strategy::FirstResult => &FirstResultMatcher,
            Strategy::ExactThenRelaxed => &ExactMatcher,
            Strategy::BracketInsensitive => &FuzzyMatcher,
            Strategy::NormalizedMetadata => &NormalizedMatcher,
        }
    }

    pub fn id(self) -> u8 {
        match self {
            Strategy::FirstResult => 0,
            Strategy::ExactThenRelaxed => 1,
            Strategy::BracketInsensitive => 2,
            Strategy::NormalizedMetadata => 3,
        }
    }
}

impl TryFrom<u8> for Strategy {
    type Error = color_eyre::Report;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Strategy::FirstResult),
            1 => Ok(Strategy::ExactThenRelaxed),
            2 => Ok(Strategy::BracketInsensitive),
            3 => Ok(Strategy::NormalizedMetadata),
            other => Err(color_eyre::eyre::eyre!(
                "Unknown search algorithm {other}, expected 0-3"
            )),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Strategy::FirstResult => "first-result",
            Strategy::ExactThenRelaxed => "exact-then-relaxed",
            Strategy::BracketInsensitive => "bracket-insensitive",
            Strategy::NormalizedMetadata => "normalized-metadata",
        };
        write!(f, "{} ({})", self.id(), name)
    }
}

/// Only this many non-matching candidates are printed per track.
const LOGGED_MISSES: usize = 3;

#[derive(Default)]
struct MissLog {
    logged: usize,
}

impl MissLog {
    /// Returns whether `candidate` was printed.
    fn miss(&mut self, candidate: &Candidate) -> bool {
        if self.logged >= LOGGED_MISSES {
            return false;
        }
        self.logged += 1;
        tracing::info!("\tNO-MATCH: {}", candidate);
        true
    }
}

fn first(track: &TrackDescriptor, candidates: &[Candidate]) -> Result<Candidate, LookupError> {
    candidates.first().cloned().ok_or_else(|| LookupError::NoResults {
        query: track.search_query(),
    })
}
