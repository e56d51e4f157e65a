use crate::matching::normalize::{strip_brackets, substring_related};
use crate::matching::{CandidateMatcher, LookupError, MatchOutcome, first};
use crate::model::{Candidate, ResultKind, TrackDescriptor};
use crate::ports::catalog::DestinationCatalog;

/// Tolerates remix/live annotations and partial titles, and falls back to
/// video uploads when the song shelf has nothing usable.
pub struct FuzzyMatcher;

fn title_matches(track: &TrackDescriptor, candidate: &Candidate) -> bool {
    let stripped = strip_brackets(&candidate.title);
    stripped == track.title || substring_related(&stripped, &track.title)
}

fn artist_matches(track: &TrackDescriptor, candidate: &Candidate) -> bool {
    let artist = candidate.primary_artist().unwrap_or_default();
    artist == track.artist || substring_related(artist, &track.artist)
}

/// A video qualifies when its title names the track and it credits the artist,
/// either in the title ("Artist - Track") or as the uploading channel.
fn video_matches(track: &TrackDescriptor, video: &Candidate) -> bool {
    let title = video.title.to_lowercase();
    let wanted_title = track.title.to_lowercase();
    let wanted_artist = track.artist.to_lowercase();
    let channel = video.primary_artist().unwrap_or_default().to_lowercase();

    title.contains(&wanted_title)
        && (title.contains(&wanted_artist) || substring_related(&channel, &wanted_artist))
}

#[async_trait::async_trait]
impl CandidateMatcher for FuzzyMatcher {
    async fn resolve(
        &self,
        track: &TrackDescriptor,
        candidates: &[Candidate],
        catalog: &dyn DestinationCatalog,
    ) -> Result<MatchOutcome, LookupError> {
        if let Some(candidate) = candidates
            .iter()
            .find(|c| title_matches(track, c) && artist_matches(track, c))
        {
            return Ok(MatchOutcome::Confident(candidate.clone()));
        }

        let top = first(track, candidates)?;
        if top.title.to_lowercase().contains(&track.title.to_lowercase())
            && top.primary_artist() == Some(track.artist.as_str())
        {
            // Accepted without passing the checks above, so keep it reviewable.
            tracing::info!("\t-->Accepting first result: {}", top.url());
            return Ok(MatchOutcome::NeedsReview(top));
        }

        tracing::info!("Not found in songs, searching videos");
        let query = format!("{} by {}", track.title, track.artist);
        let videos = catalog
            .search(&query, ResultKind::Videos)
            .await
            .map_err(LookupError::Catalog)?;

        match videos.into_iter().find(|v| video_matches(track, v)) {
            Some(video) => {
                tracing::info!("Found a video: {}", video.url());
                Ok(MatchOutcome::Confident(video))
            }
            None => Err(LookupError::unresolved(track)),
        }
    }
}
