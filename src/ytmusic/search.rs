use reqwest::Client;
use serde_json::{Value, json};
use url::Url;

use crate::model::{Candidate, CandidateAlbum, CandidateArtist, ResultKind};
use crate::ytmusic::auth::OAuthCredentials;
use crate::ytmusic::error::CatalogError;
use crate::ytmusic::request::{first_run_text, post};

const SONGS_PARAMS: &str = "EgWKAQIIAWoMEA4QChADEAQQCRAF";
const VIDEOS_PARAMS: &str = "EgWKAQIQAWoMEA4QChADEAQQCRAF";

const RESULT_SECTIONS: &str =
    "/contents/tabbedSearchResultsRenderer/tabs/0/tabRenderer/content/sectionListRenderer/contents";
const PAGE_TYPE: &str = "/navigationEndpoint/browseEndpoint/browseEndpointContextSupportedConfigs/browseEndpointContextMusicConfig/pageType";

fn filter_params(kind: ResultKind) -> &'static str {
    match kind {
        ResultKind::Songs => SONGS_PARAMS,
        ResultKind::Videos => VIDEOS_PARAMS,
    }
}

/// Search the catalog, restricted to one result shelf.
///
/// Endpoint
/// - `POST search` with the songs or videos filter params
pub async fn search(
    client: &Client,
    base_url: &Url,
    credentials: &OAuthCredentials,
    query: &str,
    kind: ResultKind,
) -> Result<Vec<Candidate>, CatalogError> {
    let body = json!({ "query": query, "params": filter_params(kind) });
    let response = post(client, base_url, credentials, "search", &[], body).await?;
    parse_search_results(&response, kind)
        .ok_or_else(|| CatalogError::unexpected("search", "no result sections"))
}

/// Endpoint
/// - `POST music/get_search_suggestions`
pub async fn search_suggestions(
    client: &Client,
    base_url: &Url,
    credentials: &OAuthCredentials,
    query: &str,
) -> Result<Vec<String>, CatalogError> {
    let body = json!({ "input": query });
    let response = post(
        client,
        base_url,
        credentials,
        "music/get_search_suggestions",
        &[],
        body,
    )
    .await?;
    Ok(parse_suggestions(&response))
}

/// Candidates of every result shelf, in ranking order.
///
/// Returns `None` when the response has no section list at all. A search
/// without hits still has one (holding a "no results" message) and yields an
/// empty vec.
pub fn parse_search_results(response: &Value, kind: ResultKind) -> Option<Vec<Candidate>> {
    let sections = response.pointer(RESULT_SECTIONS)?.as_array()?;

    let candidates = sections
        .iter()
        .filter_map(|section| section.pointer("/musicShelfRenderer/contents")?.as_array())
        .flatten()
        .filter_map(|item| item.get("musicResponsiveListItemRenderer"))
        .filter_map(|renderer| parse_list_item(renderer, kind))
        .collect();
    Some(candidates)
}

fn video_id(renderer: &Value) -> Option<&str> {
    renderer
        .pointer("/playlistItemData/videoId")
        .or_else(|| {
            renderer.pointer(
                "/overlay/musicItemThumbnailOverlayRenderer/content/musicPlayButtonRenderer/playNavigationEndpoint/watchEndpoint/videoId",
            )
        })?
        .as_str()
}

fn parse_list_item(renderer: &Value, kind: ResultKind) -> Option<Candidate> {
    let id = video_id(renderer)?;
    let columns = renderer.get("flexColumns")?.as_array()?;
    let title = first_run_text(
        columns.first()?,
        "/musicResponsiveListItemFlexColumnRenderer/text",
    )?;

    // Detail columns hold artist, album and duration runs separated by " • ".
    let runs: Vec<&Value> = columns
        .iter()
        .skip(1)
        .filter_map(|c| c.pointer("/musicResponsiveListItemFlexColumnRenderer/text/runs"))
        .filter_map(Value::as_array)
        .flatten()
        .collect();

    let mut artists = Vec::new();
    let mut album = None;
    for run in &runs {
        let Some(text) = run.get("text").and_then(Value::as_str) else {
            continue;
        };
        match run.pointer(PAGE_TYPE).and_then(Value::as_str) {
            Some("MUSIC_PAGE_TYPE_ARTIST") | Some("MUSIC_PAGE_TYPE_USER_CHANNEL") => {
                artists.push(CandidateArtist {
                    name: text.to_string(),
                })
            }
            Some("MUSIC_PAGE_TYPE_ALBUM") => {
                album = Some(CandidateAlbum {
                    name: text.to_string(),
                })
            }
            _ => {}
        }
    }

    // Some uploads credit an artist without a link; take the leading run then.
    if artists.is_empty()
        && let Some(text) = runs
            .first()
            .and_then(|run| run.get("text"))
            .and_then(Value::as_str)
            .filter(|text| !text.trim().is_empty() && text.trim() != "•")
    {
        artists.push(CandidateArtist {
            name: text.to_string(),
        });
    }

    Some(Candidate {
        id: id.to_string(),
        title: title.to_string(),
        artists,
        album,
        kind,
    })
}

pub fn parse_suggestions(response: &Value) -> Vec<String> {
    response
        .pointer("/contents/0/searchSuggestionsSectionRenderer/contents")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(|entry| entry.pointer("/searchSuggestionRenderer/suggestion/runs"))
        .filter_map(Value::as_array)
        .map(|runs| {
            runs.iter()
                .filter_map(|run| run.get("text").and_then(Value::as_str))
                .collect::<String>()
        })
        .collect()
}
