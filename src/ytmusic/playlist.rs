use reqwest::Client;
use serde_json::{Value, json};
use url::Url;

use crate::model::{PlaylistSummary, Privacy};
use crate::ytmusic::auth::OAuthCredentials;
use crate::ytmusic::error::CatalogError;
use crate::ytmusic::request::{first_run_text, post};

const LIBRARY_PLAYLISTS: &str = "FEmusic_liked_playlists";

/* ---------- Create ---------- */

/// Endpoint
/// - `POST playlist/create`
///
/// Returns the id of the new playlist.
pub async fn create_playlist(
    client: &Client,
    base_url: &Url,
    credentials: &OAuthCredentials,
    title: &str,
    description: &str,
    privacy: Privacy,
) -> Result<String, CatalogError> {
    let body = json!({
        "title": title,
        "description": description,
        "privacyStatus": privacy.as_api_str(),
    });
    let response = post(client, base_url, credentials, "playlist/create", &[], body).await?;
    response
        .get("playlistId")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| CatalogError::unexpected("playlist/create", "no playlistId"))
}

/* ---------- Lookup ---------- */

fn browse_id(playlist_id: &str) -> String {
    if playlist_id.starts_with("VL") {
        playlist_id.to_string()
    } else {
        format!("VL{playlist_id}")
    }
}

/// Endpoint
/// - `POST browse` with browse id `VL{playlist_id}`
pub async fn get_playlist(
    client: &Client,
    base_url: &Url,
    credentials: &OAuthCredentials,
    playlist_id: &str,
) -> Result<PlaylistSummary, CatalogError> {
    let body = json!({ "browseId": browse_id(playlist_id) });
    let response = post(client, base_url, credentials, "browse", &[], body).await?;
    let title = parse_playlist_title(&response)
        .ok_or_else(|| CatalogError::unexpected("browse", "playlist has no title"))?;
    Ok(PlaylistSummary {
        id: playlist_id.trim_start_matches("VL").to_string(),
        title: title.to_string(),
    })
}

const TITLE_POINTERS: [&str; 4] = [
    "/header/musicDetailHeaderRenderer/title",
    "/header/musicEditablePlaylistDetailHeaderRenderer/header/musicDetailHeaderRenderer/title",
    "/contents/twoColumnBrowseResultsRenderer/tabs/0/tabRenderer/content/sectionListRenderer/contents/0/musicResponsiveHeaderRenderer/title",
    "/contents/twoColumnBrowseResultsRenderer/tabs/0/tabRenderer/content/sectionListRenderer/contents/0/musicEditablePlaylistDetailHeaderRenderer/header/musicResponsiveHeaderRenderer/title",
];

pub fn parse_playlist_title(response: &Value) -> Option<&str> {
    TITLE_POINTERS
        .iter()
        .find_map(|pointer| first_run_text(response, pointer))
}

/* ---------- Library listing ---------- */

/// Playlists in the user's library, up to `limit`.
///
/// Endpoint
/// - `POST browse` with browse id `FEmusic_liked_playlists`, then continuation
///   requests until `limit` is reached or the listing ends.
pub async fn list_playlists(
    client: &Client,
    base_url: &Url,
    credentials: &OAuthCredentials,
    limit: usize,
) -> Result<Vec<PlaylistSummary>, CatalogError> {
    let body = json!({ "browseId": LIBRARY_PLAYLISTS });
    let response = post(client, base_url, credentials, "browse", &[], body).await?;
    let mut page = parse_library_page(&response)
        .ok_or_else(|| CatalogError::unexpected("browse", "no playlist grid"))?;

    let mut playlists = Vec::new();
    loop {
        playlists.append(&mut page.playlists);
        let Some(token) = page.continuation.take() else {
            break;
        };
        if playlists.len() >= limit {
            break;
        }

        let query = [
            ("ctoken", token.as_str()),
            ("continuation", token.as_str()),
            ("type", "next"),
        ];
        let response = post(client, base_url, credentials, "browse", &query, json!({})).await?;
        match parse_library_page(&response) {
            Some(next) => page = next,
            None => break,
        }
    }

    playlists.truncate(limit);
    Ok(playlists)
}

#[derive(Debug, Default)]
pub struct LibraryPage {
    pub playlists: Vec<PlaylistSummary>,
    pub continuation: Option<String>,
}

const GRID: &str = "/contents/singleColumnBrowseResultsRenderer/tabs/0/tabRenderer/content/sectionListRenderer/contents/0/gridRenderer";
const GRID_CONTINUATION: &str = "/continuationContents/gridContinuation";

/// One page of the library listing, either the first response or a continuation.
pub fn parse_library_page(response: &Value) -> Option<LibraryPage> {
    let grid = response
        .pointer(GRID)
        .or_else(|| response.pointer(GRID_CONTINUATION))?;

    let playlists = grid
        .get("items")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(|item| item.get("musicTwoRowItemRenderer"))
        .filter_map(parse_library_item)
        .collect();

    let continuation = grid
        .pointer("/continuations/0/nextContinuationData/continuation")
        .and_then(Value::as_str)
        .map(str::to_string);

    Some(LibraryPage {
        playlists,
        continuation,
    })
}

fn parse_library_item(renderer: &Value) -> Option<PlaylistSummary> {
    // The "New playlist" tile has no browse endpoint and is skipped here.
    let browse_id = renderer
        .pointer("/navigationEndpoint/browseEndpoint/browseId")?
        .as_str()?;
    let title = first_run_text(renderer, "/title")?;
    Some(PlaylistSummary {
        id: browse_id.trim_start_matches("VL").to_string(),
        title: title.to_string(),
    })
}

/* ---------- Edit ---------- */

/// Append videos to a playlist.
///
/// Endpoint
/// - `POST browse/edit_playlist` with one `ACTION_ADD_VIDEO` per id. Unless
///   `allow_duplicates`, ids already in the playlist are skipped server side.
pub async fn add_playlist_items(
    client: &Client,
    base_url: &Url,
    credentials: &OAuthCredentials,
    playlist_id: &str,
    ids: &[String],
    allow_duplicates: bool,
) -> Result<(), CatalogError> {
    if ids.is_empty() {
        return Ok(());
    }

    let body = json!({
        "playlistId": playlist_id.trim_start_matches("VL"),
        "actions": add_actions(ids, allow_duplicates),
    });
    let response = post(
        client,
        base_url,
        credentials,
        "browse/edit_playlist",
        &[],
        body,
    )
    .await?;

    match response.get("status").and_then(Value::as_str) {
        Some("STATUS_SUCCEEDED") => Ok(()),
        status => Err(CatalogError::unexpected(
            "browse/edit_playlist",
            format!("status {}", status.unwrap_or("missing")),
        )),
    }
}

fn add_actions(ids: &[String], allow_duplicates: bool) -> Vec<Value> {
    ids.iter()
        .map(|id| {
            let mut action = json!({ "action": "ACTION_ADD_VIDEO", "addedVideoId": id });
            if !allow_duplicates {
                action["dedupeOption"] = json!("DEDUPE_OPTION_SKIP");
            }
            action
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tile(browse_id: Option<&str>, title: &str) -> Value {
        let mut renderer = json!({ "title": {"runs": [{"text": title}]} });
        if let Some(id) = browse_id {
            renderer["navigationEndpoint"] = json!({"browseEndpoint": {"browseId": id}});
        }
        json!({ "musicTwoRowItemRenderer": renderer })
    }

    #[test]
    fn test_browse_id_prefix() {
        assert_eq!(browse_id("PL123"), "VLPL123");
        assert_eq!(browse_id("VLPL123"), "VLPL123");
    }

    #[test]
    fn test_parse_playlist_title() {
        let response = json!({"header": {"musicDetailHeaderRenderer": {"title": {"runs": [{"text": "Road Trip"}]}}}});
        assert_eq!(parse_playlist_title(&response), Some("Road Trip"));
        assert_eq!(parse_playlist_title(&json!({"header": {}})), None);
    }

    #[test]
    fn test_parse_library_page() {
        let response = json!({"contents": {"singleColumnBrowseResultsRenderer": {"tabs": [
            {"tabRenderer": {"content": {"sectionListRenderer": {"contents": [
                {"gridRenderer": {
                    "items": [tile(None, "New playlist"), tile(Some("VLPL1"), "Road Trip")],
                    "continuations": [{"nextContinuationData": {"continuation": "tok"}}]
                }}
            ]}}}}
        ]}}});

        let page = parse_library_page(&response).unwrap();

        assert_eq!(
            page.playlists,
            vec![PlaylistSummary {
                id: "PL1".to_string(),
                title: "Road Trip".to_string()
            }]
        );
        assert_eq!(page.continuation.as_deref(), Some("tok"));
    }

    #[test]
    fn test_parse_library_continuation() {
        let response = json!({"continuationContents": {"gridContinuation": {
            "items": [tile(Some("VLPL2"), "Gym")]
        }}});
        let page = parse_library_page(&response).unwrap();
        assert_eq!(page.playlists[0].id, "PL2");
        assert_eq!(page.continuation, None);
    }

    #[test]
    fn test_add_actions_dedupe() {
        let ids = vec!["a".to_string()];
        assert_eq!(
            add_actions(&ids, false)[0],
            json!({"action": "ACTION_ADD_VIDEO", "addedVideoId": "a", "dedupeOption": "DEDUPE_OPTION_SKIP"})
        );
        assert!(add_actions(&ids, true)[0].get("dedupeOption").is_none());
    }
}
