use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::FetchError;
use crate::spotify::models::{
    Album, Artist, ArtistRef, Image, Owner, Playlist, PlaylistSummary, PlaylistTrack, Track,
    UserProfile,
};

const TRENDING_ALBUMS_LIMIT: &str = "10";
const POPULAR_ARTISTS_LIMIT: &str = "12";
const POPULAR_ARTISTS_QUERY: &str = "genre:pop";
const USER_PLAYLISTS_LIMIT: &str = "50";

/// Remote reads the session depends on.
///
/// Implementations never retry and never cache; callers must hold a
/// non-empty token before calling.
#[async_trait]
pub trait WebApi: Send + Sync {
    async fn fetch_trending_albums(&self, token: &str) -> Result<Vec<Album>, FetchError>;

    async fn fetch_popular_artists(&self, token: &str) -> Result<Vec<Artist>, FetchError>;

    async fn fetch_playlist(&self, token: &str, playlist_id: &str) -> Result<Playlist, FetchError>;

    async fn fetch_current_user_playlists(
        &self,
        token: &str,
    ) -> Result<Vec<PlaylistSummary>, FetchError>;

    async fn fetch_current_user(&self, token: &str) -> Result<UserProfile, FetchError>;
}

#[derive(Debug, Deserialize)]
struct ApiPage<T> {
    items: Vec<T>,
    next: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiArtistRef {
    id: Option<String>,
    name: String,
}

#[derive(Debug, Deserialize)]
struct ApiArtist {
    id: String,
    name: String,
    #[serde(default)]
    images: Option<Vec<Image>>,
    #[serde(default)]
    genres: Vec<String>,
    #[serde(default)]
    popularity: u32,
}

#[derive(Debug, Deserialize)]
struct ApiAlbum {
    id: Option<String>,
    name: String,
    #[serde(default)]
    images: Option<Vec<Image>>,
    #[serde(default)]
    artists: Vec<ApiArtistRef>,
    release_date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiTrack {
    id: Option<String>,
    name: String,
    album: ApiAlbum,
    #[serde(default)]
    artists: Vec<ApiArtistRef>,
    duration_ms: u64,
    preview_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiPlaylistItem {
    added_at: Option<DateTime<Utc>>,
    // Episodes share this slot, so decode lazily.
    track: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct ApiPlaylist {
    id: String,
    name: String,
    description: Option<String>,
    #[serde(default)]
    images: Option<Vec<Image>>,
    owner: Owner,
    public: Option<bool>,
    tracks: ApiPage<ApiPlaylistItem>,
}

#[derive(Debug, Deserialize)]
struct ApiTrackCount {
    total: u32,
}

#[derive(Debug, Deserialize)]
struct ApiPlaylistSummary {
    id: String,
    name: String,
    description: Option<String>,
    #[serde(default)]
    images: Option<Vec<Image>>,
    owner: Owner,
    public: Option<bool>,
    tracks: ApiTrackCount,
}

#[derive(Debug, Deserialize)]
struct NewReleasesResponse {
    albums: ApiPage<ApiAlbum>,
}

#[derive(Debug, Deserialize)]
struct ArtistSearchResponse {
    artists: ApiPage<ApiArtist>,
}

#[derive(Debug, Deserialize)]
struct ApiUser {
    id: String,
    display_name: Option<String>,
    #[serde(default)]
    images: Option<Vec<Image>>,
    product: Option<String>,
}

/// `WebApi` over the Spotify Web API using bearer auth.
pub struct SpotifyWebClient {
    http_client: Client,
    base_url: String,
}

impl SpotifyWebClient {
    pub fn new(config: &Config) -> Self {
        Self::with_base_url(&config.api_base_url)
    }

    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            http_client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn playlist_url(&self, playlist_id: &str) -> String {
        self.endpoint(&format!("playlists/{}", urlencoding::encode(playlist_id)))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        token: &str,
        url: &str,
        query: &[(&str, &str)],
        resource: &str,
    ) -> Result<T, FetchError> {
        debug!("GET {}", url);

        let response = self
            .http_client
            .get(url)
            .bearer_auth(token)
            .query(query)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            warn!("Web API rejected the access token for {}", resource);
            return Err(FetchError::Unauthorized);
        }
        if status == StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound(resource.to_string()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl WebApi for SpotifyWebClient {
    async fn fetch_trending_albums(&self, token: &str) -> Result<Vec<Album>, FetchError> {
        let response: NewReleasesResponse = self
            .get_json(
                token,
                &self.endpoint("browse/new-releases"),
                &[("limit", TRENDING_ALBUMS_LIMIT)],
                "new releases",
            )
            .await?;

        let albums: Vec<Album> = response.albums.items.into_iter().map(album_from_api).collect();
        info!("Fetched {} trending albums", albums.len());
        Ok(albums)
    }

    async fn fetch_popular_artists(&self, token: &str) -> Result<Vec<Artist>, FetchError> {
        let response: ArtistSearchResponse = self
            .get_json(
                token,
                &self.endpoint("search"),
                &[
                    ("q", POPULAR_ARTISTS_QUERY),
                    ("type", "artist"),
                    ("limit", POPULAR_ARTISTS_LIMIT),
                ],
                "popular artists",
            )
            .await?;

        let artists: Vec<Artist> = response.artists.items.into_iter().map(artist_from_api).collect();
        info!("Fetched {} popular artists", artists.len());
        Ok(artists)
    }

    async fn fetch_playlist(&self, token: &str, playlist_id: &str) -> Result<Playlist, FetchError> {
        let resource = format!("playlist {}", playlist_id);
        let first: ApiPlaylist = self
            .get_json(token, &self.playlist_url(playlist_id), &[], &resource)
            .await?;

        let mut next = first.tracks.next.clone();
        let mut extra_items = Vec::new();

        while let Some(url) = next {
            let page: ApiPage<ApiPlaylistItem> = self.get_json(token, &url, &[], &resource).await?;
            extra_items.extend(page.items);
            next = page.next;
        }

        let playlist = playlist_from_api(first, extra_items);
        info!(
            "Fetched playlist: {} ({} tracks)",
            playlist.name,
            playlist.tracks.len()
        );
        Ok(playlist)
    }

    async fn fetch_current_user_playlists(
        &self,
        token: &str,
    ) -> Result<Vec<PlaylistSummary>, FetchError> {
        let page: ApiPage<ApiPlaylistSummary> = self
            .get_json(
                token,
                &self.endpoint("me/playlists"),
                &[("limit", USER_PLAYLISTS_LIMIT)],
                "current user playlists",
            )
            .await?;

        let playlists: Vec<PlaylistSummary> =
            page.items.into_iter().map(playlist_summary_from_api).collect();
        info!("Found {} user playlists", playlists.len());
        Ok(playlists)
    }

    async fn fetch_current_user(&self, token: &str) -> Result<UserProfile, FetchError> {
        let user: ApiUser = self
            .get_json(token, &self.endpoint("me"), &[], "current user")
            .await?;

        Ok(UserProfile {
            id: user.id,
            display_name: user.display_name,
            images: user.images.unwrap_or_default(),
            product: user.product,
        })
    }
}

fn artist_ref_from_api(artist: ApiArtistRef) -> ArtistRef {
    ArtistRef {
        id: artist.id.unwrap_or_default(),
        name: artist.name,
    }
}

fn artist_from_api(artist: ApiArtist) -> Artist {
    Artist {
        id: artist.id,
        name: artist.name,
        images: artist.images.unwrap_or_default(),
        genres: artist.genres,
        popularity: artist.popularity,
    }
}

fn album_from_api(album: ApiAlbum) -> Album {
    Album {
        id: album.id.unwrap_or_default(),
        name: album.name,
        images: album.images.unwrap_or_default(),
        artists: album.artists.into_iter().map(artist_ref_from_api).collect(),
        release_date: album.release_date,
    }
}

fn playlist_track_from_api(item: ApiPlaylistItem) -> Option<PlaylistTrack> {
    let value = item.track?;
    if value.get("type").and_then(|t| t.as_str()) == Some("episode") {
        debug!("Skipping episode entry");
        return None;
    }

    let track: ApiTrack = match serde_json::from_value(value) {
        Ok(track) => track,
        Err(e) => {
            warn!("Skipping undecodable playlist entry: {}", e);
            return None;
        }
    };

    // Local tracks have no id
    let Some(id) = track.id else {
        debug!("Skipping local track: {}", track.name);
        return None;
    };

    Some(PlaylistTrack {
        added_at: item.added_at,
        track: Track {
            id,
            name: track.name,
            album: album_from_api(track.album),
            artists: track.artists.into_iter().map(artist_ref_from_api).collect(),
            duration_ms: track.duration_ms,
            preview_url: track.preview_url,
            added_at: item.added_at,
        },
    })
}

fn playlist_from_api(playlist: ApiPlaylist, extra_items: Vec<ApiPlaylistItem>) -> Playlist {
    let tracks = playlist
        .tracks
        .items
        .into_iter()
        .chain(extra_items)
        .filter_map(playlist_track_from_api)
        .collect();

    Playlist {
        id: playlist.id,
        name: playlist.name,
        description: playlist.description.unwrap_or_default(),
        images: playlist.images.unwrap_or_default(),
        owner: playlist.owner,
        is_public: playlist.public.unwrap_or(false),
        tracks,
    }
}

fn playlist_summary_from_api(playlist: ApiPlaylistSummary) -> PlaylistSummary {
    PlaylistSummary {
        id: playlist.id,
        name: playlist.name,
        description: playlist.description.unwrap_or_default(),
        images: playlist.images.unwrap_or_default(),
        owner: playlist.owner,
        is_public: playlist.public.unwrap_or(false),
        total_tracks: playlist.tracks.total,
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn api_track(id: Option<&str>, name: &str) -> serde_json::Value {
        json!({
            "type": "track",
            "id": id,
            "name": name,
            "album": {
                "id": "album-1",
                "name": "Album One",
                "images": [{"url": "https://i.scdn.co/image/1", "height": 640, "width": 640}],
                "artists": [{"id": "artist-1", "name": "Artist One"}]
            },
            "artists": [{"id": "artist-1", "name": "Artist One"}],
            "duration_ms": 215000,
            "preview_url": null
        })
    }

    #[test]
    fn test_endpoint_joins_paths() {
        let client = SpotifyWebClient::with_base_url("https://api.spotify.com/v1/");
        assert_eq!(client.endpoint("/me"), "https://api.spotify.com/v1/me");
        assert_eq!(
            client.playlist_url("37i9dQZF1E8NC99vGqLsaH"),
            "https://api.spotify.com/v1/playlists/37i9dQZF1E8NC99vGqLsaH"
        );
        assert_eq!(
            client.playlist_url("a b"),
            "https://api.spotify.com/v1/playlists/a%20b"
        );
    }

    #[test]
    fn test_playlist_keeps_api_order_and_skips_unplayable() {
        let first: ApiPlaylist = serde_json::from_value(json!({
            "id": "p1",
            "name": "Road Trip",
            "description": null,
            "images": null,
            "owner": {"id": "owner", "display_name": "Owner"},
            "public": true,
            "tracks": {
                "items": [
                    {"added_at": "2024-01-02T03:04:05Z", "track": api_track(Some("t1"), "First")},
                    {"added_at": "2024-01-02T03:04:05Z", "track": null},
                    {"added_at": "2024-01-02T03:04:05Z", "track": api_track(None, "Local File")},
                    {"added_at": "2024-01-03T00:00:00Z", "track": {"type": "episode", "id": "e1", "name": "Pod"}}
                ],
                "next": "https://api.spotify.com/v1/playlists/p1/tracks?offset=100"
            }
        }))
        .unwrap();
        let second: ApiPage<ApiPlaylistItem> = serde_json::from_value(json!({
            "items": [
                {"added_at": "2024-02-01T00:00:00Z", "track": api_track(Some("t2"), "Second")}
            ],
            "next": null
        }))
        .unwrap();

        let playlist = playlist_from_api(first, second.items);

        let ids: Vec<&str> = playlist.tracks.iter().map(|t| t.track.id.as_str()).collect();
        assert_eq!(ids, vec!["t1", "t2"]);
        assert_eq!(playlist.description, "");
        assert!(playlist.images.is_empty());
        assert!(playlist.is_public);
        assert_eq!(playlist.tracks[0].track.album.name, "Album One");
        assert_eq!(playlist.tracks[1].track.added_at, playlist.tracks[1].added_at);
        assert!(playlist.tracks[1].added_at.is_some());
    }

    #[test]
    fn test_playlist_summary_defaults() {
        let summary: ApiPlaylistSummary = serde_json::from_value(json!({
            "id": "p2",
            "name": "Mine",
            "description": "desc",
            "owner": {"id": "me", "display_name": null},
            "public": null,
            "tracks": {"total": 42}
        }))
        .unwrap();

        let summary = playlist_summary_from_api(summary);
        assert_eq!(summary.total_tracks, 42);
        assert!(!summary.is_public);
        assert_eq!(summary.owner.label(), "me");
    }

    #[test]
    fn test_search_artists_decode() {
        let response: ArtistSearchResponse = serde_json::from_value(json!({
            "artists": {
                "items": [
                    {"id": "a1", "name": "Singer", "images": [], "genres": ["pop"], "popularity": 91}
                ],
                "next": null
            }
        }))
        .unwrap();

        let artists: Vec<Artist> = response.artists.items.into_iter().map(artist_from_api).collect();
        assert_eq!(artists.len(), 1);
        assert_eq!(artists[0].popularity, 91);
        assert_eq!(artists[0].genres, vec!["pop".to_string()]);
    }
}
