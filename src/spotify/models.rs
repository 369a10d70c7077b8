use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    pub url: String,
    pub height: Option<u32>,
    pub width: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owner {
    pub id: String,
    pub display_name: Option<String>,
}

impl Owner {
    pub fn label(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.id)
    }
}

/// Artist as embedded in tracks and albums.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtistRef {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artist {
    pub id: String,
    pub name: String,
    pub images: Vec<Image>,
    pub genres: Vec<String>,
    pub popularity: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Album {
    pub id: String,
    pub name: String,
    pub images: Vec<Image>,
    pub artists: Vec<ArtistRef>,
    pub release_date: Option<String>,
}

impl Album {
    /// Comma separated artist names, as shown under album art.
    pub fn artist_names(&self) -> String {
        self.artists
            .iter()
            .map(|a| a.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// A track as fetched. Identity is `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub id: String,
    pub name: String,
    pub album: Album,
    pub artists: Vec<ArtistRef>,
    pub duration_ms: u64,
    pub preview_url: Option<String>,
    pub added_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistTrack {
    pub added_at: Option<DateTime<Utc>>,
    pub track: Track,
}

/// A fully loaded playlist. `tracks` keeps the order the API returned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Playlist {
    pub id: String,
    pub name: String,
    pub description: String,
    pub images: Vec<Image>,
    pub owner: Owner,
    pub is_public: bool,
    pub tracks: Vec<PlaylistTrack>,
}

impl Playlist {
    pub fn find_track(&self, track_id: &str) -> Option<&Track> {
        self.tracks
            .iter()
            .map(|entry| &entry.track)
            .find(|track| track.id == track_id)
    }
}

/// Library listing entry for one of the user's playlists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistSummary {
    pub id: String,
    pub name: String,
    pub description: String,
    pub images: Vec<Image>,
    pub owner: Owner,
    pub is_public: bool,
    pub total_tracks: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub display_name: Option<String>,
    pub images: Vec<Image>,
    pub product: Option<String>,
}

/// Raw token endpoint payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub refresh_token: Option<String>,
    pub scope: Option<String>,
}

/// The session's access token. Never refreshed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub value: String,
    pub obtained_at: DateTime<Utc>,
}

impl Token {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            obtained_at: Utc::now(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }
}

impl From<TokenResponse> for Token {
    fn from(response: TokenResponse) -> Self {
        Token::new(response.access_token)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayingItem {
    #[serde(flatten)]
    pub track: Track,
    /// Duration/progress of the item are still being settled by the view.
    pub is_loading: bool,
}

/// The transport's focus. At most one exists at a time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentlyPlayingTrack {
    pub is_playing: bool,
    pub progress_ms: u64,
    pub item: PlayingItem,
}

impl CurrentlyPlayingTrack {
    /// Built at click time from resident track data; starts playing at 0.
    pub fn start(track: Track, is_loading: bool) -> Self {
        Self {
            is_playing: true,
            progress_ms: 0,
            item: PlayingItem { track, is_loading },
        }
    }

    pub fn track_id(&self) -> &str {
        &self.item.track.id
    }
}

#[cfg(test)]
impl Track {
    pub fn mock(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            album: Album::mock("album-1", "Mock Album"),
            artists: vec![ArtistRef {
                id: "artist-1".to_string(),
                name: "Mock Artist".to_string(),
            }],
            duration_ms: 180000,
            preview_url: None,
            added_at: None,
        }
    }
}

#[cfg(test)]
impl Album {
    pub fn mock(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            images: Vec::new(),
            artists: vec![ArtistRef {
                id: "artist-1".to_string(),
                name: "Mock Artist".to_string(),
            }],
            release_date: None,
        }
    }
}

#[cfg(test)]
impl Artist {
    pub fn mock(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            images: Vec::new(),
            genres: vec!["pop".to_string()],
            popularity: 80,
        }
    }
}

#[cfg(test)]
impl Playlist {
    pub fn mock(id: &str, track_ids: &[&str]) -> Self {
        Self {
            id: id.to_string(),
            name: format!("Playlist {}", id),
            description: String::new(),
            images: Vec::new(),
            owner: Owner {
                id: "owner".to_string(),
                display_name: Some("Owner".to_string()),
            },
            is_public: true,
            tracks: track_ids
                .iter()
                .map(|track_id| PlaylistTrack {
                    added_at: None,
                    track: Track::mock(track_id, &format!("Track {}", track_id)),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_track_by_id() {
        let playlist = Playlist::mock("p1", &["a", "b"]);
        assert_eq!(playlist.find_track("b").map(|t| t.name.as_str()), Some("Track b"));
        assert!(playlist.find_track("z").is_none());
    }

    #[test]
    fn test_start_playing_from_track() {
        let current = CurrentlyPlayingTrack::start(Track::mock("t1", "One"), true);
        assert!(current.is_playing);
        assert_eq!(current.progress_ms, 0);
        assert_eq!(current.track_id(), "t1");
        assert!(current.item.is_loading);
    }

    #[test]
    fn test_owner_label_falls_back_to_id() {
        let owner = Owner {
            id: "owner-id".to_string(),
            display_name: None,
        };
        assert_eq!(owner.label(), "owner-id");
    }

    #[test]
    fn test_album_artist_names() {
        let mut album = Album::mock("a", "A");
        album.artists.push(ArtistRef {
            id: "artist-2".to_string(),
            name: "Second".to_string(),
        });
        assert_eq!(album.artist_names(), "Mock Artist, Second");
    }
}
