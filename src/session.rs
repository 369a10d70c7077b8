//! Token-gated loading of remote data into the store, plus player commands.

use std::future::Future;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::error::{AppError, FetchError, Result};
use crate::spotify::client::WebApi;
use crate::spotify::models::{Artist, CurrentlyPlayingTrack};
use crate::store::{Action, Generation, SliceKey, Store};

/// How a load that returned data ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    Committed,
    /// A newer request for the same slice was issued; the payload was dropped.
    Stale,
}

#[derive(Clone)]
pub struct Session {
    store: Store,
    api: Arc<dyn WebApi>,
}

impl Session {
    pub fn new(store: Store, api: Arc<dyn WebApi>) -> Self {
        Self { store, api }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn is_authenticated(&self) -> bool {
        self.store.access_token().is_some()
    }

    pub async fn load_playlist(&self, playlist_id: &str) -> std::result::Result<FetchOutcome, FetchError> {
        let api = self.api.clone();
        let playlist_id = playlist_id.to_string();
        self.load(
            SliceKey::CurrentPlaylist,
            move |token| async move { api.fetch_playlist(&token, &playlist_id).await },
            |generation, playlist| Action::CurrentPlaylistLoaded {
                generation,
                playlist,
            },
        )
        .await
    }

    pub async fn load_current_user_playlists(&self) -> std::result::Result<FetchOutcome, FetchError> {
        let api = self.api.clone();
        self.load(
            SliceKey::CurrentUserPlaylists,
            move |token| async move { api.fetch_current_user_playlists(&token).await },
            |generation, playlists| Action::CurrentUserPlaylistsLoaded {
                generation,
                playlists,
            },
        )
        .await
    }

    pub async fn load_current_user(&self) -> std::result::Result<FetchOutcome, FetchError> {
        let api = self.api.clone();
        self.load(
            SliceKey::CurrentUser,
            move |token| async move { api.fetch_current_user(&token).await },
            |generation, user| Action::CurrentUserLoaded { generation, user },
        )
        .await
    }

    pub async fn load_trending_albums(&self) -> std::result::Result<FetchOutcome, FetchError> {
        let api = self.api.clone();
        self.load(
            SliceKey::TrendingAlbums,
            move |token| async move { api.fetch_trending_albums(&token).await },
            |generation, albums| Action::TrendingAlbumsLoaded { generation, albums },
        )
        .await
    }

    pub async fn load_popular_artists(&self) -> std::result::Result<FetchOutcome, FetchError> {
        let api = self.api.clone();
        self.load(
            SliceKey::PopularArtists,
            move |token| async move { api.fetch_popular_artists(&token).await },
            |generation, artists| Action::PopularArtistsLoaded {
                generation,
                artists,
            },
        )
        .await
    }

    /// Both home fetches in flight at once; each settles its own slice.
    pub async fn load_home(
        &self,
    ) -> (
        std::result::Result<FetchOutcome, FetchError>,
        std::result::Result<FetchOutcome, FetchError>,
    ) {
        tokio::join!(self.load_trending_albums(), self.load_popular_artists())
    }

    async fn load<T, F, Fut>(
        &self,
        key: SliceKey,
        fetch: F,
        commit: impl FnOnce(Generation, T) -> Action,
    ) -> std::result::Result<FetchOutcome, FetchError>
    where
        F: FnOnce(String) -> Fut,
        Fut: Future<Output = std::result::Result<T, FetchError>>,
    {
        let Some(token) = self.store.access_token() else {
            debug!("Not loading {}: no access token", key);
            return Err(FetchError::Unauthenticated);
        };

        let generation = self.store.begin_request(key);
        let pending = PendingRequest {
            store: self.store.clone(),
            key,
            generation,
            settled: false,
        };

        let result = fetch(token.value).await;
        pending.settle();

        match result {
            Ok(value) => {
                if self.store.dispatch(commit(generation, value)) {
                    info!("Loaded {} (request {})", key, generation);
                    Ok(FetchOutcome::Committed)
                } else {
                    debug!("Dropped stale {} response (request {})", key, generation);
                    Ok(FetchOutcome::Stale)
                }
            }
            Err(e) => {
                warn!("Failed to load {}: {}", key, e);
                self.store.dispatch(Action::FetchFailed {
                    key,
                    generation,
                    message: e.to_string(),
                });
                Err(e)
            }
        }
    }

    /// Start playing a track already resident in the current playlist.
    ///
    /// One dispatch: whatever was playing is replaced directly.
    pub fn play_track(&self, track_id: &str, is_loading: bool) -> Result<()> {
        let track = self
            .store
            .read(|state| {
                state
                    .current_playlist
                    .value()
                    .and_then(|playlist| playlist.find_track(track_id))
                    .cloned()
            })
            .ok_or_else(|| AppError::TrackNotResident(track_id.to_string()))?;

        info!("Playing track: {}", track.name);
        self.store
            .dispatch(Action::SetCurrentlyPlayingTrack(CurrentlyPlayingTrack::start(
                track, is_loading,
            )));
        Ok(())
    }

    pub fn pause(&self) -> bool {
        self.store.dispatch(Action::PauseTrack)
    }

    pub fn resume(&self) -> bool {
        self.store.dispatch(Action::PlayTrack)
    }

    pub fn toggle_playback(&self) -> bool {
        let playing = self.store.read(|state| {
            state
                .player
                .currently_playing()
                .map(|current| current.is_playing)
        });
        match playing {
            Some(true) => self.pause(),
            Some(false) => self.resume(),
            None => false,
        }
    }

    pub fn mark_track_ready(&self, track_id: &str) -> bool {
        self.store.dispatch(Action::MarkTrackReady(track_id.to_string()))
    }

    pub fn select_artist(&self, artist: Artist) {
        debug!("Selected artist: {}", artist.name);
        self.store.dispatch(Action::SetSelectedArtist(artist));
    }

    pub fn clear_selected_artist(&self) -> bool {
        self.store.dispatch(Action::ClearSelectedArtist)
    }
}

/// Rolls the slice status back if the load is dropped mid-flight.
struct PendingRequest {
    store: Store,
    key: SliceKey,
    generation: Generation,
    settled: bool,
}

impl PendingRequest {
    fn settle(mut self) {
        self.settled = true;
    }
}

impl Drop for PendingRequest {
    fn drop(&mut self) {
        if !self.settled {
            debug!("Abandoned {} request {}", self.key, self.generation);
            self.store.dispatch(Action::FetchAbandoned {
                key: self.key,
                generation: self.generation,
            });
        }
    }
}
