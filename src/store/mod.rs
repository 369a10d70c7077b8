//! The application store: every slice composed into one versioned tree.
//!
//! All writes go through [`Store::dispatch`] with a closed set of
//! [`Action`]s. Each dispatch replaces state and notifies subscribers in one
//! step, so a reader never observes a half-applied action. There are no
//! cross-slice transactions.

pub mod selectors;
pub mod slices;

use std::sync::Arc;

use tokio::sync::watch;
use tracing::debug;

use crate::spotify::models::{
    Album, Artist, CurrentlyPlayingTrack, Playlist, PlaylistSummary, Token, UserProfile,
};

pub use slices::{Generation, LoadStatus, PlayerPhase, PlayerState, Slice, UiState};

/// Slices that are populated by a remote fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SliceKey {
    CurrentUser,
    CurrentUserPlaylists,
    CurrentPlaylist,
    TrendingAlbums,
    PopularArtists,
}

impl std::fmt::Display for SliceKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SliceKey::CurrentUser => write!(f, "current user"),
            SliceKey::CurrentUserPlaylists => write!(f, "current user playlists"),
            SliceKey::CurrentPlaylist => write!(f, "current playlist"),
            SliceKey::TrendingAlbums => write!(f, "trending albums"),
            SliceKey::PopularArtists => write!(f, "popular artists"),
        }
    }
}

#[derive(Debug, Clone)]
pub enum Action {
    SetAccessToken(Token),
    CurrentUserLoaded {
        generation: Generation,
        user: UserProfile,
    },
    CurrentUserPlaylistsLoaded {
        generation: Generation,
        playlists: Vec<PlaylistSummary>,
    },
    CurrentPlaylistLoaded {
        generation: Generation,
        playlist: Playlist,
    },
    TrendingAlbumsLoaded {
        generation: Generation,
        albums: Vec<Album>,
    },
    PopularArtistsLoaded {
        generation: Generation,
        artists: Vec<Artist>,
    },
    FetchFailed {
        key: SliceKey,
        generation: Generation,
        message: String,
    },
    FetchAbandoned {
        key: SliceKey,
        generation: Generation,
    },
    SetSelectedArtist(Artist),
    ClearSelectedArtist,
    SetCurrentlyPlayingTrack(CurrentlyPlayingTrack),
    PlayTrack,
    PauseTrack,
    MarkTrackReady(String),
    ToggleTheme,
    ToggleNavbar,
    ToggleCreatePlaylistModal,
    ToggleAddTracksModal,
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::SetAccessToken(_) => "set_access_token",
            Action::CurrentUserLoaded { .. } => "current_user_loaded",
            Action::CurrentUserPlaylistsLoaded { .. } => "current_user_playlists_loaded",
            Action::CurrentPlaylistLoaded { .. } => "current_playlist_loaded",
            Action::TrendingAlbumsLoaded { .. } => "trending_albums_loaded",
            Action::PopularArtistsLoaded { .. } => "popular_artists_loaded",
            Action::FetchFailed { .. } => "fetch_failed",
            Action::FetchAbandoned { .. } => "fetch_abandoned",
            Action::SetSelectedArtist(_) => "set_selected_artist",
            Action::ClearSelectedArtist => "clear_selected_artist",
            Action::SetCurrentlyPlayingTrack(_) => "set_currently_playing_track",
            Action::PlayTrack => "play_track",
            Action::PauseTrack => "pause_track",
            Action::MarkTrackReady(_) => "mark_track_ready",
            Action::ToggleTheme => "toggle_theme",
            Action::ToggleNavbar => "toggle_navbar",
            Action::ToggleCreatePlaylistModal => "toggle_create_playlist_modal",
            Action::ToggleAddTracksModal => "toggle_add_tracks_modal",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppState {
    version: u64,
    pub access_token: Option<Token>,
    pub current_user: Slice<UserProfile>,
    pub current_user_playlists: Slice<Vec<PlaylistSummary>>,
    pub current_playlist: Slice<Playlist>,
    pub trending_albums: Slice<Vec<Album>>,
    pub popular_artists: Slice<Vec<Artist>>,
    /// Copied by value at selection time; later artist fetches do not touch it.
    pub selected_artist: Option<Artist>,
    pub player: PlayerState,
    pub ui: UiState,
}

impl AppState {
    /// Bumped on every committed change.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn is_authenticated(&self) -> bool {
        self.access_token.as_ref().is_some_and(|token| !token.is_empty())
    }

    fn begin(&mut self, key: SliceKey) -> Generation {
        self.version += 1;
        match key {
            SliceKey::CurrentUser => self.current_user.begin(),
            SliceKey::CurrentUserPlaylists => self.current_user_playlists.begin(),
            SliceKey::CurrentPlaylist => self.current_playlist.begin(),
            SliceKey::TrendingAlbums => self.trending_albums.begin(),
            SliceKey::PopularArtists => self.popular_artists.begin(),
        }
    }

    fn apply(&mut self, action: Action) -> bool {
        let changed = self.reduce(action);
        if changed {
            self.version += 1;
        }
        changed
    }

    fn reduce(&mut self, action: Action) -> bool {
        match action {
            Action::SetAccessToken(token) => {
                self.access_token = Some(token);
                true
            }
            Action::CurrentUserLoaded { generation, user } => {
                self.current_user.resolve(generation, user)
            }
            Action::CurrentUserPlaylistsLoaded {
                generation,
                playlists,
            } => self.current_user_playlists.resolve(generation, playlists),
            Action::CurrentPlaylistLoaded {
                generation,
                playlist,
            } => self.current_playlist.resolve(generation, playlist),
            Action::TrendingAlbumsLoaded { generation, albums } => {
                self.trending_albums.resolve(generation, albums)
            }
            Action::PopularArtistsLoaded {
                generation,
                artists,
            } => self.popular_artists.resolve(generation, artists),
            Action::FetchFailed {
                key,
                generation,
                message,
            } => match key {
                SliceKey::CurrentUser => self.current_user.reject(generation, message),
                SliceKey::CurrentUserPlaylists => {
                    self.current_user_playlists.reject(generation, message)
                }
                SliceKey::CurrentPlaylist => self.current_playlist.reject(generation, message),
                SliceKey::TrendingAlbums => self.trending_albums.reject(generation, message),
                SliceKey::PopularArtists => self.popular_artists.reject(generation, message),
            },
            Action::FetchAbandoned { key, generation } => match key {
                SliceKey::CurrentUser => self.current_user.abandon(generation),
                SliceKey::CurrentUserPlaylists => self.current_user_playlists.abandon(generation),
                SliceKey::CurrentPlaylist => self.current_playlist.abandon(generation),
                SliceKey::TrendingAlbums => self.trending_albums.abandon(generation),
                SliceKey::PopularArtists => self.popular_artists.abandon(generation),
            },
            Action::SetSelectedArtist(artist) => {
                self.selected_artist = Some(artist);
                true
            }
            Action::ClearSelectedArtist => self.selected_artist.take().is_some(),
            Action::SetCurrentlyPlayingTrack(track) => self.player.set_current(track),
            Action::PlayTrack => self.player.set_playing(true),
            Action::PauseTrack => self.player.set_playing(false),
            Action::MarkTrackReady(track_id) => self.player.mark_ready(&track_id),
            Action::ToggleTheme => {
                self.ui.dark_mode = !self.ui.dark_mode;
                true
            }
            Action::ToggleNavbar => {
                self.ui.navbar_open = !self.ui.navbar_open;
                true
            }
            Action::ToggleCreatePlaylistModal => {
                self.ui.create_playlist_modal_open = !self.ui.create_playlist_modal_open;
                true
            }
            Action::ToggleAddTracksModal => {
                self.ui.add_tracks_modal_open = !self.ui.add_tracks_modal_open;
                true
            }
        }
    }
}

/// Shared handle to the single state tree. Cloning shares the same store.
#[derive(Clone)]
pub struct Store {
    state: Arc<watch::Sender<AppState>>,
}

impl Store {
    pub fn new() -> Self {
        let (state, _) = watch::channel(AppState::default());
        Self {
            state: Arc::new(state),
        }
    }

    /// Apply one action. Returns `false` when it was stale or a no-op.
    pub fn dispatch(&self, action: Action) -> bool {
        let name = action.name();
        let changed = self.state.send_if_modified(|state| state.apply(action));
        if !changed {
            debug!("Action {} left state unchanged", name);
        }
        changed
    }

    /// Tag a new request for `key`; any request already in flight for it
    /// becomes stale.
    pub fn begin_request(&self, key: SliceKey) -> Generation {
        let mut generation = 0;
        self.state.send_modify(|state| generation = state.begin(key));
        debug!("Request {} issued for {}", generation, key);
        generation
    }

    pub fn snapshot(&self) -> AppState {
        self.state.borrow().clone()
    }

    pub fn read<R>(&self, f: impl FnOnce(&AppState) -> R) -> R {
        f(&self.state.borrow())
    }

    pub fn subscribe(&self) -> watch::Receiver<AppState> {
        self.state.subscribe()
    }

    /// The gate every fetch goes through.
    pub fn access_token(&self) -> Option<Token> {
        self.read(|state| state.access_token.clone().filter(|token| !token.is_empty()))
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}
