pub mod auth;
pub mod config;
pub mod error;
pub mod logging;
pub mod session;
pub mod spotify;
pub mod store;
pub mod task;
pub mod view;

pub use auth::{AuthFlow, AuthState, CodeExchanger, Navigator, SpotifyAuthClient};
pub use config::{Config, Timings};
pub use error::{AppError, AuthExchangeError, FetchError, Result};
pub use session::{FetchOutcome, Session};
pub use spotify::{Playlist, SpotifyWebClient, Token, Track, WebApi};
pub use store::{Action, AppState, LoadStatus, PlayerPhase, SliceKey, Store};
pub use task::ScheduledTask;
pub use view::{HomeView, MountedView, PlaylistView, ViewFlags};
