use thiserror::Error;

/// Failure while trading an authorization code for an access token.
#[derive(Error, Debug)]
pub enum AuthExchangeError {
    #[error("Spotify API error: {0}")]
    SpotifyApi(#[from] rspotify::ClientError),

    #[error("Token exchange succeeded but no token was issued")]
    MissingToken,

    #[error("Failed to acquire the client token lock")]
    TokenLock,

    #[error("Authorization code rejected: {0}")]
    Rejected(String),
}

/// Failure of a single Web API read.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("No access token available")]
    Unauthenticated,

    #[error("Access token rejected by the Web API")]
    Unauthorized,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Web API returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Authentication failed: {0}")]
    Auth(#[from] AuthExchangeError),

    #[error("Fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("Track is not loaded in the current playlist: {0}")]
    TrackNotResident(String),

    #[error("Invalid redirect: {0}")]
    InvalidRedirect(String),

    #[error("Logging setup failed: {0}")]
    Logging(String),
}

pub type Result<T> = std::result::Result<T, AppError>;
