use std::time::Duration;

use crate::error::{AppError, Result};

const DEFAULT_REDIRECT_URI: &str = "http://127.0.0.1:5173/callback";
const DEFAULT_API_BASE_URL: &str = "https://api.spotify.com/v1";

/// Fixed delays layered on top of the auth exchange and view loading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timings {
    /// Wait before the authorization code is exchanged.
    pub settle_delay: Duration,
    /// Minimum time a view shows its animated loader.
    pub loader_min_display: Duration,
    /// Time a view keeps its skeletons after a load commits.
    pub loading_grace: Duration,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            settle_delay: Duration::from_millis(3000),
            loader_min_display: Duration::from_millis(2000),
            loading_grace: Duration::from_millis(3000),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub spotify_client_id: String,
    pub spotify_client_secret: String,
    pub spotify_redirect_uri: String,
    pub api_base_url: String,
    pub timings: Timings,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let spotify_client_id = std::env::var("SPOTIFY_CLIENT_ID")
            .map_err(|_| AppError::Config("SPOTIFY_CLIENT_ID not set".into()))?;

        let spotify_client_secret = std::env::var("SPOTIFY_CLIENT_SECRET")
            .map_err(|_| AppError::Config("SPOTIFY_CLIENT_SECRET not set".into()))?;

        let spotify_redirect_uri = std::env::var("SPOTIFY_REDIRECT_URI")
            .unwrap_or_else(|_| DEFAULT_REDIRECT_URI.to_string());

        let api_base_url = std::env::var("SPOTIFY_API_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_string());

        let defaults = Timings::default();
        let timings = Timings {
            settle_delay: millis_from_env("SPOTIFY_SETTLE_DELAY_MS", defaults.settle_delay)?,
            loader_min_display: millis_from_env(
                "SPOTIFY_LOADER_MIN_DISPLAY_MS",
                defaults.loader_min_display,
            )?,
            loading_grace: millis_from_env("SPOTIFY_LOADING_GRACE_MS", defaults.loading_grace)?,
        };

        let config = Self {
            spotify_client_id,
            spotify_client_secret,
            spotify_redirect_uri,
            api_base_url,
            timings,
        };
        config.validate()?;
        Ok(config)
    }

    /// Names of the credential variables that are empty.
    pub fn missing_credentials(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();

        if self.spotify_client_id.trim().is_empty() {
            missing.push("SPOTIFY_CLIENT_ID");
        }
        if self.spotify_client_secret.trim().is_empty() {
            missing.push("SPOTIFY_CLIENT_SECRET");
        }

        missing
    }

    pub fn validate(&self) -> Result<()> {
        let missing = self.missing_credentials();
        if missing.is_empty() {
            return Ok(());
        }
        Err(AppError::Config(format!("empty credentials: {}", missing.join(", "))))
    }
}

fn millis_from_env(key: &str, default: Duration) -> Result<Duration> {
    match std::env::var(key) {
        Ok(raw) => parse_millis(key, &raw),
        Err(_) => Ok(default),
    }
}

fn parse_millis(key: &str, raw: &str) -> Result<Duration> {
    raw.trim()
        .parse::<u64>()
        .map(Duration::from_millis)
        .map_err(|_| AppError::Config(format!("{} must be a whole number of milliseconds, got {:?}", key, raw)))
}

#[cfg(test)]
impl Config {
    pub fn mock() -> Self {
        Self {
            spotify_client_id: "client-id".to_string(),
            spotify_client_secret: "client-secret".to_string(),
            spotify_redirect_uri: DEFAULT_REDIRECT_URI.to_string(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            timings: Timings::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_timings() {
        let timings = Timings::default();
        assert_eq!(timings.settle_delay, Duration::from_secs(3));
        assert_eq!(timings.loader_min_display, Duration::from_secs(2));
        assert_eq!(timings.loading_grace, Duration::from_secs(3));
    }

    #[test]
    fn test_parse_millis() {
        assert_eq!(
            parse_millis("SPOTIFY_SETTLE_DELAY_MS", " 1500 ").unwrap(),
            Duration::from_millis(1500)
        );
        assert!(matches!(
            parse_millis("SPOTIFY_SETTLE_DELAY_MS", "soon"),
            Err(AppError::Config(_))
        ));
    }

    #[test]
    fn test_empty_credentials_rejected() {
        let mut config = Config::mock();
        assert!(config.validate().is_ok());
        assert!(config.missing_credentials().is_empty());

        config.spotify_client_secret = "  ".to_string();
        assert_eq!(config.missing_credentials(), vec!["SPOTIFY_CLIENT_SECRET"]);

        config.spotify_client_id.clear();
        match config.validate() {
            Err(AppError::Config(msg)) => {
                assert!(msg.contains("SPOTIFY_CLIENT_ID"));
                assert!(msg.contains("SPOTIFY_CLIENT_SECRET"));
            }
            other => panic!("expected a config error, got {:?}", other),
        }
    }
}
