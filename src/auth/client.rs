use async_trait::async_trait;
use rspotify::{prelude::*, scopes, AuthCodeSpotify, Credentials, OAuth};
use tracing::{debug, info};
use url::Url;

use crate::config::Config;
use crate::error::{AppError, AuthExchangeError, Result};
use crate::spotify::models::TokenResponse;

/// Trades a one-time authorization code for an access token.
#[async_trait]
pub trait CodeExchanger: Send + Sync {
    async fn exchange_code(&self, code: &str) -> std::result::Result<TokenResponse, AuthExchangeError>;
}

pub struct SpotifyAuthClient {
    client: AuthCodeSpotify,
}

impl SpotifyAuthClient {
    /// Fails with `AppError::Config` when the client credentials are empty.
    pub fn new(config: &Config) -> Result<Self> {
        config.validate()?;
        let creds = Credentials::new(&config.spotify_client_id, &config.spotify_client_secret);

        let oauth = OAuth {
            redirect_uri: config.spotify_redirect_uri.clone(),
            scopes: scopes!(
                "user-read-private",
                "user-read-email",
                "user-top-read",
                "playlist-read-private",
                "playlist-read-collaborative",
                "playlist-modify-private",
                "playlist-modify-public",
                "user-read-playback-state",
                "user-modify-playback-state",
                "user-read-currently-playing",
                "streaming"
            ),
            ..Default::default()
        };

        Ok(Self {
            client: AuthCodeSpotify::new(creds, oauth),
        })
    }

    /// Login URL that sends the user through Spotify and back to the callback.
    pub fn authorize_url(&self) -> Result<String> {
        let url = self
            .client
            .get_authorize_url(false)
            .map_err(AuthExchangeError::from)?;
        Ok(url)
    }
}

#[async_trait]
impl CodeExchanger for SpotifyAuthClient {
    async fn exchange_code(&self, code: &str) -> std::result::Result<TokenResponse, AuthExchangeError> {
        self.client.request_token(code).await?;

        let token_mutex = self.client.get_token();
        let guard = token_mutex
            .lock()
            .await
            .map_err(|_| AuthExchangeError::TokenLock)?;
        let token = guard.as_ref().ok_or(AuthExchangeError::MissingToken)?;

        if token.access_token.is_empty() {
            return Err(AuthExchangeError::Rejected("empty access token".into()));
        }

        let mut scopes: Vec<&str> = token.scopes.iter().map(String::as_str).collect();
        scopes.sort_unstable();

        info!("Exchanged authorization code for an access token");

        Ok(TokenResponse {
            access_token: token.access_token.clone(),
            token_type: "Bearer".to_string(),
            expires_in: token.expires_in.num_seconds(),
            refresh_token: token.refresh_token.clone(),
            scope: Some(scopes.join(" ")),
        })
    }
}

/// Pull `code` out of the callback redirect.
///
/// Accepts the full callback URL or just its query (`?code=...`). A missing
/// or empty code is `Ok(None)`: nothing to do.
pub fn parse_redirect_code(redirect: &str) -> Result<Option<String>> {
    let redirect = redirect.trim();

    let code = if redirect.contains("://") {
        let url = Url::parse(redirect)
            .map_err(|e| AppError::InvalidRedirect(format!("{}: {}", redirect, e)))?;
        url.query_pairs()
            .find(|(key, _)| key == "code")
            .map(|(_, value)| value.into_owned())
    } else {
        let query = redirect.trim_start_matches('?');
        url::form_urlencoded::parse(query.as_bytes())
            .find(|(key, _)| key == "code")
            .map(|(_, value)| value.into_owned())
    };

    let code = code.filter(|code| !code.is_empty());
    if code.is_none() {
        debug!("Redirect carries no authorization code");
    }
    Ok(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_from_callback_url() {
        let code = parse_redirect_code("http://127.0.0.1:5173/callback?code=AQB123&state=xyz").unwrap();
        assert_eq!(code.as_deref(), Some("AQB123"));
    }

    #[test]
    fn test_code_from_query_string() {
        assert_eq!(
            parse_redirect_code("?code=abc%2Fdef").unwrap().as_deref(),
            Some("abc/def")
        );
        assert_eq!(parse_redirect_code("code=plain").unwrap().as_deref(), Some("plain"));
    }

    #[test]
    fn test_missing_code_is_silent() {
        assert_eq!(parse_redirect_code("http://127.0.0.1:5173/callback").unwrap(), None);
        assert_eq!(parse_redirect_code("?error=access_denied").unwrap(), None);
        assert_eq!(parse_redirect_code("?code=").unwrap(), None);
        assert_eq!(parse_redirect_code("").unwrap(), None);
    }

    #[test]
    fn test_unparseable_url_is_an_error() {
        assert!(matches!(
            parse_redirect_code("http://[::1/callback?code=x"),
            Err(AppError::InvalidRedirect(_))
        ));
    }

    #[test]
    fn test_authorize_url_targets_spotify() {
        let client = SpotifyAuthClient::new(&Config::mock()).unwrap();
        let url = client.authorize_url().unwrap();
        assert!(url.starts_with("https://accounts.spotify.com/authorize"));
        assert!(url.contains("client_id=client-id"));
        assert!(url.contains("response_type=code"));
    }

    #[test]
    fn test_empty_credentials_refused() {
        let mut config = Config::mock();
        config.spotify_client_id.clear();
        assert!(matches!(SpotifyAuthClient::new(&config), Err(AppError::Config(_))));
    }
}
