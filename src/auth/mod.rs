pub mod client;
pub mod flow;

pub use client::{parse_redirect_code, CodeExchanger, SpotifyAuthClient};
pub use flow::{AuthFlow, AuthState, Navigator, HOME_ROUTE};
