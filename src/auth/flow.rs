use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::auth::client::{parse_redirect_code, CodeExchanger};
use crate::spotify::models::Token;
use crate::store::{Action, Store};
use crate::task::ScheduledTask;

pub const HOME_ROUTE: &str = "/home";

/// Routing is owned by the host; the flow only asks to go somewhere.
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: &str);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    AwaitingRedirect,
    ExchangingCode,
    TokenAcquired,
    Failed(String),
}

/// Callback handling: one code, one exchange, one token write.
#[derive(Clone)]
pub struct AuthFlow {
    store: Store,
    exchanger: Arc<dyn CodeExchanger>,
    navigator: Arc<dyn Navigator>,
    settle_delay: Duration,
    state: Arc<Mutex<AuthState>>,
}

impl AuthFlow {
    pub fn new(
        store: Store,
        exchanger: Arc<dyn CodeExchanger>,
        navigator: Arc<dyn Navigator>,
        settle_delay: Duration,
    ) -> Self {
        Self {
            store,
            exchanger,
            navigator,
            settle_delay,
            state: Arc::new(Mutex::new(AuthState::AwaitingRedirect)),
        }
    }

    pub fn state(&self) -> AuthState {
        lock(&self.state).clone()
    }

    /// Handle the callback view mounting with `redirect`.
    ///
    /// Returns the scheduled exchange, which the caller must hold for as long
    /// as the callback view is mounted. Dropping or cancelling it, even before
    /// it first runs, puts the flow back to `AwaitingRedirect`. `None` when
    /// there is no code or the flow has already left `AwaitingRedirect`.
    #[must_use = "dropping the returned task cancels the code exchange"]
    pub fn mount(&self, redirect: &str) -> Option<ScheduledTask> {
        let code = match parse_redirect_code(redirect) {
            Ok(Some(code)) => code,
            Ok(None) => return None,
            Err(e) => {
                warn!("Ignoring callback: {}", e);
                return None;
            }
        };

        {
            let mut state = lock(&self.state);
            if *state != AuthState::AwaitingRedirect {
                debug!("Callback mounted while {:?}; ignoring", *state);
                return None;
            }
            *state = AuthState::ExchangingCode;
        }

        info!(
            "Authorization code received, exchanging after {}ms",
            self.settle_delay.as_millis()
        );

        let rearm = RearmOnDrop {
            state: self.state.clone(),
            armed: true,
        };
        let flow = self.clone();
        Some(ScheduledTask::spawn("auth-code-exchange", flow.run(code, rearm)))
    }

    async fn run(self, code: String, mut rearm: RearmOnDrop) {
        tokio::time::sleep(self.settle_delay).await;
        let outcome = self.exchanger.exchange_code(&code).await;
        rearm.armed = false;

        match outcome {
            Ok(response) => {
                self.store.dispatch(Action::SetAccessToken(Token::from(response)));
                *lock(&self.state) = AuthState::TokenAcquired;
                info!("Access token stored, navigating to {}", HOME_ROUTE);
                self.navigator.navigate(HOME_ROUTE);
            }
            Err(e) => {
                error!("Error getting access token: {}", e);
                *lock(&self.state) = AuthState::Failed(e.to_string());
            }
        }
    }
}

/// Puts an interrupted exchange back to `AwaitingRedirect` so a remount can
/// start over.
struct RearmOnDrop {
    state: Arc<Mutex<AuthState>>,
    armed: bool,
}

impl Drop for RearmOnDrop {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut state = lock(&self.state);
        if *state == AuthState::ExchangingCode {
            debug!("Code exchange cancelled before completion");
            *state = AuthState::AwaitingRedirect;
        }
    }
}

fn lock(state: &Mutex<AuthState>) -> MutexGuard<'_, AuthState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}
