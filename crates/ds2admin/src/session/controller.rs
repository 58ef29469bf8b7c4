//! Session state machine.

use std::sync::{Arc, Mutex, MutexGuard};

use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument, warn};

use crate::Result;
use crate::auth::{AdminKey, BearerToken, Credential, Durability};
use crate::config::ClientConfig;
use crate::error::{AuthError, Error};
use crate::gateway::{AdminConfig, AuthGateway, CONFIG, RequestOptions, VerifyOutcome};
use crate::notify::NotificationQueue;
use crate::store::TokenStore;

use super::SessionPhase;

/// Owner of the session phase.
///
/// Phases move `Checking -> {Authenticated, Unauthenticated}` once, at
/// [`start`](Self::start), and then between `Authenticated` and
/// `Unauthenticated` through [`login`](Self::login), [`logout`](Self::logout)
/// and rejected [`request`](Self::request)s.
///
/// Every transition bumps an episode counter. Work that awaits the network
/// captures the episode first and applies its result only if the episode is
/// still current, so a verify that loses a race with a logout or a login is
/// ignored. A login only yields to an explicit logout.
///
/// # Thread Safety
///
/// Controllers are cheap to clone (they use internal `Arc`); clones share
/// the same session. The internal lock is never held across an await.
#[derive(Clone)]
pub struct SessionController {
    inner: Arc<ControllerInner>,
}

struct ControllerInner {
    gateway: AuthGateway,
    store: TokenStore,
    notifications: NotificationQueue,
    state: Mutex<ControllerState>,
}

/// Result of an authenticated call, and whether its rejection is what ended
/// the session.
struct Sent {
    response: Result<reqwest::Response>,
    ended_session: bool,
}

struct ControllerState {
    phase: SessionPhase,
    episode: u64,
    logouts: u64,
    startup_claimed: bool,
    config: Option<AdminConfig>,
    /// Episode whose config refresh is in flight.
    refreshing: Option<u64>,
}

impl SessionController {
    pub fn new(gateway: AuthGateway, store: TokenStore, notifications: NotificationQueue) -> Self {
        Self {
            inner: Arc::new(ControllerInner {
                gateway,
                store,
                notifications,
                state: Mutex::new(ControllerState {
                    phase: SessionPhase::Checking,
                    episode: 0,
                    logouts: 0,
                    startup_claimed: false,
                    config: None,
                    refreshing: None,
                }),
            }),
        }
    }

    /// Build a controller, its gateway and its notification queue from
    /// `config`.
    pub fn from_config(config: &ClientConfig, store: TokenStore) -> Result<Self> {
        Ok(Self::new(
            AuthGateway::new(config)?,
            store,
            NotificationQueue::new(config.notification_ttl),
        ))
    }

    fn state(&self) -> MutexGuard<'_, ControllerState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Current phase.
    pub fn phase(&self) -> SessionPhase {
        self.state().phase.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state().phase.is_authenticated()
    }

    /// Admin config fetched for the current authentication, if any.
    pub fn config(&self) -> Option<AdminConfig> {
        self.state().config.clone()
    }

    /// Queue views post their status messages to.
    pub fn notifications(&self) -> &NotificationQueue {
        &self.inner.notifications
    }

    pub fn gateway(&self) -> &AuthGateway {
        &self.inner.gateway
    }

    /// The credential as currently persisted.
    pub async fn stored_credential(&self) -> Result<Option<Credential>> {
        self.inner.store.read().await
    }

    /// Run the startup check.
    ///
    /// Reads the stored credential; if it is present and not locally expired,
    /// verifies it. A verified token, or one the backend could not be asked
    /// about, is kept. A missing, expired or rejected credential clears
    /// storage; storage that cannot be read is left untouched. Only the first
    /// call does any work; later calls return the current phase.
    #[instrument(skip(self))]
    pub async fn start(&self) -> SessionPhase {
        let episode = {
            let mut state = self.state();
            if state.startup_claimed || !state.phase.is_checking() {
                return state.phase.clone();
            }
            state.startup_claimed = true;
            state.episode
        };

        let stored = match self.inner.store.read().await {
            Ok(stored) => stored,
            Err(e) => {
                // Leave the file alone: it may hold a good token we failed to read.
                warn!(error = %e, "Stored credential unreadable");
                self.transition(episode, SessionPhase::Unauthenticated);
                return self.phase();
            }
        };

        let Some(credential) = stored else {
            info!("No stored credential");
            return self.finish_startup(episode, None).await;
        };

        if credential.is_expired() {
            info!("Stored credential expired");
            return self.finish_startup(episode, None).await;
        }

        match self.inner.gateway.verify(&credential.token).await {
            VerifyOutcome::Valid => self.finish_startup(episode, Some(credential.token)).await,
            VerifyOutcome::NetworkFailure(e) => {
                warn!(error = %e, "Backend unreachable, keeping stored token");
                self.finish_startup(episode, Some(credential.token)).await
            }
            VerifyOutcome::Rejected { status } => {
                info!(status, "Stored token rejected");
                self.finish_startup(episode, None).await
            }
        }
    }

    async fn finish_startup(&self, episode: u64, token: Option<BearerToken>) -> SessionPhase {
        match token {
            Some(token) => {
                if self.transition(episode, SessionPhase::Authenticated(token)) {
                    self.refresh_after_sign_in().await;
                }
            }
            None => {
                if self.transition(episode, SessionPhase::Unauthenticated) {
                    self.clear_store().await;
                }
            }
        }
        self.phase()
    }

    /// Exchange `key` for a token, persist it in the `durability` tier and
    /// enter `Authenticated`.
    ///
    /// Failures are posted to the notification queue and returned; the
    /// session is left as it was.
    #[instrument(skip(self, key))]
    pub async fn login(&self, key: &AdminKey, durability: Durability) -> Result<SessionPhase> {
        let logouts = self.state().logouts;

        let grant = match self.inner.gateway.login(key).await {
            Ok(grant) => grant,
            Err(e) => {
                warn!(error = %e, "Login failed");
                self.inner.notifications.error(e.user_message());
                return Err(e);
            }
        };

        if self.state().logouts != logouts {
            debug!("Logged out during login, discarding token");
            return Ok(self.phase());
        }

        let credential = Credential::issued(grant.token.clone(), grant.expires_in, durability);
        let persist_error = self.inner.store.write(&credential).await.err();
        if let Some(ref e) = persist_error {
            warn!(error = %e, "Failed to persist credential");
        }

        let entered = {
            let mut state = self.state();
            let current = state.logouts == logouts;
            if current {
                Self::enter(&mut state, SessionPhase::Authenticated(grant.token));
            }
            current
        };
        if !entered {
            // The logout may have cleared storage before our write landed.
            debug!("Logged out during login, discarding token");
            self.clear_store().await;
            return Ok(self.phase());
        }

        if let Some(message) = grant.message {
            self.inner.notifications.warning(message);
        }
        // Posted last so the advisory message cannot hide it.
        if let Some(e) = persist_error {
            self.inner
                .notifications
                .warning(format!("logged in, but the session could not be saved: {}", e));
        }

        self.refresh_after_sign_in().await;
        Ok(self.phase())
    }

    /// Drop the token and empty both storage tiers.
    ///
    /// The in-memory session always ends; a storage failure is returned
    /// after that.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<()> {
        {
            let mut state = self.state();
            state.logouts += 1;
            Self::enter(&mut state, SessionPhase::Unauthenticated);
        }
        self.inner.store.clear().await
    }

    /// Authenticated request on behalf of a view.
    ///
    /// # Errors
    ///
    /// Fails with [`AuthError::NotAuthenticated`] when no token is held, and
    /// with [`AuthError::SessionExpired`] when the backend rejects the token;
    /// in the latter case the session has already been ended. Callers must
    /// abandon their operation on either.
    #[instrument(skip(self, options))]
    pub async fn request(&self, path: &str, options: RequestOptions) -> Result<reqwest::Response> {
        let (token, episode) = {
            let state = self.state();
            match state.phase.token() {
                Some(token) => (token.clone(), state.episode),
                None => return Err(AuthError::NotAuthenticated.into()),
            }
        };

        self.send(path, options, &token, episode).await.response
    }

    async fn send(
        &self,
        path: &str,
        options: RequestOptions,
        token: &BearerToken,
        episode: u64,
    ) -> Sent {
        match self
            .inner
            .gateway
            .authenticated_request(path, options, token)
            .await
        {
            Err(Error::Auth(AuthError::Rejected)) => {
                let ended_session = self.transition(episode, SessionPhase::Unauthenticated);
                if ended_session {
                    info!("Session expired");
                    self.clear_store().await;
                }
                Sent {
                    response: Err(AuthError::SessionExpired.into()),
                    ended_session,
                }
            }
            response => Sent {
                response,
                ended_session: false,
            },
        }
    }

    /// [`request`](Self::request) and decode a JSON success body.
    pub async fn request_json<T: DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<T> {
        let response = self.request(path, options).await?;
        AuthGateway::json_body(response).await
    }

    /// Fetch `/admin/config` and cache it for the current authentication.
    ///
    /// At most one refresh runs per authentication; a call made while one is
    /// in flight returns the cached config without another request. A
    /// non-success answer leaves the cached config as it was. Errors are
    /// posted to the notification queue.
    #[instrument(skip(self))]
    pub async fn refresh_config(&self) -> Result<Option<AdminConfig>> {
        let (token, episode) = {
            let mut state = self.state();
            let Some(token) = state.phase.token().cloned() else {
                return Err(AuthError::NotAuthenticated.into());
            };
            if state.refreshing == Some(state.episode) {
                debug!("Config refresh already in flight");
                return Ok(state.config.clone());
            }
            state.refreshing = Some(state.episode);
            (token, state.episode)
        };

        let sent = self
            .send(CONFIG, RequestOptions::get(), &token, episode)
            .await;
        let ended_session = sent.ended_session;
        let fetched = Self::config_from(sent.response).await;

        let (outcome, current) = {
            let mut state = self.state();
            if state.refreshing == Some(episode) {
                state.refreshing = None;
            }
            // A rejection that ended this very session is still ours to report.
            let current = state.episode == episode || ended_session;
            let outcome = match fetched {
                Ok(Some(config)) if current => {
                    state.config = Some(config);
                    Ok(state.config.clone())
                }
                Ok(_) => Ok(state.config.clone()),
                Err(e) => Err(e),
            };
            (outcome, current)
        };

        match outcome {
            Err(ref e) if current => self.inner.notifications.error(e.user_message()),
            Err(ref e) => debug!(error = %e, "Discarding error from a superseded refresh"),
            Ok(_) => {}
        }
        outcome
    }

    async fn config_from(response: Result<reqwest::Response>) -> Result<Option<AdminConfig>> {
        let response = response?;
        let status = response.status();
        if !status.is_success() {
            warn!(status = %status, "Config fetch unsuccessful, keeping previous config");
            return Ok(None);
        }
        Ok(Some(response.json::<AdminConfig>().await?))
    }

    async fn refresh_after_sign_in(&self) {
        if let Err(e) = self.refresh_config().await {
            debug!(error = %e, "Config refresh after sign-in failed");
        }
    }

    async fn clear_store(&self) {
        if let Err(e) = self.inner.store.clear().await {
            warn!(error = %e, "Failed to clear stored credential");
        }
    }

    /// Move to `next` if `episode` is still current.
    fn transition(&self, episode: u64, next: SessionPhase) -> bool {
        let mut state = self.state();
        if state.episode != episode {
            debug!(stale = episode, current = state.episode, "Discarding stale result");
            return false;
        }
        Self::enter(&mut state, next);
        true
    }

    fn enter(state: &mut ControllerState, next: SessionPhase) {
        if state.phase != next {
            info!(from = %state.phase, to = %next, "Session transition");
        }
        state.phase = next;
        state.episode += 1;
        state.config = None;
        state.refreshing = None;
    }
}

// Custom Debug impl that hides sensitive data
impl std::fmt::Debug for SessionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state();
        f.debug_struct("SessionController")
            .field("server", self.inner.gateway.base_url())
            .field("phase", &state.phase.label())
            .field("episode", &state.episode)
            .finish()
    }
}
