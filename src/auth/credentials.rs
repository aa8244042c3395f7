//! Email and password sign-in against the backend.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use super::{SessionManager, TokenStore};
use crate::api::{BackendClient, LoginRequest, LoginResponse};
use crate::session::{AuthState, ProfileOutcome, ProfileStatus, Session, SessionStore};
use crate::Result;

/// Session manager for direct credential login.
///
/// The bearer token is persisted through a [`TokenStore`] so a later run
/// starts in [`AuthState::TokenOnly`] and can resolve the user with
/// [`fetch_user_profile`](CredentialAuth::fetch_user_profile).
pub struct CredentialAuth {
    backend: BackendClient,
    store: SessionStore,
    tokens: Arc<dyn TokenStore>,
}

impl CredentialAuth {
    /// Create a manager, seeding the store from the persisted token.
    pub fn new(backend: BackendClient, tokens: Arc<dyn TokenStore>) -> Result<Self> {
        let initial = match tokens.load()? {
            Some(token) => {
                debug!("restored persisted token");
                AuthState::TokenOnly { token }
            }
            None => AuthState::Unauthenticated,
        };
        Ok(Self::with_store(backend, tokens, SessionStore::with_state(initial)))
    }

    /// Create a manager writing to an existing store.
    pub fn with_store(
        backend: BackendClient,
        tokens: Arc<dyn TokenStore>,
        store: SessionStore,
    ) -> Self {
        Self {
            backend,
            store,
            tokens,
        }
    }

    /// Log in with email and password.
    ///
    /// A rejected login leaves both the in-memory and persisted token
    /// untouched. On success the token is persisted and a profile fetch
    /// follows; a failed fetch does not fail the login.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse> {
        let response = self
            .backend
            .login(&LoginRequest { email, password })
            .await?;

        self.tokens.save(&response.token)?;
        self.store.set_token(response.token.clone());
        info!(email, "logged in");

        self.fetch_user_profile(Some(&response.token)).await;
        Ok(response)
    }

    /// Fetch the profile for `token`, or for the held token when `None`.
    ///
    /// On success the session is replaced by the profile. On failure a
    /// warning is logged and the prior session state is left as it was.
    pub async fn fetch_user_profile(&self, token: Option<&str>) -> ProfileOutcome {
        let Some(token) = token.map(str::to_owned).or_else(|| self.store.bearer_token()) else {
            return ProfileOutcome::Unavailable {
                reason: "no auth token".into(),
            };
        };

        match self.backend.fetch_profile(&token).await {
            Ok(profile) => {
                let session = Session::from_profile(profile, Some(token));
                self.store
                    .set_authenticated(session.clone(), ProfileStatus::Merged);
                debug!(identity = %session.identity, "user profile loaded");
                ProfileOutcome::Loaded(session)
            }
            Err(e) => {
                warn!(error = %e, "failed to fetch user profile");
                ProfileOutcome::Unavailable {
                    reason: e.to_string(),
                }
            }
        }
    }
}

#[async_trait]
impl SessionManager for CredentialAuth {
    fn store(&self) -> &SessionStore {
        &self.store
    }

    fn backend(&self) -> &BackendClient {
        &self.backend
    }

    async fn logout(&self) -> Result<()> {
        self.store.clear();
        self.tokens.clear()?;
        info!("logged out");
        Ok(())
    }
}
