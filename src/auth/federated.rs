//! Sign-in through an external identity provider.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::{IdentityProvider, ProviderUser, SessionManager};
use crate::api::{BackendClient, SignupCompleteRequest};
use crate::session::{AuthState, ProfileStatus, Session, SessionStore};
use crate::Result;

/// Session manager bridging an identity provider to a backend-enriched
/// session.
///
/// The provider is the authority on who is signed in. A background
/// listener ([`spawn_listener`](FederatedAuth::spawn_listener)) follows its
/// state changes, fetches a fresh token and the backend profile for each
/// new user, and publishes the result to the [`SessionStore`].
pub struct FederatedAuth<P> {
    provider: Arc<P>,
    backend: BackendClient,
    store: SessionStore,
}

impl<P> FederatedAuth<P>
where
    P: IdentityProvider + 'static,
{
    /// Create a manager with a fresh store in the loading state.
    pub fn new(provider: Arc<P>, backend: BackendClient) -> Self {
        Self::with_store(provider, backend, SessionStore::new())
    }

    /// Create a manager writing to an existing store.
    pub fn with_store(provider: Arc<P>, backend: BackendClient, store: SessionStore) -> Self {
        Self {
            provider,
            backend,
            store,
        }
    }

    pub fn provider(&self) -> &Arc<P> {
        &self.provider
    }

    /// Sign in through the provider and register the user with the backend.
    ///
    /// Once the backend has the user, the raw provider user is published
    /// with [`ProfileStatus::Pending`], unless the listener has already
    /// resolved that user. The listener resolves it once the profile fetch
    /// completes.
    pub async fn login_with_provider(&self) -> Result<Session> {
        let user = self.provider.sign_in().await.map_err(|e| {
            error!(error = %e, "provider sign-in failed");
            e
        })?;

        let payload = SignupCompleteRequest::from_user(&user);
        if let Err(e) = self.backend.signup_complete(&payload).await {
            error!(error = %e, uid = %user.uid, "failed to sync provider user with backend");
            return Err(e);
        }

        let session = Session::from_provider(&user, None);
        self.store.set_provisional(session.clone());
        info!(uid = %user.uid, "signed in with identity provider");
        Ok(session)
    }

    /// Apply one provider state change to the store.
    ///
    /// With a user present: fetch a token, then the backend profile. On
    /// success the session is the provider user merged with the profile;
    /// on any failure it falls back to the raw provider user. With no user,
    /// session and token are cleared.
    pub async fn handle_auth_change(&self, user: Option<ProviderUser>) -> AuthState {
        let Some(user) = user else {
            debug!("provider reports no user");
            self.store.clear();
            return self.store.snapshot();
        };

        let token = match self.provider.id_token(&user).await {
            Ok(token) => token,
            Err(e) => {
                warn!(error = %e, uid = %user.uid, "could not obtain identity token; using provider user");
                if self.is_current(&user) {
                    self.store.set_authenticated(
                        Session::from_provider(&user, None),
                        ProfileStatus::Fallback,
                    );
                }
                return self.store.snapshot();
            }
        };

        let profile = self.backend.fetch_profile(&token).await;

        // The provider may have moved on while the request was in flight.
        if !self.is_current(&user) {
            debug!(uid = %user.uid, "discarding profile for superseded user");
            return self.store.snapshot();
        }

        let mut session = Session::from_provider(&user, Some(token));
        match profile {
            Ok(profile) => {
                session.merge_profile(profile);
                self.store.set_authenticated(session, ProfileStatus::Merged);
                debug!(uid = %user.uid, "session merged with backend profile");
            }
            Err(e) => {
                warn!(error = %e, uid = %user.uid, "error fetching profile; using provider user");
                self.store.set_authenticated(session, ProfileStatus::Fallback);
            }
        }
        self.store.snapshot()
    }

    fn is_current(&self, user: &ProviderUser) -> bool {
        self.provider
            .current_user()
            .is_some_and(|current| current.uid == user.uid)
    }

    /// Follow provider state changes until `cancel` fires.
    ///
    /// The provider's current state is handled first, which takes the store
    /// out of [`AuthState::Loading`]. Changes are applied one at a time; a
    /// burst of changes collapses to the latest.
    pub fn spawn_listener(self: &Arc<Self>, cancel: CancellationToken) -> ListenerHandle {
        let this = Arc::clone(self);
        let mut rx = self.provider.subscribe();
        let token = cancel.clone();

        let task = tokio::spawn(async move {
            let initial = rx.borrow_and_update().clone();
            tokio::select! {
                biased;
                _ = token.cancelled() => return,
                _ = this.handle_auth_change(initial) => {}
            }

            loop {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => break,
                    changed = rx.changed() => {
                        if changed.is_err() {
                            debug!("identity provider closed its state channel");
                            break;
                        }
                        let user = rx.borrow_and_update().clone();
                        tokio::select! {
                            biased;
                            _ = token.cancelled() => break,
                            _ = this.handle_auth_change(user) => {}
                        }
                    }
                }
            }
            debug!("auth state listener stopped");
        });

        ListenerHandle { cancel, task }
    }
}

#[async_trait]
impl<P> SessionManager for FederatedAuth<P>
where
    P: IdentityProvider + 'static,
{
    fn store(&self) -> &SessionStore {
        &self.store
    }

    fn backend(&self) -> &BackendClient {
        &self.backend
    }

    async fn logout(&self) -> Result<()> {
        self.provider.sign_out().await?;
        self.store.clear();
        info!("signed out");
        Ok(())
    }
}

/// Handle to a running auth state listener.
#[derive(Debug)]
pub struct ListenerHandle {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl ListenerHandle {
    /// The token that stops the listener.
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Stop the listener and wait for it to exit.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        if let Err(e) = self.task.await {
            if e.is_panic() {
                error!("auth state listener panicked");
            }
        }
    }
}
