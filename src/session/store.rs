//! Shared, observable session state.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, trace};

use super::{AuthState, ProfileStatus, Session};
use crate::error::DermxError;
use crate::Result;

/// Single source of truth for the signed-in user and bearer token.
///
/// Cloning the store yields another handle onto the same state. Writers are
/// last-write-wins; readers either take a snapshot or [`subscribe`] to be
/// woken on every change.
///
/// [`subscribe`]: SessionStore::subscribe
#[derive(Debug, Clone)]
pub struct SessionStore {
    tx: Arc<watch::Sender<AuthState>>,
}

impl SessionStore {
    /// Create a store in the [`AuthState::Loading`] state.
    pub fn new() -> Self {
        Self::with_state(AuthState::Loading)
    }

    /// Create a store with a known initial state.
    pub fn with_state(state: AuthState) -> Self {
        let (tx, _) = watch::channel(state);
        Self { tx: Arc::new(tx) }
    }

    /// Clone of the current state.
    pub fn snapshot(&self) -> AuthState {
        self.tx.borrow().clone()
    }

    /// Clone of the signed-in session, if any.
    pub fn current(&self) -> Option<Session> {
        self.tx.borrow().session().cloned()
    }

    /// Receiver that observes every subsequent state change.
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.tx.subscribe()
    }

    /// Whether the first identity change is still outstanding.
    pub fn is_loading(&self) -> bool {
        self.tx.borrow().is_loading()
    }

    /// The current bearer token, if any.
    pub fn bearer_token(&self) -> Option<String> {
        self.tx.borrow().bearer_token().map(str::to_owned)
    }

    /// The current bearer token, or [`DermxError::Unauthenticated`].
    ///
    /// Every privileged backend call goes through here before any request
    /// is built.
    pub fn require_token(&self) -> Result<String> {
        self.bearer_token().ok_or(DermxError::Unauthenticated)
    }

    /// Wait until the store has left [`AuthState::Loading`].
    pub async fn wait_ready(&self) -> AuthState {
        let mut rx = self.tx.subscribe();
        let ready = match rx.wait_for(|state| !state.is_loading()).await {
            Ok(state) => state.clone(),
            Err(_) => self.snapshot(),
        };
        ready
    }

    /// Replace the state outright.
    ///
    /// Requests to go back to [`AuthState::Loading`] are ignored.
    pub fn set(&self, state: AuthState) {
        self.tx.send_if_modified(|current| {
            if !current.can_transition_to(&state) {
                debug!(from = current.label(), "ignoring transition back to loading");
                return false;
            }
            trace!(from = current.label(), to = state.label(), "auth state change");
            *current = state;
            true
        });
    }

    /// Record a signed-in session.
    pub fn set_authenticated(&self, session: Session, profile: ProfileStatus) {
        self.set(AuthState::Authenticated { session, profile });
    }

    /// Publish a session before its profile has been fetched.
    ///
    /// A session for the same identity that has already been resolved
    /// (merged or fallen back) is left in place; the listener has run for
    /// that user and would never move a `Pending` state on. A token held by
    /// a pending session for the same identity is carried over.
    pub fn set_provisional(&self, mut session: Session) -> bool {
        self.tx.send_if_modified(|current| {
            if let AuthState::Authenticated {
                session: existing,
                profile,
            } = current
            {
                if existing.identity == session.identity {
                    if profile.is_resolved() {
                        return false;
                    }
                    if session.bearer_token.is_none() {
                        session.bearer_token = existing.bearer_token.clone();
                    }
                }
            }
            *current = AuthState::Authenticated {
                session,
                profile: ProfileStatus::Pending,
            };
            true
        })
    }

    /// Record a fresh bearer token.
    ///
    /// A signed-in session keeps its identity and picks up the new token;
    /// otherwise the store moves to [`AuthState::TokenOnly`].
    pub fn set_token(&self, token: String) {
        self.tx.send_modify(|current| match current {
            AuthState::Authenticated { session, .. } => session.bearer_token = Some(token),
            _ => *current = AuthState::TokenOnly { token },
        });
    }

    /// Apply a change to the signed-in session.
    ///
    /// Returns `false` without touching anything if nobody is signed in.
    pub fn update_session<F>(&self, f: F) -> bool
    where
        F: FnOnce(&mut Session),
    {
        self.tx.send_if_modified(|current| match current {
            AuthState::Authenticated { session, .. } => {
                f(session);
                true
            }
            _ => false,
        })
    }

    /// Drop the session and token.
    pub fn clear(&self) {
        self.set(AuthState::Unauthenticated);
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}
