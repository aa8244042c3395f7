//! Authentication state machine.

use super::Session;

/// How much of the backend profile a session carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileStatus {
    /// Backend profile fetched and merged.
    Merged,
    /// Profile fetch failed; session carries only provider data.
    Fallback,
    /// Published before the profile fetch has had a chance to run.
    Pending,
}

impl ProfileStatus {
    /// Whether the profile fetch for this session has completed, either way.
    pub fn is_resolved(self) -> bool {
        matches!(self, ProfileStatus::Merged | ProfileStatus::Fallback)
    }
}

/// Authentication state of the client.
///
/// ```text
/// Loading ──► Authenticated { Merged | Fallback | Pending }
///    │              ▲   │
///    ▼              │   ▼
/// TokenOnly ────────┘  Unauthenticated
/// ```
///
/// Every state except `Loading` can be re-entered from any other on each
/// identity change. `Loading` is only ever the initial state.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum AuthState {
    /// No identity change has been observed yet.
    #[default]
    Loading,
    /// Nobody is signed in.
    Unauthenticated,
    /// A bearer token is known but no identity has been resolved for it.
    TokenOnly { token: String },
    /// A user is signed in.
    Authenticated {
        session: Session,
        profile: ProfileStatus,
    },
}

impl AuthState {
    /// Check if transition to target state is valid.
    pub fn can_transition_to(&self, target: &AuthState) -> bool {
        !matches!(target, AuthState::Loading) || matches!(self, AuthState::Loading)
    }

    /// Whether dependent views are still gated.
    pub fn is_loading(&self) -> bool {
        matches!(self, AuthState::Loading)
    }

    /// Whether a user identity is present.
    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthState::Authenticated { .. })
    }

    /// The signed-in session, if any.
    pub fn session(&self) -> Option<&Session> {
        match self {
            AuthState::Authenticated { session, .. } => Some(session),
            _ => None,
        }
    }

    /// Profile status of the signed-in session, if any.
    pub fn profile_status(&self) -> Option<ProfileStatus> {
        match self {
            AuthState::Authenticated { profile, .. } => Some(*profile),
            _ => None,
        }
    }

    /// The bearer token to attach to privileged calls, if any.
    pub fn bearer_token(&self) -> Option<&str> {
        match self {
            AuthState::TokenOnly { token } => Some(token),
            AuthState::Authenticated { session, .. } => session.bearer_token.as_deref(),
            AuthState::Loading | AuthState::Unauthenticated => None,
        }
    }

    /// Short label for logging.
    pub fn label(&self) -> &'static str {
        match self {
            AuthState::Loading => "loading",
            AuthState::Unauthenticated => "unauthenticated",
            AuthState::TokenOnly { .. } => "token-only",
            AuthState::Authenticated {
                profile: ProfileStatus::Merged,
                ..
            } => "authenticated-with-profile",
            AuthState::Authenticated {
                profile: ProfileStatus::Fallback,
                ..
            } => "authenticated-fallback",
            AuthState::Authenticated {
                profile: ProfileStatus::Pending,
                ..
            } => "authenticated-pending",
        }
    }
}
