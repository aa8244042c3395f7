//! The client-held view of the signed-in user.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::auth::ProviderUser;

/// Keys that may carry a backend-side user identifier, in lookup order.
const ID_KEYS: [&str; 3] = ["id", "_id", "uid"];

/// The currently authenticated user.
///
/// `identity` is the identity provider's user id for provider sign-ins, and
/// the backend's user id (or email) for credential logins. Backend profile
/// fields with no dedicated slot are kept verbatim in `extras`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub identity: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    #[serde(flatten)]
    pub extras: Map<String, Value>,
    /// Never serialized, so printing a session cannot leak the credential.
    #[serde(skip)]
    pub bearer_token: Option<String>,
}

impl Session {
    /// Build a session straight from an identity provider user.
    pub fn from_provider(user: &ProviderUser, bearer_token: Option<String>) -> Self {
        Self {
            identity: user.uid.clone(),
            email: user.email.clone(),
            display_name: user.display_name.clone(),
            photo_url: user.photo_url.clone(),
            extras: Map::new(),
            bearer_token,
        }
    }

    /// Build a session from a backend profile alone.
    pub fn from_profile(profile: Map<String, Value>, bearer_token: Option<String>) -> Self {
        let mut session = Self {
            bearer_token,
            ..Self::default()
        };
        session.merge_profile(profile);

        if session.identity.is_empty() {
            session.identity = session
                .extras
                .iter()
                .find(|(key, _)| ID_KEYS.contains(&key.as_str()))
                .and_then(|(_, value)| scalar_to_string(value))
                .or_else(|| session.email.clone())
                .unwrap_or_default();
        }

        session
    }

    /// Overlay backend profile fields on this session.
    ///
    /// Backend values win over what is already present. The identity is left
    /// alone; backend ids end up in `extras`.
    pub fn merge_profile(&mut self, profile: Map<String, Value>) {
        for (key, value) in profile {
            match key.as_str() {
                "email" => self.email = as_string(&value).or(self.email.take()),
                "name" | "displayName" => {
                    self.display_name = as_string(&value).or(self.display_name.take())
                }
                "photoUrl" | "photoURL" => {
                    self.photo_url = as_string(&value).or(self.photo_url.take())
                }
                _ => {
                    self.extras.insert(key, value);
                }
            }
        }
    }

    /// Whether the session carries a usable identity.
    pub fn has_identity(&self) -> bool {
        !self.identity.is_empty()
    }

    /// Best human-readable label for this user.
    pub fn label(&self) -> &str {
        self.display_name
            .as_deref()
            .or(self.email.as_deref())
            .unwrap_or(&self.identity)
    }
}

fn as_string(value: &Value) -> Option<String> {
    value.as_str().map(str::to_owned)
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Result of a backend profile refresh.
///
/// A refresh never fails hard: callers learn whether the profile arrived or
/// whether they are proceeding with whatever identity they already had.
#[derive(Debug, Clone, PartialEq)]
pub enum ProfileOutcome {
    /// The profile was fetched and the session replaced.
    Loaded(Session),
    /// The profile could not be fetched; prior session state is untouched.
    Unavailable { reason: String },
}

impl ProfileOutcome {
    pub fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded(_))
    }

    pub fn session(&self) -> Option<&Session> {
        match self {
            Self::Loaded(session) => Some(session),
            Self::Unavailable { .. } => None,
        }
    }
}
