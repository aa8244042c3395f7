//! Authentication module.
//!
//! Two ways of signing in share one [`SessionStore`](crate::SessionStore):
//!
//! - [`FederatedAuth`]: an external [`IdentityProvider`] is the authority on
//!   who is signed in; the backend enriches the session with a profile.
//! - [`CredentialAuth`]: email and password are exchanged directly for a
//!   backend bearer token, persisted through a [`TokenStore`].
//!
//! Both implement [`SessionManager`], which supplies account deletion and
//! profile photo updates on top of either.

mod credentials;
mod federated;
mod manager;
mod provider;
mod token_store;

pub use credentials::CredentialAuth;
pub use federated::{FederatedAuth, ListenerHandle};
pub use manager::SessionManager;
pub use provider::{IdentityProvider, LocalAccount, LocalIdentityProvider, ProviderUser};
pub use token_store::{FileTokenStore, MemoryTokenStore, TokenStore};
