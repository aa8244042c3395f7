//! # dermx-client
//!
//! Session and diagnosis client for the DermX skin-condition assistant.
//!
//! The crate keeps one source of truth for who is signed in
//! ([`SessionStore`]) and offers two ways of filling it: sign-in through an
//! external identity provider ([`FederatedAuth`]) and direct email/password
//! login ([`CredentialAuth`]). Both expose the same account operations
//! through [`SessionManager`]. Images are validated client-side and uploaded
//! for analysis through [`UploadState`].
//!
//! ## Features
//!
//! - **Unified sessions**: one observable store, whatever the sign-in path
//! - **Explicit listener lifetime**: the provider listener is a task bound
//!   to a cancellation token
//! - **Explicit degradation**: profile refreshes report
//!   [`ProfileOutcome::Unavailable`] instead of failing silently
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use dermx_client::{BackendClient, CredentialAuth, MemoryTokenStore, SessionManager};
//!
//! #[tokio::main]
//! async fn main() -> dermx_client::Result<()> {
//!     dermx_client::logging::try_init().ok();
//!
//!     let backend = BackendClient::new(dermx_client::api::DEFAULT_BASE_URL)?;
//!     let auth = CredentialAuth::new(backend, Arc::new(MemoryTokenStore::new()))?;
//!
//!     auth.login("ada@example.com", "correct horse").await?;
//!     if let Some(session) = auth.store().current() {
//!         println!("signed in as {}", session.label());
//!     }
//!
//!     auth.logout().await
//! }
//! ```

pub mod api;
pub mod auth;
pub mod cli;
pub mod config;
pub mod diagnosis;
pub mod error;
pub mod logging;
pub mod session;

// Re-export commonly used types
pub use api::{BackendClient, DiagnosisResult};
pub use auth::{
    CredentialAuth, FederatedAuth, FileTokenStore, IdentityProvider, ListenerHandle,
    LocalAccount, LocalIdentityProvider, MemoryTokenStore, ProviderUser, SessionManager,
    TokenStore,
};
pub use diagnosis::{ImageFile, UploadState};
pub use error::{DermxError, Result};
pub use session::{AuthState, ProfileOutcome, ProfileStatus, Session, SessionStore};
