//! Session management module.
//!
//! This module holds the client-side representation of the signed-in user,
//! the authentication state machine, and the shared store that every
//! session manager reads and writes.

mod profile;
mod state;
mod store;

pub use profile::{ProfileOutcome, Session};
pub use state::{AuthState, ProfileStatus};
pub use store::SessionStore;
