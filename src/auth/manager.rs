//! Capabilities shared by every session manager.

use async_trait::async_trait;
use tracing::{error, info};

use crate::api::BackendClient;
use crate::session::SessionStore;
use crate::Result;

/// A way of signing a user in, backed by the shared [`SessionStore`].
///
/// Implementors supply the store, the backend and their own `logout`; the
/// account operations come for free and behave identically no matter how
/// the user signed in.
#[async_trait]
pub trait SessionManager: Send + Sync {
    /// The store this manager reads and writes.
    fn store(&self) -> &SessionStore;

    /// Backend used for privileged calls.
    fn backend(&self) -> &BackendClient;

    /// End the session. Makes no backend call.
    async fn logout(&self) -> Result<()>;

    /// Delete the signed-in user's account, then log out.
    ///
    /// Fails with [`DermxError::Unauthenticated`](crate::DermxError::Unauthenticated)
    /// before any request is issued when no token is held.
    async fn delete_account(&self) -> Result<()> {
        let token = self.store().require_token()?;

        if let Err(e) = self.backend().delete_account(&token).await {
            error!(error = %e, "failed to delete account");
            return Err(e);
        }
        info!("account deleted");

        self.logout().await
    }

    /// Set the profile photo and merge the stored URL into the session.
    ///
    /// Only the photo field of the session changes.
    async fn upload_profile_photo(&self, photo_url: &str) -> Result<String> {
        let token = self.store().require_token()?;

        let stored = match self.backend().upload_profile_photo(&token, photo_url).await {
            Ok(stored) => stored,
            Err(e) => {
                error!(error = %e, "failed to update profile photo");
                return Err(e);
            }
        };

        let url = stored.clone();
        self.store().update_session(move |session| session.photo_url = Some(url));
        info!(photo_url = %stored, "profile photo updated");
        Ok(stored)
    }
}
