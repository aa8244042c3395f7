//! Identity provider abstraction.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::error::DermxError;
use crate::Result;

/// A user as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderUser {
    /// Provider-issued stable user id.
    pub uid: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
}

impl ProviderUser {
    pub fn new(uid: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            email: None,
            display_name: None,
            photo_url: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }
}

/// External service that verifies credentials and issues identity tokens.
///
/// The provider owns its own persistent sign-in state; clients observe it
/// through [`subscribe`](IdentityProvider::subscribe).
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Run the provider's interactive sign-in and return the signed-in user.
    async fn sign_in(&self) -> Result<ProviderUser>;

    /// Sign the current user out of the provider.
    async fn sign_out(&self) -> Result<()>;

    /// Fetch a fresh identity token for `user`.
    async fn id_token(&self, user: &ProviderUser) -> Result<String>;

    /// The provider's current user.
    fn current_user(&self) -> Option<ProviderUser>;

    /// Observe sign-in state changes. The current value counts as the first.
    fn subscribe(&self) -> watch::Receiver<Option<ProviderUser>>;
}

/// A provider account: the user and the identity token it yields.
#[derive(Debug, Clone)]
pub struct LocalAccount {
    pub user: ProviderUser,
    pub id_token: String,
}

impl LocalAccount {
    pub fn new(user: ProviderUser, id_token: impl Into<String>) -> Self {
        Self {
            user,
            id_token: id_token.into(),
        }
    }
}

/// In-process identity provider.
///
/// Holds a table of registered accounts and a sign-in target. `set_user`
/// changes the signed-in user from outside, the way a real provider reports
/// a session restored from its own storage or revoked remotely.
#[derive(Debug)]
pub struct LocalIdentityProvider {
    current: watch::Sender<Option<ProviderUser>>,
    accounts: RwLock<HashMap<String, LocalAccount>>,
    sign_in_target: RwLock<Option<String>>,
}

impl LocalIdentityProvider {
    /// Create a provider with no accounts and nobody signed in.
    pub fn new() -> Self {
        let (current, _) = watch::channel(None);
        Self {
            current,
            accounts: RwLock::new(HashMap::new()),
            sign_in_target: RwLock::new(None),
        }
    }

    /// Register an account and make it the one `sign_in` returns.
    pub fn with_account(self, account: LocalAccount) -> Self {
        let uid = account.user.uid.clone();
        self.register(account);
        self.set_sign_in_target(Some(&uid));
        self
    }

    /// Register an account so it can sign in and receive tokens.
    pub fn register(&self, account: LocalAccount) {
        if let Ok(mut accounts) = self.accounts.write() {
            accounts.insert(account.user.uid.clone(), account);
        }
    }

    /// Choose which registered account `sign_in` returns; `None` makes
    /// sign-in fail as if the user dismissed the popup.
    pub fn set_sign_in_target(&self, uid: Option<&str>) {
        if let Ok(mut target) = self.sign_in_target.write() {
            *target = uid.map(str::to_owned);
        }
    }

    /// Change the signed-in user from outside the client.
    pub fn set_user(&self, user: Option<ProviderUser>) {
        self.current.send_replace(user);
    }

    /// Forget a registered account. Its tokens stop being issued.
    pub fn revoke(&self, uid: &str) {
        if let Ok(mut accounts) = self.accounts.write() {
            accounts.remove(uid);
        }
    }

    fn account(&self, uid: &str) -> Result<Option<LocalAccount>> {
        let accounts = self
            .accounts
            .read()
            .map_err(|_| DermxError::Provider("account table poisoned".into()))?;
        Ok(accounts.get(uid).cloned())
    }
}

impl Default for LocalIdentityProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IdentityProvider for LocalIdentityProvider {
    async fn sign_in(&self) -> Result<ProviderUser> {
        let target = self
            .sign_in_target
            .read()
            .map_err(|_| DermxError::Provider("sign-in target poisoned".into()))?
            .clone();
        let uid = target.ok_or_else(|| DermxError::Provider("sign-in cancelled".into()))?;
        let account = self
            .account(&uid)?
            .ok_or_else(|| DermxError::Provider(format!("unknown account {}", uid)))?;

        self.current.send_replace(Some(account.user.clone()));
        Ok(account.user)
    }

    async fn sign_out(&self) -> Result<()> {
        self.current.send_replace(None);
        Ok(())
    }

    async fn id_token(&self, user: &ProviderUser) -> Result<String> {
        self.account(&user.uid)?
            .map(|account| account.id_token)
            .ok_or_else(|| DermxError::Provider(format!("no token for user {}", user.uid)))
    }

    fn current_user(&self) -> Option<ProviderUser> {
        self.current.borrow().clone()
    }

    fn subscribe(&self) -> watch::Receiver<Option<ProviderUser>> {
        self.current.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ada() -> LocalAccount {
        LocalAccount::new(
            ProviderUser::new("g-ada")
                .with_email("ada@example.com")
                .with_display_name("Ada"),
            "id-token-ada",
        )
    }

    #[tokio::test]
    async fn test_sign_in_publishes_user() {
        let provider = LocalIdentityProvider::new().with_account(ada());
        let mut rx = provider.subscribe();
        assert!(rx.borrow_and_update().is_none());

        let user = provider.sign_in().await.unwrap();
        assert_eq!(user.uid, "g-ada");

        rx.changed().await.unwrap();
        assert_eq!(rx.borrow().as_ref().map(|u| u.uid.as_str()), Some("g-ada"));
        assert_eq!(provider.current_user(), Some(user));
    }

    #[tokio::test]
    async fn test_sign_in_without_target_fails() {
        let provider = LocalIdentityProvider::new();
        provider.register(ada());

        let err = provider.sign_in().await.unwrap_err();
        assert!(matches!(err, DermxError::Provider(_)));
        assert!(provider.current_user().is_none());
    }

    #[tokio::test]
    async fn test_sign_out_clears_user() {
        let provider = LocalIdentityProvider::new().with_account(ada());
        provider.sign_in().await.unwrap();
        provider.sign_out().await.unwrap();
        assert!(provider.current_user().is_none());
    }

    #[tokio::test]
    async fn test_id_token_and_revoke() {
        let provider = LocalIdentityProvider::new().with_account(ada());
        let user = provider.sign_in().await.unwrap();
        assert_eq!(provider.id_token(&user).await.unwrap(), "id-token-ada");

        provider.revoke("g-ada");
        assert!(provider.id_token(&user).await.is_err());
    }

    #[test]
    fn test_set_user_from_outside() {
        let provider = LocalIdentityProvider::new();
        provider.set_user(Some(ProviderUser::new("g-x")));
        assert_eq!(provider.current_user().unwrap().uid, "g-x");
        provider.set_user(None);
        assert!(provider.current_user().is_none());
    }
}
