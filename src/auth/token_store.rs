//! Persistent bearer token storage.

use std::path::{Path, PathBuf};
use std::sync::RwLock;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::DermxError;
use crate::Result;

/// Where a bearer token survives between runs.
pub trait TokenStore: Send + Sync {
    /// Read the persisted token, if any.
    fn load(&self) -> Result<Option<String>>;
    /// Persist `token`, replacing any previous one.
    fn save(&self, token: &str) -> Result<()>;
    /// Forget the persisted token. Clearing an empty store is not an error.
    fn clear(&self) -> Result<()>;
}

#[derive(Serialize, Deserialize)]
struct PersistedToken {
    #[serde(rename = "authToken")]
    auth_token: String,
}

/// Token kept in a small JSON file.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<data dir>/dermx/auth_token.json`, or the working directory when
    /// the platform has no data dir.
    pub fn default_path() -> PathBuf {
        dirs::data_dir()
            .map(|dir| dir.join("dermx"))
            .unwrap_or_default()
            .join("auth_token.json")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<String>> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(DermxError::Io(e)),
        };

        let persisted: PersistedToken = serde_json::from_str(&content).map_err(|e| {
            DermxError::TokenStore(format!("{}: {}", self.path.display(), e))
        })?;

        if persisted.auth_token.is_empty() {
            return Ok(None);
        }
        Ok(Some(persisted.auth_token))
    }

    fn save(&self, token: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let content = serde_json::to_string(&PersistedToken {
            auth_token: token.to_string(),
        })?;
        std::fs::write(&self.path, content)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&self.path, std::fs::Permissions::from_mode(0o600))?;
        }

        debug!(path = %self.path.display(), "token persisted");
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                debug!(path = %self.path.display(), "persisted token removed");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(DermxError::Io(e)),
        }
    }
}

/// Token kept in memory only.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: RwLock<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: RwLock::new(Some(token.into())),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<String>> {
        self.token
            .read()
            .map(|token| token.clone())
            .map_err(|_| DermxError::TokenStore("lock poisoned".into()))
    }

    fn save(&self, token: &str) -> Result<()> {
        let mut slot = self
            .token
            .write()
            .map_err(|_| DermxError::TokenStore("lock poisoned".into()))?;
        *slot = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let mut slot = self
            .token
            .write()
            .map_err(|_| DermxError::TokenStore("lock poisoned".into()))?;
        *slot = None;
        Ok(())
    }
}
