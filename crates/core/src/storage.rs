//! Durable client-side storage for the access token
//!
//! The session layer persists exactly one value, the current access token,
//! under [`ACCESS_TOKEN_KEY`]. Implementations must tolerate being cleared
//! when nothing is stored.

use crate::error::CoreResult;
use arc_swap::ArcSwapOption;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Fixed storage key for the access token
pub const ACCESS_TOKEN_KEY: &str = "accessToken";

/// Storage backend for the persisted access token
pub trait TokenStorage: Send + Sync {
    /// Read the persisted token, if any
    fn load(&self) -> CoreResult<Option<String>>;

    /// Persist a token, replacing any previous one
    fn store(&self, token: &str) -> CoreResult<()>;

    /// Remove the persisted token
    fn clear(&self) -> CoreResult<()>;
}

/// Process-local storage, lost on exit
#[derive(Default)]
pub struct MemoryTokenStorage {
    token: ArcSwapOption<String>,
}

impl MemoryTokenStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create storage that already holds a token
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: ArcSwapOption::from_pointee(token.into()),
        }
    }
}

impl TokenStorage for MemoryTokenStorage {
    fn load(&self) -> CoreResult<Option<String>> {
        Ok(self.token.load_full().map(|token| token.as_ref().clone()))
    }

    fn store(&self, token: &str) -> CoreResult<()> {
        self.token.store(Some(Arc::new(token.to_string())));
        Ok(())
    }

    fn clear(&self) -> CoreResult<()> {
        self.token.store(None);
        Ok(())
    }
}

/// Storage backed by a single file named after [`ACCESS_TOKEN_KEY`]
pub struct FileTokenStorage {
    path: PathBuf,
}

impl FileTokenStorage {
    /// Store the token inside `dir`
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(ACCESS_TOKEN_KEY),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenStorage for FileTokenStorage {
    fn load(&self) -> CoreResult<Option<String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => {
                let token = content.trim();
                Ok((!token.is_empty()).then(|| token.to_string()))
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn store(&self, token: &str) -> CoreResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, token)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&self.path, std::fs::Permissions::from_mode(0o600))?;
        }

        Ok(())
    }

    fn clear(&self) -> CoreResult<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}
