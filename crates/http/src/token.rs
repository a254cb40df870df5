//! Session token persistence
//!
//! At most one token is held at a time; its presence is the only signal that
//! a user is logged in. Stores are shared between every clone of the client,
//! so implementations must be `Send + Sync`.

use arc_swap::ArcSwapOption;
use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// Name of the single persisted key holding the raw token string
pub const TOKEN_KEY: &str = "authToken";

#[derive(Debug, Error)]
pub enum TokenStoreError {
    #[error("refusing to store an empty token")]
    Empty,

    #[error("token storage at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Slot holding the current session token
pub trait TokenStore: Send + Sync {
    /// Current token, or `None` when logged out
    fn get(&self) -> Option<String>;

    /// Replace any existing token
    fn set(&self, token: &str) -> Result<(), TokenStoreError>;

    /// Remove the token. Clearing an empty store is not an error.
    fn clear(&self) -> Result<(), TokenStoreError>;

    fn is_present(&self) -> bool {
        self.get().is_some()
    }
}

fn normalize(token: &str) -> Result<&str, TokenStoreError> {
    let token = token.trim();
    if token.is_empty() {
        Err(TokenStoreError::Empty)
    } else {
        Ok(token)
    }
}

/// In-process token slot; lost when the process exits
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    slot: ArcSwapOption<String>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with a token
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            slot: ArcSwapOption::from_pointee(token.into()),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self) -> Option<String> {
        self.slot.load_full().map(|token| token.as_ref().clone())
    }

    fn set(&self, token: &str) -> Result<(), TokenStoreError> {
        let token = normalize(token)?;
        self.slot.store(Some(Arc::new(token.to_string())));
        Ok(())
    }

    fn clear(&self) -> Result<(), TokenStoreError> {
        self.slot.store(None);
        Ok(())
    }
}

/// Token persisted as a single file named [`TOKEN_KEY`] inside a directory.
///
/// The file survives restarts; its absence means logged out.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    /// Store rooted at `dir`. The directory is created on first write.
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(TOKEN_KEY),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> TokenStoreError {
        TokenStoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl TokenStore for FileTokenStore {
    fn get(&self) -> Option<String> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => {
                let token = contents.trim();
                (!token.is_empty()).then(|| token.to_string())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Failed to read stored token");
                None
            }
        }
    }

    fn set(&self, token: &str) -> Result<(), TokenStoreError> {
        let token = normalize(token)?;
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }

        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut file = options.open(&self.path).map_err(|e| self.io_error(e))?;

        // `mode` only applies on creation; tighten files that already exist
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(std::fs::Permissions::from_mode(0o600))
                .map_err(|e| self.io_error(e))?;
        }

        file.write_all(token.as_bytes()).map_err(|e| self.io_error(e))
    }

    fn clear(&self) -> Result<(), TokenStoreError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io_error(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_set_get_clear() {
        let store = MemoryTokenStore::new();
        assert_eq!(store.get(), None);

        store.set("abc123").unwrap();
        assert_eq!(store.get().as_deref(), Some("abc123"));

        store.set("def456").unwrap();
        assert_eq!(store.get().as_deref(), Some("def456"));

        store.clear().unwrap();
        assert_eq!(store.get(), None);
    }

    #[test]
    fn clear_is_idempotent() {
        let store = MemoryTokenStore::new();
        store.clear().unwrap();
        store.clear().unwrap();
        assert!(!store.is_present());

        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(dir.path());
        store.clear().unwrap();
        store.clear().unwrap();
        assert!(!store.is_present());
    }

    #[test]
    fn empty_token_is_rejected() {
        let store = MemoryTokenStore::with_token("keep");
        assert!(matches!(store.set("   "), Err(TokenStoreError::Empty)));
        assert_eq!(store.get().as_deref(), Some("keep"));
    }

    #[test]
    fn file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("state");

        FileTokenStore::new(&nested).set("abc123").unwrap();

        let reopened = FileTokenStore::new(&nested);
        assert_eq!(reopened.get().as_deref(), Some("abc123"));
        assert_eq!(reopened.path(), nested.join(TOKEN_KEY));

        reopened.clear().unwrap();
        assert!(!nested.join(TOKEN_KEY).exists());
        assert_eq!(FileTokenStore::new(&nested).get(), None);
    }

    #[cfg(unix)]
    #[test]
    fn file_store_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let loose = dir.path().join(TOKEN_KEY);
        std::fs::write(&loose, "old").unwrap();
        std::fs::set_permissions(&loose, std::fs::Permissions::from_mode(0o644)).unwrap();

        let store = FileTokenStore::new(dir.path());
        store.set("abc123").unwrap();
        let mode = std::fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        assert_eq!(store.get().as_deref(), Some("abc123"));

        store.clear().unwrap();
        store.set("def456").unwrap();
        let mode = std::fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn file_store_ignores_blank_contents() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(TOKEN_KEY), "\n").unwrap();
        assert_eq!(FileTokenStore::new(dir.path()).get(), None);
    }
}
