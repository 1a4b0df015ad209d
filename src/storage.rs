use std::{
    fs, io,
    path::{Path, PathBuf},
    sync::{Arc, Mutex, PoisonError},
};

use crate::{error::ApiError, models::Tokens};

// 1. TokenStore Contract
/// TokenStore
///
/// Where the session's access/refresh pair lives between requests. The pair is
/// always written and removed as a unit; there is no way to touch one token alone.
///
/// Two implementations exist: `MemoryTokenStore` lives as long as the process
/// (the equivalent of tab-scoped storage), `FileTokenStore` survives restarts
/// of the terminal front end.
pub trait TokenStore: Send + Sync {
    /// The persisted pair, or `None` when logged out or unreadable.
    fn load(&self) -> Option<Tokens>;

    /// Replaces whatever pair was stored.
    fn save(&self, tokens: &Tokens) -> Result<(), ApiError>;

    /// Removes the pair. Returns `true` if something was actually removed.
    fn clear(&self) -> Result<bool, ApiError>;
}

/// TokenStoreState
///
/// Shared handle to the store, owned by the `SessionStore`.
pub type TokenStoreState = Arc<dyn TokenStore>;

// 2. In-memory implementation
/// MemoryTokenStore
///
/// Process-scoped storage. Used by embedders that keep one client alive, and by tests.
#[derive(Default)]
pub struct MemoryTokenStore {
    tokens: Mutex<Option<Tokens>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts out with a pair already present, as after a reload with a live session.
    pub fn with_tokens(tokens: Tokens) -> Self {
        Self {
            tokens: Mutex::new(Some(tokens)),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Option<Tokens> {
        self.tokens
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn save(&self, tokens: &Tokens) -> Result<(), ApiError> {
        *self.tokens.lock().unwrap_or_else(PoisonError::into_inner) = Some(tokens.clone());
        Ok(())
    }

    fn clear(&self) -> Result<bool, ApiError> {
        Ok(self
            .tokens
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .is_some())
    }
}

// 3. File-backed implementation
/// FileTokenStore
///
/// Persists the pair as a small JSON document so that each invocation of the
/// terminal front end picks up the session left by the previous one.
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Option<Tokens> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), "cannot read session file: {}", e);
                return None;
            }
        };

        match serde_json::from_str::<Tokens>(&raw) {
            Ok(tokens) => Some(tokens),
            Err(e) => {
                // A corrupt file is the same as no session.
                tracing::warn!(path = %self.path.display(), "ignoring corrupt session file: {}", e);
                None
            }
        }
    }

    fn save(&self, tokens: &Tokens) -> Result<(), ApiError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| ApiError::Storage(e.to_string()))?;
        }
        let json = serde_json::to_string(tokens).map_err(|e| ApiError::Storage(e.to_string()))?;

        // Write-then-rename; readers never observe half a token pair.
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(|e| ApiError::Storage(e.to_string()))?;
        restrict_permissions(&tmp);
        fs::rename(&tmp, &self.path).map_err(|e| ApiError::Storage(e.to_string()))
    }

    fn clear(&self) -> Result<bool, ApiError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(ApiError::Storage(e.to_string())),
        }
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) {
    use std::os::unix::fs::PermissionsExt;
    if let Err(e) = fs::set_permissions(path, fs::Permissions::from_mode(0o600)) {
        tracing::debug!("could not restrict session file permissions: {}", e);
    }
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_saves_and_clears_pair() {
        let store = MemoryTokenStore::new();
        assert!(store.load().is_none());

        store.save(&Tokens::new("A", "B")).unwrap();
        let loaded = store.load().unwrap();
        assert_eq!(loaded.access_token, "A");
        assert_eq!(loaded.refresh_token, "B");

        assert!(store.clear().unwrap());
        assert!(store.load().is_none());
        // Second clear has nothing left to remove.
        assert!(!store.clear().unwrap());
    }

    #[test]
    fn file_store_survives_a_new_instance() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");

        FileTokenStore::new(&path)
            .save(&Tokens::new("access", "refresh"))
            .unwrap();

        let reopened = FileTokenStore::new(&path);
        let tokens = reopened.load().unwrap();
        assert_eq!(tokens.access_token, "access");
        assert_eq!(tokens.refresh_token, "refresh");

        assert!(reopened.clear().unwrap());
        assert!(!path.exists());
        assert!(!reopened.clear().unwrap());
    }

    #[test]
    fn corrupt_file_reads_as_logged_out() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "{not json").unwrap();

        assert!(FileTokenStore::new(&path).load().is_none());
    }
}
