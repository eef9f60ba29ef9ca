//! Auth session
//!
//! Holds the bearer token for the running process. The token is read from a
//! [`TokenStore`] once at start-up, replaced on sign-in/sign-up and dropped on
//! logout. API clients read it on every request.

use std::sync::{Mutex, RwLock};

use crate::error::ClientResult;
use crate::platform::{MaybeSend, MaybeSync};

/// Durable home of the auth token
pub trait TokenStore: MaybeSend + MaybeSync {
    fn load(&self) -> ClientResult<Option<String>>;
    fn save(&self, token: &str) -> ClientResult<()>;
    fn clear(&self) -> ClientResult<()>;
}

/// Token store that forgets everything when the process exits
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: &str) -> Self {
        Self {
            token: Mutex::new(Some(token.to_string())),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> ClientResult<Option<String>> {
        Ok(self
            .token
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone())
    }

    fn save(&self, token: &str) -> ClientResult<()> {
        *self.token.lock().unwrap_or_else(|e| e.into_inner()) = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> ClientResult<()> {
        *self.token.lock().unwrap_or_else(|e| e.into_inner()) = None;
        Ok(())
    }
}

/// Token kept in a single file, used by the CLI
#[cfg(feature = "native")]
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: std::path::PathBuf,
}

#[cfg(feature = "native")]
impl FileTokenStore {
    pub fn new(path: impl Into<std::path::PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

#[cfg(feature = "native")]
impl TokenStore for FileTokenStore {
    fn load(&self) -> ClientResult<Option<String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => {
                let token = content.trim();
                Ok((!token.is_empty()).then(|| token.to_string()))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, token: &str) -> ClientResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, token)?;
        Ok(())
    }

    fn clear(&self) -> ClientResult<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Process-wide auth state
pub struct Session {
    store: Box<dyn TokenStore>,
    token: RwLock<Option<String>>,
}

impl Session {
    pub fn new(store: impl TokenStore + 'static) -> Self {
        Self {
            store: Box::new(store),
            token: RwLock::new(None),
        }
    }

    /// Session that never touches durable storage
    pub fn in_memory() -> Self {
        Self::new(MemoryTokenStore::new())
    }

    /// Read the persisted token into memory
    pub fn init(&self) -> ClientResult<bool> {
        let token = self.store.load()?;
        let present = token.is_some();
        *self.token.write().unwrap_or_else(|e| e.into_inner()) = token;
        tracing::debug!(authenticated = present, "Session initialised");
        Ok(present)
    }

    /// Replace the token after a successful sign-in or sign-up
    pub fn set(&self, token: &str) -> ClientResult<()> {
        self.store.save(token)?;
        *self.token.write().unwrap_or_else(|e| e.into_inner()) = Some(token.to_string());
        Ok(())
    }

    /// Forget the token. The in-memory copy is dropped even if the store fails.
    pub fn clear(&self) -> ClientResult<()> {
        *self.token.write().unwrap_or_else(|e| e.into_inner()) = None;
        self.store.clear()
    }

    pub fn token(&self) -> Option<String> {
        self.token.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Value for the `Authorization` header
    pub fn bearer(&self) -> Option<String> {
        self.token().map(|t| format!("Bearer {}", t))
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.read().unwrap_or_else(|e| e.into_inner()).is_some()
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}
