//! Identity collaborator
//!
//! The analyzer never authenticates anyone. It only asks whether an opaque
//! identity tag (e.g. an email address) is present. `SessionIdentity` owns the
//! process-wide session: it is read once at startup and cleared on logout.

use crate::error::IdentityError;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

/// Source of the optional identity tag attached to submissions
pub trait IdentityProvider: Send + Sync {
    /// Current identity tag, `None` for anonymous use
    fn identity_tag(&self) -> Option<String>;
}

/// Always anonymous
#[derive(Debug, Default, Clone, Copy)]
pub struct Anonymous;

impl IdentityProvider for Anonymous {
    fn identity_tag(&self) -> Option<String> {
        None
    }
}

/// Fixed identity for the lifetime of the provider
#[derive(Debug, Clone)]
pub struct StaticIdentity(pub String);

impl IdentityProvider for StaticIdentity {
    fn identity_tag(&self) -> Option<String> {
        Some(self.0.clone())
    }
}

/// Persisted login session
pub struct SessionIdentity {
    path: Option<PathBuf>,
    current: RwLock<Option<String>>,
}

impl SessionIdentity {
    /// Default session file location (`<config dir>/lease-analyzer/identity`)
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("lease-analyzer").join("identity"))
    }

    /// Session that lives only in memory
    pub fn in_memory() -> Self {
        Self {
            path: None,
            current: RwLock::new(None),
        }
    }

    /// Read a persisted identity, if any
    pub fn init(path: impl Into<PathBuf>) -> Result<Self, IdentityError> {
        let path = path.into();
        let current = if path.exists() {
            let raw = fs::read_to_string(&path).map_err(|e| io_error(&path, e))?;
            normalize(&raw)
        } else {
            None
        };

        tracing::debug!(
            "[Identity] Session initialized ({})",
            if current.is_some() { "signed in" } else { "anonymous" }
        );

        Ok(Self {
            path: Some(path),
            current: RwLock::new(current),
        })
    }

    /// Record a signed-in identity and persist it
    pub fn login(&self, tag: &str) -> Result<(), IdentityError> {
        let Some(tag) = normalize(tag) else {
            return self.logout();
        };

        if let Some(path) = &self.path {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).map_err(|e| io_error(parent, e))?;
            }
            fs::write(path, &tag).map_err(|e| io_error(path, e))?;
        }

        *self.current.write().unwrap_or_else(|e| e.into_inner()) = Some(tag);
        tracing::info!("[Identity] Signed in");
        Ok(())
    }

    /// Clear the identity and remove the persisted session
    pub fn logout(&self) -> Result<(), IdentityError> {
        if let Some(path) = &self.path {
            if path.exists() {
                fs::remove_file(path).map_err(|e| io_error(path, e))?;
            }
        }

        *self.current.write().unwrap_or_else(|e| e.into_inner()) = None;
        tracing::info!("[Identity] Signed out");
        Ok(())
    }

    pub fn is_signed_in(&self) -> bool {
        self.identity_tag().is_some()
    }
}

impl IdentityProvider for SessionIdentity {
    fn identity_tag(&self) -> Option<String> {
        self.current
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

fn normalize(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn io_error(path: &Path, source: std::io::Error) -> IdentityError {
    IdentityError::Io {
        path: path.display().to_string(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_anonymous_has_no_tag() {
        assert_eq!(Anonymous.identity_tag(), None);
    }

    #[test]
    fn test_session_persists_across_init() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("identity");

        let session = SessionIdentity::init(&path).unwrap();
        assert!(!session.is_signed_in());

        session.login("  tenant@example.com \n").unwrap();
        assert_eq!(session.identity_tag().as_deref(), Some("tenant@example.com"));

        let reloaded = SessionIdentity::init(&path).unwrap();
        assert_eq!(reloaded.identity_tag().as_deref(), Some("tenant@example.com"));
    }

    #[test]
    fn test_logout_clears_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("identity");

        let session = SessionIdentity::init(&path).unwrap();
        session.login("tenant@example.com").unwrap();
        session.logout().unwrap();

        assert!(!path.exists());
        assert_eq!(session.identity_tag(), None);
        assert_eq!(SessionIdentity::init(&path).unwrap().identity_tag(), None);
    }

    #[test]
    fn test_blank_login_signs_out() {
        let session = SessionIdentity::in_memory();
        session.login("tenant@example.com").unwrap();
        session.login("   ").unwrap();
        assert!(!session.is_signed_in());
    }
}
