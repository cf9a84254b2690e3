//! On-disk persistence for the signed-in session.
//!
//! The session lands in the platform config directory as
//! `heartview/session.json`, written atomically and readable only by the
//! owner. `HEARTVIEW_REFRESH_TOKEN` lets headless environments skip the
//! file entirely.

use super::Session;
use crate::config::PathsConfig;
use crate::error::{HeartviewError, Result};
use crate::persist::{atomic_read_json, atomic_write_json};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Environment variable holding a refresh token for headless use.
const REFRESH_TOKEN_VAR: &str = "HEARTVIEW_REFRESH_TOKEN";

/// Reads and writes the saved session file.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    /// Store rooted at the platform config directory.
    pub fn new() -> Result<Self> {
        let config_dir = dirs::config_dir().ok_or_else(|| HeartviewError::Config {
            message: "Could not determine the platform config directory".to_string(),
        })?;
        Ok(Self {
            path: config_dir
                .join(PathsConfig::CONFIG_DIR_NAME)
                .join(PathsConfig::SESSION_FILENAME),
        })
    }

    /// Store at an explicit file path.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Where the session file lives.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the saved session, if any.
    pub fn load(&self) -> Result<Option<Session>> {
        let session: Option<Session> = atomic_read_json(&self.path)?;
        if session.is_some() {
            debug!("Loaded session from {}", self.path.display());
        }
        Ok(session)
    }

    /// Persist the session, restricting the file to the owner.
    pub fn save(&self, session: &Session) -> Result<()> {
        atomic_write_json(&self.path, session)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            std::fs::set_permissions(&self.path, perms)
                .map_err(|e| HeartviewError::io_with_path(e, &self.path))?;
        }

        info!("Saved session for {}", session.email);
        Ok(())
    }

    /// Delete the saved session. Missing file is not an error.
    pub fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                info!("Cleared saved session");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(HeartviewError::io_with_path(e, &self.path)),
        }
    }

    /// Refresh token from the environment, for headless sign-in.
    pub fn env_refresh_token() -> Option<String> {
        std::env::var(REFRESH_TOKEN_VAR)
            .ok()
            .filter(|t| !t.trim().is_empty())
    }
}
