//! Stored OAuth credentials and the `earthengine` command-line tool.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use serde::Deserialize;
use tracing::{debug, info};

use crate::error::{EeError, EeResult};
use crate::session::EeBackend;

/// Relative to the home directory.
pub const CREDENTIALS_RELATIVE_PATH: &str = ".config/earthengine/credentials";
pub const DEFAULT_AUTH_COMMAND: &str = "earthengine";

#[derive(Debug, Clone, Deserialize)]
struct StoredCredentials {
    refresh_token: String,
    #[serde(default)]
    project: Option<String>,
}

/// `$HOME/.config/earthengine/credentials`, when `HOME` is set.
pub fn default_credentials_path() -> Option<PathBuf> {
    std::env::var_os("HOME").map(|home| PathBuf::from(home).join(CREDENTIALS_RELATIVE_PATH))
}

/// Backend that only parses the local credentials file on initialize, with
/// no network call, and shells out to `earthengine authenticate` for the
/// refresh.
#[derive(Debug, Clone)]
pub struct CredentialsBackend {
    credentials_path: PathBuf,
    auth_command: String,
    project: Option<String>,
}

impl CredentialsBackend {
    pub fn new(credentials_path: impl Into<PathBuf>) -> Self {
        Self {
            credentials_path: credentials_path.into(),
            auth_command: DEFAULT_AUTH_COMMAND.to_string(),
            project: None,
        }
    }

    pub fn with_auth_command(mut self, command: impl Into<String>) -> Self {
        self.auth_command = command.into();
        self
    }

    pub fn credentials_path(&self) -> &Path {
        &self.credentials_path
    }

    /// Project of the last successful initialize.
    pub fn project(&self) -> Option<&str> {
        self.project.as_deref()
    }

    fn load(&self) -> EeResult<StoredCredentials> {
        let raw = fs::read_to_string(&self.credentials_path).map_err(|e| EeError::Credentials {
            path: self.credentials_path.clone(),
            message: e.to_string(),
        })?;
        let creds: StoredCredentials = serde_json::from_str(&raw).map_err(|e| EeError::Credentials {
            path: self.credentials_path.clone(),
            message: e.to_string(),
        })?;
        if creds.refresh_token.trim().is_empty() {
            return Err(EeError::Credentials {
                path: self.credentials_path.clone(),
                message: "empty refresh_token".into(),
            });
        }
        Ok(creds)
    }
}

impl EeBackend for CredentialsBackend {
    fn initialize(&mut self, project: &str) -> EeResult<()> {
        if project.trim().is_empty() {
            return Err(EeError::Initialize {
                project: project.to_string(),
                message: "project id is empty".into(),
            });
        }
        let creds = self.load().map_err(|e| EeError::Initialize {
            project: project.to_string(),
            message: e.to_string(),
        })?;
        if let Some(stored) = &creds.project {
            debug!(stored = %stored, requested = project, "Stored credentials carry a project");
        }
        self.project = Some(project.to_string());
        Ok(())
    }

    fn authenticate(&mut self) -> EeResult<()> {
        info!(command = %self.auth_command, "Running interactive authentication");
        let status = Command::new(&self.auth_command)
            .arg("authenticate")
            .status()
            .map_err(|e| EeError::Authenticate(format!("{}: {}", self.auth_command, e)))?;
        if !status.success() {
            return Err(EeError::Authenticate(format!(
                "{} authenticate exited with {}",
                self.auth_command, status
            )));
        }
        Ok(())
    }
}
