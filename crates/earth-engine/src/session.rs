//! Session bootstrap.
//!
//! A session starts unauthenticated. [`Session::authenticate`] validates
//! the stored credentials for the project; when that fails it refreshes
//! credentials once and validates again. There is no further retry.

use tracing::{debug, info, warn};

use crate::error::EeResult;

/// The calls a session needs.
pub trait EeBackend {
    /// Validate the stored credentials for `project`.
    fn initialize(&mut self, project: &str) -> EeResult<()>;

    /// Interactive credential refresh.
    fn authenticate(&mut self) -> EeResult<()>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Unauthenticated,
    Authenticated { project: String },
}

pub struct Session<B> {
    backend: B,
    state: SessionState,
}

impl<B: EeBackend> Session<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            state: SessionState::Unauthenticated,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self.state, SessionState::Authenticated { .. })
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Move to `Authenticated` for `project`.
    ///
    /// A second call for the same project is a no-op. An error from the
    /// retried initialize is returned as is and leaves the session
    /// unauthenticated.
    pub fn authenticate(&mut self, project: &str) -> EeResult<()> {
        if let SessionState::Authenticated { project: current } = &self.state {
            if current == project {
                debug!(project, "Session already authenticated");
                return Ok(());
            }
        }
        self.state = SessionState::Unauthenticated;

        if let Err(e) = self.backend.initialize(project) {
            warn!(project, error = %e, "Initialize failed, refreshing credentials");
            self.backend.authenticate()?;
            self.backend.initialize(project)?;
        }

        info!(project, "Earth Engine session ready");
        self.state = SessionState::Authenticated {
            project: project.to_string(),
        };
        Ok(())
    }
}
