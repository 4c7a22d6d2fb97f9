//! Adapter construction.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use session_store::{session_file_name, SessionMetadata};
use time::OffsetDateTime;

use crate::adapter::{SessionAdapter, PI_AGENT_FORMAT};

/// Options accepted by [`create_pi_session_adapter`].
///
/// Deserializable so hosts can embed them in their own configuration files.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AdapterOptions {
    pub session_id: String,
    #[serde(default)]
    pub cwd: Option<String>,
    #[serde(default)]
    pub agent_id: Option<String>,
}

impl AdapterOptions {
    #[must_use]
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            cwd: None,
            agent_id: None,
        }
    }

    #[must_use]
    pub fn with_cwd(mut self, cwd: impl Into<String>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    #[must_use]
    pub fn with_agent_id(mut self, agent_id: impl Into<String>) -> Self {
        self.agent_id = Some(agent_id.into());
        self
    }

    fn into_metadata(self, created_at: OffsetDateTime) -> SessionMetadata {
        SessionMetadata {
            session_id: self.session_id,
            cwd: self.cwd,
            agent_id: self.agent_id,
            runtime: PI_AGENT_FORMAT.to_string(),
            created_at,
        }
    }
}

/// Builds a detached adapter for `session_file`. Performs no I/O.
#[must_use]
pub fn create_pi_session_adapter(
    session_file: impl Into<PathBuf>,
    options: AdapterOptions,
) -> SessionAdapter {
    let metadata = options.into_metadata(OffsetDateTime::now_utc());
    SessionAdapter::new(session_file.into(), metadata)
}

/// Builds a detached adapter whose session file is named under `root` from
/// the session start time and id. Performs no I/O.
#[must_use]
pub fn create_pi_session_adapter_in(root: &Path, options: AdapterOptions) -> SessionAdapter {
    let created_at = OffsetDateTime::now_utc();
    let session_file = root.join(session_file_name(created_at, &options.session_id));
    SessionAdapter::new(session_file, options.into_metadata(created_at))
}
