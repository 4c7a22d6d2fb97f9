//! Boundary with the collaborator that owns durable transcript storage.
//!
//! Implementations decide the on-disk layout, locking and rotation. The
//! adapter side only forwards entries in append order and reports whatever
//! the collaborator returns.

use std::path::Path;

use async_trait::async_trait;

use crate::error::SessionManagerError;
use crate::schema::{SessionMetadata, TranscriptEntry};

/// Identifies the session a call targets: keyed by both session id and file.
#[derive(Debug, Clone, Copy)]
pub struct SessionRef<'a> {
    pub metadata: &'a SessionMetadata,
    pub session_file: &'a Path,
}

impl SessionRef<'_> {
    #[must_use]
    pub fn session_id(&self) -> &str {
        &self.metadata.session_id
    }
}

/// Durable store for transcript entries.
#[async_trait]
pub trait SessionManager: Send + Sync {
    /// Observes one entry as it is appended. Implementations may stage or
    /// validate it; it is not required to be durable until `flush`.
    async fn append(
        &self,
        session: &SessionRef<'_>,
        entry: &TranscriptEntry,
    ) -> Result<(), SessionManagerError>;

    /// Durably persists `pending`: every entry appended since the previous
    /// successful flush, in append order. Entries appended before this
    /// manager was attached are included.
    async fn flush(
        &self,
        session: &SessionRef<'_>,
        pending: &[TranscriptEntry],
    ) -> Result<(), SessionManagerError>;

    /// Returns the durable entries of the session in append order.
    async fn load(
        &self,
        session: &SessionRef<'_>,
    ) -> Result<Vec<TranscriptEntry>, SessionManagerError>;
}
