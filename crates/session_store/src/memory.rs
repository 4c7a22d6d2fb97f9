//! In-process session manager.
//!
//! Keeps each session's transcript as encoded JSONL lines: `append` stages
//! the encoded line, `flush` commits the caller's pending batch to the
//! durable log and drops the staged copies. Records every call and supports
//! one-shot failure injection so attached-mode behavior can be exercised
//! without touching the filesystem.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use tracing::debug;

use crate::codec::{decode_transcript, encode_entry, encode_header};
use crate::error::SessionManagerError;
use crate::manager::{SessionManager, SessionRef};
use crate::schema::{SessionHeader, TranscriptEntry};

/// A recorded call to the memory manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManagerCall {
    Append { session_id: String, entry_id: String },
    Flush { session_id: String, pending: usize },
    Load { session_id: String },
}

#[derive(Debug)]
struct SessionLog {
    session_file: PathBuf,
    staged: Vec<String>,
    durable: Vec<String>,
}

impl SessionLog {
    fn new(session_file: &Path) -> Self {
        Self {
            session_file: session_file.to_path_buf(),
            staged: Vec::new(),
            durable: Vec::new(),
        }
    }
}

#[derive(Debug, Default)]
pub struct MemorySessionManager {
    sessions: Mutex<HashMap<String, SessionLog>>,
    calls: Mutex<Vec<ManagerCall>>,
    append_error: Mutex<Option<SessionManagerError>>,
    flush_error: Mutex<Option<SessionManagerError>>,
    load_error: Mutex<Option<SessionManagerError>>,
}

impl MemorySessionManager {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next `append` fail with `error`.
    pub fn fail_next_append(&self, error: SessionManagerError) {
        *lock(&self.append_error) = Some(error);
    }

    /// Makes the next `flush` fail with `error`.
    pub fn fail_next_flush(&self, error: SessionManagerError) {
        *lock(&self.flush_error) = Some(error);
    }

    /// Makes the next `load` fail with `error`.
    pub fn fail_next_load(&self, error: SessionManagerError) {
        *lock(&self.load_error) = Some(error);
    }

    /// Replaces the durable log of a session with raw lines.
    pub fn seed_durable_lines(
        &self,
        session_id: impl Into<String>,
        session_file: &Path,
        lines: Vec<String>,
    ) {
        let mut log = SessionLog::new(session_file);
        log.durable = lines;
        lock(&self.sessions).insert(session_id.into(), log);
    }

    /// Returns the committed JSONL lines of a session, header first.
    #[must_use]
    pub fn durable_lines(&self, session_id: &str) -> Vec<String> {
        lock(&self.sessions)
            .get(session_id)
            .map(|log| log.durable.clone())
            .unwrap_or_default()
    }

    /// Returns the number of appended lines not yet committed by a flush.
    #[must_use]
    pub fn staged_len(&self, session_id: &str) -> usize {
        lock(&self.sessions)
            .get(session_id)
            .map_or(0, |log| log.staged.len())
    }

    #[must_use]
    pub fn calls(&self) -> Vec<ManagerCall> {
        lock(&self.calls).clone()
    }

    fn record(&self, call: ManagerCall) {
        lock(&self.calls).push(call);
    }
}

#[async_trait]
impl SessionManager for MemorySessionManager {
    async fn append(
        &self,
        session: &SessionRef<'_>,
        entry: &TranscriptEntry,
    ) -> Result<(), SessionManagerError> {
        self.record(ManagerCall::Append {
            session_id: session.session_id().to_string(),
            entry_id: entry.id.clone(),
        });
        if let Some(error) = lock(&self.append_error).take() {
            return Err(error);
        }

        let line = encode_entry(entry)?;
        let mut sessions = lock(&self.sessions);
        let log = session_log(&mut sessions, session)?;
        log.staged.push(line);
        Ok(())
    }

    async fn flush(
        &self,
        session: &SessionRef<'_>,
        pending: &[TranscriptEntry],
    ) -> Result<(), SessionManagerError> {
        self.record(ManagerCall::Flush {
            session_id: session.session_id().to_string(),
            pending: pending.len(),
        });
        if let Some(error) = lock(&self.flush_error).take() {
            return Err(error);
        }

        let mut batch = pending
            .iter()
            .map(encode_entry)
            .collect::<Result<Vec<_>, _>>()?;

        let mut sessions = lock(&self.sessions);
        let log = session_log(&mut sessions, session)?;
        if log.durable.is_empty() {
            log.durable
                .push(encode_header(&SessionHeader::v1(session.metadata))?);
        }
        let committed = batch.len();
        log.durable.append(&mut batch);
        log.staged.clear();
        debug!(
            session_id = session.session_id(),
            committed, "committed transcript batch"
        );
        Ok(())
    }

    async fn load(
        &self,
        session: &SessionRef<'_>,
    ) -> Result<Vec<TranscriptEntry>, SessionManagerError> {
        self.record(ManagerCall::Load {
            session_id: session.session_id().to_string(),
        });
        if let Some(error) = lock(&self.load_error).take() {
            return Err(error);
        }

        let durable = self.durable_lines(session.session_id());
        if durable.is_empty() {
            return Ok(Vec::new());
        }

        let decoded = decode_transcript(&durable, Some(session.metadata.runtime.as_str()))?;
        Ok(decoded.entries)
    }
}

fn session_log<'m>(
    sessions: &'m mut HashMap<String, SessionLog>,
    session: &SessionRef<'_>,
) -> Result<&'m mut SessionLog, SessionManagerError> {
    let log = sessions
        .entry(session.session_id().to_string())
        .or_insert_with(|| SessionLog::new(session.session_file));

    if log.session_file != session.session_file {
        return Err(SessionManagerError::backend(format!(
            "session '{}' is bound to {}, not {}",
            session.session_id(),
            log.session_file.display(),
            session.session_file.display()
        )));
    }

    Ok(log)
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
