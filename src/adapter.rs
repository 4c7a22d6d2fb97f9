//! Session transcript adapter.
//!
//! Records user, assistant and tool-result turns in append order and forwards
//! them to an optional, non-owned [`SessionManager`]. Without a manager the
//! adapter runs detached: every operation succeeds and nothing is persisted.
//!
//! Lifecycle: `active -> closed`. Closed is terminal; calls on a closed
//! adapter are safe no-ops.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Weak};

use session_store::{
    ContentBlock, EntryKind, SessionManager, SessionMetadata, SessionRef, TranscriptEntry,
};
use time::OffsetDateTime;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::error::TranscriptError;
use crate::id::MessageIdGenerator;

/// Schema tag written by this adapter; readers select their decoder by it.
pub const PI_AGENT_FORMAT: &str = "pi-agent";

#[derive(Debug, Default)]
struct AdapterState {
    manager: Option<Weak<dyn SessionManager>>,
    pending: Vec<TranscriptEntry>,
    last_timestamp: Option<OffsetDateTime>,
    closed: bool,
}

impl AdapterState {
    /// Upgrades the manager reference, forgetting it once its owner dropped it.
    fn live_manager(&mut self, session_id: &str) -> Option<Arc<dyn SessionManager>> {
        let manager = self.manager.as_ref()?.upgrade();
        if manager.is_none() {
            debug!(session_id, "session manager was dropped; continuing detached");
            self.manager = None;
        }
        manager
    }

    fn next_timestamp(&self, now: OffsetDateTime) -> OffsetDateTime {
        match self.last_timestamp {
            Some(last) if last > now => last,
            _ => now,
        }
    }
}

#[derive(Debug)]
pub struct SessionAdapter {
    session_file: PathBuf,
    metadata: SessionMetadata,
    ids: MessageIdGenerator,
    state: Mutex<AdapterState>,
}

impl SessionAdapter {
    pub(crate) fn new(session_file: PathBuf, metadata: SessionMetadata) -> Self {
        Self {
            session_file,
            metadata,
            ids: MessageIdGenerator::default(),
            state: Mutex::new(AdapterState::default()),
        }
    }

    #[must_use]
    pub fn format(&self) -> &'static str {
        PI_AGENT_FORMAT
    }

    /// The log path exactly as given at construction.
    #[must_use]
    pub fn session_file(&self) -> &Path {
        &self.session_file
    }

    #[must_use]
    pub fn metadata(&self) -> &SessionMetadata {
        &self.metadata
    }

    /// Attaches a session manager by weak reference.
    ///
    /// The caller keeps ownership; once every strong reference is gone the
    /// adapter falls back to detached mode. Ignored after `close`.
    pub async fn attach_manager(&self, manager: &Arc<dyn SessionManager>) {
        let weak = Arc::downgrade(manager);
        let mut state = self.state.lock().await;
        if state.closed {
            warn!(
                session_id = %self.metadata.session_id,
                "ignoring session manager attach on closed adapter"
            );
            return;
        }

        state.manager = Some(weak);
        info!(
            session_id = %self.metadata.session_id,
            session_file = %self.session_file.display(),
            pending = state.pending.len(),
            "session manager attached"
        );
    }

    pub async fn detach_manager(&self) {
        let mut state = self.state.lock().await;
        if state.manager.take().is_some() {
            info!(session_id = %self.metadata.session_id, "session manager detached");
        }
    }

    /// Whether a live session manager is currently reachable.
    pub async fn is_attached(&self) -> bool {
        let mut state = self.state.lock().await;
        state.live_manager(&self.metadata.session_id).is_some()
    }

    pub async fn is_closed(&self) -> bool {
        self.state.lock().await.closed
    }

    /// Number of entries appended since the last successful flush.
    pub async fn pending_len(&self) -> usize {
        self.state.lock().await.pending.len()
    }

    /// Returns the durable history of this session, or nothing when detached.
    pub async fn load_history(&self) -> Result<Vec<TranscriptEntry>, TranscriptError> {
        let mut state = self.state.lock().await;
        if state.closed {
            return Ok(Vec::new());
        }
        let Some(manager) = state.live_manager(&self.metadata.session_id) else {
            return Ok(Vec::new());
        };

        let entries = manager.load(&self.session_ref()).await.map_err(|error| {
            warn!(session_id = %self.metadata.session_id, %error, "loading transcript failed");
            TranscriptError::from(error)
        })?;
        debug!(
            session_id = %self.metadata.session_id,
            entries = entries.len(),
            "loaded transcript history"
        );
        Ok(entries)
    }

    pub async fn append_user_message(
        &self,
        text: impl Into<String>,
    ) -> Result<String, TranscriptError> {
        self.append(EntryKind::UserMessage { text: text.into() }).await
    }

    /// Appends an assistant turn. `content` must hold at least one block.
    pub async fn append_assistant_message(
        &self,
        content: Vec<ContentBlock>,
    ) -> Result<String, TranscriptError> {
        if content.is_empty() {
            return Err(TranscriptError::invalid_input(
                "append_assistant_message",
                "content must contain at least one block",
            ));
        }

        self.append(EntryKind::AssistantMessage { content }).await
    }

    /// Appends a tool result correlated to `tool_call_id`, which is stored
    /// verbatim and never checked against live tool calls.
    pub async fn append_tool_result(
        &self,
        tool_call_id: impl Into<String>,
        result: Vec<ContentBlock>,
    ) -> Result<String, TranscriptError> {
        let tool_call_id = tool_call_id.into();
        if tool_call_id.is_empty() {
            return Err(TranscriptError::invalid_input(
                "append_tool_result",
                "tool_call_id must not be empty",
            ));
        }

        self.append(EntryKind::ToolResult {
            tool_call_id,
            result,
        })
        .await
    }

    /// Asks the attached manager to persist every pending entry and clears
    /// the buffer on success. A no-op when detached or closed.
    pub async fn flush(&self) -> Result<(), TranscriptError> {
        let mut state = self.state.lock().await;
        if state.closed {
            return Ok(());
        }
        let Some(manager) = state.live_manager(&self.metadata.session_id) else {
            debug!(
                session_id = %self.metadata.session_id,
                pending = state.pending.len(),
                "flush without session manager is a no-op"
            );
            return Ok(());
        };

        manager
            .flush(&self.session_ref(), &state.pending)
            .await
            .map_err(|error| {
                warn!(
                    session_id = %self.metadata.session_id,
                    pending = state.pending.len(),
                    %error,
                    "flushing transcript failed"
                );
                TranscriptError::from(error)
            })?;

        let flushed = state.pending.len();
        state.pending.clear();
        debug!(session_id = %self.metadata.session_id, flushed, "flushed transcript");
        Ok(())
    }

    /// Drops the buffer and the manager reference. Idempotent.
    ///
    /// Does not flush: entries still pending are discarded.
    pub async fn close(&self) {
        let mut state = self.state.lock().await;
        if state.closed {
            debug!(session_id = %self.metadata.session_id, "adapter already closed");
            return;
        }

        let discarded = state.pending.len();
        if discarded > 0 && state.manager.is_some() {
            warn!(
                session_id = %self.metadata.session_id,
                discarded,
                "closing adapter with unflushed transcript entries"
            );
        }

        state.pending.clear();
        state.manager = None;
        state.closed = true;
        info!(session_id = %self.metadata.session_id, "session adapter closed");
    }

    async fn append(&self, kind: EntryKind) -> Result<String, TranscriptError> {
        let kind_name = kind.name();
        let mut state = self.state.lock().await;
        let timestamp = state.next_timestamp(OffsetDateTime::now_utc());
        let id = self.ids.next_id_at(timestamp);

        if state.closed {
            debug!(
                session_id = %self.metadata.session_id,
                entry_id = %id,
                kind = kind_name,
                "append on closed adapter recorded nothing"
            );
            return Ok(id);
        }

        let entry = TranscriptEntry::new(id.clone(), timestamp, kind);
        if let Some(manager) = state.live_manager(&self.metadata.session_id) {
            manager
                .append(&self.session_ref(), &entry)
                .await
                .map_err(|error| {
                    warn!(
                        session_id = %self.metadata.session_id,
                        entry_id = %id,
                        kind = kind_name,
                        %error,
                        "session manager rejected transcript entry"
                    );
                    TranscriptError::from(error)
                })?;
        }

        state.last_timestamp = Some(timestamp);
        state.pending.push(entry);
        debug!(
            session_id = %self.metadata.session_id,
            entry_id = %id,
            kind = kind_name,
            pending = state.pending.len(),
            "appended transcript entry"
        );
        Ok(id)
    }

    fn session_ref(&self) -> SessionRef<'_> {
        SessionRef {
            metadata: &self.metadata,
            session_file: &self.session_file,
        }
    }
}
