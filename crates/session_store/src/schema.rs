use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use time::OffsetDateTime;

/// Session header schema version written by this crate.
pub const SESSION_VERSION: u32 = 1;

/// One opaque, tagged content block inside an assistant message or tool result.
///
/// Blocks are carried as structured JSON and are never inspected or rewritten
/// by the transcript layer. Unknown block types pass through untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentBlock(Value);

impl ContentBlock {
    /// Builds a `{"type": "text", "text": ...}` block.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self(json!({ "type": "text", "text": text.into() }))
    }

    #[must_use]
    pub fn from_value(value: Value) -> Self {
        Self(value)
    }

    /// Returns the block's `type` tag when it carries one.
    #[must_use]
    pub fn block_type(&self) -> Option<&str> {
        self.0.get("type").and_then(Value::as_str)
    }

    #[must_use]
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    #[must_use]
    pub fn into_value(self) -> Value {
        self.0
    }
}

impl From<Value> for ContentBlock {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

/// Turn payload, discriminated by `kind` in the persisted record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EntryKind {
    UserMessage {
        text: String,
    },
    AssistantMessage {
        content: Vec<ContentBlock>,
    },
    ToolResult {
        tool_call_id: String,
        result: Vec<ContentBlock>,
    },
}

impl EntryKind {
    /// Stable discriminator name, identical to the persisted `kind` value.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::UserMessage { .. } => "user_message",
            Self::AssistantMessage { .. } => "assistant_message",
            Self::ToolResult { .. } => "tool_result",
        }
    }
}

/// One logged turn of an agent conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub id: String,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    #[serde(flatten)]
    pub kind: EntryKind,
}

impl TranscriptEntry {
    #[must_use]
    pub fn new(id: impl Into<String>, timestamp: OffsetDateTime, kind: EntryKind) -> Self {
        Self {
            id: id.into(),
            timestamp,
            kind,
        }
    }
}

/// Immutable description of one session, fixed when the adapter is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionMetadata {
    pub session_id: String,
    pub cwd: Option<String>,
    pub agent_id: Option<String>,
    /// Producer/schema tag readers use to pick a decoder.
    pub runtime: String,
    pub created_at: OffsetDateTime,
}

/// First record of every persisted transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionHeader {
    pub version: u32,
    pub session_id: String,
    pub runtime: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cwd: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<String>,
}

impl SessionHeader {
    #[must_use]
    pub fn v1(metadata: &SessionMetadata) -> Self {
        Self {
            version: SESSION_VERSION,
            session_id: metadata.session_id.clone(),
            runtime: metadata.runtime.clone(),
            created_at: metadata.created_at,
            cwd: metadata.cwd.clone(),
            agent_id: metadata.agent_id.clone(),
        }
    }

    #[must_use]
    pub fn into_metadata(self) -> SessionMetadata {
        SessionMetadata {
            session_id: self.session_id,
            cwd: self.cwd,
            agent_id: self.agent_id,
            runtime: self.runtime,
            created_at: self.created_at,
        }
    }
}

/// One JSONL line of a persisted transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TranscriptRecord {
    Session(SessionHeader),
    Entry(TranscriptEntry),
}
