//! Transcript model and durable-store boundary for agent sessions.

mod codec;
mod error;
mod manager;
mod memory;
mod paths;
mod schema;

pub use codec::{decode_transcript, encode_entry, encode_header, DecodedTranscript};
pub use error::SessionManagerError;
pub use manager::{SessionManager, SessionRef};
pub use memory::{ManagerCall, MemorySessionManager};
pub use paths::{sanitize_for_filename, session_file_name, session_root};
pub use schema::{
    ContentBlock, EntryKind, SessionHeader, SessionMetadata, TranscriptEntry, TranscriptRecord,
    SESSION_VERSION,
};
