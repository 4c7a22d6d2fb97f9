//! Session transcript adapter for agent conversations.
//!
//! Records user messages, assistant messages and tool results into an
//! ordered, replayable log. Durable storage is delegated to an optional
//! [`SessionManager`] attached after construction; without one the adapter
//! runs detached and every operation succeeds without persisting anything.
//!
//! # Public API Overview
//! - Build adapters with [`create_pi_session_adapter`] and [`AdapterOptions`].
//! - Record turns and commit them through [`SessionAdapter`].
//! - Plug in storage by implementing [`SessionManager`];
//!   [`MemorySessionManager`] is an in-process implementation.

pub mod config;
pub mod logging;

mod adapter;
mod error;
mod factory;
mod id;

pub use crate::adapter::{SessionAdapter, PI_AGENT_FORMAT};
pub use crate::error::TranscriptError;
pub use crate::factory::{create_pi_session_adapter, create_pi_session_adapter_in, AdapterOptions};
pub use crate::id::{MessageIdGenerator, PI_ID_TAG};

/// Transcript model, collaborator contract and record codec.
pub use session_store::{
    decode_transcript, ContentBlock, EntryKind, ManagerCall, MemorySessionManager,
    SessionManager, SessionManagerError, SessionMetadata, SessionRef, TranscriptEntry,
};
