//! Client side of the conversation
//!
//! The reconciler turns the agent's chunk stream into an ordered message
//! list; the session persists it and re-attaches to interrupted runs.

pub mod chunk;
pub mod message;
mod reconciler;
mod session;
mod store;
pub mod transport;

pub use chunk::UiChunk;
pub use message::{ChatMessage, DataPart, MessageMetadata, Part, Role, TextPart, ToolPart, ToolState};
pub use reconciler::{ChatStatus, ChunkEffect, Conversation};
pub use session::{ChatSession, TurnOutcome, DEFAULT_MAX_CONSECUTIVE_ERRORS};
pub use store::{ChatStore, StoreError, HISTORY_KEY, RUN_ID_KEY};
pub use transport::{chat_url, resume_url, ChatTransport, HttpChatTransport, TransportError};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChatError {
    #[error("A turn is already in progress")]
    Busy,
    #[error("No tool call with id {0} in the current message")]
    UnknownToolCall(String),
    #[error("Tool call {tool_call_id} cannot move from {from:?} to {to:?}")]
    InvalidTransition {
        tool_call_id: String,
        from: ToolState,
        to: ToolState,
    },
    #[error("Gave up after {attempts} consecutive stream failures: {last}")]
    ReconnectLimit { attempts: u32, last: String },
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Transport(#[from] TransportError),
}
