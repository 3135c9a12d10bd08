//! `stride-assistant`: the conversational side of stride.
//!
//! A [`ChatSession`] posts the conversation and the week being viewed to an
//! assistant endpoint, streams the reply, and turns `ADD_TASK` /
//! `REMOVE_TASK` lines in the finished reply into tracker changes.
//!
//! # Architecture
//!
//! ```text
//! ChatSession      ← history, busy flag, directive application
//!     │
//!     ▼
//! AssistantClient  ← POST {messages, currentWeekData}, status mapping
//!     │
//!     ▼
//! DeltaStream      ← futures::Stream<Item = Result<String>>
//!     │              background task + mpsc channel, AbortHandle
//!     ▼
//! SseDecoder       ← `data:` frames split across arbitrary chunks
//! ```
//!
//! The relay side (system prompt, week context, gateway request body) lives
//! in [`prompt`].

pub mod client;
pub mod error;
pub mod prompt;
pub mod session;
pub mod sse;
pub mod stream;
pub mod types;

pub use client::AssistantClient;
pub use error::AssistantError;
pub use session::{ChatSession, TurnOutcome, GREETING};
pub use sse::SseDecoder;
pub use stream::{AbortHandle, DeltaStream};
pub use types::{ChatMessage, ChatRequest, Role};

/// Convenience `Result` alias for this crate.
pub type Result<T> = std::result::Result<T, AssistantError>;
