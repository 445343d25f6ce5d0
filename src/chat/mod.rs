//! Chat orchestration
//!
//! Conversation types, the chat provider abstraction with its
//! OpenAI-compatible HTTP implementation, and the per-turn orchestration
//! including the `search_documents` tool round-trip.

mod client;
mod session;
mod types;

pub use client::*;
pub use session::*;
pub use types::*;
