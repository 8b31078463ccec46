//! AI integration layer
//!
//! Prompt assembly, document context, the chat client seam and
//! AI-driven code modification.

pub mod client;
pub mod context;
pub mod documents;
pub mod modify;
pub mod prompts;

pub use client::{AiClient, AiError, ChatMessage, Conversation, Role};
pub use context::{ContextBudget, DocumentContextManager};
pub use documents::{DocumentExtractor, DocumentProcessor, ExtractError, TextExtractor};
pub use modify::{AutoTask, ModificationRequest, ModifyError};
pub use prompts::TaskKind;
