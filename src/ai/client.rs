//! AI chat client seam and conversation management
//!
//! The HTTP transport lives outside this crate. Anything that can turn a
//! message history into a reply implements [`AiClient`].

use async_trait::async_trait;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::debug;
use uuid::Uuid;

use super::context::DocumentContextManager;
use super::prompts::{self, SYSTEM_PROMPT};

/// Failures reported by a chat backend
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AiError {
    #[error("Unauthorized: check the configured API key")]
    Unauthorized,

    #[error("Rate limited by the AI provider")]
    RateLimited,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Malformed response: {0}")]
    Malformed(String),
}

/// Message role in conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A single message in conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Local>,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            content: content.into(),
            timestamp: Local::now(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// A chat completion backend
#[async_trait]
pub trait AiClient: Send + Sync {
    /// Reply to the full message history
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, AiError>;
}

/// Conversation manager for multi-turn chats
pub struct Conversation {
    client: Arc<dyn AiClient>,
    messages: Vec<ChatMessage>,
}

impl Conversation {
    /// Start a new conversation seeded with the ABAP system prompt
    pub fn new(client: Arc<dyn AiClient>) -> Self {
        Self {
            client,
            messages: vec![ChatMessage::system(SYSTEM_PROMPT)],
        }
    }

    /// Replace the system prompt
    pub fn with_system(mut self, system: &str) -> Self {
        self.messages[0] = ChatMessage::system(system);
        self
    }

    /// Send a message and get response.
    ///
    /// The user message stays in the history even when the client fails.
    pub async fn send(&mut self, content: &str) -> Result<String, AiError> {
        self.messages.push(ChatMessage::user(content));
        debug!("Sending {} messages", self.messages.len());

        let response = self.client.complete(&self.messages).await?;

        self.messages.push(ChatMessage::assistant(response.clone()));
        Ok(response)
    }

    /// Send a request framed by an analysis context
    pub async fn send_with_context(&mut self, message: &str, context: &str) -> Result<String, AiError> {
        self.send(&prompts::with_context(message, context)).await
    }

    /// Send a request framed by the enabled documents
    pub async fn send_with_documents(
        &mut self,
        prompt: &str,
        selected_code: Option<&str>,
        documents: &DocumentContextManager,
    ) -> Result<String, AiError> {
        let query = documents.build_contextual_query(prompt, selected_code);
        self.send(&query).await
    }

    pub fn history(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Clear conversation history (keeps the system message)
    pub fn clear(&mut self) {
        self.messages.truncate(1);
    }
}

/// Run one request on a background task and hand the result to `on_complete`
pub fn spawn_request<F>(
    client: Arc<dyn AiClient>,
    messages: Vec<ChatMessage>,
    on_complete: F,
) -> JoinHandle<()>
where
    F: FnOnce(Result<String, AiError>) + Send + 'static,
{
    tokio::spawn(async move {
        let result = client.complete(&messages).await;
        on_complete(result);
    })
}
