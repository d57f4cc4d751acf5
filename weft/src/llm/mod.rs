//! LLM client abstraction for workflow nodes.
//!
//! [`LlmNode`](crate::nodes::LlmNode) and
//! [`ConditionalBranchNode`](crate::nodes::ConditionalBranchNode) depend on
//! a capability that turns a prompt into text; this module defines the trait
//! plus a deterministic mock and a real OpenAI-compatible client.
//!
//! # Streaming
//!
//! `invoke_stream()` accepts an optional `Sender<ChatChunk>` sink and emits
//! fragments as they arrive, still returning the complete reply at the end.
//! The default implementation calls `invoke()` and sends the whole reply as
//! one chunk, so non-streaming clients need no extra code.

mod mock;
mod openai;

pub use mock::MockLlm;
pub use openai::{ChatOpenAI, DEEPSEEK_API_BASE};

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

/// System prompt used when a caller does not supply one.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant.";

/// Failure from an injected LLM capability. Wrapped by
/// [`WorkflowError::LlmCall`](crate::error::WorkflowError::LlmCall) with the
/// calling node's id.
#[derive(Debug, Error)]
pub enum LlmError {
    /// The request could not be built (bad parameters).
    #[error("request build failed: {0}")]
    InvalidRequest(String),

    /// The API call or stream failed.
    #[error("api error: {0}")]
    Api(String),

    /// The API answered without any completion choice.
    #[error("empty response from model")]
    EmptyResponse,
}

/// One fragment of a streamed reply.
#[derive(Clone, Debug)]
pub struct ChatChunk {
    /// Incremental reply text.
    pub content: String,
}

/// LLM client: prompt in, reply text out.
///
/// Implementations: [`MockLlm`] (deterministic, for tests and examples) and
/// [`ChatOpenAI`] (OpenAI Chat Completions; DeepSeek via its
/// OpenAI-compatible endpoint).
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// One completion: send the prompt, return the reply text.
    async fn invoke(&self, prompt: &str) -> Result<String, LlmError>;

    /// Streaming variant: emit reply fragments through `chunk_tx` as they
    /// arrive and return the concatenated reply.
    ///
    /// Lazy, finite, not restartable. The default delegates to `invoke()`
    /// and sends the whole reply as a single chunk.
    async fn invoke_stream(
        &self,
        prompt: &str,
        _system_prompt: &str,
        chunk_tx: Option<mpsc::Sender<ChatChunk>>,
    ) -> Result<String, LlmError> {
        let content = self.invoke(prompt).await?;
        if let Some(tx) = chunk_tx {
            if !content.is_empty() {
                let _ = tx
                    .send(ChatChunk {
                        content: content.clone(),
                    })
                    .await;
            }
        }
        Ok(content)
    }
}
