//! Mock LLM for tests and examples.
//!
//! Returns a fixed reply, keyword-matched replies, or a scripted sequence;
//! configurable to fail, for exercising error recovery paths. Records every
//! prompt it receives so tests can assert on prompt construction.
//!
//! # Streaming Support
//!
//! `invoke_stream()` sends the reply as a single chunk by default; enable
//! `with_stream_by_char` to send each character separately (for stream
//! tests).

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{ChatChunk, LlmClient, LlmError};

enum Behavior {
    /// Always the same reply.
    Fixed(String),
    /// First (substring, reply) pair whose substring occurs in the prompt;
    /// fallback reply otherwise.
    Keyed {
        pairs: Vec<(String, String)>,
        fallback: String,
    },
    /// Replies consumed in order; the last one repeats once exhausted.
    Sequence(Mutex<VecDeque<String>>),
    /// Every call fails with an api error.
    Failing(String),
}

/// Mock LLM: deterministic replies, optional failure mode.
///
/// **Interaction**: Implements [`LlmClient`]; used wherever a workflow needs
/// a model without network access.
pub struct MockLlm {
    behavior: Behavior,
    stream_by_char: bool,
    prompts: Mutex<Vec<String>>,
}

impl MockLlm {
    /// Creates a mock that always returns `reply`.
    pub fn fixed(reply: impl Into<String>) -> Self {
        Self::with_behavior(Behavior::Fixed(reply.into()))
    }

    /// Creates a mock that answers by prompt keyword: the first pair whose
    /// key occurs in the prompt wins; `fallback` otherwise.
    pub fn keyed<I, K, V>(pairs: I, fallback: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self::with_behavior(Behavior::Keyed {
            pairs: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            fallback: fallback.into(),
        })
    }

    /// Creates a mock that returns `replies` in order, repeating the last
    /// entry once the sequence is exhausted.
    pub fn sequence<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_behavior(Behavior::Sequence(Mutex::new(
            replies.into_iter().map(Into::into).collect(),
        )))
    }

    /// Creates a mock whose every call fails with an api error.
    pub fn failing(message: impl Into<String>) -> Self {
        Self::with_behavior(Behavior::Failing(message.into()))
    }

    /// Enable character-by-character streaming for `invoke_stream()`.
    pub fn with_stream_by_char(mut self) -> Self {
        self.stream_by_char = true;
        self
    }

    /// Prompts received so far, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().expect("prompt log lock").clone()
    }

    fn with_behavior(behavior: Behavior) -> Self {
        Self {
            behavior,
            stream_by_char: false,
            prompts: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl LlmClient for MockLlm {
    async fn invoke(&self, prompt: &str) -> Result<String, LlmError> {
        self.prompts
            .lock()
            .expect("prompt log lock")
            .push(prompt.to_string());

        match &self.behavior {
            Behavior::Fixed(reply) => Ok(reply.clone()),
            Behavior::Keyed { pairs, fallback } => Ok(pairs
                .iter()
                .find(|(key, _)| prompt.contains(key))
                .map(|(_, reply)| reply.clone())
                .unwrap_or_else(|| fallback.clone())),
            Behavior::Sequence(queue) => {
                let mut queue = queue.lock().expect("reply queue lock");
                match queue.len() {
                    0 => Err(LlmError::EmptyResponse),
                    1 => Ok(queue.front().cloned().expect("non-empty queue")),
                    _ => Ok(queue.pop_front().expect("non-empty queue")),
                }
            }
            Behavior::Failing(message) => Err(LlmError::Api(message.clone())),
        }
    }

    /// Streaming variant: one chunk by default, per-character when
    /// `with_stream_by_char` is set.
    async fn invoke_stream(
        &self,
        prompt: &str,
        _system_prompt: &str,
        chunk_tx: Option<mpsc::Sender<ChatChunk>>,
    ) -> Result<String, LlmError> {
        let content = self.invoke(prompt).await?;
        if let Some(tx) = chunk_tx {
            if self.stream_by_char {
                for c in content.chars() {
                    let _ = tx
                        .send(ChatChunk {
                            content: c.to_string(),
                        })
                        .await;
                }
            } else if !content.is_empty() {
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
