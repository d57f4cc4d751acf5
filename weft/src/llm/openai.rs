//! OpenAI Chat Completions client implementing [`LlmClient`].
//!
//! Uses the real Chat Completions API. Requires `OPENAI_API_KEY` (or
//! explicit config). DeepSeek speaks the same protocol; `ChatOpenAI::deepseek`
//! points the client at its endpoint.
//!
//! # Streaming
//!
//! `invoke_stream()` uses the streaming API (`create_stream`) and forwards
//! each content delta through the provided channel as it arrives. Some
//! proxies send the reply only in the final payload rather than in deltas;
//! in that case the full reply is sent as one chunk at the end so the sink
//! still sees the text.

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio_stream::StreamExt;
use tracing::{debug, trace};

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessage,
        ChatCompletionRequestUserMessage, CreateChatCompletionRequestArgs,
    },
    Client,
};

use super::{ChatChunk, LlmClient, LlmError, DEFAULT_SYSTEM_PROMPT};

/// Base URL of DeepSeek's OpenAI-compatible API.
pub const DEEPSEEK_API_BASE: &str = "https://api.deepseek.com/v1";

/// OpenAI Chat Completions client.
///
/// Uses `OPENAI_API_KEY` from the environment by default, or explicit
/// config via [`with_config`](Self::with_config). Each `invoke` sends one
/// system message (the configured system prompt) and one user message (the
/// rendered node prompt).
///
/// **Interaction**: Implements [`LlmClient`]; injected into
/// [`LlmNode`](crate::nodes::LlmNode) and
/// [`ConditionalBranchNode`](crate::nodes::ConditionalBranchNode).
pub struct ChatOpenAI {
    client: Client<OpenAIConfig>,
    model: String,
    temperature: Option<f32>,
    system_prompt: String,
}

impl ChatOpenAI {
    /// Build client with default config (API key from `OPENAI_API_KEY` env).
    pub fn new(model: impl Into<String>) -> Self {
        Self::with_config(OpenAIConfig::default(), model)
    }

    /// Build client with custom config (e.g. custom API key or base URL).
    pub fn with_config(config: OpenAIConfig, model: impl Into<String>) -> Self {
        Self {
            client: Client::with_config(config),
            model: model.into(),
            temperature: None,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }

    /// Build a client for DeepSeek's OpenAI-compatible endpoint.
    pub fn deepseek(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        let config = OpenAIConfig::new()
            .with_api_key(api_key)
            .with_api_base(DEEPSEEK_API_BASE);
        Self::with_config(config, model)
    }

    /// Set temperature (0–2). Lower values are more deterministic.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set the system prompt sent with every completion.
    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = system_prompt.into();
        self
    }

    /// Returns the chat completions URL used for logging (base from
    /// OPENAI_BASE_URL or OPENAI_API_BASE env, else default). Does not
    /// append /v1 when base already ends with /v1.
    fn chat_completions_url() -> String {
        let base = std::env::var("OPENAI_BASE_URL")
            .or_else(|_| std::env::var("OPENAI_API_BASE"))
            .unwrap_or_else(|_| "https://api.openai.com".to_string());
        let base = base.trim_end_matches('/');
        if base.ends_with("/v1") {
            format!("{}/chat/completions", base)
        } else {
            format!("{}/v1/chat/completions", base)
        }
    }

    fn request_messages(system_prompt: &str, prompt: &str) -> Vec<ChatCompletionRequestMessage> {
        vec![
            ChatCompletionRequestMessage::System(ChatCompletionRequestSystemMessage::from(
                system_prompt,
            )),
            ChatCompletionRequestMessage::User(ChatCompletionRequestUserMessage::from(prompt)),
        ]
    }

    fn build_request(
        &self,
        system_prompt: &str,
        prompt: &str,
        stream: bool,
    ) -> Result<async_openai::types::chat::CreateChatCompletionRequest, LlmError> {
        let mut args = CreateChatCompletionRequestArgs::default();
        args.model(self.model.clone());
        args.messages(Self::request_messages(system_prompt, prompt));
        if stream {
            args.stream(true);
        }
        if let Some(t) = self.temperature {
            args.temperature(t);
        }
        args.build()
            .map_err(|e| LlmError::InvalidRequest(e.to_string()))
    }
}

#[async_trait]
impl LlmClient for ChatOpenAI {
    async fn invoke(&self, prompt: &str) -> Result<String, LlmError> {
        let request = self.build_request(&self.system_prompt, prompt, false)?;

        let url = Self::chat_completions_url();
        debug!(
            url = %url,
            model = %self.model,
            prompt_len = prompt.len(),
            temperature = ?self.temperature,
            "chat completion create"
        );
        trace!(url = %url, prompt = %prompt, "chat completion request body");

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| LlmError::Api(e.to_string()))?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or(LlmError::EmptyResponse)?;
        let content = choice.message.content.unwrap_or_default();
        trace!(url = %url, response = %content, "chat completion response");
        Ok(content)
    }

    /// Streaming variant: forwards each content delta as a [`ChatChunk`].
    async fn invoke_stream(
        &self,
        prompt: &str,
        system_prompt: &str,
        chunk_tx: Option<mpsc::Sender<ChatChunk>>,
    ) -> Result<String, LlmError> {
        // Without a sink there is nothing to stream to; one non-streaming
        // call with the caller's system prompt yields the same reply.
        let Some(chunk_tx) = chunk_tx else {
            let request = self.build_request(system_prompt, prompt, false)?;
            let response = self
                .client
                .chat()
                .create(request)
                .await
                .map_err(|e| LlmError::Api(e.to_string()))?;
            let choice = response
                .choices
                .into_iter()
                .next()
                .ok_or(LlmError::EmptyResponse)?;
            return Ok(choice.message.content.unwrap_or_default());
        };

        let request = self.build_request(system_prompt, prompt, true)?;

        let url = Self::chat_completions_url();
        debug!(
            url = %url,
            model = %self.model,
            prompt_len = prompt.len(),
            stream = true,
            "chat completion create_stream"
        );

        let mut stream = self
            .client
            .chat()
            .create_stream(request)
            .await
            .map_err(|e| LlmError::Api(e.to_string()))?;

        let mut full_content = String::new();
        // Track whether any delta carried text; some proxies send content
        // only in the final payload, so we fall back to one chunk at the end.
        let mut sent_any_content = false;

        while let Some(result) = stream.next().await {
            let response = result.map_err(|e| LlmError::Api(e.to_string()))?;
            for choice in response.choices {
                if let Some(ref content) = choice.delta.content {
                    if !content.is_empty() {
                        full_content.push_str(content);
                        sent_any_content = true;
                        let _ = chunk_tx
                            .send(ChatChunk {
                                content: content.clone(),
                            })
                            .await;
                    }
                }
            }
        }

        if !sent_any_content && !full_content.is_empty() {
            let _ = chunk_tx
                .send(ChatChunk {
                    content: full_content.clone(),
                })
                .await;
        }

        trace!(url = %url, response = %full_content, "chat completion stream response");
        Ok(full_content)
    }
}
