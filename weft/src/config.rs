//! Environment-driven LLM client settings.
//!
//! Reads provider, model, API key, and base URL from the environment (with
//! `.env` support via dotenv), following the same variable names the client
//! layer honors: `OPENAI_API_KEY`, `OPENAI_BASE_URL` / `OPENAI_API_BASE`,
//! `MODEL` / `OPENAI_MODEL`, `DEEPSEEK_API_KEY`, and `LLM_PROVIDER` to force
//! a provider explicitly.

use std::sync::Arc;

use async_openai::config::OpenAIConfig;

use crate::llm::{ChatOpenAI, LlmClient, DEEPSEEK_API_BASE};

/// Which chat completion endpoint to talk to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Provider {
    /// OpenAI (or any OpenAI-compatible base URL).
    OpenAi,
    /// DeepSeek's OpenAI-compatible endpoint.
    DeepSeek,
}

/// Resolved client settings.
#[derive(Clone, Debug)]
pub struct LlmSettings {
    pub provider: Provider,
    pub model: String,
    pub api_key: Option<String>,
    pub api_base: Option<String>,
}

impl LlmSettings {
    /// Resolves settings from the environment.
    ///
    /// Provider: `LLM_PROVIDER` (`openai` / `deepseek`) when set; otherwise
    /// DeepSeek when only `DEEPSEEK_API_KEY` is present, else OpenAI.
    /// Model: `MODEL`, then `OPENAI_MODEL`, then a per-provider default.
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();

        let forced = std::env::var("LLM_PROVIDER").ok();
        let openai_key = std::env::var("OPENAI_API_KEY").ok();
        let deepseek_key = std::env::var("DEEPSEEK_API_KEY").ok();

        let provider = match forced.as_deref() {
            Some("deepseek") => Provider::DeepSeek,
            Some(_) => Provider::OpenAi,
            None if deepseek_key.is_some() && openai_key.is_none() => Provider::DeepSeek,
            None => Provider::OpenAi,
        };

        let model = std::env::var("MODEL")
            .or_else(|_| std::env::var("OPENAI_MODEL"))
            .unwrap_or_else(|_| {
                match provider {
                    Provider::OpenAi => "gpt-4o-mini",
                    Provider::DeepSeek => "deepseek-chat",
                }
                .to_string()
            });

        let api_key = match provider {
            Provider::OpenAi => openai_key,
            Provider::DeepSeek => deepseek_key,
        };

        let api_base = std::env::var("OPENAI_BASE_URL")
            .or_else(|_| std::env::var("OPENAI_API_BASE"))
            .ok();

        Self {
            provider,
            model,
            api_key,
            api_base,
        }
    }

    /// Builds a client from these settings.
    pub fn build_client(&self) -> Arc<dyn LlmClient> {
        let mut config = OpenAIConfig::new();
        if let Some(key) = &self.api_key {
            config = config.with_api_key(key.clone());
        }
        match self.provider {
            Provider::DeepSeek => {
                config = config.with_api_base(
                    self.api_base
                        .clone()
                        .unwrap_or_else(|| DEEPSEEK_API_BASE.to_string()),
                );
            }
            Provider::OpenAi => {
                if let Some(base) = &self.api_base {
                    config = config.with_api_base(base.clone());
                }
            }
        }
        Arc::new(ChatOpenAI::with_config(config, self.model.clone()))
    }
}
