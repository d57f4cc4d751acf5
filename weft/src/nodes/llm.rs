//! LLM call node: render a prompt template, invoke the model, store the reply.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::context::Context;
use crate::error::WorkflowError;
use crate::graph::{Next, Node};
use crate::llm::{ChatChunk, LlmClient, DEFAULT_SYSTEM_PROMPT};
use crate::prompts::PromptTemplate;

/// Calls an injected [`LlmClient`] with a rendered prompt.
///
/// Every `{placeholder}` in the template must be present in the context;
/// the first missing one fails the node with `MissingVariable`. The reply is
/// written to the output variable. With a chunk sink configured, the call
/// streams: each fragment is forwarded to the sink as it arrives and the
/// concatenation becomes the stored value.
pub struct LlmNode {
    id: String,
    name: String,
    template: PromptTemplate,
    output_variable: String,
    client: Arc<dyn LlmClient>,
    system_prompt: String,
    chunk_tx: Option<mpsc::Sender<ChatChunk>>,
    next: Option<String>,
}

impl LlmNode {
    /// Creates an LLM node from a `{placeholder}` prompt template.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        template: impl Into<String>,
        output_variable: impl Into<String>,
        client: Arc<dyn LlmClient>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            template: PromptTemplate::new(template),
            output_variable: output_variable.into(),
            client,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            chunk_tx: None,
            next: None,
        }
    }

    /// System prompt for the streaming call path.
    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = system_prompt.into();
        self
    }

    /// Stream reply fragments to `chunk_tx` as they arrive.
    pub fn with_streaming(mut self, chunk_tx: mpsc::Sender<ChatChunk>) -> Self {
        self.chunk_tx = Some(chunk_tx);
        self
    }

    /// Static successor.
    pub fn with_next(mut self, next: impl Into<String>) -> Self {
        self.next = Some(next.into());
        self
    }

    /// Placeholder names the template requires.
    pub fn input_variables(&self) -> &[String] {
        self.template.variables()
    }
}

#[async_trait]
impl Node for LlmNode {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, mut ctx: Context) -> Result<(Context, Next), WorkflowError> {
        if let Some(variable) = self.template.first_missing(&ctx) {
            return Err(WorkflowError::MissingVariable {
                node: self.id.clone(),
                variable: variable.to_string(),
            });
        }
        let prompt = self.template.render(&ctx);
        tracing::debug!(node_id = %self.id, prompt_len = prompt.len(), "invoking llm");

        let reply = match &self.chunk_tx {
            Some(tx) => {
                self.client
                    .invoke_stream(&prompt, &self.system_prompt, Some(tx.clone()))
                    .await
            }
            None => self.client.invoke(&prompt).await,
        }
        .map_err(|source| WorkflowError::LlmCall {
            node: self.id.clone(),
            source,
        })?;

        ctx.insert(self.output_variable.clone(), reply);
        Ok((ctx, Next::Continue))
    }

    fn next_id(&self) -> Option<&str> {
        self.next.as_deref()
    }
}
