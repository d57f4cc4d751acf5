//! JSON extraction as a pipeline node.

use async_trait::async_trait;

use crate::context::{Context, Value};
use crate::error::WorkflowError;
use crate::extract::JsonExtractor;
use crate::graph::{Next, Node};
use crate::prompts::value_to_text;

/// Extracts the first balanced JSON object from a text variable.
///
/// Reads the input variable (non-string values are rendered to their JSON
/// text first), runs the [`JsonExtractor`] policy over it, and writes the
/// result to the output variable.
pub struct JsonExtractorNode {
    id: String,
    name: String,
    input_variable: String,
    output_variable: String,
    extractor: JsonExtractor,
    next: Option<String>,
}

impl JsonExtractorNode {
    /// Creates an extractor node that fails on any extraction error.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        input_variable: impl Into<String>,
        output_variable: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            input_variable: input_variable.into(),
            output_variable: output_variable.into(),
            extractor: JsonExtractor::new(),
            next: None,
        }
    }

    /// Validates extracted values against a JSON Schema.
    pub fn with_schema(mut self, schema: Value) -> Self {
        self.extractor = self.extractor.with_schema(schema);
        self
    }

    /// Value stored on failure when not raising.
    pub fn with_default(mut self, value: Value) -> Self {
        self.extractor = self.extractor.with_default(value);
        self
    }

    /// When false, failures store the default value instead of aborting.
    pub fn with_raise_on_error(mut self, raise: bool) -> Self {
        self.extractor = self.extractor.with_raise_on_error(raise);
        self
    }

    /// Static successor.
    pub fn with_next(mut self, next: impl Into<String>) -> Self {
        self.next = Some(next.into());
        self
    }
}

#[async_trait]
impl Node for JsonExtractorNode {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, mut ctx: Context) -> Result<(Context, Next), WorkflowError> {
        let Some(input) = ctx.get(&self.input_variable) else {
            return Err(WorkflowError::MissingVariable {
                node: self.id.clone(),
                variable: self.input_variable.clone(),
            });
        };
        let text = value_to_text(input);
        let extracted = self.extractor.extract(&text)?;
        ctx.insert(self.output_variable.clone(), extracted);
        Ok((ctx, Next::Continue))
    }

    fn next_id(&self) -> Option<&str> {
        self.next.as_deref()
    }
}
