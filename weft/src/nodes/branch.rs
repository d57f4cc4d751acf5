//! Conditional branch node: classify context content with an LLM and route
//! to the class's next node.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use crate::context::{Context, Value};
use crate::error::WorkflowError;
use crate::extract::JsonExtractor;
use crate::graph::{BuildError, Next, Node};
use crate::llm::LlmClient;
use crate::prompts::value_to_text;

/// Variable the classification result is stored under unless overridden.
pub const DEFAULT_OUTPUT_VARIABLE: &str = "classification_result";

const CLASSIFICATION_PROMPT: &str = "\
You are a precise text classifier. Assign the input to exactly one of the \
following classes:

{class_definitions}

Reply with a JSON object containing these fields:
- class_name: the chosen class name
- confidence: a number between 0 and 1
- reason: a short justification for the choice

Input: {input_text}
";

/// One classification rule: class name, description for the model, the node
/// to route to, and optional example utterances.
#[derive(Clone, Debug)]
pub struct ClassDefinition {
    pub name: String,
    pub description: String,
    pub next_node_id: String,
    pub examples: Vec<String>,
}

impl ClassDefinition {
    /// Creates a rule without examples.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        next_node_id: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            next_node_id: next_node_id.into(),
            examples: Vec::new(),
        }
    }

    /// Adds example utterances shown to the model.
    pub fn with_examples<I, S>(mut self, examples: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.examples = examples.into_iter().map(Into::into).collect();
        self
    }
}

/// Shape of a classification reply: required class name, optional
/// confidence and reason.
fn classification_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "class_name": {"type": "string"},
            "confidence": {"type": "number", "minimum": 0, "maximum": 1},
            "reason": {"type": "string"}
        },
        "required": ["class_name"]
    })
}

/// Content-based branch: an injected classifier maps the input variable to
/// one of a fixed set of classes, each bound to a next node.
///
/// The extracted classification object is written to the output variable and
/// routing is emitted as `Next::Node(class.next_node_id)`, overriding all
/// static wiring. With a default class configured, every failure along the
/// way — model error, extraction failure, unknown class — recovers by
/// emitting the default class's result and route instead of propagating.
pub struct ConditionalBranchNode {
    id: String,
    name: String,
    classes: Vec<ClassDefinition>,
    class_index: HashMap<String, usize>,
    input_variable: String,
    client: Arc<dyn LlmClient>,
    default_class: Option<ClassDefinition>,
    output_reason: bool,
    output_variable: String,
}

impl ConditionalBranchNode {
    /// Creates a branch node. Fails when the class list is empty or class
    /// names collide.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        classes: Vec<ClassDefinition>,
        input_variable: impl Into<String>,
        client: Arc<dyn LlmClient>,
    ) -> Result<Self, BuildError> {
        let id = id.into();
        if classes.is_empty() {
            return Err(BuildError::InvalidNode {
                node: id,
                reason: "classes list cannot be empty".into(),
            });
        }
        let mut class_index = HashMap::with_capacity(classes.len());
        for (idx, class) in classes.iter().enumerate() {
            if class_index.insert(class.name.clone(), idx).is_some() {
                return Err(BuildError::InvalidNode {
                    node: id,
                    reason: format!("duplicate class name '{}'", class.name),
                });
            }
        }
        Ok(Self {
            id,
            name: name.into(),
            classes,
            class_index,
            input_variable: input_variable.into(),
            client,
            default_class: None,
            output_reason: false,
            output_variable: DEFAULT_OUTPUT_VARIABLE.to_string(),
        })
    }

    /// Fallback rule used when classification cannot determine a class.
    pub fn with_default_class(mut self, class: ClassDefinition) -> Self {
        self.default_class = Some(class);
        self
    }

    /// Also write the model's reason to `<output_variable>_reason`.
    pub fn with_output_reason(mut self) -> Self {
        self.output_reason = true;
        self
    }

    /// Variable to store the classification result under.
    pub fn with_output_variable(mut self, variable: impl Into<String>) -> Self {
        self.output_variable = variable.into();
        self
    }

    fn class_definitions_text(&self) -> String {
        self.classes
            .iter()
            .enumerate()
            .map(|(i, class)| {
                let mut definition = format!("{}. {}: {}", i + 1, class.name, class.description);
                if !class.examples.is_empty() {
                    let examples = class
                        .examples
                        .iter()
                        .map(|e| format!("\"{e}\""))
                        .collect::<Vec<_>>()
                        .join(", ");
                    definition.push_str(&format!("\n   Examples: {examples}"));
                }
                definition
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    fn classification_prompt(&self, input_text: &str) -> String {
        CLASSIFICATION_PROMPT
            .replace("{class_definitions}", &self.class_definitions_text())
            .replace("{input_text}", input_text)
    }

    /// Classifies the input and resolves the route. Any error here is
    /// recoverable through the default class in `run`.
    async fn classify(&self, input_text: &str) -> Result<(Value, String), WorkflowError> {
        let prompt = self.classification_prompt(input_text);
        let response =
            self.client
                .invoke(&prompt)
                .await
                .map_err(|source| WorkflowError::LlmCall {
                    node: self.id.clone(),
                    source,
                })?;

        let mut extractor = JsonExtractor::new().with_schema(classification_schema());
        if let Some(default) = &self.default_class {
            extractor = extractor
                .with_default(json!({
                    "class_name": default.name,
                    "confidence": 0,
                    "reason": "failed to extract a valid classification"
                }))
                .with_raise_on_error(false);
        }
        let classification = extractor.extract(&response)?;

        let class_name = classification
            .get("class_name")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        // The extracted object is kept even when routing falls back to the
        // default class for an unknown name.
        let next_id = match self.class_index.get(&class_name) {
            Some(&idx) => self.classes[idx].next_node_id.clone(),
            None => match &self.default_class {
                Some(default) => {
                    tracing::debug!(
                        node_id = %self.id,
                        class_name = %class_name,
                        default = %default.name,
                        "unknown class, routing to default"
                    );
                    default.next_node_id.clone()
                }
                None => {
                    return Err(WorkflowError::UnknownClass {
                        node: self.id.clone(),
                        class_name,
                    })
                }
            },
        };

        Ok((classification, next_id))
    }

    fn write_result(&self, ctx: &mut Context, classification: Value) {
        if self.output_reason {
            if let Some(reason) = classification.get("reason").and_then(Value::as_str) {
                ctx.insert(format!("{}_reason", self.output_variable), reason.to_string());
            }
        }
        ctx.insert(self.output_variable.clone(), classification);
    }
}

#[async_trait]
impl Node for ConditionalBranchNode {
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
        let input_text = value_to_text(input);

        match self.classify(&input_text).await {
            Ok((classification, next_id)) => {
                self.write_result(&mut ctx, classification);
                Ok((ctx, Next::Node(next_id)))
            }
            Err(error) => match &self.default_class {
                Some(default) => {
                    tracing::warn!(
                        node_id = %self.id,
                        %error,
                        default = %default.name,
                        "classification failed, using default class"
                    );
                    let classification = json!({
                        "class_name": default.name,
                        "confidence": 0,
                        "reason": format!("classification failed: {error}")
                    });
                    self.write_result(&mut ctx, classification);
                    Ok((ctx, Next::Node(default.next_node_id.clone())))
                }
                None => Err(error),
            },
        }
    }
}
