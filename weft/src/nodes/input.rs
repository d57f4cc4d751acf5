//! Interactive input node: pause the run for one line from a human.

use std::sync::Arc;

use async_trait::async_trait;

use crate::console::Console;
use crate::context::Context;
use crate::error::WorkflowError;
use crate::graph::{Next, Node};

/// Validation predicate for an input line.
pub type ValidatorFn = Arc<dyn Fn(&str) -> bool + Send + Sync>;

const RETRY_PROMPT: &str = "Invalid input, please try again.";

/// Blocks for one line of operator input.
///
/// Shows the prompt, reads a line, substitutes the default when the line is
/// empty and one is configured, and re-prompts while the validator rejects
/// the value. The accepted value is written to the output variable as a
/// string.
pub struct InputNode {
    id: String,
    name: String,
    prompt_text: String,
    output_variable: String,
    console: Arc<dyn Console>,
    default_value: Option<String>,
    validator: Option<ValidatorFn>,
    next: Option<String>,
}

impl InputNode {
    /// Creates an input node reading one line through `console`.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        prompt_text: impl Into<String>,
        output_variable: impl Into<String>,
        console: Arc<dyn Console>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            prompt_text: prompt_text.into(),
            output_variable: output_variable.into(),
            console,
            default_value: None,
            validator: None,
            next: None,
        }
    }

    /// Value used when the operator submits an empty line.
    pub fn with_default(mut self, value: impl Into<String>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    /// Predicate the (possibly defaulted) value must satisfy; rejected
    /// values trigger a re-prompt.
    pub fn with_validator(mut self, validator: ValidatorFn) -> Self {
        self.validator = Some(validator);
        self
    }

    /// Static successor.
    pub fn with_next(mut self, next: impl Into<String>) -> Self {
        self.next = Some(next.into());
        self
    }

    fn io_error(&self, source: std::io::Error) -> WorkflowError {
        WorkflowError::Input {
            node: self.id.clone(),
            source,
        }
    }
}

#[async_trait]
impl Node for InputNode {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, mut ctx: Context) -> Result<(Context, Next), WorkflowError> {
        self.console
            .prompt(&self.prompt_text)
            .map_err(|e| self.io_error(e))?;

        let accepted = loop {
            let line = self.console.read_line().map_err(|e| self.io_error(e))?;
            let value = if line.is_empty() {
                match &self.default_value {
                    Some(default) => {
                        tracing::debug!(node_id = %self.id, default, "using default input value");
                        default.clone()
                    }
                    None => line,
                }
            } else {
                line
            };

            match &self.validator {
                Some(validator) if !validator(&value) => {
                    self.console
                        .prompt(RETRY_PROMPT)
                        .map_err(|e| self.io_error(e))?;
                }
                _ => break value,
            }
        };

        ctx.insert(self.output_variable.clone(), accepted);
        Ok((ctx, Next::Continue))
    }

    fn next_id(&self) -> Option<&str> {
        self.next.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::ScriptedConsole;

    /// **Scenario**: A plain line is written to the output variable and the
    /// rest of the context is preserved.
    #[tokio::test]
    async fn writes_line_to_output_variable() {
        let console = Arc::new(ScriptedConsole::new(["blue"]));
        let node = InputNode::new("ask", "Ask", "Favorite color?", "color", console.clone());
        let ctx = Context::new().with("existing", 1);

        let (out, next) = node.run(ctx).await.unwrap();

        assert_eq!(out.get_str("color"), Some("blue"));
        assert!(out.contains("existing"));
        assert_eq!(next, Next::Continue);
        assert_eq!(console.prompts(), vec!["Favorite color?".to_string()]);
    }

    /// **Scenario**: Empty input with a configured default uses the default.
    #[tokio::test]
    async fn empty_line_uses_default() {
        let console = Arc::new(ScriptedConsole::new([""]));
        let node = InputNode::new("ask", "Ask", "Color?", "color", console)
            .with_default("green");

        let (out, _) = node.run(Context::new()).await.unwrap();
        assert_eq!(out.get_str("color"), Some("green"));
    }

    /// **Scenario**: Rejected input re-prompts until the validator accepts.
    #[tokio::test]
    async fn rejected_input_reprompts() {
        let console = Arc::new(ScriptedConsole::new(["nope", "also nope", "7"]));
        let node = InputNode::new("ask", "Ask", "A digit?", "digit", console.clone())
            .with_validator(Arc::new(|s| s.chars().all(|c| c.is_ascii_digit())));

        let (out, _) = node.run(Context::new()).await.unwrap();

        assert_eq!(out.get_str("digit"), Some("7"));
        // Initial prompt plus one retry prompt per rejection.
        assert_eq!(console.prompts().len(), 3);
    }

    /// **Scenario**: Empty input with no default is still validated (and
    /// accepted when there is no validator).
    #[tokio::test]
    async fn empty_line_without_default_is_kept() {
        let console = Arc::new(ScriptedConsole::new([""]));
        let node = InputNode::new("ask", "Ask", "Anything?", "answer", console);
        let (out, _) = node.run(Context::new()).await.unwrap();
        assert_eq!(out.get_str("answer"), Some(""));
    }

    /// **Scenario**: Exhausted input surfaces as an Input error naming the node.
    #[tokio::test]
    async fn exhausted_input_is_an_input_error() {
        let console = Arc::new(ScriptedConsole::new(Vec::<String>::new()));
        let node = InputNode::new("ask", "Ask", "Anything?", "answer", console);
        let err = node.run(Context::new()).await.unwrap_err();
        assert!(matches!(err, WorkflowError::Input { node, .. } if node == "ask"));
    }
}
