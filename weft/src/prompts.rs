//! Prompt templates with `{placeholder}` substitution.
//!
//! Placeholder names are extracted once at construction; rendering reads the
//! named variables from a [`Context`]. String values render raw, everything
//! else renders as its JSON text.

use regex::Regex;

use crate::context::{Context, Value};

/// Pattern for `{placeholder}` names: letters, digits, underscores.
const PLACEHOLDER_PATTERN: &str = r"\{([A-Za-z0-9_]+)\}";

/// Renders a [`Value`] for inclusion in a prompt: strings verbatim, other
/// shapes as JSON text.
pub fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// A prompt template with named placeholders.
///
/// **Interaction**: Used by [`LlmNode`](crate::nodes::LlmNode); the node
/// checks [`first_missing`](Self::first_missing) before rendering so missing
/// variables surface as `MissingVariable` with the node's id.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    template: String,
    variables: Vec<String>,
}

impl PromptTemplate {
    /// Parses a template, recording each distinct placeholder name in order
    /// of first appearance.
    pub fn new(template: impl Into<String>) -> Self {
        let template = template.into();
        let pattern = Regex::new(PLACEHOLDER_PATTERN).expect("placeholder pattern is valid");
        let mut variables: Vec<String> = Vec::new();
        for captures in pattern.captures_iter(&template) {
            let name = &captures[1];
            if !variables.iter().any(|v| v == name) {
                variables.push(name.to_string());
            }
        }
        Self {
            template,
            variables,
        }
    }

    /// Placeholder names, in order of first appearance.
    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    /// First placeholder with no value in `ctx`, if any.
    pub fn first_missing(&self, ctx: &Context) -> Option<&str> {
        self.variables
            .iter()
            .find(|name| !ctx.contains(name))
            .map(String::as_str)
    }

    /// Substitutes context values into the template. Placeholders without a
    /// value are left as-is; call [`first_missing`](Self::first_missing)
    /// first to reject those.
    pub fn render(&self, ctx: &Context) -> String {
        let mut out = self.template.clone();
        for name in &self.variables {
            if let Some(value) = ctx.get(name) {
                out = out.replace(&format!("{{{name}}}"), &value_to_text(value));
            }
        }
        out
    }
}
