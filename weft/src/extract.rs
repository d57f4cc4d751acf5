//! Structured-data extraction: pull the first balanced JSON object out of
//! free-form text.
//!
//! Model replies routinely wrap a JSON payload in prose. A plain
//! first-`{`-to-last-`}` slice breaks as soon as the text holds two objects,
//! so the scanner counts brace depth from the first `{` and stops where the
//! depth returns to zero; nested objects and trailing prose are tolerated.
//! The counter is byte-level and does not special-case braces inside string
//! literals.

use jsonschema::JSONSchema;

use crate::context::Value;
use crate::error::WorkflowError;

/// Returns the first balanced `{...}` candidate in `text`, or `None` when
/// there is no opening brace or no depth-zero closing brace (truncated
/// input).
pub fn find_balanced_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    for (offset, byte) in text[start..].bytes().enumerate() {
        match byte {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Extraction policy: optional shape, optional default, fail-or-default on
/// error.
///
/// `extract` parses the first balanced object in the input. On any failure
/// (no object, truncated input, parse error, shape mismatch) it either
/// fails with [`WorkflowError::Extraction`] or returns the configured
/// default (null when none is set), per `raise_on_error`. The outcome is
/// deterministic: repeated calls on the same input behave identically.
#[derive(Debug, Clone, Default)]
pub struct JsonExtractor {
    schema: Option<Value>,
    default_value: Option<Value>,
    raise_on_error: bool,
}

impl JsonExtractor {
    /// Creates an extractor that fails on any extraction error.
    pub fn new() -> Self {
        Self {
            schema: None,
            default_value: None,
            raise_on_error: true,
        }
    }

    /// Validates extracted values against a JSON Schema; shape mismatches
    /// follow the same fail-or-default policy as parse failures.
    pub fn with_schema(mut self, schema: Value) -> Self {
        self.schema = Some(schema);
        self
    }

    /// Value returned on failure when not raising. Defaults to null.
    pub fn with_default(mut self, value: Value) -> Self {
        self.default_value = Some(value);
        self
    }

    /// When false, failures return the default value instead of an error.
    pub fn with_raise_on_error(mut self, raise: bool) -> Self {
        self.raise_on_error = raise;
        self
    }

    /// Extracts the first balanced JSON object from `text`.
    pub fn extract(&self, text: &str) -> Result<Value, WorkflowError> {
        if !text.contains('{') {
            return self.fallback("no JSON object found in the input text".to_string());
        }
        let Some(candidate) = find_balanced_object(text) else {
            return self.fallback("no complete JSON object found in the input text".to_string());
        };

        let value: Value = match serde_json::from_str(candidate) {
            Ok(v) => v,
            Err(e) => return self.fallback(format!("invalid JSON: {e}")),
        };

        if let Some(schema) = &self.schema {
            let compiled = match JSONSchema::compile(schema) {
                Ok(c) => c,
                Err(e) => return self.fallback(format!("invalid schema: {e}")),
            };
            let validation = compiled.validate(&value);
            if let Err(errors) = validation {
                let reasons: Vec<String> = errors.map(|e| e.to_string()).collect();
                return self.fallback(format!(
                    "schema validation failed: {}",
                    reasons.join("; ")
                ));
            }
        }

        Ok(value)
    }

    fn fallback(&self, reason: String) -> Result<Value, WorkflowError> {
        if self.raise_on_error {
            Err(WorkflowError::Extraction { reason })
        } else {
            tracing::debug!(%reason, "extraction failed, using default value");
            Ok(self.default_value.clone().unwrap_or(Value::Null))
        }
    }
}
