//! Workflow entry marker: validates that required initial variables exist.

use async_trait::async_trait;

use crate::context::Context;
use crate::error::WorkflowError;
use crate::graph::{Next, Node};

/// Entry marker node.
///
/// Checks that every expected variable was supplied in the initial context
/// and passes the context through unchanged. An optional static successor
/// lets a workflow start somewhere other than the second listed node.
pub struct StartNode {
    id: String,
    name: String,
    expected: Vec<String>,
    next: Option<String>,
}

impl StartNode {
    /// Creates a start node expecting the given variables in the initial context.
    pub fn new<I, S>(id: impl Into<String>, name: impl Into<String>, expected: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: id.into(),
            name: name.into(),
            expected: expected.into_iter().map(Into::into).collect(),
            next: None,
        }
    }

    /// Static successor.
    pub fn with_next(mut self, next: impl Into<String>) -> Self {
        self.next = Some(next.into());
        self
    }
}

#[async_trait]
impl Node for StartNode {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, ctx: Context) -> Result<(Context, Next), WorkflowError> {
        for variable in &self.expected {
            if !ctx.contains(variable) {
                return Err(WorkflowError::MissingVariable {
                    node: self.id.clone(),
                    variable: variable.clone(),
                });
            }
        }
        Ok((ctx, Next::Continue))
    }

    fn next_id(&self) -> Option<&str> {
        self.next.as_deref()
    }

    fn is_start(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// **Scenario**: All expected variables present — context passes through unchanged.
    #[tokio::test]
    async fn passes_context_through_when_variables_present() {
        let node = StartNode::new("start", "Start", ["user_input"]);
        let ctx = Context::new().with("user_input", "hello");
        let (out, next) = node.run(ctx.clone()).await.unwrap();
        assert_eq!(out, ctx);
        assert_eq!(next, Next::Continue);
    }

    /// **Scenario**: A missing expected variable fails with MissingVariable
    /// naming exactly that variable.
    #[tokio::test]
    async fn missing_variable_names_the_variable() {
        let node = StartNode::new("start", "Start", ["user_input", "topic"]);
        let err = node
            .run(Context::new().with("user_input", "hello"))
            .await
            .unwrap_err();
        match err {
            WorkflowError::MissingVariable { node, variable } => {
                assert_eq!(node, "start");
                assert_eq!(variable, "topic");
            }
            other => panic!("expected MissingVariable, got {other:?}"),
        }
    }

    /// **Scenario**: A configured successor is exposed as the static next id.
    #[test]
    fn configured_successor_is_static_next() {
        let node = StartNode::new("start", "Start", Vec::<String>::new()).with_next("classify");
        assert_eq!(node.next_id(), Some("classify"));
        assert!(node.is_start());
    }
}
