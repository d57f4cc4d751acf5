//! Workflow exit marker: validates final variables and stops the run.

use async_trait::async_trait;

use crate::context::Context;
use crate::error::WorkflowError;
use crate::graph::{Next, Node};

/// Exit marker node.
///
/// Checks that every expected final variable exists and returns `Next::End`,
/// so a branch routed to one of several end markers stops there instead of
/// falling through to the next listed node. Carries no successor wiring.
pub struct EndNode {
    id: String,
    name: String,
    expected: Vec<String>,
}

impl EndNode {
    /// Creates an end node expecting the given variables in the final context.
    pub fn new<I, S>(id: impl Into<String>, name: impl Into<String>, expected: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: id.into(),
            name: name.into(),
            expected: expected.into_iter().map(Into::into).collect(),
        }
    }
}

#[async_trait]
impl Node for EndNode {
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
        Ok((ctx, Next::End))
    }
}
