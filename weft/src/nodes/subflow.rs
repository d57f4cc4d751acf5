//! Sub-workflow node: embed an entire workflow as a single node, remapping
//! variables at both boundaries.

use async_trait::async_trait;
use indexmap::IndexMap;

use crate::context::Context;
use crate::error::WorkflowError;
use crate::graph::{BuildError, Next, Node, Workflow};

/// Runs a nested [`Workflow`] to completion inside one node step.
///
/// The inner run sees only the variables named in the input mapping (renamed
/// per the mapping); afterwards the outer context is updated from the inner
/// one per the output mapping. Missing variables on either side are skipped
/// with a warning, not a failure. The nested run may itself contain
/// sub-workflow or iterative nodes; composition is recursive.
///
/// An inner failure propagates wrapped as `WorkflowError::Subworkflow` with
/// this node's id.
pub struct SubWorkflowNode {
    id: String,
    name: String,
    workflow: Workflow,
    /// outer variable -> inner variable
    input_mapping: IndexMap<String, String>,
    /// inner variable -> outer variable
    output_mapping: IndexMap<String, String>,
    entry_node_id: Option<String>,
    /// Advisory only: the inner run still terminates via the ordinary
    /// no-successor rule, whatever node it stops at.
    exit_node_id: Option<String>,
    next: Option<String>,
}

impl SubWorkflowNode {
    /// Creates a sub-workflow node with empty mappings.
    pub fn new(id: impl Into<String>, name: impl Into<String>, workflow: Workflow) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            workflow,
            input_mapping: IndexMap::new(),
            output_mapping: IndexMap::new(),
            entry_node_id: None,
            exit_node_id: None,
            next: None,
        }
    }

    /// Maps outer variables into the inner context: `{outer -> inner}`.
    pub fn with_input_mapping<I, K, V>(mut self, mapping: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.input_mapping = mapping
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self
    }

    /// Maps inner results back out: `{inner -> outer}`.
    pub fn with_output_mapping<I, K, V>(mut self, mapping: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.output_mapping = mapping
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self
    }

    /// Starts the inner run at `entry` instead of the first listed node.
    /// Fails when no such node exists in the inner workflow.
    pub fn with_entry_node(mut self, entry: impl Into<String>) -> Result<Self, BuildError> {
        let entry = entry.into();
        if !self.workflow.contains(&entry) {
            return Err(BuildError::InvalidNode {
                node: self.id,
                reason: format!("entry node '{entry}' not found in subworkflow"),
            });
        }
        self.entry_node_id = Some(entry);
        Ok(self)
    }

    /// Records the expected exit node (advisory bookkeeping; validated to
    /// exist but not enforced at runtime).
    pub fn with_exit_node(mut self, exit: impl Into<String>) -> Result<Self, BuildError> {
        let exit = exit.into();
        if !self.workflow.contains(&exit) {
            return Err(BuildError::InvalidNode {
                node: self.id,
                reason: format!("exit node '{exit}' not found in subworkflow"),
            });
        }
        self.exit_node_id = Some(exit);
        Ok(self)
    }

    /// Static successor in the outer workflow.
    pub fn with_next(mut self, next: impl Into<String>) -> Self {
        self.next = Some(next.into());
        self
    }

    /// The advisory exit node id, when configured.
    pub fn exit_node_id(&self) -> Option<&str> {
        self.exit_node_id.as_deref()
    }

    fn inner_context(&self, outer: &Context) -> Context {
        let mut inner = Context::new();
        for (outer_var, inner_var) in &self.input_mapping {
            match outer.get(outer_var) {
                Some(value) => inner.insert(inner_var.clone(), value.clone()),
                None => tracing::warn!(
                    node_id = %self.id,
                    variable = %outer_var,
                    "input variable not found in outer context"
                ),
            }
        }
        inner
    }
}

#[async_trait]
impl Node for SubWorkflowNode {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, mut ctx: Context) -> Result<(Context, Next), WorkflowError> {
        let inner = self.inner_context(&ctx);

        let result = match &self.entry_node_id {
            Some(entry) => self.workflow.run_from(entry, inner).await,
            None => self.workflow.run(inner).await,
        }
        .map_err(|e| WorkflowError::Subworkflow {
            node: self.id.clone(),
            source: Box::new(e),
        })?;

        for (inner_var, outer_var) in &self.output_mapping {
            match result.get(inner_var) {
                Some(value) => ctx.insert(outer_var.clone(), value.clone()),
                None => tracing::warn!(
                    node_id = %self.id,
                    variable = %inner_var,
                    "output variable not found in subworkflow result"
                ),
            }
        }

        Ok((ctx, Next::Continue))
    }

    fn next_id(&self) -> Option<&str> {
        self.next.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;

    use crate::context::Value;

    /// Inner node that sets `y = x + 1`.
    struct IncrementNode;

    #[async_trait]
    impl Node for IncrementNode {
        fn id(&self) -> &str {
            "increment"
        }
        async fn run(&self, mut ctx: Context) -> Result<(Context, Next), WorkflowError> {
            let x = ctx.get("x").and_then(Value::as_i64).unwrap_or_default();
            ctx.insert("y", x + 1);
            Ok((ctx, Next::Continue))
        }
    }

    fn inner_workflow() -> Workflow {
        Workflow::new(vec![Arc::new(IncrementNode)]).unwrap()
    }

    /// **Scenario**: Outer `{a: 1}` with input mapping `{a -> x}` and output
    /// mapping `{y -> b}` over an inner `y = x + 1` yields `{a: 1, b: 2}`.
    #[tokio::test]
    async fn maps_variables_across_both_boundaries() {
        let node = SubWorkflowNode::new("sub", "Sub", inner_workflow())
            .with_input_mapping([("a", "x")])
            .with_output_mapping([("y", "b")]);

        let (out, _) = node.run(Context::new().with("a", 1)).await.unwrap();

        assert_eq!(out.get("a"), Some(&Value::from(1)));
        assert_eq!(out.get("b"), Some(&Value::from(2)));
        assert!(!out.contains("x"), "inner variables must not leak out");
        assert!(!out.contains("y"), "inner variables must not leak out");
    }

    /// **Scenario**: Entry and exit node ids are validated at construction.
    #[test]
    fn entry_and_exit_nodes_are_validated() {
        let missing_entry = SubWorkflowNode::new("sub", "Sub", inner_workflow())
            .with_entry_node("nowhere");
        assert!(matches!(missing_entry, Err(BuildError::InvalidNode { .. })));

        let missing_exit =
            SubWorkflowNode::new("sub", "Sub", inner_workflow()).with_exit_node("nowhere");
        assert!(matches!(missing_exit, Err(BuildError::InvalidNode { .. })));

        let ok = SubWorkflowNode::new("sub", "Sub", inner_workflow())
            .with_entry_node("increment")
            .and_then(|n| n.with_exit_node("increment"));
        assert!(ok.is_ok());
    }

    /// **Scenario**: A missing inner output variable is skipped with a
    /// warning; the run still succeeds and the outer variable stays unset.
    #[tokio::test]
    async fn missing_inner_output_is_skipped() {
        let node = SubWorkflowNode::new("sub", "Sub", inner_workflow())
            .with_input_mapping([("a", "x")])
            .with_output_mapping([("nonexistent", "b")]);

        let (out, _) = node.run(Context::new().with("a", 1)).await.unwrap();

        assert!(!out.contains("b"));
    }
}
