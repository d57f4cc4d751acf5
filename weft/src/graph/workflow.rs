//! Workflow: an ordered node list plus routing tables, built once and
//! immutable, with the run loop that resolves "what runs next" after every
//! node.
//!
//! # Routing
//!
//! After each node the successor is resolved in strict priority order:
//!
//! 1. the node's returned [`Next`]: `Node(id)` overrides everything,
//!    `End` stops the run;
//! 2. the node's dynamic selector ([`Node::route`]);
//! 3. the node's static successor ([`Node::next_id`]);
//! 4. the next node in the original list order.
//!
//! If nothing resolves, the run ends and the final context is returned. A
//! resolved id with no matching node fails with
//! [`WorkflowError::UnknownNode`]. Override-first lets branching nodes win
//! over static wiring while plain linear pipelines need no wiring at all.

use std::collections::HashMap;
use std::sync::Arc;

use crate::context::Context;
use crate::error::WorkflowError;

use super::build_error::BuildError;
use super::logging::{
    log_node_complete, log_node_context, log_node_start, log_workflow_complete,
    log_workflow_error, log_workflow_start,
};
use super::{Next, Node};

/// An ordered collection of nodes plus routing metadata.
///
/// Built once from a node list; immutable afterwards and reused across every
/// run (including every round of an iterative node). Nodes are shared via
/// `Arc`, so cloning a workflow is cheap.
///
/// **Interaction**: Driven top-level by callers, and nested inside
/// [`SubWorkflowNode`](crate::nodes::SubWorkflowNode) and
/// [`IterativeNode`](crate::nodes::IterativeNode), which run a private
/// workflow of their own to completion within a single node step.
#[derive(Clone)]
pub struct Workflow {
    nodes: Vec<Arc<dyn Node>>,
    by_id: HashMap<String, usize>,
    /// id -> id of the next node in list order (sequential fallback).
    seq_next: HashMap<String, String>,
}

impl Workflow {
    /// Builds a workflow from nodes in execution-fallback order.
    ///
    /// Fails on an empty list or duplicate node ids. Logs a warning (not an
    /// error) when the first node is not an entry marker; workflows are not
    /// required to type-check their entry point.
    pub fn new(nodes: Vec<Arc<dyn Node>>) -> Result<Self, BuildError> {
        if nodes.is_empty() {
            return Err(BuildError::EmptyWorkflow);
        }

        let mut by_id = HashMap::with_capacity(nodes.len());
        for (idx, node) in nodes.iter().enumerate() {
            if by_id.insert(node.id().to_string(), idx).is_some() {
                return Err(BuildError::DuplicateNodeId(node.id().to_string()));
            }
        }

        if !nodes[0].is_start() {
            tracing::warn!(
                first_node = %nodes[0].id(),
                "workflow does not start with a start node"
            );
        }

        let seq_next = nodes
            .windows(2)
            .map(|pair| (pair[0].id().to_string(), pair[1].id().to_string()))
            .collect();

        Ok(Self {
            nodes,
            by_id,
            seq_next,
        })
    }

    /// Number of nodes in the workflow.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when the workflow has no nodes. Never true for a built workflow.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// True when a node with the given id exists.
    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    /// Node ids in list order.
    pub fn node_ids(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(|n| n.id())
    }

    /// Runs the workflow from its first node.
    ///
    /// Each node receives the context by value and returns the updated one;
    /// the run ends when no successor resolves (or a node returns
    /// `Next::End`) and the final context is returned. Node failures
    /// propagate unchanged.
    pub async fn run(&self, initial: Context) -> Result<Context, WorkflowError> {
        self.run_inner(0, initial).await
    }

    /// Runs the workflow starting at `entry_id` instead of the first node.
    ///
    /// Used by sub-workflow nodes with a configured entry point, so a nested
    /// run can start mid-workflow. Fails with `UnknownNode` when the entry
    /// id does not exist.
    pub async fn run_from(
        &self,
        entry_id: &str,
        initial: Context,
    ) -> Result<Context, WorkflowError> {
        let idx = *self
            .by_id
            .get(entry_id)
            .ok_or_else(|| WorkflowError::UnknownNode {
                node: entry_id.to_string(),
                target: entry_id.to_string(),
            })?;
        self.run_inner(idx, initial).await
    }

    async fn run_inner(&self, start: usize, initial: Context) -> Result<Context, WorkflowError> {
        log_workflow_start();

        let mut node = &self.nodes[start];
        let mut ctx = initial;

        loop {
            log_node_start(node.id(), node.name());
            log_node_context(node.id(), &ctx);

            let (updated, next) = match node.run(ctx).await {
                Ok(output) => output,
                Err(e) => {
                    log_workflow_error(&e);
                    return Err(e);
                }
            };
            ctx = updated;
            log_node_complete(node.id(), &next);

            let next_id = match next {
                Next::End => None,
                Next::Node(id) => Some(id),
                Next::Continue => node
                    .route(&ctx)
                    .or_else(|| node.next_id().map(str::to_owned))
                    .or_else(|| self.seq_next.get(node.id()).cloned()),
            };

            let Some(id) = next_id else {
                log_workflow_complete();
                return Ok(ctx);
            };

            let Some(&idx) = self.by_id.get(&id) else {
                let err = WorkflowError::UnknownNode {
                    node: node.id().to_string(),
                    target: id,
                };
                log_workflow_error(&err);
                return Err(err);
            };

            tracing::debug!(from = %node.id(), to = %id, "routing");
            node = &self.nodes[idx];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use async_trait::async_trait;

    /// Node that records a visit under its own id and defers routing.
    struct VisitNode {
        id: &'static str,
        next: Option<&'static str>,
    }

    #[async_trait]
    impl Node for VisitNode {
        fn id(&self) -> &str {
            self.id
        }

        async fn run(&self, mut ctx: Context) -> Result<(Context, Next), WorkflowError> {
            let order = match ctx.get_str("order") {
                Some(prev) => format!("{prev},{}", self.id),
                None => self.id.to_string(),
            };
            ctx.insert("order", order);
            Ok((ctx, Next::Continue))
        }

        fn next_id(&self) -> Option<&str> {
            self.next
        }
    }

    /// Node that emits an explicit routing override.
    struct JumpNode {
        id: &'static str,
        to: &'static str,
    }

    #[async_trait]
    impl Node for JumpNode {
        fn id(&self) -> &str {
            self.id
        }

        async fn run(&self, ctx: Context) -> Result<(Context, Next), WorkflowError> {
            Ok((ctx, Next::Node(self.to.to_string())))
        }
    }

    fn visit(id: &'static str) -> Arc<dyn Node> {
        Arc::new(VisitNode { id, next: None })
    }

    /// **Scenario**: An empty node list fails with EmptyWorkflow.
    #[test]
    fn new_rejects_empty_node_list() {
        let result = Workflow::new(vec![]);
        assert!(matches!(result, Err(BuildError::EmptyWorkflow)));
    }

    /// **Scenario**: Two nodes with the same id fail with DuplicateNodeId.
    #[test]
    fn new_rejects_duplicate_node_ids() {
        let result = Workflow::new(vec![visit("a"), visit("a")]);
        match result {
            Err(BuildError::DuplicateNodeId(id)) => assert_eq!(id, "a"),
            other => panic!("expected DuplicateNodeId, got {:?}", other.err()),
        }
    }

    /// **Scenario**: With no wiring at all, nodes run in list order and the
    /// run ends after the last one.
    #[tokio::test]
    async fn run_follows_list_order_by_default() {
        let wf = Workflow::new(vec![visit("a"), visit("b"), visit("c")]).unwrap();
        let out = wf.run(Context::new()).await.unwrap();
        assert_eq!(out.get_str("order"), Some("a,b,c"));
    }

    /// **Scenario**: A static successor beats list order.
    #[tokio::test]
    async fn static_next_id_beats_list_order() {
        let a = Arc::new(VisitNode {
            id: "a",
            next: Some("c"),
        });
        let wf = Workflow::new(vec![a, visit("b"), visit("c")]).unwrap();
        let out = wf.run(Context::new()).await.unwrap();
        assert_eq!(out.get_str("order"), Some("a,c"));
    }

    /// **Scenario**: A returned override beats the node's static successor.
    #[tokio::test]
    async fn override_beats_static_next_id() {
        struct OverridingNode;

        #[async_trait]
        impl Node for OverridingNode {
            fn id(&self) -> &str {
                "a"
            }
            async fn run(&self, ctx: Context) -> Result<(Context, Next), WorkflowError> {
                Ok((ctx, Next::Node("c".into())))
            }
            fn next_id(&self) -> Option<&str> {
                Some("b")
            }
        }

        let wf = Workflow::new(vec![Arc::new(OverridingNode), visit("b"), visit("c")]).unwrap();
        let out = wf.run(Context::new()).await.unwrap();
        assert_eq!(out.get_str("order"), Some("c"));
    }

    /// **Scenario**: Routing to an id absent from the workflow fails with
    /// UnknownNode naming the offending node and target.
    #[tokio::test]
    async fn routing_to_unknown_id_fails() {
        let wf = Workflow::new(vec![
            Arc::new(JumpNode {
                id: "a",
                to: "nowhere",
            }),
            visit("b"),
        ])
        .unwrap();
        let err = wf.run(Context::new()).await.unwrap_err();
        match err {
            WorkflowError::UnknownNode { node, target } => {
                assert_eq!(node, "a");
                assert_eq!(target, "nowhere");
            }
            other => panic!("expected UnknownNode, got {other:?}"),
        }
    }

    /// **Scenario**: run_from starts mid-list, skipping earlier nodes.
    #[tokio::test]
    async fn run_from_starts_at_entry_node() {
        let wf = Workflow::new(vec![visit("a"), visit("b"), visit("c")]).unwrap();
        let out = wf.run_from("b", Context::new()).await.unwrap();
        assert_eq!(out.get_str("order"), Some("b,c"));
    }

    /// **Scenario**: A node returning Next::End stops the run even when later
    /// nodes follow in list order.
    #[tokio::test]
    async fn next_end_stops_mid_list() {
        struct EndingNode;

        #[async_trait]
        impl Node for EndingNode {
            fn id(&self) -> &str {
                "stop"
            }
            async fn run(&self, ctx: Context) -> Result<(Context, Next), WorkflowError> {
                Ok((ctx, Next::End))
            }
        }

        let wf = Workflow::new(vec![visit("a"), Arc::new(EndingNode), visit("b")]).unwrap();
        let out = wf.run(Context::new()).await.unwrap();
        assert_eq!(out.get_str("order"), Some("a"));
    }
}
