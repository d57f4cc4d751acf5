//! Logging helpers for workflow execution.
//!
//! Structured events for run lifecycle, per-node execution, and routing.
//! Run boundaries log at info, per-node detail at debug, failures at error.

use crate::context::Context;
use crate::error::WorkflowError;

use super::Next;

/// Log workflow run start.
pub fn log_workflow_start() {
    tracing::info!("starting workflow run");
}

/// Log workflow run completion.
pub fn log_workflow_complete() {
    tracing::info!("workflow run complete");
}

/// Log workflow run failure.
pub fn log_workflow_error(error: &WorkflowError) {
    tracing::error!(?error, "workflow run failed");
}

/// Log node execution start.
pub fn log_node_start(node_id: &str, node_name: &str) {
    tracing::debug!(node_id, node_name, "starting node");
}

/// Log the context a node is about to receive.
pub fn log_node_context(node_id: &str, ctx: &Context) {
    tracing::debug!(node_id, context = ?ctx, "node input context");
}

/// Log node completion and the routing intent it returned.
pub fn log_node_complete(node_id: &str, next: &Next) {
    tracing::debug!(node_id, ?next, "node complete");
}
