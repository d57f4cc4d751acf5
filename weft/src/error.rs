//! Workflow execution error types.
//!
//! Returned by `Node::run` and `Workflow::run`. Steps never swallow failures
//! except where a recovery path is explicit (branch default class, extractor
//! default value); everything else propagates to the run caller.

use thiserror::Error;

use crate::llm::LlmError;

/// Runtime error raised while executing a workflow.
///
/// Sub-workflow and iterative nodes re-wrap inner failures with their own
/// node id for traceability (`Subworkflow`, `Iteration`) but do not suppress
/// them. There is no retry anywhere in the core; retry, if desired, belongs
/// around the whole `Workflow::run` call.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// A node's required input variable is absent from the context.
    #[error("node '{node}': required variable '{variable}' not found in context")]
    MissingVariable { node: String, variable: String },

    /// A node routed to a node id that does not exist in the workflow.
    #[error("node '{node}': next node '{target}' not found in workflow")]
    UnknownNode { node: String, target: String },

    /// No parseable (or shape-valid) JSON object was found in the input text.
    #[error("json extraction failed: {reason}")]
    Extraction { reason: String },

    /// A classification named a class with no matching rule and no default
    /// class is configured.
    #[error("node '{node}': unknown class '{class_name}' and no default class configured")]
    UnknownClass { node: String, class_name: String },

    /// An injected LLM capability failed.
    #[error("node '{node}': llm call failed: {source}")]
    LlmCall {
        node: String,
        #[source]
        source: LlmError,
    },

    /// Reading interactive input failed.
    #[error("node '{node}': input read failed: {source}")]
    Input {
        node: String,
        #[source]
        source: std::io::Error,
    },

    /// A nested workflow run inside a sub-workflow node failed.
    #[error("subworkflow node '{node}' failed: {source}")]
    Subworkflow {
        node: String,
        #[source]
        source: Box<WorkflowError>,
    },

    /// A round of an iterative node's embedded workflow failed. Progress from
    /// prior completed rounds is discarded.
    #[error("iterative node '{node}' failed at round {round}: {source}")]
    Iteration {
        node: String,
        round: usize,
        #[source]
        source: Box<WorkflowError>,
    },
}
