//! Built-in workflow nodes.
//!
//! Leaf nodes ([`StartNode`], [`EndNode`], [`LlmNode`], [`InputNode`],
//! [`JsonExtractorNode`]), the content-based branch
//! ([`ConditionalBranchNode`]), and the composite nodes that embed a whole
//! workflow ([`SubWorkflowNode`], [`IterativeNode`]).

mod branch;
mod end;
mod input;
mod iterate;
mod json_extractor;
mod llm;
mod start;
mod subflow;

pub use branch::{ClassDefinition, ConditionalBranchNode, DEFAULT_OUTPUT_VARIABLE};
pub use end::EndNode;
pub use input::{InputNode, ValidatorFn};
pub use iterate::{
    CollectMode, ConditionFn, IterativeNode, ITERATIONS_COMPLETED, ITERATION_COUNT,
};
pub use json_extractor::JsonExtractorNode;
pub use llm::LlmNode;
pub use start::StartNode;
pub use subflow::SubWorkflowNode;
