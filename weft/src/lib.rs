//! # Weft
//!
//! A graph-based execution engine for multi-step LLM pipelines, with a
//! simple **context-in, context-out** design: one ordered variable bag flows
//! through named nodes, and after every node the engine resolves which node
//! runs next.
//!
//! ## Design principles
//!
//! - **Single context type**: every node reads from and writes to one
//!   [`Context`] of dynamically-typed variables.
//! - **Explicit routing intent**: nodes return `(Context, Next)`; a routing
//!   override travels in the return value, never as a reserved key in the
//!   data, so it is consumed by construction.
//! - **Strict routing priority**: returned override, then the node's
//!   dynamic selector, then its static successor, then list order — branchy
//!   nodes win over static wiring, while plain linear pipelines need no
//!   wiring at all.
//! - **Recursive composition**: [`SubWorkflowNode`] and [`IterativeNode`]
//!   are ordinary nodes that drive a nested [`Workflow`] to completion, so
//!   workflows nest to any depth.
//!
//! ## Features
//!
//! - **Routing engine**: [`Workflow`] with override / selector / static /
//!   sequential resolution and `run_from` entry points.
//! - **Content-based branching**: [`ConditionalBranchNode`] classifies
//!   context content through an injected [`LlmClient`] and routes per class,
//!   with a default-class recovery path.
//! - **Structured extraction**: [`JsonExtractor`] pulls the first balanced
//!   JSON object out of free-form model replies, optionally validated
//!   against a JSON Schema, with a fail-or-default policy.
//! - **Bounded iteration**: [`IterativeNode`] with continuation predicate,
//!   round limit, iteration variable mapping, and replace / append / merge
//!   result collection.
//! - **LLM integration**: [`LlmClient`] trait with [`MockLlm`] and the
//!   OpenAI-compatible [`ChatOpenAI`] (DeepSeek included), plus chunked
//!   streaming through an mpsc sink.
//! - **Interactive input**: [`InputNode`] over a [`Console`] seam with
//!   defaults and validation.
//!
//! ## Main modules
//!
//! - [`graph`]: [`Workflow`], [`Node`], [`Next`] — build and run pipelines.
//! - [`nodes`]: built-in nodes ([`StartNode`], [`EndNode`], [`LlmNode`],
//!   [`InputNode`], [`JsonExtractorNode`], [`ConditionalBranchNode`],
//!   [`SubWorkflowNode`], [`IterativeNode`]).
//! - [`context`]: [`Context`] and [`Value`].
//! - [`extract`]: [`JsonExtractor`] and the balanced-object scanner.
//! - [`llm`]: [`LlmClient`], [`MockLlm`], [`ChatOpenAI`], [`ChatChunk`].
//! - [`prompts`]: [`PromptTemplate`] with `{placeholder}` substitution.
//! - [`console`]: [`Console`], [`StdConsole`], [`ScriptedConsole`].
//! - [`config`]: [`LlmSettings`] resolved from the environment.
//! - [`error`]: [`WorkflowError`]; build-time failures in
//!   [`graph::BuildError`].
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use weft::llm::MockLlm;
//! use weft::nodes::{EndNode, LlmNode, StartNode};
//! use weft::{Context, Workflow};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let llm = Arc::new(MockLlm::fixed("Rust is a systems language."));
//!
//! let workflow = Workflow::new(vec![
//!     Arc::new(StartNode::new("start", "Start", ["question"])),
//!     Arc::new(LlmNode::new(
//!         "answer",
//!         "Answer",
//!         "Answer the question: {question}",
//!         "answer",
//!         llm,
//!     )),
//!     Arc::new(EndNode::new("end", "End", ["answer"])),
//! ])?;
//!
//! let initial = Context::new().with("question", "What is Rust?");
//! let final_context = workflow.run(initial).await?;
//! println!("{:?}", final_context.get_str("answer"));
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod console;
pub mod context;
pub mod error;
pub mod extract;
pub mod graph;
pub mod llm;
pub mod nodes;
pub mod prompts;

pub use config::LlmSettings;
pub use console::{Console, ScriptedConsole, StdConsole};
pub use context::{Context, Value};
pub use error::WorkflowError;
pub use extract::JsonExtractor;
pub use graph::{BuildError, Next, Node, RouterFn, Workflow};
pub use llm::{ChatChunk, ChatOpenAI, LlmClient, LlmError, MockLlm};
pub use nodes::{
    ClassDefinition, CollectMode, ConditionalBranchNode, EndNode, InputNode, IterativeNode,
    JsonExtractorNode, LlmNode, StartNode, SubWorkflowNode,
};
pub use prompts::PromptTemplate;
