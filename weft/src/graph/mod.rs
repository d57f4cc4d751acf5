//! Workflow graph: node trait, routing, and the run loop.
//!
//! Build a [`Workflow`] from an ordered node list, then `run` it with an
//! initial [`Context`](crate::context::Context). Routing after each node:
//! returned override, then dynamic selector, then static successor, then
//! list order.

mod build_error;
mod logging;
mod next;
mod node;
mod workflow;

pub use build_error::BuildError;
pub use logging::{
    log_node_complete, log_node_context, log_node_start, log_workflow_complete,
    log_workflow_error, log_workflow_start,
};
pub use next::Next;
pub use node::{Node, RouterFn};
pub use workflow::Workflow;
