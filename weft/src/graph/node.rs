//! Workflow node trait: one step in a pipeline.
//!
//! Receives a [`Context`], returns an updated context and a [`Next`] routing
//! intent. A node may additionally carry a static successor id and a dynamic
//! selector; the run loop consults them, in that order, when the node
//! returns `Next::Continue`.

use std::sync::Arc;

use async_trait::async_trait;

use crate::context::Context;
use crate::error::WorkflowError;

use super::Next;

/// Selector function: reads the updated context and optionally names the
/// next node. `None` defers to the node's static successor or list order.
pub type RouterFn = Arc<dyn Fn(&Context) -> Option<String> + Send + Sync>;

/// One step in a workflow: context in, (context out, routing intent).
///
/// Nodes are constructed once at workflow-build time, are immutable
/// afterwards, and are reused across every run of that workflow. The only
/// state a node owns is its construction-time configuration.
///
/// **Interaction**: Stored as `Arc<dyn Node>` in a [`Workflow`](super::Workflow);
/// driven by `Workflow::run`.
#[async_trait]
pub trait Node: Send + Sync {
    /// Node id (e.g. `"classify"`). Must be unique within a workflow.
    fn id(&self) -> &str;

    /// Human-readable label, used for logging only. Defaults to the id.
    fn name(&self) -> &str {
        self.id()
    }

    /// One step: context in, (context out, routing intent).
    ///
    /// Return `Next::Node(id)` to override all static wiring, `Next::End` to
    /// stop the run, or `Next::Continue` to defer to [`route`](Self::route),
    /// [`next_id`](Self::next_id), then list order.
    async fn run(&self, ctx: Context) -> Result<(Context, Next), WorkflowError>;

    /// Dynamic selector, invoked with the updated context when `run`
    /// returned `Next::Continue`. Default: no selector.
    fn route(&self, _ctx: &Context) -> Option<String> {
        None
    }

    /// Static successor id. Consulted after [`route`](Self::route). Default: none.
    fn next_id(&self) -> Option<&str> {
        None
    }

    /// True for entry-marker nodes. The workflow logs a warning (non-fatal)
    /// when its first node is not one.
    fn is_start(&self) -> bool {
        false
    }
}
