//! Routing intent returned by a node: continue, jump, or end.
//!
//! The run loop uses this to pick the next node or stop. Carrying intent in
//! the return value (instead of a reserved context key) means an override is
//! consumed by construction and can never leak into later nodes' data.

/// Next step after running a node.
///
/// - **Continue**: no explicit intent; the workflow falls back to the node's
///   selector, its static successor, then the next node in list order.
/// - **Node(id)**: routing override; wins over all static wiring.
/// - **End**: stop and return the current context.
///
/// **Interaction**: Returned by `Node::run`; consumed by `Workflow::run`.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Next {
    /// Defer to selector / static successor / list order.
    Continue,
    /// Run the node with the given id next.
    Node(String),
    /// Stop and return the current context.
    End,
}
