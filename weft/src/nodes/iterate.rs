//! Iterative node: rerun an embedded workflow across bounded rounds,
//! carrying state forward and aggregating results.

use std::sync::Arc;

use async_trait::async_trait;
use indexmap::IndexMap;

use crate::context::{is_reserved, Context, Value};
use crate::error::WorkflowError;
use crate::graph::{Next, Node, Workflow};

/// Round counter written into the working context each round. Reserved.
pub const ITERATION_COUNT: &str = "_iteration_count";

/// Completed-round count recorded in the outer context after the loop. Reserved.
pub const ITERATIONS_COMPLETED: &str = "_iterations_completed";

/// Continuation predicate: inspects the working context before each round.
/// Returning false stops the loop.
pub type ConditionFn = Arc<dyn Fn(&Context) -> bool + Send + Sync>;

/// How collected round results are aggregated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CollectMode {
    /// Keep only the latest collected value.
    #[default]
    Replace,
    /// Keep an ordered sequence of every collected value.
    Append,
    /// Fold each object result's keys over the previous merged object.
    /// A non-object result degrades to append behavior for that entry.
    Merge,
}

/// Repeats an embedded workflow until the predicate or round limit stops it.
///
/// Per round: the predicate is evaluated against the working context (stop
/// on false), the embedded workflow runs, an optional result is collected
/// from the first output-mapping source present, the round counter advances,
/// and the next round's context is rebuilt through the iteration mapping
/// plus a copy-forward of unmapped, non-reserved variables.
///
/// A failure inside any round aborts the whole node as
/// `WorkflowError::Iteration`; progress from prior rounds is discarded.
pub struct IterativeNode {
    id: String,
    name: String,
    workflow: Workflow,
    condition: ConditionFn,
    max_rounds: usize,
    /// outer variable -> working variable
    input_mapping: IndexMap<String, String>,
    /// working variable -> outer variable
    output_mapping: IndexMap<String, String>,
    /// current-round variable -> next-round variable
    iteration_mapping: IndexMap<String, String>,
    mode: CollectMode,
    result_variable: Option<String>,
    next: Option<String>,
}

impl IterativeNode {
    /// Creates an iterative node with a 10-round limit and no collection.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        workflow: Workflow,
        condition: ConditionFn,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            workflow,
            condition,
            max_rounds: 10,
            input_mapping: IndexMap::new(),
            output_mapping: IndexMap::new(),
            iteration_mapping: IndexMap::new(),
            mode: CollectMode::Replace,
            result_variable: None,
            next: None,
        }
    }

    /// Hard cap on rounds, applied before the predicate.
    pub fn with_max_rounds(mut self, max_rounds: usize) -> Self {
        self.max_rounds = max_rounds;
        self
    }

    /// Maps outer variables into the first round: `{outer -> working}`.
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

    /// Maps final-round variables back out: `{working -> outer}`. The first
    /// source present in a round's context is also the collected result.
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

    /// Renames variables between rounds: `{current -> next}`. Unmapped,
    /// non-reserved variables are copied forward unchanged.
    pub fn with_iteration_mapping<I, K, V>(mut self, mapping: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.iteration_mapping = mapping
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self
    }

    /// Collects round results into `variable` under the given mode. The
    /// stored shape follows the mode: a single value for replace and merge,
    /// a sequence for append.
    pub fn with_result(mut self, variable: impl Into<String>, mode: CollectMode) -> Self {
        self.result_variable = Some(variable.into());
        self.mode = mode;
        self
    }

    /// Static successor in the outer workflow.
    pub fn with_next(mut self, next: impl Into<String>) -> Self {
        self.next = Some(next.into());
        self
    }

    fn should_continue(&self, working: &Context, rounds: usize) -> bool {
        if rounds >= self.max_rounds {
            tracing::debug!(node_id = %self.id, max_rounds = self.max_rounds, "round limit reached");
            return false;
        }
        let keep_going = (self.condition)(working);
        if !keep_going {
            tracing::debug!(node_id = %self.id, rounds, "continuation predicate returned false");
        }
        keep_going
    }

    fn initial_working_context(&self, outer: &Context) -> Context {
        let mut working = Context::new();
        for (outer_var, working_var) in &self.input_mapping {
            match outer.get(outer_var) {
                Some(value) => working.insert(working_var.clone(), value.clone()),
                None => tracing::warn!(
                    node_id = %self.id,
                    variable = %outer_var,
                    "input variable not found in outer context"
                ),
            }
        }
        working.insert(ITERATION_COUNT, 0);
        working
    }

    /// Rebuilds the working context for the next round: mapped renames, then
    /// a copy-forward of everything not already mapped and not reserved.
    fn next_round_context(&self, current: Context, rounds: usize) -> Context {
        if self.iteration_mapping.is_empty() {
            return current;
        }
        let mut next = Context::new();
        for (src, dest) in &self.iteration_mapping {
            match current.get(src) {
                Some(value) => next.insert(dest.clone(), value.clone()),
                None => tracing::warn!(
                    node_id = %self.id,
                    variable = %src,
                    "iteration variable not found for mapping"
                ),
            }
        }
        for (name, value) in current.iter() {
            if !next.contains(name) && !self.iteration_mapping.contains_key(name) && !is_reserved(name)
            {
                next.insert(name.clone(), value.clone());
            }
        }
        next.insert(ITERATION_COUNT, rounds);
        next
    }

    fn collect(&self, collected: &mut Vec<Value>, result: Value) {
        match self.mode {
            CollectMode::Replace => {
                collected.clear();
                collected.push(result);
            }
            CollectMode::Append => collected.push(result),
            CollectMode::Merge => match (collected.last_mut(), result) {
                (Some(Value::Object(merged)), Value::Object(update)) => {
                    for (key, value) in update {
                        merged.insert(key, value);
                    }
                }
                (_, other) => collected.push(other),
            },
        }
    }
}

#[async_trait]
impl Node for IterativeNode {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, mut ctx: Context) -> Result<(Context, Next), WorkflowError> {
        let mut working = self.initial_working_context(&ctx);
        let mut rounds = 0usize;
        let mut collected: Vec<Value> = Vec::new();
        let mut ran_any_round = false;

        while self.should_continue(&working, rounds) {
            tracing::debug!(node_id = %self.id, round = rounds + 1, "starting round");

            working = self
                .workflow
                .run(working)
                .await
                .map_err(|e| WorkflowError::Iteration {
                    node: self.id.clone(),
                    round: rounds + 1,
                    source: Box::new(e),
                })?;
            ran_any_round = true;

            if self.result_variable.is_some() {
                for working_var in self.output_mapping.keys() {
                    if let Some(value) = working.get(working_var) {
                        self.collect(&mut collected, value.clone());
                        break;
                    }
                }
            }

            rounds += 1;
            working.insert(ITERATION_COUNT, rounds);
            working = self.next_round_context(working, rounds);
        }

        tracing::debug!(node_id = %self.id, rounds, "iteration complete");

        if ran_any_round {
            for (working_var, outer_var) in &self.output_mapping {
                if let Some(value) = working.get(working_var) {
                    ctx.insert(outer_var.clone(), value.clone());
                }
            }
        }

        if let Some(variable) = &self.result_variable {
            if !collected.is_empty() {
                let value = match self.mode {
                    CollectMode::Replace | CollectMode::Merge => {
                        collected.last().cloned().unwrap_or(Value::Null)
                    }
                    CollectMode::Append => Value::Array(collected),
                };
                ctx.insert(variable.clone(), value);
            }
        }

        ctx.insert(ITERATIONS_COMPLETED, rounds);
        Ok((ctx, Next::Continue))
    }

    fn next_id(&self) -> Option<&str> {
        self.next.as_deref()
    }
}
