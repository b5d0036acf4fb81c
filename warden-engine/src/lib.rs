//! The rollup-warden evaluation engine.
//!
//! Takes a [`RuleRegistry`] and a [`FactModel`], runs every selected rule on
//! an owned worker pool (or inline, for sequential runs), isolates rule
//! faults so one panicking predicate degrades to an inconclusive finding
//! instead of poisoning the run, and aggregates the results into a
//! canonically ordered [`Report`]. Given the same registry, snapshot and
//! options, the produced report is byte-for-byte identical regardless of
//! parallelism or scheduling.

#![deny(missing_docs)]

mod aggregator;
mod evaluator;

pub use aggregator::{aggregate, OutcomeTallies};
pub use evaluator::{CancelToken, EngineConfig, EvalOptions, Evaluator};

use thiserror::Error;
use warden_interface::{FactModel, Report, RuleRegistry};

/// Failures that prevent an evaluation run from producing a report.
///
/// A fault inside one rule predicate is *not* such a failure; it becomes an
/// inconclusive finding and the run continues.
#[derive(Debug, Error)]
pub enum EvalError {
    /// The run was cancelled (or hit its deadline) before completion. No
    /// partial report is produced.
    #[error("evaluation run was cancelled before completion")]
    Cancelled,
    /// The worker pool could not be constructed.
    #[error("failed to build the evaluation worker pool")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}

/// Evaluates every rule in `registry` against `facts` with default options
/// on a default-sized evaluator. Convenience wrapper for one-shot callers;
/// anything running repeatedly should hold an [`Evaluator`].
pub fn evaluate(facts: &FactModel, registry: &RuleRegistry) -> Result<Report, EvalError> {
    Evaluator::new(EngineConfig::default())?.evaluate(facts, registry, &EvalOptions::default())
}
