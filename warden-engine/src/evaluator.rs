//! Rule execution: worker pool, per-rule fault isolation, cancellation.

use std::any::Any;
use std::collections::BTreeSet;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use rayon::prelude::*;
use serde::Deserialize;
use tracing::{debug, info, warn};
use warden_interface::{
    Category, FactModel, Finding, Outcome, Report, Rule, RuleRegistry, Severity,
};

use crate::aggregator::{self, OutcomeTallies};
use crate::EvalError;

/// Cooperative cancellation handle for in-flight evaluation runs.
///
/// Clones share state: `cancel()` on any clone stops the run holding any
/// other. A token may also carry a deadline, which the engine treats
/// exactly like an explicit cancellation once reached. A cancelled run
/// returns [`EvalError::Cancelled`] and discards all partial results, so a
/// report is either complete or absent, never torn.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl CancelToken {
    /// A token with no deadline; it only cancels when asked to.
    pub fn new() -> Self {
        Self::default()
    }

    /// A token that cancels itself once `timeout` has elapsed. A timeout
    /// too large for the clock to represent means no deadline.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
            deadline: Instant::now().checked_add(timeout),
        }
    }

    /// Requests cancellation. Idempotent; safe from any thread.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    /// `true` once `cancel()` has been called or the deadline has passed.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
            || self.deadline.map_or(false, |deadline| Instant::now() >= deadline)
    }
}

/// Worker-pool sizing for an [`Evaluator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Worker threads for parallel runs. Zero means one per available core.
    pub num_threads: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self { num_threads: 0 }
    }
}

/// Per-run evaluation options.
#[derive(Debug, Clone, Default)]
pub struct EvalOptions {
    /// Restricts the run to rules in these categories; `None` runs the
    /// whole registry.
    pub categories: Option<BTreeSet<Category>>,
    /// Drops findings below this severity from the report. The filter
    /// applies to reported findings only; every selected rule still runs,
    /// and the summary counts what remains after filtering.
    pub min_severity: Option<Severity>,
    /// Evaluate rules on the worker pool instead of inline. Either way the
    /// resulting report is identical; parallelism only changes wall-clock
    /// time.
    pub parallel: bool,
    /// Cancellation handle for this run.
    pub cancel: Option<CancelToken>,
}

/// Runs registry rules against fact snapshots.
///
/// The evaluator owns its worker pool, so constructing one is the only
/// place pool sizing happens; individual runs choose between the pool and
/// inline execution via [`EvalOptions::parallel`]. Registries and snapshots
/// are borrowed read-only, and one evaluator may serve any number of
/// concurrent runs.
pub struct Evaluator {
    pool: rayon::ThreadPool,
}

impl Evaluator {
    /// Builds an evaluator with a worker pool sized per `config`.
    pub fn new(config: EngineConfig) -> Result<Self, EvalError> {
        let num_threads = if config.num_threads == 0 {
            num_cpus::get()
        } else {
            config.num_threads
        };
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .thread_name(|index| format!("warden-eval-{}", index))
            .build()?;
        Ok(Self { pool })
    }

    /// Evaluates every selected rule in `registry` against `facts` and
    /// aggregates the outcomes into a report.
    ///
    /// Every selected rule contributes exactly one outcome. A panicking
    /// predicate is caught and reported as an inconclusive finding at the
    /// rule's default severity; it never aborts the run or disturbs other
    /// rules. The only non-success exits are cancellation and pool
    /// construction failure.
    pub fn evaluate(
        &self,
        facts: &FactModel,
        registry: &RuleRegistry,
        options: &EvalOptions,
    ) -> Result<Report, EvalError> {
        let started = Instant::now();
        let snapshot = facts.snapshot_ref();
        let selected: Vec<&dyn Rule> = registry
            .all()
            .iter()
            .map(|rule| rule.as_ref())
            .filter(|rule| {
                options
                    .categories
                    .as_ref()
                    .map_or(true, |categories| categories.contains(&rule.category()))
            })
            .collect();
        info!(
            chain_id = %snapshot.chain_id,
            snapshot = %snapshot.hash,
            rules = selected.len(),
            parallel = options.parallel,
            "starting evaluation run"
        );

        let cancel = options.cancel.clone().unwrap_or_default();
        let run_one = |rule: &&dyn Rule| -> Result<Outcome, EvalError> {
            if cancel.is_cancelled() {
                return Err(EvalError::Cancelled);
            }
            Ok(evaluate_isolated(*rule, facts))
        };

        let outcomes: Vec<Outcome> = if options.parallel {
            self.pool
                .install(|| selected.par_iter().map(run_one).collect::<Result<_, _>>())?
        } else {
            selected.iter().map(run_one).collect::<Result<_, _>>()?
        };

        let mut tallies = OutcomeTallies {
            rules_evaluated: selected.len(),
            ..Default::default()
        };
        let mut findings = Vec::new();
        for (rule, outcome) in selected.iter().zip(outcomes) {
            match outcome {
                Outcome::Pass => tallies.passed += 1,
                Outcome::NotApplicable(_) => tallies.not_applicable += 1,
                Outcome::Fail(violation) => {
                    let severity = violation.severity.unwrap_or_else(|| rule.default_severity());
                    findings.push(Finding::violation(
                        rule.id().clone(),
                        rule.category(),
                        severity,
                        violation.detail,
                        snapshot,
                    ));
                }
                Outcome::Inconclusive(reason) => {
                    findings.push(Finding::inconclusive(
                        rule.id().clone(),
                        rule.category(),
                        rule.default_severity(),
                        reason,
                        snapshot,
                    ));
                }
            }
        }

        let report = aggregator::aggregate(snapshot, findings, tallies, options.min_severity);
        info!(
            chain_id = %snapshot.chain_id,
            findings = report.findings().len(),
            worst = ?report.worst_severity(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "evaluation run complete"
        );
        Ok(report)
    }
}

/// Runs one rule predicate, converting panics into inconclusive outcomes.
fn evaluate_isolated(rule: &dyn Rule, facts: &FactModel) -> Outcome {
    match panic::catch_unwind(AssertUnwindSafe(|| rule.evaluate(facts))) {
        Ok(outcome) => {
            debug!(rule = %rule.id(), outcome = outcome_kind(&outcome), "rule evaluated");
            outcome
        }
        Err(payload) => {
            let fault = panic_message(payload.as_ref());
            warn!(rule = %rule.id(), %fault, "rule predicate panicked; reporting as inconclusive");
            Outcome::inconclusive(format!("internal fault in rule predicate: {}", fault))
        }
    }
}

fn outcome_kind(outcome: &Outcome) -> &'static str {
    match outcome {
        Outcome::Pass => "pass",
        Outcome::Fail(_) => "fail",
        Outcome::NotApplicable(_) => "not-applicable",
        Outcome::Inconclusive(_) => "inconclusive",
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancel_token_trips_once_cancelled() {
        let token = CancelToken::new();
        assert!(!token.is_cancelled());
        let clone = token.clone();
        clone.cancel();
        assert!(token.is_cancelled());
    }

    #[test]
    fn cancel_token_deadline_counts_as_cancellation() {
        let token = CancelToken::with_timeout(Duration::from_secs(0));
        assert!(token.is_cancelled());
        let patient = CancelToken::with_timeout(Duration::from_secs(3600));
        assert!(!patient.is_cancelled());
    }

    #[test]
    fn cancel_token_tolerates_oversized_timeouts() {
        let token = CancelToken::with_timeout(Duration::MAX);
        assert!(!token.is_cancelled());
        token.cancel();
        assert!(token.is_cancelled());
    }

    #[test]
    fn engine_config_defaults_to_all_cores() {
        assert_eq!(EngineConfig::default().num_threads, 0);
    }
}
