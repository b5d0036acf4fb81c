//! This crate defines the core interfaces of the rollup-warden configuration
//! linter. Anything needed to describe a rollup deployment as a checkable
//! snapshot, to express a security check over that snapshot, or to consume the
//! resulting findings lives here; the evaluation engine and the built-in rule
//! catalog build on these types but this crate depends on neither.
//!
//! The central pieces are:
//!
//! - [`FactModel`]: an immutable, versioned snapshot of one deployment's
//!   observable configuration, constructed through a validating builder and
//!   addressable by content hash.
//! - [`Rule`]: a pure, total predicate over a snapshot, tagged with a
//!   checklist [`Category`] and a default [`Severity`].
//! - [`RuleRegistry`]: an ordered, duplicate-rejecting collection of rules.
//! - [`Finding`] and [`Report`]: the immutable artifacts of an evaluation
//!   run, ranked canonically so identical inputs yield identical reports.
//! - [`FactProvider`]: the async boundary to whatever assembles snapshots
//!   from live chain data. The linter core itself never performs I/O.

#![deny(missing_docs)]

mod address;
mod errors;
mod fact;
mod provider;
mod registry;
mod report;
mod rule;

#[cfg(feature = "fuzzing")]
pub mod fuzzing;
#[cfg(feature = "mocks")]
pub mod mocks;

pub use address::{Address, ADDRESS_LEN};
pub use errors::{
    DataUnavailableError, DuplicateRuleIdError, InvalidRuleIdError, MalformedFactError,
};
pub use fact::{
    AnchorFacts, ChainId, FactModel, FactModelBuilder, OperatorFacts, OracleFacts, ParamValue,
    RotationPolicy, SnapshotHash, SnapshotRef, Timestamp, UpgradeFacts, WithdrawalFacts,
    FACT_SCHEMA_VERSION,
};
pub use provider::FactProvider;
pub use registry::RuleRegistry;
pub use report::{Finding, FindingKind, Report, ReportSummary};
pub use rule::{Category, Outcome, Rule, RuleId, Severity, Violation};
