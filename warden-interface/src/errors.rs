//! Error taxonomy shared across the linter.
//!
//! These are the failures that abort an evaluation request outright. Faults
//! inside a single rule predicate are deliberately *not* errors; the engine
//! reports them as inconclusive findings so one bad rule cannot take the
//! whole run down.

use thiserror::Error;

use crate::fact::{ChainId, Timestamp};
use crate::rule::RuleId;

/// A fact snapshot violated a structural invariant at construction time.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedFactError {
    /// Chain id zero is reserved.
    #[error("chain id must be nonzero")]
    ZeroChainId,
    /// A snapshot must record when it was observed.
    #[error("observation time must be nonzero")]
    ZeroObservationTime,
    /// An operator section is present but lists nobody.
    #[error("{section} facts are present but the member set is empty")]
    EmptyOperatorSet {
        /// The offending fact section.
        section: &'static str,
    },
    /// Automatic rotation with a zero interval is contradictory.
    #[error("{section} rotation interval must be nonzero")]
    ZeroRotationInterval {
        /// The offending fact section.
        section: &'static str,
    },
    /// A zero freshness bound would declare every oracle answer stale.
    #[error("oracle freshness bound must be nonzero")]
    ZeroFreshnessBound,
    /// A recorded past event claims to postdate the snapshot itself.
    #[error("{field} is later than the snapshot observation time")]
    FutureTimestamp {
        /// The offending timestamp field.
        field: &'static str,
    },
    /// Extension parameters need non-blank keys.
    #[error("extension parameter key is blank")]
    BlankParamKey,
}

/// A rule id string did not follow the `<category-slug>.<subcheck>` grammar.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidRuleIdError {
    /// Empty ids identify nothing.
    #[error("rule id is empty")]
    Empty,
    /// Ids are ASCII so they render identically everywhere.
    #[error("rule id '{id}' contains non-ASCII characters")]
    NotAscii {
        /// The offending id string.
        id: String,
    },
    /// Ids are two non-empty dot-separated segments of alphanumerics and
    /// interior hyphens.
    #[error("rule id '{id}' does not follow the '<category-slug>.<subcheck>' shape")]
    BadShape {
        /// The offending id string.
        id: String,
    },
}

/// A rule id was registered twice in the same registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("duplicate rule id '{id}'")]
pub struct DuplicateRuleIdError {
    /// The id that was already present.
    pub id: RuleId,
}

/// The external data pipeline could not produce a snapshot.
///
/// The linter core propagates these to the caller unchanged. Retry policy,
/// backoff and caching all live with the provider or its caller, never in
/// the evaluation path.
#[derive(Debug, Error)]
pub enum DataUnavailableError {
    /// The provider does not index the requested chain.
    #[error("chain {0} is not indexed by this provider")]
    UnknownChain(ChainId),
    /// The provider indexes the chain but has nothing at the requested time.
    #[error("no snapshot available for chain {chain_id} at time {requested}")]
    SnapshotMissing {
        /// The requested chain.
        chain_id: ChainId,
        /// The requested observation time.
        requested: Timestamp,
    },
    /// Transport or upstream-service failure while assembling facts.
    #[error(transparent)]
    Upstream(#[from] anyhow::Error),
}
