//! The rule abstraction: pure predicates over fact snapshots, tagged with a
//! checklist category and a severity.

use core::fmt;

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

use crate::errors::InvalidRuleIdError;
use crate::fact::FactModel;

/// Ranked criticality of a finding.
///
/// The derived `Ord` follows declaration order, so `Severity::Info <
/// Severity::Critical` and `max()` picks the worst severity in a set.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    BorshDeserialize,
    BorshSerialize,
    schemars::JsonSchema,
)]
#[cfg_attr(feature = "fuzzing", derive(proptest_derive::Arbitrary))]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational; no action required.
    Info,
    /// Worth fixing, but not a realistic attack or loss vector on its own.
    Low,
    /// Weakens the deployment's security posture.
    Medium,
    /// Exploitable misconfiguration or material loss-of-funds exposure.
    High,
    /// Funds or liveness are at immediate risk.
    Critical,
}

impl Severity {
    /// Numeric rank of this severity, from `0` for [`Severity::Info`] up to
    /// `4` for [`Severity::Critical`].
    pub const fn rank(&self) -> u8 {
        match self {
            Severity::Info => 0,
            Severity::Low => 1,
            Severity::Medium => 2,
            Severity::High => 3,
            Severity::Critical => 4,
        }
    }

    /// Every severity, most severe first. This is the order reports rank
    /// findings within a category.
    pub const ALL_DESCENDING: [Severity; 5] = [
        Severity::Critical,
        Severity::High,
        Severity::Medium,
        Severity::Low,
        Severity::Info,
    ];

    /// The lowercase name used in serialized reports and log lines.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The checklist categories a rule can belong to.
///
/// Declaration order is the canonical report-grouping order; the derived
/// `Ord` relies on it.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    BorshDeserialize,
    BorshSerialize,
    schemars::JsonSchema,
)]
#[cfg_attr(feature = "fuzzing", derive(proptest_derive::Arbitrary))]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    /// Ordering and inclusion of transactions.
    Sequencing,
    /// Publication of state commitments.
    Proposing,
    /// Proof system guarding state transitions.
    StateValidation,
    /// Where and how transaction data is made available.
    DataAvailability,
    /// Contract upgrade mechanics and delays.
    Upgrades,
    /// The user exit path.
    Withdrawals,
    /// Censorship-resistance escape hatches.
    ForceInclusion,
    /// Acceptance of state roots by the settlement layer.
    AnchorRoots,
    /// External data feeds.
    Oracles,
    /// Token and message bridges.
    Bridging,
    /// Privileged role separation.
    AccessControl,
    /// Operator key custody and rotation.
    KeyManagement,
    /// Depth at which results are treated as final.
    Finality,
    /// Block and execution resource ceilings.
    ResourceLimits,
    /// Throughput restrictions on sensitive paths.
    RateLimiting,
    /// Observability of the deployment.
    Monitoring,
    /// Preparedness for operational failure.
    IncidentResponse,
    /// Published architecture and behavior documentation.
    Documentation,
    /// Pre-production validation depth.
    Testing,
    /// Consistency of genesis and runtime parameters.
    ChainParameters,
}

impl Category {
    /// Every category in canonical (report-grouping) order.
    pub const ALL: [Category; 20] = [
        Category::Sequencing,
        Category::Proposing,
        Category::StateValidation,
        Category::DataAvailability,
        Category::Upgrades,
        Category::Withdrawals,
        Category::ForceInclusion,
        Category::AnchorRoots,
        Category::Oracles,
        Category::Bridging,
        Category::AccessControl,
        Category::KeyManagement,
        Category::Finality,
        Category::ResourceLimits,
        Category::RateLimiting,
        Category::Monitoring,
        Category::IncidentResponse,
        Category::Documentation,
        Category::Testing,
        Category::ChainParameters,
    ];

    /// Stable kebab-case slug, used both in serialized reports and as the
    /// conventional prefix of rule ids in this category.
    pub const fn slug(&self) -> &'static str {
        match self {
            Category::Sequencing => "sequencing",
            Category::Proposing => "proposing",
            Category::StateValidation => "state-validation",
            Category::DataAvailability => "data-availability",
            Category::Upgrades => "upgrades",
            Category::Withdrawals => "withdrawals",
            Category::ForceInclusion => "force-inclusion",
            Category::AnchorRoots => "anchor-roots",
            Category::Oracles => "oracles",
            Category::Bridging => "bridging",
            Category::AccessControl => "access-control",
            Category::KeyManagement => "key-management",
            Category::Finality => "finality",
            Category::ResourceLimits => "resource-limits",
            Category::RateLimiting => "rate-limiting",
            Category::Monitoring => "monitoring",
            Category::IncidentResponse => "incident-response",
            Category::Documentation => "documentation",
            Category::Testing => "testing",
            Category::ChainParameters => "chain-parameters",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

/// Stable identifier of a rule: `<category-slug>.<subcheck>` (for example
/// `upgrades.exit-window`).
///
/// The grammar is enforced at every construction point, including
/// deserialization: an id is non-empty ASCII and consists of exactly two
/// non-empty dot-separated segments of alphanumerics and interior hyphens.
/// Ids are compared case-sensitively everywhere, including registry
/// deduplication.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RuleId(String);

impl RuleId {
    /// Validates and wraps a rule id string.
    pub fn new(id: impl Into<String>) -> Result<Self, InvalidRuleIdError> {
        let id = id.into();
        if id.is_empty() {
            return Err(InvalidRuleIdError::Empty);
        }
        if !id.is_ascii() {
            return Err(InvalidRuleIdError::NotAscii { id });
        }
        let well_formed = id
            .split_once('.')
            .map_or(false, |(slug, subcheck)| {
                is_id_segment(slug) && is_id_segment(subcheck)
            });
        if !well_formed {
            return Err(InvalidRuleIdError::BadShape { id });
        }
        Ok(Self(id))
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn is_id_segment(segment: &str) -> bool {
    !segment.is_empty()
        && !segment.starts_with('-')
        && !segment.ends_with('-')
        && segment.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for RuleId {
    type Error = InvalidRuleIdError;

    fn try_from(id: String) -> Result<Self, Self::Error> {
        Self::new(id)
    }
}

impl core::str::FromStr for RuleId {
    type Err = InvalidRuleIdError;

    fn from_str(id: &str) -> Result<Self, Self::Err> {
        Self::new(id)
    }
}

impl serde::Serialize for RuleId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for RuleId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let id: String = serde::Deserialize::deserialize(deserializer)?;
        Self::new(id).map_err(serde::de::Error::custom)
    }
}

impl schemars::JsonSchema for RuleId {
    fn schema_name() -> String {
        "RuleId".to_string()
    }

    fn json_schema(gen: &mut schemars::gen::SchemaGenerator) -> schemars::schema::Schema {
        String::json_schema(gen)
    }
}

/// The payload of a failed check: what is wrong, and optionally how severely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Human-readable description of the misconfiguration, including the
    /// offending and expected values where they exist.
    pub detail: String,
    /// Overrides the rule's default severity. Rules use this when the margin
    /// of violation changes how bad the problem is, e.g. an upgrade exit
    /// window that is not merely short but almost absent.
    pub severity: Option<Severity>,
}

/// The result of evaluating one rule against one snapshot.
///
/// Rules are total: every well-formed snapshot maps to exactly one of these,
/// and absence of the facts a rule needs is expressed as
/// [`Outcome::NotApplicable`] rather than an error or a guess.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// The configuration satisfies the check.
    Pass,
    /// The configuration violates the check.
    Fail(Violation),
    /// The facts this check needs are not present in the snapshot.
    NotApplicable(String),
    /// The check cannot be decided from on-chain facts alone, or the
    /// predicate faulted and its result is unusable.
    Inconclusive(String),
}

impl Outcome {
    /// A failing outcome at the rule's default severity.
    pub fn fail(detail: impl Into<String>) -> Self {
        Outcome::Fail(Violation {
            detail: detail.into(),
            severity: None,
        })
    }

    /// A failing outcome escalated (or demoted) to an explicit severity.
    pub fn fail_with_severity(detail: impl Into<String>, severity: Severity) -> Self {
        Outcome::Fail(Violation {
            detail: detail.into(),
            severity: Some(severity),
        })
    }

    /// A not-applicable outcome with the reason the facts were missing.
    pub fn not_applicable(reason: impl Into<String>) -> Self {
        Outcome::NotApplicable(reason.into())
    }

    /// An inconclusive outcome with the reason no verdict is possible.
    pub fn inconclusive(reason: impl Into<String>) -> Self {
        Outcome::Inconclusive(reason.into())
    }

    /// `true` only for [`Outcome::Pass`].
    pub fn is_pass(&self) -> bool {
        matches!(self, Outcome::Pass)
    }
}

/// A single security check over a fact snapshot.
///
/// Implementations must be pure functions of the snapshot: no I/O, no clocks,
/// no global state. Any notion of "now" comes from
/// [`FactModel::observed_at`], which keeps every verdict reproducible from
/// the snapshot alone. Implementations must also be total over well-formed
/// snapshots; missing facts are reported through
/// [`Outcome::NotApplicable`], never by panicking.
///
/// Policy thresholds (delays, bounds, limits) are injected when the rule is
/// constructed, not hardcoded in the predicate, so the same rule logic serves
/// networks with different policies.
pub trait Rule: Send + Sync {
    /// Stable identifier of this rule, unique within any one registry.
    fn id(&self) -> &RuleId;

    /// One-line human-readable summary of what the rule checks.
    fn title(&self) -> &str;

    /// The checklist category this rule belongs to.
    fn category(&self) -> Category;

    /// Severity assigned to violations unless the outcome overrides it.
    fn default_severity(&self) -> Severity;

    /// Evaluates the rule against one snapshot.
    fn evaluate(&self, facts: &FactModel) -> Outcome;
}
