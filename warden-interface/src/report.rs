//! Findings and reports: the immutable artifacts of an evaluation run.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::fact::SnapshotRef;
use crate::rule::{Category, RuleId, Severity};

/// Whether a finding is a definite violation or an undecidable check.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum FindingKind {
    /// The rule found a definite misconfiguration.
    Violation,
    /// The rule could not reach a verdict; the reason is in the detail.
    Inconclusive,
}

/// One reported check result.
///
/// Findings carry a [`SnapshotRef`] so any verdict can be traced back to the
/// exact snapshot that produced it, long after the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct Finding {
    /// Id of the rule that produced this finding.
    pub rule_id: RuleId,
    /// Category of the producing rule.
    pub category: Category,
    /// Effective severity: the rule's default unless the outcome escalated
    /// it.
    pub severity: Severity,
    /// Human-readable description of the problem, or of why no verdict was
    /// possible.
    pub detail: String,
    /// The snapshot this finding was derived from.
    pub snapshot: SnapshotRef,
    /// Violation or inconclusive.
    pub kind: FindingKind,
}

impl Finding {
    /// A finding for a failed check.
    pub fn violation(
        rule_id: RuleId,
        category: Category,
        severity: Severity,
        detail: impl Into<String>,
        snapshot: SnapshotRef,
    ) -> Self {
        Self {
            rule_id,
            category,
            severity,
            detail: detail.into(),
            snapshot,
            kind: FindingKind::Violation,
        }
    }

    /// A finding for a check that could not be decided. Inconclusive
    /// findings carry the rule's default severity so they are never
    /// silently dropped by severity filters tuned above it.
    pub fn inconclusive(
        rule_id: RuleId,
        category: Category,
        severity: Severity,
        detail: impl Into<String>,
        snapshot: SnapshotRef,
    ) -> Self {
        Self {
            rule_id,
            category,
            severity,
            detail: detail.into(),
            snapshot,
            kind: FindingKind::Inconclusive,
        }
    }
}

/// Aggregate counts over one evaluation run.
///
/// The count maps only contain severities and categories that actually
/// occur in the report's findings.
#[derive(
    Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema,
)]
pub struct ReportSummary {
    /// Rules that were selected and evaluated in this run.
    pub rules_evaluated: usize,
    /// Rules that returned a passing outcome.
    pub passed: usize,
    /// Rules whose facts were absent from the snapshot.
    pub not_applicable: usize,
    /// Finding counts per severity.
    pub by_severity: BTreeMap<Severity, usize>,
    /// Finding counts per category.
    pub by_category: BTreeMap<Category, usize>,
}

/// The immutable artifact of a single evaluation run.
///
/// Findings are stored in canonical order: category rank ascending, then
/// severity descending, then rule id ascending. Construction does not
/// reorder; establishing that order (and deduplicating) is the evaluation
/// engine's aggregation step, which is the normal way to obtain a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct Report {
    /// The snapshot this run evaluated.
    pub snapshot: SnapshotRef,
    findings: Vec<Finding>,
    summary: ReportSummary,
}

impl Report {
    /// Assembles a report from already-canonicalized findings.
    pub fn new(snapshot: SnapshotRef, findings: Vec<Finding>, summary: ReportSummary) -> Self {
        Self {
            snapshot,
            findings,
            summary,
        }
    }

    /// The findings, in canonical order.
    pub fn findings(&self) -> &[Finding] {
        &self.findings
    }

    /// Aggregate counts for this run.
    pub fn summary(&self) -> &ReportSummary {
        &self.summary
    }

    /// The most severe finding present, or `None` for a clean report.
    ///
    /// This is the primitive CLI front-ends build exit codes from: exit
    /// nonzero iff `worst_severity() >= threshold`, which
    /// [`Report::breaches`] packages directly.
    pub fn worst_severity(&self) -> Option<Severity> {
        self.findings.iter().map(|finding| finding.severity).max()
    }

    /// `true` when any finding is at or above `threshold`.
    pub fn breaches(&self, threshold: Severity) -> bool {
        self.worst_severity()
            .map_or(false, |worst| worst >= threshold)
    }

    /// `true` when the run produced no findings at all.
    pub fn is_clean(&self) -> bool {
        self.findings.is_empty()
    }
}
