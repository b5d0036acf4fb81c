//! Deterministic composition of raw findings into a report.

use std::collections::{BTreeMap, BTreeSet};

use warden_interface::{Finding, Report, ReportSummary, Severity, SnapshotRef};

/// Counts of the outcomes that do not become findings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutcomeTallies {
    /// Rules that were selected and evaluated.
    pub rules_evaluated: usize,
    /// Rules that returned a passing outcome.
    pub passed: usize,
    /// Rules whose facts were absent from the snapshot.
    pub not_applicable: usize,
}

/// Filters, deduplicates and ranks `findings`, then assembles the report.
///
/// The output is a pure function of the inputs as sets: arrival order never
/// matters. Specifically:
///
/// - findings below `min_severity` are dropped first, and the summary
///   counts only what survives;
/// - findings are ranked canonically: category ascending, severity
///   descending within a category, rule id ascending within a severity;
/// - duplicate `(rule id, snapshot hash)` pairs collapse to their first
///   post-ranking occurrence.
pub fn aggregate(
    snapshot: SnapshotRef,
    mut findings: Vec<Finding>,
    tallies: OutcomeTallies,
    min_severity: Option<Severity>,
) -> Report {
    if let Some(floor) = min_severity {
        findings.retain(|finding| finding.severity >= floor);
    }
    findings.sort_by(|a, b| {
        a.category
            .cmp(&b.category)
            .then(b.severity.cmp(&a.severity))
            .then(a.rule_id.cmp(&b.rule_id))
    });
    let mut seen = BTreeSet::new();
    findings.retain(|finding| seen.insert((finding.rule_id.clone(), finding.snapshot.hash)));

    let mut by_severity = BTreeMap::new();
    let mut by_category = BTreeMap::new();
    for finding in &findings {
        *by_severity.entry(finding.severity).or_insert(0) += 1;
        *by_category.entry(finding.category).or_insert(0) += 1;
    }
    let summary = ReportSummary {
        rules_evaluated: tallies.rules_evaluated,
        passed: tallies.passed,
        not_applicable: tallies.not_applicable,
        by_severity,
        by_category,
    };
    Report::new(snapshot, findings, summary)
}
