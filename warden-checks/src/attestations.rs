//! Checks that cannot be answered from chain state and always ask for a
//! manual attestation.
//!
//! Documentation coverage, production testing, alerting and runbooks are
//! real review criteria, but nothing in a fact snapshot can decide them.
//! Each rule here surfaces an inconclusive finding in every report so the
//! area is never silently skipped.

use warden_interface::{Category, FactModel, Outcome, Rule, RuleId, Severity};

use crate::catalog_id;

/// A rule whose verdict always requires a human. Evaluation is total and
/// constant: it returns the same inconclusive prompt for every snapshot.
pub struct ManualAttestation {
    id: RuleId,
    title: &'static str,
    category: Category,
    severity: Severity,
    prompt: &'static str,
}

impl ManualAttestation {
    /// A rule with id `<category-slug>.<subcheck>` that asks `prompt` in
    /// every report.
    pub fn new(
        category: Category,
        subcheck: &str,
        title: &'static str,
        severity: Severity,
        prompt: &'static str,
    ) -> Self {
        Self {
            id: catalog_id(category, subcheck),
            title,
            category,
            severity,
            prompt,
        }
    }
}

impl Rule for ManualAttestation {
    fn id(&self) -> &RuleId {
        &self.id
    }

    fn title(&self) -> &str {
        self.title
    }

    fn category(&self) -> Category {
        self.category
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn evaluate(&self, _facts: &FactModel) -> Outcome {
        Outcome::inconclusive(self.prompt)
    }
}

/// The attestation prompts every built-in registry carries.
pub fn builtin_attestations() -> Vec<ManualAttestation> {
    vec![
        ManualAttestation::new(
            Category::Monitoring,
            "alerting",
            "alerting covers the critical paths",
            Severity::Low,
            "confirm that sequencer halts, proof failures and bridge pauses page an operator",
        ),
        ManualAttestation::new(
            Category::IncidentResponse,
            "runbooks",
            "incident runbooks exist and are current",
            Severity::Low,
            "confirm that runbooks for sequencer failover and emergency upgrades exist and were rehearsed",
        ),
        ManualAttestation::new(
            Category::Documentation,
            "coverage",
            "published documentation matches the deployment",
            Severity::Info,
            "confirm that the published architecture documentation matches the deployed contracts",
        ),
        ManualAttestation::new(
            Category::Testing,
            "production-exposure",
            "the deployed code was tested before exposure",
            Severity::Low,
            "confirm that the deployed release passed a public testnet soak before mainnet exposure",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use warden_interface::mocks::healthy_fact_model;

    use super::*;

    #[test]
    fn attestations_are_always_inconclusive() {
        let facts = healthy_fact_model();
        for rule in builtin_attestations() {
            match rule.evaluate(&facts) {
                Outcome::Inconclusive(reason) => {
                    assert!(reason.starts_with("confirm that"), "prompt: {}", reason)
                }
                other => panic!("{} returned {:?}", rule.id(), other),
            }
        }
    }

    #[test]
    fn attestation_ids_are_distinct() {
        let rules = builtin_attestations();
        let mut ids: Vec<_> = rules.iter().map(|rule| rule.id().clone()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), rules.len());
    }

    #[test]
    fn documentation_prompt_is_informational_only() {
        let docs = builtin_attestations()
            .into_iter()
            .find(|rule| rule.category() == Category::Documentation)
            .unwrap();
        assert_eq!(docs.default_severity(), Severity::Info);
    }
}
