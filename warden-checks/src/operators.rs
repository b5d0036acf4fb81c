//! Operator-set checks: failover depth, liveness and key custody for the
//! sequencer and proposer roles.

use std::collections::HashSet;

use warden_interface::{
    Category, FactModel, OperatorFacts, Outcome, RotationPolicy, Rule, RuleId, Severity,
};

use crate::catalog_id;
use crate::duration::human_duration;

/// The operator section of the snapshot a rule reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorRole {
    /// The transaction-ordering operator.
    Sequencer,
    /// The state-commitment operator.
    Proposer,
}

impl OperatorRole {
    fn facts<'a>(&self, facts: &'a FactModel) -> Option<&'a OperatorFacts> {
        match self {
            OperatorRole::Sequencer => facts.sequencer(),
            OperatorRole::Proposer => facts.proposer(),
        }
    }

    fn noun(&self) -> &'static str {
        match self {
            OperatorRole::Sequencer => "sequencer",
            OperatorRole::Proposer => "proposer",
        }
    }

    fn category(&self) -> Category {
        match self {
            OperatorRole::Sequencer => Category::Sequencing,
            OperatorRole::Proposer => Category::Proposing,
        }
    }
}

/// Fails when an operator set has no distinct, nonzero backup member.
///
/// A single-member set (or one padded with zero addresses or duplicates)
/// means the deployment halts the moment its only real operator does.
pub struct OperatorFailoverDefined {
    id: RuleId,
    role: OperatorRole,
}

impl OperatorFailoverDefined {
    /// Rule id: `<role-category>.failover-defined`.
    pub fn new(role: OperatorRole) -> Self {
        Self {
            id: catalog_id(role.category(), "failover-defined"),
            role,
        }
    }
}

impl Rule for OperatorFailoverDefined {
    fn id(&self) -> &RuleId {
        &self.id
    }

    fn title(&self) -> &str {
        "operator failover is configured"
    }

    fn category(&self) -> Category {
        self.role.category()
    }

    fn default_severity(&self) -> Severity {
        Severity::High
    }

    fn evaluate(&self, facts: &FactModel) -> Outcome {
        let operator = match self.role.facts(facts) {
            Some(operator) => operator,
            None => return Outcome::not_applicable(format!("{} facts absent", self.role.noun())),
        };
        let distinct: HashSet<_> = operator
            .members
            .iter()
            .filter(|member| !member.is_zero())
            .collect();
        if distinct.len() >= 2 {
            Outcome::Pass
        } else {
            Outcome::fail(format!(
                "{} set has no distinct nonzero backup member",
                self.role.noun()
            ))
        }
    }
}

/// Fails when an operator has been inactive for longer than the policy
/// tolerates.
pub struct OperatorLiveness {
    id: RuleId,
    role: OperatorRole,
    tolerance_secs: u64,
}

impl OperatorLiveness {
    /// Rule id: `<role-category>.liveness`.
    pub fn new(role: OperatorRole, tolerance_secs: u64) -> Self {
        Self {
            id: catalog_id(role.category(), "liveness"),
            role,
            tolerance_secs,
        }
    }
}

impl Rule for OperatorLiveness {
    fn id(&self) -> &RuleId {
        &self.id
    }

    fn title(&self) -> &str {
        "operator has acted recently"
    }

    fn category(&self) -> Category {
        self.role.category()
    }

    fn default_severity(&self) -> Severity {
        // A stalled sequencer freezes the chain outright; a stalled
        // proposer delays finalization.
        match self.role {
            OperatorRole::Sequencer => Severity::High,
            OperatorRole::Proposer => Severity::Medium,
        }
    }

    fn evaluate(&self, facts: &FactModel) -> Outcome {
        let noun = self.role.noun();
        let operator = match self.role.facts(facts) {
            Some(operator) => operator,
            None => return Outcome::not_applicable(format!("{} facts absent", noun)),
        };
        let last_active_at = match operator.last_active_at {
            Some(last_active_at) => last_active_at,
            None => {
                return Outcome::not_applicable(format!(
                    "no {} activity timestamp in snapshot",
                    noun
                ))
            }
        };
        let idle_secs = match facts.observed_at().checked_secs_since(last_active_at) {
            Some(idle_secs) => idle_secs,
            None => {
                return Outcome::inconclusive(format!(
                    "{} activity timestamp is ahead of the snapshot clock",
                    noun
                ))
            }
        };
        if idle_secs <= self.tolerance_secs {
            Outcome::Pass
        } else {
            Outcome::fail(format!(
                "{} has been inactive for {}, tolerance is {}",
                noun,
                human_duration(idle_secs),
                human_duration(self.tolerance_secs)
            ))
        }
    }
}

/// Fails when the sequencer declares no key rotation policy at all.
pub struct KeyRotationDeclared {
    id: RuleId,
}

impl KeyRotationDeclared {
    /// Rule id: `key-management.rotation-policy`.
    pub fn new() -> Self {
        Self {
            id: catalog_id(Category::KeyManagement, "rotation-policy"),
        }
    }
}

impl Default for KeyRotationDeclared {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for KeyRotationDeclared {
    fn id(&self) -> &RuleId {
        &self.id
    }

    fn title(&self) -> &str {
        "sequencer keys have a rotation policy"
    }

    fn category(&self) -> Category {
        Category::KeyManagement
    }

    fn default_severity(&self) -> Severity {
        Severity::Medium
    }

    fn evaluate(&self, facts: &FactModel) -> Outcome {
        let sequencer = match facts.sequencer() {
            Some(sequencer) => sequencer,
            None => return Outcome::not_applicable("sequencer facts absent"),
        };
        match sequencer.rotation {
            RotationPolicy::Unspecified => {
                Outcome::fail("no key rotation policy declared for the sequencer")
            }
            RotationPolicy::Manual | RotationPolicy::Automatic { .. } => Outcome::Pass,
        }
    }
}

#[cfg(test)]
mod tests {
    use warden_interface::mocks::{healthy_builder, mock_address, MOCK_OBSERVED_AT};
    use warden_interface::{Address, Timestamp};

    use super::*;

    fn operator(members: Vec<Address>, last_active_at: Option<u64>) -> OperatorFacts {
        OperatorFacts {
            members,
            rotation: RotationPolicy::Manual,
            last_active_at: last_active_at.map(Timestamp::from_secs),
        }
    }

    #[test]
    fn failover_passes_with_a_distinct_backup() {
        let facts = healthy_builder().build().unwrap();
        let rule = OperatorFailoverDefined::new(OperatorRole::Sequencer);
        assert_eq!(rule.id().as_str(), "sequencing.failover-defined");
        assert!(rule.evaluate(&facts).is_pass());
    }

    #[test]
    fn failover_fails_with_a_single_member() {
        let facts = healthy_builder()
            .sequencer(operator(vec![mock_address(0x11)], None))
            .build()
            .unwrap();
        let outcome = OperatorFailoverDefined::new(OperatorRole::Sequencer).evaluate(&facts);
        match outcome {
            Outcome::Fail(violation) => assert_eq!(
                violation.detail,
                "sequencer set has no distinct nonzero backup member"
            ),
            other => panic!("expected Fail, got {:?}", other),
        }
    }

    #[test]
    fn failover_ignores_zero_and_duplicate_padding() {
        let padded = healthy_builder()
            .sequencer(operator(
                vec![mock_address(0x11), Address::ZERO, mock_address(0x11)],
                None,
            ))
            .build()
            .unwrap();
        let rule = OperatorFailoverDefined::new(OperatorRole::Sequencer);
        assert!(!rule.evaluate(&padded).is_pass());
    }

    #[test]
    fn failover_is_not_applicable_without_the_section() {
        let facts = warden_interface::FactModel::builder(
            warden_interface::ChainId::new(1),
            MOCK_OBSERVED_AT,
        )
        .build()
        .unwrap();
        let outcome = OperatorFailoverDefined::new(OperatorRole::Proposer).evaluate(&facts);
        assert!(matches!(outcome, Outcome::NotApplicable(_)));
    }

    #[test]
    fn liveness_passes_when_recent() {
        let facts = healthy_builder().build().unwrap();
        let rule = OperatorLiveness::new(OperatorRole::Sequencer, 3_600);
        assert!(rule.evaluate(&facts).is_pass());
    }

    #[test]
    fn liveness_fails_when_stale() {
        let facts = healthy_builder()
            .sequencer(operator(
                vec![mock_address(0x11), mock_address(0x12)],
                Some(MOCK_OBSERVED_AT.secs() - 2 * 86_400),
            ))
            .build()
            .unwrap();
        let outcome = OperatorLiveness::new(OperatorRole::Sequencer, 3_600).evaluate(&facts);
        match outcome {
            Outcome::Fail(violation) => assert_eq!(
                violation.detail,
                "sequencer has been inactive for 2 days, tolerance is 1 hour"
            ),
            other => panic!("expected Fail, got {:?}", other),
        }
    }

    #[test]
    fn liveness_is_not_applicable_without_a_timestamp() {
        let facts = healthy_builder()
            .proposer(operator(vec![mock_address(0x13), mock_address(0x14)], None))
            .build()
            .unwrap();
        let outcome = OperatorLiveness::new(OperatorRole::Proposer, 3_600).evaluate(&facts);
        assert!(matches!(outcome, Outcome::NotApplicable(_)));
    }

    #[test]
    fn proposer_liveness_is_less_severe_than_sequencer() {
        assert_eq!(
            OperatorLiveness::new(OperatorRole::Sequencer, 1).default_severity(),
            Severity::High
        );
        assert_eq!(
            OperatorLiveness::new(OperatorRole::Proposer, 1).default_severity(),
            Severity::Medium
        );
    }

    #[test]
    fn rotation_policy_must_be_declared() {
        let undeclared = healthy_builder()
            .sequencer(OperatorFacts {
                members: vec![mock_address(0x11), mock_address(0x12)],
                rotation: RotationPolicy::Unspecified,
                last_active_at: None,
            })
            .build()
            .unwrap();
        let rule = KeyRotationDeclared::new();
        assert!(!rule.evaluate(&undeclared).is_pass());

        let declared = healthy_builder().build().unwrap();
        assert!(rule.evaluate(&declared).is_pass());
    }
}
