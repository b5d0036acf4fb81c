//! Oracle checks: backup feeds and staleness tolerance.

use warden_interface::{Category, FactModel, Outcome, Rule, RuleId, Severity};

use crate::catalog_id;
use crate::duration::human_duration;

/// Fails when no usable backup oracle is configured: a nonzero backup
/// address must exist for the deployment to survive a primary feed outage.
pub struct OracleBackupConfigured {
    id: RuleId,
}

impl OracleBackupConfigured {
    /// Rule id: `oracles.backup-configured`.
    pub fn new() -> Self {
        Self {
            id: catalog_id(Category::Oracles, "backup-configured"),
        }
    }
}

impl Default for OracleBackupConfigured {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for OracleBackupConfigured {
    fn id(&self) -> &RuleId {
        &self.id
    }

    fn title(&self) -> &str {
        "a backup oracle is configured"
    }

    fn category(&self) -> Category {
        Category::Oracles
    }

    fn default_severity(&self) -> Severity {
        Severity::High
    }

    fn evaluate(&self, facts: &FactModel) -> Outcome {
        let oracle = match facts.oracle() {
            Some(oracle) => oracle,
            None => return Outcome::not_applicable("oracle facts absent"),
        };
        match oracle.backup {
            None => Outcome::fail("no backup oracle is configured"),
            Some(backup) if backup.is_zero() => {
                Outcome::fail("backup oracle is the zero address")
            }
            Some(_) => Outcome::Pass,
        }
    }
}

/// Fails when the backup oracle is the same account as the primary, which
/// makes the "backup" share every failure mode of the feed it backs up.
pub struct OracleBackupDistinct {
    id: RuleId,
}

impl OracleBackupDistinct {
    /// Rule id: `oracles.backup-distinct`.
    pub fn new() -> Self {
        Self {
            id: catalog_id(Category::Oracles, "backup-distinct"),
        }
    }
}

impl Default for OracleBackupDistinct {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for OracleBackupDistinct {
    fn id(&self) -> &RuleId {
        &self.id
    }

    fn title(&self) -> &str {
        "backup oracle is distinct from the primary"
    }

    fn category(&self) -> Category {
        Category::Oracles
    }

    fn default_severity(&self) -> Severity {
        Severity::Medium
    }

    fn evaluate(&self, facts: &FactModel) -> Outcome {
        let oracle = match facts.oracle() {
            Some(oracle) => oracle,
            None => return Outcome::not_applicable("oracle facts absent"),
        };
        match oracle.backup {
            // Absence of a backup is the backup-configured rule's finding;
            // there is nothing to compare here.
            None => Outcome::not_applicable("no backup oracle to compare"),
            Some(backup) if backup == oracle.primary => {
                Outcome::fail("backup oracle is the same account as the primary")
            }
            Some(_) => Outcome::Pass,
        }
    }
}

/// Fails when the oracle's freshness bound tolerates more staleness than
/// the policy allows.
pub struct OracleStalenessBound {
    id: RuleId,
    max_staleness_secs: u64,
}

impl OracleStalenessBound {
    /// Rule id: `oracles.staleness-bound`.
    pub fn new(max_staleness_secs: u64) -> Self {
        Self {
            id: catalog_id(Category::Oracles, "staleness-bound"),
            max_staleness_secs,
        }
    }
}

impl Rule for OracleStalenessBound {
    fn id(&self) -> &RuleId {
        &self.id
    }

    fn title(&self) -> &str {
        "oracle staleness tolerance is bounded"
    }

    fn category(&self) -> Category {
        Category::Oracles
    }

    fn default_severity(&self) -> Severity {
        Severity::Medium
    }

    fn evaluate(&self, facts: &FactModel) -> Outcome {
        let oracle = match facts.oracle() {
            Some(oracle) => oracle,
            None => return Outcome::not_applicable("oracle facts absent"),
        };
        if oracle.freshness_bound_secs <= self.max_staleness_secs {
            Outcome::Pass
        } else {
            Outcome::fail(format!(
                "oracle freshness bound {} exceeds the tolerated staleness of {}",
                human_duration(oracle.freshness_bound_secs),
                human_duration(self.max_staleness_secs)
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use warden_interface::mocks::{healthy_builder, mock_address};
    use warden_interface::{Address, OracleFacts};

    use super::*;

    fn with_oracle(backup: Option<Address>, freshness_bound_secs: u64) -> FactModel {
        healthy_builder()
            .oracle(OracleFacts {
                primary: mock_address(0x21),
                backup,
                freshness_bound_secs,
            })
            .build()
            .unwrap()
    }

    #[test]
    fn configured_distinct_backup_passes_both_rules() {
        let facts = with_oracle(Some(mock_address(0x22)), 900);
        assert!(OracleBackupConfigured::new().evaluate(&facts).is_pass());
        assert!(OracleBackupDistinct::new().evaluate(&facts).is_pass());
    }

    #[test]
    fn missing_backup_fails_configuration_but_not_distinctness() {
        let facts = with_oracle(None, 900);
        match OracleBackupConfigured::new().evaluate(&facts) {
            Outcome::Fail(violation) => {
                assert_eq!(violation.detail, "no backup oracle is configured")
            }
            other => panic!("expected Fail, got {:?}", other),
        }
        assert!(matches!(
            OracleBackupDistinct::new().evaluate(&facts),
            Outcome::NotApplicable(_)
        ));
    }

    #[test]
    fn zero_backup_counts_as_unconfigured() {
        let facts = with_oracle(Some(Address::ZERO), 900);
        assert!(!OracleBackupConfigured::new().evaluate(&facts).is_pass());
    }

    #[test]
    fn backup_equal_to_primary_fails_distinctness() {
        let facts = with_oracle(Some(mock_address(0x21)), 900);
        assert!(OracleBackupConfigured::new().evaluate(&facts).is_pass());
        assert!(!OracleBackupDistinct::new().evaluate(&facts).is_pass());
    }

    #[test]
    fn loose_staleness_bound_fails() {
        let facts = with_oracle(Some(mock_address(0x22)), 3 * 86_400);
        match OracleStalenessBound::new(86_400).evaluate(&facts) {
            Outcome::Fail(violation) => assert_eq!(
                violation.detail,
                "oracle freshness bound 3 days exceeds the tolerated staleness of 1 day"
            ),
            other => panic!("expected Fail, got {:?}", other),
        }
        assert!(OracleStalenessBound::new(86_400)
            .evaluate(&with_oracle(Some(mock_address(0x22)), 900))
            .is_pass());
    }

    #[test]
    fn missing_oracle_section_is_not_applicable() {
        let bare = warden_interface::FactModel::builder(
            warden_interface::ChainId::new(1),
            warden_interface::Timestamp::from_secs(1_700_000_000),
        )
        .build()
        .unwrap();
        assert!(matches!(
            OracleBackupConfigured::new().evaluate(&bare),
            Outcome::NotApplicable(_)
        ));
        assert!(matches!(
            OracleStalenessBound::new(1).evaluate(&bare),
            Outcome::NotApplicable(_)
        ));
    }
}
