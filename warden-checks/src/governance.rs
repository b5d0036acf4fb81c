//! Privileged-role checks.

use std::str::FromStr;

use warden_interface::{Address, Category, FactModel, Outcome, Rule, RuleId, Severity};

use crate::catalog_id;

/// Extension parameter holding the upgrade admin account, as a hex address.
pub const UPGRADE_ADMIN_KEY: &str = "upgrade_admin";
/// Extension parameter holding the sequencer admin account, as a hex address.
pub const SEQUENCER_ADMIN_KEY: &str = "sequencer_admin";

/// Fails when the upgrade admin and the sequencer admin are the same
/// account. A single key that can both reorder transactions and change
/// the code defeats the separation the two roles are meant to provide.
pub struct AdminSeparation {
    id: RuleId,
}

impl AdminSeparation {
    /// Rule id: `access-control.admin-separation`.
    pub fn new() -> Self {
        Self {
            id: catalog_id(Category::AccessControl, "admin-separation"),
        }
    }

    fn admin(facts: &FactModel, key: &str) -> Result<Address, Outcome> {
        let text = match facts.text_param(key) {
            Some(text) => text,
            None => {
                return Err(Outcome::not_applicable(format!(
                    "parameter '{}' absent",
                    key
                )))
            }
        };
        Address::from_str(text).map_err(|_| {
            Outcome::inconclusive(format!("parameter '{}' is not a valid address", key))
        })
    }
}

impl Default for AdminSeparation {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for AdminSeparation {
    fn id(&self) -> &RuleId {
        &self.id
    }

    fn title(&self) -> &str {
        "upgrade and sequencer admins are distinct"
    }

    fn category(&self) -> Category {
        Category::AccessControl
    }

    fn default_severity(&self) -> Severity {
        Severity::High
    }

    fn evaluate(&self, facts: &FactModel) -> Outcome {
        let upgrade_admin = match Self::admin(facts, UPGRADE_ADMIN_KEY) {
            Ok(admin) => admin,
            Err(outcome) => return outcome,
        };
        let sequencer_admin = match Self::admin(facts, SEQUENCER_ADMIN_KEY) {
            Ok(admin) => admin,
            Err(outcome) => return outcome,
        };
        if upgrade_admin == sequencer_admin {
            Outcome::fail("upgrade admin and sequencer admin are the same account")
        } else {
            Outcome::Pass
        }
    }
}

#[cfg(test)]
mod tests {
    use warden_interface::mocks::{healthy_builder, mock_address};

    use super::*;

    #[test]
    fn distinct_admins_pass() {
        let facts = healthy_builder().build().unwrap();
        assert!(AdminSeparation::new().evaluate(&facts).is_pass());
    }

    #[test]
    fn shared_admin_fails() {
        let shared = mock_address(7).to_string();
        let facts = healthy_builder()
            .param(UPGRADE_ADMIN_KEY, shared.clone())
            .param(SEQUENCER_ADMIN_KEY, shared)
            .build()
            .unwrap();
        match AdminSeparation::new().evaluate(&facts) {
            Outcome::Fail(violation) => assert_eq!(
                violation.detail,
                "upgrade admin and sequencer admin are the same account"
            ),
            other => panic!("expected Fail, got {:?}", other),
        }
    }

    #[test]
    fn missing_admin_is_not_applicable() {
        let bare = warden_interface::FactModel::builder(
            warden_interface::ChainId::new(1),
            warden_interface::Timestamp::from_secs(1_700_000_000),
        )
        .build()
        .unwrap();
        assert!(matches!(
            AdminSeparation::new().evaluate(&bare),
            Outcome::NotApplicable(_)
        ));
    }

    #[test]
    fn malformed_admin_is_inconclusive() {
        let facts = healthy_builder()
            .param(UPGRADE_ADMIN_KEY, "not-an-address")
            .build()
            .unwrap();
        assert!(matches!(
            AdminSeparation::new().evaluate(&facts),
            Outcome::Inconclusive(_)
        ));
    }
}
