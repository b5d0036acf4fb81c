//! Upgrade checks: exit windows and activation notice.

use warden_interface::{Category, FactModel, Outcome, Rule, RuleId, Severity};

use crate::catalog_id;
use crate::duration::human_duration;

/// Fails when the upgrade execution delay gives users less than the
/// required exit window.
///
/// The violation escalates to critical when the window is not merely short
/// but nearly absent, since users then have no realistic chance to exit
/// before a hostile upgrade lands.
pub struct UpgradeExitWindow {
    id: RuleId,
    min_exit_window_secs: u64,
    critical_below_secs: u64,
}

impl UpgradeExitWindow {
    /// Rule id: `upgrades.exit-window`.
    pub fn new(min_exit_window_secs: u64, critical_below_secs: u64) -> Self {
        Self {
            id: catalog_id(Category::Upgrades, "exit-window"),
            min_exit_window_secs,
            critical_below_secs,
        }
    }
}

impl Rule for UpgradeExitWindow {
    fn id(&self) -> &RuleId {
        &self.id
    }

    fn title(&self) -> &str {
        "upgrade delay leaves an exit window"
    }

    fn category(&self) -> Category {
        Category::Upgrades
    }

    fn default_severity(&self) -> Severity {
        Severity::High
    }

    fn evaluate(&self, facts: &FactModel) -> Outcome {
        let upgrades = match facts.upgrades() {
            Some(upgrades) => upgrades,
            None => return Outcome::not_applicable("upgrade facts absent"),
        };
        let delay_secs = upgrades.execution_delay_secs;
        if delay_secs >= self.min_exit_window_secs {
            return Outcome::Pass;
        }
        let detail = format!(
            "upgrade delay {} is below the required exit window of {}",
            human_duration(delay_secs),
            human_duration(self.min_exit_window_secs)
        );
        if delay_secs < self.critical_below_secs {
            Outcome::fail_with_severity(detail, Severity::Critical)
        } else {
            Outcome::fail(detail)
        }
    }
}

/// Fails when a pending implementation is set to activate with less notice
/// than the required exit window, or with no scheduled activation at all.
pub struct UpgradeActivationNotice {
    id: RuleId,
    min_notice_secs: u64,
}

impl UpgradeActivationNotice {
    /// Rule id: `upgrades.activation-notice`.
    pub fn new(min_notice_secs: u64) -> Self {
        Self {
            id: catalog_id(Category::Upgrades, "activation-notice"),
            min_notice_secs,
        }
    }
}

impl Rule for UpgradeActivationNotice {
    fn id(&self) -> &RuleId {
        &self.id
    }

    fn title(&self) -> &str {
        "pending upgrades give advance notice"
    }

    fn category(&self) -> Category {
        Category::Upgrades
    }

    fn default_severity(&self) -> Severity {
        Severity::High
    }

    fn evaluate(&self, facts: &FactModel) -> Outcome {
        let upgrades = match facts.upgrades() {
            Some(upgrades) => upgrades,
            None => return Outcome::not_applicable("upgrade facts absent"),
        };
        let scheduled_at = match (
            upgrades.pending_implementation,
            upgrades.scheduled_activation_at,
        ) {
            (None, None) => return Outcome::Pass,
            (None, Some(_)) => {
                return Outcome::inconclusive(
                    "activation is scheduled but no pending implementation is set",
                )
            }
            (Some(_), None) => {
                return Outcome::fail("pending implementation has no scheduled activation time")
            }
            (Some(_), Some(scheduled_at)) => scheduled_at,
        };
        let notice_secs = match scheduled_at.checked_secs_since(facts.observed_at()) {
            Some(notice_secs) => notice_secs,
            None => {
                return Outcome::inconclusive(
                    "scheduled activation time is already in the past",
                )
            }
        };
        if notice_secs >= self.min_notice_secs {
            Outcome::Pass
        } else {
            Outcome::fail(format!(
                "pending implementation activates in {}, less than the required exit window of {}",
                human_duration(notice_secs),
                human_duration(self.min_notice_secs)
            ))
        }
    }
}
