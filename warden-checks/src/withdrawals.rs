//! Exit-path checks: emergency mode, liquidity depth and delay bounds.

use warden_interface::{Category, FactModel, Outcome, Rule, RuleId, Severity};

use crate::catalog_id;
use crate::duration::human_duration;
use crate::policy::WEI_PER_ETHER;

/// Fails, critically, when the deployment is in emergency mode: the exit
/// path is frozen and users cannot leave.
pub struct EmergencyModeOff {
    id: RuleId,
}

impl EmergencyModeOff {
    /// Rule id: `withdrawals.emergency-mode`.
    pub fn new() -> Self {
        Self {
            id: catalog_id(Category::Withdrawals, "emergency-mode"),
        }
    }
}

impl Default for EmergencyModeOff {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for EmergencyModeOff {
    fn id(&self) -> &RuleId {
        &self.id
    }

    fn title(&self) -> &str {
        "deployment is not in emergency mode"
    }

    fn category(&self) -> Category {
        Category::Withdrawals
    }

    fn default_severity(&self) -> Severity {
        Severity::Critical
    }

    fn evaluate(&self, facts: &FactModel) -> Outcome {
        let withdrawals = match facts.withdrawals() {
            Some(withdrawals) => withdrawals,
            None => return Outcome::not_applicable("withdrawal facts absent"),
        };
        if withdrawals.emergency_mode {
            Outcome::fail("deployment is in emergency mode")
        } else {
            Outcome::Pass
        }
    }
}

/// Fails when the withdrawal path holds less liquidity than the policy
/// floor.
pub struct WithdrawalLiquidityFloor {
    id: RuleId,
    floor_wei: u128,
}

impl WithdrawalLiquidityFloor {
    /// Rule id: `withdrawals.liquidity-floor`. The floor is taken in whole
    /// ether to stay expressible in TOML policy files.
    pub fn new(floor_ether: u64) -> Self {
        Self {
            id: catalog_id(Category::Withdrawals, "liquidity-floor"),
            floor_wei: u128::from(floor_ether) * WEI_PER_ETHER,
        }
    }
}

impl Rule for WithdrawalLiquidityFloor {
    fn id(&self) -> &RuleId {
        &self.id
    }

    fn title(&self) -> &str {
        "withdrawal path holds enough liquidity"
    }

    fn category(&self) -> Category {
        Category::Withdrawals
    }

    fn default_severity(&self) -> Severity {
        Severity::High
    }

    fn evaluate(&self, facts: &FactModel) -> Outcome {
        let withdrawals = match facts.withdrawals() {
            Some(withdrawals) => withdrawals,
            None => return Outcome::not_applicable("withdrawal facts absent"),
        };
        if withdrawals.liquidity_wei >= self.floor_wei {
            Outcome::Pass
        } else {
            Outcome::fail(format!(
                "withdrawal liquidity {} wei is below the policy floor of {} wei",
                withdrawals.liquidity_wei, self.floor_wei
            ))
        }
    }
}

/// Fails when withdrawals are delayed longer than the policy maximum.
pub struct WithdrawalDelayBounded {
    id: RuleId,
    max_delay_secs: u64,
}

impl WithdrawalDelayBounded {
    /// Rule id: `withdrawals.delay-bounded`.
    pub fn new(max_delay_secs: u64) -> Self {
        Self {
            id: catalog_id(Category::Withdrawals, "delay-bounded"),
            max_delay_secs,
        }
    }
}

impl Rule for WithdrawalDelayBounded {
    fn id(&self) -> &RuleId {
        &self.id
    }

    fn title(&self) -> &str {
        "withdrawal delay is bounded"
    }

    fn category(&self) -> Category {
        Category::Withdrawals
    }

    fn default_severity(&self) -> Severity {
        Severity::Medium
    }

    fn evaluate(&self, facts: &FactModel) -> Outcome {
        let withdrawals = match facts.withdrawals() {
            Some(withdrawals) => withdrawals,
            None => return Outcome::not_applicable("withdrawal facts absent"),
        };
        if withdrawals.delay_secs <= self.max_delay_secs {
            Outcome::Pass
        } else {
            Outcome::fail(format!(
                "withdrawal delay {} exceeds the policy maximum of {}",
                human_duration(withdrawals.delay_secs),
                human_duration(self.max_delay_secs)
            ))
        }
    }
}
