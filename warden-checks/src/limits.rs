//! Parameter-driven ceiling and floor checks: block gas, bridge throughput,
//! force-inclusion windows and confirmation depth.

use warden_interface::{Category, FactModel, Outcome, Rule, RuleId, Severity};

use crate::catalog_id;
use crate::duration::human_duration;

/// Extension parameter holding the block gas limit.
pub const BLOCK_GAS_LIMIT_KEY: &str = "block_gas_limit";
/// Extension parameter holding the bridge rate limit, in messages per hour.
/// Zero means the limit is disabled.
pub const BRIDGE_RATE_LIMIT_KEY: &str = "bridge_rate_limit_per_hour";
/// Extension parameter holding the force-inclusion window, in seconds.
pub const FORCE_INCLUSION_WINDOW_KEY: &str = "force_inclusion_window_secs";
/// Extension parameter holding the settlement confirmation depth, in blocks.
pub const CONFIRMATION_DEPTH_KEY: &str = "confirmation_depth_blocks";

/// Reads a numeric extension parameter, mapping absence to not-applicable
/// and a type mismatch to inconclusive.
fn uint_param(facts: &FactModel, key: &str) -> Result<u64, Outcome> {
    match facts.param(key) {
        None => Err(Outcome::not_applicable(format!(
            "parameter '{}' absent",
            key
        ))),
        Some(value) => value.as_uint().ok_or_else(|| {
            Outcome::inconclusive(format!("parameter '{}' is not numeric", key))
        }),
    }
}

/// Fails when the block gas limit exceeds the policy ceiling, an outsized
/// denial-of-service surface.
pub struct BlockGasLimitBounded {
    id: RuleId,
    max_gas: u64,
}

impl BlockGasLimitBounded {
    /// Rule id: `resource-limits.block-gas-limit`.
    pub fn new(max_gas: u64) -> Self {
        Self {
            id: catalog_id(Category::ResourceLimits, "block-gas-limit"),
            max_gas,
        }
    }
}

impl Rule for BlockGasLimitBounded {
    fn id(&self) -> &RuleId {
        &self.id
    }

    fn title(&self) -> &str {
        "block gas limit is bounded"
    }

    fn category(&self) -> Category {
        Category::ResourceLimits
    }

    fn default_severity(&self) -> Severity {
        Severity::Medium
    }

    fn evaluate(&self, facts: &FactModel) -> Outcome {
        let gas_limit = match uint_param(facts, BLOCK_GAS_LIMIT_KEY) {
            Ok(gas_limit) => gas_limit,
            Err(outcome) => return outcome,
        };
        if gas_limit <= self.max_gas {
            Outcome::Pass
        } else {
            Outcome::fail(format!(
                "block gas limit {} exceeds the policy maximum of {}",
                gas_limit, self.max_gas
            ))
        }
    }
}

/// Fails when the bridge rate limit is disabled (zero), leaving message
/// throughput unbounded.
pub struct BridgeRateLimited {
    id: RuleId,
}

impl BridgeRateLimited {
    /// Rule id: `rate-limiting.bridge-throughput`.
    pub fn new() -> Self {
        Self {
            id: catalog_id(Category::RateLimiting, "bridge-throughput"),
        }
    }
}

impl Default for BridgeRateLimited {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for BridgeRateLimited {
    fn id(&self) -> &RuleId {
        &self.id
    }

    fn title(&self) -> &str {
        "bridge throughput is rate limited"
    }

    fn category(&self) -> Category {
        Category::RateLimiting
    }

    fn default_severity(&self) -> Severity {
        Severity::High
    }

    fn evaluate(&self, facts: &FactModel) -> Outcome {
        let rate_limit = match uint_param(facts, BRIDGE_RATE_LIMIT_KEY) {
            Ok(rate_limit) => rate_limit,
            Err(outcome) => return outcome,
        };
        if rate_limit == 0 {
            Outcome::fail("bridge rate limit is disabled")
        } else {
            Outcome::Pass
        }
    }
}

/// Fails when the force-inclusion window is longer than the policy allows:
/// the window is how long a censoring sequencer can delay a user
/// transaction before the escape hatch opens.
pub struct ForceInclusionWindowBounded {
    id: RuleId,
    max_window_secs: u64,
}

impl ForceInclusionWindowBounded {
    /// Rule id: `force-inclusion.window`.
    pub fn new(max_window_secs: u64) -> Self {
        Self {
            id: catalog_id(Category::ForceInclusion, "window"),
            max_window_secs,
        }
    }
}

impl Rule for ForceInclusionWindowBounded {
    fn id(&self) -> &RuleId {
        &self.id
    }

    fn title(&self) -> &str {
        "force-inclusion window is bounded"
    }

    fn category(&self) -> Category {
        Category::ForceInclusion
    }

    fn default_severity(&self) -> Severity {
        Severity::High
    }

    fn evaluate(&self, facts: &FactModel) -> Outcome {
        let window_secs = match uint_param(facts, FORCE_INCLUSION_WINDOW_KEY) {
            Ok(window_secs) => window_secs,
            Err(outcome) => return outcome,
        };
        if window_secs <= self.max_window_secs {
            Outcome::Pass
        } else {
            Outcome::fail(format!(
                "force-inclusion window {} exceeds the policy maximum of {}",
                human_duration(window_secs),
                human_duration(self.max_window_secs)
            ))
        }
    }
}

/// Fails when results are treated as final at a shallower settlement depth
/// than the policy requires.
pub struct ConfirmationDepthFloor {
    id: RuleId,
    min_depth: u64,
}

impl ConfirmationDepthFloor {
    /// Rule id: `finality.confirmation-depth`.
    pub fn new(min_depth: u64) -> Self {
        Self {
            id: catalog_id(Category::Finality, "confirmation-depth"),
            min_depth,
        }
    }
}

impl Rule for ConfirmationDepthFloor {
    fn id(&self) -> &RuleId {
        &self.id
    }

    fn title(&self) -> &str {
        "confirmation depth is deep enough"
    }

    fn category(&self) -> Category {
        Category::Finality
    }

    fn default_severity(&self) -> Severity {
        Severity::High
    }

    fn evaluate(&self, facts: &FactModel) -> Outcome {
        let depth = match uint_param(facts, CONFIRMATION_DEPTH_KEY) {
            Ok(depth) => depth,
            Err(outcome) => return outcome,
        };
        if depth >= self.min_depth {
            Outcome::Pass
        } else {
            Outcome::fail(format!(
                "confirmation depth {} blocks is below the required {} blocks",
                depth, self.min_depth
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use warden_interface::mocks::healthy_builder;

    use super::*;

    #[test]
    fn healthy_parameters_pass_all_four() {
        let facts = healthy_builder().build().unwrap();
        assert!(BlockGasLimitBounded::new(30_000_000).evaluate(&facts).is_pass());
        assert!(BridgeRateLimited::new().evaluate(&facts).is_pass());
        assert!(ForceInclusionWindowBounded::new(86_400)
            .evaluate(&facts)
            .is_pass());
        assert!(ConfirmationDepthFloor::new(12).evaluate(&facts).is_pass());
    }

    #[test]
    fn oversized_gas_limit_fails() {
        let facts = healthy_builder()
            .param(BLOCK_GAS_LIMIT_KEY, 60_000_000u64)
            .build()
            .unwrap();
        match BlockGasLimitBounded::new(30_000_000).evaluate(&facts) {
            Outcome::Fail(violation) => assert_eq!(
                violation.detail,
                "block gas limit 60000000 exceeds the policy maximum of 30000000"
            ),
            other => panic!("expected Fail, got {:?}", other),
        }
    }

    #[test]
    fn disabled_bridge_rate_limit_fails() {
        let facts = healthy_builder()
            .param(BRIDGE_RATE_LIMIT_KEY, 0u64)
            .build()
            .unwrap();
        assert!(!BridgeRateLimited::new().evaluate(&facts).is_pass());
    }

    #[test]
    fn long_force_inclusion_window_fails() {
        let facts = healthy_builder()
            .param(FORCE_INCLUSION_WINDOW_KEY, 3 * 86_400u64)
            .build()
            .unwrap();
        match ForceInclusionWindowBounded::new(86_400).evaluate(&facts) {
            Outcome::Fail(violation) => assert_eq!(
                violation.detail,
                "force-inclusion window 3 days exceeds the policy maximum of 1 day"
            ),
            other => panic!("expected Fail, got {:?}", other),
        }
    }

    #[test]
    fn shallow_confirmation_depth_fails() {
        let facts = healthy_builder()
            .param(CONFIRMATION_DEPTH_KEY, 3u64)
            .build()
            .unwrap();
        match ConfirmationDepthFloor::new(12).evaluate(&facts) {
            Outcome::Fail(violation) => assert_eq!(
                violation.detail,
                "confirmation depth 3 blocks is below the required 12 blocks"
            ),
            other => panic!("expected Fail, got {:?}", other),
        }
    }

    #[test]
    fn absent_parameters_are_not_applicable() {
        let bare = warden_interface::FactModel::builder(
            warden_interface::ChainId::new(1),
            warden_interface::Timestamp::from_secs(1_700_000_000),
        )
        .build()
        .unwrap();
        assert!(matches!(
            BlockGasLimitBounded::new(1).evaluate(&bare),
            Outcome::NotApplicable(_)
        ));
        assert!(matches!(
            ConfirmationDepthFloor::new(1).evaluate(&bare),
            Outcome::NotApplicable(_)
        ));
    }

    #[test]
    fn mistyped_parameter_is_inconclusive() {
        let facts = healthy_builder()
            .param(CONFIRMATION_DEPTH_KEY, "twelve")
            .build()
            .unwrap();
        assert!(matches!(
            ConfirmationDepthFloor::new(12).evaluate(&facts),
            Outcome::Inconclusive(_)
        ));
    }
}
