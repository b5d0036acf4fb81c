//! The built-in rule catalog for rollup deployment reviews.
//!
//! Every rule in this crate is a pure, total predicate over one fact
//! snapshot. Network-sensitive thresholds are injected from a
//! [`PolicyConfig`] when the registry is assembled, never hardcoded in a
//! predicate, so one catalog serves networks with different review
//! policies.

mod duration;

pub mod anchors;
pub mod attestations;
pub mod governance;
pub mod limits;
pub mod operators;
pub mod oracles;
pub mod policy;
pub mod protocol;
pub mod upgrades;
pub mod withdrawals;

pub use policy::{from_toml_path, PolicyConfig};

use std::sync::Arc;

use warden_interface::{Category, DuplicateRuleIdError, Rule, RuleId, RuleRegistry};

use crate::anchors::{AnchorFreshness, AnchorSourceRegistered};
use crate::attestations::builtin_attestations;
use crate::governance::AdminSeparation;
use crate::limits::{
    BlockGasLimitBounded, BridgeRateLimited, ConfirmationDepthFloor, ForceInclusionWindowBounded,
};
use crate::operators::{
    KeyRotationDeclared, OperatorFailoverDefined, OperatorLiveness, OperatorRole,
};
use crate::oracles::{OracleBackupConfigured, OracleBackupDistinct, OracleStalenessBound};
use crate::protocol::{DaModeDeclared, GenesisPinned, ProofSystemDeclared};
use crate::upgrades::{UpgradeActivationNotice, UpgradeExitWindow};
use crate::withdrawals::{EmergencyModeOff, WithdrawalDelayBounded, WithdrawalLiquidityFloor};

/// Builds the `<category-slug>.<subcheck>` id of a built-in rule.
pub(crate) fn catalog_id(category: Category, subcheck: &str) -> RuleId {
    RuleId::new(format!("{}.{}", category.slug(), subcheck))
        .expect("built-in rule ids follow the id grammar")
}

/// Assembles the full built-in catalog against one policy.
///
/// Rules are registered grouped by category, in the canonical category
/// order, so `registry.all()` already reads like a report outline.
pub fn builtin_registry(policy: &PolicyConfig) -> Result<RuleRegistry, DuplicateRuleIdError> {
    let mut rules: Vec<Arc<dyn Rule>> = vec![
        Arc::new(OperatorFailoverDefined::new(OperatorRole::Sequencer)),
        Arc::new(OperatorLiveness::new(
            OperatorRole::Sequencer,
            policy.operator_liveness_secs,
        )),
        Arc::new(OperatorFailoverDefined::new(OperatorRole::Proposer)),
        Arc::new(OperatorLiveness::new(
            OperatorRole::Proposer,
            policy.operator_liveness_secs,
        )),
        Arc::new(ProofSystemDeclared::new()),
        Arc::new(DaModeDeclared::new()),
        Arc::new(UpgradeExitWindow::new(
            policy.min_exit_window_secs,
            policy.critical_exit_window_secs,
        )),
        Arc::new(UpgradeActivationNotice::new(policy.min_exit_window_secs)),
        Arc::new(EmergencyModeOff::new()),
        Arc::new(WithdrawalLiquidityFloor::new(
            policy.min_withdrawal_liquidity_ether,
        )),
        Arc::new(WithdrawalDelayBounded::new(policy.max_withdrawal_delay_secs)),
        Arc::new(ForceInclusionWindowBounded::new(
            policy.max_force_inclusion_window_secs,
        )),
        Arc::new(AnchorFreshness::new(policy.anchor_freshness_secs)),
        Arc::new(AnchorSourceRegistered::new()),
        Arc::new(OracleBackupConfigured::new()),
        Arc::new(OracleBackupDistinct::new()),
        Arc::new(OracleStalenessBound::new(policy.max_oracle_staleness_secs)),
        Arc::new(AdminSeparation::new()),
        Arc::new(KeyRotationDeclared::new()),
        Arc::new(ConfirmationDepthFloor::new(policy.min_confirmation_depth)),
        Arc::new(BlockGasLimitBounded::new(policy.max_block_gas_limit)),
        Arc::new(BridgeRateLimited::new()),
    ];
    rules.extend(
        builtin_attestations()
            .into_iter()
            .map(|attestation| Arc::new(attestation) as Arc<dyn Rule>),
    );
    rules.push(Arc::new(GenesisPinned::new()));

    let mut registry = RuleRegistry::new();
    for rule in rules {
        registry.register(rule)?;
    }

    Ok(registry)
}
