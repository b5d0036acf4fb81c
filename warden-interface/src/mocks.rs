//! Mock implementations of the warden interfaces, plus a known-healthy
//! snapshot fixture, for testing.

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::address::{Address, ADDRESS_LEN};
use crate::errors::DataUnavailableError;
use crate::fact::{
    AnchorFacts, ChainId, FactModel, FactModelBuilder, OperatorFacts, OracleFacts, RotationPolicy,
    Timestamp, UpgradeFacts, WithdrawalFacts,
};
use crate::provider::FactProvider;
use crate::rule::{Category, Outcome, Rule, RuleId, Severity};

/// Chain id used by the mock fixtures.
pub const MOCK_CHAIN_ID: ChainId = ChainId::new(42161);

/// Observation time used by the mock fixtures.
pub const MOCK_OBSERVED_AT: Timestamp = Timestamp::from_secs(1_700_000_000);

/// An address whose 20 bytes all equal `byte`.
pub fn mock_address(byte: u8) -> Address {
    Address::new([byte; ADDRESS_LEN])
}

/// An operator set with a primary, a distinct nonzero backup, a declared
/// rotation policy and recent activity.
pub fn healthy_operator() -> OperatorFacts {
    OperatorFacts {
        members: vec![mock_address(0x11), mock_address(0x12)],
        rotation: RotationPolicy::Manual,
        last_active_at: Some(Timestamp::from_secs(MOCK_OBSERVED_AT.secs() - 600)),
    }
}

/// Upgrade facts with a one-week execution delay and nothing pending.
pub fn healthy_upgrades() -> UpgradeFacts {
    UpgradeFacts {
        execution_delay_secs: 7 * 86_400,
        pending_implementation: None,
        scheduled_activation_at: None,
    }
}

/// Withdrawal facts with a one-day delay, deep liquidity and no emergency.
pub fn healthy_withdrawals() -> WithdrawalFacts {
    WithdrawalFacts {
        delay_secs: 86_400,
        liquidity_wei: 500 * 10u128.pow(18),
        emergency_mode: false,
    }
}

/// Anchor facts accepted one hour before observation.
pub fn healthy_anchor() -> AnchorFacts {
    AnchorFacts {
        anchored_at: Timestamp::from_secs(MOCK_OBSERVED_AT.secs() - 3600),
        source_registry: "rollup-registry-v1".to_string(),
    }
}

/// Oracle facts with a distinct nonzero backup and a 15-minute freshness
/// bound.
pub fn healthy_oracle() -> OracleFacts {
    OracleFacts {
        primary: mock_address(0x21),
        backup: Some(mock_address(0x22)),
        freshness_bound_secs: 900,
    }
}

/// A builder pre-populated with every fact section and extension parameter
/// in a configuration the built-in catalog considers healthy. Tests degrade
/// individual sections by overwriting them before building.
pub fn healthy_builder() -> FactModelBuilder {
    FactModel::builder(MOCK_CHAIN_ID, MOCK_OBSERVED_AT)
        .sequencer(healthy_operator())
        .proposer(OperatorFacts {
            members: vec![mock_address(0x13), mock_address(0x14)],
            rotation: RotationPolicy::Automatic {
                interval_secs: 90 * 86_400,
            },
            last_active_at: Some(Timestamp::from_secs(MOCK_OBSERVED_AT.secs() - 1800)),
        })
        .upgrades(healthy_upgrades())
        .withdrawals(healthy_withdrawals())
        .anchor(healthy_anchor())
        .oracle(healthy_oracle())
        .param("block_gas_limit", 30_000_000u64)
        .param("force_inclusion_window_secs", 43_200u64)
        .param("confirmation_depth_blocks", 12u64)
        .param("bridge_rate_limit_per_hour", 1_000u64)
        .param("da_mode", "rollup")
        .param("proof_system", "validity")
        .param("genesis_config_hash", "0x6bfb0d26...e41c")
        .param("upgrade_admin", mock_address(0x31).to_string())
        .param("sequencer_admin", mock_address(0x32).to_string())
}

/// The healthy fixture, built.
pub fn healthy_fact_model() -> FactModel {
    healthy_builder()
        .build()
        .expect("healthy fixture must be well-formed")
}

enum MockBehavior {
    Fixed(Outcome),
    Panic(String),
}

/// A [`Rule`] with scripted behavior, for registry and engine tests.
pub struct MockRule {
    id: RuleId,
    category: Category,
    severity: Severity,
    behavior: MockBehavior,
}

impl MockRule {
    /// A rule that returns `outcome` for every snapshot.
    pub fn returning(
        id: &str,
        category: Category,
        severity: Severity,
        outcome: Outcome,
    ) -> Self {
        Self {
            id: RuleId::new(id).expect("mock rule ids must be well-formed"),
            category,
            severity,
            behavior: MockBehavior::Fixed(outcome),
        }
    }

    /// A rule whose predicate panics with `message`, for fault-isolation
    /// tests.
    pub fn panicking(id: &str, category: Category, severity: Severity, message: &str) -> Self {
        Self {
            id: RuleId::new(id).expect("mock rule ids must be well-formed"),
            category,
            severity,
            behavior: MockBehavior::Panic(message.to_string()),
        }
    }
}

impl Rule for MockRule {
    fn id(&self) -> &RuleId {
        &self.id
    }

    fn title(&self) -> &str {
        "mock rule"
    }

    fn category(&self) -> Category {
        self.category
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn evaluate(&self, _facts: &FactModel) -> Outcome {
        match &self.behavior {
            MockBehavior::Fixed(outcome) => outcome.clone(),
            MockBehavior::Panic(message) => panic!("{}", message),
        }
    }
}

/// A [`FactProvider`] that serves pre-loaded snapshots from memory.
#[derive(Default)]
pub struct MockFactProvider {
    snapshots: BTreeMap<ChainId, FactModel>,
}

impl MockFactProvider {
    /// An empty provider; every fetch fails with
    /// [`DataUnavailableError::UnknownChain`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `model` as the snapshot served for its chain id.
    pub fn with_model(mut self, model: FactModel) -> Self {
        self.snapshots.insert(model.chain_id(), model);
        self
    }
}

#[async_trait]
impl FactProvider for MockFactProvider {
    async fn fetch_fact_model(
        &self,
        chain_id: ChainId,
        at_time: Timestamp,
    ) -> Result<FactModel, DataUnavailableError> {
        let model = self
            .snapshots
            .get(&chain_id)
            .ok_or(DataUnavailableError::UnknownChain(chain_id))?;
        if model.observed_at() > at_time {
            return Err(DataUnavailableError::SnapshotMissing {
                chain_id,
                requested: at_time,
            });
        }
        Ok(model.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn healthy_fixture_is_well_formed() {
        let model = healthy_fact_model();
        assert_eq!(model.chain_id(), MOCK_CHAIN_ID);
        assert!(model.sequencer().is_some());
        assert!(model.oracle().is_some());
        assert_eq!(model.uint_param("confirmation_depth_blocks"), Some(12));
    }

    #[tokio::test]
    async fn mock_provider_serves_loaded_models() {
        let provider = MockFactProvider::new().with_model(healthy_fact_model());
        let model = provider
            .fetch_fact_model(MOCK_CHAIN_ID, MOCK_OBSERVED_AT)
            .await
            .unwrap();
        assert_eq!(model.snapshot_hash(), healthy_fact_model().snapshot_hash());
    }

    #[tokio::test]
    async fn mock_provider_rejects_unknown_chains() {
        let provider = MockFactProvider::new();
        let err = provider
            .fetch_fact_model(ChainId::new(999), MOCK_OBSERVED_AT)
            .await
            .unwrap_err();
        assert!(matches!(err, DataUnavailableError::UnknownChain(_)));
    }

    #[tokio::test]
    async fn mock_provider_rejects_times_before_its_snapshot() {
        let provider = MockFactProvider::new().with_model(healthy_fact_model());
        let err = provider
            .fetch_fact_model(
                MOCK_CHAIN_ID,
                Timestamp::from_secs(MOCK_OBSERVED_AT.secs() - 1),
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DataUnavailableError::SnapshotMissing { .. }
        ));
    }
}
