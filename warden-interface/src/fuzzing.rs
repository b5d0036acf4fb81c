//! Proptest strategies over fact models and findings.
//!
//! Strategies only generate well-formed values: fact models always satisfy
//! the builder's structural invariants, and rule ids / snapshot hashes are
//! drawn from small pools so that generated finding sets actually contain
//! duplicates for deduplication properties to bite on.

use proptest::prelude::*;

use crate::address::Address;
use crate::fact::{
    AnchorFacts, ChainId, FactModel, OperatorFacts, OracleFacts, ParamValue, RotationPolicy,
    SnapshotHash, SnapshotRef, Timestamp, UpgradeFacts, WithdrawalFacts,
};
use crate::report::{Finding, FindingKind};
use crate::rule::{Category, RuleId, Severity};

/// Strategy over arbitrary addresses.
pub fn arb_address() -> impl Strategy<Value = Address> {
    any::<[u8; 20]>().prop_map(Address::new)
}

/// Strategy over rotation policies with nonzero automatic intervals.
pub fn arb_rotation_policy() -> impl Strategy<Value = RotationPolicy> {
    prop_oneof![
        Just(RotationPolicy::Unspecified),
        Just(RotationPolicy::Manual),
        (1u64..=180 * 86_400).prop_map(|interval_secs| RotationPolicy::Automatic { interval_secs }),
    ]
}

/// Strategy over well-formed operator facts observed at `observed_at`.
pub fn arb_operator_facts(observed_at: u64) -> impl Strategy<Value = OperatorFacts> {
    (
        prop::collection::vec(arb_address(), 1..4),
        arb_rotation_policy(),
        prop::option::of(0u64..=observed_at),
    )
        .prop_map(|(members, rotation, last_active)| OperatorFacts {
            members,
            rotation,
            last_active_at: last_active.map(Timestamp::from_secs),
        })
}

/// Strategy over upgrade facts; scheduled activations may lie in the
/// future, which is legal.
pub fn arb_upgrade_facts(observed_at: u64) -> impl Strategy<Value = UpgradeFacts> {
    (
        0u64..=30 * 86_400,
        prop::option::of(arb_address()),
        prop::option::of(
            observed_at.saturating_sub(86_400)..=observed_at.saturating_add(30 * 86_400),
        ),
    )
        .prop_map(
            |(execution_delay_secs, pending_implementation, scheduled)| UpgradeFacts {
                execution_delay_secs,
                pending_implementation,
                scheduled_activation_at: scheduled.map(Timestamp::from_secs),
            },
        )
}

/// Strategy over withdrawal facts.
pub fn arb_withdrawal_facts() -> impl Strategy<Value = WithdrawalFacts> {
    (0u64..=30 * 86_400, 0u128..=10u128.pow(24), any::<bool>()).prop_map(
        |(delay_secs, liquidity_wei, emergency_mode)| WithdrawalFacts {
            delay_secs,
            liquidity_wei,
            emergency_mode,
        },
    )
}

/// Strategy over anchor facts accepted at or before `observed_at`.
pub fn arb_anchor_facts(observed_at: u64) -> impl Strategy<Value = AnchorFacts> {
    (0u64..=observed_at, "[a-z][a-z0-9-]{0,15}").prop_map(|(anchored_at, source_registry)| {
        AnchorFacts {
            anchored_at: Timestamp::from_secs(anchored_at),
            source_registry,
        }
    })
}

/// Strategy over oracle facts with nonzero freshness bounds.
pub fn arb_oracle_facts() -> impl Strategy<Value = OracleFacts> {
    (arb_address(), prop::option::of(arb_address()), 1u64..=30 * 86_400).prop_map(
        |(primary, backup, freshness_bound_secs)| OracleFacts {
            primary,
            backup,
            freshness_bound_secs,
        },
    )
}

/// Strategy over typed extension parameter values.
pub fn arb_param_value() -> impl Strategy<Value = ParamValue> {
    prop_oneof![
        any::<u64>().prop_map(ParamValue::Uint),
        any::<bool>().prop_map(ParamValue::Flag),
        "[a-z0-9_-]{0,12}".prop_map(ParamValue::Text),
    ]
}

/// Strategy over well-formed fact models.
pub fn arb_fact_model() -> impl Strategy<Value = FactModel> {
    (1u64..=1_000_000u64, 1_000u64..=4_000_000_000u64).prop_flat_map(|(chain_id, observed_at)| {
        (
            prop::option::of(arb_operator_facts(observed_at)),
            prop::option::of(arb_operator_facts(observed_at)),
            prop::option::of(arb_upgrade_facts(observed_at)),
            prop::option::of(arb_withdrawal_facts()),
            prop::option::of(arb_anchor_facts(observed_at)),
            prop::option::of(arb_oracle_facts()),
            prop::collection::btree_map("[a-z][a-z_]{0,11}", arb_param_value(), 0..4),
        )
            .prop_map(
                move |(sequencer, proposer, upgrades, withdrawals, anchor, oracle, params)| {
                    let mut builder = FactModel::builder(
                        ChainId::new(chain_id),
                        Timestamp::from_secs(observed_at),
                    );
                    if let Some(facts) = sequencer {
                        builder = builder.sequencer(facts);
                    }
                    if let Some(facts) = proposer {
                        builder = builder.proposer(facts);
                    }
                    if let Some(facts) = upgrades {
                        builder = builder.upgrades(facts);
                    }
                    if let Some(facts) = withdrawals {
                        builder = builder.withdrawals(facts);
                    }
                    if let Some(facts) = anchor {
                        builder = builder.anchor(facts);
                    }
                    if let Some(facts) = oracle {
                        builder = builder.oracle(facts);
                    }
                    for (key, value) in params {
                        builder = builder.param(key, value);
                    }
                    builder
                        .build()
                        .expect("strategy only generates well-formed snapshots")
                },
            )
    })
}

/// Strategy over rule ids, drawn from a pool of 24 so duplicates occur.
pub fn arb_rule_id() -> impl Strategy<Value = RuleId> {
    (0u32..24u32).prop_map(|n| {
        RuleId::new(format!("fuzz.rule-{:02}", n))
            .expect("strategy only generates well-formed ids")
    })
}

/// Strategy over snapshot references, drawn from small pools.
pub fn arb_snapshot_ref() -> impl Strategy<Value = SnapshotRef> {
    (1u64..=4u64, 1u64..=1_000u64, 0u8..=3u8).prop_map(|(chain, observed, seed)| SnapshotRef {
        chain_id: ChainId::new(chain),
        observed_at: Timestamp::from_secs(observed),
        hash: SnapshotHash::new([seed; 32]),
    })
}

/// Strategy over findings.
pub fn arb_finding() -> impl Strategy<Value = Finding> {
    (
        arb_rule_id(),
        any::<Category>(),
        any::<Severity>(),
        "[a-z ]{0,32}",
        arb_snapshot_ref(),
        prop_oneof![Just(FindingKind::Violation), Just(FindingKind::Inconclusive)],
    )
        .prop_map(|(rule_id, category, severity, detail, snapshot, kind)| Finding {
            rule_id,
            category,
            severity,
            detail,
            snapshot,
            kind,
        })
}
