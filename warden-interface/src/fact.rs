//! The fact model: an immutable, versioned snapshot of one rollup
//! deployment's observable configuration.
//!
//! Snapshots are the only input rules ever see. They are constructed through
//! [`FactModelBuilder`], which enforces the structural invariants listed on
//! [`FactModel::builder`], and they carry their own observation time so that
//! "how stale is this?" questions never consult a wall clock.

use std::collections::BTreeMap;

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::address::Address;
use crate::errors::MalformedFactError;

/// Version of the fact-model schema produced by this crate. A snapshot
/// records the version it was built with, and the version participates in
/// the snapshot hash.
pub const FACT_SCHEMA_VERSION: u32 = 1;

/// Numeric chain identifier of the rollup a snapshot describes.
///
/// Zero is reserved and rejected at snapshot construction.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    BorshDeserialize,
    BorshSerialize,
    schemars::JsonSchema,
)]
#[serde(transparent)]
pub struct ChainId(u64);

impl ChainId {
    /// Wraps a raw chain id.
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// The raw numeric id.
    pub const fn value(&self) -> u64 {
        self.0
    }
}

impl core::fmt::Display for ChainId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A Unix timestamp in whole seconds.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    BorshDeserialize,
    BorshSerialize,
    schemars::JsonSchema,
)]
#[serde(transparent)]
pub struct Timestamp(u64);

impl Timestamp {
    /// Wraps a Unix time in seconds.
    pub const fn from_secs(secs: u64) -> Self {
        Self(secs)
    }

    /// Seconds since the Unix epoch.
    pub const fn secs(&self) -> u64 {
        self.0
    }

    /// Seconds elapsed between `earlier` and `self`, or `None` when
    /// `earlier` is actually later. Callers that hit `None` are looking at
    /// inconsistent data and should say so rather than truncate.
    pub const fn checked_secs_since(&self, earlier: Timestamp) -> Option<u64> {
        self.0.checked_sub(earlier.0)
    }
}

impl core::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How an operator set replaces its members or keys.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, BorshDeserialize, BorshSerialize,
)]
#[serde(rename_all = "snake_case")]
pub enum RotationPolicy {
    /// No rotation policy is declared anywhere observable.
    Unspecified,
    /// Rotation requires a manual operational action.
    Manual,
    /// Rotation happens automatically on a fixed cadence.
    Automatic {
        /// Interval between rotations, in seconds. Must be nonzero.
        interval_secs: u64,
    },
}

/// Observable configuration of an operator set (sequencer or proposer).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshDeserialize, BorshSerialize)]
pub struct OperatorFacts {
    /// Operator addresses in priority order; index zero is the primary.
    pub members: Vec<Address>,
    /// Declared member/key rotation policy.
    pub rotation: RotationPolicy,
    /// When the operator was last observed acting on-chain, if known.
    pub last_active_at: Option<Timestamp>,
}

/// Upgrade mechanics of the deployment's contracts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshDeserialize, BorshSerialize)]
pub struct UpgradeFacts {
    /// Enforced delay between scheduling an upgrade and executing it, in
    /// seconds. This is the users' exit window.
    pub execution_delay_secs: u64,
    /// Implementation address currently scheduled to activate, if any.
    pub pending_implementation: Option<Address>,
    /// When the pending implementation activates, if scheduled.
    pub scheduled_activation_at: Option<Timestamp>,
}

/// Configuration of the user exit path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshDeserialize, BorshSerialize)]
pub struct WithdrawalFacts {
    /// Delay imposed on withdrawals, in seconds.
    pub delay_secs: u64,
    /// Liquidity available to honor exits, in wei.
    pub liquidity_wei: u128,
    /// Whether the deployment is currently in emergency mode.
    pub emergency_mode: bool,
}

/// Metadata of the most recently accepted state root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshDeserialize, BorshSerialize)]
pub struct AnchorFacts {
    /// When the most recent anchor root was accepted.
    pub anchored_at: Timestamp,
    /// Identifier of the registry contract the anchor was read from.
    pub source_registry: String,
}

/// Configuration of the deployment's external data feeds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshDeserialize, BorshSerialize)]
pub struct OracleFacts {
    /// Primary oracle address.
    pub primary: Address,
    /// Backup oracle address, if one is configured.
    pub backup: Option<Address>,
    /// Maximum tolerated staleness of oracle answers, in seconds. Must be
    /// nonzero.
    pub freshness_bound_secs: u64,
}

/// A typed extension parameter.
///
/// Deployments differ in which knobs they expose; anything without a
/// dedicated fact section travels in the snapshot's parameter map under a
/// documented key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshDeserialize, BorshSerialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamValue {
    /// Unsigned numeric parameter; units are documented per key.
    Uint(u64),
    /// Boolean feature flag.
    Flag(bool),
    /// Free-form text parameter.
    Text(String),
}

impl ParamValue {
    /// The numeric value, if this parameter is a [`ParamValue::Uint`].
    pub fn as_uint(&self) -> Option<u64> {
        match self {
            ParamValue::Uint(value) => Some(*value),
            _ => None,
        }
    }

    /// The flag value, if this parameter is a [`ParamValue::Flag`].
    pub fn as_flag(&self) -> Option<bool> {
        match self {
            ParamValue::Flag(value) => Some(*value),
            _ => None,
        }
    }

    /// The text value, if this parameter is a [`ParamValue::Text`].
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ParamValue::Text(value) => Some(value),
            _ => None,
        }
    }
}

impl From<u64> for ParamValue {
    fn from(value: u64) -> Self {
        ParamValue::Uint(value)
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Flag(value)
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Text(value)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Text(value.to_string())
    }
}

/// SHA-256 digest of a snapshot's canonical borsh encoding.
///
/// Equal fact content yields an equal hash; any observable difference,
/// including the observation time, yields a different one.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SnapshotHash([u8; 32]);

impl SnapshotHash {
    /// Wraps a raw digest. Snapshot hashes are normally obtained from
    /// [`FactModel::snapshot_hash`]; this exists for deserialization and
    /// test fixtures.
    pub const fn new(digest: [u8; 32]) -> Self {
        Self(digest)
    }

    /// The raw digest bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl core::fmt::Display for SnapshotHash {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl core::fmt::Debug for SnapshotHash {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "SnapshotHash({})", hex::encode(self.0))
    }
}

impl serde::Serialize for SnapshotHash {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        if serializer.is_human_readable() {
            serializer.collect_str(self)
        } else {
            serde::Serialize::serialize(&self.0, serializer)
        }
    }
}

impl<'de> serde::Deserialize<'de> for SnapshotHash {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        if deserializer.is_human_readable() {
            let hex_digest: String = serde::Deserialize::deserialize(deserializer)?;
            let bytes = hex::decode(&hex_digest).map_err(serde::de::Error::custom)?;
            let digest: [u8; 32] = bytes
                .try_into()
                .map_err(|_| serde::de::Error::custom("snapshot hash must be 32 bytes"))?;
            Ok(Self(digest))
        } else {
            let digest = <[u8; 32] as serde::Deserialize>::deserialize(deserializer)?;
            Ok(Self(digest))
        }
    }
}

impl schemars::JsonSchema for SnapshotHash {
    fn schema_name() -> String {
        "SnapshotHash".to_string()
    }

    fn json_schema(gen: &mut schemars::gen::SchemaGenerator) -> schemars::schema::Schema {
        // Serialized as lowercase hex in human-readable formats.
        String::json_schema(gen)
    }
}

/// Identifies the exact snapshot a finding was derived from, so every
/// verdict can be reproduced later.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, schemars::JsonSchema,
)]
pub struct SnapshotRef {
    /// Chain the snapshot describes.
    pub chain_id: ChainId,
    /// Observation time of the snapshot.
    pub observed_at: Timestamp,
    /// Content hash of the snapshot.
    pub hash: SnapshotHash,
}

/// An immutable, versioned snapshot of one rollup deployment's observable
/// configuration.
///
/// Every fact section is optional: real deployments expose different
/// subsets, and rules report [`crate::Outcome::NotApplicable`] for sections
/// a snapshot does not carry. Fields are private; once built, a snapshot
/// can only be read or copied-with-override, never mutated. Deserialized
/// snapshots pass through the same validation as the builder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize)]
#[serde(try_from = "RawFactModel")]
pub struct FactModel {
    schema_version: u32,
    chain_id: ChainId,
    observed_at: Timestamp,
    sequencer: Option<OperatorFacts>,
    proposer: Option<OperatorFacts>,
    upgrades: Option<UpgradeFacts>,
    withdrawals: Option<WithdrawalFacts>,
    anchor: Option<AnchorFacts>,
    oracle: Option<OracleFacts>,
    params: BTreeMap<String, ParamValue>,
}

impl FactModel {
    /// Starts building a snapshot of `chain_id` as observed at
    /// `observed_at`.
    ///
    /// [`FactModelBuilder::build`] enforces the structural invariants of a
    /// well-formed snapshot:
    ///
    /// - the chain id and observation time are nonzero;
    /// - operator sections, when present, list at least one member;
    /// - automatic rotation intervals and oracle freshness bounds are
    ///   nonzero;
    /// - recorded past events (anchor acceptance, operator activity) do not
    ///   postdate the observation time;
    /// - extension parameter keys are non-blank.
    pub fn builder(chain_id: ChainId, observed_at: Timestamp) -> FactModelBuilder {
        FactModelBuilder {
            chain_id,
            observed_at,
            sequencer: None,
            proposer: None,
            upgrades: None,
            withdrawals: None,
            anchor: None,
            oracle: None,
            params: BTreeMap::new(),
        }
    }

    /// Version of the fact schema this snapshot was built with.
    pub fn schema_version(&self) -> u32 {
        self.schema_version
    }

    /// Chain this snapshot describes.
    pub fn chain_id(&self) -> ChainId {
        self.chain_id
    }

    /// When the snapshot was taken. Rules treat this as "now".
    pub fn observed_at(&self) -> Timestamp {
        self.observed_at
    }

    /// Sequencer facts, if observed.
    pub fn sequencer(&self) -> Option<&OperatorFacts> {
        self.sequencer.as_ref()
    }

    /// Proposer facts, if observed.
    pub fn proposer(&self) -> Option<&OperatorFacts> {
        self.proposer.as_ref()
    }

    /// Upgrade facts, if observed.
    pub fn upgrades(&self) -> Option<&UpgradeFacts> {
        self.upgrades.as_ref()
    }

    /// Withdrawal-path facts, if observed.
    pub fn withdrawals(&self) -> Option<&WithdrawalFacts> {
        self.withdrawals.as_ref()
    }

    /// Anchor-root facts, if observed.
    pub fn anchor(&self) -> Option<&AnchorFacts> {
        self.anchor.as_ref()
    }

    /// Oracle facts, if observed.
    pub fn oracle(&self) -> Option<&OracleFacts> {
        self.oracle.as_ref()
    }

    /// All extension parameters, keyed by documented name.
    pub fn params(&self) -> &BTreeMap<String, ParamValue> {
        &self.params
    }

    /// Looks up one extension parameter.
    pub fn param(&self, key: &str) -> Option<&ParamValue> {
        self.params.get(key)
    }

    /// Looks up a numeric extension parameter. `None` when the key is
    /// absent or holds a different type.
    pub fn uint_param(&self, key: &str) -> Option<u64> {
        self.param(key).and_then(ParamValue::as_uint)
    }

    /// Looks up a flag extension parameter.
    pub fn flag_param(&self, key: &str) -> Option<bool> {
        self.param(key).and_then(ParamValue::as_flag)
    }

    /// Looks up a text extension parameter.
    pub fn text_param(&self, key: &str) -> Option<&str> {
        self.param(key).and_then(ParamValue::as_text)
    }

    /// Returns a new snapshot identical to this one except that `key` is
    /// set to `value`, for "what would the report say if" experiments.
    ///
    /// The original is untouched, and the copy passes through the same
    /// validation as the builder.
    pub fn with_override(
        &self,
        key: impl Into<String>,
        value: impl Into<ParamValue>,
    ) -> Result<FactModel, MalformedFactError> {
        let mut next = self.clone();
        next.params.insert(key.into(), value.into());
        next.validate()?;
        Ok(next)
    }

    /// Content hash of this snapshot: SHA-256 over the canonical borsh
    /// encoding. Two snapshots with equal observable content hash equally.
    pub fn snapshot_hash(&self) -> SnapshotHash {
        let encoded = self
            .try_to_vec()
            .expect("Serialization to vec is infallible");
        let mut hasher = Sha256::new();
        hasher.update(&encoded);
        SnapshotHash(hasher.finalize().into())
    }

    /// The reference findings carry to identify this snapshot.
    pub fn snapshot_ref(&self) -> SnapshotRef {
        SnapshotRef {
            chain_id: self.chain_id,
            observed_at: self.observed_at,
            hash: self.snapshot_hash(),
        }
    }

    fn validate(&self) -> Result<(), MalformedFactError> {
        if self.chain_id.value() == 0 {
            return Err(MalformedFactError::ZeroChainId);
        }
        if self.observed_at.secs() == 0 {
            return Err(MalformedFactError::ZeroObservationTime);
        }
        if let Some(sequencer) = &self.sequencer {
            validate_operator(sequencer, "sequencer", self.observed_at)?;
        }
        if let Some(proposer) = &self.proposer {
            validate_operator(proposer, "proposer", self.observed_at)?;
        }
        if let Some(anchor) = &self.anchor {
            if anchor.anchored_at > self.observed_at {
                return Err(MalformedFactError::FutureTimestamp {
                    field: "anchor acceptance time",
                });
            }
        }
        if let Some(oracle) = &self.oracle {
            if oracle.freshness_bound_secs == 0 {
                return Err(MalformedFactError::ZeroFreshnessBound);
            }
        }
        if self.params.keys().any(|key| key.trim().is_empty()) {
            return Err(MalformedFactError::BlankParamKey);
        }
        Ok(())
    }
}

fn validate_operator(
    facts: &OperatorFacts,
    section: &'static str,
    observed_at: Timestamp,
) -> Result<(), MalformedFactError> {
    if facts.members.is_empty() {
        return Err(MalformedFactError::EmptyOperatorSet { section });
    }
    if let RotationPolicy::Automatic { interval_secs: 0 } = facts.rotation {
        return Err(MalformedFactError::ZeroRotationInterval { section });
    }
    if let Some(last_active_at) = facts.last_active_at {
        if last_active_at > observed_at {
            return Err(MalformedFactError::FutureTimestamp {
                field: "operator activity time",
            });
        }
    }
    Ok(())
}

/// The unvalidated wire shape of a [`FactModel`]. Both decoding paths pass
/// through it, so an invariant-violating snapshot cannot enter through a
/// serialized form. Field order must match [`FactModel`] for the borsh
/// layout to agree.
#[derive(Deserialize, BorshDeserialize)]
struct RawFactModel {
    schema_version: u32,
    chain_id: ChainId,
    observed_at: Timestamp,
    sequencer: Option<OperatorFacts>,
    proposer: Option<OperatorFacts>,
    upgrades: Option<UpgradeFacts>,
    withdrawals: Option<WithdrawalFacts>,
    anchor: Option<AnchorFacts>,
    oracle: Option<OracleFacts>,
    params: BTreeMap<String, ParamValue>,
}

impl TryFrom<RawFactModel> for FactModel {
    type Error = MalformedFactError;

    fn try_from(raw: RawFactModel) -> Result<Self, Self::Error> {
        let model = FactModel {
            schema_version: raw.schema_version,
            chain_id: raw.chain_id,
            observed_at: raw.observed_at,
            sequencer: raw.sequencer,
            proposer: raw.proposer,
            upgrades: raw.upgrades,
            withdrawals: raw.withdrawals,
            anchor: raw.anchor,
            oracle: raw.oracle,
            params: raw.params,
        };
        model.validate()?;
        Ok(model)
    }
}

impl BorshDeserialize for FactModel {
    fn deserialize_reader<R: std::io::Read>(reader: &mut R) -> std::io::Result<Self> {
        let raw = RawFactModel::deserialize_reader(reader)?;
        FactModel::try_from(raw).map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))
    }
}

/// Builder for [`FactModel`] snapshots. Setters consume and return the
/// builder; [`FactModelBuilder::build`] validates and freezes the result.
#[derive(Debug, Clone)]
pub struct FactModelBuilder {
    chain_id: ChainId,
    observed_at: Timestamp,
    sequencer: Option<OperatorFacts>,
    proposer: Option<OperatorFacts>,
    upgrades: Option<UpgradeFacts>,
    withdrawals: Option<WithdrawalFacts>,
    anchor: Option<AnchorFacts>,
    oracle: Option<OracleFacts>,
    params: BTreeMap<String, ParamValue>,
}

impl FactModelBuilder {
    /// Sets the sequencer facts.
    pub fn sequencer(mut self, facts: OperatorFacts) -> Self {
        self.sequencer = Some(facts);
        self
    }

    /// Sets the proposer facts.
    pub fn proposer(mut self, facts: OperatorFacts) -> Self {
        self.proposer = Some(facts);
        self
    }

    /// Sets the upgrade facts.
    pub fn upgrades(mut self, facts: UpgradeFacts) -> Self {
        self.upgrades = Some(facts);
        self
    }

    /// Sets the withdrawal facts.
    pub fn withdrawals(mut self, facts: WithdrawalFacts) -> Self {
        self.withdrawals = Some(facts);
        self
    }

    /// Sets the anchor facts.
    pub fn anchor(mut self, facts: AnchorFacts) -> Self {
        self.anchor = Some(facts);
        self
    }

    /// Sets the oracle facts.
    pub fn oracle(mut self, facts: OracleFacts) -> Self {
        self.oracle = Some(facts);
        self
    }

    /// Adds one extension parameter.
    pub fn param(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Validates the accumulated facts and produces the immutable snapshot.
    pub fn build(self) -> Result<FactModel, MalformedFactError> {
        let model = FactModel {
            schema_version: FACT_SCHEMA_VERSION,
            chain_id: self.chain_id,
            observed_at: self.observed_at,
            sequencer: self.sequencer,
            proposer: self.proposer,
            upgrades: self.upgrades,
            withdrawals: self.withdrawals,
            anchor: self.anchor,
            oracle: self.oracle,
            params: self.params,
        };
        model.validate()?;
        Ok(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_builder() -> FactModelBuilder {
        FactModel::builder(ChainId::new(42161), Timestamp::from_secs(1_700_000_000))
    }

    fn operator(members: Vec<Address>) -> OperatorFacts {
        OperatorFacts {
            members,
            rotation: RotationPolicy::Manual,
            last_active_at: Some(Timestamp::from_secs(1_699_999_000)),
        }
    }

    #[test]
    fn builds_minimal_snapshot() {
        let model = base_builder().build().unwrap();
        assert_eq!(model.schema_version(), FACT_SCHEMA_VERSION);
        assert_eq!(model.chain_id(), ChainId::new(42161));
        assert!(model.sequencer().is_none());
        assert!(model.params().is_empty());
    }

    #[test]
    fn rejects_zero_chain_id() {
        let err = FactModel::builder(ChainId::new(0), Timestamp::from_secs(1))
            .build()
            .unwrap_err();
        assert_eq!(err, MalformedFactError::ZeroChainId);
    }

    #[test]
    fn rejects_zero_observation_time() {
        let err = FactModel::builder(ChainId::new(1), Timestamp::from_secs(0))
            .build()
            .unwrap_err();
        assert_eq!(err, MalformedFactError::ZeroObservationTime);
    }

    #[test]
    fn rejects_empty_operator_set() {
        let err = base_builder().sequencer(operator(vec![])).build().unwrap_err();
        assert_eq!(
            err,
            MalformedFactError::EmptyOperatorSet {
                section: "sequencer"
            }
        );
    }

    #[test]
    fn rejects_zero_rotation_interval() {
        let err = base_builder()
            .proposer(OperatorFacts {
                members: vec![Address::new([1; 20])],
                rotation: RotationPolicy::Automatic { interval_secs: 0 },
                last_active_at: None,
            })
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            MalformedFactError::ZeroRotationInterval {
                section: "proposer"
            }
        );
    }

    #[test]
    fn rejects_future_anchor() {
        let err = base_builder()
            .anchor(AnchorFacts {
                anchored_at: Timestamp::from_secs(1_700_000_001),
                source_registry: "rollup-registry-v1".to_string(),
            })
            .build()
            .unwrap_err();
        assert!(matches!(err, MalformedFactError::FutureTimestamp { .. }));
    }

    #[test]
    fn rejects_future_operator_activity() {
        let err = base_builder()
            .sequencer(OperatorFacts {
                members: vec![Address::new([1; 20])],
                rotation: RotationPolicy::Manual,
                last_active_at: Some(Timestamp::from_secs(1_700_000_999)),
            })
            .build()
            .unwrap_err();
        assert!(matches!(err, MalformedFactError::FutureTimestamp { .. }));
    }

    #[test]
    fn rejects_zero_oracle_freshness() {
        let err = base_builder()
            .oracle(OracleFacts {
                primary: Address::new([2; 20]),
                backup: None,
                freshness_bound_secs: 0,
            })
            .build()
            .unwrap_err();
        assert_eq!(err, MalformedFactError::ZeroFreshnessBound);
    }

    #[test]
    fn rejects_blank_param_key() {
        let err = base_builder().param("  ", 7u64).build().unwrap_err();
        assert_eq!(err, MalformedFactError::BlankParamKey);
        let err = base_builder().param("", true).build().unwrap_err();
        assert_eq!(err, MalformedFactError::BlankParamKey);
    }

    #[test]
    fn equal_content_hashes_equally() {
        let a = base_builder()
            .sequencer(operator(vec![Address::new([1; 20])]))
            .param("block_gas_limit", 30_000_000u64)
            .build()
            .unwrap();
        let b = base_builder()
            .sequencer(operator(vec![Address::new([1; 20])]))
            .param("block_gas_limit", 30_000_000u64)
            .build()
            .unwrap();
        assert_eq!(a.snapshot_hash(), b.snapshot_hash());
        assert_eq!(a.snapshot_ref(), b.snapshot_ref());
    }

    #[test]
    fn observation_time_changes_the_hash() {
        let a = FactModel::builder(ChainId::new(1), Timestamp::from_secs(100))
            .build()
            .unwrap();
        let b = FactModel::builder(ChainId::new(1), Timestamp::from_secs(101))
            .build()
            .unwrap();
        assert_ne!(a.snapshot_hash(), b.snapshot_hash());
    }

    #[test]
    fn with_override_leaves_the_original_untouched() {
        let original = base_builder().param("emergency_pause", false).build().unwrap();
        let patched = original.with_override("emergency_pause", true).unwrap();

        assert_eq!(original.flag_param("emergency_pause"), Some(false));
        assert_eq!(patched.flag_param("emergency_pause"), Some(true));
        assert_ne!(original.snapshot_hash(), patched.snapshot_hash());
    }

    #[test]
    fn with_override_rejects_blank_keys() {
        let model = base_builder().build().unwrap();
        assert_eq!(
            model.with_override(" ", 1u64).unwrap_err(),
            MalformedFactError::BlankParamKey
        );
    }

    #[test]
    fn param_accessors_are_typed() {
        let model = base_builder()
            .param("block_gas_limit", 30_000_000u64)
            .param("da_mode", "rollup")
            .param("fast_exit", true)
            .build()
            .unwrap();
        assert_eq!(model.uint_param("block_gas_limit"), Some(30_000_000));
        assert_eq!(model.text_param("da_mode"), Some("rollup"));
        assert_eq!(model.flag_param("fast_exit"), Some(true));
        // Wrong-type lookups miss rather than coerce.
        assert_eq!(model.uint_param("da_mode"), None);
        assert_eq!(model.flag_param("missing"), None);
    }

    #[test]
    fn serde_round_trip_preserves_the_hash() {
        let model = base_builder()
            .oracle(OracleFacts {
                primary: Address::new([3; 20]),
                backup: Some(Address::new([4; 20])),
                freshness_bound_secs: 3600,
            })
            .param("da_mode", "rollup")
            .build()
            .unwrap();
        let json = serde_json::to_string(&model).unwrap();
        let back: FactModel = serde_json::from_str(&json).unwrap();
        assert_eq!(back, model);
        assert_eq!(back.snapshot_hash(), model.snapshot_hash());
    }

    #[test]
    fn deserialization_rejects_tampered_snapshots() {
        let model = base_builder()
            .sequencer(operator(vec![Address::new([1; 20])]))
            .build()
            .unwrap();
        let mut json = serde_json::to_value(&model).unwrap();

        json["chain_id"] = serde_json::json!(0);
        let err = serde_json::from_value::<FactModel>(json.clone()).unwrap_err();
        assert!(err.to_string().contains("chain id must be nonzero"));

        json["chain_id"] = serde_json::json!(42161);
        json["sequencer"]["members"] = serde_json::json!([]);
        assert!(serde_json::from_value::<FactModel>(json).is_err());
    }

    #[test]
    fn borsh_decoding_rejects_tampered_snapshots() {
        let model = base_builder().build().unwrap();
        let mut bytes = model.try_to_vec().unwrap();
        // The u32 schema version occupies bytes 0..4, the u64 chain id the
        // eight bytes after it.
        bytes[4..12].fill(0);
        assert!(FactModel::try_from_slice(&bytes).is_err());
    }
}
