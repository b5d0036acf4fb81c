//! Policy thresholds for the built-in rule catalog.
//!
//! Per the catalog's ground rule, no predicate hardcodes a network-sensitive
//! number. Every threshold lives here, has a documented default, and can be
//! overridden from a TOML file, so the same rules serve networks with
//! different policies.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Deserialize;

/// Seconds in one day.
pub const SECS_PER_DAY: u64 = 86_400;

/// Wei in one ether.
pub const WEI_PER_ETHER: u128 = 1_000_000_000_000_000_000;

/// Thresholds consumed when the built-in registry is assembled.
///
/// A TOML policy file may set any subset of fields; the rest keep their
/// defaults.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// Maximum accepted age of the latest anchor root, in seconds.
    /// Default: 180 days.
    pub anchor_freshness_secs: u64,
    /// Minimum delay between scheduling an upgrade and executing it, in
    /// seconds. Default: 3 days.
    pub min_exit_window_secs: u64,
    /// Exit windows below this are escalated to critical, in seconds.
    /// Default: 1 day.
    pub critical_exit_window_secs: u64,
    /// Maximum tolerated operator inactivity, in seconds. Default: 1 hour.
    pub operator_liveness_secs: u64,
    /// Minimum liquidity the withdrawal path must hold, in whole ether.
    /// Default: 100.
    pub min_withdrawal_liquidity_ether: u64,
    /// Maximum withdrawal delay, in seconds. Default: 7 days.
    pub max_withdrawal_delay_secs: u64,
    /// Maximum tolerated oracle staleness bound, in seconds. Default: 1 day.
    pub max_oracle_staleness_secs: u64,
    /// Block gas limits above this are flagged as a denial-of-service
    /// surface. Default: 30,000,000.
    pub max_block_gas_limit: u64,
    /// Maximum force-inclusion window, in seconds. Default: 1 day.
    pub max_force_inclusion_window_secs: u64,
    /// Minimum settlement-layer confirmation depth, in blocks. Default: 12.
    pub min_confirmation_depth: u64,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            anchor_freshness_secs: 180 * SECS_PER_DAY,
            min_exit_window_secs: 3 * SECS_PER_DAY,
            critical_exit_window_secs: SECS_PER_DAY,
            operator_liveness_secs: 3_600,
            min_withdrawal_liquidity_ether: 100,
            max_withdrawal_delay_secs: 7 * SECS_PER_DAY,
            max_oracle_staleness_secs: SECS_PER_DAY,
            max_block_gas_limit: 30_000_000,
            max_force_inclusion_window_secs: SECS_PER_DAY,
            min_confirmation_depth: 12,
        }
    }
}

/// Reads a TOML file as a specific type.
pub fn from_toml_path<P: AsRef<Path>, R: DeserializeOwned>(path: P) -> anyhow::Result<R> {
    let mut contents = String::new();
    {
        let mut file = File::open(path)?;
        file.read_to_string(&mut contents)?;
    }

    let result: R = toml::from_str(&contents)?;

    Ok(result)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    fn create_policy_from(content: &str) -> NamedTempFile {
        let mut policy_file = NamedTempFile::new().unwrap();
        policy_file.write_all(content.as_bytes()).unwrap();
        policy_file
    }

    #[test]
    fn defaults_match_the_checklist() {
        let policy = PolicyConfig::default();
        assert_eq!(policy.anchor_freshness_secs, 15_552_000);
        assert_eq!(policy.min_exit_window_secs, 259_200);
        assert_eq!(policy.critical_exit_window_secs, 86_400);
        assert_eq!(policy.max_block_gas_limit, 30_000_000);
        assert_eq!(policy.min_confirmation_depth, 12);
    }

    #[test]
    fn full_policy_file_parses() {
        let contents = r#"
            anchor_freshness_secs = 7776000
            min_exit_window_secs = 604800
            critical_exit_window_secs = 172800
            operator_liveness_secs = 900
            min_withdrawal_liquidity_ether = 250
            max_withdrawal_delay_secs = 259200
            max_oracle_staleness_secs = 3600
            max_block_gas_limit = 15000000
            max_force_inclusion_window_secs = 43200
            min_confirmation_depth = 64
        "#;
        let policy_file = create_policy_from(contents);

        let policy: PolicyConfig = from_toml_path(policy_file.path()).unwrap();

        assert_eq!(policy.anchor_freshness_secs, 7_776_000);
        assert_eq!(policy.min_exit_window_secs, 604_800);
        assert_eq!(policy.min_withdrawal_liquidity_ether, 250);
        assert_eq!(policy.min_confirmation_depth, 64);
    }

    #[test]
    fn partial_policy_file_keeps_defaults_for_the_rest() {
        let policy_file = create_policy_from("max_block_gas_limit = 20000000\n");

        let policy: PolicyConfig = from_toml_path(policy_file.path()).unwrap();

        assert_eq!(policy.max_block_gas_limit, 20_000_000);
        assert_eq!(policy.anchor_freshness_secs, 180 * SECS_PER_DAY);
        assert_eq!(policy.min_confirmation_depth, 12);
    }

    #[test]
    fn malformed_policy_file_is_an_error() {
        let policy_file = create_policy_from("max_block_gas_limit = \"lots\"\n");
        let result: anyhow::Result<PolicyConfig> = from_toml_path(policy_file.path());
        assert!(result.is_err());
    }

    #[test]
    fn missing_policy_file_is_an_error() {
        let result: anyhow::Result<PolicyConfig> = from_toml_path("nonexistent_policy.toml");
        assert!(result.is_err());
    }
}
