//! Protocol-shape checks: how data availability, state validation and the
//! genesis configuration are declared.

use warden_interface::{Category, FactModel, Outcome, Rule, RuleId, Severity};

use crate::catalog_id;

/// Extension parameter naming the data availability mode. Recognized
/// values are `rollup`, `validium` and `optimium`.
pub const DA_MODE_KEY: &str = "da_mode";
/// Extension parameter naming the proof system. Recognized values are
/// `fraud`, `validity` and `none`.
pub const PROOF_SYSTEM_KEY: &str = "proof_system";
/// Extension parameter pinning the genesis configuration hash.
pub const GENESIS_HASH_KEY: &str = "genesis_config_hash";

/// Reads a text extension parameter, mapping absence to not-applicable
/// and a type mismatch to inconclusive.
fn text_param<'a>(facts: &'a FactModel, key: &str) -> Result<&'a str, Outcome> {
    match facts.param(key) {
        None => Err(Outcome::not_applicable(format!(
            "parameter '{}' absent",
            key
        ))),
        Some(value) => value.as_text().ok_or_else(|| {
            Outcome::inconclusive(format!("parameter '{}' is not text", key))
        }),
    }
}

/// Fails when transaction data is kept off the settlement layer, which
/// makes withdrawals depend on an external data committee staying honest
/// and available.
pub struct DaModeDeclared {
    id: RuleId,
}

impl DaModeDeclared {
    /// Rule id: `data-availability.mode-declared`.
    pub fn new() -> Self {
        Self {
            id: catalog_id(Category::DataAvailability, "mode-declared"),
        }
    }
}

impl Default for DaModeDeclared {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for DaModeDeclared {
    fn id(&self) -> &RuleId {
        &self.id
    }

    fn title(&self) -> &str {
        "transaction data is posted on chain"
    }

    fn category(&self) -> Category {
        Category::DataAvailability
    }

    fn default_severity(&self) -> Severity {
        Severity::Medium
    }

    fn evaluate(&self, facts: &FactModel) -> Outcome {
        let mode = match text_param(facts, DA_MODE_KEY) {
            Ok(mode) => mode,
            Err(outcome) => return outcome,
        };
        match mode {
            "rollup" => Outcome::Pass,
            "validium" | "optimium" => Outcome::fail(format!(
                "data availability mode '{}' keeps transaction data off the settlement layer",
                mode
            )),
            other => Outcome::inconclusive(format!(
                "unrecognized data availability mode '{}'",
                other
            )),
        }
    }
}

/// Fails when state transitions are accepted without any proof system.
pub struct ProofSystemDeclared {
    id: RuleId,
}

impl ProofSystemDeclared {
    /// Rule id: `state-validation.proof-system`.
    pub fn new() -> Self {
        Self {
            id: catalog_id(Category::StateValidation, "proof-system"),
        }
    }
}

impl Default for ProofSystemDeclared {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for ProofSystemDeclared {
    fn id(&self) -> &RuleId {
        &self.id
    }

    fn title(&self) -> &str {
        "state transitions are proven"
    }

    fn category(&self) -> Category {
        Category::StateValidation
    }

    fn default_severity(&self) -> Severity {
        Severity::Critical
    }

    fn evaluate(&self, facts: &FactModel) -> Outcome {
        let system = match text_param(facts, PROOF_SYSTEM_KEY) {
            Ok(system) => system,
            Err(outcome) => return outcome,
        };
        match system {
            "fraud" | "validity" => Outcome::Pass,
            "none" => Outcome::fail("state transitions are not proven"),
            other => Outcome::inconclusive(format!("unrecognized proof system '{}'", other)),
        }
    }
}

/// Fails when no genesis configuration hash is pinned. Without the pin
/// there is no way to audit that the deployed chain matches the reviewed
/// configuration.
pub struct GenesisPinned {
    id: RuleId,
}

impl GenesisPinned {
    /// Rule id: `chain-parameters.genesis-pinned`.
    pub fn new() -> Self {
        Self {
            id: catalog_id(Category::ChainParameters, "genesis-pinned"),
        }
    }
}

impl Default for GenesisPinned {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for GenesisPinned {
    fn id(&self) -> &RuleId {
        &self.id
    }

    fn title(&self) -> &str {
        "genesis configuration is pinned"
    }

    fn category(&self) -> Category {
        Category::ChainParameters
    }

    fn default_severity(&self) -> Severity {
        Severity::Low
    }

    fn evaluate(&self, facts: &FactModel) -> Outcome {
        match facts.param(GENESIS_HASH_KEY) {
            None => Outcome::fail("genesis configuration hash is not pinned"),
            Some(value) => match value.as_text() {
                None => Outcome::inconclusive(format!(
                    "parameter '{}' is not text",
                    GENESIS_HASH_KEY
                )),
                Some(hash) if hash.trim().is_empty() => {
                    Outcome::fail("genesis configuration hash is blank")
                }
                Some(_) => Outcome::Pass,
            },
        }
    }
}
