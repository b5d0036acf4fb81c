//! Anchor-root checks: freshness of the latest accepted state root and the
//! provenance of the registry it was read from.

use warden_interface::{Category, FactModel, Outcome, Rule, RuleId, Severity};

use crate::catalog_id;
use crate::duration::human_duration;

/// Fails when the latest anchor root is older than the policy freshness
/// bound: nothing has been settled for too long.
pub struct AnchorFreshness {
    id: RuleId,
    freshness_bound_secs: u64,
}

impl AnchorFreshness {
    /// Rule id: `anchor-roots.freshness`.
    pub fn new(freshness_bound_secs: u64) -> Self {
        Self {
            id: catalog_id(Category::AnchorRoots, "freshness"),
            freshness_bound_secs,
        }
    }
}

impl Rule for AnchorFreshness {
    fn id(&self) -> &RuleId {
        &self.id
    }

    fn title(&self) -> &str {
        "latest anchor root is fresh"
    }

    fn category(&self) -> Category {
        Category::AnchorRoots
    }

    fn default_severity(&self) -> Severity {
        Severity::High
    }

    fn evaluate(&self, facts: &FactModel) -> Outcome {
        let anchor = match facts.anchor() {
            Some(anchor) => anchor,
            None => return Outcome::not_applicable("anchor facts absent"),
        };
        let age_secs = match facts.observed_at().checked_secs_since(anchor.anchored_at) {
            Some(age_secs) => age_secs,
            None => {
                return Outcome::inconclusive(
                    "anchor timestamp is ahead of the snapshot clock",
                )
            }
        };
        if age_secs <= self.freshness_bound_secs {
            Outcome::Pass
        } else {
            let excess_secs = age_secs - self.freshness_bound_secs;
            Outcome::fail(format!(
                "anchor root exceeds freshness bound by {}",
                human_duration(excess_secs)
            ))
        }
    }
}

/// Fails when the anchor does not name the registry it came from, leaving
/// the root's provenance unverifiable.
pub struct AnchorSourceRegistered {
    id: RuleId,
}

impl AnchorSourceRegistered {
    /// Rule id: `anchor-roots.source-registered`.
    pub fn new() -> Self {
        Self {
            id: catalog_id(Category::AnchorRoots, "source-registered"),
        }
    }
}

impl Default for AnchorSourceRegistered {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for AnchorSourceRegistered {
    fn id(&self) -> &RuleId {
        &self.id
    }

    fn title(&self) -> &str {
        "anchor root names its source registry"
    }

    fn category(&self) -> Category {
        Category::AnchorRoots
    }

    fn default_severity(&self) -> Severity {
        Severity::Low
    }

    fn evaluate(&self, facts: &FactModel) -> Outcome {
        let anchor = match facts.anchor() {
            Some(anchor) => anchor,
            None => return Outcome::not_applicable("anchor facts absent"),
        };
        if anchor.source_registry.trim().is_empty() {
            Outcome::fail("anchor root does not name a source registry")
        } else {
            Outcome::Pass
        }
    }
}
