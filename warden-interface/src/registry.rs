//! The rule registry: an ordered, duplicate-rejecting rule collection.

use std::collections::HashSet;
use std::sync::Arc;

use crate::errors::DuplicateRuleIdError;
use crate::rule::{Category, Rule, RuleId};

/// An ordered collection of rules with unique ids.
///
/// Registration order is preserved and observable, duplicate ids are
/// rejected (case-sensitively) no matter the registration order, and the
/// registry is read-only once handed to an evaluation run, so a single
/// registry can back any number of concurrent runs.
#[derive(Default, Clone)]
pub struct RuleRegistry {
    rules: Vec<Arc<dyn Rule>>,
    ids: HashSet<RuleId>,
}

impl RuleRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `rule` at the end of the registration order.
    ///
    /// Fails without modifying the registry when a rule with the same id is
    /// already present.
    pub fn register(&mut self, rule: Arc<dyn Rule>) -> Result<(), DuplicateRuleIdError> {
        let id = rule.id().clone();
        if !self.ids.insert(id.clone()) {
            return Err(DuplicateRuleIdError { id });
        }
        self.rules.push(rule);
        Ok(())
    }

    /// All rules, in registration order.
    pub fn all(&self) -> &[Arc<dyn Rule>] {
        &self.rules
    }

    /// The rules of one category, in registration order. A category no rule
    /// belongs to yields an empty vec, not an error.
    pub fn rules_for(&self, category: Category) -> Vec<&dyn Rule> {
        self.rules
            .iter()
            .filter(|rule| rule.category() == category)
            .map(|rule| rule.as_ref())
            .collect()
    }

    /// Whether a rule with `id` is registered.
    pub fn contains(&self, id: &RuleId) -> bool {
        self.ids.contains(id)
    }

    /// Number of registered rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// `true` when no rules are registered.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl core::fmt::Debug for RuleRegistry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_list()
            .entries(self.rules.iter().map(|rule| rule.id()))
            .finish()
    }
}
