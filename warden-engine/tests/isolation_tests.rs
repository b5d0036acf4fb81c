use std::sync::Arc;

use warden_engine::{EngineConfig, EvalOptions, Evaluator};
use warden_interface::mocks::{healthy_fact_model, MockRule};
use warden_interface::{Category, FindingKind, Outcome, RuleRegistry, Severity};

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn registry_with_panicking_rule() -> RuleRegistry {
    let mut registry = RuleRegistry::new();
    registry
        .register(Arc::new(MockRule::returning(
            "sequencing.before",
            Category::Sequencing,
            Severity::High,
            Outcome::Pass,
        )))
        .unwrap();
    registry
        .register(Arc::new(MockRule::panicking(
            "oracles.faulty",
            Category::Oracles,
            Severity::High,
            "index out of bounds in predicate",
        )))
        .unwrap();
    registry
        .register(Arc::new(MockRule::returning(
            "finality.after",
            Category::Finality,
            Severity::Medium,
            Outcome::fail("confirmation depth too shallow"),
        )))
        .unwrap();
    registry
}

#[test]
fn panicking_rule_degrades_to_an_inconclusive_finding() {
    init_logging();
    let report = Evaluator::new(EngineConfig { num_threads: 2 })
        .unwrap()
        .evaluate(
            &healthy_fact_model(),
            &registry_with_panicking_rule(),
            &EvalOptions::default(),
        )
        .unwrap();

    let faulty = report
        .findings()
        .iter()
        .find(|f| f.rule_id.as_str() == "oracles.faulty")
        .expect("faulted rule must surface as a finding");
    assert_eq!(faulty.kind, FindingKind::Inconclusive);
    assert_eq!(faulty.severity, Severity::High);
    assert!(faulty.detail.contains("internal fault in rule predicate"));
    assert!(faulty.detail.contains("index out of bounds in predicate"));
}

#[test]
fn other_rules_are_untouched_by_the_fault() {
    init_logging();
    let report = Evaluator::new(EngineConfig { num_threads: 2 })
        .unwrap()
        .evaluate(
            &healthy_fact_model(),
            &registry_with_panicking_rule(),
            &EvalOptions::default(),
        )
        .unwrap();

    // One pass, one violation, one inconclusive; nothing lost.
    assert_eq!(report.summary().rules_evaluated, 3);
    assert_eq!(report.summary().passed, 1);
    assert_eq!(report.findings().len(), 2);
    assert!(report
        .findings()
        .iter()
        .any(|f| f.rule_id.as_str() == "finality.after" && f.kind == FindingKind::Violation));
}

#[test]
fn isolation_holds_on_the_worker_pool() {
    init_logging();
    let evaluator = Evaluator::new(EngineConfig { num_threads: 4 }).unwrap();
    let options = EvalOptions {
        parallel: true,
        ..Default::default()
    };
    let sequential = evaluator
        .evaluate(
            &healthy_fact_model(),
            &registry_with_panicking_rule(),
            &EvalOptions::default(),
        )
        .unwrap();
    let parallel = evaluator
        .evaluate(
            &healthy_fact_model(),
            &registry_with_panicking_rule(),
            &options,
        )
        .unwrap();
    assert_eq!(sequential, parallel);
}

#[test]
fn a_registry_of_only_faulty_rules_still_reports() {
    init_logging();
    let mut registry = RuleRegistry::new();
    for index in 0..6 {
        registry
            .register(Arc::new(MockRule::panicking(
                &format!("testing.faulty-{}", index),
                Category::Testing,
                Severity::Low,
                "boom",
            )))
            .unwrap();
    }
    let report = warden_engine::evaluate(&healthy_fact_model(), &registry).unwrap();
    assert_eq!(report.findings().len(), 6);
    assert!(report
        .findings()
        .iter()
        .all(|f| f.kind == FindingKind::Inconclusive));
}
