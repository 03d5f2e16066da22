//! End-to-end advice scenarios
//!
//! Builds project models the way the build would hand them over and checks
//! the advice, plugin advice and aggregation produced for them.

use depadvice::aggregate::aggregate;
use depadvice::models::{
    Advice, AggregateReport, ComprehensiveAdvice, Configuration, Coordinate, PluginAdvice,
    ProcessorToolchain,
};
use depadvice::pipeline::PipelineEngine;
use depadvice::project::ProjectModel;
use depadvice::reporters;
use std::sync::Arc;

fn coord(s: &str) -> Coordinate {
    s.parse().unwrap()
}

fn run(model_json: &str, workers: usize) -> (Vec<ComprehensiveAdvice>, AggregateReport) {
    let model: ProjectModel = serde_json::from_str(model_json).unwrap();
    let engine = PipelineEngine::new(Arc::new(model.catalog()), workers);
    let outcome = engine.run(&model.modules).unwrap();
    let mut aggregator = depadvice::aggregate::Aggregator::new();
    aggregator.extend(outcome.reports.clone());
    for failure in outcome.failures {
        aggregator.add_failure(failure);
    }
    (outcome.reports, aggregator.finish())
}

const DAGGER_LIBRARIES: &str = r#"
    "com.google.dagger:dagger-android:2.24": {
      "symbols": ["dagger.android.AndroidInjector"],
      "dependencies": [
        {"coordinate": "com.google.dagger:dagger:2.24"},
        {"coordinate": "javax.inject:javax.inject:1"}
      ]
    },
    "com.google.dagger:dagger:2.24": {
      "symbols": ["dagger.Component", "dagger.internal.Factory"],
      "dependencies": [{"coordinate": "javax.inject:javax.inject:1"}]
    },
    "javax.inject:javax.inject:1": {"symbols": ["javax.inject.Inject", "javax.inject.Provider"]},
    "com.google.dagger:dagger-compiler:2.24": {"processor": {"triggers": ["dagger.Component"]}},
    "com.google.auto.value:auto-value:1.6": {"processor": {"triggers": ["com.google.auto.value.AutoValue"]}}
"#;

fn model(modules: &str) -> String {
    format!(r#"{{"modules": [{modules}], "libraries": {{{DAGGER_LIBRARIES}}}}}"#)
}

/// Generated code needs an undeclared runtime library; the declared library
/// is only there for the annotation
const SCENARIO_A: &str = r#"{
  "path": ":app",
  "declarations": [
    {"coordinate": "com.google.dagger:dagger-android:2.24", "configuration": "implementation"},
    {"coordinate": "com.google.dagger:dagger-compiler:2.24", "configuration": "annotationProcessor"}
  ],
  "symbols": {
    "referenced": ["dagger.Component", "dagger.internal.Factory", "javax.inject.Provider"]
  }
}"#;

/// A processor nothing triggers, and no other processor
const SCENARIO_B: &str = r#"{
  "path": ":lib",
  "declarations": [
    {"coordinate": "com.google.auto.value:auto-value:1.6", "configuration": "annotationProcessor"}
  ],
  "symbols": {"referenced": []}
}"#;

/// A triggered processor and nothing else wrong
const SCENARIO_C: &str = r#"{
  "path": ":core",
  "plugins": ["kotlin-kapt"],
  "declarations": [
    {"coordinate": "com.google.dagger:dagger:2.24", "configuration": "implementation"},
    {"coordinate": "com.google.dagger:dagger-compiler:2.24", "configuration": "kapt"}
  ],
  "symbols": {"referenced": ["dagger.Component"]}
}"#;

#[test]
fn test_generated_code_dependency_is_added() {
    let (reports, _) = run(&model(SCENARIO_A), 1);
    let app = &reports[0];

    let expected: std::collections::BTreeSet<Advice> = [
        Advice::add(coord("com.google.dagger:dagger:2.24"), Configuration::Implementation),
        Advice::add(coord("javax.inject:javax.inject:1"), Configuration::Implementation),
        Advice::remove(
            coord("com.google.dagger:dagger-android:2.24"),
            Configuration::Implementation,
        ),
    ]
    .into();
    assert_eq!(app.dependency_advice, expected);
    assert!(app.plugin_advice.is_empty());
}

#[test]
fn test_untriggered_processor_is_removed_with_plugin() {
    let (reports, _) = run(&model(SCENARIO_B), 1);
    let lib = &reports[0];

    assert_eq!(
        lib.dependency_advice,
        [Advice::remove(
            coord("com.google.auto.value:auto-value:1.6"),
            Configuration::AnnotationProcessor
        )]
        .into()
    );
    assert_eq!(
        lib.plugin_advice,
        [PluginAdvice::redundant_processor(ProcessorToolchain::AnnotationProcessor)].into()
    );
}

#[test]
fn test_triggered_processor_yields_no_advice() {
    let (reports, aggregated) = run(&model(SCENARIO_C), 1);
    assert!(reports[0].is_empty());
    assert!(reports[0].warnings.is_empty());
    assert!(!aggregated.has_advice());
    assert_eq!(reporters::json::render_compact(&aggregated).unwrap(), "[]");
}

#[test]
fn test_runs_are_deterministic_across_worker_counts() {
    let json = model(&[SCENARIO_A, SCENARIO_B, SCENARIO_C].join(","));
    let (_, single) = run(&json, 1);
    let (_, parallel) = run(&json, 4);

    let first = reporters::json::render_compact(&single).unwrap();
    assert_eq!(first, reporters::json::render_compact(&parallel).unwrap());
    assert_eq!(
        reporters::text::render(&single, true),
        reporters::text::render(&parallel, true)
    );
}

#[test]
fn test_aggregation_ignores_report_order() {
    let json = model(&[SCENARIO_A, SCENARIO_B, SCENARIO_C].join(","));
    let (reports, from_run) = run(&json, 2);

    let mut reversed = reports.clone();
    reversed.reverse();
    assert_eq!(aggregate(reports.clone()), aggregate(reversed));
    assert_eq!(aggregate(reports), from_run);
}

#[test]
fn test_failed_module_does_not_block_others() {
    let broken = r#"{
      "path": ":broken",
      "declarations": [{"coordinate": "a:b:1", "configuration": "compile"}],
      "symbols": {"referenced": []}
    }"#;
    let json = model(&[SCENARIO_B, broken].join(","));
    let (reports, aggregated) = run(&json, 2);

    assert_eq!(reports.len(), 1);
    assert_eq!(aggregated.skipped.len(), 1);
    assert_eq!(aggregated.skipped[0].module_path, ":broken");
    assert!(aggregated.has_advice());
}

#[test]
fn test_empty_build_is_valid() {
    let (reports, aggregated) = run(r#"{"modules": []}"#, 0);
    assert!(reports.is_empty());
    assert_eq!(aggregated, AggregateReport::default());
    assert_eq!(reporters::json::render_compact(&aggregated).unwrap(), "[]");
}
