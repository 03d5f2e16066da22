//! Dependency usage analysis for a single module
//!
//! ```text
//! module symbols ─┐
//!                 ├─> UsageClassifier ─> PolicyEngine ─> generate_advice ─┐
//! declarations ───┘          │                                            ├─> ComprehensiveAdvice
//!                            └──────────> plugin checks ──────────────────┘
//! ```
//!
//! Every step is a pure function of its inputs and the shared catalog, so
//! modules can be analyzed in any order and on any thread.

pub mod classifier;
pub mod generator;
pub mod plugins;
pub mod policy;

pub use classifier::{Classification, ClassifiedDependency, UndeclaredUsage, UsageClassifier};
pub use generator::generate_advice;
pub use plugins::{default_toolchain, jvm_plugin_advice, processor_plugin_advice, SourceSummary};
pub use policy::{PolicyEngine, Target};

use crate::catalog::{ClosureCache, ModuleSymbols};
use crate::config::PluginIds;
use crate::models::{ComprehensiveAdvice, DeclaredDependency};
use std::collections::BTreeSet;

/// Validated inputs for one module
#[derive(Debug, Clone, Default)]
pub struct ModuleInput {
    pub module_path: String,
    /// Unique per coordinate
    pub declarations: Vec<DeclaredDependency>,
    pub plugins: BTreeSet<String>,
    pub sources: Option<SourceSummary>,
}

/// Run classification, policy, and advice generation for one module
pub fn analyze_module(
    input: &ModuleInput,
    symbols: &ModuleSymbols,
    closures: &ClosureCache,
    ids: &PluginIds,
) -> ComprehensiveAdvice {
    let classification = UsageClassifier::new(closures).classify(symbols, &input.declarations);
    let toolchain = default_toolchain(&input.plugins, ids);
    let policy = PolicyEngine::new(closures, &classification, toolchain.configuration());

    let mut plugin_advice = processor_plugin_advice(&classification, &input.plugins, ids);
    plugin_advice.extend(jvm_plugin_advice(&input.plugins, input.sources.as_ref(), ids));

    ComprehensiveAdvice {
        module_path: input.module_path.clone(),
        dependency_advice: generate_advice(&classification, &policy),
        plugin_advice,
        warnings: classification.warnings,
    }
}
