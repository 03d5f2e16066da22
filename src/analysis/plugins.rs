//! Plugin-level advice
//!
//! Two checks, both independent of individual dependency advice:
//! - processor toolchains (kapt, javac annotation processing) with no
//!   processor that does anything
//! - `java-library` and Kotlin JVM applied together when one of the two
//!   languages has no sources

use super::classifier::{Classification, ClassifiedDependency};
use crate::config::PluginIds;
use crate::models::{PluginAdvice, ProcessorToolchain, UsageClassification};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Source file counts per JVM language
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSummary {
    #[serde(default)]
    pub java: usize,
    #[serde(default)]
    pub kotlin: usize,
}

/// Toolchain a module uses for processors declared outside a processor
/// configuration
pub fn default_toolchain(plugins: &BTreeSet<String>, ids: &PluginIds) -> ProcessorToolchain {
    if ids.applies_kapt(plugins) {
        ProcessorToolchain::Kapt
    } else {
        ProcessorToolchain::AnnotationProcessor
    }
}

/// Redundant processor toolchains.
///
/// A toolchain is in play when its plugin is applied or a dependency is
/// declared for it. Nothing is reported while any processor of the module is
/// active, whichever toolchain it runs on; otherwise every toolchain in play
/// is redundant.
pub fn processor_plugin_advice(
    classification: &Classification,
    plugins: &BTreeSet<String>,
    ids: &PluginIds,
) -> BTreeSet<PluginAdvice> {
    let fallback = default_toolchain(plugins, ids);
    let mut advice = BTreeSet::new();

    let any_active = classification
        .dependencies
        .iter()
        .filter(|c| toolchain_of(c, fallback).is_some())
        .any(ClassifiedDependency::is_active_processor);
    if any_active {
        return advice;
    }

    for toolchain in ProcessorToolchain::ALL {
        let declared = classification
            .dependencies
            .iter()
            .any(|c| toolchain_of(c, fallback) == Some(toolchain));
        let applied = toolchain == ProcessorToolchain::Kapt && ids.applies_kapt(plugins);
        if applied || declared {
            advice.insert(PluginAdvice::redundant_processor(toolchain));
        }
    }

    advice
}

fn toolchain_of(
    classified: &ClassifiedDependency,
    fallback: ProcessorToolchain,
) -> Option<ProcessorToolchain> {
    if let Some(toolchain) = classified.dependency.configuration.toolchain() {
        return Some(toolchain);
    }
    match classified.usage {
        UsageClassification::ProcessorActive | UsageClassification::ProcessorInactive => {
            Some(fallback)
        }
        _ => None,
    }
}

/// Redundant JVM language plugins; skipped when source counts are unknown
pub fn jvm_plugin_advice(
    plugins: &BTreeSet<String>,
    sources: Option<&SourceSummary>,
    ids: &PluginIds,
) -> BTreeSet<PluginAdvice> {
    let mut advice = BTreeSet::new();
    let Some(sources) = sources else {
        return advice;
    };
    if !(ids.applies_java_library(plugins) && ids.applies_kotlin_jvm(plugins)) {
        return advice;
    }

    if sources.java == 0 {
        advice.insert(PluginAdvice::RedundantJavaLibrary);
    }
    if sources.kotlin == 0 {
        advice.insert(PluginAdvice::RedundantKotlinJvm);
    }
    advice
}
