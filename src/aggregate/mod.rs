//! Build-wide advice aggregation
//!
//! Joins per-module reports into one `AggregateReport`. Reports may arrive in
//! any order, some modules may never report, and the same module may report
//! twice; the result depends only on the set of reports received.

use crate::models::{AggregateReport, BuildHealth, ComprehensiveAdvice, ModuleFailure};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Collects per-module reports keyed by module path
#[derive(Debug, Default)]
pub struct Aggregator {
    entries: BTreeMap<String, BuildHealth>,
    skipped: BTreeMap<String, ModuleFailure>,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one module report; a second report for the same path is merged
    /// by set union
    pub fn add(&mut self, advice: ComprehensiveAdvice) {
        match self.entries.get_mut(&advice.module_path) {
            Some(existing) => {
                info!(
                    "Module {} reported more than once; merging its advice",
                    advice.module_path
                );
                existing.merge(advice);
            }
            None => {
                self.entries
                    .insert(advice.module_path.clone(), BuildHealth::from(advice));
            }
        }
    }

    /// Record a module whose pipeline failed
    pub fn add_failure(&mut self, failure: ModuleFailure) {
        self.skipped
            .entry(failure.module_path.clone())
            .or_insert(failure);
    }

    pub fn extend(&mut self, reports: impl IntoIterator<Item = ComprehensiveAdvice>) {
        for report in reports {
            self.add(report);
        }
    }

    /// Finish aggregation; entries come out sorted by module path
    pub fn finish(self) -> AggregateReport {
        AggregateReport {
            build_health: self.entries.into_values().collect(),
            skipped: self.skipped.into_values().collect(),
        }
    }
}

/// Aggregate a batch of reports
pub fn aggregate(reports: impl IntoIterator<Item = ComprehensiveAdvice>) -> AggregateReport {
    let mut aggregator = Aggregator::new();
    aggregator.extend(reports);
    aggregator.finish()
}

/// Read per-module report files. Unreadable or invalid files are logged and
/// left out, exactly as if the module had never reported.
pub fn load_reports(paths: &[PathBuf]) -> Vec<ComprehensiveAdvice> {
    let mut reports = Vec::new();
    for path in paths {
        match load_report(path) {
            Ok(report) => {
                debug!("Loaded report for {} from {}", report.module_path, path.display());
                reports.push(report);
            }
            Err(e) => warn!("Ignoring report {}: {}", path.display(), e),
        }
    }
    reports
}

fn load_report(path: &Path) -> anyhow::Result<ComprehensiveAdvice> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Report files under a directory (`*.json`, non-recursive, sorted)
pub fn discover_reports(dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "json"))
        .collect();
    paths.sort();
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Advice, Configuration, Coordinate, PluginAdvice};

    fn coord(s: &str) -> Coordinate {
        s.parse().unwrap()
    }

    fn report(path: &str, advice: &[Advice]) -> ComprehensiveAdvice {
        ComprehensiveAdvice {
            module_path: path.into(),
            dependency_advice: advice.iter().cloned().collect(),
            ..Default::default()
        }
    }

    fn sample() -> Vec<ComprehensiveAdvice> {
        vec![
            report(":b", &[Advice::remove(coord("g:x:1"), Configuration::Api)]),
            report(":a", &[Advice::add(coord("g:y:1"), Configuration::Implementation)]),
            report(":c", &[]),
            report(":b", &[Advice::add(coord("g:z:1"), Configuration::Api)]),
        ]
    }

    #[test]
    fn test_empty_aggregation_is_valid() {
        let result = aggregate(Vec::new());
        assert!(result.build_health.is_empty());
        assert!(!result.has_advice());
        assert_eq!(result.total_advice(), 0);
    }

    #[test]
    fn test_unique_sorted_module_paths() {
        let result = aggregate(sample());
        let paths: Vec<_> = result.build_health.iter().map(|h| h.module_path.as_str()).collect();
        assert_eq!(paths, vec![":a", ":b", ":c"]);
    }

    #[test]
    fn test_duplicates_are_merged_not_overwritten() {
        let result = aggregate(sample());
        assert_eq!(result.build_health[1].dependency_advice.len(), 2);
    }

    #[test]
    fn test_order_independent_and_idempotent() {
        let forward = aggregate(sample());
        let mut reversed = sample();
        reversed.reverse();
        assert_eq!(forward, aggregate(reversed));

        let mut doubled = sample();
        doubled.extend(sample());
        assert_eq!(forward, aggregate(doubled));
    }

    #[test]
    fn test_failures_are_listed_once() {
        let mut aggregator = Aggregator::new();
        aggregator.add(report(":a", &[]));
        let failure = ModuleFailure {
            module_path: ":broken".into(),
            error: "bad".into(),
        };
        aggregator.add_failure(failure.clone());
        aggregator.add_failure(failure);
        let result = aggregator.finish();
        assert_eq!(result.skipped.len(), 1);
        assert_eq!(result.build_health.len(), 1);
    }

    #[test]
    fn test_load_reports_skips_bad_files() {
        let dir = tempfile::tempdir().unwrap();
        let good = ComprehensiveAdvice {
            module_path: ":app".into(),
            plugin_advice: [PluginAdvice::RedundantJavaLibrary].into(),
            ..Default::default()
        };
        std::fs::write(
            dir.path().join("app.json"),
            serde_json::to_string(&good).unwrap(),
        )
        .unwrap();
        std::fs::write(dir.path().join("broken.json"), "{not json").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let mut paths = discover_reports(dir.path()).unwrap();
        assert_eq!(paths.len(), 2);
        paths.push(dir.path().join("missing.json"));

        let reports = load_reports(&paths);
        assert_eq!(reports, vec![good]);
    }
}
