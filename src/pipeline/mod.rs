//! Per-module analysis pipeline with parallel fan-out
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                    PipelineEngine                       │
//! ├─────────────────────────────────────────────────────────┤
//! │  1. Validate each module's declarations                 │
//! │  2. Run one pipeline per module in parallel (rayon)     │
//! │  3. Isolate failures (errors and panics) per module     │
//! │  4. Join: hand complete reports to the Aggregator       │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! Pipelines share only the read-only catalog and its closure cache. A
//! pipeline either returns a full report or fails; nothing partial escapes.

use crate::analysis::{analyze_module, ModuleInput};
use crate::catalog::{ClosureCache, SymbolCatalog};
use crate::config::PluginIds;
use crate::error::{AdviceError, AdviceResult};
use crate::models::{ComprehensiveAdvice, ModuleFailure};
use crate::project::ModuleSpec;
use anyhow::Result;
use rayon::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Progress callback: (module path, done, total)
pub type ProgressCallback = Box<dyn Fn(&str, usize, usize) + Send + Sync>;

/// Result of analyzing every module of a run
#[derive(Debug, Clone, Default)]
pub struct PipelineOutcome {
    /// Reports from modules that completed, in module path order
    pub reports: Vec<ComprehensiveAdvice>,
    /// Modules that failed outright, in module path order
    pub failures: Vec<ModuleFailure>,
    pub duration_ms: u64,
}

impl PipelineOutcome {
    /// Get a summary string.
    pub fn summary(&self) -> String {
        let with_advice = self.reports.iter().filter(|r| !r.is_empty()).count();
        let mut parts = vec![
            format!("{} modules analyzed", self.reports.len()),
            format!("{} with advice", with_advice),
        ];
        if !self.failures.is_empty() {
            parts.push(format!("{} skipped", self.failures.len()));
        }
        parts.join(", ")
    }
}

/// Analysis for a single module
pub struct ModulePipeline {
    closures: Arc<ClosureCache>,
    plugin_ids: PluginIds,
}

impl ModulePipeline {
    pub fn new(closures: Arc<ClosureCache>, plugin_ids: PluginIds) -> Self {
        Self {
            closures,
            plugin_ids,
        }
    }

    /// Validate and analyze one module
    pub fn run(&self, spec: &ModuleSpec) -> AdviceResult<ComprehensiveAdvice> {
        let (input, duplicate_warnings) = spec.to_input()?;
        let mut report = self.run_input(&input)?;
        report.warnings.extend(duplicate_warnings);
        Ok(report)
    }

    /// Analyze an already-validated module
    pub fn run_input(&self, input: &ModuleInput) -> AdviceResult<ComprehensiveAdvice> {
        let symbols = self
            .closures
            .catalog()
            .module_symbols(&input.module_path)?;
        Ok(analyze_module(
            input,
            &symbols,
            &self.closures,
            &self.plugin_ids,
        ))
    }
}

/// Runs module pipelines across a worker pool
pub struct PipelineEngine {
    pipeline: ModulePipeline,
    /// Number of worker threads for parallel execution
    workers: usize,
    progress_callback: Option<ProgressCallback>,
}

impl PipelineEngine {
    /// Create a new engine
    ///
    /// # Arguments
    /// * `catalog` - Shared read-only symbol catalog
    /// * `workers` - Number of worker threads (0 = auto-detect)
    pub fn new(catalog: Arc<dyn SymbolCatalog>, workers: usize) -> Self {
        let actual_workers = if workers == 0 {
            std::thread::available_parallelism()
                .map(|p| p.get())
                .unwrap_or(4)
                .min(16) // Cap at 16 threads
        } else {
            workers
        };

        Self {
            pipeline: ModulePipeline::new(
                Arc::new(ClosureCache::new(catalog)),
                PluginIds::default(),
            ),
            workers: actual_workers,
            progress_callback: None,
        }
    }

    /// Use non-default plugin ids
    pub fn with_plugin_ids(mut self, plugin_ids: PluginIds) -> Self {
        self.pipeline.plugin_ids = plugin_ids;
        self
    }

    /// Set a progress callback
    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Analyze every module; failures are isolated per module
    pub fn run(&self, modules: &[ModuleSpec]) -> Result<PipelineOutcome> {
        let start = Instant::now();
        let total = modules.len();
        let completed = AtomicUsize::new(0);

        info!(
            "Analyzing {} modules with {} workers",
            total, self.workers
        );

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.workers)
            .build()?;

        let results: Vec<(String, AdviceResult<ComprehensiveAdvice>)> = pool.install(|| {
            modules
                .par_iter()
                .map(|spec| {
                    let result = self.run_isolated(spec);
                    let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
                    if let Some(ref callback) = self.progress_callback {
                        callback(&spec.path, done, total);
                    }
                    (spec.path.clone(), result)
                })
                .collect()
        });

        let mut outcome = PipelineOutcome::default();
        for (module_path, result) in results {
            match result {
                Ok(report) => outcome.reports.push(report),
                Err(e) => {
                    warn!("Skipping {}: {}", module_path, e);
                    outcome.failures.push(ModuleFailure {
                        module_path,
                        error: e.to_string(),
                    });
                }
            }
        }
        outcome
            .reports
            .sort_by(|a, b| a.module_path.cmp(&b.module_path));
        outcome.failures.sort();
        outcome.duration_ms = start.elapsed().as_millis() as u64;
        debug!("{} dependency closures memoized", self.pipeline.closures.len());

        info!(
            "Analysis complete: {} in {}ms",
            outcome.summary(),
            outcome.duration_ms
        );
        Ok(outcome)
    }

    /// Run one pipeline, turning a panic into a module failure
    fn run_isolated(&self, spec: &ModuleSpec) -> AdviceResult<ComprehensiveAdvice> {
        debug!("Running pipeline for {}", spec.path);
        let result =
            std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| self.pipeline.run(spec)));

        match result {
            Ok(report) => report,
            Err(panic_info) => {
                let message = if let Some(s) = panic_info.downcast_ref::<&str>() {
                    s.to_string()
                } else if let Some(s) = panic_info.downcast_ref::<String>() {
                    s.clone()
                } else {
                    "Unknown panic".to_string()
                };
                error!("Pipeline for {} panicked: {}", spec.path, message);
                Err(AdviceError::PipelinePanicked {
                    module_path: spec.path.clone(),
                    message,
                })
            }
        }
    }
}
