//! Analyze command - run every module pipeline and report

use super::RunSettings;
use crate::aggregate::{discover_reports, Aggregator};
use crate::models::ComprehensiveAdvice;
use crate::pipeline::PipelineEngine;
use crate::project::ProjectModel;
use crate::reporters;
use anyhow::{Context, Result};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Run the analyze command
pub fn run(model_path: &Path, settings: &RunSettings, fail_on_advice: bool) -> Result<()> {
    let model = ProjectModel::load(model_path)?;

    let (modules, excluded): (Vec<_>, Vec<_>) = model
        .modules
        .iter()
        .cloned()
        .partition(|m| !settings.config.should_exclude(&m.path));
    for module in &excluded {
        info!("Excluding {} by configuration", module.path);
    }

    let bar = if settings.chatty {
        ProgressBar::new(modules.len() as u64)
    } else {
        ProgressBar::hidden()
    };
    bar.set_style(create_bar_style());
    bar.set_message("Analyzing modules...");

    let progress = bar.clone();
    let engine = PipelineEngine::new(Arc::new(model.catalog()), settings.workers)
        .with_plugin_ids(settings.config.plugins.clone())
        .with_progress_callback(Box::new(move |path, done, total| {
            debug!("[{}/{}] {} done", done, total, path);
            progress.set_position(done as u64);
        }));
    let outcome = engine.run(&modules)?;
    bar.finish_and_clear();

    let modules_dir = settings.output_dir.join("modules");
    std::fs::create_dir_all(&modules_dir)
        .with_context(|| format!("Failed to create {}", modules_dir.display()))?;
    clear_module_reports(&modules_dir)?;
    for report in &outcome.reports {
        write_module_report(&modules_dir, report)?;
    }

    let mut aggregator = Aggregator::new();
    aggregator.extend(outcome.reports.iter().cloned());
    for failure in &outcome.failures {
        aggregator.add_failure(failure.clone());
    }
    let report = aggregator.finish();

    super::aggregate::write_and_print(&report, settings)?;

    if settings.chatty {
        eprintln!(
            "{} {} in {}ms",
            style("✓").green(),
            outcome.summary(),
            outcome.duration_ms
        );
    }

    if fail_on_advice && report.has_advice() {
        eprintln!(
            "Failing due to --fail-on-advice: {} advice",
            report.total_advice()
        );
        std::io::stdout().flush()?;
        std::process::exit(1);
    }

    Ok(())
}

fn create_bar_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        .expect("valid template")
        .progress_chars("█▓▒░  ")
}

/// Remove reports left by an earlier run so modules that were renamed,
/// excluded or failed this time are not aggregated again
fn clear_module_reports(dir: &Path) -> Result<()> {
    let stale = discover_reports(dir)
        .with_context(|| format!("Failed to list reports in {}", dir.display()))?;
    for path in stale {
        std::fs::remove_file(&path)
            .with_context(|| format!("Failed to remove {}", path.display()))?;
        debug!("Removed stale report {}", path.display());
    }
    Ok(())
}

fn write_module_report(dir: &Path, report: &ComprehensiveAdvice) -> Result<PathBuf> {
    let path = dir.join(format!("{}.json", file_stem(&report.module_path)));
    std::fs::write(&path, reporters::json::render_module(report)?)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    debug!("Wrote {}", path.display());
    Ok(path)
}

/// File name for a module path: `:app:feature` becomes `app-feature`.
///
/// Distinct module paths always get distinct names. Letters, digits and `.`
/// are kept, `:` becomes `-`, and every other byte is written as `%XX`. A
/// path without a leading `:` is prefixed with `~`; the root is `_`.
fn file_stem(module_path: &str) -> String {
    let (mut stem, rest) = match module_path.strip_prefix(':') {
        Some("") => return "_".to_string(),
        Some(rest) => (String::new(), rest),
        None => ("~".to_string(), module_path),
    };
    for byte in rest.bytes() {
        match byte {
            b':' => stem.push('-'),
            b if b.is_ascii_alphanumeric() || b == b'.' => stem.push(b as char),
            b => stem.push_str(&format!("%{:02X}", b)),
        }
    }
    stem
}
