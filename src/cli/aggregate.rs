//! Aggregate command - merge per-module reports into build health

use super::RunSettings;
use crate::aggregate::{aggregate, discover_reports, load_reports};
use crate::models::AggregateReport;
use crate::reporters;
use anyhow::{Context, Result};
use console::style;
use std::path::{Path, PathBuf};
use tracing::info;

/// Run the aggregate command
pub fn run(inputs: &[PathBuf], settings: &RunSettings) -> Result<()> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_dir() {
            files.extend(discover_reports(input).with_context(|| {
                format!("Failed to list reports in {}", input.display())
            })?);
        } else {
            files.push(input.clone());
        }
    }
    info!("Aggregating {} report files", files.len());

    let report = aggregate(load_reports(&files));
    write_and_print(&report, settings)
}

/// Write the compact and pretty build health files, then print the report
pub(super) fn write_and_print(report: &AggregateReport, settings: &RunSettings) -> Result<()> {
    let (compact_path, pretty_path) = write_build_health(report, settings)?;

    let rendered = reporters::report(report, &settings.format, settings.chatty)?;
    if rendered.ends_with('\n') {
        print!("{}", rendered);
    } else {
        println!("{}", rendered);
    }

    if settings.chatty && report.has_advice() {
        eprintln!(
            "{} Advice report (aggregated) : {}",
            style("→").cyan(),
            style(display_path(&compact_path, &settings.root)).cyan()
        );
        eprintln!(
            "{} (pretty-printed)           : {}",
            style("→").cyan(),
            style(display_path(&pretty_path, &settings.root)).cyan()
        );
    }
    Ok(())
}

fn write_build_health(report: &AggregateReport, settings: &RunSettings) -> Result<(PathBuf, PathBuf)> {
    std::fs::create_dir_all(&settings.output_dir).with_context(|| {
        format!("Failed to create {}", settings.output_dir.display())
    })?;

    let compact_path = settings.output_dir.join(&settings.config.output.report);
    std::fs::write(&compact_path, reporters::json::render_compact(report)?)
        .with_context(|| format!("Failed to write {}", compact_path.display()))?;

    let pretty_path = settings.output_dir.join(&settings.config.output.report_pretty);
    std::fs::write(&pretty_path, reporters::text::render(report, false))
        .with_context(|| format!("Failed to write {}", pretty_path.display()))?;

    Ok((compact_path, pretty_path))
}

fn display_path(path: &Path, root: &Path) -> String {
    path.strip_prefix(root).unwrap_or(path).display().to_string()
}
