//! JSON reporter
//!
//! Modules without advice are left out, so a module that never reported and
//! one that reported nothing render the same.

use crate::models::{AggregateReport, BuildHealth, ComprehensiveAdvice};
use anyhow::Result;

/// Render the aggregated report as pretty-printed JSON
pub fn render(report: &AggregateReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(&actionable(report))?)
}

/// Canonical build health form: the BuildHealth list on a single line
pub fn render_compact(report: &AggregateReport) -> Result<String> {
    let entries: Vec<&BuildHealth> = report.with_advice().collect();
    Ok(serde_json::to_string(&entries)?)
}

/// Render one module's report (compact), as read back by `aggregate`
pub fn render_module(advice: &ComprehensiveAdvice) -> Result<String> {
    Ok(serde_json::to_string(advice)?)
}

fn actionable(report: &AggregateReport) -> AggregateReport {
    AggregateReport {
        build_health: report.with_advice().cloned().collect(),
        skipped: report.skipped.clone(),
    }
}
