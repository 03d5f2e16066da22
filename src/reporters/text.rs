//! Text reporter
//!
//! Plain, stable-ordered rendering used for the pretty report file and
//! terminal output. Modules are listed by path; within a module each section
//! follows the advice sort order.

use crate::models::{Advice, AggregateReport, BuildHealth};

const RULE: &str = "──────────────────────────────────────";

/// Render the aggregated report
///
/// `chatty` appends a one-line summary footer.
pub fn render(report: &AggregateReport, chatty: bool) -> String {
    let mut out = String::new();

    let modules: Vec<&BuildHealth> = report.with_advice().collect();
    if modules.is_empty() {
        out.push_str("No dependency advice. Looking good!\n");
    }
    for (i, health) in modules.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        render_module(&mut out, health);
    }

    if !report.skipped.is_empty() {
        out.push_str(&format!("\nSkipped modules\n{RULE}\n"));
        for failure in &report.skipped {
            out.push_str(&format!("  {}: {}\n", failure.module_path, failure.error));
        }
    }

    if chatty {
        out.push_str(&format!(
            "\n{} advice in {} module(s)",
            report.total_advice(),
            modules.len()
        ));
        if !report.skipped.is_empty() {
            out.push_str(&format!(", {} skipped", report.skipped.len()));
        }
        out.push('\n');
    }

    out
}

fn render_module(out: &mut String, health: &BuildHealth) {
    out.push_str(&format!("Advice for {}\n{RULE}\n", health.module_path));

    let adds: Vec<&Advice> = of_kind(health, "add");
    let removes: Vec<&Advice> = of_kind(health, "remove");
    let changes: Vec<&Advice> = of_kind(health, "change");

    section(
        out,
        "Transitively used dependencies that should be declared directly as indicated:",
        adds.iter().map(|a| match a {
            Advice::Add {
                coordinate,
                to_configuration,
            } => format!("{to_configuration}(\"{coordinate}\")"),
            other => other.to_string(),
        }),
    );
    section(
        out,
        "Unused dependencies which should be removed:",
        removes.iter().map(|a| match a {
            Advice::Remove {
                coordinate,
                from_configuration,
            } => format!("{from_configuration}(\"{coordinate}\")"),
            other => other.to_string(),
        }),
    );
    section(
        out,
        "Existing dependencies which should be modified to be as indicated:",
        changes.iter().map(|a| match a {
            Advice::Change {
                coordinate,
                from_configuration,
                to_configuration,
            } => format!("{to_configuration}(\"{coordinate}\") (was {from_configuration})"),
            other => other.to_string(),
        }),
    );
    section(
        out,
        "Plugins that should be removed:",
        health.plugin_advice.iter().map(|p| p.to_string()),
    );
    section(out, "Warnings:", health.warnings.iter().cloned());
}

fn of_kind<'a>(health: &'a BuildHealth, kind: &str) -> Vec<&'a Advice> {
    health
        .dependency_advice
        .iter()
        .filter(|a| a.kind() == kind)
        .collect()
}

fn section(out: &mut String, title: &str, lines: impl Iterator<Item = String>) {
    let mut lines = lines.peekable();
    if lines.peek().is_none() {
        return;
    }
    out.push_str(title);
    out.push('\n');
    for line in lines {
        out.push_str("  ");
        out.push_str(&line);
        out.push('\n');
    }
    out.push('\n');
}
