//! Output reporters for dependency advice
//!
//! Supports two output formats:
//! - `text` - Pretty, stable-ordered advice listing
//! - `json` - Machine-readable JSON (compact canonical form for files)

pub mod json;
pub mod text;

use crate::models::AggregateReport;
use anyhow::{anyhow, Result};
use std::str::FromStr;

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" | "terminal" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(anyhow!("Unknown format '{}'. Valid formats: text, json", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Render an aggregated report in the specified format
pub fn report(report: &AggregateReport, format: &str, chatty: bool) -> Result<String> {
    let fmt = OutputFormat::from_str(format)?;
    report_with_format(report, fmt, chatty)
}

/// Render an aggregated report using an OutputFormat enum
pub fn report_with_format(
    report: &AggregateReport,
    format: OutputFormat,
    chatty: bool,
) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(text::render(report, chatty)),
        OutputFormat::Json => json::render(report),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::{
        Advice, BuildHealth, Configuration, Coordinate, ModuleFailure, PluginAdvice, ProcessorToolchain,
    };

    /// Aggregated report with one busy module, one clean module and one failure
    pub(crate) fn test_report() -> AggregateReport {
        let coord = |s: &str| -> Coordinate { s.parse().expect("valid coordinate") };
        AggregateReport {
            build_health: vec![
                BuildHealth {
                    module_path: ":app".into(),
                    dependency_advice: [
                        Advice::add(coord("javax.inject:javax.inject:1"), Configuration::Implementation),
                        Advice::remove(coord("com.squareup:moshi:1.8"), Configuration::Api),
                        Advice::change(
                            coord("com.google.guava:guava:28.0"),
                            Configuration::Implementation,
                            Configuration::Api,
                        ),
                    ]
                    .into(),
                    plugin_advice: [PluginAdvice::redundant_processor(ProcessorToolchain::Kapt)]
                        .into(),
                    warnings: ["no catalog data for a:b:1".to_string()].into(),
                },
                BuildHealth {
                    module_path: ":clean".into(),
                    ..Default::default()
                },
            ],
            skipped: vec![ModuleFailure {
                module_path: ":broken".into(),
                error: "unknown configuration 'compile'".into(),
            }],
        }
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("txt".parse::<OutputFormat>().unwrap(), OutputFormat::Text);
        assert!("sarif".parse::<OutputFormat>().is_err());
        assert_eq!(OutputFormat::Json.to_string(), "json");
    }

    #[test]
    fn test_report_dispatch() {
        let report = test_report();
        let json_out = super::report(&report, "json", true).unwrap();
        assert!(json_out.trim_start().starts_with('{'));
        let text_out = super::report(&report, "text", true).unwrap();
        assert!(text_out.contains(":app"));
        assert!(super::report(&report, "html", true).is_err());
    }
}
