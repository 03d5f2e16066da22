//! Project-level configuration support
//!
//! Loads configuration from `depadvice.toml` or `.depadvicerc.json` in the
//! project root.
//!
//! # Configuration Format
//!
//! ```toml
//! # depadvice.toml
//! chatty = true
//!
//! [plugins]
//! kapt = ["kotlin-kapt", "org.jetbrains.kotlin.kapt"]
//!
//! [exclude]
//! modules = [":benchmarks", ":samples:*"]
//!
//! [output]
//! dir = "build/reports/dependency-analysis"
//!
//! [defaults]
//! format = "text"
//! workers = 8
//! ```

use serde::Deserialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Project configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectConfig {
    /// Announce report locations and summary lines (default: true)
    #[serde(default = "default_chatty")]
    pub chatty: bool,

    /// Plugin ids recognized for each plugin check
    #[serde(default)]
    pub plugins: PluginIds,

    /// Modules left out of the analysis
    #[serde(default)]
    pub exclude: ExcludeConfig,

    /// Report locations
    #[serde(default)]
    pub output: OutputConfig,

    /// Default CLI flags
    #[serde(default)]
    pub defaults: CliDefaults,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            chatty: default_chatty(),
            plugins: PluginIds::default(),
            exclude: ExcludeConfig::default(),
            output: OutputConfig::default(),
            defaults: CliDefaults::default(),
        }
    }
}

fn default_chatty() -> bool {
    true
}

/// Plugin ids that count as each plugin
#[derive(Debug, Clone, Deserialize)]
pub struct PluginIds {
    #[serde(default = "default_kapt_ids")]
    pub kapt: Vec<String>,
    #[serde(default = "default_java_library_ids")]
    pub java_library: Vec<String>,
    #[serde(default = "default_kotlin_jvm_ids")]
    pub kotlin_jvm: Vec<String>,
}

impl Default for PluginIds {
    fn default() -> Self {
        Self {
            kapt: default_kapt_ids(),
            java_library: default_java_library_ids(),
            kotlin_jvm: default_kotlin_jvm_ids(),
        }
    }
}

fn default_kapt_ids() -> Vec<String> {
    vec!["kotlin-kapt".into(), "org.jetbrains.kotlin.kapt".into()]
}
fn default_java_library_ids() -> Vec<String> {
    vec!["java-library".into()]
}
fn default_kotlin_jvm_ids() -> Vec<String> {
    vec!["org.jetbrains.kotlin.jvm".into(), "kotlin".into()]
}

impl PluginIds {
    pub fn applies_kapt(&self, plugins: &BTreeSet<String>) -> bool {
        applies_any(&self.kapt, plugins)
    }

    pub fn applies_java_library(&self, plugins: &BTreeSet<String>) -> bool {
        applies_any(&self.java_library, plugins)
    }

    pub fn applies_kotlin_jvm(&self, plugins: &BTreeSet<String>) -> bool {
        applies_any(&self.kotlin_jvm, plugins)
    }
}

fn applies_any(ids: &[String], plugins: &BTreeSet<String>) -> bool {
    ids.iter().any(|id| plugins.contains(id))
}

/// Module exclusion configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ExcludeConfig {
    /// Module paths or `*` patterns to skip
    #[serde(default)]
    pub modules: Vec<String>,
}

/// Where reports are written
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Report directory, relative to the project root
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
    /// Compact aggregated report file name
    #[serde(default = "default_report_name")]
    pub report: String,
    /// Pretty aggregated report file name
    #[serde(default = "default_pretty_name")]
    pub report_pretty: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            report: default_report_name(),
            report_pretty: default_pretty_name(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("build/reports/dependency-analysis")
}
fn default_report_name() -> String {
    "build-health.json".into()
}
fn default_pretty_name() -> String {
    "build-health-pretty.txt".into()
}

/// Default CLI flags that can be set in project config
#[derive(Debug, Clone, Deserialize, Default)]
pub struct CliDefaults {
    /// Default output format (text, json)
    #[serde(default)]
    pub format: Option<String>,

    /// Default number of workers
    #[serde(default)]
    pub workers: Option<usize>,

    /// Exit non-zero when any advice exists
    #[serde(default)]
    pub fail_on_advice: Option<bool>,
}

/// Load project configuration from the project root.
///
/// Searches for configuration files in this order:
/// 1. `depadvice.toml`
/// 2. `.depadvicerc.json`
///
/// Returns default configuration if no config file is found or the file
/// cannot be parsed.
pub fn load_project_config(root: &Path) -> ProjectConfig {
    let toml_path = root.join("depadvice.toml");
    if toml_path.exists() {
        match load_toml_config(&toml_path) {
            Ok(config) => {
                debug!("Loaded project config from {}", toml_path.display());
                return config;
            }
            Err(e) => {
                warn!("Failed to load {}: {}", toml_path.display(), e);
            }
        }
    }

    let json_path = root.join(".depadvicerc.json");
    if json_path.exists() {
        match load_json_config(&json_path) {
            Ok(config) => {
                debug!("Loaded project config from {}", json_path.display());
                return config;
            }
            Err(e) => {
                warn!("Failed to load {}: {}", json_path.display(), e);
            }
        }
    }

    debug!("No project config found, using defaults");
    ProjectConfig::default()
}

fn load_toml_config(path: &Path) -> anyhow::Result<ProjectConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: ProjectConfig = toml::from_str(&content)?;
    Ok(config)
}

fn load_json_config(path: &Path) -> anyhow::Result<ProjectConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: ProjectConfig = serde_json::from_str(&content)?;
    Ok(config)
}

impl ProjectConfig {
    /// Check if a module is excluded from analysis
    pub fn should_exclude(&self, module_path: &str) -> bool {
        self.exclude
            .modules
            .iter()
            .any(|pattern| glob_match(pattern, module_path))
    }

    /// Report directory resolved against the project root
    pub fn output_dir(&self, root: &Path) -> PathBuf {
        if self.output.dir.is_absolute() {
            self.output.dir.clone()
        } else {
            root.join(&self.output.dir)
        }
    }
}

/// Match a module path against a pattern where `*` matches any run of
/// characters, including `:`
fn glob_match(pattern: &str, path: &str) -> bool {
    if !pattern.contains('*') {
        return pattern == path;
    }

    let parts: Vec<&str> = pattern.split('*').collect();
    let mut rest = path;

    // First segment anchors at the start, last at the end
    let first = parts[0];
    if !rest.starts_with(first) {
        return false;
    }
    rest = &rest[first.len()..];

    let last = parts[parts.len() - 1];
    for middle in &parts[1..parts.len() - 1] {
        match rest.find(middle) {
            Some(idx) => rest = &rest[idx + middle.len()..],
            None => return false,
        }
    }
    rest.ends_with(last)
}
