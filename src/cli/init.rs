//! Init command - write a default depadvice.toml

use anyhow::{Context, Result};
use console::style;
use std::path::Path;

const DEFAULT_CONFIG: &str = r#"# depadvice configuration

# Announce report locations and summary lines
chatty = true

[plugins]
# Plugin ids treated as each plugin
kapt = ["kotlin-kapt", "org.jetbrains.kotlin.kapt"]
java_library = ["java-library"]
kotlin_jvm = ["org.jetbrains.kotlin.jvm", "kotlin"]

[exclude]
# Module paths to skip; `*` matches any run of characters
modules = []

[output]
# Report directory, relative to the project root
dir = "build/reports/dependency-analysis"
report = "build-health.json"
report_pretty = "build-health-pretty.txt"

[defaults]
# Output format on stdout (text, json)
format = "text"

# Worker threads (0 = auto)
workers = 0

# Exit non-zero when any advice exists
fail_on_advice = false
"#;

/// Run the init command
pub fn run(path: &Path) -> Result<()> {
    let root = path
        .canonicalize()
        .with_context(|| format!("Path does not exist: {}", path.display()))?;

    if !root.is_dir() {
        anyhow::bail!("Path is not a directory: {}", root.display());
    }

    let config_path = root.join("depadvice.toml");
    if config_path.exists() {
        println!(
            "{} Already initialized at {}",
            style("✓").green(),
            style(config_path.display()).cyan()
        );
        return Ok(());
    }

    std::fs::write(&config_path, DEFAULT_CONFIG)
        .with_context(|| format!("Failed to create {}", config_path.display()))?;
    println!(
        "{} Created {}",
        style("✓").green(),
        style(config_path.display()).cyan()
    );

    println!("\nNext steps:");
    println!("  {} Analyze a project model", style("depadvice analyze project.json").cyan());

    Ok(())
}
