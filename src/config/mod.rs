//! Configuration module for depadvice
//!
//! This module handles:
//! - Project-level configuration (depadvice.toml)
//! - Plugin id aliases for the plugin checks
//! - Module exclusion and report locations
//! - CLI defaults

mod project_config;

pub use project_config::{
    CliDefaults,
    ExcludeConfig,
    OutputConfig,
    PluginIds,
    ProjectConfig,
    load_project_config,
};
