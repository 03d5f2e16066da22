//! Project model input
//!
//! The serialized form of what the external collaborators hand over: module
//! declarations and plugins from the build, symbol indexes from the
//! extraction step, and the library catalog.
//!
//! ```json
//! {
//!   "modules": [{
//!     "path": ":app",
//!     "plugins": ["kotlin-kapt"],
//!     "declarations": [{"coordinate": "com.google.dagger:dagger:2.24", "configuration": "implementation"}],
//!     "symbols": {"referenced": ["dagger.Module"], "publicSurface": []},
//!     "sources": {"java": 0, "kotlin": 4}
//!   }],
//!   "libraries": {
//!     "com.google.dagger:dagger:2.24": {
//!       "symbols": ["dagger.Module"],
//!       "dependencies": [{"coordinate": "javax.inject:javax.inject:1"}]
//!     }
//!   }
//! }
//! ```

use crate::analysis::{ModuleInput, SourceSummary};
use crate::catalog::{InMemoryCatalog, LibraryEntry, ModuleSymbols};
use crate::error::{AdviceError, AdviceResult};
use crate::models::{Configuration, Coordinate, DeclaredDependency};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use tracing::warn;

/// Everything one analysis run consumes
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectModel {
    #[serde(default)]
    pub modules: Vec<ModuleSpec>,
    #[serde(default)]
    pub libraries: BTreeMap<Coordinate, LibraryEntry>,
}

/// A module as described by the build, before validation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModuleSpec {
    pub path: String,
    #[serde(default)]
    pub plugins: BTreeSet<String>,
    #[serde(default)]
    pub declarations: Vec<RawDeclaration>,
    /// Missing when symbol extraction produced nothing for the module
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbols: Option<ModuleSymbols>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources: Option<SourceSummary>,
}

/// Declaration exactly as written in the build
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawDeclaration {
    pub coordinate: String,
    pub configuration: String,
}

impl RawDeclaration {
    pub fn new(coordinate: impl Into<String>, configuration: impl Into<String>) -> Self {
        Self {
            coordinate: coordinate.into(),
            configuration: configuration.into(),
        }
    }
}

impl ProjectModel {
    /// Load a model from JSON, or TOML when the extension says so
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read project model {}", path.display()))?;
        let model = match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => toml::from_str(&content)
                .with_context(|| format!("Invalid project model {}", path.display()))?,
            _ => serde_json::from_str(&content)
                .with_context(|| format!("Invalid project model {}", path.display()))?,
        };
        Ok(model)
    }

    /// Catalog over the model's module symbols and libraries
    pub fn catalog(&self) -> InMemoryCatalog {
        let mut catalog = InMemoryCatalog::new();
        for module in &self.modules {
            if let Some(symbols) = &module.symbols {
                catalog.insert_module(module.path.clone(), symbols.clone());
            }
        }
        for (coordinate, entry) in &self.libraries {
            catalog.insert_library(coordinate.clone(), entry.clone());
        }
        catalog
    }
}

impl ModuleSpec {
    /// Validate declarations into a `ModuleInput`.
    ///
    /// Fails on the first unparseable coordinate or configuration. A
    /// coordinate declared twice keeps its first declaration; the duplicate
    /// is returned as a warning.
    pub fn to_input(&self) -> AdviceResult<(ModuleInput, Vec<String>)> {
        let mut declarations: Vec<DeclaredDependency> = Vec::with_capacity(self.declarations.len());
        let mut warnings = Vec::new();

        for raw in &self.declarations {
            let malformed = || AdviceError::MalformedDeclaration {
                module_path: self.path.clone(),
                coordinate: raw.coordinate.clone(),
                configuration: raw.configuration.clone(),
            };
            let coordinate: Coordinate = raw.coordinate.parse().map_err(|_| malformed())?;
            let configuration: Configuration = raw.configuration.parse().map_err(|_| malformed())?;

            if let Some(existing) = declarations.iter().find(|d| d.coordinate == coordinate) {
                let message = format!(
                    "{} is declared more than once ({} and {}); using {}",
                    coordinate, existing.configuration, configuration, existing.configuration
                );
                warn!("{}: {}", self.path, message);
                warnings.push(message);
                continue;
            }
            declarations.push(DeclaredDependency::new(coordinate, configuration));
        }

        let input = ModuleInput {
            module_path: self.path.clone(),
            declarations,
            plugins: self.plugins.clone(),
            sources: self.sources,
        };
        Ok((input, warnings))
    }
}
