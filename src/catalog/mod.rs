//! Symbol catalog: the read-only data the classifier works from
//!
//! The catalog answers two questions, both precomputed by an external
//! symbol-extraction step:
//! - which symbols does a module reference (and which are on its public surface)
//! - which symbols does a coordinate export, what does it depend on, and is
//!   it an annotation processor
//!
//! `SymbolCatalog` is the seam: pipelines only ever see `Arc<dyn SymbolCatalog>`,
//! so any provider can be plugged in. `InMemoryCatalog` is the one built from
//! a project model file.

mod closure;

pub use closure::{Closure, ClosureCache, EdgeFilter};

use crate::error::{AdviceError, AdviceResult};
use crate::models::{Coordinate, SymbolSet};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// Symbols referenced by a module's own compiled output
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleSymbols {
    /// Everything the module's code (including generated code) names
    #[serde(default)]
    pub referenced: SymbolSet,
    /// Symbols appearing in the module's public signatures
    #[serde(default)]
    pub public_surface: SymbolSet,
}

/// Catalog data for a single coordinate
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryEntry {
    /// Exported API surface
    #[serde(default)]
    pub symbols: SymbolSet,
    /// Direct dependencies of the library itself
    #[serde(default)]
    pub dependencies: Vec<LibraryEdge>,
    /// Present when the library registers an annotation/code processor
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processor: Option<ProcessorRegistration>,
}

impl LibraryEntry {
    pub fn is_processor(&self) -> bool {
        self.processor.is_some()
    }
}

/// Edge from a library to one of its dependencies
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryEdge {
    pub coordinate: Coordinate,
    /// The library needs this dependency but expects consumers to supply it
    #[serde(default)]
    pub provided: bool,
}

impl LibraryEdge {
    pub fn transitive(coordinate: Coordinate) -> Self {
        Self {
            coordinate,
            provided: false,
        }
    }

    pub fn provided(coordinate: Coordinate) -> Self {
        Self {
            coordinate,
            provided: true,
        }
    }
}

/// Processor registration with the annotations that trigger it
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessorRegistration {
    /// Fully-qualified annotation names, or `package.*` patterns
    #[serde(default)]
    pub triggers: Vec<String>,
}

impl ProcessorRegistration {
    pub fn is_triggered_by(&self, symbols: &SymbolSet) -> bool {
        self.triggers.iter().any(|t| symbols.matches_pattern(t))
    }
}

/// Read-only source of module and library symbol data
///
/// Implementations must be pure per run: the same query always yields the
/// same answer, so results can be memoized and shared across threads.
pub trait SymbolCatalog: Send + Sync {
    /// Symbol index for a module, or `SymbolIndexUnavailable`
    fn module_symbols(&self, module_path: &str) -> AdviceResult<Arc<ModuleSymbols>>;

    /// Catalog entry for a coordinate, or `CatalogUnavailable`
    fn library(&self, coordinate: &Coordinate) -> AdviceResult<Arc<LibraryEntry>>;
}

/// Catalog held entirely in memory
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    modules: HashMap<String, Arc<ModuleSymbols>>,
    libraries: HashMap<Coordinate, Arc<LibraryEntry>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_module(mut self, module_path: impl Into<String>, symbols: ModuleSymbols) -> Self {
        self.insert_module(module_path, symbols);
        self
    }

    pub fn with_library(mut self, coordinate: Coordinate, entry: LibraryEntry) -> Self {
        self.insert_library(coordinate, entry);
        self
    }

    pub fn insert_module(&mut self, module_path: impl Into<String>, symbols: ModuleSymbols) {
        self.modules.insert(module_path.into(), Arc::new(symbols));
    }

    pub fn insert_library(&mut self, coordinate: Coordinate, entry: LibraryEntry) {
        self.libraries.insert(coordinate, Arc::new(entry));
    }
}

impl SymbolCatalog for InMemoryCatalog {
    fn module_symbols(&self, module_path: &str) -> AdviceResult<Arc<ModuleSymbols>> {
        self.modules
            .get(module_path)
            .cloned()
            .ok_or_else(|| AdviceError::SymbolIndexUnavailable(module_path.to_string()))
    }

    fn library(&self, coordinate: &Coordinate) -> AdviceResult<Arc<LibraryEntry>> {
        self.libraries
            .get(coordinate)
            .cloned()
            .ok_or_else(|| AdviceError::CatalogUnavailable {
                coordinate: coordinate.to_string(),
                reason: "no symbol data was extracted for this coordinate".to_string(),
            })
    }
}
