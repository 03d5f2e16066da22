//! Error types for dependency analysis
//!
//! Only a few of these are fatal, and only to a single module. See
//! `pipeline` for how failures are isolated and `aggregate` for how skipped
//! modules are reported.

use thiserror::Error;

/// Errors raised while analyzing or aggregating dependency advice
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AdviceError {
    #[error("Invalid coordinate '{0}': expected group:name:version")]
    InvalidCoordinate(String),

    #[error("Unknown configuration '{0}'")]
    UnknownConfiguration(String),

    /// Exported-symbol data for a coordinate could not be obtained.
    /// Recovered locally by treating the dependency as used.
    #[error("Catalog unavailable for {coordinate}: {reason}")]
    CatalogUnavailable { coordinate: String, reason: String },

    /// A declaration names an unrecognized configuration or an unparseable
    /// coordinate. Fails the module it belongs to.
    #[error("Malformed declaration in {module_path}: '{coordinate}' under '{configuration}'")]
    MalformedDeclaration {
        module_path: String,
        coordinate: String,
        configuration: String,
    },

    #[error("No symbol index for module {0}")]
    SymbolIndexUnavailable(String),

    #[error("Module pipeline for {module_path} panicked: {message}")]
    PipelinePanicked {
        module_path: String,
        message: String,
    },
}

pub type AdviceResult<T> = Result<T, AdviceError>;
