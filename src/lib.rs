//! depadvice - dependency health analysis for multi-module builds
//!
//! Classifies every declared dependency of every module as used, unused,
//! transitively satisfied, or processor-only, and turns that into
//! add/remove/change advice plus plugin-level remediation.

pub mod aggregate;
pub mod analysis;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod project;
pub mod reporters;

pub use error::{AdviceError, AdviceResult};
