//! Configuration policy
//!
//! Maps a classified dependency to the configuration it should be declared
//! under, or to removal. Rules are applied in priority order; see
//! `PolicyEngine::target`.

use super::classifier::{Classification, ClassifiedDependency};
use crate::catalog::ClosureCache;
use crate::models::{Configuration, Coordinate, UsageClassification};
use std::collections::BTreeSet;

/// Where a declared dependency should end up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// Leave the declaration as it is
    Keep,
    Remove,
    Declare(Configuration),
}

/// Policy decisions for one module
pub struct PolicyEngine {
    /// Configuration a misdeclared active processor should move to
    processor_configuration: Configuration,
    /// Coordinates still on the classpath after advice is applied, through
    /// the dependencies that stay declared or get added
    still_resolved: BTreeSet<Coordinate>,
}

impl PolicyEngine {
    pub fn new(
        closures: &ClosureCache,
        classification: &Classification,
        processor_configuration: Configuration,
    ) -> Self {
        let roots = classification
            .dependencies
            .iter()
            .filter(|c| !c.dependency.configuration.is_processor())
            .filter(|c| c.usage == UsageClassification::UsedDirectly)
            .map(ClassifiedDependency::coordinate)
            .chain(classification.undeclared.iter().map(|u| &u.coordinate));

        let mut still_resolved = BTreeSet::new();
        for root in roots {
            still_resolved.extend(closures.resolved(root).iter().map(|(c, _)| c.clone()));
        }

        Self {
            processor_configuration,
            still_resolved,
        }
    }

    /// Target for one dependency:
    ///
    /// 1. unused → remove
    /// 2. inactive processor → remove
    /// 3. active processor → keep, or move into the processor configuration
    /// 4. used and on the public surface → `api`
    /// 5. used internally → `implementation` (`compileOnly` is kept)
    /// 6. transitive only → remove, unless nothing else would still resolve it
    pub fn target(&self, classified: &ClassifiedDependency) -> Target {
        if !classified.verified {
            return Target::Keep;
        }
        let current = classified.dependency.configuration;

        match &classified.usage {
            UsageClassification::Unused | UsageClassification::ProcessorInactive => Target::Remove,
            UsageClassification::ProcessorActive => {
                if current.is_processor() {
                    Target::Keep
                } else {
                    Target::Declare(self.processor_configuration)
                }
            }
            UsageClassification::UsedDirectly => {
                if classified.exported {
                    Target::Declare(Configuration::Api)
                } else if current == Configuration::CompileOnly {
                    Target::Keep
                } else {
                    Target::Declare(Configuration::Implementation)
                }
            }
            UsageClassification::UsedTransitivelyOnly { .. } => {
                if self.still_resolved.contains(classified.coordinate()) {
                    Target::Remove
                } else {
                    Target::Keep
                }
            }
        }
    }
}
