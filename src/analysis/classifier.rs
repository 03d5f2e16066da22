//! Usage classification
//!
//! Cross-references a module's referenced symbols with the catalog to decide,
//! for every declared dependency, exactly one `UsageClassification`. Also
//! finds undeclared dependencies the module references directly, since those
//! both produce `Add` advice and can justify transitive-only usage.

use crate::catalog::{ClosureCache, LibraryEntry, ModuleSymbols};
use crate::models::{Coordinate, DeclaredDependency, SymbolSet, UsageClassification};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::{debug, warn};

/// Classification of one declared dependency
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedDependency {
    pub dependency: DeclaredDependency,
    pub usage: UsageClassification,
    /// Its exported symbols appear on the module's public surface
    pub exported: bool,
    /// False when the catalog had no data and the classification is a fallback
    pub verified: bool,
}

impl ClassifiedDependency {
    pub fn coordinate(&self) -> &Coordinate {
        &self.dependency.coordinate
    }

    /// Counts as a working processor for toolchain purposes
    pub fn is_active_processor(&self) -> bool {
        self.usage == UsageClassification::ProcessorActive || !self.verified
    }
}

/// An undeclared dependency the module references directly
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct UndeclaredUsage {
    pub coordinate: Coordinate,
    pub exported: bool,
}

/// Everything the classifier learned about one module
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    /// One entry per declaration, in declaration order
    pub dependencies: Vec<ClassifiedDependency>,
    /// Undeclared but directly referenced, in coordinate order
    pub undeclared: Vec<UndeclaredUsage>,
    pub warnings: BTreeSet<String>,
}

/// Classifies declared dependencies against the shared catalog
pub struct UsageClassifier<'a> {
    closures: &'a ClosureCache,
}

impl<'a> UsageClassifier<'a> {
    pub fn new(closures: &'a ClosureCache) -> Self {
        Self { closures }
    }

    /// Classify every declaration of a module.
    ///
    /// `declarations` must not contain the same coordinate twice.
    pub fn classify(
        &self,
        symbols: &ModuleSymbols,
        declarations: &[DeclaredDependency],
    ) -> Classification {
        let mut warnings = BTreeSet::new();

        // Catalog lookups; a missing entry is recovered conservatively
        let entries: Vec<Option<Arc<LibraryEntry>>> = declarations
            .iter()
            .map(|d| match self.closures.catalog().library(&d.coordinate) {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!("{}; treating {} as used", e, d.coordinate);
                    warnings.insert(e.to_string());
                    None
                }
            })
            .collect();

        // First pass: everything decidable from the module's own symbols
        let mut usages: Vec<Option<UsageClassification>> = entries
            .iter()
            .map(|entry| match entry {
                Some(entry) => direct_usage(entry, &symbols.referenced),
                None => Some(UsageClassification::UsedDirectly),
            })
            .collect();

        let undeclared = self.find_undeclared(symbols, declarations, &entries);

        // Dependents that can justify transitive-only usage
        let mut justifiers: Vec<&Coordinate> = declarations
            .iter()
            .zip(&usages)
            .filter(|(_, usage)| {
                matches!(
                    usage,
                    Some(UsageClassification::UsedDirectly | UsageClassification::ProcessorActive)
                )
            })
            .map(|(d, _)| &d.coordinate)
            .collect();
        justifiers.extend(undeclared.iter().map(|u| &u.coordinate));

        // Second pass: transitive-only or unused
        for (declaration, usage) in declarations.iter().zip(usages.iter_mut()) {
            if usage.is_none() {
                *usage = Some(match self.nearest_justifier(&declaration.coordinate, &justifiers) {
                    Some(via) => UsageClassification::UsedTransitivelyOnly { via },
                    None => UsageClassification::Unused,
                });
            }
        }

        let dependencies = declarations
            .iter()
            .zip(entries)
            .zip(usages)
            .map(|((declaration, entry), usage)| {
                let usage = usage.unwrap_or(UsageClassification::Unused);
                debug!("{} is {}", declaration, usage);
                ClassifiedDependency {
                    dependency: declaration.clone(),
                    usage,
                    exported: entry
                        .as_ref()
                        .is_some_and(|e| e.symbols.intersects(&symbols.public_surface)),
                    verified: entry.is_some(),
                }
            })
            .collect();

        Classification {
            dependencies,
            undeclared,
            warnings,
        }
    }

    /// Nearest used dependent whose requirements include `coordinate`.
    /// Ties on distance go to the lowest coordinate.
    fn nearest_justifier(
        &self,
        coordinate: &Coordinate,
        justifiers: &[&Coordinate],
    ) -> Option<Coordinate> {
        justifiers
            .iter()
            .filter(|j| **j != coordinate)
            .filter_map(|j| {
                self.closures
                    .requirements(j)
                    .distance(coordinate)
                    .map(|d| (d, *j))
            })
            .min()
            .map(|(_, j)| j.clone())
    }

    /// Referenced symbols no declared dependency provides, attributed to the
    /// nearest library on the resolved graph that exports them
    fn find_undeclared(
        &self,
        symbols: &ModuleSymbols,
        declarations: &[DeclaredDependency],
        entries: &[Option<Arc<LibraryEntry>>],
    ) -> Vec<UndeclaredUsage> {
        let declared: BTreeSet<&Coordinate> = declarations.iter().map(|d| &d.coordinate).collect();

        let mut uncovered: BTreeSet<&str> = symbols.referenced.iter().collect();
        for entry in entries.iter().flatten() {
            uncovered.retain(|s| !entry.symbols.contains(s));
        }
        if uncovered.is_empty() {
            return Vec::new();
        }

        // Resolved graph of the classpath declarations, nearest distance first
        let mut candidates: BTreeMap<Coordinate, usize> = BTreeMap::new();
        for declaration in declarations.iter().filter(|d| !d.configuration.is_processor()) {
            for (coordinate, distance) in self.closures.resolved(&declaration.coordinate).iter() {
                if declared.contains(coordinate) {
                    continue;
                }
                let best = candidates.entry(coordinate.clone()).or_insert(distance);
                *best = (*best).min(distance);
            }
        }
        let mut ordered: Vec<(usize, Coordinate)> =
            candidates.into_iter().map(|(c, d)| (d, c)).collect();
        ordered.sort();

        let mut added: BTreeMap<Coordinate, bool> = BTreeMap::new();
        for (_, coordinate) in ordered {
            if uncovered.is_empty() {
                break;
            }
            let Ok(entry) = self.closures.catalog().library(&coordinate) else {
                continue;
            };
            let provides: Vec<&str> = uncovered
                .iter()
                .copied()
                .filter(|s| entry.symbols.contains(s))
                .collect();
            if provides.is_empty() {
                continue;
            }
            uncovered.retain(|s| !provides.contains(s));
            let exported = provides.iter().any(|s| symbols.public_surface.contains(s));
            debug!("{} is referenced directly but not declared", coordinate);
            added.insert(coordinate, exported);
        }

        added
            .into_iter()
            .map(|(coordinate, exported)| UndeclaredUsage {
                coordinate,
                exported,
            })
            .collect()
    }
}

/// Classification from the module's own symbols alone; `None` means the
/// answer depends on the other dependencies
fn direct_usage(entry: &LibraryEntry, referenced: &SymbolSet) -> Option<UsageClassification> {
    if let Some(processor) = &entry.processor {
        return Some(if processor.is_triggered_by(referenced) {
            UsageClassification::ProcessorActive
        } else {
            UsageClassification::ProcessorInactive
        });
    }
    if entry.symbols.is_empty() {
        return Some(UsageClassification::Unused);
    }
    if entry.symbols.intersects(referenced) {
        return Some(UsageClassification::UsedDirectly);
    }
    None
}
