//! Memoized dependency closures
//!
//! Walking a library's dependency edges is a pure function of the catalog,
//! and every module pipeline asks for the same closures, so results are kept
//! in a concurrent read cache shared by all workers of a run.

use super::SymbolCatalog;
use crate::models::Coordinate;
use dashmap::DashMap;
use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;
use tracing::trace;

/// Which library edges a closure follows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeFilter {
    /// Everything a library needs, including provided edges
    Requirements,
    /// Only what actually lands on a consumer's classpath
    Resolved,
}

/// Coordinates reachable from a root, with their edge distance
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Closure {
    distances: BTreeMap<Coordinate, usize>,
}

impl Closure {
    /// Edge distance from the root; direct dependencies are at distance 1.
    /// The root itself is not part of its closure.
    pub fn distance(&self, coordinate: &Coordinate) -> Option<usize> {
        self.distances.get(coordinate).copied()
    }

    pub fn contains(&self, coordinate: &Coordinate) -> bool {
        self.distances.contains_key(coordinate)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Coordinate, usize)> {
        self.distances.iter().map(|(c, d)| (c, *d))
    }
}

/// Thread-safe cache of closures over a shared catalog
pub struct ClosureCache {
    catalog: Arc<dyn SymbolCatalog>,
    closures: DashMap<(EdgeFilter, Coordinate), Arc<Closure>>,
}

impl ClosureCache {
    pub fn new(catalog: Arc<dyn SymbolCatalog>) -> Self {
        Self {
            catalog,
            closures: DashMap::new(),
        }
    }

    pub fn catalog(&self) -> &dyn SymbolCatalog {
        self.catalog.as_ref()
    }

    /// Everything `root` needs to work, whoever supplies it
    pub fn requirements(&self, root: &Coordinate) -> Arc<Closure> {
        self.closure(root, EdgeFilter::Requirements)
    }

    /// Everything that resolves onto the classpath when `root` is declared
    pub fn resolved(&self, root: &Coordinate) -> Arc<Closure> {
        self.closure(root, EdgeFilter::Resolved)
    }

    /// Number of memoized closures
    pub fn len(&self) -> usize {
        self.closures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.closures.is_empty()
    }

    fn closure(&self, root: &Coordinate, filter: EdgeFilter) -> Arc<Closure> {
        let key = (filter, root.clone());
        if let Some(hit) = self.closures.get(&key) {
            return Arc::clone(&hit);
        }

        let computed = Arc::new(self.walk(root, filter));
        // Two workers may race to compute the same closure; both results are
        // identical, so whichever lands first is kept.
        let entry = self.closures.entry(key).or_insert(computed);
        Arc::clone(&entry)
    }

    /// Breadth-first walk, so the first visit of a coordinate is its
    /// shortest distance from the root
    fn walk(&self, root: &Coordinate, filter: EdgeFilter) -> Closure {
        let mut distances = BTreeMap::new();
        let mut queue = VecDeque::from([(root.clone(), 0usize)]);

        while let Some((current, depth)) = queue.pop_front() {
            let entry = match self.catalog.library(&current) {
                Ok(entry) => entry,
                Err(e) => {
                    // Unknown libraries are leaves
                    trace!("Closure walk stops at {}: {}", current, e);
                    continue;
                }
            };
            for edge in &entry.dependencies {
                if filter == EdgeFilter::Resolved && edge.provided {
                    continue;
                }
                if edge.coordinate == *root || distances.contains_key(&edge.coordinate) {
                    continue;
                }
                distances.insert(edge.coordinate.clone(), depth + 1);
                queue.push_back((edge.coordinate.clone(), depth + 1));
            }
        }

        Closure { distances }
    }
}
