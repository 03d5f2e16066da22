//! Advice generation
//!
//! Turns classifier and policy output into the minimal advice set for a
//! module: at most one item per declaration, plus `Add` for dependencies
//! that are referenced directly without being declared.

use super::classifier::Classification;
use super::policy::{PolicyEngine, Target};
use crate::models::{Advice, Configuration};
use std::collections::BTreeSet;

pub fn generate_advice(classification: &Classification, policy: &PolicyEngine) -> BTreeSet<Advice> {
    let mut advice = BTreeSet::new();

    for classified in &classification.dependencies {
        let coordinate = classified.coordinate().clone();
        let current = classified.dependency.configuration;
        match policy.target(classified) {
            Target::Keep => {}
            Target::Remove => {
                advice.insert(Advice::remove(coordinate, current));
            }
            Target::Declare(target) if target != current => {
                advice.insert(Advice::change(coordinate, current, target));
            }
            Target::Declare(_) => {}
        }
    }

    for undeclared in &classification.undeclared {
        let to = if undeclared.exported {
            Configuration::Api
        } else {
            Configuration::Implementation
        };
        advice.insert(Advice::add(undeclared.coordinate.clone(), to));
    }

    advice
}
