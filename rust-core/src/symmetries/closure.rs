use std::collections::BTreeSet;

use log::debug;

use crate::config::{CLOSURE_MAX_OPERATIONS, CLOSURE_MAX_ROUNDS};
use crate::error::{MsgError, Result};
use crate::symmetries::symmetry_operations::Composable;

/// Fixed-point closure of a finite set of operations under composition.
///
/// Each round composes ordered pairs of known elements and inserts every unseen product.
/// Pairs whose members were both known before the previous round are skipped, their products
/// are already present. The loop stops after a round that adds nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClosureEngine {
    max_rounds: usize,
    max_operations: usize,
}

impl Default for ClosureEngine {
    fn default() -> Self {
        Self {
            max_rounds: CLOSURE_MAX_ROUNDS,
            max_operations: CLOSURE_MAX_OPERATIONS,
        }
    }
}

impl ClosureEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_rounds(mut self, max_rounds: usize) -> Self {
        self.max_rounds = max_rounds;
        self
    }

    pub fn with_max_operations(mut self, max_operations: usize) -> Self {
        self.max_operations = max_operations;
        self
    }

    /// The closed set in discovery order, seeds first (de-duplicated).
    pub fn closure<T: Composable>(&self, seeds: &[T]) -> Result<Vec<T>> {
        let mut elements: Vec<T> = Vec::with_capacity(seeds.len());
        let mut seen: BTreeSet<T> = BTreeSet::new();
        for seed in seeds {
            if seen.insert(seed.clone()) {
                elements.push(seed.clone());
            }
        }

        // elements[frontier..] were added during the previous round
        let mut frontier = 0;
        let mut rounds = 0;
        while frontier < elements.len() {
            if rounds == self.max_rounds {
                return Err(MsgError::ClosureDivergence {
                    rounds,
                    size: elements.len(),
                });
            }
            rounds += 1;

            let known = elements.len();
            for i in 0..known {
                for j in 0..known {
                    if i < frontier && j < frontier {
                        continue;
                    }
                    let product = elements[i].compose(&elements[j])?;
                    if seen.contains(&product) {
                        continue;
                    }
                    seen.insert(product.clone());
                    elements.push(product);
                    if elements.len() > self.max_operations {
                        return Err(MsgError::ClosureDivergence {
                            rounds,
                            size: elements.len(),
                        });
                    }
                }
            }
            frontier = known;
        }

        debug!(
            "Closure of {} seeds reached {} operations after {} rounds",
            seeds.len(),
            elements.len(),
            rounds
        );
        Ok(elements)
    }

    /// The closed set sorted by the operation ordering.
    pub fn closure_sorted<T: Composable>(&self, seeds: &[T]) -> Result<Vec<T>> {
        let mut elements = self.closure(seeds)?;
        elements.sort();
        Ok(elements)
    }

    /// True when the distinct operations in `operations` already form a closed set.
    pub fn is_closed<T: Composable>(&self, operations: &[T]) -> Result<bool> {
        let distinct: BTreeSet<&T> = operations.iter().collect();
        Ok(self.closure(operations)?.len() == distinct.len())
    }
}

/// Closure with the default safety caps.
pub fn closure<T: Composable>(seeds: &[T]) -> Result<Vec<T>> {
    ClosureEngine::default().closure(seeds)
}

/// Sorted closure with the default safety caps.
pub fn closure_sorted<T: Composable>(seeds: &[T]) -> Result<Vec<T>> {
    ClosureEngine::default().closure_sorted(seeds)
}
