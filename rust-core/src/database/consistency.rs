use std::collections::BTreeMap;

use log::{info, warn};
use serde::Serialize;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::database::groups::{Group, MagneticSpaceGroupDatabase};
use crate::symmetries::closure::ClosureEngine;

/// Closure size of one group's stored BNS operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupClosureSize {
    pub group_number: u32,
    pub bns_number: String,
    pub stored_size: usize,
    /// `Err` holds the closure error message.
    pub closure_size: std::result::Result<usize, String>,
}

impl GroupClosureSize {
    pub fn is_closed(&self) -> bool {
        self.closure_size == Ok(self.stored_size)
    }
}

fn closure_size_of(group: &Group, engine: &ClosureEngine) -> GroupClosureSize {
    GroupClosureSize {
        group_number: group.number,
        bns_number: group.bns.number_string.clone(),
        stored_size: group.bns.operations.len(),
        closure_size: engine
            .closure(&group.bns.operations)
            .map(|closed| closed.len())
            .map_err(|err| err.to_string()),
    }
}

/// Closure size of every group, in database order.
pub fn closure_sizes(database: &MagneticSpaceGroupDatabase) -> Vec<GroupClosureSize> {
    closure_sizes_with(database, &ClosureEngine::default())
}

pub fn closure_sizes_with(database: &MagneticSpaceGroupDatabase, engine: &ClosureEngine) -> Vec<GroupClosureSize> {
    #[cfg(feature = "parallel")]
    let sizes = database
        .groups()
        .par_iter()
        .map(|group| closure_size_of(group, engine))
        .collect();

    #[cfg(not(feature = "parallel"))]
    let sizes = database
        .groups()
        .iter()
        .map(|group| closure_size_of(group, engine))
        .collect();

    sizes
}

/// Round-trip check: every group whose stored operations do not already form a closed set.
pub fn verify_closures(database: &MagneticSpaceGroupDatabase) -> Vec<GroupClosureSize> {
    unclosed_groups(&closure_sizes(database))
}

/// Entries of already computed closure sizes that are not closed, each logged as a warning.
pub fn unclosed_groups(sizes: &[GroupClosureSize]) -> Vec<GroupClosureSize> {
    let findings: Vec<GroupClosureSize> = sizes.iter().filter(|size| !size.is_closed()).cloned().collect();

    for finding in &findings {
        match &finding.closure_size {
            Ok(size) => warn!(
                "Group {} ({}) is not closed: {} stored operations, closure has {}",
                finding.group_number, finding.bns_number, finding.stored_size, size
            ),
            Err(message) => warn!(
                "Group {} ({}) closure failed: {}",
                finding.group_number, finding.bns_number, message
            ),
        }
    }
    info!(
        "Closure check: {} of {} groups closed",
        sizes.len() - findings.len(),
        sizes.len()
    );
    findings
}

/// Number of groups per closure size. Failed closures are left out.
pub fn closure_size_histogram(sizes: &[GroupClosureSize]) -> BTreeMap<usize, usize> {
    let mut histogram = BTreeMap::new();
    for size in sizes {
        if let Ok(closure_size) = size.closure_size {
            *histogram.entry(closure_size).or_insert(0) += 1;
        }
    }
    histogram
}
