//! Comparison of assembled groups against an independent source of generators.
//!
//! Both sides are closed and sorted before comparing, so the reference only needs to provide a
//! generating set. Disagreements are collected into a [`ReferenceReport`] and never abort the
//! comparison.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use log::{debug, info, warn};
use serde::Serialize;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::database::groups::{Group, MagneticSpaceGroupDatabase};
use crate::error::{MsgError, Result};
use crate::interfaces::setting::Bns;
use crate::symmetries::closure::ClosureEngine;
use crate::symmetries::operation_parser::parse_one_line_generators;
use crate::symmetries::symmetry_operations::MagneticOperation;

/// Anything able to produce BNS generators for a group number (1..=1651).
pub trait GeneratorSource {
    fn generators_for(&self, group_index: usize) -> Result<Vec<MagneticOperation>>;
}

/// Generators read from lines of the form `<index> <one line generators>`, e.g.
/// `2 (x,y,z);(-x,-y,-z)`. Blank lines and lines starting with `#` are skipped.
///
/// Entries are parsed on request, so a malformed entry only affects its own group.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextGeneratorSource {
    entries: BTreeMap<usize, String>,
}

impl TextGeneratorSource {
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut entries = BTreeMap::new();
        for (line_index, line) in reader.lines().enumerate() {
            let line = line?;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            let format_error = |message: String| MsgError::Format {
                group: None,
                line_number: line_index + 1,
                line: trimmed.to_string(),
                message,
            };
            let (index, generators) = trimmed
                .split_once(char::is_whitespace)
                .ok_or_else(|| format_error("expected a group index followed by generators".to_string()))?;
            let index: usize = index
                .parse()
                .map_err(|_| format_error(format!("invalid group index {:?}", index)))?;
            if entries.insert(index, generators.trim().to_string()).is_some() {
                return Err(format_error(format!("duplicate entry for group {}", index)));
            }
        }
        debug!("Read reference generators for {} groups", entries.len());
        Ok(Self { entries })
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_reader(BufReader::new(File::open(path.as_ref())?))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl GeneratorSource for TextGeneratorSource {
    fn generators_for(&self, group_index: usize) -> Result<Vec<MagneticOperation>> {
        let text = self.entries.get(&group_index).ok_or_else(|| {
            MsgError::validation(format!("no reference generators for group {}", group_index))
        })?;
        parse_one_line_generators::<Bns>(text)
    }
}

/// How one group disagrees with the reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MismatchKind {
    Size { ours: usize, reference: usize },
    /// First position (in sorted order) where the closed sets differ
    Element { position: usize, ours: String, reference: String },
    ReferenceUnavailable { message: String },
    ClosureFailed { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReferenceMismatch {
    pub group_number: u32,
    pub bns_number: String,
    pub kind: MismatchKind,
}

/// Outcome of comparing every group with the reference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReferenceReport {
    pub compared: usize,
    pub mismatches: Vec<ReferenceMismatch>,
}

impl ReferenceReport {
    pub fn matched(&self) -> usize {
        self.compared - self.mismatches.len()
    }

    pub fn is_clean(&self) -> bool {
        self.mismatches.is_empty()
    }
}

/// Close and sort the stored BNS operations of every group and the reference generators of the
/// same group number, then compare size and elements.
pub fn compare_with_reference<G>(database: &MagneticSpaceGroupDatabase, source: &G) -> ReferenceReport
where
    G: GeneratorSource + Sync,
{
    let engine = ClosureEngine::default();

    #[cfg(feature = "parallel")]
    let outcomes: Vec<Option<ReferenceMismatch>> = database
        .groups()
        .par_iter()
        .map(|group| compare_group(group, source, &engine))
        .collect();

    #[cfg(not(feature = "parallel"))]
    let outcomes: Vec<Option<ReferenceMismatch>> = database
        .groups()
        .iter()
        .map(|group| compare_group(group, source, &engine))
        .collect();

    let report = ReferenceReport {
        compared: outcomes.len(),
        mismatches: outcomes.into_iter().flatten().collect(),
    };
    for mismatch in &report.mismatches {
        warn!(
            "Group {} ({}) differs from the reference: {:?}",
            mismatch.group_number, mismatch.bns_number, mismatch.kind
        );
    }
    info!(
        "Reference comparison: {} of {} groups match",
        report.matched(),
        report.compared
    );
    report
}

fn compare_group<G: GeneratorSource>(group: &Group, source: &G, engine: &ClosureEngine) -> Option<ReferenceMismatch> {
    let mismatch = |kind| {
        Some(ReferenceMismatch {
            group_number: group.number,
            bns_number: group.bns.number_string.clone(),
            kind,
        })
    };

    let ours = match engine.closure_sorted(&group.bns.operations) {
        Ok(closed) => closed,
        Err(err) => return mismatch(MismatchKind::ClosureFailed { message: err.to_string() }),
    };
    let generators = match source.generators_for(group.number as usize) {
        Ok(generators) => generators,
        Err(err) => return mismatch(MismatchKind::ReferenceUnavailable { message: err.to_string() }),
    };
    let reference = match engine.closure_sorted(&generators) {
        Ok(closed) => closed,
        Err(err) => return mismatch(MismatchKind::ClosureFailed { message: err.to_string() }),
    };

    first_difference(&ours, &reference).and_then(mismatch)
}

fn first_difference(ours: &[MagneticOperation], reference: &[MagneticOperation]) -> Option<MismatchKind> {
    if ours.len() != reference.len() {
        return Some(MismatchKind::Size {
            ours: ours.len(),
            reference: reference.len(),
        });
    }
    ours.iter()
        .zip(reference)
        .position(|(a, b)| a != b)
        .map(|position| MismatchKind::Element {
            position,
            ours: ours[position].text_form(),
            reference: reference[position].text_form(),
        })
}

/// Group numbers (1-based, up to `group_count`) of the reference whose closure equals the
/// closure of `operations`. Reference groups without usable data are skipped.
pub fn find_matching_reference_groups<G: GeneratorSource>(
    operations: &[MagneticOperation],
    source: &G,
    group_count: usize,
) -> Result<Vec<usize>> {
    let engine = ClosureEngine::default();
    let ours = engine.closure_sorted(operations)?;

    let mut matching = Vec::new();
    for index in 1..=group_count {
        let Ok(generators) = source.generators_for(index) else {
            continue;
        };
        let Ok(reference) = engine.closure_sorted(&generators) else {
            continue;
        };
        if first_difference(&ours, &reference).is_none() {
            matching.push(index);
        }
    }
    Ok(matching)
}

/// Reference group numbers whose generator list is not already closed. Useful when the
/// reference is expected to list complete groups rather than generators.
pub fn unclosed_reference_groups<G: GeneratorSource>(source: &G, group_count: usize) -> Vec<usize> {
    let engine = ClosureEngine::default();
    (1..=group_count)
        .filter(|&index| match source.generators_for(index) {
            Ok(operations) => !matches!(engine.is_closed(&operations), Ok(true)),
            Err(_) => false,
        })
        .collect()
}
