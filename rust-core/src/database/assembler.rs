use log::{debug, info};
use nalgebra::Matrix3;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::database::groups::{
    BnsGroup, BnsOgTransform, Group, MagneticSpaceGroupDatabase, OgGroup, WyckoffPosition, WyckoffSite,
};
use crate::database::raw_records::{
    RawDatabase, RawGroupRecord, RawOperator, RawTransform, RawVector, RawWyckoffSite,
};
use crate::error::{MsgError, Result};
use crate::interfaces::{Basis, Setting};
use crate::symmetries::closure::ClosureEngine;
use crate::symmetries::point_operations::PointOperationTable;
use crate::symmetries::rational_vector::RationalVector3;
use crate::symmetries::symmetry_operations::{MagneticOperation, TimeReversal};

/// Turns raw records into [`Group`]s.
///
/// Assembly is pure: every group depends only on its own record and the shared, read-only
/// point operation table.
#[derive(Debug, Clone, Default)]
pub struct DatabaseAssembler {
    closure_check: bool,
    closure_engine: ClosureEngine,
}

impl DatabaseAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject groups whose stored BNS operations are not closed under composition.
    pub fn with_closure_check(mut self, closure_check: bool) -> Self {
        self.closure_check = closure_check;
        self
    }

    pub fn with_closure_engine(mut self, closure_engine: ClosureEngine) -> Self {
        self.closure_engine = closure_engine;
        self
    }

    /// Assemble every record, in order.
    pub fn assemble(&self, raw: &RawDatabase) -> Result<MagneticSpaceGroupDatabase> {
        let table = &raw.point_operations;

        #[cfg(feature = "parallel")]
        let groups = raw
            .records
            .par_iter()
            .map(|record| self.assemble_group(record, table))
            .collect::<Result<Vec<Group>>>()?;

        #[cfg(not(feature = "parallel"))]
        let groups = raw
            .records
            .iter()
            .map(|record| self.assemble_group(record, table))
            .collect::<Result<Vec<Group>>>()?;

        info!(
            "Assembled {} magnetic space groups ({} type 4)",
            groups.len(),
            groups.iter().filter(|group| group.is_type_4()).count()
        );
        Ok(MagneticSpaceGroupDatabase::new(table.clone(), groups))
    }

    /// Assemble one record against the point operation table.
    pub fn assemble_group(&self, record: &RawGroupRecord, table: &PointOperationTable) -> Result<Group> {
        let header = &record.header;
        let basis = Basis::for_space_group(header.bns_number.0);
        let number = u32::try_from(record.number())
            .map_err(|_| MsgError::validation(format!("group index {} out of range", record.index)))?;

        let bns = BnsGroup {
            number: header.bns_number,
            number_string: header.bns_number_string.clone(),
            symbol: header.bns_label.clone(),
            operations: build_operations(&record.bns.operators, table, basis)?,
            lattice_vectors: build_vectors(&record.bns.lattice_vectors)?,
            wyckoff_sites: build_wyckoff_sites(&record.bns.wyckoff_sites)?,
        };

        if self.closure_check {
            let closed_size = self.closure_engine.closure(&bns.operations)?.len();
            if closed_size != bns.operations.len() {
                return Err(MsgError::validation(format!(
                    "group {} ({}): {} stored BNS operations close to {}",
                    number,
                    bns.number_string,
                    bns.operations.len(),
                    closed_size
                )));
            }
        }

        let (og_operations, og_lattice_vectors, og_wyckoff_sites, bns_og_transform) =
            match (&record.transform, &record.og) {
                (Some(transform), Some(og)) => (
                    build_operations(&og.operators, table, basis)?,
                    build_vectors(&og.lattice_vectors)?,
                    build_wyckoff_sites(&og.wyckoff_sites)?,
                    build_transform(transform)?,
                ),
                (None, None) => (
                    // Independent copy of the BNS data, operations re-tagged without re-reduction
                    bns.operations.iter().map(|op| op.to_og()).collect(),
                    bns.lattice_vectors.clone(),
                    bns.wyckoff_sites.clone(),
                    BnsOgTransform::identity(),
                ),
                _ => {
                    return Err(MsgError::validation(format!(
                        "group {} has an OG section without a transform or the reverse",
                        number
                    )))
                }
            };

        let og = OgGroup {
            number: header.og_number,
            number_string: header.og_number_string.clone(),
            symbol: header.og_label.clone(),
            operations: og_operations,
            lattice_vectors: og_lattice_vectors,
            wyckoff_sites: og_wyckoff_sites,
        };

        debug!(
            "Assembled group {} {} with {} BNS and {} OG operations",
            number,
            header.uni_label,
            bns.operations.len(),
            og.operations.len()
        );

        Ok(Group {
            number,
            group_type: record.group_type,
            symbol: header.uni_label.clone(),
            bns,
            og,
            bns_og_transform,
        })
    }
}

/// Resolve packed operators in the table of `basis` and build operations of setting `S`.
pub fn build_operations<S: Setting>(
    operators: &[RawOperator],
    table: &PointOperationTable,
    basis: Basis,
) -> Result<Vec<MagneticOperation<S>>> {
    operators
        .iter()
        .map(|operator| {
            let point_operation = table.lookup(basis, operator.point_operation_id)?;
            let translation = build_vector(&RawVector {
                numerators: operator.numerators,
                denominator: operator.denominator,
            })?;
            let time_reversal = TimeReversal::from_flag(operator.time_inversion)?;
            Ok(MagneticOperation::new(point_operation.matrix, translation, time_reversal)?
                .with_name(point_operation.name.clone()))
        })
        .collect()
}

fn build_vector(raw: &RawVector) -> Result<RationalVector3> {
    RationalVector3::from_fraction_parts(raw.numerators, raw.denominator)
}

fn build_vectors(raw: &[RawVector]) -> Result<Vec<RationalVector3>> {
    raw.iter().map(build_vector).collect()
}

fn build_wyckoff_sites(raw: &[RawWyckoffSite]) -> Result<Vec<WyckoffSite>> {
    raw.iter()
        .map(|site| {
            let positions = site
                .positions
                .iter()
                .map(|position| {
                    Ok(WyckoffPosition {
                        position: build_vector(&position.position)?,
                        xyz: position.xyz,
                        mag: position.mag,
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(WyckoffSite {
                label: site.label.clone(),
                multiplicity: site.multiplicity,
                positions,
            })
        })
        .collect()
}

fn build_transform(raw: &RawTransform) -> Result<BnsOgTransform> {
    let mut entries = [0i32; 9];
    for (entry, value) in entries.iter_mut().zip(raw.matrix) {
        *entry = i32::try_from(value)
            .map_err(|_| MsgError::validation(format!("transform entry {} out of range", value)))?;
    }
    Ok(BnsOgTransform::new(
        Matrix3::from_row_slice(&entries),
        build_vector(&raw.origin)?,
    ))
}
