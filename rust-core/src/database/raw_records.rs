//! Plain records produced by the format parser, before any algebraic interpretation.
//!
//! Every value is kept exactly as it appears in the source: translation numerators with their
//! shared denominator, raw time inversion flags and point operation ids.

use serde::Serialize;

use crate::symmetries::point_operations::PointOperationTable;

/// Names and numbers from the header line of a group record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RawGroupHeader {
    pub bns_number: (u32, u32),
    pub bns_number_string: String,
    pub uni_label: String,
    pub bns_label: String,
    pub og_number: (u32, u32, u32),
    pub og_number_string: String,
    pub og_label: String,
}

/// One packed operator: point operation id, translation numerators, shared denominator and
/// time inversion flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RawOperator {
    pub point_operation_id: u32,
    pub numerators: [i64; 3],
    pub denominator: i64,
    pub time_inversion: i64,
}

/// Three numerators over one shared denominator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RawVector {
    pub numerators: [i64; 3],
    pub denominator: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RawWyckoffPosition {
    pub position: RawVector,
    pub xyz: [i64; 3],
    pub mag: [i64; 3],
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RawWyckoffSite {
    pub label: String,
    pub multiplicity: u32,
    pub positions: Vec<RawWyckoffPosition>,
}

/// Operators, lattice vectors and Wyckoff sites of one setting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RawRepresentation {
    pub operators: Vec<RawOperator>,
    pub lattice_vectors: Vec<RawVector>,
    pub wyckoff_sites: Vec<RawWyckoffSite>,
}

/// Explicit BNS to OG transform of a type 4 group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RawTransform {
    /// Row-major 3x3 integer matrix
    pub matrix: [i64; 9],
    pub origin: RawVector,
}

/// Everything the source holds for one group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RawGroupRecord {
    /// 0-based position in the source
    pub index: usize,
    pub header: RawGroupHeader,
    pub group_type: u8,
    pub bns: RawRepresentation,
    /// Present exactly for type 4 groups, together with `og`.
    pub transform: Option<RawTransform>,
    pub og: Option<RawRepresentation>,
}

impl RawGroupRecord {
    /// 1-based group number.
    pub fn number(&self) -> usize {
        self.index + 1
    }

    pub fn is_type_4(&self) -> bool {
        self.group_type == 4
    }
}

/// Output of a full parse: both point operation tables and one record per group, in file order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RawDatabase {
    pub point_operations: PointOperationTable,
    pub records: Vec<RawGroupRecord>,
}
