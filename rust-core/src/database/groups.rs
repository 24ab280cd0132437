use std::io::BufRead;
use std::path::Path;

use log::info;
use nalgebra::Matrix3;
use serde::Serialize;

use crate::database::assembler::DatabaseAssembler;
use crate::database::format_parser::RawFormatParser;
use crate::error::Result;
use crate::interfaces::Basis;
use crate::symmetries::point_operations::{serialize_rows, PointOperationTable};
use crate::symmetries::rational_vector::RationalVector3;
use crate::symmetries::symmetry_operations::{MagneticOperation, OgMagneticOperation};

/// One position of a Wyckoff site. `xyz` and `mag` are carried through uninterpreted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WyckoffPosition {
    pub position: RationalVector3,
    pub xyz: [i64; 3],
    pub mag: [i64; 3],
}

/// Set of equivalent positions, in source order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WyckoffSite {
    pub label: String,
    pub multiplicity: u32,
    pub positions: Vec<WyckoffPosition>,
}

/// The group in the Belov-Neronova-Smirnova setting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BnsGroup {
    pub number: (u32, u32),
    /// Dotted form, e.g. `2.7`
    pub number_string: String,
    pub symbol: String,
    /// Table order, not sorted
    pub operations: Vec<MagneticOperation>,
    pub lattice_vectors: Vec<RationalVector3>,
    pub wyckoff_sites: Vec<WyckoffSite>,
}

/// The group in the Opechowski-Guccione setting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OgGroup {
    pub number: (u32, u32, u32),
    pub number_string: String,
    pub symbol: String,
    pub operations: Vec<OgMagneticOperation>,
    pub lattice_vectors: Vec<RationalVector3>,
    pub wyckoff_sites: Vec<WyckoffSite>,
}

/// Change of basis and origin relating the BNS and OG settings.
///
/// The matrix is a general integer change of basis and is not restricted to {-1, 0, 1}.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BnsOgTransform {
    #[serde(serialize_with = "serialize_rows")]
    pub matrix: Matrix3<i32>,
    pub origin: RationalVector3,
}

impl BnsOgTransform {
    pub fn new(matrix: Matrix3<i32>, origin: RationalVector3) -> Self {
        Self { matrix, origin }
    }

    pub fn identity() -> Self {
        Self {
            matrix: Matrix3::identity(),
            origin: RationalVector3::zeros(),
        }
    }

    pub fn is_identity(&self) -> bool {
        self.matrix == Matrix3::identity() && self.origin.is_zero()
    }

    /// Image of a position under `matrix · p + origin`.
    pub fn transform_position(&self, position: &RationalVector3) -> RationalVector3 {
        position.transformed_by(&self.matrix) + self.origin
    }
}

impl Default for BnsOgTransform {
    fn default() -> Self {
        Self::identity()
    }
}

/// One of the 1651 magnetic space groups with both settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Group {
    /// 1-based position in the database
    pub number: u32,
    pub group_type: u8,
    /// UNI label
    pub symbol: String,
    pub bns: BnsGroup,
    pub og: OgGroup,
    pub bns_og_transform: BnsOgTransform,
}

impl Group {
    /// ITA number of the underlying space group (first part of the BNS number).
    pub fn space_group_number(&self) -> u32 {
        self.bns.number.0
    }

    /// Basis of the point operation table this group's operations were resolved in.
    pub fn basis(&self) -> Basis {
        Basis::for_space_group(self.space_group_number())
    }

    pub fn is_type_4(&self) -> bool {
        self.group_type == 4
    }

    /// Number of stored BNS operations carrying time reversal.
    pub fn primed_operation_count(&self) -> usize {
        self.bns
            .operations
            .iter()
            .filter(|op| op.time_reversal().sign() < 0)
            .count()
    }
}

/// All assembled groups, in source order, with the point operation table they were resolved
/// against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MagneticSpaceGroupDatabase {
    point_operations: PointOperationTable,
    groups: Vec<Group>,
}

impl MagneticSpaceGroupDatabase {
    pub fn new(point_operations: PointOperationTable, groups: Vec<Group>) -> Self {
        Self {
            point_operations,
            groups,
        }
    }

    /// Parse and assemble the full asset with default settings.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let raw = RawFormatParser::new(reader).parse()?;
        DatabaseAssembler::new().assemble(&raw)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        info!("Loading magnetic space groups from {}", path.as_ref().display());
        let raw = RawFormatParser::from_path(path)?.parse()?;
        DatabaseAssembler::new().assemble(&raw)
    }

    pub fn point_operations(&self) -> &PointOperationTable {
        &self.point_operations
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Group> {
        self.groups.iter()
    }

    /// Group by its 1-based number.
    pub fn group(&self, number: usize) -> Option<&Group> {
        number.checked_sub(1).and_then(|index| self.groups.get(index))
    }

    /// Group by its dotted BNS number, e.g. `2.7`.
    pub fn find_by_bns_number(&self, number_string: &str) -> Option<&Group> {
        self.groups
            .iter()
            .find(|group| group.bns.number_string == number_string)
    }
}

impl<'a> IntoIterator for &'a MagneticSpaceGroupDatabase {
    type Item = &'a Group;
    type IntoIter = std::slice::Iter<'a, Group>;

    fn into_iter(self) -> Self::IntoIter {
        self.groups.iter()
    }
}
