use nalgebra::{Matrix3, Scalar};
use serde::{Serialize, Serializer};

use crate::error::{MsgError, Result};
use crate::interfaces::Basis;

/// Rotational part of a magnetic operation. Entries are restricted to {-1, 0, 1}.
pub type PointMatrix = Matrix3<i8>;

/// One entry of the crysFML point operation table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PointOperation {
    pub id: u32,
    pub name: String,
    /// Symbolic form as written in the table, e.g. `-x,y,-z`.
    pub string_form: String,
    #[serde(serialize_with = "serialize_rows")]
    pub matrix: PointMatrix,
    pub basis: Basis,
}

impl PointOperation {
    pub fn new(
        id: u32,
        name: impl Into<String>,
        string_form: impl Into<String>,
        entries: [i64; 9],
        basis: Basis,
    ) -> Result<Self> {
        Ok(Self {
            id,
            name: name.into(),
            string_form: string_form.into(),
            matrix: point_matrix_from_row_major(&entries)?,
            basis,
        })
    }
}

/// The two fixed point operation tables (square and hexagonal basis), kept in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PointOperationTable {
    square: Vec<PointOperation>,
    hexagonal: Vec<PointOperation>,
}

impl PointOperationTable {
    pub fn new(square: Vec<PointOperation>, hexagonal: Vec<PointOperation>) -> Self {
        Self { square, hexagonal }
    }

    pub fn square(&self) -> &[PointOperation] {
        &self.square
    }

    pub fn hexagonal(&self) -> &[PointOperation] {
        &self.hexagonal
    }

    pub fn len(&self) -> usize {
        self.square.len() + self.hexagonal.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn operations(&self, basis: Basis) -> &[PointOperation] {
        match basis {
            Basis::Square => &self.square,
            Basis::Hexagonal => &self.hexagonal,
        }
    }

    /// Resolve a table id in the given basis.
    pub fn lookup(&self, basis: Basis, id: u32) -> Result<&PointOperation> {
        self.operations(basis)
            .iter()
            .find(|op| op.id == id)
            .ok_or_else(|| {
                MsgError::validation(format!(
                    "point operation id {} not present in the {:?} table",
                    id, basis
                ))
            })
    }
}

/// Validate nine row-major integers as a point operation matrix.
pub fn point_matrix_from_row_major(entries: &[i64; 9]) -> Result<PointMatrix> {
    if let Some(bad) = entries.iter().find(|e| !(-1..=1).contains(*e)) {
        return Err(MsgError::validation(format!(
            "point operation entries must be -1, 0 or 1, got {} in {:?}",
            bad, entries
        )));
    }
    Ok(Matrix3::from_row_slice(&entries.map(|e| e as i8)))
}

/// Narrow an integer matrix (e.g. a product of two point matrices) back to a point matrix.
pub fn narrow_point_matrix(matrix: &Matrix3<i32>) -> Result<PointMatrix> {
    let mut entries = [0i64; 9];
    for i in 0..3 {
        for j in 0..3 {
            entries[3 * i + j] = i64::from(matrix[(i, j)]);
        }
    }
    point_matrix_from_row_major(&entries)
}

/// Determinant of an integer 3x3 matrix.
pub fn determinant<T>(m: &Matrix3<T>) -> i64
where
    T: Scalar + Copy + Into<i64>,
{
    let e = |i: usize, j: usize| -> i64 { m[(i, j)].into() };
    e(0, 0) * (e(1, 1) * e(2, 2) - e(1, 2) * e(2, 1))
        - e(0, 1) * (e(1, 0) * e(2, 2) - e(1, 2) * e(2, 0))
        + e(0, 2) * (e(1, 0) * e(2, 1) - e(1, 1) * e(2, 0))
}

/// Exact inverse of a unimodular integer matrix (determinant ±1).
pub fn unimodular_inverse(m: &PointMatrix) -> Result<Matrix3<i32>> {
    let det = determinant(m);
    if det.abs() != 1 {
        return Err(MsgError::validation(format!(
            "point operation with determinant {} has no integer inverse",
            det
        )));
    }
    let e = |i: usize, j: usize| -> i32 { i32::from(m[(i, j)]) };
    let cofactor = |i: usize, j: usize| -> i32 {
        let rows: Vec<usize> = (0..3).filter(|&r| r != i).collect();
        let cols: Vec<usize> = (0..3).filter(|&c| c != j).collect();
        let minor = e(rows[0], cols[0]) * e(rows[1], cols[1]) - e(rows[0], cols[1]) * e(rows[1], cols[0]);
        if (i + j) % 2 == 0 {
            minor
        } else {
            -minor
        }
    };
    // Inverse is the transposed cofactor matrix divided by the determinant
    let det = det as i32;
    Ok(Matrix3::from_fn(|i, j| cofactor(j, i) * det))
}

/// Serialize a 3x3 matrix as nested row-major arrays.
pub fn serialize_rows<T, S>(matrix: &Matrix3<T>, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    T: Scalar + Copy + Serialize,
    S: Serializer,
{
    let rows: [[T; 3]; 3] = std::array::from_fn(|i| std::array::from_fn(|j| matrix[(i, j)]));
    rows.serialize(serializer)
}
