// Symmetries module: Contains the exact magnetic symmetry operation algebra and group closure
// This module provides point operation tables, BNS/OG operations, expression parsing and closures

// ======================== MODULE DECLARATIONS ========================
pub mod closure;
pub mod operation_parser;
pub mod point_operations;
pub mod rational_vector;
pub mod symmetry_operations;

// Test modules
mod _tests_closure;

// ======================== EXACT VECTORS ========================
pub use rational_vector::RationalVector3; // struct - three exact rationals in lowest terms
// RationalVector3 impl methods:
//   new(x, y, z) / zeros() / from_integers([i64; 3])               - constructors
//   from_fraction_parts(numerators: [i64; 3], denominator: i64) -> Result<Self> - shared denominator, zero rejected
//   reduced_mod_one(&self) -> Self                                   - component-wise reduction into [0, 1)
//   lifted_non_negative(&self) -> Self                               - negative components shifted into [0, 1)
//   transformed_by(&self, matrix: &Matrix3<T>) -> Self               - integer matrix times vector
//   is_in_unit_cell / is_non_negative / is_zero                      - predicates

// ======================== POINT OPERATION TABLE ========================
pub use point_operations::{
    PointMatrix,         // type - Matrix3<i8> with entries in {-1, 0, 1}
    PointOperation,      // struct - table entry (id, name, string form, matrix, basis)
    PointOperationTable, // struct - 48 square basis + 24 hexagonal basis entries
    determinant,         // fn(m: &Matrix3<T>) -> i64 - exact determinant
    point_matrix_from_row_major, // fn(entries: &[i64; 9]) -> Result<PointMatrix> - validating constructor
};
// PointOperationTable impl methods:
//   new(square, hexagonal) -> Self                                   - wraps both tables in file order
//   lookup(&self, basis: Basis, id: u32) -> Result<&PointOperation>  - resolves an id in one table
//   square(&self) / hexagonal(&self) / operations(&self, basis)      - table slices

// ======================== MAGNETIC OPERATIONS ========================
pub use symmetry_operations::{
    Composable,          // trait - composition used by the closure engine
    MagneticOperation,   // struct - point operation + exact translation + time reversal (generic over setting)
    OgMagneticOperation, // type - MagneticOperation<Og>
    TimeReversal,        // enum - Plus (+1) / Minus (-1)
};
// MagneticOperation impl methods:
//   new(point_operation, translation, time_reversal) -> Result<Self> - validating constructor
//   identity() -> Self                                               - identity operation
//   and_then(&self, other: &Self) -> Result<Self>                    - apply self first, then other
//   inverse(&self) -> Result<Self>                                   - exact inverse
//   order(&self) -> Result<usize>                                    - smallest power giving the identity
//   transform_position / transform_moment                           - action on positions and axial moments
//   text_form(&self) -> String                                       - "-x, y, -z + 1/2, 1"
//   in_setting::<T>(&self) -> Result<MagneticOperation<T>>           - re-tag without re-reduction
//   to_og(&self) -> OgMagneticOperation                              - BNS only, infallible re-tag

// ======================== EXPRESSION PARSING ========================
pub use operation_parser::{
    parse_one_line_generators,          // fn(text) -> Result<Vec<MagneticOperation<S>>> - "(x,y,z);(-x,-y,-z)'"
    parse_operation,                    // fn(text) -> Result<MagneticOperation<S>> - "-x,y,-z+1/2[,sign]"
    parse_operation_with_time_reversal, // fn(text, time_reversed) -> Result<MagneticOperation<S>>
};

// ======================== CLOSURE ========================
pub use closure::{
    ClosureEngine,  // struct - fixed-point closure with round and size caps
    closure,        // fn(seeds: &[T]) -> Result<Vec<T>> - closure in discovery order
    closure_sorted, // fn(seeds: &[T]) -> Result<Vec<T>> - closure sorted by the operation ordering
};
