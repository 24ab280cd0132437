// Constants

// Point operation table layout
pub const SQUARE_POINT_OPERATION_COUNT: usize = 48; // Cubic/orthorhombic compatible basis
pub const HEXAGONAL_POINT_OPERATION_COUNT: usize = 24; // Hexagonal basis
pub const POINT_OPERATION_LINE_TOKENS: usize = 12; // id, name, string form, 9 matrix entries

// Group records
pub const MAGNETIC_SPACE_GROUP_COUNT: usize = 1651;
pub const GROUP_HEADER_TOKENS: usize = 10;
pub const TRANSFORM_LINE_TOKENS: usize = 13; // 3x3 matrix, 3 origin numerators, denominator
pub const OPERATIONS_PER_LINE: usize = 4; // Packing width of operator lines
pub const OPERATION_TOKENS: usize = 6; // id, 3 numerators, denominator, time inversion flag
pub const LATTICE_VECTOR_TOKENS: usize = 4; // 3 numerators, denominator
pub const WYCKOFF_HEADER_TOKENS: usize = 3; // position count, multiplicity, label
pub const WYCKOFF_POSITION_TOKENS: usize = 10; // 3 numerators, denominator, xyz, mag

// Space group numbers (first BNS number part) described in hexagonal axes
pub const HEXAGONAL_SPACE_GROUP_NUMBERS: std::ops::RangeInclusive<u32> = 143..=194;

// Closure safety caps
pub const CLOSURE_MAX_ROUNDS: usize = 96; // Largest magnetic point group order (m-3m1')
pub const CLOSURE_MAX_OPERATIONS: usize = 4096;

// Upper bound used when computing the order of a single operation
pub const OPERATION_ORDER_CAP: usize = 12;

// Log parser progress every this many groups
pub const PARSER_PROGRESS_INTERVAL: usize = 100;
