// Database module: Reads the crysFML magnetic space group table and assembles the 1651 groups
// This module provides the raw text parser, group assembly, closure checks and reference comparison

// ======================== MODULE DECLARATIONS ========================
pub mod assembler;
pub mod consistency;
pub mod format_parser;
pub mod groups;
pub mod raw_records;
pub mod reference;

#[cfg(test)]
mod _test_fixtures;

// Test modules
mod _tests_assembler;
mod _tests_consistency;

// ======================== RAW RECORDS ========================
pub use raw_records::{
    RawDatabase,          // struct - point operation table + one record per group, as read
    RawGroupHeader,       // struct - BNS/OG numbers and labels from the header line
    RawGroupRecord,       // struct - header, type, BNS section, optional transform and OG section
    RawOperator,          // struct - table id, translation numerators/denominator, time inversion flag
    RawRepresentation,    // struct - operators, lattice vectors and Wyckoff sites of one setting
    RawTransform,         // struct - 3x3 integer matrix and origin shift
    RawVector,            // struct - integer numerators over one denominator
    RawWyckoffPosition,   // struct - position plus uninterpreted xyz/mag integers
    RawWyckoffSite,       // struct - label, multiplicity and positions
};

// ======================== TEXT FORMAT ========================
pub use format_parser::{
    HeaderToken,         // enum - Integer / Text token of a group header line
    RawFormatParser,     // struct - line oriented reader of the whole asset
    split_header_tokens, // fn(line: &str) -> Result<Vec<HeaderToken>> - quoted strings and integers only
};
// RawFormatParser impl methods:
//   from_path(path) -> Result<Self> / new(reader) -> Self            - constructors, 1651 groups expected
//   with_group_count(count) -> Self                                  - number of group records to read
//   parse(self) -> Result<RawDatabase>                               - table then every record
//   parse_point_operations(&mut self) -> Result<PointOperationTable> - the 48 + 24 table lines
//   parse_group_record(&mut self, index) -> Result<RawGroupRecord>   - one record at the cursor

// ======================== GROUPS ========================
pub use groups::{
    BnsGroup,                   // struct - BNS number, symbol, operations, lattice vectors, Wyckoff sites
    BnsOgTransform,             // struct - BNS to OG change of basis and origin
    Group,                      // struct - one magnetic space group in both settings
    MagneticSpaceGroupDatabase, // struct - all groups with their point operation table
    OgGroup,                    // struct - OG number, symbol, operations, lattice vectors, Wyckoff sites
    WyckoffPosition,            // struct - exact position plus xyz/mag integers
    WyckoffSite,                // struct - label, multiplicity, positions
};
// MagneticSpaceGroupDatabase impl methods:
//   from_reader(reader) / from_path(path) -> Result<Self>           - parse and assemble
//   group(&self, number: usize) -> Option<&Group>                   - 1-based lookup
//   find_by_bns_number(&self, "2.7") -> Option<&Group>              - lookup by dotted BNS number
//   groups / iter / len / is_empty / point_operations               - accessors

// ======================== ASSEMBLY ========================
pub use assembler::{
    DatabaseAssembler, // struct - raw records to groups, optional closure check
    build_operations,  // fn(operators, table, basis) -> Result<Vec<MagneticOperation<S>>>
};

// ======================== CONSISTENCY ========================
pub use consistency::{
    GroupClosureSize,       // struct - stored size vs closure size of one group
    closure_size_histogram, // fn(&[GroupClosureSize]) -> BTreeMap<usize, usize>
    closure_sizes,          // fn(&db) -> Vec<GroupClosureSize>
    closure_sizes_with,     // fn(&db, &ClosureEngine) -> Vec<GroupClosureSize>
    unclosed_groups,        // fn(&[GroupClosureSize]) -> Vec<GroupClosureSize> - filter and warn
    verify_closures,        // fn(&db) -> Vec<GroupClosureSize> - only groups that are not closed
};

// ======================== REFERENCE COMPARISON ========================
pub use reference::{
    GeneratorSource,                // trait - generators for a group number
    MismatchKind,                   // enum - Size / Element / ReferenceUnavailable / ClosureFailed
    ReferenceMismatch,              // struct - group number, BNS number, kind
    ReferenceReport,                // struct - compared count and mismatches
    TextGeneratorSource,            // struct - "<index> <generators>" lines
    compare_with_reference,         // fn(&db, &source) -> ReferenceReport
    find_matching_reference_groups, // fn(ops, &source, count) -> Result<Vec<usize>>
    unclosed_reference_groups,      // fn(&source, count) -> Vec<usize>
};
