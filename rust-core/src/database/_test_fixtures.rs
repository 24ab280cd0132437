// Synthetic assets for the database tests: a complete 72 line point operation table and a few
// group records covering types 1, 2 and 4 in both bases.

use crate::database::assembler::DatabaseAssembler;
use crate::database::format_parser::RawFormatParser;
use crate::database::groups::MagneticSpaceGroupDatabase;
use crate::database::raw_records::RawDatabase;
use crate::interfaces::setting::Bns;
use crate::interfaces::Basis;
use crate::symmetries::closure::closure_sorted;
use crate::symmetries::operation_parser::parse_operation;
use crate::symmetries::symmetry_operations::MagneticOperation;

pub const FIXTURE_GROUP_COUNT: usize = 4;

const PERMUTATIONS: [[usize; 3]; 6] = [[0, 1, 2], [0, 2, 1], [1, 0, 2], [1, 2, 0], [2, 0, 1], [2, 1, 0]];

fn row_major(op: &MagneticOperation) -> [i64; 9] {
    let m = op.point_operation();
    std::array::from_fn(|k| i64::from(m[(k / 3, k % 3)]))
}

/// The 48 signed permutation matrices, identity first.
pub fn square_matrices() -> Vec<[i64; 9]> {
    let mut matrices = Vec::with_capacity(48);
    for permutation in PERMUTATIONS {
        for signs in 0..8 {
            let mut entries = [0i64; 9];
            for (row, &column) in permutation.iter().enumerate() {
                let negative = (signs >> (2 - row)) & 1 == 1;
                entries[3 * row + column] = if negative { -1 } else { 1 };
            }
            matrices.push(entries);
        }
    }
    matrices
}

/// The 24 operations of 6/mmm in hexagonal axes, identity first.
pub fn hexagonal_matrices() -> Vec<[i64; 9]> {
    let generators: Vec<MagneticOperation> = ["x-y,x,z", "-x,-y,-z", "y,x,-z"]
        .iter()
        .map(|text| parse_operation::<Bns>(text).unwrap())
        .collect();
    let mut group = closure_sorted(&generators).unwrap();
    group.sort_by_key(|op| !op.is_identity());
    group.iter().map(row_major).collect()
}

/// Compact string form such as `x-y,x,-z`.
pub fn string_form(entries: &[i64; 9]) -> String {
    (0..3)
        .map(|row| {
            let mut expression = String::new();
            for (column, symbol) in ['x', 'y', 'z'].iter().enumerate() {
                match entries[3 * row + column] {
                    1 if expression.is_empty() => expression.push(*symbol),
                    1 => {
                        expression.push('+');
                        expression.push(*symbol);
                    }
                    -1 => {
                        expression.push('-');
                        expression.push(*symbol);
                    }
                    _ => {}
                }
            }
            expression
        })
        .collect::<Vec<_>>()
        .join(",")
}

fn table_lines(matrices: &[[i64; 9]], prefix: &str) -> Vec<String> {
    matrices
        .iter()
        .enumerate()
        .map(|(index, entries)| {
            let values: Vec<String> = entries.iter().map(|e| e.to_string()).collect();
            format!(
                "{} \"{}{}\" {} {}",
                index + 1,
                prefix,
                index + 1,
                string_form(entries),
                values.join(" ")
            )
        })
        .collect()
}

/// 48 square basis lines followed by 24 hexagonal basis lines.
pub fn point_operation_lines() -> Vec<String> {
    let mut lines = table_lines(&square_matrices(), "s");
    lines.extend(table_lines(&hexagonal_matrices(), "h"));
    lines
}

/// Table id of the point operation written as `text` (e.g. `-x,-y,-z`).
pub fn point_operation_id(basis: Basis, text: &str) -> u32 {
    let target = row_major(&parse_operation::<Bns>(text).unwrap());
    let matrices = match basis {
        Basis::Square => square_matrices(),
        Basis::Hexagonal => hexagonal_matrices(),
    };
    let index = matrices.iter().position(|m| *m == target).unwrap();
    (index + 1) as u32
}

/// Group records in file order:
/// 1. `P1` (type 1, empty lattice vector line)
/// 2. `P-11'` (type 2, padded Wyckoff label)
/// 3. `P_S-1` (type 4, explicit OG section and transform)
/// 4. `P6` (type 1, hexagonal basis, operators packed over two lines)
pub fn group_record_lines() -> Vec<String> {
    let e = point_operation_id(Basis::Square, "x,y,z");
    let i = point_operation_id(Basis::Square, "-x,-y,-z");
    let six: Vec<u32> = ["x,y,z", "x-y,x,z", "-y,x-y,z", "-x,-y,z", "-x+y,-x,z", "y,-x+y,z"]
        .iter()
        .map(|text| point_operation_id(Basis::Hexagonal, text))
        .collect();

    let lines = [
        // P1
        r#"1 1 "1.1" "P1" "P1" 1 1 1 "1.1" "P1""#.to_string(),
        "1".to_string(),
        "1".to_string(),
        format!("{} 0 0 0 1 0", e),
        "0".to_string(),
        String::new(),
        "1".to_string(),
        r#"1 1 "a""#.to_string(),
        "0 0 0 1 1 1 1 1 1 1".to_string(),
        // P-11'
        r#"2 5 "2.5" "P-11'" "P-11'" 2 2 5 "2.2.5" "P-11'""#.to_string(),
        "2".to_string(),
        "4".to_string(),
        format!("{e} 0 0 0 1 0 {i} 0 0 0 1 0 {e} 0 0 0 1 1 {i} 0 0 0 1 1"),
        "0".to_string(),
        String::new(),
        "2".to_string(),
        r#"1 1 " a ""#.to_string(),
        "0 0 0 1 0 0 0 1 1 1".to_string(),
        r#"1 1 "b""#.to_string(),
        "0 0 1 2 0 0 0 0 0 0".to_string(),
        // P_S-1
        r#"2 7 "2.7" "P_S-1" "P_S-1" 2 4 6 "2.4.6" "P_2s-1""#.to_string(),
        "4".to_string(),
        "2 0 0 0 1 0 0 0 1 1 0 0 4".to_string(),
        "4".to_string(),
        format!("{e} 0 0 0 1 0 {i} 0 0 0 1 0 {e} 1 0 0 2 1 {i} 1 0 0 2 1"),
        "2".to_string(),
        "1 0 0 2 0 1 0 1".to_string(),
        "1".to_string(),
        r#"2 2 "a""#.to_string(),
        "0 0 0 1 0 0 0 0 0 0".to_string(),
        "1 0 0 2 0 0 0 0 0 0".to_string(),
        "4".to_string(),
        format!("{e} 0 0 0 1 0 {i} 0 0 0 1 0 {e} 1 0 0 1 1 {i} 1 0 0 1 1"),
        "1".to_string(),
        "2 0 0 1".to_string(),
        "0".to_string(),
        // P6
        r#"168 109 "168.109" "P6" "P6" 168 1 1298 "168.1.1298" "P6""#.to_string(),
        "1".to_string(),
        "6".to_string(),
        format!(
            "{} 0 0 0 1 0 {} 0 0 0 1 0 {} 0 0 0 1 0 {} 0 0 0 1 0",
            six[0], six[1], six[2], six[3]
        ),
        format!("{} 0 0 0 1 0 {} 0 0 0 1 0", six[4], six[5]),
        "0".to_string(),
        String::new(),
        "1".to_string(),
        r#"1 1 "a""#.to_string(),
        "0 0 1 2 0 0 1 0 0 1".to_string(),
    ];
    lines.to_vec()
}

/// The full fixture asset as text.
pub fn fixture_asset() -> String {
    let mut lines = point_operation_lines();
    lines.extend(group_record_lines());
    lines.join("\n") + "\n"
}

/// Reference generators agreeing with every fixture group.
pub fn fixture_reference() -> String {
    [
        "# index generators",
        "1 (x,y,z)",
        "2 (-x,-y,-z);(x,y,z)'",
        "3 (-x,-y,-z);(x+1/2,y,z)'",
        "4 (x-y,x,z)",
    ]
    .join("\n")
}

pub fn fixture_raw_database() -> RawDatabase {
    RawFormatParser::new(fixture_asset().as_bytes())
        .with_group_count(FIXTURE_GROUP_COUNT)
        .parse()
        .unwrap()
}

pub fn fixture_database() -> MagneticSpaceGroupDatabase {
    DatabaseAssembler::new()
        .with_closure_check(true)
        .assemble(&fixture_raw_database())
        .unwrap()
}
