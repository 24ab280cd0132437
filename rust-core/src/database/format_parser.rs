//! Sequential decoder for the crysFML magnetic space group asset.
//!
//! The asset is a rigid, length-prefixed text format:
//!
//! ```text
//! [48 lines]  square basis point operations    id "name" x,y,z  m11 .. m33
//! [24 lines]  hexagonal basis point operations
//! per group:
//!   header         bns1 bns2 "bns" "uni" "bns label" og1 og2 og3 "og" "og label"
//!   type           1..4
//!   [type 4]       3x3 transform matrix, 3 origin numerators, denominator
//!   operators      n, then ceil(n/4) lines holding 6n integers
//!   lattice        m, then one line holding 4m integers (present even when m = 0)
//!   wyckoff        k, then per site: "count multiplicity label" and count lines of 10 integers
//!   [type 4]       operators, lattice and wyckoff sections again for the OG setting
//! ```
//!
//! The cursor never rewinds. Every error carries the group index, the 1-based line number
//! and the offending line.

use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::Path;
use std::str::FromStr;
use std::sync::OnceLock;

use log::{debug, info, warn};
use regex::Regex;

use crate::config::{
    GROUP_HEADER_TOKENS, HEXAGONAL_POINT_OPERATION_COUNT, LATTICE_VECTOR_TOKENS,
    MAGNETIC_SPACE_GROUP_COUNT, OPERATIONS_PER_LINE, OPERATION_TOKENS, PARSER_PROGRESS_INTERVAL,
    POINT_OPERATION_LINE_TOKENS, SQUARE_POINT_OPERATION_COUNT, TRANSFORM_LINE_TOKENS,
    WYCKOFF_HEADER_TOKENS, WYCKOFF_POSITION_TOKENS,
};
use crate::database::raw_records::{
    RawDatabase, RawGroupHeader, RawGroupRecord, RawOperator, RawRepresentation, RawTransform,
    RawVector, RawWyckoffPosition, RawWyckoffSite,
};
use crate::error::{MsgError, Result};
use crate::interfaces::Basis;
use crate::symmetries::point_operations::{PointOperation, PointOperationTable};

static HEADER_TOKEN_PATTERN: OnceLock<Regex> = OnceLock::new();

fn header_token_regex() -> &'static Regex {
    HEADER_TOKEN_PATTERN
        .get_or_init(|| Regex::new(r#"-?\d+|"(?:[^"\\]|\\.)*""#).expect("Invalid header token regex pattern"))
}

/// A token of a header line: a bare integer or an unescaped quoted string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderToken {
    Integer(String),
    Text(String),
}

/// Split a line made of bare integers and double quoted strings. Quotes are removed and `\"`,
/// `\\` escapes are resolved. Anything else between the tokens is a parse error.
pub fn split_header_tokens(line: &str) -> Result<Vec<HeaderToken>> {
    let mut tokens = Vec::new();
    let mut end = 0;
    for m in header_token_regex().find_iter(line) {
        ensure_blank(&line[end..m.start()])?;
        let text = m.as_str();
        tokens.push(match text.strip_prefix('"').and_then(|rest| rest.strip_suffix('"')) {
            Some(quoted) => HeaderToken::Text(unescape(quoted)),
            None => HeaderToken::Integer(text.to_string()),
        });
        end = m.end();
    }
    ensure_blank(&line[end..])?;
    Ok(tokens)
}

fn ensure_blank(gap: &str) -> Result<()> {
    let stray = gap.trim();
    if stray.is_empty() {
        Ok(())
    } else {
        Err(MsgError::parse(stray, "expected an integer or a quoted string"))
    }
}

fn unescape(quoted: &str) -> String {
    let mut out = String::with_capacity(quoted.len());
    let mut chars = quoted.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(escaped) = chars.next() {
                out.push(escaped);
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Cursor over the asset lines. Build with [`RawFormatParser::new`], optionally override the
/// number of group records, then call [`RawFormatParser::parse`].
pub struct RawFormatParser<R: BufRead> {
    lines: Lines<R>,
    line_number: usize,
    current_line: String,
    group: Option<usize>,
    group_count: usize,
}

impl RawFormatParser<BufReader<File>> {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead> RawFormatParser<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line_number: 0,
            current_line: String::new(),
            group: None,
            group_count: MAGNETIC_SPACE_GROUP_COUNT,
        }
    }

    /// Number of group records expected after the point operation tables.
    pub fn with_group_count(mut self, group_count: usize) -> Self {
        self.group_count = group_count;
        self
    }

    pub fn group_count(&self) -> usize {
        self.group_count
    }

    /// Number of lines consumed so far.
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// Decode the whole asset. Trailing non-empty lines are reported and ignored.
    pub fn parse(mut self) -> Result<RawDatabase> {
        let point_operations = self.parse_point_operations()?;

        info!("Parsing {} magnetic space group records", self.group_count);
        let mut records = Vec::with_capacity(self.group_count);
        for index in 0..self.group_count {
            records.push(self.parse_group_record(index)?);
            if (index + 1) % PARSER_PROGRESS_INTERVAL == 0 {
                debug!("Parsed {} of {} group records", index + 1, self.group_count);
            }
        }
        self.group = None;

        self.skip_trailing_lines()?;
        info!(
            "Parsed {} point operations and {} group records from {} lines",
            point_operations.len(),
            records.len(),
            self.line_number
        );

        Ok(RawDatabase {
            point_operations,
            records,
        })
    }

    /// Decode the square and hexagonal point operation tables.
    pub fn parse_point_operations(&mut self) -> Result<PointOperationTable> {
        self.group = None;
        let square = self.parse_point_operation_block(SQUARE_POINT_OPERATION_COUNT, Basis::Square)?;
        debug!("Read {} square basis point operations", square.len());
        let hexagonal =
            self.parse_point_operation_block(HEXAGONAL_POINT_OPERATION_COUNT, Basis::Hexagonal)?;
        debug!("Read {} hexagonal basis point operations", hexagonal.len());
        Ok(PointOperationTable::new(square, hexagonal))
    }

    /// Decode one group record, `index` being its 0-based position.
    pub fn parse_group_record(&mut self, index: usize) -> Result<RawGroupRecord> {
        self.group = Some(index);

        let header = self.parse_group_header()?;
        let group_type = self.parse_group_type()?;
        let transform = if group_type == 4 {
            Some(self.parse_transform()?)
        } else {
            None
        };
        let bns = self.parse_representation()?;
        let og = if group_type == 4 {
            Some(self.parse_representation()?)
        } else {
            None
        };

        Ok(RawGroupRecord {
            index,
            header,
            group_type,
            bns,
            transform,
            og,
        })
    }

    // ======================== POINT OPERATIONS ========================

    fn parse_point_operation_block(&mut self, count: usize, basis: Basis) -> Result<Vec<PointOperation>> {
        (0..count).map(|_| self.parse_point_operation(basis)).collect()
    }

    fn parse_point_operation(&mut self, basis: Basis) -> Result<PointOperation> {
        let line = self.next_line("point operation")?;
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() != POINT_OPERATION_LINE_TOKENS {
            return Err(self.format_error(format!(
                "expected {} tokens in a point operation line, found {}",
                POINT_OPERATION_LINE_TOKENS,
                tokens.len()
            )));
        }

        let id = self.integer::<u32>(tokens[0], "point operation id")?;
        let name = tokens[1]
            .strip_prefix('"')
            .and_then(|rest| rest.strip_suffix('"'))
            .unwrap_or(tokens[1]);
        let mut entries = [0i64; 9];
        for (entry, token) in entries.iter_mut().zip(&tokens[3..]) {
            *entry = self.integer(token, "matrix entry")?;
        }

        PointOperation::new(id, name, tokens[2], entries, basis)
    }

    // ======================== GROUP SECTIONS ========================

    fn parse_group_header(&mut self) -> Result<RawGroupHeader> {
        let line = self.next_line("group header")?;
        let tokens = split_header_tokens(&line).map_err(|err| self.format_error(err.to_string()))?;
        if tokens.len() != GROUP_HEADER_TOKENS {
            return Err(self.format_error(format!(
                "expected {} header tokens, found {}",
                GROUP_HEADER_TOKENS,
                tokens.len()
            )));
        }

        Ok(RawGroupHeader {
            bns_number: (
                self.header_integer(&tokens[0], "BNS number part 1")?,
                self.header_integer(&tokens[1], "BNS number part 2")?,
            ),
            bns_number_string: self.header_text(&tokens[2], "BNS number string")?,
            uni_label: self.header_text(&tokens[3], "UNI label")?,
            bns_label: self.header_text(&tokens[4], "BNS label")?,
            og_number: (
                self.header_integer(&tokens[5], "OG number part 1")?,
                self.header_integer(&tokens[6], "OG number part 2")?,
                self.header_integer(&tokens[7], "OG number part 3")?,
            ),
            og_number_string: self.header_text(&tokens[8], "OG number string")?,
            og_label: self.header_text(&tokens[9], "OG label")?,
        })
    }

    fn parse_group_type(&mut self) -> Result<u8> {
        let line = self.next_line("group type")?;
        let group_type = self.integer::<u8>(&line, "group type")?;
        if !(1..=4).contains(&group_type) {
            return Err(self.format_error(format!("group type must be 1 to 4, found {}", group_type)));
        }
        Ok(group_type)
    }

    fn parse_transform(&mut self) -> Result<RawTransform> {
        let line = self.next_line("BNS to OG transform")?;
        let values = self.integers(&line, Some(TRANSFORM_LINE_TOKENS), "transform field")?;
        let mut matrix = [0i64; 9];
        matrix.copy_from_slice(&values[..9]);
        Ok(RawTransform {
            matrix,
            origin: self.raw_vector([values[9], values[10], values[11]], values[12])?,
        })
    }

    fn parse_representation(&mut self) -> Result<RawRepresentation> {
        Ok(RawRepresentation {
            operators: self.parse_operators()?,
            lattice_vectors: self.parse_lattice_vectors()?,
            wyckoff_sites: self.parse_wyckoff_sites()?,
        })
    }

    fn parse_operators(&mut self) -> Result<Vec<RawOperator>> {
        let count = self.count_line("operator count")?;

        let expected = count
            .checked_mul(OPERATION_TOKENS)
            .ok_or_else(|| self.format_error(format!("operator count {} is too large", count)))?;

        // Line packing carries no meaning, the fields form one stream
        let mut values = Vec::new();
        for _ in 0..count.div_ceil(OPERATIONS_PER_LINE) {
            let line = self.next_line("operators")?;
            values.extend(self.integers(&line, None, "operator field")?);
        }
        if values.len() != expected {
            return Err(self.format_error(format!(
                "expected {} operator fields for {} operators, found {}",
                expected,
                count,
                values.len()
            )));
        }

        values
            .chunks_exact(OPERATION_TOKENS)
            .map(|fields| {
                let point_operation_id = u32::try_from(fields[0]).map_err(|_| {
                    self.format_error(format!("invalid point operation id {}", fields[0]))
                })?;
                Ok(RawOperator {
                    point_operation_id,
                    numerators: [fields[1], fields[2], fields[3]],
                    denominator: self.denominator(fields[4])?,
                    time_inversion: fields[5],
                })
            })
            .collect()
    }

    fn parse_lattice_vectors(&mut self) -> Result<Vec<RawVector>> {
        let count = self.count_line("lattice vector count")?;
        let expected = count
            .checked_mul(LATTICE_VECTOR_TOKENS)
            .ok_or_else(|| self.format_error(format!("lattice vector count {} is too large", count)))?;
        let line = self.next_line("lattice vectors")?;
        let values = self.integers(&line, Some(expected), "lattice vector field")?;
        values
            .chunks_exact(LATTICE_VECTOR_TOKENS)
            .map(|fields| self.raw_vector([fields[0], fields[1], fields[2]], fields[3]))
            .collect()
    }

    fn parse_wyckoff_sites(&mut self) -> Result<Vec<RawWyckoffSite>> {
        let count = self.count_line("Wyckoff site count")?;
        (0..count).map(|_| self.parse_wyckoff_site()).collect()
    }

    fn parse_wyckoff_site(&mut self) -> Result<RawWyckoffSite> {
        let line = self.next_line("Wyckoff site header")?;
        let tokens = split_header_tokens(&line).map_err(|err| self.format_error(err.to_string()))?;
        if tokens.len() != WYCKOFF_HEADER_TOKENS {
            return Err(self.format_error(format!(
                "expected {} Wyckoff site header tokens, found {}",
                WYCKOFF_HEADER_TOKENS,
                tokens.len()
            )));
        }
        let position_count: usize = self.header_integer(&tokens[0], "Wyckoff position count")?;
        let multiplicity = self.header_integer(&tokens[1], "Wyckoff multiplicity")?;
        let label = self.header_text(&tokens[2], "Wyckoff label")?.trim().to_string();

        let mut positions = Vec::new();
        for _ in 0..position_count {
            let line = self.next_line("Wyckoff position")?;
            let values = self.integers(&line, Some(WYCKOFF_POSITION_TOKENS), "Wyckoff position field")?;
            positions.push(RawWyckoffPosition {
                position: self.raw_vector([values[0], values[1], values[2]], values[3])?,
                xyz: [values[4], values[5], values[6]],
                mag: [values[7], values[8], values[9]],
            });
        }

        Ok(RawWyckoffSite {
            label,
            multiplicity,
            positions,
        })
    }

    fn skip_trailing_lines(&mut self) -> Result<()> {
        let first_trailing = self.line_number + 1;
        let mut non_empty = 0;
        for line in self.lines.by_ref() {
            let line = line?;
            self.line_number += 1;
            if !line.trim().is_empty() {
                non_empty += 1;
            }
        }
        if non_empty > 0 {
            warn!(
                "Ignoring {} non-empty lines after the last group record (starting at line {})",
                non_empty, first_trailing
            );
        }
        Ok(())
    }

    // ======================== TOKEN HELPERS ========================

    fn next_line(&mut self, expected: &str) -> Result<String> {
        match self.lines.next() {
            Some(line) => {
                self.line_number += 1;
                self.current_line = line?.trim().to_string();
                Ok(self.current_line.clone())
            }
            None => {
                self.current_line.clear();
                Err(MsgError::Format {
                    group: self.group,
                    line_number: self.line_number + 1,
                    line: String::new(),
                    message: format!("unexpected end of input while reading {}", expected),
                })
            }
        }
    }

    fn format_error(&self, message: impl Into<String>) -> MsgError {
        MsgError::Format {
            group: self.group,
            line_number: self.line_number,
            line: self.current_line.clone(),
            message: message.into(),
        }
    }

    fn integer<T: FromStr>(&self, token: &str, what: &str) -> Result<T> {
        token
            .parse()
            .map_err(|_| self.format_error(format!("expected an integer {}, found {:?}", what, token)))
    }

    fn integers(&self, line: &str, expected: Option<usize>, what: &str) -> Result<Vec<i64>> {
        let values = line
            .split_whitespace()
            .map(|token| self.integer(token, what))
            .collect::<Result<Vec<i64>>>()?;
        match expected {
            Some(expected) if values.len() != expected => Err(self.format_error(format!(
                "expected {} integers, found {}",
                expected,
                values.len()
            ))),
            _ => Ok(values),
        }
    }

    fn count_line(&mut self, what: &str) -> Result<usize> {
        let line = self.next_line(what)?;
        let count: i64 = self.integer(&line, what)?;
        usize::try_from(count)
            .map_err(|_| self.format_error(format!("{} must not be negative, found {}", what, count)))
    }

    fn header_integer<T: FromStr>(&self, token: &HeaderToken, what: &str) -> Result<T> {
        match token {
            HeaderToken::Integer(text) => self.integer(text, what),
            HeaderToken::Text(text) => Err(self.format_error(format!(
                "expected an integer {}, found the string {:?}",
                what, text
            ))),
        }
    }

    fn header_text(&self, token: &HeaderToken, what: &str) -> Result<String> {
        match token {
            HeaderToken::Text(text) => Ok(text.clone()),
            HeaderToken::Integer(text) => Err(self.format_error(format!(
                "expected a quoted {}, found {}",
                what, text
            ))),
        }
    }

    fn denominator(&self, value: i64) -> Result<i64> {
        if value == 0 {
            Err(self.format_error("zero denominator"))
        } else {
            Ok(value)
        }
    }

    fn raw_vector(&self, numerators: [i64; 3], denominator: i64) -> Result<RawVector> {
        Ok(RawVector {
            numerators,
            denominator: self.denominator(denominator)?,
        })
    }
}
