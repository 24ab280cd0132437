//! Parsing of operations written as linear expressions, e.g. `-x,y,-z+1/2` or `x+1/2,y,z,-1`.
//!
//! Each component is tokenised against a small whitelist and then evaluated exactly at a few
//! substituted values of x, y and z. The constant term is the value at x = y = z = 0, each
//! coefficient is the value with only that symbol set to one, minus the constant.

use std::sync::OnceLock;

use num_rational::Rational64;
use num_traits::{CheckedAdd, CheckedDiv, CheckedMul, CheckedSub, Zero};
use regex::Regex;

use crate::error::{MsgError, Result};
use crate::interfaces::Setting;
use crate::symmetries::point_operations::point_matrix_from_row_major;
use crate::symmetries::rational_vector::RationalVector3;
use crate::symmetries::symmetry_operations::{MagneticOperation, TimeReversal};

static TOKEN_PATTERN: OnceLock<Regex> = OnceLock::new();
static FORBIDDEN_PATTERN: OnceLock<Regex> = OnceLock::new();

fn token_regex() -> &'static Regex {
    TOKEN_PATTERN.get_or_init(|| Regex::new(r"\d+|[xyz]|[+\-*/]|\s+").expect("Invalid token regex pattern"))
}

fn forbidden_regex() -> &'static Regex {
    FORBIDDEN_PATTERN
        .get_or_init(|| Regex::new(r"[^0-9xyz+\-*/\s]+").expect("Invalid forbidden regex pattern"))
}

// Point where a linear expression must agree with its extracted coefficients
const LINEARITY_PROBE: [i64; 3] = [2, 3, 5];

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token {
    Number(i64),
    Symbol(usize),
    Plus,
    Minus,
    Star,
    Slash,
}

/// Parse three (spatial) or four (spatial + time reversal sign) comma separated components.
pub fn parse_operation<S: Setting>(text: &str) -> Result<MagneticOperation<S>> {
    let components: Vec<&str> = text.split(',').map(str::trim).collect();
    let time_reversal = match components.len() {
        3 => TimeReversal::Plus,
        4 => parse_time_reversal(components[3])?,
        n => {
            return Err(MsgError::parse(
                text,
                format!("expected three or four comma separated values, found {}", n),
            ))
        }
    };
    build_operation(&components[..3], time_reversal)
}

/// Parse exactly three spatial components, with the time reversal given separately.
pub fn parse_operation_with_time_reversal<S: Setting>(
    text: &str,
    time_reversed: bool,
) -> Result<MagneticOperation<S>> {
    let components: Vec<&str> = text.split(',').map(str::trim).collect();
    if components.len() != 3 {
        return Err(MsgError::parse(
            text,
            "expected exactly three comma separated values when the time reversal is given",
        ));
    }
    let time_reversal = if time_reversed {
        TimeReversal::Minus
    } else {
        TimeReversal::Plus
    };
    build_operation(&components, time_reversal)
}

/// Parse a `;` separated list of bracketed generators, a trailing `'` marking time reversal:
/// `(-x,y,-z+1/2);(x,-y,z+1/2)';(x+1/2,y+1/2,z)`.
pub fn parse_one_line_generators<S: Setting>(text: &str) -> Result<Vec<MagneticOperation<S>>> {
    text.split(';')
        .map(str::trim)
        .map(|generator| {
            let (body, time_reversed) = match generator.strip_suffix('\'') {
                Some(stripped) => (stripped.trim_end(), true),
                None => (generator, false),
            };
            let inner = body
                .strip_prefix('(')
                .and_then(|rest| rest.strip_suffix(')'))
                .ok_or_else(|| {
                    MsgError::parse(generator, "expected brackets around generator strings")
                })?;
            parse_operation_with_time_reversal(inner, time_reversed)
        })
        .collect()
}

fn parse_time_reversal(component: &str) -> Result<TimeReversal> {
    match component {
        "1" | "+1" => Ok(TimeReversal::Plus),
        "-1" => Ok(TimeReversal::Minus),
        other => Err(MsgError::parse(other, "time reversal must be 1 or -1")),
    }
}

fn build_operation<S: Setting>(
    components: &[&str],
    time_reversal: TimeReversal,
) -> Result<MagneticOperation<S>> {
    let mut entries = [0i64; 9];
    let mut constants = [Rational64::zero(); 3];

    for (row, component) in components.iter().enumerate() {
        let tokens = tokenise(component)?;

        let constant = evaluate(&tokens, [0, 0, 0], component)?;
        for column in 0..3 {
            let mut at = [0, 0, 0];
            at[column] = 1;
            let coefficient = evaluate(&tokens, at, component)?
                .checked_sub(&constant)
                .ok_or_else(|| overflow(component))?;
            if !coefficient.is_integer() {
                return Err(MsgError::parse(
                    *component,
                    format!("coefficient {} is not an integer", coefficient),
                ));
            }
            entries[3 * row + column] = coefficient.to_integer();
        }

        let mut predicted = constant;
        for (column, value) in LINEARITY_PROBE.iter().enumerate() {
            let contribution = entries[3 * row + column]
                .checked_mul(*value)
                .map(Rational64::from_integer)
                .ok_or_else(|| overflow(component))?;
            predicted = predicted
                .checked_add(&contribution)
                .ok_or_else(|| overflow(component))?;
        }
        if evaluate(&tokens, LINEARITY_PROBE, component)? != predicted {
            return Err(MsgError::parse(*component, "expression is not linear in x, y and z"));
        }

        constants[row] = constant;
    }

    let point_operation = point_matrix_from_row_major(&entries)?;
    let translation = S::canonical_translation(RationalVector3(constants));
    MagneticOperation::new(point_operation, translation, time_reversal)
}

fn overflow(component: &str) -> MsgError {
    MsgError::parse(component, "arithmetic overflow")
}

fn tokenise(component: &str) -> Result<Vec<Token>> {
    if let Some(bad) = forbidden_regex().find(component) {
        return Err(MsgError::parse(
            bad.as_str(),
            format!("invalid characters in operation component {:?}", component),
        ));
    }

    let mut tokens = Vec::new();
    for m in token_regex().find_iter(component) {
        let text = m.as_str();
        let token = match text {
            "x" => Token::Symbol(0),
            "y" => Token::Symbol(1),
            "z" => Token::Symbol(2),
            "+" => Token::Plus,
            "-" => Token::Minus,
            "*" => Token::Star,
            "/" => Token::Slash,
            _ if text.trim().is_empty() => continue,
            digits => Token::Number(digits.parse().map_err(|_| {
                MsgError::parse(digits, "number does not fit in a 64 bit integer")
            })?),
        };
        tokens.push(token);
    }

    if tokens.is_empty() {
        return Err(MsgError::parse(component, "empty operation component"));
    }
    Ok(tokens)
}

fn evaluate(tokens: &[Token], values: [i64; 3], component: &str) -> Result<Rational64> {
    let mut evaluator = Evaluator {
        tokens,
        position: 0,
        values,
        component,
    };
    let value = evaluator.expression()?;
    if evaluator.position != tokens.len() {
        return Err(evaluator.error("unexpected trailing tokens"));
    }
    Ok(value)
}

/// Recursive descent over `expr := term (('+'|'-') term)*`,
/// `term := unary (('*'|'/') unary)*`, `unary := ('+'|'-') unary | number | symbol`.
struct Evaluator<'a> {
    tokens: &'a [Token],
    position: usize,
    values: [i64; 3],
    component: &'a str,
}

impl Evaluator<'_> {
    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.position).copied()
    }

    fn error(&self, message: &str) -> MsgError {
        MsgError::parse(self.component, message)
    }

    fn checked(&self, value: Option<Rational64>) -> Result<Rational64> {
        value.ok_or_else(|| overflow(self.component))
    }

    fn expression(&mut self) -> Result<Rational64> {
        let mut value = self.term()?;
        while let Some(op @ (Token::Plus | Token::Minus)) = self.peek() {
            self.position += 1;
            let rhs = self.term()?;
            value = if op == Token::Plus {
                self.checked(value.checked_add(&rhs))?
            } else {
                self.checked(value.checked_sub(&rhs))?
            };
        }
        Ok(value)
    }

    fn term(&mut self) -> Result<Rational64> {
        let mut value = self.unary()?;
        while let Some(op @ (Token::Star | Token::Slash)) = self.peek() {
            self.position += 1;
            let rhs = self.unary()?;
            value = if op == Token::Star {
                self.checked(value.checked_mul(&rhs))?
            } else if rhs.is_zero() {
                return Err(self.error("division by zero"));
            } else {
                self.checked(value.checked_div(&rhs))?
            };
        }
        Ok(value)
    }

    fn unary(&mut self) -> Result<Rational64> {
        match self.peek() {
            Some(Token::Minus) => {
                self.position += 1;
                let operand = self.unary()?;
                self.checked(Rational64::zero().checked_sub(&operand))
            }
            Some(Token::Plus) => {
                self.position += 1;
                self.unary()
            }
            Some(Token::Number(n)) => {
                self.position += 1;
                Ok(Rational64::from_integer(n))
            }
            Some(Token::Symbol(index)) => {
                self.position += 1;
                Ok(Rational64::from_integer(self.values[index]))
            }
            Some(_) => Err(self.error("expected a number or a symbol")),
            None => Err(self.error("unexpected end of expression")),
        }
    }
}
