//! Error types for the magnetic space group database.

use thiserror::Error;

/// The error type for every fallible operation in this crate.
#[derive(Debug, Error)]
pub enum MsgError {
    /// An error from the underlying reader.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The raw asset does not match the expected token shape or count.
    #[error("Format error {} at line {line_number}: {message} (line: {line:?})", describe_group(.group))]
    Format {
        /// 0-based group index, `None` while reading the point operation table.
        group: Option<usize>,
        /// 1-based line number in the source.
        line_number: usize,
        line: String,
        message: String,
    },

    /// A value violates an invariant of the type being constructed.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A symbolic operation string could not be parsed.
    #[error("Parse error in {offending:?}: {message}")]
    Parse { offending: String, message: String },

    /// The closure did not reach a fixed point within the safety caps.
    #[error("Closure did not stabilise after {rounds} rounds ({size} operations)")]
    ClosureDivergence { rounds: usize, size: usize },
}

impl MsgError {
    pub fn validation(message: impl Into<String>) -> Self {
        MsgError::Validation(message.into())
    }

    pub fn parse(offending: impl Into<String>, message: impl Into<String>) -> Self {
        MsgError::Parse {
            offending: offending.into(),
            message: message.into(),
        }
    }
}

fn describe_group(group: &Option<usize>) -> String {
    match group {
        Some(index) => format!("in group record {}", index),
        None => "in point operation table".to_string(),
    }
}

/// A convenience `Result` alias using [`MsgError`].
pub type Result<T> = std::result::Result<T, MsgError>;
