/// Utility functions for the msg-database Python module
use pyo3::prelude::*;

/// Get the version of the msg-database library
#[pyfunction]
pub fn version() -> &'static str {
    msg_database::VERSION
}
