use pyo3::prelude::*;

// Module declarations
mod database;
mod operations;
mod utils;

use database::{load_database, PyGroup, PyMagneticSpaceGroupDatabase};
use operations::{closure, PyMagneticOperation};
use utils::version;

/// Python module definition
#[pymodule]
fn msg_database_py(m: &Bound<'_, PyModule>) -> PyResult<()> {
    // Operation algebra
    m.add_class::<PyMagneticOperation>()?;
    m.add_function(wrap_pyfunction!(closure, m)?)?;

    // Database
    m.add_class::<PyGroup>()?;
    m.add_class::<PyMagneticSpaceGroupDatabase>()?;
    m.add_function(wrap_pyfunction!(load_database, m)?)?;

    // Utility functions
    m.add_function(wrap_pyfunction!(version, m)?)?;

    // Module metadata
    m.add("__version__", env!("CARGO_PKG_VERSION"))?;

    Ok(())
}
