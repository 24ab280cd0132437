//! Python bindings for the magnetic space group database

use msg_database::database::{verify_closures, DatabaseAssembler, Group, RawFormatParser};
use msg_database::MagneticSpaceGroupDatabase;
use pyo3::prelude::*;

use crate::operations::{to_py_err, PyMagneticOperation};

/// Python wrapper for one magnetic space group
#[pyclass(name = "Group")]
#[derive(Clone)]
pub struct PyGroup {
    inner: Group,
}

#[pymethods]
impl PyGroup {
    #[getter]
    fn number(&self) -> u32 {
        self.inner.number
    }

    #[getter]
    fn group_type(&self) -> u8 {
        self.inner.group_type
    }

    #[getter]
    fn symbol(&self) -> String {
        self.inner.symbol.clone()
    }

    #[getter]
    fn bns_number(&self) -> String {
        self.inner.bns.number_string.clone()
    }

    #[getter]
    fn og_number(&self) -> String {
        self.inner.og.number_string.clone()
    }

    #[getter]
    fn og_symbol(&self) -> String {
        self.inner.og.symbol.clone()
    }

    /// Stored BNS operations, in table order
    fn bns_operations(&self) -> Vec<PyMagneticOperation> {
        self.inner
            .bns
            .operations
            .iter()
            .map(|op| PyMagneticOperation { inner: op.clone() })
            .collect()
    }

    /// OG operations as text, translations may reach outside [0, 1)
    fn og_operations(&self) -> Vec<String> {
        self.inner.og.operations.iter().map(|op| op.text_form()).collect()
    }

    /// BNS to OG transform as (row-major matrix, origin as (numerator, denominator) pairs)
    fn bns_og_transform(&self) -> ([[i32; 3]; 3], [(i64, i64); 3]) {
        let transform = &self.inner.bns_og_transform;
        let m = &transform.matrix;
        (
            [0, 1, 2].map(|i| [m[(i, 0)], m[(i, 1)], m[(i, 2)]]),
            crate::operations::fraction_pairs(&transform.origin),
        )
    }

    fn wyckoff_labels(&self) -> Vec<String> {
        self.inner.bns.wyckoff_sites.iter().map(|site| site.label.clone()).collect()
    }

    fn __repr__(&self) -> String {
        format!(
            "Group(number={}, symbol='{}', bns='{}', operations={})",
            self.inner.number,
            self.inner.symbol,
            self.inner.bns.number_string,
            self.inner.bns.operations.len()
        )
    }
}

/// Python wrapper for the loaded database
#[pyclass(name = "MagneticSpaceGroupDatabase")]
pub struct PyMagneticSpaceGroupDatabase {
    inner: MagneticSpaceGroupDatabase,
}

#[pymethods]
impl PyMagneticSpaceGroupDatabase {
    fn __len__(&self) -> usize {
        self.inner.len()
    }

    /// Group by its 1-based number
    fn group(&self, number: usize) -> Option<PyGroup> {
        self.inner.group(number).map(|group| PyGroup { inner: group.clone() })
    }

    /// Group by its dotted BNS number, e.g. "2.7"
    fn find_by_bns_number(&self, number: &str) -> Option<PyGroup> {
        self.inner
            .find_by_bns_number(number)
            .map(|group| PyGroup { inner: group.clone() })
    }

    /// Numbers of the groups whose stored operations are not closed
    fn unclosed_groups(&self) -> Vec<u32> {
        verify_closures(&self.inner)
            .into_iter()
            .map(|finding| finding.group_number)
            .collect()
    }
}

/// Load the crysFML table from a file
///
/// Args:
///     path: Path to the table
///     closure_check: Reject groups whose stored operations are not closed
#[pyfunction]
#[pyo3(signature = (path, closure_check = false))]
pub fn load_database(py: Python<'_>, path: &str, closure_check: bool) -> PyResult<PyMagneticSpaceGroupDatabase> {
    let inner = py
        .allow_threads(|| {
            let raw = RawFormatParser::from_path(path)?.parse()?;
            DatabaseAssembler::new()
                .with_closure_check(closure_check)
                .assemble(&raw)
        })
        .map_err(to_py_err)?;
    Ok(PyMagneticSpaceGroupDatabase { inner })
}
