//! Python bindings for magnetic symmetry operations

use msg_database::interfaces::setting::Bns;
use msg_database::symmetries::{closure_sorted, parse_one_line_generators, parse_operation, MagneticOperation};
use msg_database::symmetries::RationalVector3;
use msg_database::MsgError;
use num_rational::Rational64;
use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;

pub(crate) fn to_py_err(err: MsgError) -> PyErr {
    match err {
        MsgError::ClosureDivergence { .. } | MsgError::Io(_) => PyRuntimeError::new_err(err.to_string()),
        _ => PyValueError::new_err(err.to_string()),
    }
}

/// Exact rationals as (numerator, denominator) pairs
pub(crate) fn fraction_pairs(vector: &RationalVector3) -> [(i64, i64); 3] {
    vector.components().map(|r| (*r.numer(), *r.denom()))
}

fn vector_from_pairs(pairs: [(i64, i64); 3]) -> PyResult<RationalVector3> {
    let mut components = [Rational64::from_integer(0); 3];
    for (component, (numerator, denominator)) in components.iter_mut().zip(pairs) {
        if denominator == 0 {
            return Err(PyValueError::new_err("zero denominator"));
        }
        *component = Rational64::new(numerator, denominator);
    }
    Ok(RationalVector3(components))
}

/// Python wrapper for a BNS magnetic operation
#[pyclass(name = "MagneticOperation")]
#[derive(Clone)]
pub struct PyMagneticOperation {
    pub(crate) inner: MagneticOperation,
}

#[pymethods]
impl PyMagneticOperation {
    /// Parse an operation such as "-x,y,-z+1/2" or "-x,y,-z+1/2,-1"
    ///
    /// Args:
    ///     text: Three comma separated expressions, optionally followed by the time reversal
    ///
    /// Returns:
    ///     MagneticOperation: The operation with its translation reduced into [0, 1)
    #[staticmethod]
    fn parse(text: &str) -> PyResult<Self> {
        parse_operation::<Bns>(text)
            .map(|inner| PyMagneticOperation { inner })
            .map_err(to_py_err)
    }

    #[staticmethod]
    fn identity() -> Self {
        PyMagneticOperation {
            inner: MagneticOperation::identity(),
        }
    }

    /// Apply self first, then other
    fn compose(&self, other: &PyMagneticOperation) -> PyResult<PyMagneticOperation> {
        self.inner
            .and_then(&other.inner)
            .map(|inner| PyMagneticOperation { inner })
            .map_err(to_py_err)
    }

    fn inverse(&self) -> PyResult<PyMagneticOperation> {
        self.inner
            .inverse()
            .map(|inner| PyMagneticOperation { inner })
            .map_err(to_py_err)
    }

    fn order(&self) -> PyResult<usize> {
        self.inner.order().map_err(to_py_err)
    }

    fn is_identity(&self) -> bool {
        self.inner.is_identity()
    }

    /// Point operation as a row-major 3x3 list
    fn point_operation(&self) -> [[i8; 3]; 3] {
        let m = self.inner.point_operation();
        [0, 1, 2].map(|i| [m[(i, 0)], m[(i, 1)], m[(i, 2)]])
    }

    fn translation(&self) -> [(i64, i64); 3] {
        fraction_pairs(self.inner.translation())
    }

    /// +1 or -1
    fn time_reversal(&self) -> i8 {
        self.inner.time_reversal().sign()
    }

    fn transform_position(&self, position: [(i64, i64); 3]) -> PyResult<[(i64, i64); 3]> {
        let position = vector_from_pairs(position)?;
        Ok(fraction_pairs(&self.inner.transform_position(&position)))
    }

    fn transform_moment(&self, moment: [(i64, i64); 3]) -> PyResult<[(i64, i64); 3]> {
        let moment = vector_from_pairs(moment)?;
        Ok(fraction_pairs(&self.inner.transform_moment(&moment)))
    }

    fn text_form(&self) -> String {
        self.inner.text_form()
    }

    fn __eq__(&self, other: &PyMagneticOperation) -> bool {
        self.inner == other.inner
    }

    fn __repr__(&self) -> String {
        format!("MagneticOperation({})", self.inner.text_form())
    }
}

/// Sorted closure of a generator list such as "(x,y,z)';(-x,-y,-z)"
#[pyfunction]
pub fn closure(generators: &str) -> PyResult<Vec<PyMagneticOperation>> {
    let seeds = parse_one_line_generators::<Bns>(generators).map_err(to_py_err)?;
    let group = closure_sorted(&seeds).map_err(to_py_err)?;
    Ok(group
        .into_iter()
        .map(|inner| PyMagneticOperation { inner })
        .collect())
}
