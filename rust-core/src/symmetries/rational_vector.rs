use std::fmt;
use std::ops::{Add, Index, Neg, Sub};

use nalgebra::{Matrix3, Scalar};
use num_rational::Rational64;
use num_traits::{Signed, Zero};
use serde::{Deserialize, Serialize};

use crate::error::{MsgError, Result};

/// Three exact rational components, each stored in lowest terms.
///
/// Used for translations, lattice vectors, Wyckoff positions and magnetic moments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RationalVector3(pub [Rational64; 3]);

impl RationalVector3 {
    pub fn new(x: Rational64, y: Rational64, z: Rational64) -> Self {
        Self([x, y, z])
    }

    pub fn zeros() -> Self {
        Self([Rational64::zero(); 3])
    }

    pub fn from_integers(values: [i64; 3]) -> Self {
        Self(values.map(Rational64::from_integer))
    }

    /// Build a vector from three numerators sharing one denominator.
    pub fn from_fraction_parts(numerators: [i64; 3], denominator: i64) -> Result<Self> {
        if denominator == 0 {
            return Err(MsgError::validation(format!(
                "zero denominator for numerators {:?}",
                numerators
            )));
        }
        Ok(Self(numerators.map(|n| Rational64::new(n, denominator))))
    }

    pub fn components(&self) -> &[Rational64; 3] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|c| c.is_zero())
    }

    /// True when every component lies in the half open interval [0, 1).
    pub fn is_in_unit_cell(&self) -> bool {
        self.0
            .iter()
            .all(|c| !c.is_negative() && *c < Rational64::from_integer(1))
    }

    pub fn is_non_negative(&self) -> bool {
        self.0.iter().all(|c| !c.is_negative())
    }

    /// Component-wise reduction into [0, 1).
    pub fn reduced_mod_one(&self) -> Self {
        Self(self.0.map(|c| c - c.floor()))
    }

    /// Negative components are moved into [0, 1) by whole lattice translations; non-negative
    /// components are returned unchanged.
    pub fn lifted_non_negative(&self) -> Self {
        Self(self.0.map(|c| if c.is_negative() { c - c.floor() } else { c }))
    }

    /// Integer matrix acting on this vector, `M · v`.
    pub fn transformed_by<T>(&self, matrix: &Matrix3<T>) -> Self
    where
        T: Scalar + Copy + Into<i64>,
    {
        let mut out = [Rational64::zero(); 3];
        for (i, value) in out.iter_mut().enumerate() {
            for j in 0..3 {
                let coefficient: i64 = matrix[(i, j)].into();
                *value += self.0[j] * coefficient;
            }
        }
        Self(out)
    }

    pub fn scaled(&self, factor: i64) -> Self {
        Self(self.0.map(|c| c * factor))
    }
}

impl Default for RationalVector3 {
    fn default() -> Self {
        Self::zeros()
    }
}

impl Index<usize> for RationalVector3 {
    type Output = Rational64;

    fn index(&self, index: usize) -> &Rational64 {
        &self.0[index]
    }
}

impl Add for RationalVector3 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self([self.0[0] + rhs.0[0], self.0[1] + rhs.0[1], self.0[2] + rhs.0[2]])
    }
}

impl Sub for RationalVector3 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        self + (-rhs)
    }
}

impl Neg for RationalVector3 {
    type Output = Self;

    fn neg(self) -> Self {
        Self(self.0.map(|c| -c))
    }
}

impl fmt::Display for RationalVector3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.0[0], self.0[1], self.0[2])
    }
}
