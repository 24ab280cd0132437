use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::ops::Mul;

use nalgebra::Matrix3;
use num_rational::Rational64;
use num_traits::{Signed, Zero};
use serde::{Deserialize, Serialize};

use crate::config::OPERATION_ORDER_CAP;
use crate::error::{MsgError, Result};
use crate::interfaces::setting::{Bns, Og};
use crate::interfaces::Setting;
use crate::symmetries::point_operations::{
    determinant, narrow_point_matrix, serialize_rows, unimodular_inverse, PointMatrix,
};
use crate::symmetries::rational_vector::RationalVector3;

/// Action of an operation on the direction of a magnetic moment, +1 or -1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "i8", try_from = "i8")]
pub enum TimeReversal {
    /// -1, the moment is flipped. Declared first so the order follows the sign.
    Minus,
    /// +1, the moment is kept.
    Plus,
}

impl TimeReversal {
    pub fn sign(self) -> i8 {
        match self {
            TimeReversal::Plus => 1,
            TimeReversal::Minus => -1,
        }
    }

    pub fn from_sign(sign: i64) -> Result<Self> {
        match sign {
            1 => Ok(TimeReversal::Plus),
            -1 => Ok(TimeReversal::Minus),
            other => Err(MsgError::validation(format!(
                "time reversal must be either 1 or -1, got {}",
                other
            ))),
        }
    }

    /// Decode the crysFML time inversion flag: 0 keeps the moment, 1 flips it.
    pub fn from_flag(flag: i64) -> Result<Self> {
        match flag {
            0 => Ok(TimeReversal::Plus),
            1 => Ok(TimeReversal::Minus),
            other => Err(MsgError::validation(format!(
                "time inversion flag must be 0 or 1, got {}",
                other
            ))),
        }
    }
}

impl Mul for TimeReversal {
    type Output = TimeReversal;

    fn mul(self, rhs: TimeReversal) -> TimeReversal {
        if self == rhs {
            TimeReversal::Plus
        } else {
            TimeReversal::Minus
        }
    }
}

impl From<TimeReversal> for i8 {
    fn from(value: TimeReversal) -> i8 {
        value.sign()
    }
}

impl TryFrom<i8> for TimeReversal {
    type Error = MsgError;

    fn try_from(value: i8) -> Result<Self> {
        TimeReversal::from_sign(i64::from(value))
    }
}

/// A magnetic symmetry operation: point operation, exact translation and time reversal.
///
/// The setting parameter decides how translations are validated and canonicalised:
/// [`Bns`] keeps them in [0, 1), [`Og`] only requires them to be non-negative.
#[derive(Debug, Clone, Serialize)]
#[serde(bound = "")]
pub struct MagneticOperation<S: Setting = Bns> {
    #[serde(serialize_with = "serialize_rows")]
    point_operation: PointMatrix,
    translation: RationalVector3,
    time_reversal: TimeReversal,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(skip)]
    setting: PhantomData<S>,
}

/// Operation in the Opechowski-Guccione setting.
pub type OgMagneticOperation = MagneticOperation<Og>;

impl<S: Setting> MagneticOperation<S> {
    /// Create an operation, checking the point matrix entries and the setting's translation rule.
    pub fn new(
        point_operation: PointMatrix,
        translation: RationalVector3,
        time_reversal: TimeReversal,
    ) -> Result<Self> {
        if let Some(bad) = point_operation.iter().find(|e| !(-1..=1).contains(*e)) {
            return Err(MsgError::validation(format!(
                "point operation entries must be -1, 0 or 1, got {}",
                bad
            )));
        }
        S::validate_translation(&translation)?;
        Ok(Self {
            point_operation,
            translation,
            time_reversal,
            name: None,
            setting: PhantomData,
        })
    }

    pub fn identity() -> Self {
        Self {
            point_operation: Matrix3::identity(),
            translation: RationalVector3::zeros(),
            time_reversal: TimeReversal::Plus,
            name: None,
            setting: PhantomData,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn point_operation(&self) -> &PointMatrix {
        &self.point_operation
    }

    pub fn translation(&self) -> &RationalVector3 {
        &self.translation
    }

    pub fn time_reversal(&self) -> TimeReversal {
        self.time_reversal
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Apply `self` first, then `other`.
    ///
    /// `R = R_other · R_self`, `t = R_other · t_self + t_other` (canonicalised by the
    /// setting) and the time reversal signs multiply.
    ///
    /// Associative for [`Bns`] only. [`Og`] lifts negative components without reducing the
    /// others, so regrouping a chain of [`Og`] products can change whole cell translations.
    pub fn and_then(&self, other: &Self) -> Result<Self> {
        let product = other.point_operation.map(i32::from) * self.point_operation.map(i32::from);
        let point_operation = narrow_point_matrix(&product)?;
        let translation = S::canonical_translation(
            self.translation.transformed_by(&other.point_operation) + other.translation,
        );
        Self::new(
            point_operation,
            translation,
            self.time_reversal * other.time_reversal,
        )
    }

    /// The operation undoing `self`. For [`Og`] the inverse translation is lifted to be
    /// non-negative, so the inverse holds modulo whole lattice translations.
    pub fn inverse(&self) -> Result<Self> {
        let inverse_matrix = unimodular_inverse(&self.point_operation)?;
        let point_operation = narrow_point_matrix(&inverse_matrix)?;
        let translation = S::canonical_translation(-self.translation.transformed_by(&inverse_matrix));
        Self::new(point_operation, translation, self.time_reversal)
    }

    pub fn is_identity(&self) -> bool {
        self.point_operation == Matrix3::identity()
            && self.translation.is_zero()
            && self.time_reversal == TimeReversal::Plus
    }

    /// Smallest `k` with `self^k` equal to the identity.
    pub fn order(&self) -> Result<usize> {
        let mut power = self.clone();
        for k in 1..=OPERATION_ORDER_CAP {
            if power.is_identity() {
                return Ok(k);
            }
            power = power.and_then(self)?;
        }
        Err(MsgError::validation(format!(
            "operation {} has no finite order up to {}",
            self.text_form(),
            OPERATION_ORDER_CAP
        )))
    }

    pub fn determinant(&self) -> i64 {
        determinant(&self.point_operation)
    }

    /// Image of a position, `R · p + t`, canonicalised by the setting.
    pub fn transform_position(&self, position: &RationalVector3) -> RationalVector3 {
        S::canonical_translation(position.transformed_by(&self.point_operation) + self.translation)
    }

    /// Image of a magnetic moment. Moments are axial vectors: `s · det(R) · R · m`.
    pub fn transform_moment(&self, moment: &RationalVector3) -> RationalVector3 {
        let sign = self.determinant() * i64::from(self.time_reversal.sign());
        moment.transformed_by(&self.point_operation).scaled(sign)
    }

    /// Re-tag this operation in another setting. The translation is not re-reduced.
    pub fn in_setting<T: Setting>(&self) -> Result<MagneticOperation<T>> {
        let op = MagneticOperation::<T>::new(self.point_operation, self.translation, self.time_reversal)?;
        Ok(match &self.name {
            Some(name) => op.with_name(name.clone()),
            None => op,
        })
    }

    /// Render as a triple of linear expressions in x, y, z followed by the time reversal,
    /// e.g. `-x, y, -z + 1/2, 1`.
    pub fn text_form(&self) -> String {
        let mut parts: Vec<String> = (0..3)
            .map(|i| {
                let mut row = String::new();
                for (j, symbol) in ["x", "y", "z"].iter().enumerate() {
                    match self.point_operation[(i, j)] {
                        1 if row.is_empty() => row.push_str(symbol),
                        1 => row.push_str(&format!(" + {}", symbol)),
                        -1 if row.is_empty() => row.push_str(&format!("-{}", symbol)),
                        -1 => row.push_str(&format!(" - {}", symbol)),
                        _ => {}
                    }
                }
                let t = self.translation[i];
                if t.is_negative() {
                    row.push_str(&format!(" - {}", -t));
                } else if !t.is_zero() {
                    row.push_str(&format!(" + {}", t));
                }
                row
            })
            .collect();
        parts.push(self.time_reversal.sign().to_string());
        parts.join(", ")
    }

    fn sort_key(&self) -> ([i8; 9], &[Rational64; 3], TimeReversal) {
        let m = &self.point_operation;
        let rows = [
            m[(0, 0)], m[(0, 1)], m[(0, 2)],
            m[(1, 0)], m[(1, 1)], m[(1, 2)],
            m[(2, 0)], m[(2, 1)], m[(2, 2)],
        ];
        (rows, self.translation.components(), self.time_reversal)
    }
}

impl MagneticOperation<Bns> {
    /// Structural copy of a BNS operation as an OG operation. BNS translations lie in
    /// [0, 1) and are therefore valid OG translations.
    pub fn to_og(&self) -> OgMagneticOperation {
        MagneticOperation {
            point_operation: self.point_operation,
            translation: self.translation,
            time_reversal: self.time_reversal,
            name: self.name.clone(),
            setting: PhantomData,
        }
    }
}

impl<S: Setting> Default for MagneticOperation<S> {
    fn default() -> Self {
        Self::identity()
    }
}

// Equality, ordering and hashing ignore the name
impl<S: Setting> PartialEq for MagneticOperation<S> {
    fn eq(&self, other: &Self) -> bool {
        self.point_operation == other.point_operation
            && self.translation == other.translation
            && self.time_reversal == other.time_reversal
    }
}

impl<S: Setting> Eq for MagneticOperation<S> {}

impl<S: Setting> PartialOrd for MagneticOperation<S> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<S: Setting> Ord for MagneticOperation<S> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

impl<S: Setting> Hash for MagneticOperation<S> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.sort_key().hash(state);
    }
}

impl<S: Setting> fmt::Display for MagneticOperation<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text_form())
    }
}

/// Anything the closure engine can compose.
pub trait Composable: Clone + Ord {
    fn compose(&self, then: &Self) -> Result<Self>;
}

impl<S: Setting> Composable for MagneticOperation<S> {
    fn compose(&self, then: &Self) -> Result<Self> {
        self.and_then(then)
    }
}
