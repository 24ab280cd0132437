// Definitions that are used throughout all modules

use serde::{Deserialize, Serialize};

use crate::config::HEXAGONAL_SPACE_GROUP_NUMBERS;
use crate::error::{MsgError, Result};
use crate::symmetries::rational_vector::RationalVector3;

// Enumeration for the basis a point operation table is written in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Basis {
    Square,
    Hexagonal,
}

impl Basis {
    /// Basis used by the point operations of a space group, given its ITA number.
    pub fn for_space_group(space_group_number: u32) -> Self {
        if HEXAGONAL_SPACE_GROUP_NUMBERS.contains(&space_group_number) {
            Basis::Hexagonal
        } else {
            Basis::Square
        }
    }
}

/// Translation rules of a magnetic space group setting.
///
/// The setting decides which translations are valid and how a freshly computed translation is
/// brought back to its canonical representative.
pub trait Setting:
    Copy + Clone + std::fmt::Debug + PartialEq + Eq + Send + Sync + 'static
{
    /// Short name used in error messages and dumps.
    const LABEL: &'static str;

    fn canonical_translation(translation: RationalVector3) -> RationalVector3;

    fn validate_translation(translation: &RationalVector3) -> Result<()>;
}

pub mod setting {
    use super::*;

    /// Belov-Neronova-Smirnova setting: translations live in [0, 1).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Bns;

    /// Opechowski-Guccione setting: translations are only required to be non-negative.
    ///
    /// Components at or above 1 are never reduced, so composition in this setting is not
    /// associative: `(a · b) · c` and `a · (b · c)` can differ by whole lattice translations.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Og;

    impl Setting for Bns {
        const LABEL: &'static str = "BNS";

        fn canonical_translation(translation: RationalVector3) -> RationalVector3 {
            translation.reduced_mod_one()
        }

        fn validate_translation(translation: &RationalVector3) -> Result<()> {
            if translation.is_in_unit_cell() {
                Ok(())
            } else {
                Err(MsgError::validation(format!(
                    "BNS translation {} must lie in the half open interval [0, 1)",
                    translation
                )))
            }
        }
    }

    impl Setting for Og {
        const LABEL: &'static str = "OG";

        // Negative components are shifted by whole cells, everything else is kept as is
        fn canonical_translation(translation: RationalVector3) -> RationalVector3 {
            translation.lifted_non_negative()
        }

        fn validate_translation(translation: &RationalVector3) -> Result<()> {
            if translation.is_non_negative() {
                Ok(())
            } else {
                Err(MsgError::validation(format!(
                    "OG translation {} must not have negative components",
                    translation
                )))
            }
        }
    }
}
