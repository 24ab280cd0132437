//! Magnetic space group database
//!
//! This library reads the crysFML table of the 1651 magnetic space groups and provides exact
//! magnetic symmetry operations in the BNS and OG settings, group closure and consistency checks.

pub mod config;
pub mod database;
pub mod error;
pub mod interfaces;
pub mod symmetries;

pub use database::{Group, MagneticSpaceGroupDatabase};
pub use error::{MsgError, Result};
pub use interfaces::{Basis, Setting};
pub use symmetries::{MagneticOperation, OgMagneticOperation, TimeReversal};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
