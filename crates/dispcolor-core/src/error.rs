//! Error types for dispcolor

use thiserror::Error;

use crate::regs::Reg;
use crate::types::LutKind;

/// Result type for dispcolor operations
pub type Result<T> = std::result::Result<T, Error>;

/// Which data-quality test a LUT failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LutTest {
    /// Red, green and blue must be equal in every entry
    EqualChannels,
    /// No channel may decrease from one entry to the next
    NonDecreasing,
}

impl std::fmt::Display for LutTest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EqualChannels => f.write_str("all LUT entries must have equal r/g/b"),
            Self::NonDecreasing => f.write_str("LUT entries must never decrease"),
        }
    }
}

/// A requested color configuration the hardware cannot take
///
/// Always produced before any register write is planned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigError {
    /// LUT length differs from the profile's declared length
    #[error("invalid {lut} LUT size: got {actual}, expected {expected}")]
    SizeMismatch {
        lut: LutKind,
        expected: usize,
        actual: usize,
    },

    /// C8 planes keep their palette in the legacy LUT
    #[error("C8 pixel format requires the legacy LUT")]
    IncompatibleIndexedMode,

    /// No hardware topology can represent the request
    #[error("unsupported color combination: {0}")]
    UnsupportedCombination(String),

    /// A profile-declared LUT self-test failed
    #[error("{lut} LUT entry {index}: {test}")]
    LutCheck {
        lut: LutKind,
        test: LutTest,
        index: usize,
    },
}

/// Failure reported by the register I/O collaborator
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("register access to {reg:?} failed: {reason}")]
pub struct HardwareIoError {
    pub reg: Reg,
    pub reason: String,
}

/// Errors that can occur in dispcolor operations
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Rejected configuration
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Register I/O failure, passed through untouched
    #[error(transparent)]
    HardwareIo(#[from] HardwareIoError),

    /// Property blob is not a whole number of LUT entries
    #[error("LUT blob layout error: {0}")]
    BlobLayout(String),
}
