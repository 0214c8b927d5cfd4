//! Public data types shared by every stage
//!
//! `LutEntry` and `CtmCoeff` match the kernel color-management UAPI layout so
//! that property blobs can be viewed directly without copying.

use bytemuck::{Pod, Zeroable};

use crate::{Error, Result};

/// One LUT entry, 16 bits per channel
///
/// Byte-compatible with `struct drm_color_lut`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Pod, Zeroable)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LutEntry {
    pub red: u16,
    pub green: u16,
    pub blue: u16,
    #[cfg_attr(feature = "serde", serde(default))]
    pub reserved: u16,
}

impl LutEntry {
    /// Create an entry from three channel values
    #[inline]
    pub const fn new(red: u16, green: u16, blue: u16) -> Self {
        Self {
            red,
            green,
            blue,
            reserved: 0,
        }
    }

    /// Create a gray entry (all channels equal)
    #[inline]
    pub const fn gray(v: u16) -> Self {
        Self::new(v, v, v)
    }

    /// View a raw property blob as LUT entries
    pub fn cast_slice(bytes: &[u8]) -> Result<&[LutEntry]> {
        bytemuck::try_cast_slice(bytes).map_err(|e| {
            Error::BlobLayout(format!(
                "{} bytes is not a LUT entry array: {:?}",
                bytes.len(),
                e
            ))
        })
    }

    /// Raw bytes of a LUT, as stored in a property blob
    pub fn as_bytes(entries: &[LutEntry]) -> &[u8] {
        bytemuck::cast_slice(entries)
    }
}

/// Which LUT slot a table belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LutKind {
    /// Applied before the CSC
    Degamma,
    /// Applied after the CSC
    Gamma,
}

impl std::fmt::Display for LutKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Degamma => f.write_str("degamma"),
            Self::Gamma => f.write_str("gamma"),
        }
    }
}

/// CTM coefficient in S31.32 sign-magnitude format
///
/// Bit 63 is the sign, bits 62:0 are the magnitude with 32 fractional bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CtmCoeff(pub u64);

impl CtmCoeff {
    pub const SIGN: u64 = 1 << 63;
    pub const ONE: u64 = 1 << 32;

    pub const ZERO: Self = Self(0);
    pub const IDENTITY: Self = Self(Self::ONE);

    /// Create from raw sign-magnitude bits
    #[inline]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Create from a two's-complement S31.32 value
    #[inline]
    pub const fn from_i64(v: i64) -> Self {
        if v < 0 {
            Self(Self::SIGN | (v.unsigned_abs() & !Self::SIGN))
        } else {
            Self(v as u64)
        }
    }

    /// Create from a floating point value
    ///
    /// Magnitudes beyond the S31.32 range saturate.
    pub fn from_f64(v: f64) -> Self {
        let magnitude = (v.abs() * Self::ONE as f64).round();
        let magnitude = if magnitude >= (Self::SIGN - 1) as f64 {
            Self::SIGN - 1
        } else {
            magnitude as u64
        };
        if v.is_sign_negative() && magnitude != 0 {
            Self(Self::SIGN | magnitude)
        } else {
            Self(magnitude)
        }
    }

    /// Two's-complement S31.32 value
    #[inline]
    pub const fn to_i64(self) -> i64 {
        let magnitude = self.magnitude() as i64;
        if self.is_negative() { -magnitude } else { magnitude }
    }

    /// Convert to f64
    pub fn to_f64(self) -> f64 {
        let v = self.magnitude() as f64 / Self::ONE as f64;
        if self.is_negative() { -v } else { v }
    }

    #[inline]
    pub const fn is_negative(self) -> bool {
        self.0 & Self::SIGN != 0
    }

    /// Magnitude without the sign bit
    #[inline]
    pub const fn magnitude(self) -> u64 {
        self.0 & (Self::SIGN - 1)
    }

    #[inline]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// 3x3 color transform matrix, row-major
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Ctm {
    pub coeffs: [CtmCoeff; 9],
}

impl Ctm {
    #[inline]
    pub const fn new(coeffs: [CtmCoeff; 9]) -> Self {
        Self { coeffs }
    }

    /// Identity matrix
    pub const fn identity() -> Self {
        let z = CtmCoeff::ZERO;
        let one = CtmCoeff::IDENTITY;
        Self::new([one, z, z, z, one, z, z, z, one])
    }

    /// Create from row-major floating point rows
    pub fn from_rows(m: [[f64; 3]; 3]) -> Self {
        let mut coeffs = [CtmCoeff::ZERO; 9];
        for (i, c) in coeffs.iter_mut().enumerate() {
            *c = CtmCoeff::from_f64(m[i / 3][i % 3]);
        }
        Self { coeffs }
    }

    /// Create from two's-complement S31.32 values (the layout most userspace math produces)
    pub fn from_i64(m: [i64; 9]) -> Self {
        Self::new(m.map(CtmCoeff::from_i64))
    }

    /// Row-major floating point rows
    pub fn to_rows(&self) -> [[f64; 3]; 3] {
        let mut m = [[0.0; 3]; 3];
        for (i, c) in self.coeffs.iter().enumerate() {
            m[i / 3][i % 3] = c.to_f64();
        }
        m
    }
}

/// Pipe output color format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OutputFormat {
    #[default]
    Rgb,
    YCbCr420,
    YCbCr444,
}

impl OutputFormat {
    #[inline]
    pub fn is_rgb(&self) -> bool {
        matches!(self, Self::Rgb)
    }
}

/// Display pipe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Pipe {
    A,
    B,
    C,
    D,
}

impl Pipe {
    /// Zero-based pipe index
    #[inline]
    pub const fn index(self) -> u32 {
        match self {
            Self::A => 0,
            Self::B => 1,
            Self::C => 2,
            Self::D => 3,
        }
    }
}
