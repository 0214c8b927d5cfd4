//! Fixed-Point Codec
//!
//! Converts S31.32 sign-magnitude CTM coefficients into the packed CSC
//! coefficient words of each hardware generation, and back.
//!
//! # Formats
//!
//! Two coefficient encodings exist:
//!
//! - **Sliding window** (ILK-style pipe CSC, IVB and later): a 16-bit word
//!   with a sign bit, a 3-bit exponent code selecting one of six magnitude
//!   bands and a 9-bit mantissa window written from bit 3. Magnitudes are
//!   limited to just under 4.0.
//! - **S3.12** (CHV CGM CSC): sign bit, 3 integer bits, 12 fraction bits.
//!   Magnitudes are limited to just under 8.0.
//!
//! Magnitudes beyond the format's range saturate; the affected
//! coefficients are reported in [`EncodedMatrix::clamped`] and processing
//! continues.

mod ctm;
mod matrix;

pub use ctm::{
    CTM_COEFF_0_125, CTM_COEFF_0_25, CTM_COEFF_0_5, CTM_COEFF_1_0, CTM_COEFF_2_0, CTM_COEFF_4_0,
    CTM_COEFF_8_0, CTM_COEFF_LIMITED_RANGE, decode_coeff, decode_ctm, encode_coeff, encode_ctm,
    encode_ctm_for, max_magnitude, mult_by_limited, rounding_ulp,
};
pub use matrix::{ClampMask, CoeffPair, EncodedMatrix};

/// Hardware CSC coefficient format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CoeffFormat {
    /// Sign + 3-bit exponent code + 9-bit mantissa window
    SlidingWindow,
    /// Sign + S3.12 fixed point
    S3Fixed12,
}

impl CoeffFormat {
    /// Significant bits per coefficient (sign included)
    pub fn coefficient_bits(&self) -> u32 {
        match self {
            // sign + exponent + mantissa window
            Self::SlidingWindow => 1 + 3 + 9,
            Self::S3Fixed12 => 16,
        }
    }
}
