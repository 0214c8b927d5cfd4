//! CTM coefficient conversion
//!
//! Input coefficients are S31.32 sign-magnitude (see [`CtmCoeff`]). The
//! magnitude is clamped to the format's range before anything else, so
//! oversized inputs saturate instead of wrapping into the exponent field.

use tracing::debug;

use super::CoeffFormat;
use super::matrix::{ClampMask, EncodedMatrix};
use crate::error::{ConfigError, Result};
use crate::profile::HardwareProfile;
use crate::types::{Ctm, CtmCoeff};

pub const CTM_COEFF_1_0: u64 = 1 << 32;
pub const CTM_COEFF_2_0: u64 = CTM_COEFF_1_0 << 1;
pub const CTM_COEFF_4_0: u64 = CTM_COEFF_2_0 << 1;
pub const CTM_COEFF_8_0: u64 = CTM_COEFF_4_0 << 1;
pub const CTM_COEFF_0_5: u64 = CTM_COEFF_1_0 >> 1;
pub const CTM_COEFF_0_25: u64 = CTM_COEFF_0_5 >> 1;
pub const CTM_COEFF_0_125: u64 = CTM_COEFF_0_25 >> 1;

/// (235 - 16) / 255 in U0.32
pub const CTM_COEFF_LIMITED_RANGE: u64 = (235 - 16) * CTM_COEFF_1_0 / 255;

const SIGN_BIT: u16 = 1 << 15;
const EXPONENT_SHIFT: u32 = 12;
const MANTISSA_MASK: u16 = 0xff8;

/// S3.12 rounding constant: half of one 2^-12 step
const S3_12_ROUND: u64 = 1 << (32 - 13);

/// Sliding-window magnitude bands: (upper bound, exponent code, fraction bits)
const BANDS: [(u64, u16, u32); 6] = [
    (CTM_COEFF_0_125, 3, 12),
    (CTM_COEFF_0_25, 2, 11),
    (CTM_COEFF_0_5, 1, 10),
    (CTM_COEFF_1_0, 0, 9),
    (CTM_COEFF_2_0, 7, 8),
    (CTM_COEFF_4_0, 6, 7),
];

/// Largest magnitude the format can hold, in S31.32
pub const fn max_magnitude(format: CoeffFormat) -> u64 {
    match format {
        CoeffFormat::SlidingWindow => CTM_COEFF_4_0 - 1,
        CoeffFormat::S3Fixed12 => CTM_COEFF_8_0 - 1,
    }
}

fn band_for(abs: u64) -> (u16, u32) {
    for &(limit, code, fbits) in &BANDS {
        if abs < limit {
            return (code, fbits);
        }
    }
    (6, 7)
}

fn fraction_bits(code: u16) -> Option<u32> {
    BANDS
        .iter()
        .find(|&&(_, c, _)| c == code)
        .map(|&(_, _, fbits)| fbits)
}

/// Quantization step at `abs` after encoding, in S31.32
///
/// `decode_coeff(encode_coeff(c))` lands within this distance of the
/// clamped input.
pub fn rounding_ulp(format: CoeffFormat, abs: u64) -> u64 {
    match format {
        CoeffFormat::SlidingWindow => {
            let (_, fbits) = band_for(abs.min(max_magnitude(format)));
            1 << (32 - fbits)
        }
        CoeffFormat::S3Fixed12 => 1 << 20,
    }
}

/// Scale every coefficient by the full to limited range ratio
///
/// Magnitudes are clamped below 4.0 first; the sign is carried over.
pub fn mult_by_limited(ctm: &Ctm) -> Ctm {
    Ctm::new(ctm.coeffs.map(|c| {
        let abs = c.magnitude().min(CTM_COEFF_4_0 - 1) >> 2;
        let scaled = (CTM_COEFF_LIMITED_RANGE * abs) >> 30;
        CtmCoeff::from_raw(scaled | (c.raw() & CtmCoeff::SIGN))
    }))
}

/// Encode one coefficient; the flag is set when the magnitude saturated
pub fn encode_coeff(coeff: CtmCoeff, format: CoeffFormat) -> (u16, bool) {
    let max = max_magnitude(format);
    let clamped = coeff.magnitude() > max;
    let sign = if coeff.is_negative() { SIGN_BIT } else { 0 };

    let word = match format {
        CoeffFormat::SlidingWindow => {
            let abs = coeff.magnitude().min(max);
            let (code, fbits) = band_for(abs);
            let mantissa = ((abs >> (32 - fbits - 3)) + 4).min(0xfff) as u16 & MANTISSA_MASK;
            // A zero mantissa is zero in every band; write it as a plain 0
            if mantissa == 0 {
                0
            } else {
                sign | (code << EXPONENT_SHIFT) | mantissa
            }
        }
        CoeffFormat::S3Fixed12 => {
            let abs = (coeff.magnitude() + S3_12_ROUND).min(max);
            let int = ((abs >> 32) & 7) as u16;
            let frac = ((abs >> 20) & 0xfff) as u16;
            if int == 0 && frac == 0 {
                0
            } else {
                sign | (int << EXPONENT_SHIFT) | frac
            }
        }
    };

    (word, clamped)
}

/// Decode one hardware coefficient
///
/// Returns `None` for sliding-window words carrying one of the two unused
/// exponent codes.
pub fn decode_coeff(word: u16, format: CoeffFormat) -> Option<CtmCoeff> {
    let abs = match format {
        CoeffFormat::SlidingWindow => {
            let fbits = fraction_bits((word >> EXPONENT_SHIFT) & 7)?;
            u64::from(word & MANTISSA_MASK) << (32 - fbits - 3)
        }
        CoeffFormat::S3Fixed12 => {
            let int = u64::from((word >> EXPONENT_SHIFT) & 7);
            let frac = u64::from(word & 0xfff);
            (int << 32) | (frac << 20)
        }
    };

    if word & SIGN_BIT != 0 && abs != 0 {
        Some(CtmCoeff::from_raw(CtmCoeff::SIGN | abs))
    } else {
        Some(CtmCoeff::from_raw(abs))
    }
}

/// Encode a CTM into a given coefficient format
///
/// `compress_limited` folds the full to limited range compression into the
/// coefficients before extraction. Offsets are left at zero.
pub fn encode_ctm_for(ctm: &Ctm, format: CoeffFormat, compress_limited: bool) -> EncodedMatrix {
    let input = if compress_limited {
        mult_by_limited(ctm)
    } else {
        *ctm
    };

    let mut coeffs = [0u16; 9];
    let mut clamped = ClampMask::default();
    for (i, (out, &c)) in coeffs.iter_mut().zip(input.coeffs.iter()).enumerate() {
        let (word, saturated) = encode_coeff(c, format);
        *out = word;
        if saturated {
            debug!(
                index = i,
                value = c.to_f64(),
                ?format,
                "CTM coefficient out of range, saturating"
            );
            clamped.set(i);
        }
    }

    EncodedMatrix {
        format,
        coeffs,
        preoff: [0; 3],
        postoff: [0; 3],
        clamped,
    }
}

/// Encode a user CTM for a platform
///
/// Limited range compression (and the matching post-offsets) only applies
/// when the profile folds it into the pipe CSC and `limited_range` is set.
pub fn encode_ctm(
    ctm: &Ctm,
    profile: &HardwareProfile,
    limited_range: bool,
) -> Result<EncodedMatrix> {
    let format = profile.ctm_format.ok_or_else(|| {
        ConfigError::UnsupportedCombination(format!(
            "{:?} has no CTM support",
            profile.platform
        ))
    })?;

    let compress = profile.limited_range_csc && limited_range;
    let mut encoded = encode_ctm_for(ctm, format, compress);
    if compress {
        encoded.postoff = EncodedMatrix::LIMITED_RANGE.postoff;
    }
    Ok(encoded)
}

/// Decode hardware coefficients back into a CTM
///
/// `None` when the profile cannot read its CSC back, the format does not
/// match the profile, or a word is not a valid coefficient.
pub fn decode_ctm(encoded: &EncodedMatrix, profile: &HardwareProfile) -> Option<Ctm> {
    if !profile.readback.ctm || profile.ctm_format != Some(encoded.format) {
        return None;
    }
    encoded.to_ctm()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::Platform;

    #[test]
    fn test_identity_sliding_window() {
        let enc = encode_ctm_for(&Ctm::identity(), CoeffFormat::SlidingWindow, false);
        for i in [0, 4, 8] {
            assert_eq!(enc.coeffs[i], 0x7800, "diagonal {i}");
        }
        assert_eq!(enc.coeffs[1], 0);
        assert_eq!(enc.coeffs, EncodedMatrix::IDENTITY.coeffs);
        assert!(enc.clamped.is_empty());
    }

    #[test]
    fn test_zero_encodes_to_zero_word() {
        for format in [CoeffFormat::SlidingWindow, CoeffFormat::S3Fixed12] {
            for v in [0.0, -0.0, 1e-9, -1e-9] {
                let (word, clamped) = encode_coeff(CtmCoeff::from_f64(v), format);
                assert_eq!(word, 0, "{format:?} {v}");
                assert!(!clamped);
            }
            // Re-encoding a decoded zero gives the same word
            let back = decode_coeff(0, format).unwrap();
            assert_eq!(encode_coeff(back, format).0, 0);
        }
    }

    #[test]
    fn test_identity_s3_12() {
        let enc = encode_ctm_for(&Ctm::identity(), CoeffFormat::S3Fixed12, false);
        assert_eq!(enc.coeffs, [0x1000, 0, 0, 0, 0x1000, 0, 0, 0, 0x1000]);
    }

    #[test]
    fn test_bands() {
        let cases = [
            (0.1, 0x3000u16),
            (0.2, 0x2000),
            (0.3, 0x1000),
            (0.75, 0x0000),
            (1.5, 0x7000),
            (3.0, 0x6000),
        ];
        for (v, exp) in cases {
            let (word, _) = encode_coeff(CtmCoeff::from_f64(v), CoeffFormat::SlidingWindow);
            assert_eq!(word & 0x7000, exp, "band for {v}");
        }
    }

    #[test]
    fn test_negative_sets_sign() {
        let (word, _) = encode_coeff(CtmCoeff::from_f64(-0.5), CoeffFormat::SlidingWindow);
        assert_eq!(word, 0x8000 | 0x0800);

        let (word, _) = encode_coeff(CtmCoeff::from_f64(-2.0), CoeffFormat::S3Fixed12);
        assert_eq!(word, 0x8000 | 0x2000);
    }

    #[test]
    fn test_saturates_instead_of_wrapping() {
        let (word, clamped) = encode_coeff(CtmCoeff::from_f64(100.0), CoeffFormat::SlidingWindow);
        assert!(clamped);
        assert_eq!(word, 0x6ff8);

        let (word, clamped) = encode_coeff(CtmCoeff::from_f64(-9.0), CoeffFormat::S3Fixed12);
        assert!(clamped);
        assert_eq!(word, 0xffff);

        let enc = encode_ctm_for(
            &Ctm::from_rows([[5.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, -4.0]]),
            CoeffFormat::SlidingWindow,
            false,
        );
        assert!(enc.clamped.contains(0));
        assert!(enc.clamped.contains(8));
        assert_eq!(enc.clamped.count(), 2);
    }

    #[test]
    fn test_decode_within_ulp() {
        for format in [CoeffFormat::SlidingWindow, CoeffFormat::S3Fixed12] {
            for v in [0.0, 0.01, 0.124, 0.2, 0.49, 0.51, 0.999, 1.0, 1.7, 2.5, 3.99] {
                let c = CtmCoeff::from_f64(v);
                let (word, _) = encode_coeff(c, format);
                let back = decode_coeff(word, format).unwrap();
                let diff = back.magnitude().abs_diff(c.magnitude());
                assert!(
                    diff <= rounding_ulp(format, c.magnitude()),
                    "{format:?} {v}: diff {diff}"
                );
            }
        }
    }

    #[test]
    fn test_invalid_exponent() {
        assert!(decode_coeff(0x4000, CoeffFormat::SlidingWindow).is_none());
        assert!(decode_coeff(0x5ff8, CoeffFormat::SlidingWindow).is_none());
    }

    #[test]
    fn test_limited_range_scaling() {
        let scaled = mult_by_limited(&Ctm::identity());
        let expected = 219.0 / 255.0;
        assert!((scaled.coeffs[0].to_f64() - expected).abs() < 1e-6);
        assert_eq!(scaled.coeffs[1], CtmCoeff::ZERO);

        let neg = mult_by_limited(&Ctm::from_rows([[-1.0, 0.0, 0.0]; 3]));
        assert!(neg.coeffs[0].is_negative());
    }

    #[test]
    fn test_encode_for_profile() {
        let bdw = HardwareProfile::for_platform(Platform::Broadwell);
        let full = encode_ctm(&Ctm::identity(), bdw, false).unwrap();
        assert_eq!(full.postoff, [0; 3]);

        let limited = encode_ctm(&Ctm::identity(), bdw, true).unwrap();
        assert_ne!(limited.coeffs[0], 0x7800);
        assert_eq!(limited.postoff, EncodedMatrix::LIMITED_RANGE.postoff);

        // IVB has no range compression in the CSC
        let ivb = HardwareProfile::for_platform(Platform::Ivybridge);
        let enc = encode_ctm(&Ctm::identity(), ivb, true).unwrap();
        assert_eq!(enc.coeffs[0], 0x7800);

        let g4x = HardwareProfile::for_platform(Platform::G4x);
        assert!(encode_ctm(&Ctm::identity(), g4x, false).is_err());
    }

    #[test]
    fn test_decode_requires_readback() {
        let skl = HardwareProfile::for_platform(Platform::Skylake);
        let enc = encode_ctm(&Ctm::identity(), skl, false).unwrap();
        assert_eq!(decode_ctm(&enc, skl), Some(Ctm::identity()));

        let mut no_readback = *skl;
        no_readback.readback.ctm = false;
        assert_eq!(decode_ctm(&enc, &no_readback), None);

        // Wrong format for the profile
        let chv = HardwareProfile::for_platform(Platform::Cherryview);
        assert_eq!(decode_ctm(&enc, chv), None);
    }
}
