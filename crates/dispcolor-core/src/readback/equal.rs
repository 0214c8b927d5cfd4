//! LUT comparison kernels

use multiversion::multiversion;

use crate::regs::{GAMMA_MODE_MODE_8BIT, GAMMA_MODE_MODE_10BIT, GAMMA_MODE_MODE_MASK};
use crate::types::LutEntry;

/// Largest per-channel difference a readback of `precision_bits` may show
#[inline]
pub fn tolerance(precision_bits: u32) -> u16 {
    0xffffu32.checked_shr(precision_bits).unwrap_or(0) as u16
}

/// Index of the first entry with a channel more than `tol` away
#[multiversion(targets("x86_64+avx2", "x86_64+sse4.1", "aarch64+neon",))]
fn first_mismatch(a: &[LutEntry], b: &[LutEntry], tol: u16) -> Option<usize> {
    a.iter().zip(b.iter()).position(|(x, y)| {
        x.red.abs_diff(y.red) > tol
            || x.green.abs_diff(y.green) > tol
            || x.blue.abs_diff(y.blue) > tol
    })
}

/// Every channel of every entry within `0xffff >> precision_bits`
///
/// Tables of different lengths are never equal. Stops at the first entry
/// out of tolerance.
pub fn approx_equal(a: &[LutEntry], b: &[LutEntry], precision_bits: u32) -> bool {
    if a.len() != b.len() {
        return false;
    }
    first_mismatch(a, b, tolerance(precision_bits)).is_none()
}

/// Compare an optional requested table against an optional readback
///
/// Both absent is equal, one absent is not. Only the 8-bit and 10-bit
/// gamma modes can be compared at all.
pub fn lut_equal(
    a: Option<&[LutEntry]>,
    b: Option<&[LutEntry]>,
    gamma_mode: u32,
    precision_bits: u32,
) -> bool {
    let (a, b) = match (a, b) {
        (None, None) => return true,
        (Some(a), Some(b)) => (a, b),
        _ => return false,
    };

    match gamma_mode & GAMMA_MODE_MODE_MASK {
        GAMMA_MODE_MODE_8BIT | GAMMA_MODE_MODE_10BIT => approx_equal(a, b, precision_bits),
        _ => false,
    }
}
