//! LUT and CTM generation
//!
//! Deterministic inputs for scenario tests; random patterns are seeded so a
//! failure reproduces.

use dispcolor_core::{Ctm, CtmCoeff, LutEntry};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

/// LUT pattern types
#[derive(Debug, Clone, Copy)]
pub enum LutPattern {
    /// Linear ramp 0..=0xffff
    Identity,
    /// Power curve `x^gamma`
    Gamma(f64),
    /// 0xffff..=0, fails non-decreasing checks
    Inverted,
    /// Every entry the same value
    Constant(u16),
    /// Sorted random gray values, passes every data-quality test
    RandomMonotonic(u64),
    /// Independent random channels
    Random(u64),
}

fn ramp_value(i: usize, size: usize) -> f64 {
    if size < 2 {
        return 0.0;
    }
    i as f64 / (size - 1) as f64
}

fn to_u16(x: f64) -> u16 {
    (x.clamp(0.0, 1.0) * 65535.0 + 0.5) as u16
}

/// Generate a LUT of `size` entries
pub fn generate_lut(pattern: LutPattern, size: usize) -> Vec<LutEntry> {
    match pattern {
        LutPattern::Identity => (0..size)
            .map(|i| LutEntry::gray(to_u16(ramp_value(i, size))))
            .collect(),
        LutPattern::Gamma(gamma) => (0..size)
            .map(|i| LutEntry::gray(to_u16(ramp_value(i, size).powf(gamma))))
            .collect(),
        LutPattern::Inverted => (0..size)
            .map(|i| LutEntry::gray(to_u16(1.0 - ramp_value(i, size))))
            .collect(),
        LutPattern::Constant(v) => vec![LutEntry::gray(v); size],
        LutPattern::RandomMonotonic(seed) => {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let mut values: Vec<u16> = (0..size).map(|_| rng.r#gen()).collect();
            values.sort_unstable();
            values.into_iter().map(LutEntry::gray).collect()
        }
        LutPattern::Random(seed) => {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            (0..size)
                .map(|_| LutEntry::new(rng.r#gen(), rng.r#gen(), rng.r#gen()))
                .collect()
        }
    }
}

/// Random CTM with coefficients in `-range..range`
pub fn random_ctm(seed: u64, range: f64) -> Ctm {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut coeffs = [CtmCoeff::ZERO; 9];
    for c in &mut coeffs {
        *c = CtmCoeff::from_f64(rng.gen_range(-range..range));
    }
    Ctm::new(coeffs)
}
