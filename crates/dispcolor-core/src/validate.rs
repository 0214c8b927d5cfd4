//! Request validation
//!
//! Runs before topology selection; nothing downstream re-checks sizes.

use tracing::debug;

use crate::config::ColorConfig;
use crate::error::{ConfigError, LutTest};
use crate::profile::{HardwareProfile, LutTests};
use crate::types::{LutEntry, LutKind};

fn check_lut_size(
    lut: Option<&[LutEntry]>,
    kind: LutKind,
    expected: usize,
) -> Result<(), ConfigError> {
    let Some(lut) = lut else {
        return Ok(());
    };

    if lut.len() != expected {
        debug!(%kind, actual = lut.len(), expected, "invalid LUT size");
        return Err(ConfigError::SizeMismatch {
            lut: kind,
            expected,
            actual: lut.len(),
        });
    }
    Ok(())
}

/// Run a profile's LUT data-quality tests
///
/// Channel equality is checked on an entry before monotonicity against its
/// predecessor.
pub fn check_lut_entries(
    lut: &[LutEntry],
    kind: LutKind,
    tests: LutTests,
) -> Result<(), ConfigError> {
    if tests.is_empty() {
        return Ok(());
    }

    for (i, e) in lut.iter().enumerate() {
        if tests.equal_channels && (e.red != e.blue || e.green != e.blue) {
            debug!(%kind, index = i, "LUT entries must have equal r/g/b");
            return Err(ConfigError::LutCheck {
                lut: kind,
                test: LutTest::EqualChannels,
                index: i,
            });
        }

        if tests.non_decreasing && i > 0 {
            let prev = &lut[i - 1];
            if e.red < prev.red || e.green < prev.green || e.blue < prev.blue {
                debug!(%kind, index = i, "LUT entries must never decrease");
                return Err(ConfigError::LutCheck {
                    lut: kind,
                    test: LutTest::NonDecreasing,
                    index: i,
                });
            }
        }
    }
    Ok(())
}

/// Check a request against a platform's LUT limits
///
/// A legacy gamma request (256-entry gamma, nothing else) always passes.
/// Otherwise C8 planes rule out any LUT or CTM, then sizes are checked,
/// then the profile's entry tests run.
pub fn validate(config: &ColorConfig, profile: &HardwareProfile) -> Result<(), ConfigError> {
    if config.is_legacy_gamma() {
        return Ok(());
    }

    if config.c8_planes && (config.has_degamma() || config.has_gamma() || config.has_ctm()) {
        debug!("C8 pixel format requires the legacy LUT");
        return Err(ConfigError::IncompatibleIndexedMode);
    }

    check_lut_size(
        config.degamma_lut.as_deref(),
        LutKind::Degamma,
        profile.degamma_lut_size,
    )?;
    check_lut_size(
        config.gamma_lut.as_deref(),
        LutKind::Gamma,
        profile.gamma_lut_size,
    )?;

    if let Some(lut) = config.degamma_lut.as_deref() {
        check_lut_entries(lut, LutKind::Degamma, profile.degamma_lut_tests)?;
    }
    if let Some(lut) = config.gamma_lut.as_deref() {
        check_lut_entries(lut, LutKind::Gamma, profile.gamma_lut_tests)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::Platform;
    use crate::types::Ctm;

    fn ramp(n: usize) -> Vec<LutEntry> {
        (0..n)
            .map(|i| LutEntry::gray((i * 0xffff / (n - 1)) as u16))
            .collect()
    }

    #[test]
    fn test_legacy_always_passes() {
        for p in HardwareProfile::all() {
            let cfg = ColorConfig::new()
                .with_gamma(vec![LutEntry::default(); 256])
                .with_c8_planes();
            assert_eq!(validate(&cfg, p), Ok(()), "{:?}", p.platform);
        }
    }

    #[test]
    fn test_size_mismatch_reports_both() {
        let i830 = HardwareProfile::for_platform(Platform::I830);
        let cfg = ColorConfig::new().with_gamma(ramp(257));
        assert_eq!(
            validate(&cfg, i830),
            Err(ConfigError::SizeMismatch {
                lut: LutKind::Gamma,
                expected: 256,
                actual: 257,
            })
        );
    }

    #[test]
    fn test_degamma_without_hardware() {
        let ilk = HardwareProfile::for_platform(Platform::Ironlake);
        let cfg = ColorConfig::new().with_degamma(ramp(33));
        assert!(matches!(
            validate(&cfg, ilk),
            Err(ConfigError::SizeMismatch { expected: 0, .. })
        ));
    }

    #[test]
    fn test_c8_rejects_non_legacy() {
        let skl = HardwareProfile::for_platform(Platform::Skylake);
        let cfg = ColorConfig::new().with_ctm(Ctm::identity()).with_c8_planes();
        assert_eq!(validate(&cfg, skl), Err(ConfigError::IncompatibleIndexedMode));

        let cfg = ColorConfig::new().with_gamma(ramp(512)).with_c8_planes();
        assert_eq!(validate(&cfg, skl), Err(ConfigError::IncompatibleIndexedMode));

        // Nothing requested at all is fine
        let cfg = ColorConfig::new().with_c8_planes();
        assert_eq!(validate(&cfg, skl), Ok(()));
    }

    #[test]
    fn test_equal_channels() {
        let glk = HardwareProfile::for_platform(Platform::Geminilake);
        let mut lut = ramp(33);
        lut[5].red = lut[5].red.wrapping_add(1);
        let cfg = ColorConfig::new().with_degamma(lut);
        assert_eq!(
            validate(&cfg, glk),
            Err(ConfigError::LutCheck {
                lut: LutKind::Degamma,
                test: LutTest::EqualChannels,
                index: 5,
            })
        );
    }

    #[test]
    fn test_non_decreasing() {
        let g4x = HardwareProfile::for_platform(Platform::G4x);
        let mut lut = ramp(129);
        lut[100].blue = 0;
        let cfg = ColorConfig::new().with_gamma(lut);
        assert_eq!(
            validate(&cfg, g4x),
            Err(ConfigError::LutCheck {
                lut: LutKind::Gamma,
                test: LutTest::NonDecreasing,
                index: 100,
            })
        );

        // IVB declares no tests
        let ivb = HardwareProfile::for_platform(Platform::Ivybridge);
        let mut lut = ramp(1024);
        lut[10] = LutEntry::default();
        assert_eq!(validate(&ColorConfig::new().with_gamma(lut), ivb), Ok(()));
    }
}
