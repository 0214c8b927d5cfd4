//! Requested Pipe Color State
//!
//! The color state a display-state collaborator wants on one pipe for one
//! commit attempt.

use crate::types::{Ctm, LutEntry, OutputFormat};

/// Number of entries in the legacy 8-bit palette
pub const LEGACY_LUT_LENGTH: usize = 256;

/// Requested pipe color configuration
///
/// Built once per commit attempt and never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ColorConfig {
    /// LUT applied before the CSC
    pub degamma_lut: Option<Vec<LutEntry>>,
    /// LUT applied after the CSC
    pub gamma_lut: Option<Vec<LutEntry>>,
    /// Color transform matrix
    pub ctm: Option<Ctm>,
    /// Pipe output format
    pub output_format: OutputFormat,
    /// Limited (16-235) output range
    pub limited_color_range: bool,
    /// Some plane on the pipe scans out C8 indexed pixels
    pub c8_planes: bool,
}

impl ColorConfig {
    /// Create an empty configuration (everything bypassed, RGB full range)
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the degamma LUT
    pub fn with_degamma(mut self, lut: Vec<LutEntry>) -> Self {
        self.degamma_lut = Some(lut);
        self
    }

    /// Set the gamma LUT
    pub fn with_gamma(mut self, lut: Vec<LutEntry>) -> Self {
        self.gamma_lut = Some(lut);
        self
    }

    /// Set the color transform matrix
    pub fn with_ctm(mut self, ctm: Ctm) -> Self {
        self.ctm = Some(ctm);
        self
    }

    /// Set the output format
    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = format;
        self
    }

    /// Request limited range output
    pub fn with_limited_range(mut self) -> Self {
        self.limited_color_range = true;
        self
    }

    /// Mark the pipe as scanning out C8 planes
    pub fn with_c8_planes(mut self) -> Self {
        self.c8_planes = true;
        self
    }

    /// Exactly a 256-entry gamma LUT, no degamma, no CTM
    pub fn is_legacy_gamma(&self) -> bool {
        self.degamma_lut.is_none()
            && self.ctm.is_none()
            && self
                .gamma_lut
                .as_ref()
                .is_some_and(|lut| lut.len() == LEGACY_LUT_LENGTH)
    }

    #[inline]
    pub fn has_degamma(&self) -> bool {
        self.degamma_lut.is_some()
    }

    #[inline]
    pub fn has_gamma(&self) -> bool {
        self.gamma_lut.is_some()
    }

    #[inline]
    pub fn has_ctm(&self) -> bool {
        self.ctm.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legacy_detection() {
        let lut = vec![LutEntry::default(); LEGACY_LUT_LENGTH];

        assert!(ColorConfig::new().with_gamma(lut.clone()).is_legacy_gamma());
        assert!(
            !ColorConfig::new()
                .with_gamma(lut.clone())
                .with_ctm(Ctm::identity())
                .is_legacy_gamma()
        );
        assert!(
            !ColorConfig::new()
                .with_gamma(lut.clone())
                .with_degamma(lut)
                .is_legacy_gamma()
        );
        assert!(
            !ColorConfig::new()
                .with_gamma(vec![LutEntry::default(); 257])
                .is_legacy_gamma()
        );
        assert!(!ColorConfig::new().is_legacy_gamma());
    }

    #[test]
    fn test_builder() {
        let cfg = ColorConfig::new()
            .with_output_format(OutputFormat::YCbCr444)
            .with_limited_range()
            .with_c8_planes();

        assert_eq!(cfg.output_format, OutputFormat::YCbCr444);
        assert!(cfg.limited_color_range);
        assert!(cfg.c8_planes);
        assert!(!cfg.has_gamma());
    }
}
