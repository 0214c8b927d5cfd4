//! Topology Selection
//!
//! Decides which hardware color blocks a request turns on, in which order,
//! and at what precision. Every family keeps its rules in one function of
//! [`select`](select()) behind a `match` on [`Family`].
//!
//! # Pipeline shapes
//!
//! ```text
//! GMCH        palette (8-bit or 10.6) ─────────────────────────────► out
//! CHV         CGM degamma → CGM CSC → CGM gamma → pipe gamma ──────► out
//! ILK/SNB     [CSC] ↔ precision palette ───────────────────────────► out
//! IVB..SKL    split/10-bit palette ↔ pipe CSC ─────────────────────► out
//! GLK/CNL     degamma (tied to CSC) → pipe CSC → gamma ────────────► out
//! ICL+        pre-CSC degamma → pipe CSC → multi-segment gamma → output CSC
//! ```

mod preload;
mod select;

pub use preload::can_preload;
pub use select::select;

use crate::profile::{Family, Platform};
use crate::regs::{
    CGM_PIPE_MODE_GAMMA, CSC_POSITION_BEFORE_GAMMA, GAMMA_MODE_MODE_8BIT, GAMMA_MODE_MODE_10BIT,
    GAMMA_MODE_MODE_MASK,
};
use crate::types::OutputFormat;

/// Gamma table arrangement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TopologyKind {
    /// 8-bit palette (or gamma bypassed)
    Legacy,
    /// i965 10.6 interpolated palette
    Interpolated10p6,
    /// ILK/SNB 10-bit precision palette
    Precision10,
    /// Degamma and gamma sharing the precision palette
    Split,
    /// 10-bit precision palette behind the index register
    Indexed10,
    /// ICL+ 12.4 multi-segment gamma
    MultiSegment,
    /// CHV CGM unit active
    Cgm,
}

/// Where the degamma table comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DegammaSource {
    #[default]
    None,
    /// The requested degamma LUT
    User,
    /// Linear ramp, loaded because the CSC drags degamma along
    Identity,
}

/// What a CSC block gets programmed with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CscProgram {
    /// Left untouched
    #[default]
    None,
    /// The requested CTM, optionally pre-scaled for limited range output
    UserCtm { compress_limited: bool },
    /// BT.709 RGB to limited range YCbCr
    RgbToYcbcr,
    /// Full to limited range RGB
    LimitedRange,
    /// Pass-through, CSC enabled only for its coupled degamma
    Identity,
}

/// Selected color pipeline for one pipe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Topology {
    pub platform: Platform,
    pub family: Family,
    pub kind: TopologyKind,
    /// Pipe gamma enable (plane / bottom color control)
    pub gamma_enable: bool,
    /// Pipe CSC enable (plane / bottom color control)
    pub csc_enable: bool,
    /// GAMMA_MODE value (PIPECONF gamma field on pre-HSW)
    pub gamma_mode: u32,
    /// PIPE_CSC_MODE value
    pub csc_mode: u32,
    /// CGM_PIPE_MODE value (CHV only)
    pub cgm_mode: u32,
    pub degamma: DegammaSource,
    pub pipe_csc: CscProgram,
    /// ICL+ output CSC
    pub output_csc: CscProgram,

    pub has_degamma_lut: bool,
    pub has_gamma_lut: bool,
    pub has_ctm: bool,
    pub legacy_gamma: bool,
    pub output_format: OutputFormat,
    pub limited_color_range: bool,
    pub c8_planes: bool,
}

impl Topology {
    /// Bits of gamma precision a readback can be trusted to
    ///
    /// Derived from the selected mode values. 0 means the gamma state can
    /// not be compared (inactive, or not meaningful on this family).
    pub fn gamma_precision(&self) -> u32 {
        match self.family {
            Family::I9xx | Family::I965 => self.i9xx_precision(),
            Family::Cherryview => {
                if self.cgm_mode & CGM_PIPE_MODE_GAMMA != 0 {
                    10
                } else {
                    self.i9xx_precision()
                }
            }
            // Sandybridge gamma readback is not trusted
            Family::Ironlake if self.platform != Platform::Ironlake => 0,
            Family::Ironlake => {
                if self.csc_mode & CSC_POSITION_BEFORE_GAMMA == 0 {
                    0
                } else {
                    self.pch_precision()
                }
            }
            Family::Geminilake => self.pch_precision(),
            _ => 0,
        }
    }

    fn i9xx_precision(&self) -> u32 {
        if !self.gamma_enable {
            return 0;
        }
        match self.gamma_mode {
            GAMMA_MODE_MODE_8BIT => 8,
            GAMMA_MODE_MODE_10BIT => 16,
            _ => 0,
        }
    }

    fn pch_precision(&self) -> u32 {
        if !self.gamma_enable {
            return 0;
        }
        match self.gamma_mode {
            GAMMA_MODE_MODE_8BIT => 8,
            GAMMA_MODE_MODE_10BIT => 10,
            _ => 0,
        }
    }

    /// Gamma mode field without the ICL enable bits
    #[inline]
    pub fn gamma_mode_field(&self) -> u32 {
        self.gamma_mode & GAMMA_MODE_MODE_MASK
    }
}
