//! Color management registers
//!
//! Offsets are relative to the display MMIO block; platforms that relocate
//! the block (VLV/CHV) add their base in the register I/O layer.

use crate::types::Pipe;

// GAMMA_MODE
pub const GAMMA_MODE_MODE_8BIT: u32 = 0;
pub const GAMMA_MODE_MODE_10BIT: u32 = 1;
pub const GAMMA_MODE_MODE_12BIT: u32 = 2;
/// IVB-BDW split gamma; ICL reuses the value for 12-bit multi-segment
pub const GAMMA_MODE_MODE_SPLIT: u32 = 3;
pub const GAMMA_MODE_MODE_12BIT_MULTI_SEGMENTED: u32 = 3;
pub const GAMMA_MODE_MODE_MASK: u32 = 3;
pub const PRE_CSC_GAMMA_ENABLE: u32 = 1 << 31;
pub const POST_CSC_GAMMA_ENABLE: u32 = 1 << 30;

// PIPE_CSC_MODE
pub const CSC_BLACK_SCREEN_OFFSET: u32 = 1 << 2;
pub const CSC_POSITION_BEFORE_GAMMA: u32 = 1 << 1;
pub const CSC_MODE_YUV_TO_RGB: u32 = 1 << 0;
pub const ICL_CSC_ENABLE: u32 = 1 << 31;
pub const ICL_OUTPUT_CSC_ENABLE: u32 = 1 << 30;

// CGM_PIPE_MODE
pub const CGM_PIPE_MODE_GAMMA: u32 = 1 << 2;
pub const CGM_PIPE_MODE_CSC: u32 = 1 << 1;
pub const CGM_PIPE_MODE_DEGAMMA: u32 = 1 << 0;

// PREC_PAL_INDEX / PRE_CSC_GAMC_INDEX
pub const PAL_PREC_SPLIT_MODE: u32 = 1 << 31;
pub const PAL_PREC_AUTO_INCREMENT: u32 = 1 << 15;
pub const PAL_PREC_INDEX_MASK: u32 = 0x3ff;
pub const PRE_CSC_GAMC_AUTO_INCREMENT: u32 = 1 << 10;

#[inline]
pub const fn pal_prec_index_value(x: u32) -> u32 {
    x & PAL_PREC_INDEX_MASK
}

// PIPECONF
pub const PIPECONF_GAMMA_MODE_SHIFT: u32 = 24;
pub const PIPECONF_GAMMA_MODE_MASK_I9XX: u32 = 1 << 24;
pub const PIPECONF_GAMMA_MODE_MASK_ILK: u32 = 3 << 24;

#[inline]
pub const fn pipeconf_gamma_mode(mode: u32) -> u32 {
    mode << PIPECONF_GAMMA_MODE_SHIFT
}

// SKL_BOTTOM_COLOR
pub const SKL_BOTTOM_COLOR_GAMMA_ENABLE: u32 = 1 << 31;
pub const SKL_BOTTOM_COLOR_CSC_ENABLE: u32 = 1 << 30;

/// Registers of one CSC block (pipe or output)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CscReg {
    CoeffRyGy,
    CoeffBy,
    CoeffRuGu,
    CoeffBu,
    CoeffRvGv,
    CoeffBv,
    /// Pipe CSC only
    Mode,
    PreoffHi,
    PreoffMe,
    PreoffLo,
    PostoffHi,
    PostoffMe,
    PostoffLo,
}

impl CscReg {
    /// Coefficient registers in packing order
    pub const COEFFS: [CscReg; 6] = [
        Self::CoeffRyGy,
        Self::CoeffBy,
        Self::CoeffRuGu,
        Self::CoeffBu,
        Self::CoeffRvGv,
        Self::CoeffBv,
    ];
    pub const PREOFF: [CscReg; 3] = [Self::PreoffHi, Self::PreoffMe, Self::PreoffLo];
    pub const POSTOFF: [CscReg; 3] = [Self::PostoffHi, Self::PostoffMe, Self::PostoffLo];

    fn pipe_offset(self) -> u32 {
        match self {
            Self::CoeffRyGy => 0x00,
            Self::CoeffBy => 0x04,
            Self::CoeffRuGu => 0x08,
            Self::CoeffBu => 0x0c,
            Self::CoeffRvGv => 0x10,
            Self::CoeffBv => 0x14,
            Self::Mode => 0x18,
            Self::PreoffHi => 0x20,
            Self::PreoffMe => 0x24,
            Self::PreoffLo => 0x28,
            Self::PostoffHi => 0x30,
            Self::PostoffMe => 0x34,
            Self::PostoffLo => 0x38,
        }
    }

    /// Offset from the output CSC base; `Mode` is handled by [`Reg::offset`]
    fn output_offset(self) -> u32 {
        match self {
            Self::CoeffRyGy => 0x00,
            Self::CoeffBy => 0x04,
            Self::CoeffRuGu => 0x08,
            Self::CoeffBu => 0x0c,
            Self::CoeffRvGv => 0x10,
            Self::CoeffBv => 0x14,
            Self::Mode => 0x18,
            Self::PreoffHi => 0x18,
            Self::PreoffMe => 0x1c,
            Self::PreoffLo => 0x20,
            Self::PostoffHi => 0x24,
            Self::PostoffMe => 0x28,
            Self::PostoffLo => 0x2c,
        }
    }
}

/// A color management register on one pipe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Reg {
    /// GMCH legacy / 10.6 palette
    Palette { pipe: Pipe, index: u32 },
    /// PCH-split legacy palette
    LgcPalette { pipe: Pipe, index: u32 },
    /// ILK/SNB 10-bit palette
    PrecPalette { pipe: Pipe, index: u32 },
    PipeConf(Pipe),
    /// GMCH 10.6 last entry, per channel
    PipeGcMax { pipe: Pipe, channel: u32 },
    GammaMode(Pipe),
    SklBottomColor(Pipe),
    PrecPalIndex(Pipe),
    PrecPalData(Pipe),
    PrecPalGcMax { pipe: Pipe, channel: u32 },
    PrecPalExtGcMax { pipe: Pipe, channel: u32 },
    PrecPalExt2GcMax { pipe: Pipe, channel: u32 },
    PrecPalMultiSegIndex(Pipe),
    PrecPalMultiSegData(Pipe),
    PreCscGamcIndex(Pipe),
    PreCscGamcData(Pipe),
    PipeCsc(Pipe, CscReg),
    OutputCsc(Pipe, CscReg),
    /// CHV CGM CSC coefficient register 0..=4 (COEFF01 .. COEFF8)
    CgmCscCoeff { pipe: Pipe, index: u32 },
    CgmPipeMode(Pipe),
    /// CHV CGM degamma, `word` 0 = lower, 1 = upper
    CgmDegamma { pipe: Pipe, index: u32, word: u32 },
    CgmGamma { pipe: Pipe, index: u32, word: u32 },
}

impl Reg {
    /// MMIO offset within the display block
    pub fn offset(&self) -> u32 {
        match *self {
            Self::Palette { pipe, index } => 0xa000 + pipe.index() * 0x800 + index * 4,
            Self::LgcPalette { pipe, index } => 0x4a000 + pipe.index() * 0x800 + index * 4,
            Self::PrecPalette { pipe, index } => 0x4b000 + pipe.index() * 0x1000 + index * 4,
            Self::PipeConf(pipe) => 0x70008 + pipe.index() * 0x1000,
            Self::PipeGcMax { pipe, channel } => 0x70010 + pipe.index() * 0x1000 + channel * 4,
            Self::GammaMode(pipe) => 0x4a480 + pipe.index() * 0x800,
            Self::SklBottomColor(pipe) => 0x70034 + pipe.index() * 0x1000,
            Self::PrecPalIndex(pipe) => 0x4a400 + pipe.index() * 0x800,
            Self::PrecPalData(pipe) => 0x4a404 + pipe.index() * 0x800,
            Self::PrecPalMultiSegIndex(pipe) => 0x4a408 + pipe.index() * 0x800,
            Self::PrecPalMultiSegData(pipe) => 0x4a40c + pipe.index() * 0x800,
            Self::PrecPalGcMax { pipe, channel } => 0x4a410 + pipe.index() * 0x800 + channel * 4,
            Self::PrecPalExtGcMax { pipe, channel } => {
                0x4a420 + pipe.index() * 0x800 + channel * 4
            }
            Self::PrecPalExt2GcMax { pipe, channel } => {
                0x4a430 + pipe.index() * 0x800 + channel * 4
            }
            Self::PreCscGamcIndex(pipe) => 0x4a484 + pipe.index() * 0x800,
            Self::PreCscGamcData(pipe) => 0x4a488 + pipe.index() * 0x800,
            Self::PipeCsc(pipe, r) => 0x49010 + pipe.index() * 0x100 + r.pipe_offset(),
            // No mode register of its own: enabled through PIPE_CSC_MODE
            Self::OutputCsc(pipe, CscReg::Mode) => Self::PipeCsc(pipe, CscReg::Mode).offset(),
            Self::OutputCsc(pipe, r) => 0x49050 + pipe.index() * 0x100 + r.output_offset(),
            Self::CgmCscCoeff { pipe, index } => 0x67900 + pipe.index() * 0x2000 + index * 4,
            Self::CgmPipeMode(pipe) => 0x67a00 + pipe.index() * 0x2000,
            Self::CgmDegamma { pipe, index, word } => {
                0x66000 + pipe.index() * 0x2000 + index * 8 + word * 4
            }
            Self::CgmGamma { pipe, index, word } => {
                0x67000 + pipe.index() * 0x2000 + index * 8 + word * 4
            }
        }
    }

    /// Mode-select register latched as a whole by the hardware
    ///
    /// Writes to these must stay together with the rest of their topology
    /// change.
    pub fn is_single_buffered(&self) -> bool {
        matches!(
            self,
            Self::PipeConf(_)
                | Self::GammaMode(_)
                | Self::SklBottomColor(_)
                | Self::PipeCsc(_, CscReg::Mode)
                | Self::OutputCsc(_, CscReg::Mode)
                | Self::CgmPipeMode(_)
        )
    }

    /// Index register of an index/data pair
    pub fn is_index(&self) -> bool {
        matches!(
            self,
            Self::PrecPalIndex(_) | Self::PrecPalMultiSegIndex(_) | Self::PreCscGamcIndex(_)
        )
    }
}

/// One planned register access
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegWrite {
    pub reg: Reg,
    pub value: u32,
    /// Read-modify-write: only bits in the mask are replaced
    pub mask: Option<u32>,
}

impl RegWrite {
    #[inline]
    pub fn new(reg: Reg, value: u32) -> Self {
        Self {
            reg,
            value,
            mask: None,
        }
    }

    #[inline]
    pub fn rmw(reg: Reg, mask: u32, value: u32) -> Self {
        Self {
            reg,
            value,
            mask: Some(mask),
        }
    }

    /// Value to store given the register's current contents
    #[inline]
    pub fn apply(&self, current: u32) -> u32 {
        match self.mask {
            Some(mask) => (current & !mask) | (self.value & mask),
            None => self.value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipe_csc_offsets() {
        assert_eq!(Reg::PipeCsc(Pipe::A, CscReg::CoeffRyGy).offset(), 0x49010);
        assert_eq!(Reg::PipeCsc(Pipe::A, CscReg::Mode).offset(), 0x49028);
        assert_eq!(Reg::PipeCsc(Pipe::B, CscReg::PostoffLo).offset(), 0x49148);
        assert_eq!(Reg::OutputCsc(Pipe::A, CscReg::PreoffHi).offset(), 0x49068);
        assert_eq!(Reg::OutputCsc(Pipe::A, CscReg::PostoffLo).offset(), 0x4907c);
    }

    #[test]
    fn test_single_buffered() {
        assert!(Reg::CgmPipeMode(Pipe::C).is_single_buffered());
        assert!(Reg::PipeCsc(Pipe::A, CscReg::Mode).is_single_buffered());
        assert!(!Reg::PipeCsc(Pipe::A, CscReg::CoeffBy).is_single_buffered());
        assert!(!Reg::PrecPalData(Pipe::A).is_single_buffered());
    }

    #[test]
    fn test_rmw() {
        let w = RegWrite::rmw(
            Reg::PipeConf(Pipe::A),
            PIPECONF_GAMMA_MODE_MASK_ILK,
            pipeconf_gamma_mode(GAMMA_MODE_MODE_10BIT),
        );
        assert_eq!(w.apply(0x8000_0000 | 3 << 24), 0x8000_0000 | 1 << 24);
        assert_eq!(RegWrite::new(Reg::GammaMode(Pipe::A), 2).apply(0xffff), 2);
    }
}
