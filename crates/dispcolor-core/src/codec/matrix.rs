//! Encoded CSC matrices and their register packing

use super::CoeffFormat;
use super::ctm::decode_coeff;
use crate::types::{Ctm, CtmCoeff};

/// Sliding-window 1.0
const COEFF_1_0: u16 = 0x7800;
/// Sliding-window 219/255
const COEFF_LIMITED_RANGE: u16 = 0x0dc0;
/// 16/255 in the 12-bit post-offset domain
const POSTOFF_LIMITED_RANGE: u16 = (16 * (1 << 12) / 255) as u16;

/// Which coefficients saturated during encoding (bit i = coefficient i)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ClampMask(pub u16);

impl ClampMask {
    #[inline]
    pub fn set(&mut self, index: usize) {
        self.0 |= 1 << index;
    }

    #[inline]
    pub fn contains(&self, index: usize) -> bool {
        self.0 & (1 << index) != 0
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn count(&self) -> u32 {
        self.0.count_ones()
    }
}

/// Two 16-bit coefficients sharing one 32-bit register
///
/// Bits 31:16 hold `high`, bits 15:0 hold `low`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CoeffPair {
    pub high: u16,
    pub low: u16,
}

impl CoeffPair {
    #[inline]
    pub const fn new(high: u16, low: u16) -> Self {
        Self { high, low }
    }

    #[inline]
    pub const fn to_word(self) -> u32 {
        (self.high as u32) << 16 | self.low as u32
    }

    #[inline]
    pub const fn from_word(word: u32) -> Self {
        Self {
            high: (word >> 16) as u16,
            low: word as u16,
        }
    }
}

/// Hardware-format CSC program: coefficients plus offsets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodedMatrix {
    pub format: CoeffFormat,
    /// Row-major coefficient words
    pub coeffs: [u16; 9],
    /// Pre-offsets (hi, me, lo)
    pub preoff: [u16; 3],
    /// Post-offsets (hi, me, lo)
    pub postoff: [u16; 3],
    /// Coefficients that saturated during encoding
    pub clamped: ClampMask,
}

impl EncodedMatrix {
    const fn sliding(coeffs: [u16; 9], postoff: [u16; 3]) -> Self {
        Self {
            format: CoeffFormat::SlidingWindow,
            coeffs,
            preoff: [0; 3],
            postoff,
            clamped: ClampMask(0),
        }
    }

    /// Identity, zero offsets
    pub const IDENTITY: Self = Self::sliding(
        [COEFF_1_0, 0, 0, 0, COEFF_1_0, 0, 0, 0, COEFF_1_0],
        [0; 3],
    );

    /// Full range RGB to limited range RGB
    pub const LIMITED_RANGE: Self = Self::sliding(
        [
            COEFF_LIMITED_RANGE,
            0,
            0,
            0,
            COEFF_LIMITED_RANGE,
            0,
            0,
            0,
            COEFF_LIMITED_RANGE,
        ],
        [POSTOFF_LIMITED_RANGE; 3],
    );

    /// BT.709 full range RGB to limited range YCbCr
    pub const RGB_TO_YCBCR: Self = Self::sliding(
        [
            0x1e08, 0x9cc0, 0xb528, //
            0x2ba8, 0x09d8, 0x37e8, //
            0xbce8, 0x9ad8, 0x1e08,
        ],
        [0x0800, 0x0100, 0x0800],
    );

    /// Pipe CSC coefficient registers: RY_GY, BY, RU_GU, BU, RV_GV, BV
    ///
    /// Each row's first two coefficients share a register (first one high),
    /// the third sits alone in the high half of the next.
    pub fn pipe_csc_words(&self) -> [u32; 6] {
        let c = &self.coeffs;
        [
            CoeffPair::new(c[0], c[1]).to_word(),
            CoeffPair::new(c[2], 0).to_word(),
            CoeffPair::new(c[3], c[4]).to_word(),
            CoeffPair::new(c[5], 0).to_word(),
            CoeffPair::new(c[6], c[7]).to_word(),
            CoeffPair::new(c[8], 0).to_word(),
        ]
    }

    /// Inverse of [`pipe_csc_words`](Self::pipe_csc_words)
    pub fn from_pipe_csc_words(words: [u32; 6], preoff: [u16; 3], postoff: [u16; 3]) -> Self {
        let p = words.map(CoeffPair::from_word);
        Self {
            format: CoeffFormat::SlidingWindow,
            coeffs: [
                p[0].high, p[0].low, p[1].high, //
                p[2].high, p[2].low, p[3].high, //
                p[4].high, p[4].low, p[5].high,
            ],
            preoff,
            postoff,
            clamped: ClampMask::default(),
        }
    }

    /// CHV CGM coefficient registers: COEFF01, COEFF23, COEFF45, COEFF67, COEFF8
    ///
    /// Coefficients pair up in order with the lower index in the low half.
    pub fn cgm_csc_words(&self) -> [u32; 5] {
        let c = &self.coeffs;
        [
            CoeffPair::new(c[1], c[0]).to_word(),
            CoeffPair::new(c[3], c[2]).to_word(),
            CoeffPair::new(c[5], c[4]).to_word(),
            CoeffPair::new(c[7], c[6]).to_word(),
            CoeffPair::new(0, c[8]).to_word(),
        ]
    }

    /// Inverse of [`cgm_csc_words`](Self::cgm_csc_words)
    pub fn from_cgm_csc_words(words: [u32; 5]) -> Self {
        let p = words.map(CoeffPair::from_word);
        Self {
            format: CoeffFormat::S3Fixed12,
            coeffs: [
                p[0].low, p[0].high, p[1].low, p[1].high, p[2].low, p[2].high, p[3].low,
                p[3].high, p[4].low,
            ],
            preoff: [0; 3],
            postoff: [0; 3],
            clamped: ClampMask::default(),
        }
    }

    /// Decode the coefficients regardless of profile readback support
    pub fn to_ctm(&self) -> Option<Ctm> {
        let mut coeffs = [CtmCoeff::ZERO; 9];
        for (out, &word) in coeffs.iter_mut().zip(self.coeffs.iter()) {
            *out = decode_coeff(word, self.format)?;
        }
        Some(Ctm::new(coeffs))
    }
}
