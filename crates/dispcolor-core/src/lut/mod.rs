//! LUT Transcoder
//!
//! Packs canonical 16-bit-per-channel LUTs into the table layouts of each
//! palette generation and unpacks them again for readback.
//!
//! # Shapes
//!
//! | Shape | Hardware entries | Words |
//! |-------|------------------|-------|
//! | `Legacy8` | 256 | 256 × 8:8:8 |
//! | `Interpolated10p6` | n | (n-1) × (low, high) + GC max |
//! | `Precision10` | n | n × 10:10:10 |
//! | `Indexed10` | 512 / 1024 | hw_size × 10:10:10, resampled |
//! | `MultiSegment12p4` | 9 + 256 + 256 + 1 | pairs + GC max |
//! | `DegammaSingleChannel` | n | one 16-bit value per entry, padded to 35 words |
//! | `CgmDegamma14` / `CgmGamma10` | n | n × (lower, upper) |
//!
//! Encoding never looks at hardware and never fails: entries are picked
//! with clamped indices, so a short input repeats its last entry.

pub mod packing;

use packing::{CgmWords, Rgb8Word, Rgb10Word, Rgb12p4Low};

use crate::types::LutEntry;

/// Hardware entries in the GLK+ pre-CSC degamma table (33 + two extended)
pub const DEGAMMA_HW_ENTRIES: usize = 35;

/// Value written to degamma padding and extended GC max registers (1.0)
pub const UNITY_U16_16: u32 = 1 << 16;

/// 12.4 multi-segment layout
pub const SUPERFINE_ENTRIES: usize = 9;
pub const FINE_ENTRIES: usize = 256;
pub const COARSE_ENTRIES: usize = 256;
const FINE_STEP: usize = 8;
const COARSE_STEP: usize = 8 * 128;
/// Source entry carried in GC max
pub const MULTI_SEGMENT_LAST: usize = 256 * 8 * 128;

/// Hardware table layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LutShape {
    /// 256-entry 8-bit palette, channels truncated
    Legacy8,
    /// i965 10.6 interpolated palette
    Interpolated10p6 { entries: usize },
    /// ILK/SNB 10-bit precision palette, one word per entry
    Precision10 { entries: usize },
    /// IVB+ precision palette behind an index register
    ///
    /// In split mode each half holds 512 entries, degamma starting at
    /// index 0 and gamma at 512.
    Indexed10 {
        hw_size: usize,
        start: u32,
        split: bool,
    },
    /// ICL+ 12.4 superfine/fine/coarse gamma
    MultiSegment12p4,
    /// GLK+ pre-CSC degamma, single channel
    DegammaSingleChannel { entries: usize },
    /// CHV CGM degamma, 14 bits
    CgmDegamma14 { entries: usize },
    /// CHV CGM gamma, 10 bits
    CgmGamma10 { entries: usize },
}

impl LutShape {
    /// Full 1024-entry table starting at index 0
    pub const fn indexed10() -> Self {
        Self::Indexed10 {
            hw_size: 1024,
            start: 0,
            split: false,
        }
    }

    /// Lower split half (degamma)
    pub const fn split_lower() -> Self {
        Self::Indexed10 {
            hw_size: 512,
            start: 0,
            split: true,
        }
    }

    /// Upper split half (gamma)
    pub const fn split_upper() -> Self {
        Self::Indexed10 {
            hw_size: 512,
            start: 512,
            split: true,
        }
    }

    /// LUT entries the table represents
    ///
    /// This is the length `decode_lut` returns. Clamp padding written after
    /// the table (the two extra degamma words) is not counted.
    pub fn hw_entries(&self) -> usize {
        match *self {
            Self::Legacy8 => 256,
            Self::Interpolated10p6 { entries }
            | Self::Precision10 { entries }
            | Self::CgmDegamma14 { entries }
            | Self::CgmGamma10 { entries } => entries,
            Self::Indexed10 { hw_size, .. } => hw_size,
            Self::MultiSegment12p4 => SUPERFINE_ENTRIES + FINE_ENTRIES + COARSE_ENTRIES + 1,
            Self::DegammaSingleChannel { entries } => entries,
        }
    }

    /// One half of a split precision palette
    pub fn is_split(&self) -> bool {
        matches!(self, Self::Indexed10 { split: true, .. })
    }

    /// Index register value the table load starts from
    pub fn start_index(&self) -> u32 {
        match *self {
            Self::Indexed10 { start, .. } => start,
            _ => 0,
        }
    }

    /// Bits of precision a readback of this shape keeps
    pub fn precision_bits(&self) -> u32 {
        match self {
            Self::Legacy8 => 8,
            Self::Interpolated10p6 { .. } | Self::DegammaSingleChannel { .. } => 16,
            Self::Precision10 { .. }
            | Self::Indexed10 { .. }
            | Self::CgmGamma10 { .. } => 10,
            Self::CgmDegamma14 { .. } => 14,
            Self::MultiSegment12p4 => 16,
        }
    }
}

/// A LUT packed for one hardware table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedLut {
    pub shape: LutShape,
    /// Data words in write order
    pub words: Vec<u32>,
    /// Multi-segment superfine words (written through their own index)
    pub superfine: Vec<u32>,
    /// Per-channel value for the GC max registers
    pub gc_max: Option<[u32; 3]>,
}

impl EncodedLut {
    /// Hardware entries covered, independent of the source LUT length
    pub fn len(&self) -> usize {
        self.shape.hw_entries()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn start_index(&self) -> u32 {
        self.shape.start_index()
    }
}

/// Entry at `index`, repeating the last entry past the end
#[inline]
fn entry_at(lut: &[LutEntry], index: usize) -> LutEntry {
    lut.get(index)
        .or_else(|| lut.last())
        .copied()
        .unwrap_or_default()
}

/// Source index for hardware entry `i` when resampling to `hw_size`
///
/// Floor division: `i * (lut_size - 1) / (hw_size - 1)`. Split mode drops
/// roughly every other source entry this way.
#[inline]
pub fn resample_index(i: usize, lut_size: usize, hw_size: usize) -> usize {
    if hw_size < 2 || lut_size == 0 {
        return 0;
    }
    i * (lut_size - 1) / (hw_size - 1)
}

fn raw_gc_max(e: &LutEntry) -> [u32; 3] {
    [u32::from(e.red), u32::from(e.green), u32::from(e.blue)]
}

/// Pack a LUT into a hardware table layout
pub fn encode_lut(lut: &[LutEntry], shape: LutShape) -> EncodedLut {
    let mut superfine = Vec::new();
    let mut gc_max = None;

    let words = match shape {
        LutShape::Legacy8 => (0..256)
            .map(|i| Rgb8Word::truncate(&entry_at(lut, i)).to_word())
            .collect(),

        LutShape::Interpolated10p6 { entries } => {
            let last = entries.saturating_sub(1);
            let mut words = Vec::with_capacity(last * 2);
            for i in 0..last {
                let e = entry_at(lut, i);
                words.push(Rgb8Word::low_bytes(&e).to_word());
                words.push(Rgb8Word::truncate(&e).to_word());
            }
            gc_max = Some(raw_gc_max(&entry_at(lut, last)));
            words
        }

        LutShape::Precision10 { entries } => (0..entries)
            .map(|i| Rgb10Word::round(&entry_at(lut, i)).to_word())
            .collect(),

        LutShape::Indexed10 { hw_size, .. } => (0..hw_size)
            .map(|i| {
                let e = entry_at(lut, resample_index(i, lut.len(), hw_size));
                Rgb10Word::round(&e).to_word()
            })
            .collect(),

        LutShape::MultiSegment12p4 => {
            let pair = |e: LutEntry| {
                [
                    Rgb12p4Low::low_bits(&e).to_word(),
                    Rgb10Word::high_bits(&e).to_word(),
                ]
            };

            superfine = (0..SUPERFINE_ENTRIES)
                .flat_map(|i| pair(entry_at(lut, i)))
                .collect();

            // Fine index 0 is unused by the hardware, so the table starts at 1
            let fine = (1..=FINE_ENTRIES).map(|i| i * FINE_STEP);
            let coarse = (0..COARSE_ENTRIES).map(|i| i * COARSE_STEP);
            let words = fine
                .chain(coarse)
                .flat_map(|idx| pair(entry_at(lut, idx)))
                .collect();

            gc_max = Some(raw_gc_max(&entry_at(lut, MULTI_SEGMENT_LAST)));
            words
        }

        LutShape::DegammaSingleChannel { entries } => {
            // One channel only: red and blue are assumed equal to green
            let mut words: Vec<u32> = (0..entries)
                .map(|i| u32::from(entry_at(lut, i).green))
                .collect();
            words.resize(DEGAMMA_HW_ENTRIES.max(entries), UNITY_U16_16);
            words
        }

        LutShape::CgmDegamma14 { entries } => cgm_words(lut, entries, 14),
        LutShape::CgmGamma10 { entries } => cgm_words(lut, entries, 10),
    };

    EncodedLut {
        shape,
        words,
        superfine,
        gc_max,
    }
}

fn cgm_words(lut: &[LutEntry], entries: usize, bits: u32) -> Vec<u32> {
    let mut words = Vec::with_capacity(entries * 2);
    for i in 0..entries {
        let (ldw, udw) = CgmWords::round(&entry_at(lut, i), bits).to_words(bits);
        words.push(ldw);
        words.push(udw);
    }
    words
}

/// Linear degamma ramp for GLK+ when the CSC is on without a user degamma
///
/// Entry `i` is `(i << 16) / (entries - 1)`, so the last entry is exactly
/// 1.0 (0x10000), one past what a 16-bit LUT entry can carry.
pub fn identity_degamma(entries: usize) -> EncodedLut {
    let div = entries.saturating_sub(1).max(1) as u32;
    let mut words: Vec<u32> = (0..entries as u32).map(|i| (i << 16) / div).collect();
    words.resize(DEGAMMA_HW_ENTRIES.max(entries), UNITY_U16_16);

    EncodedLut {
        shape: LutShape::DegammaSingleChannel { entries },
        words,
        superfine: Vec::new(),
        gc_max: None,
    }
}

/// Unpack hardware table words into a canonical LUT
///
/// The result has the hardware's entry count. Multi-segment tables are not
/// decoded (`None`), nor are word slices too short for the shape.
pub fn decode_lut(
    words: &[u32],
    gc_max: Option<[u32; 3]>,
    shape: LutShape,
) -> Option<Vec<LutEntry>> {
    match shape {
        LutShape::Legacy8 => {
            let words = words.get(..256)?;
            Some(
                words
                    .iter()
                    .map(|&w| {
                        let c = Rgb8Word::from_word(w);
                        LutEntry::new(
                            packing::pack(u32::from(c.red), 8),
                            packing::pack(u32::from(c.green), 8),
                            packing::pack(u32::from(c.blue), 8),
                        )
                    })
                    .collect(),
            )
        }

        LutShape::Interpolated10p6 { entries } => {
            let last = entries.checked_sub(1)?;
            let words = words.get(..last * 2)?;
            let max = gc_max?;
            let mut lut: Vec<LutEntry> = words
                .chunks_exact(2)
                .map(|pair| {
                    let lo = Rgb8Word::from_word(pair[0]);
                    let hi = Rgb8Word::from_word(pair[1]);
                    LutEntry::new(
                        u16::from(hi.red) << 8 | u16::from(lo.red),
                        u16::from(hi.green) << 8 | u16::from(lo.green),
                        u16::from(hi.blue) << 8 | u16::from(lo.blue),
                    )
                })
                .collect();
            lut.push(LutEntry::new(
                max[0].min(0xffff) as u16,
                max[1].min(0xffff) as u16,
                max[2].min(0xffff) as u16,
            ));
            Some(lut)
        }

        LutShape::Precision10 { entries } => Some(
            words
                .get(..entries)?
                .iter()
                .map(|&w| Rgb10Word::from_word(w).to_entry())
                .collect(),
        ),

        LutShape::Indexed10 { hw_size, .. } => Some(
            words
                .get(..hw_size)?
                .iter()
                .map(|&w| Rgb10Word::from_word(w).to_entry())
                .collect(),
        ),

        LutShape::MultiSegment12p4 => None,

        LutShape::DegammaSingleChannel { entries } => Some(
            words
                .get(..entries)?
                .iter()
                .map(|&w| LutEntry::gray(w.min(0xffff) as u16))
                .collect(),
        ),

        LutShape::CgmDegamma14 { entries } => decode_cgm(words, entries, 14),
        LutShape::CgmGamma10 { entries } => decode_cgm(words, entries, 10),
    }
}

fn decode_cgm(words: &[u32], entries: usize, bits: u32) -> Option<Vec<LutEntry>> {
    Some(
        words
            .get(..entries * 2)?
            .chunks_exact(2)
            .map(|pair| CgmWords::from_words(pair[0], pair[1], bits).to_entry(bits))
            .collect(),
    )
}
