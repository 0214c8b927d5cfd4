//! Palette register word layouts
//!
//! Each struct mirrors one hardware data word. Channel values are stored
//! already reduced to the field width; `to_word` masks anyway.

use crate::types::LutEntry;

/// Round a 16-bit channel to `bits` of precision, clamped to the field max
#[inline]
pub fn extract(value: u16, bits: u32) -> u32 {
    let max = 0xffff >> (16 - bits);
    let mut v = u32::from(value);
    if bits < 16 {
        v += 1 << (16 - bits - 1);
        v >>= 16 - bits;
    }
    v.min(max)
}

/// Widen a `bits`-wide hardware value back to a 16-bit channel
#[inline]
pub fn pack(value: u32, bits: u32) -> u16 {
    let max = 0xffff >> (16 - bits);
    let v = value.min(max);
    (v << (16 - bits)) as u16
}

/// Legacy palette word: red 23:16, green 15:8, blue 7:0
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgb8Word {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl Rgb8Word {
    /// Keep the high byte of each channel
    pub fn truncate(e: &LutEntry) -> Self {
        Self {
            red: (e.red >> 8) as u8,
            green: (e.green >> 8) as u8,
            blue: (e.blue >> 8) as u8,
        }
    }

    /// Low byte of each channel (10.6 even word)
    pub fn low_bytes(e: &LutEntry) -> Self {
        Self {
            red: e.red as u8,
            green: e.green as u8,
            blue: e.blue as u8,
        }
    }

    #[inline]
    pub fn to_word(self) -> u32 {
        u32::from(self.red) << 16 | u32::from(self.green) << 8 | u32::from(self.blue)
    }

    #[inline]
    pub fn from_word(word: u32) -> Self {
        Self {
            red: (word >> 16) as u8,
            green: (word >> 8) as u8,
            blue: word as u8,
        }
    }
}

/// Precision palette word: red 29:20, green 19:10, blue 9:0
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgb10Word {
    pub red: u16,
    pub green: u16,
    pub blue: u16,
}

impl Rgb10Word {
    const MASK: u32 = 0x3ff;

    /// Round each channel to 10 bits
    pub fn round(e: &LutEntry) -> Self {
        Self {
            red: extract(e.red, 10) as u16,
            green: extract(e.green, 10) as u16,
            blue: extract(e.blue, 10) as u16,
        }
    }

    /// High 10 bits of each channel (12.4 upper word)
    pub fn high_bits(e: &LutEntry) -> Self {
        Self {
            red: e.red >> 6,
            green: e.green >> 6,
            blue: e.blue >> 6,
        }
    }

    #[inline]
    pub fn to_word(self) -> u32 {
        (u32::from(self.red) & Self::MASK) << 20
            | (u32::from(self.green) & Self::MASK) << 10
            | (u32::from(self.blue) & Self::MASK)
    }

    #[inline]
    pub fn from_word(word: u32) -> Self {
        Self {
            red: ((word >> 20) & Self::MASK) as u16,
            green: ((word >> 10) & Self::MASK) as u16,
            blue: (word & Self::MASK) as u16,
        }
    }

    /// Expand to a 16-bit entry
    pub fn to_entry(self) -> LutEntry {
        LutEntry::new(
            pack(u32::from(self.red), 10),
            pack(u32::from(self.green), 10),
            pack(u32::from(self.blue), 10),
        )
    }
}

/// 12.4 lower word, low 6 bits per channel: red 29:24, green 19:14, blue 9:4
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgb12p4Low {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl Rgb12p4Low {
    pub fn low_bits(e: &LutEntry) -> Self {
        Self {
            red: (e.red & 0x3f) as u8,
            green: (e.green & 0x3f) as u8,
            blue: (e.blue & 0x3f) as u8,
        }
    }

    #[inline]
    pub fn to_word(self) -> u32 {
        (u32::from(self.red) & 0x3f) << 24
            | (u32::from(self.green) & 0x3f) << 14
            | (u32::from(self.blue) & 0x3f) << 4
    }

    #[inline]
    pub fn from_word(word: u32) -> Self {
        Self {
            red: ((word >> 24) & 0x3f) as u8,
            green: ((word >> 14) & 0x3f) as u8,
            blue: ((word >> 4) & 0x3f) as u8,
        }
    }
}

/// CHV CGM entry split over two words
///
/// Lower word: green 29:16, blue 13:0. Upper word: red 13:0. Field width
/// is 14 bits for degamma and 10 bits for gamma.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CgmWords {
    pub red: u16,
    pub green: u16,
    pub blue: u16,
}

impl CgmWords {
    pub fn round(e: &LutEntry, bits: u32) -> Self {
        Self {
            red: extract(e.red, bits) as u16,
            green: extract(e.green, bits) as u16,
            blue: extract(e.blue, bits) as u16,
        }
    }

    /// (lower, upper)
    pub fn to_words(self, bits: u32) -> (u32, u32) {
        let mask = (1u32 << bits) - 1;
        (
            (u32::from(self.green) & mask) << 16 | (u32::from(self.blue) & mask),
            u32::from(self.red) & mask,
        )
    }

    pub fn from_words(ldw: u32, udw: u32, bits: u32) -> Self {
        let mask = (1u32 << bits) - 1;
        Self {
            red: (udw & mask) as u16,
            green: ((ldw >> 16) & mask) as u16,
            blue: (ldw & mask) as u16,
        }
    }

    pub fn to_entry(self, bits: u32) -> LutEntry {
        LutEntry::new(
            pack(u32::from(self.red), bits),
            pack(u32::from(self.green), bits),
            pack(u32::from(self.blue), bits),
        )
    }
}
