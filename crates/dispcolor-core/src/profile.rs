//! Hardware Color Capability Profiles
//!
//! One static record per supported platform describing its color blocks:
//! LUT sizes, LUT data-quality tests, CSC coefficient format and which
//! generation family's rules apply.
//!
//! The table is a plain `static`, immutable for the lifetime of the process.
//! A capability-discovery collaborator can also build profiles at runtime
//! (or deserialize them with the `serde` feature) and pass them in.

use crate::codec::CoeffFormat;

/// Generation family: the dispatch tag every stage matches on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Family {
    /// Gen2/3 GMCH: legacy palette only
    I9xx,
    /// Gen4 and VLV GMCH: legacy or 10.6 interpolated palette
    I965,
    /// CHV: CGM degamma/CSC/gamma in front of the legacy pipe gamma
    Cherryview,
    /// ILK/SNB: precision palette, CSC only for YCbCr output
    Ironlake,
    /// IVB: split gamma, no index auto-increment
    Ivybridge,
    /// HSW: IVB LUTs with the standalone GAMMA_MODE register
    Haswell,
    /// BDW: index auto-increment works
    Broadwell,
    /// Gen9 (non-GLK): pipe bottom color carries gamma/CSC enables
    Skylake,
    /// GLK/CNL: degamma LUT tied to the pipe CSC enable
    Geminilake,
    /// Gen11+: multi-segment gamma and a separate output CSC
    Icelake,
}

impl Family {
    /// GMCH display engine (palette registers, no pipe CSC)
    pub fn is_gmch(&self) -> bool {
        matches!(self, Self::I9xx | Self::I965 | Self::Cherryview)
    }
}

/// Concrete platforms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Platform {
    I830,
    I915G,
    G33,
    Pineview,
    I965G,
    G4x,
    Valleyview,
    Cherryview,
    Ironlake,
    Sandybridge,
    Ivybridge,
    Haswell,
    Broadwell,
    Skylake,
    Kabylake,
    Geminilake,
    Cannonlake,
    Icelake,
    Tigerlake,
}

impl Platform {
    /// Every platform with a built-in profile
    pub const ALL: [Platform; 19] = [
        Self::I830,
        Self::I915G,
        Self::G33,
        Self::Pineview,
        Self::I965G,
        Self::G4x,
        Self::Valleyview,
        Self::Cherryview,
        Self::Ironlake,
        Self::Sandybridge,
        Self::Ivybridge,
        Self::Haswell,
        Self::Broadwell,
        Self::Skylake,
        Self::Kabylake,
        Self::Geminilake,
        Self::Cannonlake,
        Self::Icelake,
        Self::Tigerlake,
    ];
}

/// LUT data-quality tests a profile requires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LutTests {
    /// Red, green and blue must match in every entry
    pub equal_channels: bool,
    /// No channel may decrease between consecutive entries
    pub non_decreasing: bool,
}

impl LutTests {
    pub const NONE: Self = Self {
        equal_channels: false,
        non_decreasing: false,
    };

    pub const NON_DECREASING: Self = Self {
        equal_channels: false,
        non_decreasing: true,
    };

    pub const EQUAL_CHANNELS_NON_DECREASING: Self = Self {
        equal_channels: true,
        non_decreasing: true,
    };

    pub fn is_empty(&self) -> bool {
        !self.equal_channels && !self.non_decreasing
    }
}

/// What the hardware lets us read back for state verification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReadbackCaps {
    /// Gamma LUT can be reconstructed from the palette registers
    pub gamma: bool,
    /// CSC coefficients can be decoded back into a CTM
    pub ctm: bool,
}

/// Static color capabilities of one platform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HardwareProfile {
    pub platform: Platform,
    pub family: Family,
    /// Display generation number
    pub generation: u8,
    /// Degamma LUT entries userspace must supply (0 = no degamma)
    pub degamma_lut_size: usize,
    /// Gamma LUT entries userspace must supply (256 = legacy only)
    pub gamma_lut_size: usize,
    pub degamma_lut_tests: LutTests,
    pub gamma_lut_tests: LutTests,
    /// CSC coefficient format for user CTMs (`None` = CTM not exposed)
    pub ctm_format: Option<CoeffFormat>,
    /// Full to limited range compression is folded into the pipe CSC
    pub limited_range_csc: bool,
    /// Pipe CSC has post-offset registers
    pub csc_post_offsets: bool,
    /// Second extended GC max register set (inputs 3.0 and 7.0)
    pub ext2_gc_max: bool,
    pub readback: ReadbackCaps,
}

const fn profile(platform: Platform, family: Family, generation: u8) -> HardwareProfile {
    let base = HardwareProfile {
        platform,
        family,
        generation,
        degamma_lut_size: 0,
        gamma_lut_size: 256,
        degamma_lut_tests: LutTests::NONE,
        gamma_lut_tests: LutTests::NONE,
        ctm_format: None,
        limited_range_csc: false,
        csc_post_offsets: false,
        ext2_gc_max: false,
        readback: ReadbackCaps {
            gamma: false,
            ctm: false,
        },
    };

    match family {
        Family::I9xx => HardwareProfile {
            readback: ReadbackCaps {
                gamma: true,
                ctm: false,
            },
            ..base
        },
        Family::I965 => HardwareProfile {
            gamma_lut_size: 129,
            gamma_lut_tests: LutTests::NON_DECREASING,
            readback: ReadbackCaps {
                gamma: true,
                ctm: false,
            },
            ..base
        },
        Family::Cherryview => HardwareProfile {
            degamma_lut_size: 65,
            gamma_lut_size: 257,
            degamma_lut_tests: LutTests::NON_DECREASING,
            gamma_lut_tests: LutTests::NON_DECREASING,
            ctm_format: Some(CoeffFormat::S3Fixed12),
            readback: ReadbackCaps {
                gamma: true,
                ctm: true,
            },
            ..base
        },
        Family::Ironlake => HardwareProfile {
            gamma_lut_size: 1024,
            readback: ReadbackCaps {
                gamma: true,
                ctm: false,
            },
            ..base
        },
        Family::Ivybridge | Family::Haswell => HardwareProfile {
            degamma_lut_size: 1024,
            gamma_lut_size: 1024,
            ctm_format: Some(CoeffFormat::SlidingWindow),
            limited_range_csc: matches!(family, Family::Haswell),
            csc_post_offsets: true,
            readback: ReadbackCaps {
                gamma: false,
                ctm: true,
            },
            ..base
        },
        Family::Broadwell | Family::Skylake => HardwareProfile {
            degamma_lut_size: 512,
            gamma_lut_size: 512,
            ctm_format: Some(CoeffFormat::SlidingWindow),
            limited_range_csc: true,
            csc_post_offsets: true,
            readback: ReadbackCaps {
                gamma: false,
                ctm: true,
            },
            ..base
        },
        Family::Geminilake => HardwareProfile {
            degamma_lut_size: 33,
            gamma_lut_size: 1024,
            degamma_lut_tests: LutTests::EQUAL_CHANNELS_NON_DECREASING,
            ctm_format: Some(CoeffFormat::SlidingWindow),
            limited_range_csc: true,
            csc_post_offsets: true,
            ext2_gc_max: true,
            readback: ReadbackCaps {
                gamma: true,
                ctm: true,
            },
            ..base
        },
        Family::Icelake => HardwareProfile {
            degamma_lut_size: 33,
            gamma_lut_size: 262145,
            degamma_lut_tests: LutTests::EQUAL_CHANNELS_NON_DECREASING,
            gamma_lut_tests: LutTests::NON_DECREASING,
            ctm_format: Some(CoeffFormat::SlidingWindow),
            csc_post_offsets: true,
            ext2_gc_max: true,
            readback: ReadbackCaps {
                gamma: false,
                ctm: true,
            },
            ..base
        },
    }
}

static PROFILES: [HardwareProfile; 19] = [
    profile(Platform::I830, Family::I9xx, 2),
    profile(Platform::I915G, Family::I9xx, 3),
    profile(Platform::G33, Family::I9xx, 3),
    profile(Platform::Pineview, Family::I9xx, 3),
    profile(Platform::I965G, Family::I965, 4),
    profile(Platform::G4x, Family::I965, 4),
    profile(Platform::Valleyview, Family::I965, 7),
    profile(Platform::Cherryview, Family::Cherryview, 8),
    profile(Platform::Ironlake, Family::Ironlake, 5),
    profile(Platform::Sandybridge, Family::Ironlake, 6),
    profile(Platform::Ivybridge, Family::Ivybridge, 7),
    profile(Platform::Haswell, Family::Haswell, 7),
    profile(Platform::Broadwell, Family::Broadwell, 8),
    profile(Platform::Skylake, Family::Skylake, 9),
    profile(Platform::Kabylake, Family::Skylake, 9),
    profile(Platform::Geminilake, Family::Geminilake, 9),
    profile(Platform::Cannonlake, Family::Geminilake, 10),
    profile(Platform::Icelake, Family::Icelake, 11),
    profile(Platform::Tigerlake, Family::Icelake, 12),
];

impl HardwareProfile {
    /// Built-in profile for a platform
    pub fn for_platform(platform: Platform) -> &'static HardwareProfile {
        // Table order follows Platform::ALL
        let idx = Platform::ALL
            .iter()
            .position(|&p| p == platform)
            .unwrap_or_default();
        &PROFILES[idx]
    }

    /// All built-in profiles
    pub fn all() -> &'static [HardwareProfile] {
        &PROFILES
    }

    /// Userspace may supply a CTM
    pub fn has_ctm(&self) -> bool {
        self.ctm_format.is_some()
    }

    /// Userspace may supply a degamma LUT
    pub fn has_degamma(&self) -> bool {
        self.degamma_lut_size != 0
    }

    /// GMCH display engine
    pub fn is_gmch(&self) -> bool {
        self.family.is_gmch()
    }
}
