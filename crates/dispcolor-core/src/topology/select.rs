//! Per-family topology rules

use tracing::warn;

use super::{CscProgram, DegammaSource, Topology, TopologyKind};
use crate::config::ColorConfig;
use crate::error::ConfigError;
use crate::profile::{Family, HardwareProfile};
use crate::regs::{
    CGM_PIPE_MODE_CSC, CGM_PIPE_MODE_DEGAMMA, CGM_PIPE_MODE_GAMMA, CSC_BLACK_SCREEN_OFFSET,
    CSC_MODE_YUV_TO_RGB, CSC_POSITION_BEFORE_GAMMA, GAMMA_MODE_MODE_8BIT, GAMMA_MODE_MODE_10BIT,
    GAMMA_MODE_MODE_12BIT_MULTI_SEGMENTED, GAMMA_MODE_MODE_SPLIT, ICL_CSC_ENABLE,
    ICL_OUTPUT_CSC_ENABLE, POST_CSC_GAMMA_ENABLE, PRE_CSC_GAMMA_ENABLE,
};

/// Select the hardware topology for a validated request
///
/// Pure. A legacy gamma request always maps to the 8-bit palette; C8
/// planes accept nothing else; everything after that follows the family's
/// rules.
pub fn select(config: &ColorConfig, profile: &HardwareProfile) -> Result<Topology, ConfigError> {
    let legacy = config.is_legacy_gamma();

    let wants_color = config.has_degamma() || config.has_gamma() || config.has_ctm();
    if !legacy && config.c8_planes && wants_color {
        return Err(ConfigError::IncompatibleIndexedMode);
    }

    if config.has_ctm() && !profile.has_ctm() {
        return Err(ConfigError::UnsupportedCombination(format!(
            "CTM on {:?}",
            profile.platform
        )));
    }

    if !config.output_format.is_rgb() && profile.is_gmch() {
        return Err(ConfigError::UnsupportedCombination(format!(
            "{:?} output on {:?}",
            config.output_format, profile.platform
        )));
    }

    let mut t = Topology {
        platform: profile.platform,
        family: profile.family,
        kind: TopologyKind::Legacy,
        gamma_enable: false,
        csc_enable: false,
        gamma_mode: GAMMA_MODE_MODE_8BIT,
        csc_mode: 0,
        cgm_mode: 0,
        degamma: DegammaSource::None,
        pipe_csc: CscProgram::None,
        output_csc: CscProgram::None,
        has_degamma_lut: config.has_degamma(),
        has_gamma_lut: config.has_gamma(),
        has_ctm: config.has_ctm(),
        legacy_gamma: legacy,
        output_format: config.output_format,
        limited_color_range: config.limited_color_range,
        c8_planes: config.c8_planes,
    };

    match profile.family {
        Family::I9xx | Family::I965 => i9xx(&mut t),
        Family::Cherryview => chv(&mut t),
        Family::Ironlake => ilk(&mut t),
        Family::Ivybridge | Family::Haswell | Family::Broadwell | Family::Skylake => {
            ivb(&mut t, profile)
        }
        Family::Geminilake => glk(&mut t, profile),
        Family::Icelake => icl(&mut t),
    }

    Ok(t)
}

/// Full to limited range is done in the pipe CSC on this platform
fn csc_limited_range(t: &Topology, profile: &HardwareProfile) -> bool {
    // FIXME with a gamma LUT after the CSC the range compression would be
    // better done in the LUT
    t.limited_color_range && profile.limited_range_csc
}

fn legacy_or_10bit(t: &Topology) -> u32 {
    if !t.gamma_enable || t.legacy_gamma {
        GAMMA_MODE_MODE_8BIT
    } else {
        GAMMA_MODE_MODE_10BIT
    }
}

fn i9xx(t: &mut Topology) {
    t.gamma_enable = t.has_gamma_lut && !t.c8_planes;
    t.gamma_mode = legacy_or_10bit(t);
    if t.gamma_mode == GAMMA_MODE_MODE_10BIT {
        t.kind = TopologyKind::Interpolated10p6;
    }
}

// CHV: u0.10 -> CGM degamma -> u0.14 -> CGM csc -> u0.14 -> CGM gamma ->
// u0.10 -> WGC csc -> u0.10 -> pipe gamma -> u0.10. The WGC csc is always
// bypassed in favour of the CGM csc.
fn chv(t: &mut Topology) {
    // Pipe gamma only carries the legacy LUT
    t.gamma_enable = t.legacy_gamma && !t.c8_planes;
    t.gamma_mode = GAMMA_MODE_MODE_8BIT;

    if !t.legacy_gamma {
        if t.has_degamma_lut {
            t.cgm_mode |= CGM_PIPE_MODE_DEGAMMA;
            t.degamma = DegammaSource::User;
        }
        if t.has_ctm {
            t.cgm_mode |= CGM_PIPE_MODE_CSC;
            t.pipe_csc = CscProgram::UserCtm {
                compress_limited: false,
            };
        }
        if t.has_gamma_lut {
            t.cgm_mode |= CGM_PIPE_MODE_GAMMA;
        }
    }

    if t.cgm_mode != 0 {
        t.kind = TopologyKind::Cgm;
    }
}

fn ilk(t: &mut Topology) {
    t.gamma_enable = t.has_gamma_lut && !t.c8_planes;
    // No CTM here, and RGB limited range is handled outside the CSC
    t.csc_enable = !t.output_format.is_rgb();
    t.gamma_mode = legacy_or_10bit(t);

    // RGB->YCbCr puts the CSC after the LUT and needs the limited range
    // offsets on the output
    t.csc_mode = if t.output_format.is_rgb() {
        CSC_MODE_YUV_TO_RGB | CSC_POSITION_BEFORE_GAMMA
    } else {
        CSC_BLACK_SCREEN_OFFSET
    };

    t.pipe_csc = pipe_csc_program(t, false, false);
    if t.gamma_mode == GAMMA_MODE_MODE_10BIT {
        t.kind = TopologyKind::Precision10;
    }
}

fn ivb(t: &mut Topology, profile: &HardwareProfile) {
    let limited = csc_limited_range(t, profile);

    t.gamma_enable = (t.has_gamma_lut || t.has_degamma_lut) && !t.c8_planes;
    t.csc_enable = !t.output_format.is_rgb() || t.has_ctm || limited;

    t.gamma_mode = if !t.gamma_enable || t.legacy_gamma {
        GAMMA_MODE_MODE_8BIT
    } else if t.has_gamma_lut && t.has_degamma_lut {
        GAMMA_MODE_MODE_SPLIT
    } else {
        GAMMA_MODE_MODE_10BIT
    };

    // The CSC follows the LUT for degamma, RGB->YCbCr and range compression
    t.csc_mode = if t.has_degamma_lut || !t.output_format.is_rgb() || limited {
        0
    } else {
        CSC_POSITION_BEFORE_GAMMA
    };

    if t.has_degamma_lut {
        t.degamma = DegammaSource::User;
    }
    t.pipe_csc = pipe_csc_program(t, limited, false);
    t.kind = match t.gamma_mode {
        GAMMA_MODE_MODE_SPLIT => TopologyKind::Split,
        GAMMA_MODE_MODE_10BIT => TopologyKind::Indexed10,
        _ => TopologyKind::Legacy,
    };
}

fn glk(t: &mut Topology, profile: &HardwareProfile) {
    let limited = csc_limited_range(t, profile);

    t.gamma_enable = t.has_gamma_lut && !t.c8_planes;
    // Degamma is switched by the CSC enable on these parts
    t.csc_enable = t.has_degamma_lut
        || !t.output_format.is_rgb()
        || t.has_ctm
        || t.limited_color_range;
    t.gamma_mode = legacy_or_10bit(t);
    t.csc_mode = 0;

    // Always loaded, so enabling the CSC later never exposes a stale table
    t.degamma = if t.has_degamma_lut {
        DegammaSource::User
    } else {
        DegammaSource::Identity
    };
    t.pipe_csc = pipe_csc_program(t, limited, true);
    if t.gamma_mode == GAMMA_MODE_MODE_10BIT {
        t.kind = TopologyKind::Indexed10;
    }
}

fn icl(t: &mut Topology) {
    if t.has_degamma_lut {
        t.gamma_mode |= PRE_CSC_GAMMA_ENABLE;
        t.degamma = DegammaSource::User;
    }
    if t.has_gamma_lut && !t.c8_planes {
        t.gamma_mode |= POST_CSC_GAMMA_ENABLE;
    }
    if t.has_gamma_lut && !t.legacy_gamma {
        t.gamma_mode |= GAMMA_MODE_MODE_12BIT_MULTI_SEGMENTED;
        t.kind = TopologyKind::MultiSegment;
    }

    if t.has_ctm {
        t.csc_mode |= ICL_CSC_ENABLE;
        t.pipe_csc = CscProgram::UserCtm {
            compress_limited: false,
        };
    }

    if !t.output_format.is_rgb() {
        t.csc_mode |= ICL_OUTPUT_CSC_ENABLE;
        t.output_csc = CscProgram::RgbToYcbcr;
    } else if t.limited_color_range {
        t.csc_mode |= ICL_OUTPUT_CSC_ENABLE;
        t.output_csc = CscProgram::LimitedRange;
    }
}

/// Pipe CSC contents for ILK-style CSC programming
fn pipe_csc_program(t: &Topology, limited: bool, degamma_coupled: bool) -> CscProgram {
    if t.has_ctm {
        CscProgram::UserCtm {
            compress_limited: limited,
        }
    } else if !t.output_format.is_rgb() {
        CscProgram::RgbToYcbcr
    } else if limited {
        CscProgram::LimitedRange
    } else if t.csc_enable {
        if !degamma_coupled {
            warn!(family = ?t.family, "pipe CSC enabled with nothing to program");
        }
        CscProgram::Identity
    } else {
        CscProgram::None
    }
}
