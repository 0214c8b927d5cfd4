//! Hardware State Readback
//!
//! Reconstructs the canonical color configuration from the registers of a
//! pipe so state verification can compare it against what was requested.
//!
//! Only what the hardware can give back is reconstructed: gamma on the
//! families with readable palettes, and the CTM when the pipe CSC holds an
//! uncompressed user matrix. Degamma tables are never read back.

mod equal;

pub use equal::{approx_equal, lut_equal, tolerance};

use tracing::debug;

use crate::codec::{EncodedMatrix, decode_ctm, encode_ctm_for};
use crate::commit::RegisterIo;
use crate::config::ColorConfig;
use crate::error::{Error, Result};
use crate::lut::{LutShape, decode_lut};
use crate::profile::{Family, HardwareProfile};
use crate::regs::{
    CGM_PIPE_MODE_GAMMA, CscReg, GAMMA_MODE_MODE_8BIT, PAL_PREC_AUTO_INCREMENT, Reg,
};
use crate::topology::{CscProgram, Topology};
use crate::types::{Ctm, LutEntry, Pipe};

fn read_words(io: &mut impl RegisterIo, n: usize, reg: impl Fn(u32) -> Reg) -> Result<Vec<u32>> {
    (0..n as u32)
        .map(|i| io.read(reg(i)).map_err(Error::from))
        .collect()
}

fn read_gc_max(io: &mut impl RegisterIo, reg: impl Fn(u32) -> Reg) -> Result<[u32; 3]> {
    Ok([io.read(reg(0))?, io.read(reg(1))?, io.read(reg(2))?])
}

fn read_legacy(
    io: &mut impl RegisterIo,
    reg: impl Fn(u32) -> Reg,
) -> Result<Option<Vec<LutEntry>>> {
    let words = read_words(io, 256, reg)?;
    Ok(decode_lut(&words, None, LutShape::Legacy8))
}

fn i965_read_gamma(
    profile: &HardwareProfile,
    pipe: Pipe,
    t: &Topology,
    io: &mut impl RegisterIo,
) -> Result<Option<Vec<LutEntry>>> {
    let palette = |index| Reg::Palette { pipe, index };

    if t.gamma_mode_field() == GAMMA_MODE_MODE_8BIT {
        return read_legacy(io, palette);
    }

    let entries = profile.gamma_lut_size;
    let words = read_words(io, entries.saturating_sub(1) * 2, palette)?;
    let max = read_gc_max(io, |channel| Reg::PipeGcMax { pipe, channel })?;
    Ok(decode_lut(
        &words,
        Some(max),
        LutShape::Interpolated10p6 { entries },
    ))
}

fn read_gamma(
    profile: &HardwareProfile,
    pipe: Pipe,
    t: &Topology,
    io: &mut impl RegisterIo,
) -> Result<Option<Vec<LutEntry>>> {
    // Zero precision covers a disabled pipe gamma, ILK's CSC-after-gamma,
    // Sandybridge and every mode that can not be compared anyway
    if !profile.readback.gamma || t.gamma_precision() == 0 {
        return Ok(None);
    }

    let legacy = t.gamma_mode_field() == GAMMA_MODE_MODE_8BIT;

    match profile.family {
        Family::I9xx => read_legacy(io, |index| Reg::Palette { pipe, index }),
        Family::I965 => i965_read_gamma(profile, pipe, t, io),
        Family::Cherryview => {
            if t.cgm_mode & CGM_PIPE_MODE_GAMMA == 0 {
                return i965_read_gamma(profile, pipe, t, io);
            }
            let entries = profile.gamma_lut_size;
            let words = read_words(io, entries * 2, |i| Reg::CgmGamma {
                pipe,
                index: i / 2,
                word: i % 2,
            })?;
            Ok(decode_lut(&words, None, LutShape::CgmGamma10 { entries }))
        }
        Family::Ironlake => {
            if legacy {
                return read_legacy(io, |index| Reg::LgcPalette { pipe, index });
            }
            let entries = profile.gamma_lut_size;
            let words = read_words(io, entries, |index| Reg::PrecPalette { pipe, index })?;
            Ok(decode_lut(&words, None, LutShape::Precision10 { entries }))
        }
        Family::Geminilake => {
            if legacy {
                return read_legacy(io, |index| Reg::LgcPalette { pipe, index });
            }
            let shape = LutShape::indexed10();
            io.write(Reg::PrecPalIndex(pipe), PAL_PREC_AUTO_INCREMENT)?;
            let words = read_words(io, shape.hw_entries(), |_| Reg::PrecPalData(pipe))?;
            io.write(Reg::PrecPalIndex(pipe), 0)?;
            Ok(decode_lut(&words, None, shape))
        }
        _ => Ok(None),
    }
}

fn read_ctm(
    profile: &HardwareProfile,
    pipe: Pipe,
    t: &Topology,
    io: &mut impl RegisterIo,
) -> Result<Option<Ctm>> {
    let uncompressed = t.pipe_csc
        == CscProgram::UserCtm {
            compress_limited: false,
        };
    if !profile.readback.ctm || !uncompressed {
        return Ok(None);
    }

    let encoded = if profile.family == Family::Cherryview {
        let mut words = [0; 5];
        for (index, w) in (0u32..).zip(words.iter_mut()) {
            *w = io.read(Reg::CgmCscCoeff { pipe, index })?;
        }
        EncodedMatrix::from_cgm_csc_words(words)
    } else {
        let mut words = [0; 6];
        for (r, w) in CscReg::COEFFS.iter().zip(words.iter_mut()) {
            *w = io.read(Reg::PipeCsc(pipe, *r))?;
        }
        let mut preoff = [0u16; 3];
        for (r, v) in CscReg::PREOFF.iter().zip(preoff.iter_mut()) {
            *v = io.read(Reg::PipeCsc(pipe, *r))? as u16;
        }
        let mut postoff = [0u16; 3];
        if profile.csc_post_offsets {
            for (r, v) in CscReg::POSTOFF.iter().zip(postoff.iter_mut()) {
                *v = io.read(Reg::PipeCsc(pipe, *r))? as u16;
            }
        }
        EncodedMatrix::from_pipe_csc_words(words, preoff, postoff)
    };

    Ok(decode_ctm(&encoded, profile))
}

/// Rebuild the canonical configuration currently programmed on a pipe
///
/// `topology` describes the mode registers as found on the hardware. The
/// output format, range and C8 facts are taken from it unchanged.
pub fn read_back(
    profile: &HardwareProfile,
    pipe: Pipe,
    topology: &Topology,
    io: &mut impl RegisterIo,
) -> Result<ColorConfig> {
    let gamma_lut = read_gamma(profile, pipe, topology, io)?;
    let ctm = read_ctm(profile, pipe, topology, io)?;

    Ok(ColorConfig {
        degamma_lut: None,
        gamma_lut,
        ctm,
        output_format: topology.output_format,
        limited_color_range: topology.limited_color_range,
        c8_planes: topology.c8_planes,
    })
}

/// CTMs compared after encoding, so values the hardware can not tell
/// apart count as equal
fn ctm_equal(profile: &HardwareProfile, a: Option<&Ctm>, b: Option<&Ctm>) -> bool {
    match (a, b, profile.ctm_format) {
        (None, None, _) => true,
        (Some(a), Some(b), Some(format)) => {
            encode_ctm_for(a, format, false).coeffs == encode_ctm_for(b, format, false).coeffs
        }
        _ => false,
    }
}

/// Does the hardware state differ from the request?
///
/// Gamma is compared within the topology's precision and skipped when the
/// precision is 0 or the profile can not read gamma back. The CTM is
/// compared only where it could be read back.
pub fn needs_reprogram(
    profile: &HardwareProfile,
    requested: &ColorConfig,
    hardware: &ColorConfig,
    topology: &Topology,
) -> bool {
    if requested.output_format != hardware.output_format
        || requested.limited_color_range != hardware.limited_color_range
    {
        debug!("output format or range mismatch");
        return true;
    }

    let precision = topology.gamma_precision();
    if profile.readback.gamma
        && precision != 0
        && !lut_equal(
            requested.gamma_lut.as_deref(),
            hardware.gamma_lut.as_deref(),
            topology.gamma_mode_field(),
            precision,
        )
    {
        debug!(precision, "gamma LUT mismatch");
        return true;
    }

    let ctm_readable = profile.readback.ctm
        && topology.pipe_csc
            == CscProgram::UserCtm {
                compress_limited: false,
            };
    if ctm_readable && !ctm_equal(profile, requested.ctm.as_ref(), hardware.ctm.as_ref()) {
        debug!("CTM mismatch");
        return true;
    }

    false
}
