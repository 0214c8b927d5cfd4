//! Per-family register write sequences

use tracing::trace;

use super::{CommitPlan, EncodedState, Phase, WriteGroup};
use crate::codec::EncodedMatrix;
use crate::lut::{EncodedLut, UNITY_U16_16};
use crate::profile::{Family, HardwareProfile};
use crate::regs::{
    CscReg, PAL_PREC_AUTO_INCREMENT, PAL_PREC_SPLIT_MODE, PIPECONF_GAMMA_MODE_MASK_I9XX,
    PIPECONF_GAMMA_MODE_MASK_ILK, PRE_CSC_GAMC_AUTO_INCREMENT, Reg, RegWrite,
    SKL_BOTTOM_COLOR_CSC_ENABLE, SKL_BOTTOM_COLOR_GAMMA_ENABLE, pal_prec_index_value,
    pipeconf_gamma_mode,
};
use crate::topology::{Topology, TopologyKind};
use crate::types::Pipe;

/// How the precision palette index advances during a table load
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IndexMode {
    /// IVB/HSW: index written before every data word
    Explicit,
    /// BDW+: index set once with auto-increment
    AutoIncrement,
}

/// Order the writes for one pipe color update
///
/// With `preload` the LUT data goes out ahead of the vblank and the mode
/// registers follow inside the evasion window. Without it both groups run
/// in the window, mode registers first.
pub fn plan_writes(
    profile: &HardwareProfile,
    pipe: Pipe,
    topology: &Topology,
    encoded: &EncodedState,
    preload: bool,
) -> CommitPlan {
    let mut mode = Vec::new();
    let mut luts = Vec::new();

    color_commit(&mut mode, profile, pipe, topology, encoded);
    load_luts(&mut luts, profile, pipe, topology, encoded);

    trace!(
        ?pipe,
        mode_writes = mode.len(),
        lut_writes = luts.len(),
        preload,
        "color register plan"
    );

    let groups = if preload {
        vec![
            WriteGroup::new(Phase::BeforeVblank, luts),
            WriteGroup::new(Phase::VblankEvade, mode),
        ]
    } else {
        vec![
            WriteGroup::new(Phase::VblankEvade, mode),
            WriteGroup::new(Phase::VblankEvade, luts),
        ]
    };

    CommitPlan {
        groups: groups.into_iter().filter(|g| !g.writes.is_empty()).collect(),
    }
}

// ============================================================================
// Mode registers
// ============================================================================

fn color_commit(
    out: &mut Vec<RegWrite>,
    profile: &HardwareProfile,
    pipe: Pipe,
    t: &Topology,
    encoded: &EncodedState,
) {
    match profile.family {
        Family::I9xx | Family::I965 | Family::Cherryview => {
            out.push(RegWrite::rmw(
                Reg::PipeConf(pipe),
                PIPECONF_GAMMA_MODE_MASK_I9XX,
                pipeconf_gamma_mode(t.gamma_mode),
            ));
        }
        Family::Ironlake | Family::Ivybridge => {
            out.push(RegWrite::rmw(
                Reg::PipeConf(pipe),
                PIPECONF_GAMMA_MODE_MASK_ILK,
                pipeconf_gamma_mode(t.gamma_mode),
            ));
            ilk_load_csc(out, profile, pipe, t, encoded);
        }
        Family::Haswell | Family::Broadwell => {
            out.push(RegWrite::new(Reg::GammaMode(pipe), t.gamma_mode));
            ilk_load_csc(out, profile, pipe, t, encoded);
        }
        Family::Skylake | Family::Geminilake => {
            skl_bottom_color(out, pipe, t);
            out.push(RegWrite::new(Reg::GammaMode(pipe), t.gamma_mode));
            ilk_load_csc(out, profile, pipe, t, encoded);
        }
        Family::Icelake => {
            skl_bottom_color(out, pipe, t);
            out.push(RegWrite::new(Reg::GammaMode(pipe), t.gamma_mode));
            icl_load_csc(out, pipe, t, encoded);
        }
    }
}

fn skl_bottom_color(out: &mut Vec<RegWrite>, pipe: Pipe, t: &Topology) {
    let mut val = 0;
    if t.gamma_enable {
        val |= SKL_BOTTOM_COLOR_GAMMA_ENABLE;
    }
    if t.csc_enable {
        val |= SKL_BOTTOM_COLOR_CSC_ENABLE;
    }
    out.push(RegWrite::new(Reg::SklBottomColor(pipe), val));
}

/// Offsets and coefficients of one CSC block, mode register excluded
fn csc_words(
    out: &mut Vec<RegWrite>,
    m: &EncodedMatrix,
    post_offsets: bool,
    reg: impl Fn(CscReg) -> Reg,
) {
    for (r, v) in CscReg::PREOFF.iter().zip(m.preoff) {
        out.push(RegWrite::new(reg(*r), u32::from(v)));
    }
    for (r, v) in CscReg::COEFFS.iter().zip(m.pipe_csc_words()) {
        out.push(RegWrite::new(reg(*r), v));
    }
    if post_offsets {
        for (r, v) in CscReg::POSTOFF.iter().zip(m.postoff) {
            out.push(RegWrite::new(reg(*r), u32::from(v)));
        }
    }
}

fn ilk_load_csc(
    out: &mut Vec<RegWrite>,
    profile: &HardwareProfile,
    pipe: Pipe,
    t: &Topology,
    encoded: &EncodedState,
) {
    if let Some(m) = &encoded.pipe_csc {
        csc_words(out, m, profile.csc_post_offsets, |r| Reg::PipeCsc(pipe, r));
    }
    out.push(RegWrite::new(Reg::PipeCsc(pipe, CscReg::Mode), t.csc_mode));
}

fn icl_load_csc(out: &mut Vec<RegWrite>, pipe: Pipe, t: &Topology, encoded: &EncodedState) {
    if let Some(m) = &encoded.pipe_csc {
        csc_words(out, m, true, |r| Reg::PipeCsc(pipe, r));
    }
    if let Some(m) = &encoded.output_csc {
        csc_words(out, m, true, |r| Reg::OutputCsc(pipe, r));
    }
    out.push(RegWrite::new(Reg::PipeCsc(pipe, CscReg::Mode), t.csc_mode));
}

// ============================================================================
// Table loads
// ============================================================================

fn load_luts(
    out: &mut Vec<RegWrite>,
    profile: &HardwareProfile,
    pipe: Pipe,
    t: &Topology,
    encoded: &EncodedState,
) {
    let gamma = encoded.gamma.as_ref();

    match profile.family {
        Family::I9xx => {
            if let Some(lut) = gamma {
                load_palette(out, lut, |index| Reg::Palette { pipe, index });
            }
        }
        Family::I965 => i965_load_luts(out, pipe, t, gamma),
        Family::Cherryview => chv_load_luts(out, pipe, t, encoded),
        Family::Ironlake => {
            if let Some(lut) = gamma {
                if t.kind == TopologyKind::Precision10 {
                    load_palette(out, lut, |index| Reg::PrecPalette { pipe, index });
                } else {
                    load_palette(out, lut, |index| Reg::LgcPalette { pipe, index });
                }
            }
        }
        Family::Ivybridge | Family::Haswell => {
            ivb_load_luts(out, profile, pipe, t, encoded, IndexMode::Explicit)
        }
        Family::Broadwell | Family::Skylake => {
            ivb_load_luts(out, profile, pipe, t, encoded, IndexMode::AutoIncrement)
        }
        Family::Geminilake => {
            // Degamma is always loaded, the CSC may switch it on at any time
            if let Some(degamma) = &encoded.degamma {
                load_degamma(out, pipe, degamma);
            }
            if let Some(lut) = gamma {
                if t.kind == TopologyKind::Indexed10 {
                    load_indexed(out, pipe, lut, IndexMode::AutoIncrement);
                    load_ext_gc_max(out, profile, pipe);
                } else {
                    load_palette(out, lut, |index| Reg::LgcPalette { pipe, index });
                }
            }
        }
        Family::Icelake => {
            if let Some(degamma) = &encoded.degamma {
                load_degamma(out, pipe, degamma);
            }
            if let Some(lut) = gamma {
                if t.kind == TopologyKind::MultiSegment {
                    icl_load_multi_segment(out, profile, pipe, lut);
                } else {
                    load_palette(out, lut, |index| Reg::LgcPalette { pipe, index });
                }
            }
        }
    }
}

/// Directly addressed palette, one register per data word
fn load_palette(out: &mut Vec<RegWrite>, lut: &EncodedLut, reg: impl Fn(u32) -> Reg) {
    out.extend(
        lut.words
            .iter()
            .enumerate()
            .map(|(i, &w)| RegWrite::new(reg(i as u32), w)),
    );
}

fn i965_load_luts(out: &mut Vec<RegWrite>, pipe: Pipe, t: &Topology, gamma: Option<&EncodedLut>) {
    let Some(lut) = gamma else {
        return;
    };

    load_palette(out, lut, |index| Reg::Palette { pipe, index });

    if t.kind == TopologyKind::Interpolated10p6 {
        if let Some(max) = lut.gc_max {
            for (channel, v) in (0u32..).zip(max) {
                out.push(RegWrite::new(Reg::PipeGcMax { pipe, channel }, v));
            }
        }
    }
}

fn chv_load_luts(out: &mut Vec<RegWrite>, pipe: Pipe, t: &Topology, encoded: &EncodedState) {
    // CGM CSC and mode go with the tables, not with PIPECONF
    if t.has_ctm {
        if let Some(m) = &encoded.pipe_csc {
            for (index, v) in (0u32..).zip(m.cgm_csc_words()) {
                out.push(RegWrite::new(Reg::CgmCscCoeff { pipe, index }, v));
            }
        }
    }
    out.push(RegWrite::new(Reg::CgmPipeMode(pipe), t.cgm_mode));

    if t.kind != TopologyKind::Cgm {
        if let Some(lut) = &encoded.gamma {
            load_palette(out, lut, |index| Reg::Palette { pipe, index });
        }
        return;
    }

    if let Some(lut) = &encoded.degamma {
        load_cgm(out, lut, |index, word| Reg::CgmDegamma { pipe, index, word });
    }
    if let Some(lut) = &encoded.gamma {
        load_cgm(out, lut, |index, word| Reg::CgmGamma { pipe, index, word });
    }
}

fn load_cgm(out: &mut Vec<RegWrite>, lut: &EncodedLut, reg: impl Fn(u32, u32) -> Reg) {
    for (index, pair) in (0u32..).zip(lut.words.chunks_exact(2)) {
        out.push(RegWrite::new(reg(index, 0), pair[0]));
        out.push(RegWrite::new(reg(index, 1), pair[1]));
    }
}

fn ivb_load_luts(
    out: &mut Vec<RegWrite>,
    profile: &HardwareProfile,
    pipe: Pipe,
    t: &Topology,
    encoded: &EncodedState,
    index_mode: IndexMode,
) {
    match t.kind {
        TopologyKind::Split => {
            if let Some(degamma) = &encoded.degamma {
                load_indexed(out, pipe, degamma, index_mode);
            }
            load_ext_gc_max(out, profile, pipe);
            if let Some(gamma) = &encoded.gamma {
                load_indexed(out, pipe, gamma, index_mode);
            }
        }
        TopologyKind::Indexed10 => {
            if let Some(lut) = &encoded.gamma {
                load_indexed(out, pipe, lut, index_mode);
            }
            load_ext_gc_max(out, profile, pipe);
        }
        _ => {
            if let Some(lut) = &encoded.gamma {
                load_palette(out, lut, |index| Reg::LgcPalette { pipe, index });
            }
        }
    }
}

/// Precision palette load through PREC_PAL_INDEX/DATA
///
/// The index is left at zero afterwards so the hardware goes back to
/// auto-incrementing from the start.
fn load_indexed(out: &mut Vec<RegWrite>, pipe: Pipe, lut: &EncodedLut, mode: IndexMode) {
    let split = if lut.shape.is_split() {
        PAL_PREC_SPLIT_MODE
    } else {
        0
    };
    let start = lut.start_index();

    match mode {
        IndexMode::Explicit => {
            for (i, &w) in (0u32..).zip(&lut.words) {
                out.push(RegWrite::new(
                    Reg::PrecPalIndex(pipe),
                    split | pal_prec_index_value(start + i),
                ));
                out.push(RegWrite::new(Reg::PrecPalData(pipe), w));
            }
        }
        IndexMode::AutoIncrement => {
            out.push(RegWrite::new(
                Reg::PrecPalIndex(pipe),
                split | PAL_PREC_AUTO_INCREMENT | pal_prec_index_value(start),
            ));
            out.extend(
                lut.words
                    .iter()
                    .map(|&w| RegWrite::new(Reg::PrecPalData(pipe), w)),
            );
        }
    }

    out.push(RegWrite::new(Reg::PrecPalIndex(pipe), 0));
}

/// Values past 1.0 clamp to 1.0
fn load_ext_gc_max(out: &mut Vec<RegWrite>, profile: &HardwareProfile, pipe: Pipe) {
    for channel in 0..3 {
        out.push(RegWrite::new(
            Reg::PrecPalExtGcMax { pipe, channel },
            UNITY_U16_16,
        ));
    }
    if profile.ext2_gc_max {
        for channel in 0..3 {
            out.push(RegWrite::new(
                Reg::PrecPalExt2GcMax { pipe, channel },
                UNITY_U16_16,
            ));
        }
    }
}

/// GLK+ pre-CSC degamma
///
/// The index is cleared before auto-increment is switched on; the
/// auto-increment write does not reset it.
fn load_degamma(out: &mut Vec<RegWrite>, pipe: Pipe, lut: &EncodedLut) {
    out.push(RegWrite::new(Reg::PreCscGamcIndex(pipe), 0));
    out.push(RegWrite::new(
        Reg::PreCscGamcIndex(pipe),
        PRE_CSC_GAMC_AUTO_INCREMENT,
    ));
    out.extend(
        lut.words
            .iter()
            .map(|&w| RegWrite::new(Reg::PreCscGamcData(pipe), w)),
    );
    out.push(RegWrite::new(Reg::PreCscGamcIndex(pipe), 0));
}

/// ICL+ superfine segment, then fine+coarse, then the clamp registers
fn icl_load_multi_segment(
    out: &mut Vec<RegWrite>,
    profile: &HardwareProfile,
    pipe: Pipe,
    lut: &EncodedLut,
) {
    out.push(RegWrite::new(
        Reg::PrecPalMultiSegIndex(pipe),
        PAL_PREC_AUTO_INCREMENT,
    ));
    out.extend(
        lut.superfine
            .iter()
            .map(|&w| RegWrite::new(Reg::PrecPalMultiSegData(pipe), w)),
    );
    out.push(RegWrite::new(Reg::PrecPalMultiSegIndex(pipe), 0));

    out.push(RegWrite::new(
        Reg::PrecPalIndex(pipe),
        PAL_PREC_AUTO_INCREMENT,
    ));
    out.extend(
        lut.words
            .iter()
            .map(|&w| RegWrite::new(Reg::PrecPalData(pipe), w)),
    );
    out.push(RegWrite::new(Reg::PrecPalIndex(pipe), 0));

    if let Some(max) = lut.gc_max {
        for (channel, v) in (0u32..).zip(max) {
            out.push(RegWrite::new(Reg::PrecPalGcMax { pipe, channel }, v));
        }
    }
    load_ext_gc_max(out, profile, pipe);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commit::encode_state;
    use crate::config::ColorConfig;
    use crate::profile::Platform;
    use crate::regs::{CGM_PIPE_MODE_CSC, GAMMA_MODE_MODE_10BIT};
    use crate::topology::select;
    use crate::types::{Ctm, LutEntry};

    fn lut(n: usize) -> Vec<LutEntry> {
        (0..n)
            .map(|i| LutEntry::gray((i * 0xffff / (n - 1)) as u16))
            .collect()
    }

    fn plan(platform: Platform, cfg: &ColorConfig, preload: bool) -> CommitPlan {
        let p = HardwareProfile::for_platform(platform);
        let t = select(cfg, p).unwrap();
        let enc = encode_state(p, &t, cfg).unwrap();
        plan_writes(p, Pipe::A, &t, &enc, preload)
    }

    #[test]
    fn test_preload_phases() {
        let cfg = ColorConfig::new().with_gamma(lut(512));
        let p = plan(Platform::Skylake, &cfg, true);
        assert_eq!(p.groups.len(), 2);
        assert_eq!(p.groups[0].phase, Phase::BeforeVblank);
        assert!(!p.groups[0].atomic);
        assert_eq!(p.groups[1].phase, Phase::VblankEvade);
        assert!(p.groups[1].atomic);

        let p = plan(Platform::Skylake, &cfg, false);
        assert!(p.groups.iter().all(|g| g.phase == Phase::VblankEvade));
        assert!(p.groups[0].atomic);
        assert_eq!(p.groups[0].writes[0].reg, Reg::SklBottomColor(Pipe::A));
    }

    #[test]
    fn test_bdw_autoinc_then_reset() {
        let p = plan(Platform::Broadwell, &ColorConfig::new().with_gamma(lut(512)), true);
        let luts = &p.groups[0].writes;
        assert_eq!(luts[0].reg, Reg::PrecPalIndex(Pipe::A));
        assert_eq!(luts[0].value, PAL_PREC_AUTO_INCREMENT);
        assert_eq!(luts[1024].reg, Reg::PrecPalData(Pipe::A));
        assert_eq!(luts[1025], RegWrite::new(Reg::PrecPalIndex(Pipe::A), 0));
        // ext gc max, no EXT2 on BDW
        assert_eq!(luts.len(), 1 + 1024 + 1 + 3);
    }

    #[test]
    fn test_ivb_explicit_index() {
        let cfg = ColorConfig::new().with_degamma(lut(1024)).with_gamma(lut(1024));
        let p = plan(Platform::Ivybridge, &cfg, true);
        let luts = &p.groups[0].writes;
        assert_eq!(luts[0].value, PAL_PREC_SPLIT_MODE);
        assert_eq!(luts[2].value, PAL_PREC_SPLIT_MODE | 1);
        // 512 pairs, index reset, ext max, then the gamma half
        let upper = 512 * 2 + 1 + 3;
        assert_eq!(luts[upper].value, PAL_PREC_SPLIT_MODE | 512);
        assert_eq!(*luts.last().unwrap(), RegWrite::new(Reg::PrecPalIndex(Pipe::A), 0));
    }

    #[test]
    fn test_ivb_pipeconf_rmw() {
        let p = plan(Platform::Ivybridge, &ColorConfig::new().with_gamma(lut(1024)), false);
        let first = p.groups[0].writes[0];
        assert_eq!(first.reg, Reg::PipeConf(Pipe::A));
        assert_eq!(first.mask, Some(PIPECONF_GAMMA_MODE_MASK_ILK));
        assert_eq!(first.value, pipeconf_gamma_mode(GAMMA_MODE_MODE_10BIT));
        // Nothing for the CSC to do: only its mode is written
        let last = p.groups[0].writes.last().unwrap();
        assert_eq!(last.reg, Reg::PipeCsc(Pipe::A, CscReg::Mode));
    }

    #[test]
    fn test_glk_degamma_always_loaded() {
        let p = plan(Platform::Geminilake, &ColorConfig::new(), true);
        let luts = &p.groups[0].writes;
        assert_eq!(luts[0], RegWrite::new(Reg::PreCscGamcIndex(Pipe::A), 0));
        assert_eq!(luts[1].value, PRE_CSC_GAMC_AUTO_INCREMENT);
        assert_eq!(luts.len(), 2 + 35 + 1);
    }

    #[test]
    fn test_icl_multi_segment() {
        let p = plan(Platform::Icelake, &ColorConfig::new().with_gamma(lut(262145)), true);
        let luts = &p.groups[0].writes;
        let superfine = luts
            .iter()
            .filter(|w| w.reg == Reg::PrecPalMultiSegData(Pipe::A))
            .count();
        let data = luts
            .iter()
            .filter(|w| w.reg == Reg::PrecPalData(Pipe::A))
            .count();
        assert_eq!(superfine, 18);
        assert_eq!(data, 1024);
        assert!(luts.contains(&RegWrite::new(
            Reg::PrecPalExt2GcMax {
                pipe: Pipe::A,
                channel: 2
            },
            1 << 16
        )));
    }

    #[test]
    fn test_chv_mode_in_lut_group() {
        let p = plan(Platform::Cherryview, &ColorConfig::new().with_ctm(Ctm::identity()), false);
        let luts = &p.groups[1];
        assert!(luts.atomic);
        assert_eq!(luts.writes.len(), 5 + 1);
        assert_eq!(
            luts.writes[5],
            RegWrite::new(Reg::CgmPipeMode(Pipe::A), CGM_PIPE_MODE_CSC)
        );
    }

    #[test]
    fn test_i965_gc_max() {
        let p = plan(Platform::G4x, &ColorConfig::new().with_gamma(lut(129)), true);
        let luts = &p.groups[0].writes;
        assert_eq!(luts.len(), 128 * 2 + 3);
        assert_eq!(
            luts[256],
            RegWrite::new(
                Reg::PipeGcMax {
                    pipe: Pipe::A,
                    channel: 0
                },
                0xffff
            )
        );
    }

    #[test]
    fn test_nothing_to_load() {
        let p = plan(Platform::I830, &ColorConfig::new(), true);
        assert_eq!(p.groups.len(), 1);
        assert_eq!(p.len(), 1);
    }
}
