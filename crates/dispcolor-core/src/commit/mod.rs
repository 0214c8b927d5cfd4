//! Commit Sequencing
//!
//! Turns a selected [`Topology`] into encoded tables and matrices, then into
//! an ordered list of register writes for the register I/O collaborator.
//!
//! # Phases
//!
//! A commit is split in two groups:
//!
//! - **mode group**: gamma/CSC mode registers and the pipe/output CSC. It
//!   contains single-buffered registers and is always marked atomic.
//! - **LUT group**: palette and degamma table data.
//!
//! When the LUTs can be preloaded the LUT group runs before the vblank
//! evasion window, ahead of the mode group. Otherwise both run inside the
//! window, mode group first.

mod io;
mod plan;

pub use io::{RegisterIo, execute};
pub use plan::plan_writes;

use tracing::trace;

use crate::codec::{EncodedMatrix, encode_ctm};
use crate::config::ColorConfig;
use crate::error::{ConfigError, Result};
use crate::lut::{EncodedLut, LutShape, encode_lut, identity_degamma};
use crate::profile::{Family, HardwareProfile};
use crate::regs::RegWrite;
use crate::topology::{CscProgram, DegammaSource, Topology, TopologyKind, can_preload, select};
use crate::types::{LutEntry, Pipe};
use crate::validate::validate;

/// When a write group may execute relative to the frame boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Ahead of the vblank that latches the new state
    BeforeVblank,
    /// Inside the vblank evasion window
    VblankEvade,
}

/// Writes that execute back to back
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteGroup {
    pub phase: Phase,
    /// Touches a single-buffered register: must not be split or interleaved
    pub atomic: bool,
    pub writes: Vec<RegWrite>,
}

impl WriteGroup {
    pub fn new(phase: Phase, writes: Vec<RegWrite>) -> Self {
        let atomic = writes.iter().any(|w| w.reg.is_single_buffered());
        Self {
            phase,
            atomic,
            writes,
        }
    }
}

/// Ordered register writes for one pipe color update
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitPlan {
    pub groups: Vec<WriteGroup>,
}

impl CommitPlan {
    /// Every write in execution order
    pub fn writes(&self) -> impl Iterator<Item = &RegWrite> {
        self.groups.iter().flat_map(|g| g.writes.iter())
    }

    /// Total number of writes
    pub fn len(&self) -> usize {
        self.groups.iter().map(|g| g.writes.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.iter().all(|g| g.writes.is_empty())
    }
}

/// Encoded hardware payloads for a topology
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EncodedState {
    pub pipe_csc: Option<EncodedMatrix>,
    /// ICL+ output CSC
    pub output_csc: Option<EncodedMatrix>,
    /// Separate degamma table (CGM, GLK+ pre-CSC, IVB split lower half)
    pub degamma: Option<EncodedLut>,
    /// Gamma palette contents
    ///
    /// On IVB..SKL without a gamma LUT this carries the degamma LUT, which
    /// then occupies the whole precision palette.
    pub gamma: Option<EncodedLut>,
}

fn encode_csc(
    program: CscProgram,
    config: &ColorConfig,
    profile: &HardwareProfile,
) -> Result<Option<EncodedMatrix>> {
    Ok(match program {
        CscProgram::None => None,
        CscProgram::UserCtm { compress_limited } => {
            let ctm = config.ctm.as_ref().ok_or_else(|| {
                ConfigError::UnsupportedCombination("CSC program without a CTM".into())
            })?;
            Some(encode_ctm(ctm, profile, compress_limited)?)
        }
        CscProgram::RgbToYcbcr => Some(EncodedMatrix::RGB_TO_YCBCR),
        CscProgram::LimitedRange => Some(EncodedMatrix::LIMITED_RANGE),
        CscProgram::Identity => Some(EncodedMatrix::IDENTITY),
    })
}

fn encode_opt(lut: Option<&[LutEntry]>, shape: LutShape) -> Option<EncodedLut> {
    lut.map(|l| encode_lut(l, shape))
}

/// Encode matrices and tables for a selected topology
///
/// Pure; the tables follow the shape the topology's mode registers
/// describe.
pub fn encode_state(
    profile: &HardwareProfile,
    topology: &Topology,
    config: &ColorConfig,
) -> Result<EncodedState> {
    let degamma_lut = config.degamma_lut.as_deref();
    let gamma_lut = config.gamma_lut.as_deref();

    let pipe_csc = encode_csc(topology.pipe_csc, config, profile)?;
    let output_csc = encode_csc(topology.output_csc, config, profile)?;

    let single_channel_degamma = || match topology.degamma {
        DegammaSource::User => encode_opt(
            degamma_lut,
            LutShape::DegammaSingleChannel {
                entries: profile.degamma_lut_size,
            },
        ),
        DegammaSource::Identity => Some(identity_degamma(profile.degamma_lut_size)),
        DegammaSource::None => None,
    };

    let (degamma, gamma) = match topology.kind {
        TopologyKind::Legacy => {
            let degamma = match profile.family {
                Family::Geminilake | Family::Icelake => single_channel_degamma(),
                _ => None,
            };
            (degamma, encode_opt(gamma_lut, LutShape::Legacy8))
        }
        TopologyKind::Interpolated10p6 => (
            None,
            encode_opt(
                gamma_lut,
                LutShape::Interpolated10p6 {
                    entries: profile.gamma_lut_size,
                },
            ),
        ),
        TopologyKind::Precision10 => (
            None,
            encode_opt(
                gamma_lut,
                LutShape::Precision10 {
                    entries: profile.gamma_lut_size,
                },
            ),
        ),
        TopologyKind::Split => (
            encode_opt(degamma_lut, LutShape::split_lower()),
            encode_opt(gamma_lut, LutShape::split_upper()),
        ),
        TopologyKind::Indexed10 => {
            if profile.family == Family::Geminilake {
                (
                    single_channel_degamma(),
                    encode_opt(gamma_lut, LutShape::indexed10()),
                )
            } else {
                (None, encode_opt(gamma_lut.or(degamma_lut), LutShape::indexed10()))
            }
        }
        TopologyKind::MultiSegment => (
            single_channel_degamma(),
            encode_opt(gamma_lut, LutShape::MultiSegment12p4),
        ),
        TopologyKind::Cgm => (
            encode_opt(
                degamma_lut,
                LutShape::CgmDegamma14 {
                    entries: profile.degamma_lut_size,
                },
            ),
            encode_opt(
                gamma_lut,
                LutShape::CgmGamma10 {
                    entries: profile.gamma_lut_size,
                },
            ),
        ),
    };

    Ok(EncodedState {
        pipe_csc,
        output_csc,
        degamma,
        gamma,
    })
}

/// Everything needed to program one pipe color update
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedCommit {
    pub topology: Topology,
    pub encoded: EncodedState,
    pub preload: bool,
    pub plan: CommitPlan,
}

/// Validate, select, encode and plan in one go
///
/// `old` is the topology currently on the pipe, if any; without it the
/// pipe is treated as all blocks off. The preload rules still look at the
/// new state, so CHV never preloads into an enabled CGM.
pub fn plan_commit(
    config: &ColorConfig,
    profile: &HardwareProfile,
    pipe: Pipe,
    old: Option<&Topology>,
) -> Result<PreparedCommit> {
    validate(config, profile)?;
    let topology = select(config, profile)?;
    let preload = match old {
        Some(old) => can_preload(profile, old, &topology),
        None => can_preload(profile, &select(&ColorConfig::new(), profile)?, &topology),
    };
    let encoded = encode_state(profile, &topology, config)?;
    let plan = plan_writes(profile, pipe, &topology, &encoded, preload);

    trace!(
        ?pipe,
        kind = ?topology.kind,
        preload,
        writes = plan.len(),
        "planned color commit"
    );

    Ok(PreparedCommit {
        topology,
        encoded,
        preload,
        plan,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::Platform;
    use crate::types::Ctm;

    fn lut(n: usize) -> Vec<LutEntry> {
        (0..n)
            .map(|i| LutEntry::gray((i * 0xffff / (n - 1)) as u16))
            .collect()
    }

    fn encode(platform: Platform, cfg: &ColorConfig) -> EncodedState {
        let p = HardwareProfile::for_platform(platform);
        let t = select(cfg, p).unwrap();
        encode_state(p, &t, cfg).unwrap()
    }

    #[test]
    fn test_ivb_degamma_only_fills_palette() {
        let enc = encode(Platform::Ivybridge, &ColorConfig::new().with_degamma(lut(1024)));
        assert!(enc.degamma.is_none());
        assert_eq!(enc.gamma.unwrap().shape, LutShape::indexed10());
    }

    #[test]
    fn test_bdw_resamples_to_full_palette() {
        let enc = encode(Platform::Broadwell, &ColorConfig::new().with_gamma(lut(512)));
        let gamma = enc.gamma.unwrap();
        assert_eq!(gamma.words.len(), 1024);
    }

    #[test]
    fn test_split_halves() {
        let cfg = ColorConfig::new().with_degamma(lut(512)).with_gamma(lut(512));
        let enc = encode(Platform::Skylake, &cfg);
        assert_eq!(enc.degamma.unwrap().start_index(), 0);
        assert_eq!(enc.gamma.unwrap().start_index(), 512);
    }

    #[test]
    fn test_glk_identity_degamma() {
        let enc = encode(Platform::Geminilake, &ColorConfig::new());
        let degamma = enc.degamma.unwrap();
        assert_eq!(degamma.words[32], 1 << 16);
        assert!(enc.pipe_csc.is_none());
        assert!(enc.gamma.is_none());
    }

    #[test]
    fn test_chv_cgm_csc_format() {
        let enc = encode(Platform::Cherryview, &ColorConfig::new().with_ctm(Ctm::identity()));
        let csc = enc.pipe_csc.unwrap();
        assert_eq!(csc.coeffs[0], 0x1000);
    }

    #[test]
    fn test_icl_output_csc() {
        let enc = encode(Platform::Icelake, &ColorConfig::new().with_limited_range());
        assert_eq!(enc.output_csc, Some(EncodedMatrix::LIMITED_RANGE));
        assert!(enc.pipe_csc.is_none());
    }

    #[test]
    fn test_chv_cgm_never_preloaded_from_scratch() {
        let p = HardwareProfile::for_platform(Platform::Cherryview);
        let cfg = ColorConfig::new().with_ctm(Ctm::identity());
        let prepared = plan_commit(&cfg, p, Pipe::A, None).unwrap();
        assert!(!prepared.preload);
        assert!(
            prepared
                .plan
                .groups
                .iter()
                .all(|g| g.phase == Phase::VblankEvade)
        );

        // Legacy gamma leaves CGM off and may still preload
        let cfg = ColorConfig::new().with_gamma(lut(256));
        assert!(plan_commit(&cfg, p, Pipe::A, None).unwrap().preload);
    }

    #[test]
    fn test_plan_commit_rejects_before_planning() {
        let p = HardwareProfile::for_platform(Platform::Skylake);
        let cfg = ColorConfig::new().with_gamma(lut(1024));
        assert!(plan_commit(&cfg, p, Pipe::A, None).is_err());
    }
}
