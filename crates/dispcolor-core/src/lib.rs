//! # dispcolor - Display Pipe Color Pipeline Core
//!
//! Selects, encodes and validates the color pipeline (degamma LUT, CSC
//! matrix, gamma LUT) of a display pipe across hardware generations, from
//! the GMCH palette parts up to the multi-segment gamma of gen11+.
//!
//! ## Stages
//!
//! 1. [`validate`]: LUT sizes and data-quality tests against a
//!    [`HardwareProfile`]
//! 2. [`select`]: which hardware blocks to enable, and their mode values
//! 3. [`encode_state`]: fixed-point CSC coefficients and packed LUT words
//! 4. [`plan_writes`]: ordered, phase-tagged register writes
//! 5. [`read_back`] / [`needs_reprogram`]: hardware state back into
//!    canonical form for verification
//!
//! Everything up to the plan is pure. Register access goes through the
//! [`RegisterIo`] trait, implemented by the caller.
//!
//! ## Quick Start
//!
//! ```
//! use dispcolor_core::{ColorConfig, Ctm, HardwareProfile, LutEntry, Pipe, Platform, plan_commit};
//!
//! let profile = HardwareProfile::for_platform(Platform::Skylake);
//! let gamma: Vec<LutEntry> = (0..512u32)
//!     .map(|i| LutEntry::gray((i * 0xffff / 511) as u16))
//!     .collect();
//!
//! let config = ColorConfig::new()
//!     .with_ctm(Ctm::identity())
//!     .with_gamma(gamma);
//!
//! let prepared = plan_commit(&config, profile, Pipe::A, None).unwrap();
//! assert!(prepared.preload);
//! assert!(prepared.plan.groups.iter().any(|g| g.atomic));
//! ```

pub mod codec;
pub mod commit;
pub mod config;
pub mod error;
pub mod lut;
pub mod profile;
pub mod readback;
pub mod regs;
pub mod topology;
pub mod types;
pub mod validate;

pub use codec::{CoeffFormat, EncodedMatrix, decode_ctm, encode_ctm};
pub use commit::{
    CommitPlan, EncodedState, Phase, PreparedCommit, RegisterIo, WriteGroup, encode_state,
    execute, plan_commit, plan_writes,
};
pub use config::ColorConfig;
pub use error::{ConfigError, Error, HardwareIoError, LutTest, Result};
pub use lut::{EncodedLut, LutShape, decode_lut, encode_lut};
pub use profile::{Family, HardwareProfile, Platform};
pub use readback::{approx_equal, lut_equal, needs_reprogram, read_back};
pub use regs::{Reg, RegWrite};
pub use topology::{Topology, TopologyKind, can_preload, select};
pub use types::{Ctm, CtmCoeff, LutEntry, LutKind, OutputFormat, Pipe};
pub use validate::validate;

/// Version of dispcolor
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Validate a request and select its topology
///
/// What an atomic check phase needs: either the topology the commit will
/// program, or the reason the request is rejected. Nothing is encoded.
pub fn check(
    config: &ColorConfig,
    profile: &HardwareProfile,
) -> std::result::Result<Topology, ConfigError> {
    validate(config, profile)?;
    select(config, profile)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_check_every_profile_accepts_bypass() {
        for p in HardwareProfile::all() {
            let t = check(&ColorConfig::new(), p).unwrap();
            assert!(!t.gamma_enable, "{:?}", p.platform);
        }
    }
}
