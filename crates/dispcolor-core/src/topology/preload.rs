use super::Topology;
use crate::profile::{Family, HardwareProfile};

/// Can the new LUTs be written ahead of the vblank that latches them?
///
/// Only when no table of the old state is live in the same storage,
/// otherwise the scanout would pick up a half-written table.
pub fn can_preload(profile: &HardwareProfile, old: &Topology, new: &Topology) -> bool {
    match profile.family {
        // CGM_PIPE_MODE is single buffered; the CGM LUTs and CSC can not be
        // split out of the mode update
        Family::Cherryview => {
            if old.cgm_mode != 0 || new.cgm_mode != 0 {
                return false;
            }
            !old.has_gamma_lut
        }
        // Hardware degamma is live whenever the pipe CSC is, even when the
        // old state had no user degamma
        Family::Geminilake => !old.csc_enable && !old.has_gamma_lut,
        _ => !old.has_gamma_lut && !old.has_degamma_lut,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ColorConfig;
    use crate::profile::Platform;
    use crate::topology::select;
    use crate::types::{Ctm, LutEntry};

    fn topo(platform: Platform, cfg: &ColorConfig) -> (Topology, &'static HardwareProfile) {
        let p = HardwareProfile::for_platform(platform);
        (select(cfg, p).unwrap(), p)
    }

    #[test]
    fn test_default_rule() {
        let (off, p) = topo(Platform::Skylake, &ColorConfig::new());
        let (on, _) = topo(
            Platform::Skylake,
            &ColorConfig::new().with_gamma(vec![LutEntry::gray(0); 512]),
        );
        assert!(can_preload(p, &off, &on));
        assert!(!can_preload(p, &on, &on));
        assert!(can_preload(p, &off, &off));
    }

    #[test]
    fn test_chv_never_with_cgm() {
        let (off, p) = topo(Platform::Cherryview, &ColorConfig::new());
        let (cgm, _) = topo(
            Platform::Cherryview,
            &ColorConfig::new().with_ctm(Ctm::identity()),
        );
        assert!(can_preload(p, &off, &off));
        assert!(!can_preload(p, &off, &cgm));
        assert!(!can_preload(p, &cgm, &off));
    }

    #[test]
    fn test_glk_csc_blocks_preload() {
        let (off, p) = topo(Platform::Geminilake, &ColorConfig::new());
        let (csc, _) = topo(
            Platform::Geminilake,
            &ColorConfig::new().with_ctm(Ctm::identity()),
        );
        assert!(can_preload(p, &off, &csc));
        assert!(!can_preload(p, &csc, &off));
    }
}
