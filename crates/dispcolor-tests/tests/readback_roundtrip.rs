//! Readback Scenarios
//!
//! Commit a configuration into the simulated register file, read it back
//! and check that state verification accepts it.

use dispcolor_core::{
    ColorConfig, HardwareProfile, LutEntry, OutputFormat, Pipe, Platform, PreparedCommit,
    approx_equal, execute, needs_reprogram, plan_commit, read_back,
};
use dispcolor_tests::{LutPattern, RegisterFile, Table, generate_lut, random_ctm};

struct RoundTrip {
    profile: &'static HardwareProfile,
    prepared: PreparedCommit,
    requested: ColorConfig,
    hardware: ColorConfig,
    rf: RegisterFile,
}

fn round_trip(platform: Platform, pipe: Pipe, requested: ColorConfig) -> RoundTrip {
    let profile = HardwareProfile::for_platform(platform);
    let prepared = plan_commit(&requested, profile, pipe, None).unwrap();
    let mut rf = RegisterFile::new();
    execute(&prepared.plan, &mut rf).unwrap();
    let hardware = read_back(profile, pipe, &prepared.topology, &mut rf).unwrap();
    RoundTrip {
        profile,
        prepared,
        requested,
        hardware,
        rf,
    }
}

impl RoundTrip {
    fn needs_reprogram(&self) -> bool {
        needs_reprogram(
            self.profile,
            &self.requested,
            &self.hardware,
            &self.prepared.topology,
        )
    }
}

#[test]
fn glk_precision_palette_through_index() {
    let cfg = ColorConfig::new().with_gamma(generate_lut(LutPattern::RandomMonotonic(4), 1024));
    let rt = round_trip(Platform::Geminilake, Pipe::B, cfg);

    let hw = rt.hardware.gamma_lut.as_deref().expect("GLK gamma reads back");
    assert!(approx_equal(rt.requested.gamma_lut.as_deref().unwrap(), hw, 10));
    assert!(!rt.needs_reprogram());

    // The readback leaves the index where it found it
    assert_eq!(rt.rf.table_index(Pipe::B, Table::PrecPalette), 0);
}

#[test]
fn chv_cgm_gamma_and_csc() {
    let cfg = ColorConfig::new()
        .with_degamma(generate_lut(LutPattern::Gamma(2.2), 65))
        .with_ctm(random_ctm(11, 1.5))
        .with_gamma(generate_lut(LutPattern::Gamma(0.45), 257));
    let rt = round_trip(Platform::Cherryview, Pipe::C, cfg);

    assert_eq!(rt.prepared.topology.gamma_precision(), 10);
    assert_eq!(rt.hardware.gamma_lut.as_ref().map(Vec::len), Some(257));
    assert!(rt.hardware.ctm.is_some());
    assert!(rt.hardware.degamma_lut.is_none());
    assert!(!rt.needs_reprogram());
}

#[test]
fn i965_interpolated_palette_is_exact() {
    let cfg = ColorConfig::new().with_gamma(generate_lut(LutPattern::RandomMonotonic(8), 129));
    let rt = round_trip(Platform::G4x, Pipe::A, cfg);
    assert_eq!(rt.hardware.gamma_lut, rt.requested.gamma_lut);
    assert!(!rt.needs_reprogram());
}

#[test]
fn ilk_legacy_palette() {
    let cfg = ColorConfig::new().with_gamma(generate_lut(LutPattern::Gamma(2.2), 256));
    let rt = round_trip(Platform::Ironlake, Pipe::B, cfg);
    assert_eq!(rt.prepared.topology.gamma_precision(), 8);
    assert!(!rt.needs_reprogram());
}

#[test]
fn changed_entry_needs_reprogram() {
    let cfg = ColorConfig::new().with_gamma(generate_lut(LutPattern::Identity, 1024));
    let mut rt = round_trip(Platform::Ironlake, Pipe::A, cfg);
    assert!(!rt.needs_reprogram());

    if let Some(lut) = rt.requested.gamma_lut.as_mut() {
        lut[600].blue = lut[600].blue.wrapping_add(0x1000);
    }
    assert!(rt.needs_reprogram());
}

#[test]
fn snb_gamma_is_not_compared() {
    let cfg = ColorConfig::new().with_gamma(generate_lut(LutPattern::Identity, 1024));
    let mut rt = round_trip(Platform::Sandybridge, Pipe::A, cfg);
    assert_eq!(rt.prepared.topology.gamma_precision(), 0);

    // Nothing read back, so a changed table goes unnoticed
    assert!(rt.hardware.gamma_lut.is_none());
    if let Some(lut) = rt.requested.gamma_lut.as_mut() {
        lut[600].blue = lut[600].blue.wrapping_add(0x1000);
    }
    assert!(!rt.needs_reprogram());
}

#[test]
fn output_format_mismatch_needs_reprogram() {
    let cfg = ColorConfig::new().with_gamma(generate_lut(LutPattern::Identity, 1024));
    let rt = round_trip(Platform::Geminilake, Pipe::A, cfg);

    let profile = rt.profile;
    let requested = rt.requested.clone().with_output_format(OutputFormat::YCbCr444);
    assert!(needs_reprogram(
        profile,
        &requested,
        &rt.hardware,
        &rt.prepared.topology
    ));
}

#[test]
fn unreadable_gamma_is_not_compared() {
    let cfg = ColorConfig::new().with_gamma(generate_lut(LutPattern::Identity, 512));
    let rt = round_trip(Platform::Skylake, Pipe::A, cfg);
    assert!(rt.hardware.gamma_lut.is_none());
    assert!(!rt.needs_reprogram());
}

#[test]
fn approx_equal_tolerance_at_10_bits() {
    let a = vec![LutEntry::gray(0x8000); 300];
    let mut b = a.clone();
    b[299].red += 63;
    assert!(approx_equal(&a, &b, 10));
    b[299].red += 1;
    assert!(!approx_equal(&a, &b, 10));
    assert!(approx_equal(&a, &b, 9));
}
