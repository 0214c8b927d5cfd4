//! # dispcolor-tests
//!
//! Scenario testing for dispcolor.
//!
//! This crate provides:
//! - A simulated display register file with index/data auto-increment
//! - Seeded LUT and CTM generators
//! - Hardware profiles loaded from JSON fixtures
//!
//! ## Test Categories
//!
//! 1. **Topology**: per-family block selection and mode values
//! 2. **Validation**: size and data-quality rejections
//! 3. **Codec**: CTM and LUT encodings against known hardware words
//! 4. **Sequencing**: register write order, phases and atomic groups
//! 5. **Readback**: commit, read back, compare within precision

pub mod fixtures;
pub mod patterns;
pub mod regfile;

pub use fixtures::{fixtures_dir, load_all_profiles, load_profile};
pub use patterns::{LutPattern, generate_lut, random_ctm};
pub use regfile::{RegisterFile, Table};
