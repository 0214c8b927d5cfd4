//! Profile fixtures
//!
//! Hardware profiles stored as JSON, the way a capability-discovery
//! collaborator would hand them over.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use dispcolor_core::HardwareProfile;

/// `data/` directory of this crate
pub fn fixtures_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("data")
}

/// Load `data/profiles/<name>.json`
pub fn load_profile(name: &str) -> Result<HardwareProfile> {
    let path = fixtures_dir().join("profiles").join(format!("{name}.json"));
    let text = std::fs::read_to_string(&path)
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

/// Every fixture profile, sorted by file name
pub fn load_all_profiles() -> Result<Vec<(String, HardwareProfile)>> {
    let dir = fixtures_dir().join("profiles");
    let mut names: Vec<String> = std::fs::read_dir(&dir)
        .with_context(|| format!("listing {}", dir.display()))?
        .filter_map(|e| e.ok())
        .filter_map(|e| {
            let path = e.path();
            if path.extension()? != "json" {
                return None;
            }
            path.file_stem()?.to_str().map(str::to_owned)
        })
        .collect();
    names.sort();

    names
        .into_iter()
        .map(|name| {
            let profile = load_profile(&name)?;
            Ok((name, profile))
        })
        .collect()
}
