//! Parameterized readiness gate.
//!
//! One existence check replaces the fleet of near-identical per-milestone
//! scripts: the required-file tuple is data, not code. Presence is the whole
//! contract; content checks belong to the parity verifier.
use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::path::Path;

use crate::report::GateReport;
use crate::util::display_path;

/// `--manifest` file shape: a fixed tuple of required relative paths.
#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
pub struct ReadinessManifest {
    pub required_files: Vec<String>,
}

/// Load the required-file list from a readiness manifest.
pub fn load_readiness_manifest(path: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("read readiness manifest {}", path.display()))?;
    let manifest: ReadinessManifest = serde_json::from_str(&content)
        .with_context(|| format!("parse readiness manifest {}", path.display()))?;
    if manifest.required_files.is_empty() {
        return Err(anyhow!(
            "readiness manifest lists no required files ({})",
            path.display()
        ));
    }
    Ok(manifest.required_files)
}

/// Check every required file under `target_dir`, collecting all misses.
pub fn check(target_dir: &Path, required_files: &[String], project_root: &Path) -> GateReport {
    let mut report = GateReport::new("missing");
    report.push_header(format!(
        "target_dir: {}",
        display_path(target_dir, project_root)
    ));
    report.push_header(format!("required_files: {}", required_files.len()));

    for relative in required_files {
        let candidate = target_dir.join(relative);
        if !candidate.exists() {
            report.push_detail(format!(
                "missing: {}",
                display_path(&candidate, project_root)
            ));
        }
    }
    report
}
