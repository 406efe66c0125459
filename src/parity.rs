//! Fixture/manifest parity verifier for the M177 conformance lanes.
//!
//! Each lane spec declares exactly which fixture files and issue anchors its
//! bucket must carry; the verifier reconciles that declaration against the
//! on-disk tree and the bucket's `manifest.json`. All drift is accumulated
//! before reporting so one run surfaces the complete remediation list, and
//! the emission order is fixed (lane declaration order, then kind order) so
//! CI logs stay diffable.
use regex::Regex;
use serde::Deserialize;
use std::path::Path;

use crate::report::GateReport;
use crate::util::display_path;

/// Milestone tag embedded in fixture filenames.
pub const MILESTONE: &str = "M177";

/// Expected shape of one conformance lane: bucket directory, issue anchors,
/// and fixture filenames, positionally 1:1 with the issues.
#[derive(Debug, Clone)]
pub struct LaneSpec {
    pub lane: &'static str,
    pub bucket: &'static str,
    pub first_issue: u32,
    pub expected_issues: Vec<u32>,
    pub expected_files: Vec<String>,
}

impl LaneSpec {
    /// Build a lane spec covering the inclusive issue range
    /// `first_issue..=last_issue`, deriving one fixture filename per issue.
    pub fn new(lane: &'static str, bucket: &'static str, first_issue: u32, last_issue: u32) -> Self {
        let expected_issues: Vec<u32> = (first_issue..=last_issue).collect();
        let expected_files: Vec<String> = (1..=expected_issues.len())
            .map(|index| format!("{MILESTONE}-{lane}{index:03}.json"))
            .collect();
        Self {
            lane,
            bucket,
            first_issue,
            expected_issues,
            expected_files,
        }
    }

    /// Manifest group this lane binds to, derived from lane, first issue, and
    /// bucket only.
    pub fn group_name(&self) -> String {
        format!(
            "lane_{}_issue_{}_{}_contract",
            self.lane.to_ascii_lowercase(),
            self.first_issue,
            self.bucket
        )
    }

    /// Filename pattern for fixtures belonging to this lane.
    fn lane_pattern(&self) -> Regex {
        Regex::new(&format!(r"^{MILESTONE}-{}\d{{3}}\.json$", self.lane)).expect("static pattern")
    }
}

/// Compile-time lane expectations for the current milestone.
pub fn lane_specs() -> Vec<LaneSpec> {
    vec![
        LaneSpec::new("A", "parser", 4461, 4466),
        LaneSpec::new("B", "semantic", 4467, 4472),
        LaneSpec::new("C", "diagnostics", 4473, 4476),
        LaneSpec::new("D", "lowering_abi", 4477, 4477),
        LaneSpec::new("E", "runtime", 4478, 4481),
    ]
}

#[derive(Deserialize, Debug)]
struct Manifest {
    groups: Option<Vec<ManifestGroup>>,
}

/// One group entry from a bucket's `manifest.json`. Unknown fields are
/// ignored; absent fields compare as drift rather than failing the parse.
#[derive(Deserialize, Debug, Default)]
pub struct ManifestGroup {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub issue: Option<u32>,
    #[serde(default)]
    pub issues: Vec<u32>,
    #[serde(default)]
    pub files: Vec<String>,
}

/// Per-lane drift, kept kind-separated so emission order is structural
/// rather than incidental. `unexpected` trails the three primary kinds and
/// collects stray lane entries, whether found on disk or in the manifest.
#[derive(Debug, Default)]
struct LaneDrift {
    missing_files: Vec<String>,
    missing_group: Vec<String>,
    group_mismatch: Vec<String>,
    unexpected: Vec<String>,
}

impl LaneDrift {
    fn into_ordered(self) -> Vec<String> {
        let mut items = self.missing_files;
        items.extend(self.missing_group);
        items.extend(self.group_mismatch);
        items.extend(self.unexpected);
        items
    }
}

fn check_lane(spec: &LaneSpec, conformance_root: &Path, project_root: &Path) -> Vec<String> {
    let bucket_dir = conformance_root.join(spec.bucket);
    let mut drift = LaneDrift::default();

    if !bucket_dir.is_dir() {
        // A missing bucket means every declared fixture is missing; manifest
        // comparison against a nonexistent directory would only add noise.
        for name in &spec.expected_files {
            drift.missing_files.push(format!(
                "{}: missing fixture file {}",
                spec.bucket,
                display_path(&bucket_dir.join(name), project_root)
            ));
        }
        return drift.into_ordered();
    }

    for name in &spec.expected_files {
        if !bucket_dir.join(name).is_file() {
            drift.missing_files.push(format!(
                "{}: missing fixture file {}",
                spec.bucket,
                display_path(&bucket_dir.join(name), project_root)
            ));
        }
    }

    check_manifest(spec, &bucket_dir, project_root, &mut drift);
    check_unexpected_fixtures(spec, &bucket_dir, project_root, &mut drift);
    drift.into_ordered()
}

fn check_manifest(spec: &LaneSpec, bucket_dir: &Path, project_root: &Path, drift: &mut LaneDrift) {
    let manifest_path = bucket_dir.join("manifest.json");
    let shown = display_path(&manifest_path, project_root);

    if !manifest_path.is_file() {
        drift
            .missing_group
            .push(format!("{}: missing manifest file {shown}", spec.bucket));
        return;
    }
    let content = match std::fs::read_to_string(&manifest_path) {
        Ok(content) => content,
        Err(err) => {
            drift
                .missing_group
                .push(format!("{}: failed to read manifest {shown} ({err})", spec.bucket));
            return;
        }
    };
    let manifest: Manifest = match serde_json::from_str(&content) {
        Ok(manifest) => manifest,
        Err(err) => {
            drift.missing_group.push(format!(
                "{}: failed to parse manifest {shown} ({err})",
                spec.bucket
            ));
            return;
        }
    };
    let Some(groups) = manifest.groups else {
        drift.missing_group.push(format!(
            "{}: manifest missing list field 'groups' ({shown})",
            spec.bucket
        ));
        return;
    };

    check_named_group(spec, &groups, drift);
    check_stray_manifest_entries(spec, &groups, drift);
}

fn check_named_group(spec: &LaneSpec, groups: &[ManifestGroup], drift: &mut LaneDrift) {
    let wanted = spec.group_name();
    let mut named: Vec<&ManifestGroup> = groups.iter().filter(|group| group.name == wanted).collect();
    let group = match named.len() {
        0 => {
            drift
                .missing_group
                .push(format!("{}: missing manifest group '{wanted}'", spec.bucket));
            return;
        }
        1 => named.remove(0),
        _ => {
            drift
                .missing_group
                .push(format!("{}: duplicate manifest group '{wanted}'", spec.bucket));
            return;
        }
    };

    if group.issue != Some(spec.first_issue) {
        let found = match group.issue {
            Some(issue) => issue.to_string(),
            None => "none".to_string(),
        };
        drift.group_mismatch.push(format!(
            "{}: group '{wanted}' issue drift (expected {}, found {found})",
            spec.bucket, spec.first_issue
        ));
    }
    if group.issues != spec.expected_issues {
        drift.group_mismatch.push(format!(
            "{}: group '{wanted}' issues drift (expected {:?}, found {:?})",
            spec.bucket, spec.expected_issues, group.issues
        ));
    }
    if group.files != spec.expected_files {
        drift.group_mismatch.push(format!(
            "{}: group '{wanted}' files drift (expected {:?}, found {:?})",
            spec.bucket, spec.expected_files, group.files
        ));
    }
}

/// Scan every manifest group for lane-pattern entries outside the declared
/// expectations. A stray file or issue anchor hiding in a second group must
/// not pass just because the named contract group is exact.
fn check_stray_manifest_entries(spec: &LaneSpec, groups: &[ManifestGroup], drift: &mut LaneDrift) {
    let pattern = spec.lane_pattern();
    let mut stray_files: Vec<&String> = Vec::new();
    let mut stray_issues: Vec<u32> = Vec::new();

    for group in groups {
        let lane_files: Vec<&String> = group
            .files
            .iter()
            .filter(|name| pattern.is_match(name))
            .collect();
        for name in &lane_files {
            let name = *name;
            if !spec.expected_files.contains(name) && !stray_files.contains(&name) {
                stray_files.push(name);
            }
        }
        if lane_files.is_empty() {
            continue;
        }
        // Issue anchors only count against the lane when the group actually
        // carries lane files, matching how buckets mix lanes in one manifest.
        let anchors = group.issues.iter().copied().chain(group.issue);
        for issue in anchors {
            if !spec.expected_issues.contains(&issue) && !stray_issues.contains(&issue) {
                stray_issues.push(issue);
            }
        }
    }

    stray_files.sort();
    stray_issues.sort_unstable();
    for name in stray_files {
        drift.unexpected.push(format!(
            "{}: manifest has unexpected lane file entry {name}",
            spec.bucket
        ));
    }
    for issue in stray_issues {
        drift.unexpected.push(format!(
            "{}: manifest has unexpected issue {issue}",
            spec.bucket
        ));
    }
}

/// Stray fixtures matching the lane's filename pattern cannot pass silently:
/// a file on disk that no declaration covers is drift too.
fn check_unexpected_fixtures(
    spec: &LaneSpec,
    bucket_dir: &Path,
    project_root: &Path,
    drift: &mut LaneDrift,
) {
    let pattern = spec.lane_pattern();
    let Ok(read_dir) = std::fs::read_dir(bucket_dir) else {
        return;
    };
    let mut unexpected: Vec<String> = Vec::new();
    for entry in read_dir.flatten() {
        if !entry.path().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().to_string();
        if pattern.is_match(&name) && !spec.expected_files.contains(&name) {
            unexpected.push(name);
        }
    }
    unexpected.sort();
    for name in unexpected {
        drift.unexpected.push(format!(
            "{}: unexpected fixture file {}",
            spec.bucket,
            display_path(&bucket_dir.join(name), project_root)
        ));
    }
}

/// Reconcile every lane spec against the conformance tree, accumulating all
/// drift before reporting. Read-only.
pub fn verify(conformance_root: &Path, specs: &[LaneSpec], project_root: &Path) -> GateReport {
    let mut report = GateReport::new("drift");
    report.push_header(format!(
        "conformance_root: {}",
        display_path(conformance_root, project_root)
    ));

    for spec in specs {
        for item in check_lane(spec, conformance_root, project_root) {
            report.push_detail(format!("drift: {item}"));
        }
    }
    tracing::debug!(
        lanes = specs.len(),
        drift = report.detail_lines().len(),
        "parity scan complete"
    );
    report
}
