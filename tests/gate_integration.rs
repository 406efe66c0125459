use std::path::Path;
use std::process::{Command, Output};

fn mgate() -> Command {
    Command::new(env!("CARGO_BIN_EXE_mgate"))
}

fn stdout_lines(output: &Output) -> Vec<String> {
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(|line| line.to_string())
        .collect()
}

/// Mirrors the verifier's built-in M177 lane table so the fixture tree can be
/// constructed to match it exactly.
const LANES: &[(&str, &str, u32, u32)] = &[
    ("A", "parser", 4461, 4466),
    ("B", "semantic", 4467, 4472),
    ("C", "diagnostics", 4473, 4476),
    ("D", "lowering_abi", 4477, 4477),
    ("E", "runtime", 4478, 4481),
];

fn expected_files(lane: &str, first: u32, last: u32) -> Vec<String> {
    (1..=(last - first + 1))
        .map(|index| format!("M177-{lane}{index:03}.json"))
        .collect()
}

fn populate_conformance_tree(root: &Path) {
    for (lane, bucket, first, last) in LANES {
        let bucket_dir = root.join(bucket);
        std::fs::create_dir_all(&bucket_dir).expect("create bucket");
        let files = expected_files(lane, *first, *last);
        for name in &files {
            std::fs::write(bucket_dir.join(name), "{}\n").expect("write fixture");
        }
        let group = serde_json::json!({
            "name": format!(
                "lane_{}_issue_{}_{}_contract",
                lane.to_ascii_lowercase(),
                first,
                bucket
            ),
            "issue": first,
            "issues": (*first..=*last).collect::<Vec<u32>>(),
            "files": files,
        });
        std::fs::write(
            bucket_dir.join("manifest.json"),
            serde_json::to_string_pretty(&serde_json::json!({ "groups": [group] }))
                .expect("serialize manifest"),
        )
        .expect("write manifest");
    }
}

const SEED_CONFIG: &str = r#"{
  "task_seeds": {
    "expected_task_count": 3,
    "catalog_md": "planning/task_catalog.md",
    "catalog_json": "planning/task_catalog.json",
    "groups": [
      {
        "name": "frontend_closeout",
        "lane": "A",
        "bucket": "parser",
        "tasks": [
          {"task_id": "SPT-0001", "title": "Freeze grammar ambiguities"},
          {"task_id": "SPT-0002", "title": "Lexer recovery sweep", "labels": ["lane:A"]}
        ]
      },
      {
        "name": "abi_closeout",
        "lane": "D",
        "bucket": "lowering_abi",
        "tasks": [
          {"task_id": "SPT-0003", "title": "Lowering ABI contract fixture"}
        ]
      }
    ]
  }
}"#;

#[test]
fn seed_is_byte_identical_and_ignores_seed_env() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config_path = dir.path().join("task_seeds.json");
    std::fs::write(&config_path, SEED_CONFIG).expect("write config");

    let run = |seed_env: &str| {
        let status = mgate()
            .arg("seed")
            .arg("--config")
            .arg("task_seeds.json")
            .arg("--root")
            .arg(dir.path())
            .arg("--generated-on")
            .arg("2026-08-27")
            .env("MGATE_SEED", seed_env)
            .status()
            .expect("run seed");
        assert!(status.success());
        let md = std::fs::read(dir.path().join("planning/task_catalog.md")).expect("read md");
        let json = std::fs::read(dir.path().join("planning/task_catalog.json")).expect("read json");
        (md, json)
    };

    let first = run("12345");
    let second = run("99999");
    assert_eq!(first, second);

    let catalog: serde_json::Value =
        serde_json::from_slice(&first.1).expect("parse catalog json");
    assert_eq!(catalog["generated_on"], "2026-08-27");
    assert_eq!(catalog["task_count"], 3);
    let tasks = catalog["tasks"].as_array().expect("tasks array");
    let ids: Vec<&str> = tasks
        .iter()
        .map(|task| task["task_id"].as_str().expect("task_id"))
        .collect();
    assert_eq!(ids, vec!["SPT-0001", "SPT-0002", "SPT-0003"]);
    assert!(tasks
        .iter()
        .all(|task| task["execution_status"] == "open"));
}

#[test]
fn seed_warns_on_task_count_mismatch_but_succeeds() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(
        dir.path().join("task_seeds.json"),
        r#"{"task_seeds": {"expected_task_count": 5, "groups": [
            {"name": "g", "lane": "A", "bucket": "parser", "tasks": [
                {"task_id": "SPT-0001", "title": "one"},
                {"task_id": "SPT-0002", "title": "two"}
            ]}
        ]}}"#,
    )
    .expect("write config");

    let output = mgate()
        .arg("seed")
        .arg("--config")
        .arg("task_seeds.json")
        .arg("--root")
        .arg(dir.path())
        .arg("--generated-on")
        .arg("2026-08-27")
        .output()
        .expect("run seed");
    assert_eq!(output.status.code(), Some(0));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("warning: expected 5 tasks, found 2"));
    // Catalog-path lines on stdout stay free of the warning.
    assert!(!String::from_utf8_lossy(&output.stdout).contains("warning:"));
    assert!(dir.path().join("planning/task_catalog.json").is_file());
}

#[test]
fn seed_fails_closed_on_duplicate_task_id() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config_path = dir.path().join("task_seeds.json");
    std::fs::write(
        &config_path,
        r#"{"task_seeds": {"groups": [
            {"name": "g", "lane": "A", "bucket": "parser", "tasks": [
                {"task_id": "SPT-0001", "title": "one"},
                {"task_id": "SPT-0001", "title": "two"}
            ]}
        ]}}"#,
    )
    .expect("write config");

    let output = mgate()
        .arg("seed")
        .arg("--config")
        .arg(&config_path)
        .arg("--root")
        .arg(dir.path())
        .arg("--generated-on")
        .arg("2026-08-27")
        .output()
        .expect("run seed");
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("SPT-0001"));
}

#[test]
fn parity_passes_on_matching_tree_and_reports_single_deletion() {
    let dir = tempfile::tempdir().expect("tempdir");
    let conformance_root = dir.path().join("conformance");
    populate_conformance_tree(&conformance_root);

    let output = mgate()
        .arg("parity")
        .arg("--conformance-root")
        .arg(&conformance_root)
        .arg("--root")
        .arg(dir.path())
        .output()
        .expect("run parity");
    assert_eq!(output.status.code(), Some(0));
    let lines = stdout_lines(&output);
    assert!(lines.contains(&"status: PASS".to_string()));

    // Delete one fixture, leave its manifest untouched.
    std::fs::remove_file(conformance_root.join("lowering_abi/M177-D001.json"))
        .expect("remove fixture");
    let output = mgate()
        .arg("parity")
        .arg("--conformance-root")
        .arg(&conformance_root)
        .arg("--root")
        .arg(dir.path())
        .output()
        .expect("run parity");
    assert_eq!(output.status.code(), Some(1));
    let lines = stdout_lines(&output);
    assert!(lines.contains(&"status: FAIL (drift=1)".to_string()));
    let drift: Vec<&String> = lines
        .iter()
        .filter(|line| line.starts_with("drift: "))
        .collect();
    assert_eq!(drift.len(), 1);
    assert!(drift[0].contains("lowering_abi"));
    assert!(drift[0].contains("M177-D001.json"));
}

#[test]
fn parity_output_is_stable_across_runs() {
    let dir = tempfile::tempdir().expect("tempdir");
    let conformance_root = dir.path().join("conformance");
    populate_conformance_tree(&conformance_root);
    // Break two lanes in different ways.
    std::fs::remove_file(conformance_root.join("parser/M177-A003.json")).expect("remove fixture");
    std::fs::remove_file(conformance_root.join("runtime/manifest.json")).expect("remove manifest");

    let run = || {
        let output = mgate()
            .arg("parity")
            .arg("--conformance-root")
            .arg(&conformance_root)
            .arg("--root")
            .arg(dir.path())
            .output()
            .expect("run parity");
        assert_eq!(output.status.code(), Some(1));
        stdout_lines(&output)
    };
    let first = run();
    assert_eq!(first, run());

    let drift: Vec<&String> = first
        .iter()
        .filter(|line| line.starts_with("drift: "))
        .collect();
    assert_eq!(drift.len(), 2);
    // Lane A is declared before lane E, so its drift leads.
    assert!(drift[0].contains("parser"));
    assert!(drift[1].contains("runtime"));
}

#[test]
fn readiness_passes_full_directory_and_fails_empty_one() {
    let dir = tempfile::tempdir().expect("tempdir");
    let target = dir.path().join("m177");
    std::fs::create_dir_all(&target).expect("create target");
    let manifest_path = dir.path().join("required.json");
    std::fs::write(
        &manifest_path,
        r#"{"required_files": [
            "m177_dispatch_snapshot.json",
            "lane_a_scope_freeze.md",
            "lane_b_scope_freeze.md"
        ]}"#,
    )
    .expect("write manifest");

    let output = mgate()
        .arg("readiness")
        .arg("--target-dir")
        .arg(&target)
        .arg("--manifest")
        .arg(&manifest_path)
        .arg("--root")
        .arg(dir.path())
        .output()
        .expect("run readiness");
    assert_eq!(output.status.code(), Some(1));
    let lines = stdout_lines(&output);
    assert!(lines.contains(&"required_files: 3".to_string()));
    assert!(lines.contains(&"status: FAIL (missing=3)".to_string()));
    let missing: Vec<&String> = lines
        .iter()
        .filter(|line| line.starts_with("missing: "))
        .collect();
    assert_eq!(missing.len(), 3);
    assert!(missing[0].contains("m177_dispatch_snapshot.json"));

    for name in [
        "m177_dispatch_snapshot.json",
        "lane_a_scope_freeze.md",
        "lane_b_scope_freeze.md",
    ] {
        std::fs::write(target.join(name), "x\n").expect("write artifact");
    }
    let output = mgate()
        .arg("readiness")
        .arg("--target-dir")
        .arg(&target)
        .arg("--manifest")
        .arg(&manifest_path)
        .arg("--root")
        .arg(dir.path())
        .output()
        .expect("run readiness");
    assert_eq!(output.status.code(), Some(0));
    assert!(stdout_lines(&output).contains(&"status: PASS".to_string()));
}

#[test]
fn readiness_requires_a_file_source() {
    let dir = tempfile::tempdir().expect("tempdir");
    let output = mgate()
        .arg("readiness")
        .arg("--target-dir")
        .arg(dir.path())
        .output()
        .expect("run readiness");
    assert_eq!(output.status.code(), Some(2));
}
