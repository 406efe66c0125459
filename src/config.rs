//! Seed configuration loading and validation.
//!
//! The seed config is a JSON document carrying its tooling settings under a
//! named top-level section, so the same file can host configuration for more
//! than one tool without collisions. Every structural problem is fatal: the
//! seeder fails closed on input it cannot fully trust.
use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Top-level JSON section the seeder reads its settings from.
pub const SEED_CONFIG_SECTION: &str = "task_seeds";

const DEFAULT_CATALOG_MD: &str = "planning/task_catalog.md";
const DEFAULT_CATALOG_JSON: &str = "planning/task_catalog.json";

/// One task descriptor as declared in the config. No execution-status field
/// exists here: status is assigned by the seeder, never declared.
#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct TaskSeed {
    pub task_id: String,
    pub title: String,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub labels: Vec<String>,
}

/// A declared group of task seeds sharing lane/bucket metadata.
#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct SeedGroup {
    pub name: String,
    pub lane: String,
    pub bucket: String,
    #[serde(default)]
    pub tasks: Vec<TaskSeed>,
}

#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
struct RawSection {
    #[serde(default)]
    expected_task_count: Option<u64>,
    #[serde(default)]
    catalog_md: Option<PathBuf>,
    #[serde(default)]
    catalog_json: Option<PathBuf>,
    #[serde(default)]
    groups: Vec<SeedGroup>,
}

/// Validated seed configuration with defaults applied.
#[derive(Debug)]
pub struct SeedConfig {
    pub expected_task_count: Option<u64>,
    pub catalog_md: PathBuf,
    pub catalog_json: PathBuf,
    pub groups: Vec<SeedGroup>,
}

/// Load and validate the seed config at `path`.
pub fn load_seed_config(path: &Path) -> Result<SeedConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("read config file {}", path.display()))?;
    let payload: serde_json::Value = serde_json::from_str(&content)
        .with_context(|| format!("parse config file {}", path.display()))?;

    let root = payload
        .as_object()
        .ok_or_else(|| anyhow!("config root must be a JSON object ({})", path.display()))?;
    let section = root.get(SEED_CONFIG_SECTION).ok_or_else(|| {
        anyhow!(
            "config missing object section '{SEED_CONFIG_SECTION}' ({})",
            path.display()
        )
    })?;

    let raw: RawSection = serde_json::from_value(section.clone())
        .with_context(|| format!("invalid section '{SEED_CONFIG_SECTION}'"))?;

    let config = SeedConfig {
        expected_task_count: raw.expected_task_count,
        catalog_md: raw.catalog_md.unwrap_or_else(|| DEFAULT_CATALOG_MD.into()),
        catalog_json: raw
            .catalog_json
            .unwrap_or_else(|| DEFAULT_CATALOG_JSON.into()),
        groups: raw.groups,
    };
    validate_seed_config(&config)?;
    Ok(config)
}

fn validate_seed_config(config: &SeedConfig) -> Result<()> {
    let mut seen_ids: HashSet<&str> = HashSet::new();
    for group in &config.groups {
        if group.name.trim().is_empty() {
            return Err(anyhow!("seed group name must not be empty"));
        }
        if group.lane.trim().is_empty() {
            return Err(anyhow!("seed group '{}' has an empty lane", group.name));
        }
        if group.bucket.trim().is_empty() {
            return Err(anyhow!("seed group '{}' has an empty bucket", group.name));
        }
        for task in &group.tasks {
            let task_id = task.task_id.trim();
            if task_id.is_empty() {
                return Err(anyhow!(
                    "seed group '{}' contains a task with an empty task_id",
                    group.name
                ));
            }
            if task.title.trim().is_empty() {
                return Err(anyhow!("task '{}' has an empty title", task.task_id));
            }
            // Duplicates are an authoring bug, never silently deduplicated.
            if !seen_ids.insert(task_id) {
                return Err(anyhow!("duplicate task_id '{}' in seed config", task_id));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(dir: &Path, body: &str) -> PathBuf {
        let path = dir.join("task_seeds.json");
        std::fs::write(&path, body).expect("write config");
        path
    }

    #[test]
    fn loads_minimal_config_with_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_config(
            dir.path(),
            r#"{"task_seeds": {"groups": [
                {"name": "closeout", "lane": "A", "bucket": "parser",
                 "tasks": [{"task_id": "SPT-0001", "title": "Freeze grammar"}]}
            ]}}"#,
        );

        let config = load_seed_config(&path).expect("load config");
        assert_eq!(config.catalog_md, PathBuf::from(DEFAULT_CATALOG_MD));
        assert_eq!(config.catalog_json, PathBuf::from(DEFAULT_CATALOG_JSON));
        assert_eq!(config.groups.len(), 1);
        assert_eq!(config.groups[0].tasks[0].task_id, "SPT-0001");
    }

    #[test]
    fn duplicate_task_id_is_fatal_and_named() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_config(
            dir.path(),
            r#"{"task_seeds": {"groups": [
                {"name": "g1", "lane": "A", "bucket": "parser",
                 "tasks": [{"task_id": "SPT-0001", "title": "one"}]},
                {"name": "g2", "lane": "B", "bucket": "semantic",
                 "tasks": [{"task_id": "SPT-0001", "title": "two"}]}
            ]}}"#,
        );

        let err = load_seed_config(&path).expect_err("duplicate must fail");
        assert!(err.to_string().contains("SPT-0001"));
    }

    #[test]
    fn missing_section_is_fatal() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_config(dir.path(), r#"{"other_tool": {}}"#);
        let err = load_seed_config(&path).expect_err("missing section must fail");
        assert!(err.to_string().contains(SEED_CONFIG_SECTION));
    }

    #[test]
    fn malformed_json_is_fatal() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_config(dir.path(), "{not json");
        assert!(load_seed_config(&path).is_err());
    }
}
