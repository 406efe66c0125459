//! Deterministic task-catalog seeder.
//!
//! Expansion is a pure function of the config and the caller-supplied
//! `generated_on` date: rows come out in config declaration order, every row
//! gets the same fixed seed status, and no wall clock, randomness, or
//! environment variable is consulted. Two runs with the same inputs produce
//! byte-identical artifacts.
use anyhow::{anyhow, Context, Result};
use regex::Regex;
use serde::Serialize;
use std::path::Path;

use crate::config::SeedConfig;
use crate::util::display_path;

/// Status assigned to every freshly seeded task.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionStatus {
    Open,
}

/// One catalog row: descriptive fields copied from the config plus the
/// assigned execution status.
#[derive(Serialize, Debug, Clone)]
pub struct CatalogEntry {
    pub task_id: String,
    pub title: String,
    pub group: String,
    pub lane: String,
    pub bucket: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub labels: Vec<String>,
    pub execution_status: ExecutionStatus,
}

#[derive(Serialize, Debug)]
struct CatalogFile<'a> {
    generated_on: &'a str,
    task_count: usize,
    tasks: &'a [CatalogEntry],
}

/// Validate a `--generated-on` value: ISO shape plus a real calendar date.
pub fn validate_generated_on(raw: &str) -> Result<()> {
    let pattern = Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("static pattern");
    if !pattern.is_match(raw) {
        return Err(anyhow!("--generated-on must be YYYY-MM-DD (got {raw:?})"));
    }
    let year: u32 = raw[0..4].parse().context("parse year")?;
    let month: u32 = raw[5..7].parse().context("parse month")?;
    let day: u32 = raw[8..10].parse().context("parse day")?;
    if !(1..=12).contains(&month) {
        return Err(anyhow!("--generated-on month out of range (got {raw:?})"));
    }
    let leap = year % 4 == 0 && (year % 100 != 0 || year % 400 == 0);
    let days_in_month = match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if leap => 29,
        _ => 28,
    };
    if day == 0 || day > days_in_month {
        return Err(anyhow!("--generated-on day out of range (got {raw:?})"));
    }
    Ok(())
}

/// Expand the config into catalog rows, preserving declaration order.
pub fn expand_catalog(config: &SeedConfig) -> Vec<CatalogEntry> {
    let mut entries = Vec::new();
    for group in &config.groups {
        for task in &group.tasks {
            entries.push(CatalogEntry {
                task_id: task.task_id.clone(),
                title: task.title.clone(),
                group: group.name.clone(),
                lane: group.lane.clone(),
                bucket: group.bucket.clone(),
                notes: task.notes.clone(),
                labels: task.labels.clone(),
                execution_status: ExecutionStatus::Open,
            });
        }
    }
    entries
}

/// Count occurrences keyed in first-seen order so summaries stay a pure
/// function of config order.
fn ordered_counts<'a>(keys: impl Iterator<Item = &'a str>) -> Vec<(String, usize)> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    for key in keys {
        match counts.iter_mut().find(|(name, _)| name == key) {
            Some((_, count)) => *count += 1,
            None => counts.push((key.to_string(), 1)),
        }
    }
    counts
}

fn markdown_cell(text: &str) -> String {
    text.replace('|', "\\|")
}

/// Render the human-readable catalog.
pub fn render_catalog_markdown(entries: &[CatalogEntry], generated_on: &str) -> String {
    let lane_counts = ordered_counts(entries.iter().map(|entry| entry.lane.as_str()));
    let bucket_counts = ordered_counts(entries.iter().map(|entry| entry.bucket.as_str()));

    let mut lines: Vec<String> = vec![
        "# Task Catalog".to_string(),
        String::new(),
        format!("_Generated on {generated_on}._"),
        String::new(),
        "## Coverage Summary".to_string(),
        String::new(),
        format!("- Total tasks: **{}**", entries.len()),
    ];
    let lane_summary = lane_counts
        .iter()
        .map(|(lane, count)| format!("{lane} **{count}**"))
        .collect::<Vec<_>>()
        .join(", ");
    let bucket_summary = bucket_counts
        .iter()
        .map(|(bucket, count)| format!("{bucket} **{count}**"))
        .collect::<Vec<_>>()
        .join(", ");
    lines.push(format!(
        "- Lane counts: {}",
        if lane_summary.is_empty() {
            "none".to_string()
        } else {
            lane_summary
        }
    ));
    lines.push(format!(
        "- Bucket counts: {}",
        if bucket_summary.is_empty() {
            "none".to_string()
        } else {
            bucket_summary
        }
    ));
    lines.push(String::new());
    lines.push("## Tasks".to_string());
    lines.push(String::new());
    lines.push("| Task ID | Title | Group | Lane | Bucket | Labels | Status |".to_string());
    lines.push("| --- | --- | --- | --- | --- | --- | --- |".to_string());
    for entry in entries {
        lines.push(format!(
            "| {} | {} | {} | {} | {} | {} | open |",
            markdown_cell(&entry.task_id),
            markdown_cell(&entry.title),
            markdown_cell(&entry.group),
            markdown_cell(&entry.lane),
            markdown_cell(&entry.bucket),
            markdown_cell(&entry.labels.join(", ")),
        ));
    }
    lines.join("\n") + "\n"
}

/// Serialize the machine-readable catalog with stable key ordering.
pub fn serialize_catalog_json(entries: &[CatalogEntry], generated_on: &str) -> Result<String> {
    let file = CatalogFile {
        generated_on,
        task_count: entries.len(),
        tasks: entries,
    };
    let json = serde_json::to_string_pretty(&file).context("serialize catalog")?;
    Ok(json + "\n")
}

/// Expand the config and overwrite both catalog artifacts wholesale.
///
/// `out_md`/`out_json` are already resolved against the project root; `root`
/// is only used to render written paths in output.
pub fn seed(
    config: &SeedConfig,
    generated_on: &str,
    out_md: &Path,
    out_json: &Path,
    root: &Path,
) -> Result<()> {
    validate_generated_on(generated_on)?;
    let entries = expand_catalog(config);
    tracing::debug!(task_count = entries.len(), "expanded seed config");

    // The warning goes to stderr so stdout stays machine-parseable.
    if let Some(expected) = config.expected_task_count {
        if expected != entries.len() as u64 {
            eprintln!(
                "warning: expected {expected} tasks, found {}",
                entries.len()
            );
        }
    }

    let markdown = render_catalog_markdown(&entries, generated_on);
    let json = serialize_catalog_json(&entries, generated_on)?;

    for out in [out_md, out_json] {
        if let Some(parent) = out.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create output directory {}", parent.display()))?;
        }
    }
    std::fs::write(out_md, markdown)
        .with_context(|| format!("write catalog markdown {}", out_md.display()))?;
    std::fs::write(out_json, json)
        .with_context(|| format!("write catalog json {}", out_json.display()))?;

    println!("Wrote task catalog markdown to {}", display_path(out_md, root));
    println!("Wrote task catalog json to {}", display_path(out_json, root));
    Ok(())
}
