//! CLI argument parsing for the milestone gate suite.
//!
//! The CLI is intentionally thin: each subcommand resolves paths against an
//! explicit project root and hands off to the corresponding gate, so the core
//! logic stays free of filesystem-relative assumptions.
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Root CLI entrypoint for the gate suite.
#[derive(Parser, Debug)]
#[command(
    name = "mgate",
    version,
    about = "Deterministic task-catalog seeder and fixture/manifest drift gates",
    after_help = "Commands:\n  seed --config <file> --generated-on <date>  Emit the task catalog (Markdown + JSON)\n  parity [--conformance-root <dir>]           Check fixture trees against lane manifests\n  readiness --target-dir <dir> ...            Check required milestone artifacts exist\n\nExamples:\n  mgate seed --config planning/task_seeds.json --generated-on 2026-08-27\n  mgate parity --conformance-root tests/conformance\n  mgate readiness --target-dir spec/planning/m18 --manifest planning/m18_required.json\n  mgate readiness --target-dir spec/planning/m18 --required plan.md --required freeze.md",
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct RootArgs {
    #[command(subcommand)]
    pub command: Command,
}

/// Top-level gate commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate the deterministic task catalog from a seed config
    Seed(SeedArgs),
    /// Verify conformance fixture trees against their bucket manifests
    Parity(ParityArgs),
    /// Verify a milestone artifact directory contains its required files
    Readiness(ReadinessArgs),
}

#[derive(Parser, Debug)]
pub struct SeedArgs {
    /// Seed configuration file (JSON, section "task_seeds")
    #[arg(long, value_name = "FILE")]
    pub config: PathBuf,

    /// Project root that relative config and output paths resolve against
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub root: PathBuf,

    /// Catalog header date (YYYY-MM-DD); passed through verbatim, never
    /// derived from the wall clock
    #[arg(long, value_name = "DATE")]
    pub generated_on: String,

    /// Output path for the Markdown catalog (overrides the config default)
    #[arg(long, value_name = "PATH")]
    pub out_md: Option<PathBuf>,

    /// Output path for the JSON catalog (overrides the config default)
    #[arg(long, value_name = "PATH")]
    pub out_json: Option<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct ParityArgs {
    /// Conformance root containing one directory per lane bucket
    #[arg(long, value_name = "DIR", default_value = "tests/conformance")]
    pub conformance_root: PathBuf,

    /// Project root that relative paths resolve against
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub root: PathBuf,
}

#[derive(Parser, Debug)]
pub struct ReadinessArgs {
    /// Milestone artifact directory to check
    #[arg(long, value_name = "DIR")]
    pub target_dir: PathBuf,

    /// Required file, relative to the target directory (repeatable)
    #[arg(long = "required", value_name = "PATH", conflicts_with = "manifest")]
    pub required: Vec<String>,

    /// JSON file listing required files ({"required_files": [...]})
    #[arg(long, value_name = "FILE")]
    pub manifest: Option<PathBuf>,

    /// Project root that relative paths resolve against
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub root: PathBuf,
}
