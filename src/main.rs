use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod catalog;
mod cli;
mod config;
mod parity;
mod readiness;
mod report;
mod util;

use cli::{Command, ParityArgs, ReadinessArgs, RootArgs, SeedArgs};
use report::GateReport;
use util::resolve_path;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = RootArgs::parse();
    let outcome = match args.command {
        Command::Seed(args) => cmd_seed(args).map(|()| 0),
        Command::Parity(args) => cmd_parity(args).map(print_report),
        Command::Readiness(args) => cmd_readiness(args).map(print_report),
    };

    match outcome {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            // Structural errors (bad config, unreadable inputs) are fatal and
            // distinguishable from drift by their exit code.
            eprintln!("error: {err:#}");
            std::process::exit(2);
        }
    }
}

fn print_report(report: GateReport) -> i32 {
    report.print();
    report.status().exit_code()
}

fn cmd_seed(args: SeedArgs) -> Result<()> {
    let root = args.root;
    let config_path = resolve_path(&args.config, &root);
    let config = config::load_seed_config(&config_path)?;
    tracing::info!(config = %config_path.display(), "loaded seed config");

    let out_md = resolve_path(args.out_md.as_ref().unwrap_or(&config.catalog_md), &root);
    let out_json = resolve_path(args.out_json.as_ref().unwrap_or(&config.catalog_json), &root);
    catalog::seed(&config, &args.generated_on, &out_md, &out_json, &root)
}

fn cmd_parity(args: ParityArgs) -> Result<GateReport> {
    let root = args.root;
    let conformance_root = resolve_path(&args.conformance_root, &root);
    Ok(parity::verify(
        &conformance_root,
        &parity::lane_specs(),
        &root,
    ))
}

fn cmd_readiness(args: ReadinessArgs) -> Result<GateReport> {
    let root = args.root;
    let target_dir = resolve_path(&args.target_dir, &root);
    let required_files = match &args.manifest {
        Some(manifest) => readiness::load_readiness_manifest(&resolve_path(manifest, &root))?,
        None if args.required.is_empty() => {
            return Err(anyhow::anyhow!(
                "readiness needs --manifest or at least one --required"
            ));
        }
        None => args.required,
    };
    Ok(readiness::check(&target_dir, &required_files, &root))
}
