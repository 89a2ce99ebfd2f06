//! `factorial-plan`: solve a plan file against a catalog export and print
//! the productions.

mod report;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Catalog export (JSON, RON or TOML)
    #[arg(long)]
    data: PathBuf,
    /// Plan file (RON, TOML or JSON)
    #[arg(long)]
    plan: PathBuf,
    /// Print only the flat production table
    #[arg(long)]
    flat: bool,
    /// Print amounts as decimals instead of exact fractions
    #[arg(long)]
    decimals: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let data = factorial_data::load_catalog(&args.data)
        .with_context(|| format!("loading catalog {}", args.data.display()))?;
    let config = factorial_data::load_plan(&args.plan, &data)
        .with_context(|| format!("loading plan {}", args.plan.display()))?;

    let plan = factorial_planner::plan(&data, &config).context("planning failed")?;
    info!(productions = plan.productions.len(), score = %plan.score, "plan solved");

    let style = report::Style {
        decimals: args.decimals,
    };
    print!("{}", report::table(&data, &plan, style)?);
    if !args.flat {
        println!();
        print!("{}", report::tree(&data, &plan, style)?);
    }
    Ok(())
}
