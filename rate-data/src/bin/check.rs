use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use rate_core::metric_for_class;
use rate_data::load_from_file;
use tracing_subscriber::EnvFilter;

/// Validate a rate table (CSV or workbook) and summarise its contents.
///
/// The file must carry every rate table column (see the loader docs):
/// Customer Class, Customer Subclass, Supply Period, Supply Period Start,
/// Supply Period End, the consumption and demand limits, and the six charges.
#[derive(Parser, Debug)]
#[command(name = "rate-data-check")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the CSV or workbook file containing the rate table
    #[arg(short, long)]
    file: PathBuf,
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::from("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .with_target(false)
        .init();

    let args = Args::parse();

    println!("Checking rate table: {}", args.file.display());

    let table = load_from_file(&args.file)
        .with_context(|| format!("Failed to load rate table: {}", args.file.display()))?;

    println!("Parsed {} rows", table.len());

    match table.supply_period_span() {
        Some((first, last)) => println!("Supply periods: {first} to {last}"),
        None => println!("Supply periods: none"),
    }

    println!("Customer classes:");
    for class in table.classes() {
        println!(
            "  {class} ({}): {} rows",
            metric_for_class(class),
            table.rows_for(class).count()
        );
    }

    Ok(())
}
