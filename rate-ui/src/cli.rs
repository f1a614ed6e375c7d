use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;

use crate::{
    config::Overrides,
    utils::{parse_date, parse_decimal},
};

// ─── CLI definition ──────────────────────────────────────────────────────────

/// Historical electricity rates by customer class.
///
/// Loads the rate table once, then answers lookups: which rate rows apply
/// to a consumption (kWh) or demand (kW) value over a range of supply
/// periods.
#[derive(Debug, Parser)]
#[command(name = "rate-history", version, about)]
pub struct Cli {
    /// TOML file with defaults for the options below.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Rate table CSV file.
    #[arg(long, global = true)]
    pub source: Option<PathBuf>,

    /// Log level or filter directive, e.g. `debug` or `rate_core=trace,info`.
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Also append log output to this file.
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// List customer classes and the metric each is billed on.
    Classes,
    /// Run a single lookup and print the result.
    Query(QueryArgs),
    /// Interactive session on stdin/stdout.
    Session,
}

#[derive(Debug, Args)]
pub struct QueryArgs {
    /// Customer class name or its number in `classes`.
    #[arg(long)]
    pub class: String,

    /// Consumption (kWh) or demand (kW), depending on the class.
    #[arg(long, value_parser = decimal_arg, allow_hyphen_values = true)]
    pub value: Decimal,

    /// First supply period to include. Defaults to one year ago.
    #[arg(long, value_parser = date_arg)]
    pub from: Option<NaiveDate>,

    /// Last supply period to include. Defaults to today.
    #[arg(long, value_parser = date_arg)]
    pub to: Option<NaiveDate>,

    /// Save the result as CSV to this file.
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Write the charge history chart as SVG to this file.
    #[arg(long)]
    pub chart: Option<PathBuf>,
}

fn decimal_arg(s: &str) -> Result<Decimal, String> {
    parse_decimal(s).map_err(|e| e.to_string())
}

fn date_arg(s: &str) -> Result<NaiveDate, String> {
    parse_date(s).map_err(|e| e.to_string())
}

impl Cli {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            source: self.source.clone(),
            log_level: self.log_level.clone(),
            log_file: self.log_file.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn query_parses_all_options() {
        let cli = Cli::try_parse_from([
            "rate-history",
            "--source",
            "rates.csv",
            "query",
            "--class",
            "General Service B",
            "--value",
            "1,500",
            "--from",
            "2023-01-01",
            "--to",
            "01/31/2023",
            "--export",
            "out.csv",
        ])
        .expect("should parse");

        assert_eq!(cli.source, Some(PathBuf::from("rates.csv")));
        let CliCommand::Query(args) = cli.command else {
            panic!("expected query");
        };
        assert_eq!(args.class, "General Service B");
        assert_eq!(args.value, dec!(1500));
        assert_eq!(args.from, NaiveDate::from_ymd_opt(2023, 1, 1));
        assert_eq!(args.to, NaiveDate::from_ymd_opt(2023, 1, 31));
        assert_eq!(args.export, Some(PathBuf::from("out.csv")));
        assert_eq!(args.chart, None);
    }

    #[test]
    fn global_flags_may_follow_subcommand() {
        let cli = Cli::try_parse_from(["rate-history", "session", "--log-level", "debug"])
            .expect("should parse");

        assert!(matches!(cli.command, CliCommand::Session));
        assert_eq!(cli.overrides().log_level, Some("debug".to_string()));
    }

    #[test]
    fn negative_value_is_accepted_by_parser() {
        let cli = Cli::try_parse_from(["rate-history", "query", "--class", "1", "--value", "-5"])
            .expect("should parse");

        let CliCommand::Query(args) = cli.command else {
            panic!("expected query");
        };
        assert_eq!(args.value, dec!(-5));
    }

    #[test]
    fn bad_date_is_rejected() {
        let result = Cli::try_parse_from([
            "rate-history",
            "query",
            "--class",
            "1",
            "--value",
            "5",
            "--from",
            "January",
        ]);

        assert!(result.is_err());
    }
}
