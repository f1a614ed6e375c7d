use std::{io, sync::Arc};

use anyhow::Context;
use clap::Parser;
use tracing::{debug, info};

use rate_data::load_from_file;
use rate_ui::{
    RateApp, TerminalPresenter,
    app::{self, local_today},
    cli::{Cli, CliCommand},
    config::{FileConfig, Settings},
    logging,
};

// ─── entry point ─────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let file = match &cli.config {
        Some(path) => FileConfig::load(path)?,
        None => FileConfig::default(),
    };
    let settings =
        Settings::resolve(cli.overrides(), file, local_today()).context("invalid configuration")?;

    logging::init_logging(&settings.log_level);
    if let Some(path) = &settings.log_file {
        logging::enable_file_logging(path)?;
    }
    debug!("settings:\n{settings}");

    let table = load_from_file(&settings.source).with_context(|| {
        format!("failed to load rate table from {}", settings.source.display())
    })?;
    info!(
        rows = table.len(),
        classes = table.classes().len(),
        "rate table loaded"
    );

    match cli.command {
        CliCommand::Classes => app::print_classes(&table, io::stdout().lock()),
        CliCommand::Query(args) => {
            let mut app = RateApp::new(Arc::new(table), &settings);
            let mut presenter =
                TerminalPresenter::new(io::stdout().lock()).with_chart_path(args.chart.clone());
            app.run_query(&args, &mut presenter)
        }
        CliCommand::Session => {
            let chart_path = app::chart_path(&settings);
            let mut app = RateApp::new(Arc::new(table), &settings);
            let mut presenter = TerminalPresenter::new(io::stdout().lock()).with_chart_path(chart_path);
            app.run_session(io::stdin().lock(), &mut presenter)
        }
    }
}
