//! Session driver: applies user actions to the selection state and redraws
//! the form after each one.

use std::{
    io::{BufRead, Write},
    path::PathBuf,
    sync::Arc,
};

use anyhow::{Context, Result, bail};
use chrono::{Local, NaiveDate};
use rate_core::{
    DateSelection, Event, EventOutcome, Presenter, RateTable, SelectionState, SessionPhase,
};
use rate_data::EXPORT_FILE_NAME;
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use crate::{
    cli::QueryArgs,
    commands::{Command, HELP, resolve_class},
    config::Settings,
    logging,
    tables::build_classes_table,
    terminal::TerminalPresenter,
    view::{self, DateBounds, INVALID_RANGE_MESSAGE},
};

pub const CHART_FILE_NAME: &str = "rate_chart.svg";
pub const NO_CLASS_MESSAGE: &str = "Select a customer class first.";

pub fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

/// Negative values are clamped to the input's minimum of 0.
fn clamp_value(value: Decimal) -> Decimal {
    if value < Decimal::ZERO {
        warn!(%value, "negative value clamped to 0");
        Decimal::ZERO
    } else {
        value
    }
}

pub struct RateApp {
    table: Arc<RateTable>,
    state: SelectionState,
    min_date: NaiveDate,
    export_dir: PathBuf,
    clock: fn() -> NaiveDate,
}

impl RateApp {
    pub fn new(
        table: Arc<RateTable>,
        settings: &Settings,
    ) -> Self {
        Self::with_clock(table, settings, local_today)
    }

    /// Uses `clock` for "today" instead of the local date.
    pub fn with_clock(
        table: Arc<RateTable>,
        settings: &Settings,
        clock: fn() -> NaiveDate,
    ) -> Self {
        Self {
            table,
            state: SelectionState::new(clock()),
            min_date: settings.min_date,
            export_dir: settings.export_dir.clone(),
            clock,
        }
    }

    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    pub fn table(&self) -> &RateTable {
        &self.table
    }

    /// Applies `event` without drawing anything.
    pub fn apply(
        &mut self,
        event: Event,
    ) -> EventOutcome {
        self.state.handle_event(&self.table, event)
    }

    /// One interaction: apply `event`, draw the form, apply whatever the
    /// user did with the drawn widgets, then finish the cycle.
    pub fn cycle<P: Presenter + ?Sized>(
        &mut self,
        presenter: &mut P,
        event: Option<Event>,
    ) -> Option<EventOutcome> {
        let today = (self.clock)();

        // The class selector always shows a choice; without one it shows the first class.
        if self.state.selected_class().is_none() {
            if let Some(first) = self.table.classes().first().cloned() {
                self.apply(Event::SelectClass(first));
            }
        }

        let outcome = event.map(|event| self.apply(event));
        if outcome == Some(EventOutcome::NoClassSelected) {
            presenter.render_error(NO_CLASS_MESSAGE);
        }

        let bounds = DateBounds {
            min: self.min_date,
            max: today,
        };
        for follow_up in view::render(&self.state, &self.table, presenter, bounds) {
            let follow_up_outcome = self.apply(follow_up);
            debug!(?follow_up_outcome, "follow-up event applied");
        }

        self.state.end_cycle(today);
        outcome
    }

    /// Runs one lookup from command-line arguments.
    pub fn run_query<W: Write>(
        &mut self,
        args: &QueryArgs,
        presenter: &mut TerminalPresenter<W>,
    ) -> Result<()> {
        let class = resolve_class(&self.table, &args.class)?;
        let dates = match (args.from, args.to) {
            (None, None) => DateSelection::default_for((self.clock)()),
            (start, end) => DateSelection { start, end },
        };

        self.apply(Event::SelectClass(class));
        self.apply(Event::SetValue(clamp_value(args.value)));
        self.apply(Event::SetDateRange(dates));

        if let Some(path) = &args.export {
            presenter.set_export_target(path.clone());
        }

        let outcome = self.cycle(presenter, Some(Event::Submit));
        presenter.flush();

        match outcome {
            Some(EventOutcome::Submitted { matched }) => {
                info!(matched, "query finished");
                if presenter.take_export_target().is_some() {
                    warn!("no export written");
                }
                Ok(())
            }
            Some(EventOutcome::InvalidDateRange) => bail!(INVALID_RANGE_MESSAGE),
            other => bail!("lookup did not run: {other:?}"),
        }
    }

    /// Reads commands from `input` until `quit` or end of input.
    pub fn run_session<R: BufRead, W: Write>(
        &mut self,
        input: R,
        presenter: &mut TerminalPresenter<W>,
    ) -> Result<()> {
        info!(classes = self.table.classes().len(), "session started");
        presenter.line(format_args!("Type `help` for commands."));
        self.cycle(presenter, None);

        let mut lines = input.lines();
        loop {
            presenter.line(format_args!(""));
            presenter.flush();

            let Some(line) = lines.next() else {
                break;
            };
            let line = line.context("failed to read command")?;

            let command = match Command::parse(&line) {
                Ok(Some(command)) => command,
                Ok(None) => continue,
                Err(e) => {
                    presenter.render_error(&e.to_string());
                    continue;
                }
            };
            debug!(?command, "session command");

            if !self.run_command(command, presenter) {
                break;
            }
        }

        presenter.flush();
        info!("session ended");
        Ok(())
    }

    /// Returns `false` when the session should end.
    fn run_command<W: Write>(
        &mut self,
        command: Command,
        presenter: &mut TerminalPresenter<W>,
    ) -> bool {
        let event = match command {
            Command::Quit => return false,
            Command::Help => {
                presenter.line(format_args!("{HELP}"));
                return true;
            }
            Command::Classes => {
                presenter.line(format_args!("{}", build_classes_table(&self.table)));
                return true;
            }
            Command::Log(level) => {
                match logging::set_log_level(&level) {
                    Ok(()) => presenter.line(format_args!("Log level set to {level}")),
                    Err(e) => presenter.render_error(&e.to_string()),
                }
                return true;
            }
            Command::Show => None,
            Command::Class(input) => match resolve_class(&self.table, &input) {
                Ok(class) => Some(Event::SelectClass(class)),
                Err(e) => {
                    presenter.render_error(&e.to_string());
                    return true;
                }
            },
            Command::Value(value) => Some(Event::SetValue(clamp_value(value))),
            Command::From(start) => Some(Event::SetDateRange(DateSelection {
                start,
                ..self.state.requested_dates()
            })),
            Command::To(end) => Some(Event::SetDateRange(DateSelection {
                end,
                ..self.state.requested_dates()
            })),
            Command::Dates(start, end) => Some(Event::SetDateRange(DateSelection::range(start, end))),
            Command::Submit => Some(Event::Submit),
            Command::Reset => Some(Event::Reset),
            Command::Download(file) => {
                if !self.has_result() {
                    presenter.render_error("Nothing to download, run `submit` first.");
                    return true;
                }
                let file = file.unwrap_or_else(|| PathBuf::from(EXPORT_FILE_NAME));
                presenter.set_export_target(self.export_dir.join(file));
                None
            }
        };

        match self.cycle(presenter, event) {
            Some(EventOutcome::Submitted { matched }) => {
                presenter.line(format_args!("{matched} matching rate(s)."));
            }
            Some(EventOutcome::ResetScheduled) => presenter.line(format_args!("Form cleared.")),
            _ => {}
        }
        if presenter.take_export_target().is_some() {
            presenter.render_error("Nothing to download for this result.");
        }
        true
    }

    fn has_result(&self) -> bool {
        self.state.phase() == SessionPhase::Submitted
            && self.state.result().is_some_and(|rows| !rows.is_empty())
    }
}

/// Prints the customer classes of `table`.
pub fn print_classes<W: Write>(
    table: &RateTable,
    mut out: W,
) -> Result<()> {
    writeln!(out, "{}", build_classes_table(table)).context("failed to write class list")?;
    Ok(())
}

/// Chart file for sessions, when a chart directory is configured.
pub fn chart_path(settings: &Settings) -> Option<PathBuf> {
    settings.chart_dir.as_ref().map(|dir| dir.join(CHART_FILE_NAME))
}
