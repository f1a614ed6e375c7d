//! Plain-text [`Presenter`] for the command line.
//!
//! Widgets become one line each, tables are drawn with comfy-table and the
//! chart is written as an SVG file when a chart path is set. Otherwise each
//! series is summarised on one line.

use std::{
    fmt, fs,
    io::Write,
    path::{Path, PathBuf},
};

use chrono::NaiveDate;
use rate_core::{Column, DateSelection, Download, Presenter, RateRow};
use rust_decimal::Decimal;
use tracing::{error, info, warn};

use crate::{
    chart::{self, ChartError},
    tables::build_rate_table,
    utils::opt_date_display,
};

pub const RESULT_HEADING: &str = "Filtered Data";

pub struct TerminalPresenter<W: Write> {
    out: W,
    chart_path: Option<PathBuf>,
    export_target: Option<PathBuf>,
}

impl<W: Write> TerminalPresenter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            chart_path: None,
            export_target: None,
        }
    }

    /// Charts are written to `path` as SVG instead of being summarised.
    pub fn with_chart_path(
        mut self,
        path: Option<PathBuf>,
    ) -> Self {
        self.chart_path = path;
        self
    }

    /// The next download button rendered saves its file to `path`.
    pub fn set_export_target(
        &mut self,
        path: PathBuf,
    ) {
        self.export_target = Some(path);
    }

    /// Drops an export target no download button consumed.
    pub fn take_export_target(&mut self) -> Option<PathBuf> {
        self.export_target.take()
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Writes one line of output.
    pub fn line(
        &mut self,
        args: fmt::Arguments<'_>,
    ) {
        if let Err(e) = writeln!(self.out, "{args}") {
            error!("failed to write output: {e}");
        }
    }

    pub fn flush(&mut self) {
        if let Err(e) = self.out.flush() {
            error!("failed to flush output: {e}");
        }
    }

    fn summarise_chart(
        &mut self,
        rows: &[RateRow],
        x: Column,
        y: &[Column],
    ) {
        let series = match chart::collect_series(rows, x, y) {
            Ok(series) => series,
            Err(e) => {
                warn!("chart skipped: {e}");
                return;
            }
        };
        if series.is_empty() {
            self.line(format_args!("No charge values to chart."));
            return;
        }

        self.line(format_args!("Charge history by {x}:"));
        for s in &series {
            let (Some((first_date, first)), Some((last_date, last)), Some(min), Some(max)) =
                (s.first(), s.last(), s.min(), s.max())
            else {
                continue;
            };
            self.line(format_args!(
                "  {}: {first} ({first_date}) -> {last} ({last_date}), min {min}, max {max}",
                s.column
            ));
        }
    }

    fn write_chart(
        &mut self,
        path: &Path,
        rows: &[RateRow],
        x: Column,
        y: &[Column],
    ) {
        let svg = match chart::render_svg(rows, x, y) {
            Ok(svg) => svg,
            Err(ChartError::NoData) => {
                self.line(format_args!("No charge values to chart."));
                return;
            }
            Err(e) => {
                error!("chart rendering failed: {e}");
                self.render_error(&format!("Could not draw the chart: {e}"));
                return;
            }
        };

        match fs::write(path, svg) {
            Ok(()) => {
                info!(path = %path.display(), "chart written");
                self.line(format_args!("Chart saved to {}", path.display()));
            }
            Err(e) => {
                error!(path = %path.display(), "failed to write chart: {e}");
                self.render_error(&format!("Could not save the chart to {}: {e}", path.display()));
            }
        }
    }
}

impl<W: Write> Presenter for TerminalPresenter<W> {
    fn render_select(
        &mut self,
        label: &str,
        options: &[String],
        current: Option<&str>,
    ) {
        let position = current.and_then(|c| options.iter().position(|o| o == c));
        match (current, position) {
            (Some(current), Some(index)) => self.line(format_args!(
                "{label}: {current} [{}/{}]",
                index + 1,
                options.len()
            )),
            _ => self.line(format_args!("{label}: — [{} options]", options.len())),
        }
    }

    fn render_number_input(
        &mut self,
        label: &str,
        min: Decimal,
        current: Decimal,
    ) {
        self.line(format_args!("{label}: {current:.2} (min {min})"));
    }

    fn render_date_range_input(
        &mut self,
        label: &str,
        min: NaiveDate,
        max: NaiveDate,
        current: &DateSelection,
    ) {
        self.line(format_args!(
            "{label}: {} to {} (between {min} and {max})",
            opt_date_display(current.start),
            opt_date_display(current.end)
        ));
    }

    fn render_table(
        &mut self,
        rows: &[RateRow],
        columns: &[Column],
    ) {
        self.line(format_args!("{RESULT_HEADING}"));
        let table = build_rate_table(rows, columns);
        self.line(format_args!("{table}"));
        if rows.is_empty() {
            self.line(format_args!("No matching rates."));
        }
    }

    fn render_line_chart(
        &mut self,
        rows: &[RateRow],
        x: Column,
        y: &[Column],
    ) {
        match self.chart_path.clone() {
            Some(path) => self.write_chart(&path, rows, x, y),
            None => self.summarise_chart(rows, x, y),
        }
    }

    fn render_download_button(
        &mut self,
        download: &Download,
    ) -> bool {
        let Some(path) = self.export_target.take() else {
            self.line(format_args!(
                "[{}] type `download` to save {}",
                download.label, download.file_name
            ));
            return false;
        };

        match fs::write(&path, &download.bytes) {
            Ok(()) => {
                info!(path = %path.display(), bytes = download.bytes.len(), mime = %download.mime, "download saved");
                self.line(format_args!(
                    "Saved {} to {} ({} bytes)",
                    download.file_name,
                    path.display(),
                    download.bytes.len()
                ));
                true
            }
            Err(e) => {
                error!(path = %path.display(), "failed to save download: {e}");
                self.render_error(&format!("Could not save {}: {e}", path.display()));
                false
            }
        }
    }

    fn render_error(
        &mut self,
        message: &str,
    ) {
        self.line(format_args!("Error: {message}"));
    }
}
