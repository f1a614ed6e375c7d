//! Line commands of the interactive session.

use std::path::PathBuf;

use chrono::NaiveDate;
use rate_core::RateTable;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::utils::{ParseDateError, ParseDecimalError, parse_date, parse_decimal};

pub const HELP: &str = "\
Commands:
  class <name|number>   select the customer class
  classes               list customer classes
  value <number>        set the consumption (kWh) or demand (kW) value
  from [date]           set the range start, or clear it
  to [date]             set the range end, or clear it
  dates <from> <to>     set both ends of the range
  submit                look up the matching rates
  download [file]       save the result as CSV and clear the form
  reset                 clear the form
  show                  redraw the form
  log <level>           change the log level (error, warn, info, debug, trace)
  help                  show this help
  quit                  leave the session
Dates are YYYY-MM-DD or MM/DD/YYYY.";

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("unknown command '{0}', type `help` for a list")]
    Unknown(String),

    #[error("`{command}` needs {argument}")]
    MissingArgument {
        command: &'static str,
        argument: &'static str,
    },

    #[error("`{0}` takes no arguments")]
    UnexpectedArgument(&'static str),

    #[error(transparent)]
    InvalidNumber(#[from] ParseDecimalError),

    #[error(transparent)]
    InvalidDate(#[from] ParseDateError),

    #[error("unknown customer class '{0}', type `classes` for a list")]
    UnknownClass(String),

    #[error("there is no class number {index}, pick 1 to {count}")]
    ClassOutOfRange { index: usize, count: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Class name or 1-based number, resolved with [`resolve_class`].
    Class(String),
    Classes,
    Value(Decimal),
    From(Option<NaiveDate>),
    To(Option<NaiveDate>),
    Dates(NaiveDate, NaiveDate),
    Submit,
    Download(Option<PathBuf>),
    Reset,
    Show,
    Log(String),
    Help,
    Quit,
}

fn no_argument(
    command: &'static str,
    rest: &str,
    parsed: Command,
) -> Result<Command, CommandError> {
    if rest.is_empty() {
        Ok(parsed)
    } else {
        Err(CommandError::UnexpectedArgument(command))
    }
}

fn optional_date(rest: &str) -> Result<Option<NaiveDate>, CommandError> {
    if rest.is_empty() {
        Ok(None)
    } else {
        Ok(Some(parse_date(rest)?))
    }
}

impl Command {
    /// Parses one input line. Blank lines yield `None`.
    pub fn parse(line: &str) -> Result<Option<Self>, CommandError> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }

        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        let command = match word.to_ascii_lowercase().as_str() {
            "class" => {
                if rest.is_empty() {
                    return Err(CommandError::MissingArgument {
                        command: "class",
                        argument: "a class name or number",
                    });
                }
                Self::Class(rest.to_string())
            }
            "classes" => no_argument("classes", rest, Self::Classes)?,
            "value" => {
                if rest.is_empty() {
                    return Err(CommandError::MissingArgument {
                        command: "value",
                        argument: "a number",
                    });
                }
                Self::Value(parse_decimal(rest)?)
            }
            "from" => Self::From(optional_date(rest)?),
            "to" => Self::To(optional_date(rest)?),
            "dates" => {
                let mut parts = rest.split_whitespace();
                let (Some(from), Some(to), None) = (parts.next(), parts.next(), parts.next())
                else {
                    return Err(CommandError::MissingArgument {
                        command: "dates",
                        argument: "a start and an end date",
                    });
                };
                Self::Dates(parse_date(from)?, parse_date(to)?)
            }
            "submit" => no_argument("submit", rest, Self::Submit)?,
            "download" => Self::Download((!rest.is_empty()).then(|| PathBuf::from(rest))),
            "reset" => no_argument("reset", rest, Self::Reset)?,
            "show" => no_argument("show", rest, Self::Show)?,
            "log" => {
                if rest.is_empty() {
                    return Err(CommandError::MissingArgument {
                        command: "log",
                        argument: "a level",
                    });
                }
                Self::Log(rest.to_string())
            }
            "help" | "?" => Self::Help,
            "quit" | "exit" | "q" => Self::Quit,
            _ => return Err(CommandError::Unknown(word.to_string())),
        };

        Ok(Some(command))
    }
}

/// Resolves a class typed by the user against the loaded table.
///
/// Accepts a 1-based number from the class list, the exact class name, or
/// the name in any letter case.
pub fn resolve_class(
    table: &RateTable,
    input: &str,
) -> Result<String, CommandError> {
    let classes = table.classes();

    if let Ok(index) = input.parse::<usize>() {
        return match index.checked_sub(1).and_then(|i| classes.get(i)) {
            Some(class) => Ok(class.clone()),
            None => Err(CommandError::ClassOutOfRange {
                index,
                count: classes.len(),
            }),
        };
    }

    classes
        .iter()
        .find(|c| c.as_str() == input)
        .or_else(|| classes.iter().find(|c| c.eq_ignore_ascii_case(input)))
        .cloned()
        .ok_or_else(|| CommandError::UnknownClass(input.to_string()))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rate_core::RateRow;
    use rust_decimal_macros::dec;

    use super::*;

    fn date(
        y: i32,
        m: u32,
        d: u32,
    ) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn parse(line: &str) -> Command {
        Command::parse(line)
            .expect("should parse")
            .expect("should not be blank")
    }

    fn table() -> RateTable {
        ["Residential", "General Service A", "GP 13.8 KV and below"]
            .into_iter()
            .map(|class| RateRow {
                customer_class: class.to_string(),
                customer_subclass: String::new(),
                supply_period: date(2023, 1, 1),
                supply_period_start: None,
                supply_period_end: None,
                lower_limit_consumption: None,
                upper_limit_consumption: None,
                lower_limit_demand: None,
                upper_limit_demand: None,
                generation_charge_kwh: None,
                transmission_charge_kwh: None,
                distribution_charge_kwh: None,
                transmission_charge_kw: None,
                distribution_charge_kw: None,
                total_per_kw: None,
            })
            .collect()
    }

    #[test]
    fn blank_line_is_no_command() {
        assert!(Command::parse("   ").unwrap().is_none());
    }

    #[test]
    fn class_keeps_spaces_in_name() {
        assert_eq!(
            parse("class  GP 13.8 KV and below "),
            Command::Class("GP 13.8 KV and below".to_string())
        );
    }

    #[test]
    fn value_accepts_thousands_separator() {
        assert_eq!(parse("value 1,250.50"), Command::Value(dec!(1250.50)));
        assert_eq!(parse("VALUE 40"), Command::Value(dec!(40)));
    }

    #[test]
    fn from_and_to_may_clear_an_endpoint() {
        assert_eq!(parse("from 2023-01-01"), Command::From(Some(date(2023, 1, 1))));
        assert_eq!(parse("to 01/31/2023"), Command::To(Some(date(2023, 1, 31))));
        assert_eq!(parse("to"), Command::To(None));
    }

    #[test]
    fn dates_needs_exactly_two_dates() {
        assert_eq!(
            parse("dates 2023-01-01 2023-01-31"),
            Command::Dates(date(2023, 1, 1), date(2023, 1, 31))
        );
        assert!(matches!(
            Command::parse("dates 2023-01-01"),
            Err(CommandError::MissingArgument { command: "dates", .. })
        ));
        assert!(matches!(
            Command::parse("dates 2023-01-01 2023-01-31 2023-02-28"),
            Err(CommandError::MissingArgument { command: "dates", .. })
        ));
    }

    #[test]
    fn download_takes_optional_file() {
        assert_eq!(parse("download"), Command::Download(None));
        assert_eq!(
            parse("download jan.csv"),
            Command::Download(Some(PathBuf::from("jan.csv")))
        );
    }

    #[test]
    fn bad_input_is_reported() {
        assert!(matches!(Command::parse("dance"), Err(CommandError::Unknown(_))));
        assert!(matches!(
            Command::parse("value lots"),
            Err(CommandError::InvalidNumber(_))
        ));
        assert!(matches!(
            Command::parse("from yesterday"),
            Err(CommandError::InvalidDate(_))
        ));
        assert!(matches!(
            Command::parse("submit now"),
            Err(CommandError::UnexpectedArgument("submit"))
        ));
        assert!(matches!(
            Command::parse("value"),
            Err(CommandError::MissingArgument { command: "value", .. })
        ));
    }

    #[test]
    fn class_resolves_by_number_or_name() {
        let table = table();

        assert_eq!(resolve_class(&table, "2").unwrap(), "General Service A");
        assert_eq!(resolve_class(&table, "Residential").unwrap(), "Residential");
        assert_eq!(
            resolve_class(&table, "gp 13.8 kv and below").unwrap(),
            "GP 13.8 KV and below"
        );
    }

    #[test]
    fn class_resolution_errors() {
        let table = table();

        assert!(matches!(
            resolve_class(&table, "0"),
            Err(CommandError::ClassOutOfRange { index: 0, count: 3 })
        ));
        assert!(matches!(
            resolve_class(&table, "4"),
            Err(CommandError::ClassOutOfRange { index: 4, count: 3 })
        ));
        assert!(matches!(
            resolve_class(&table, "Industrial"),
            Err(CommandError::UnknownClass(_))
        ));
    }
}
