//! Interactive prompt loop.
//!
//! Generic over the input and output streams so the whole loop can be driven
//! from a byte buffer in tests.

use std::io::{self, BufRead, Write};
use tradenote_core::parse_user_datetime;
use tradenote_runner::{export_trade, AppConfig, CsvLedger, ExportRequest, HistoryFile, LedgerSink};
use tracing::warn;

const FROM_PROMPT: &str = "Enter from_date (e.g. 2024/1/14T14:30:00 or 2024/1/14): ";
const TO_PROMPT: &str = "Enter to_date (e.g. 2024/1/14T22:20:00 or 2024/1/14): ";
const SYMBOL_PROMPT: &str = "Enter symbol (e.g. usdjpy): ";
const CONTINUE_PROMPT: &str = "Continue exporting trade history? [y/n]: ";

/// One pass through the date and symbol prompts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Request(ExportRequest),
    Invalid(String),
    Quit,
}

pub struct Shell<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Shell<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn say(&mut self, line: &str) -> io::Result<()> {
        writeln!(self.output, "{line}")
    }

    /// Print `message` and read one line; `None` at end of input.
    pub fn prompt(&mut self, message: &str) -> io::Result<Option<String>> {
        write!(self.output, "{message}")?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    /// Ask until the answer is y/yes or n/no. End of input counts as no.
    pub fn ask_yes_no(&mut self, message: &str) -> io::Result<bool> {
        loop {
            let Some(answer) = self.prompt(message)? else {
                return Ok(false);
            };
            match answer.to_lowercase().as_str() {
                "y" | "yes" => return Ok(true),
                "n" | "no" => return Ok(false),
                _ => self.say("Please answer y or n.")?,
            }
        }
    }

    /// Collect a date range and symbol.
    pub fn read_request(&mut self) -> io::Result<Step> {
        let Some(from) = self.prompt(FROM_PROMPT)? else {
            return Ok(Step::Quit);
        };
        let Some(from) = parse_user_datetime(&from) else {
            return Ok(Step::Invalid(format!("'{from}' does not match the date format")));
        };

        let Some(to) = self.prompt(TO_PROMPT)? else {
            return Ok(Step::Quit);
        };
        let Some(to) = parse_user_datetime(&to) else {
            return Ok(Step::Invalid(format!("'{to}' does not match the date format")));
        };

        if from > to {
            return Ok(Step::Invalid("Error: from_date is later than to_date".into()));
        }

        let Some(symbol) = self.prompt(SYMBOL_PROMPT)? else {
            return Ok(Step::Quit);
        };
        if symbol.is_empty() {
            return Ok(Step::Invalid("a symbol is required".into()));
        }

        Ok(Step::Request(ExportRequest { from, to, symbol }))
    }

    /// Prompt, export, and ask whether to go again until the user stops.
    ///
    /// The history export is reopened every cycle so a refreshed file is
    /// picked up without restarting.
    pub fn run(&mut self, config: &AppConfig) -> io::Result<()> {
        let localization = config.localization();
        loop {
            let source = match HistoryFile::open(&config.source.history_path) {
                Ok(source) => source,
                Err(e) => {
                    self.say(&format!("Cannot open deal history: {e}"))?;
                    break;
                }
            };
            let mut ledger = CsvLedger::new(&config.ledger.path)
                .create_if_missing(config.ledger.create_if_missing);

            match self.read_request()? {
                Step::Quit => break,
                Step::Invalid(message) => self.say(&message)?,
                Step::Request(request) => {
                    match export_trade(&source, &mut ledger, &request, &localization) {
                        Ok(report) => {
                            let row = report.position.map(|p| p.row).unwrap_or_default();
                            self.say(&format!(
                                "Trade history saved to {} (row {row}, {} {} {})",
                                ledger.describe(),
                                report.summary.date.format("%Y/%m/%d"),
                                report.summary.symbol,
                                report.summary.direction,
                            ))?;
                        }
                        Err(e) => {
                            warn!(error = %e, "export failed");
                            self.say(&format!("Error: {e}"))?;
                        }
                    }
                }
            }

            if !self.ask_yes_no(CONTINUE_PROMPT)? {
                break;
            }
        }
        self.say("Finished exporting trade history.")
    }
}
