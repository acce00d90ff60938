use clap::{ArgAction, Parser};
use coda_alfred::OutputFormat;

/// List Coda docs, pages and tables from the command line
///
/// Listings are printed as one JSON object per action, either as plain records
/// or as Alfred script-filter items. Docs and pages listings are cached for the
/// rest of the day. Requires the CODA_TOKEN environment variable.
#[derive(Parser, Debug)]
#[command(name = "coda-alfred", version, author)]
pub struct Cli {
    /// List all docs
    #[arg(short = 'd', long)]
    pub docs: bool,

    /// List all pages of a doc
    #[arg(short = 'p', long, value_name = "DOC_ID")]
    pub pages: Option<String>,

    /// Format output compatible with Alfred script filters
    #[arg(short = 'a', long)]
    pub alfred: bool,

    /// Print the tables of a doc
    #[arg(short = 't', long, value_name = "DOC_ID")]
    pub tables: Option<String>,

    /// Table cap for --tables (one table past the cap is still printed)
    #[arg(long, value_name = "N", requires = "tables")]
    pub max_tables: Option<usize>,

    /// Drop today's cached listings before running
    #[arg(short = 'r', long)]
    pub refresh: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short = 'v', long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    pub fn format(&self) -> OutputFormat {
        if self.alfred {
            OutputFormat::Launcher
        } else {
            OutputFormat::Plain
        }
    }

    /// Whether any flag asks for API work
    pub fn has_action(&self) -> bool {
        self.docs || self.pages.is_some() || self.tables.is_some()
    }

    /// Log level forced by -v, if any
    pub fn log_level(&self) -> Option<&'static str> {
        match self.verbose {
            0 => None,
            1 => Some("info"),
            _ => Some("debug"),
        }
    }
}
