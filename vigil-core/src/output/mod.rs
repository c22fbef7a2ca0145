mod human;
mod json;

pub use human::HumanFormatter;
pub use json::JsonFormatter;

use serde::{Deserialize, Serialize};

use crate::check::CheckReport;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Human,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "human" | "text" | "nagios" => Ok(OutputFormat::Human),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown output format: {}", s)),
        }
    }
}

pub trait OutputFormatter {
    fn format_report(&self, report: &CheckReport) -> String;
    /// Render a failure that stopped the run before any probing.
    fn format_error(&self, error: &dyn std::fmt::Display) -> String;
}

pub fn get_formatter(format: OutputFormat, verbose: bool) -> Box<dyn OutputFormatter> {
    match format {
        OutputFormat::Human => {
            let formatter = HumanFormatter::new();
            if verbose {
                Box::new(formatter.verbose())
            } else {
                Box::new(formatter)
            }
        }
        OutputFormat::Json => Box::new(JsonFormatter::new()),
    }
}
