use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Output format for CLI subcommands.
///
/// Implements [`FromStr`] so it can be used directly with `clap` argument parsing.
///
/// # Examples
///
/// ```
/// use faultline_core::OutputFormat;
///
/// let fmt: OutputFormat = "json".parse().unwrap();
/// assert_eq!(fmt, OutputFormat::Json);
///
/// let fmt: OutputFormat = "md".parse().unwrap();
/// assert_eq!(fmt, OutputFormat::Markdown);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable tables and summaries.
    #[default]
    Text,
    /// Machine-readable JSON with camelCase keys.
    Json,
    /// GitHub-flavored Markdown tables.
    Markdown,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Markdown => write!(f, "markdown"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            other => Err(format!("unknown output format: {other}")),
        }
    }
}

/// An item (commit or fix) left out of a run, with the reason why.
///
/// # Examples
///
/// ```
/// use faultline_core::Skipped;
///
/// let s = Skipped::new("abc123", "merge commit");
/// assert_eq!(s.reason, "merge commit");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Skipped {
    /// Commit identifier of the skipped item.
    pub id: String,
    /// Human-readable reason.
    pub reason: String,
}

impl Skipped {
    /// Create a skip record.
    pub fn new(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            reason: reason.into(),
        }
    }
}

/// Result of a whole run: the produced items plus an account of what was
/// processed and what was skipped.
///
/// Single-item failures never abort a run; they land in `skipped`.
///
/// # Examples
///
/// ```
/// use faultline_core::{RunReport, Skipped};
///
/// let mut report = RunReport::new(Vec::<u32>::new());
/// report.items.push(7);
/// report.processed += 1;
/// report.skip(Skipped::new("deadbeef", "root commit"));
/// assert_eq!(report.processed, 1);
/// assert_eq!(report.skipped.len(), 1);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport<T> {
    /// The run's output.
    pub items: T,
    /// Number of items handled successfully.
    pub processed: usize,
    /// Items left out, in encounter order.
    pub skipped: Vec<Skipped>,
}

impl<T> RunReport<T> {
    /// Start an empty report around `items`.
    pub fn new(items: T) -> Self {
        Self {
            items,
            processed: 0,
            skipped: Vec::new(),
        }
    }

    /// Record a skipped item.
    pub fn skip(&mut self, skipped: Skipped) {
        self.skipped.push(skipped);
    }
}
