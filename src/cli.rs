use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};

use crate::aggregate::Granularity;

#[derive(Parser, Debug)]
#[command(
    name = "ucost",
    about = "Per-user cost breakdown for API usage CSV exports"
)]
pub struct Cli {
    /// Path to the usage CSV export
    pub csv: PathBuf,

    #[command(subcommand)]
    pub command: Option<Command>,

    /// Start date filter (YYYY-MM-DD)
    #[arg(long, global = true)]
    pub from: Option<NaiveDate>,

    /// End date filter (YYYY-MM-DD)
    #[arg(long, global = true)]
    pub to: Option<NaiveDate>,

    /// Output format: table (default), json
    #[arg(long, global = true, default_value = "table")]
    pub format: OutputFormat,

    /// Show per-model breakdown within each row
    #[arg(long, global = true)]
    pub breakdown: bool,

    /// Filter by workspace name (substring match)
    #[arg(long, global = true)]
    pub workspace: Option<String>,

    /// Columns to display (comma-separated).
    /// Use +col to add, -col to remove from defaults, or plain names to replace.
    /// Available: user,input,output,cost,jpy,models
    #[arg(long, global = true, value_delimiter = ',', allow_hyphen_values = true)]
    pub columns: Option<Vec<String>>,
}

pub const DEFAULT_COLUMNS: &[&str] = &["user", "input", "output", "cost", "jpy", "models"];

/// Resolve `--columns` into a final list.
/// - No flag → defaults
/// - All prefixed with +/- → modify defaults (e.g. `+jpy,-models`)
/// - Plain names → explicit replacement (e.g. `user,cost`)
pub fn resolve_columns(raw: Option<Vec<String>>) -> Vec<String> {
    let Some(raw) = raw else {
        return DEFAULT_COLUMNS.iter().map(|s| s.to_string()).collect();
    };

    let is_modifier = raw.iter().all(|c| c.starts_with('+') || c.starts_with('-'));

    if !is_modifier {
        return raw;
    }

    let mut cols: Vec<String> = DEFAULT_COLUMNS.iter().map(|s| s.to_string()).collect();
    for entry in &raw {
        if let Some(name) = entry.strip_prefix('+') {
            if !cols.iter().any(|c| c == name) {
                cols.push(name.to_string());
            }
        } else if let Some(name) = entry.strip_prefix('-') {
            cols.retain(|c| c != name);
        }
    }
    cols
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Per-user cost summary, highest spender first (default)
    Users,
    /// One user's cost series by day, ISO week, or month
    User {
        /// Display user, as shown in the summary (e.g. "alice smith")
        user: String,
        /// Period length for the series
        #[arg(long, default_value = "daily")]
        granularity: Granularity,
    },
}

#[derive(ValueEnum, Debug, Clone, PartialEq)]
pub enum OutputFormat {
    Table,
    Json,
}

impl Cli {
    pub fn effective_command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Users)
    }

    /// `--columns` shapes the users summary table only. Reject it on the
    /// per-user series rather than silently ignoring it.
    pub fn check_columns_scope(&self) -> anyhow::Result<()> {
        if self.columns.is_some() && matches!(self.effective_command(), Command::User { .. }) {
            anyhow::bail!("--columns is only supported for the users summary");
        }
        Ok(())
    }
}
