mod aggregate;
mod cli;
mod ingest;
mod output;
mod pricing;
mod types;
mod users;

use anyhow::Result;
use clap::Parser;

use cli::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();
    cli.check_columns_scope()?;
    let mode = cli.effective_command();

    let records = ingest::read_csv(&cli.csv)?;

    let records: Vec<_> = if let Some(ref ws) = cli.workspace {
        let needle = ws.to_lowercase();
        records
            .into_iter()
            .filter(|r| r.workspace.to_lowercase().contains(&needle))
            .collect()
    } else {
        records
    };

    let records: Vec<_> = if cli.from.is_some() || cli.to.is_some() {
        records
            .into_iter()
            .filter(|r| {
                let Ok(date) = chrono::NaiveDate::parse_from_str(&r.date, "%Y-%m-%d") else {
                    return false;
                };
                cli.from.map_or(true, |f| date >= f) && cli.to.map_or(true, |t| date <= t)
            })
            .collect()
    } else {
        records
    };

    if records.is_empty() {
        eprintln!("No usage records found.");
        return Ok(());
    }

    eprintln!("Found {} usage records.", records.len());

    let pricing = pricing::PricingTable::builtin();

    let unpriced = pricing.unpriced_models(&records);
    if !unpriced.is_empty() {
        eprintln!("No pricing data for: {}", unpriced.join(", "));
    }

    match mode {
        cli::Command::Users => {
            let usage = aggregate::calculate_user_usage(&records, &pricing);
            let columns = cli::resolve_columns(cli.columns);
            match cli.format {
                cli::OutputFormat::Json => output::print_user_json(&usage),
                cli::OutputFormat::Table => {
                    output::print_user_table(&usage, &columns, cli.breakdown)
                }
            }
        }
        cli::Command::User { ref user, granularity } => {
            let daily = aggregate::calculate_user_daily_usage(&records, user, &pricing);
            if daily.is_empty() {
                eprintln!("No usage records for user '{user}'.");
                return Ok(());
            }
            let series = aggregate::bucket_daily(&daily, granularity);
            match cli.format {
                cli::OutputFormat::Json => output::print_period_json(&series),
                cli::OutputFormat::Table => output::print_period_table(&series, cli.breakdown),
            }
        }
    }

    Ok(())
}
