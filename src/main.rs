mod attendance;
mod config;

use attendance::snapshot::{parse_instant, ReportOptions};
use attendance::summarize_week::{summarize_week_from_json_file, week_details_from_json_file};
use attendance::today::{day_events_from_json_file, today_overview_from_json_file};
use std::{io::Write, path::PathBuf};

use anyhow::{Context, Error};
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use config::Settings;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "attendance-week-summary")]
#[command(about = "Summarize employee attendance punches into daily and weekly work time")]
struct Cli {
    /// IANA timezone for day and week boundaries, overrides the snapshot
    #[arg(long, global = true)]
    timezone: Option<String>,
    /// Reference instant (RFC 3339) selecting the week or day to report
    #[arg(long, global = true, value_parser = parse_instant)]
    at: Option<DateTime<Utc>>,
    /// Where to write the JSON report
    #[arg(long, short, global = true)]
    output: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Weekly totals for every employee in the snapshot
    Week { file: PathBuf },
    /// Day by day breakdown of one employee's week
    Details {
        file: PathBuf,
        #[arg(long)]
        employee: String,
    },
    /// Who is in, out or missing on the reference day
    Today { file: PathBuf },
    /// Raw events of one employee on one local date
    Day {
        file: PathBuf,
        #[arg(long)]
        employee: String,
        #[arg(long)]
        date: NaiveDate,
    },
}

fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let settings = Settings::from_env();

    let options = ReportOptions {
        timezone: cli.timezone,
        default_timezone: settings.timezone,
        reference: cli.at,
        now: Utc::now(),
    };

    let report = match &cli.command {
        Commands::Week { file } => {
            serde_json::to_string_pretty(&summarize_week_from_json_file(file, &options)?)?
        }
        Commands::Details { file, employee } => {
            serde_json::to_string_pretty(&week_details_from_json_file(file, employee, &options)?)?
        }
        Commands::Today { file } => {
            serde_json::to_string_pretty(&today_overview_from_json_file(file, &options)?)?
        }
        Commands::Day {
            file,
            employee,
            date,
        } => {
            let day = day_events_from_json_file(file, employee, *date, &options)?;
            serde_json::to_string_pretty(&day)?
        }
    };

    let output = cli.output.unwrap_or(settings.output);
    let mut file = std::fs::File::create(&output)
        .with_context(|| format!("Failed to create file: {}", output.display()))?;
    file.write_all(report.as_bytes())?;

    info!(output = %output.display(), "wrote attendance report");

    Ok(())
}
