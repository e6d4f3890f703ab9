use std::path::PathBuf;

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

mod error;
mod ingest;
mod kpi;
mod models;
mod report;
mod schema;

#[derive(Parser)]
#[command(name = "team-kpi")]
#[command(about = "Daily and monthly team KPIs from sales-order and mistake logs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ReportFormat {
    Csv,
    Json,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum View {
    Daily,
    Monthly,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the daily and monthly KPI sheets to a report directory
    Report {
        /// Sales-order log (CSV)
        #[arg(long)]
        sales: PathBuf,
        /// Mistake log (CSV)
        #[arg(long)]
        mistakes: PathBuf,
        #[arg(long, default_value = "kpi-report")]
        out_dir: PathBuf,
        /// Restrict to these agents (repeatable; default: all)
        #[arg(long)]
        agent: Vec<String>,
        /// Daily sheet: first date to include (YYYY-MM-DD)
        #[arg(long)]
        from: Option<NaiveDate>,
        /// Daily sheet: last date to include (YYYY-MM-DD)
        #[arg(long)]
        to: Option<NaiveDate>,
        /// Monthly sheet: single YYYY-MM bucket to include
        #[arg(long)]
        month: Option<String>,
        #[arg(long, value_enum, default_value = "csv")]
        format: ReportFormat,
    },
    /// Print per-agent KPI averages
    Summary {
        /// Sales-order log (CSV)
        #[arg(long)]
        sales: PathBuf,
        /// Mistake log (CSV)
        #[arg(long)]
        mistakes: PathBuf,
        /// Restrict to these agents (repeatable; default: all)
        #[arg(long)]
        agent: Vec<String>,
        #[arg(long, value_enum, default_value = "daily")]
        view: View,
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Report {
            sales,
            mistakes,
            out_dir,
            agent,
            from,
            to,
            month,
            format,
        } => {
            let sales_records = ingest::load_sales(&sales)?;
            let mistake_records = ingest::load_mistakes(&mistakes)?;

            let daily = kpi::daily_kpi(&sales_records, &mistake_records);
            let monthly = kpi::monthly_kpi(&sales_records, &mistake_records);

            let daily = kpi::filter_by_agents(&daily, &agent);
            let daily = kpi::filter_by_date_range(&daily, from, to);
            let monthly = kpi::filter_by_agents(&monthly, &agent);
            let monthly = match &month {
                Some(month) => kpi::filter_by_month(&monthly, month),
                None => monthly,
            };

            match format {
                ReportFormat::Csv => report::write_csv_report(&daily, &monthly, &out_dir),
                ReportFormat::Json => report::write_json_report(&daily, &monthly, &out_dir),
            }
            .with_context(|| format!("failed to write report to {}", out_dir.display()))?;

            println!(
                "Report written to {} ({} daily rows, {} monthly rows).",
                out_dir.display(),
                daily.len(),
                monthly.len()
            );
        }
        Commands::Summary {
            sales,
            mistakes,
            agent,
            view,
            limit,
        } => {
            let sales_records = ingest::load_sales(&sales)?;
            let mistake_records = ingest::load_mistakes(&mistakes)?;

            let output = match view {
                View::Daily => {
                    let daily = kpi::daily_kpi(&sales_records, &mistake_records);
                    let daily = kpi::filter_by_agents(&daily, &agent);
                    report::render_summary("Daily", &report::summarize_by_agent(&daily), limit)
                }
                View::Monthly => {
                    let monthly = kpi::monthly_kpi(&sales_records, &mistake_records);
                    let monthly = kpi::filter_by_agents(&monthly, &agent);
                    report::render_summary(
                        "Monthly",
                        &report::summarize_by_agent(&monthly),
                        limit,
                    )
                }
            };
            print!("{output}");
        }
    }

    Ok(())
}
