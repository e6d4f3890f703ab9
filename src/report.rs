//! Report rendering: the exportable two-sheet spreadsheet (one CSV file per
//! sheet, with an optional JSON variant) and the per-agent summary shown by
//! the `summary` subcommand.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::Result;
use crate::models::{AgentSummary, KpiRow, PeriodKey};

pub const DAILY_SHEET: &str = "DAILY_SO_KPI";
pub const MONTHLY_SHEET: &str = "MONTHLY_SO_KPI";

/// NaN scores (undefined KPI, SO_COUNT = 0) render as an empty cell.
fn score_cell(score: f64) -> String {
    if score.is_nan() {
        String::new()
    } else {
        format!("{score:.2}")
    }
}

/// Write one KPI table as a CSV sheet with the fixed column order.
pub fn write_csv_sheet<P: PeriodKey, W: Write>(
    rows: &[KpiRow<P>],
    period_header: &str,
    out: W,
) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record([
        period_header,
        "AGENT",
        "SO_COUNT",
        "COUNT_OF_MISTAKE_SO",
        "NUMBER_OF_MISTAKES",
        "SO_KPI_SCORE",
        "SO_KPI_FAIL",
        "MISTAKE_KPI_SCORE",
        "MISTAKE_KPI_FAIL",
    ])?;
    for row in rows {
        writer.write_record([
            row.period.label(),
            row.agent.clone(),
            row.so_count.to_string(),
            row.count_of_mistake_so.to_string(),
            row.number_of_mistakes.to_string(),
            score_cell(row.so_kpi_score),
            score_cell(row.so_kpi_fail),
            score_cell(row.mistake_kpi_score),
            score_cell(row.mistake_kpi_fail),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn create_sheet_file(dir: &Path, name: &str, ext: &str) -> Result<BufWriter<File>> {
    Ok(BufWriter::new(File::create(
        dir.join(format!("{name}.{ext}")),
    )?))
}

/// Write both sheets as CSV files into `dir`.
pub fn write_csv_report<D: PeriodKey, M: PeriodKey>(
    daily: &[KpiRow<D>],
    monthly: &[KpiRow<M>],
    dir: &Path,
) -> Result<()> {
    std::fs::create_dir_all(dir)?;
    write_csv_sheet(daily, "SO_DATE", create_sheet_file(dir, DAILY_SHEET, "csv")?)?;
    write_csv_sheet(monthly, "MONTH", create_sheet_file(dir, MONTHLY_SHEET, "csv")?)?;
    Ok(())
}

/// Write both sheets as JSON files into `dir`. Non-finite scores and
/// unknown-bucket periods serialize as `null`.
pub fn write_json_report<D, M>(daily: &[KpiRow<D>], monthly: &[KpiRow<M>], dir: &Path) -> Result<()>
where
    D: PeriodKey + serde::Serialize,
    M: PeriodKey + serde::Serialize,
{
    std::fs::create_dir_all(dir)?;
    let mut out = create_sheet_file(dir, DAILY_SHEET, "json")?;
    serde_json::to_writer_pretty(&mut out, daily).map_err(std::io::Error::other)?;
    out.flush()?;
    let mut out = create_sheet_file(dir, MONTHLY_SHEET, "json")?;
    serde_json::to_writer_pretty(&mut out, monthly).map_err(std::io::Error::other)?;
    out.flush()?;
    Ok(())
}

/// Mean KPI scores per agent across all periods of one table, skipping
/// undefined (NaN) entries, sorted by descending SO KPI mean.
pub fn summarize_by_agent<P: PeriodKey>(rows: &[KpiRow<P>]) -> Vec<AgentSummary> {
    // (so sum, so n, mistake sum, mistake n, rows)
    let mut map: BTreeMap<String, (f64, usize, f64, usize, usize)> = BTreeMap::new();

    for row in rows {
        let entry = map.entry(row.agent.clone()).or_default();
        if !row.so_kpi_score.is_nan() {
            entry.0 += row.so_kpi_score;
            entry.1 += 1;
        }
        if !row.mistake_kpi_score.is_nan() {
            entry.2 += row.mistake_kpi_score;
            entry.3 += 1;
        }
        entry.4 += 1;
    }

    let mean = |sum: f64, n: usize| if n == 0 { f64::NAN } else { sum / n as f64 };
    let mut summaries: Vec<AgentSummary> = map
        .into_iter()
        .map(|(agent, (so_sum, so_n, mk_sum, mk_n, periods))| AgentSummary {
            agent,
            avg_so_kpi_score: mean(so_sum, so_n),
            avg_mistake_kpi_score: mean(mk_sum, mk_n),
            period_count: periods,
        })
        .collect();

    summaries.sort_by(|a, b| {
        b.avg_so_kpi_score
            .partial_cmp(&a.avg_so_kpi_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    summaries
}

/// Human-readable summary listing, one line per agent.
pub fn render_summary(view_label: &str, summaries: &[AgentSummary], limit: usize) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "{view_label} KPI averages by agent:");
    if summaries.is_empty() {
        let _ = writeln!(output, "No rows matched the current filters.");
        return output;
    }
    for summary in summaries.iter().take(limit) {
        let _ = writeln!(
            output,
            "- {}: SO KPI {:.2} | mistake KPI {:.2} across {} period(s)",
            summary.agent,
            summary.avg_so_kpi_score,
            summary.avg_mistake_kpi_score,
            summary.period_count
        );
    }
    output
}
