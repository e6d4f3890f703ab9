//! The KPI aggregation core.
//!
//! Daily and monthly tables are two instantiations of one aggregation driver
//! parameterized by a period-key selector, so the monthly roll-up is
//! consistent with the daily table by construction.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use tracing::info;

use crate::ingest::month_bucket;
use crate::models::{DailyKpiRow, KpiRow, MistakeRecord, MonthlyKpiRow, SalesRecord};

/// Category value normalization: trimmed, uppercased, spaces removed.
/// Only rows equal to exactly "SO" count toward KPIs.
fn is_so_category(category: &str) -> bool {
    let normalized: String = category
        .trim()
        .to_uppercase()
        .chars()
        .filter(|c| *c != ' ')
        .collect();
    normalized == "SO"
}

/// Restrict the mistake log to sales-order mistakes, discarding billing rows
/// before any aggregation.
pub fn so_mistakes(mistakes: &[MistakeRecord]) -> Vec<MistakeRecord> {
    mistakes
        .iter()
        .filter(|m| is_so_category(&m.category))
        .cloned()
        .collect()
}

#[derive(Debug, Clone, Copy, Default)]
struct MistakeTotals {
    count: u64,
    weight: f64,
}

fn kpi_score(mistakes: f64, so_count: u64) -> f64 {
    if so_count == 0 {
        f64::NAN
    } else {
        (1.0 - mistakes / so_count as f64) * 100.0
    }
}

/// Aggregate sales and SO-filtered mistakes into one KPI table.
///
/// Every (period, agent) with at least one sale produces exactly one row;
/// missing mistake totals zero-fill. Mistake-side keys with no matching sale
/// never appear, which also means mistakes logged under a misspelled agent
/// name silently fail to reduce anyone's score.
pub fn aggregate<P: Ord + Clone>(
    sales: &[SalesRecord],
    so_mistakes: &[MistakeRecord],
    sales_key: impl Fn(&SalesRecord) -> P,
    mistake_key: impl Fn(&MistakeRecord) -> P,
) -> Vec<KpiRow<P>> {
    // BTreeMap keys give the (period, agent) output order directly.
    let mut so_counts: BTreeMap<(P, String), u64> = BTreeMap::new();
    for sale in sales {
        *so_counts
            .entry((sales_key(sale), sale.agent.clone()))
            .or_insert(0) += 1;
    }

    // Count and weight accumulate together, so neither metric can drop the
    // other for a key that has only one of them.
    let mut mistake_totals: BTreeMap<(P, String), MistakeTotals> = BTreeMap::new();
    for mistake in so_mistakes {
        let entry = mistake_totals
            .entry((mistake_key(mistake), mistake.agent.clone()))
            .or_default();
        entry.count += 1;
        entry.weight += mistake.weight;
    }

    so_counts
        .into_iter()
        .map(|((period, agent), so_count)| {
            let totals = mistake_totals
                .get(&(period.clone(), agent.clone()))
                .copied()
                .unwrap_or_default();
            let so_kpi_score = kpi_score(totals.count as f64, so_count);
            let mistake_kpi_score = kpi_score(totals.weight, so_count);
            KpiRow {
                period,
                agent,
                so_count,
                count_of_mistake_so: totals.count,
                number_of_mistakes: totals.weight,
                so_kpi_score,
                so_kpi_fail: 100.0 - so_kpi_score,
                mistake_kpi_score,
                mistake_kpi_fail: 100.0 - mistake_kpi_score,
            }
        })
        .collect()
}

/// Daily KPI table, keyed by calendar date.
pub fn daily_kpi(sales: &[SalesRecord], mistakes: &[MistakeRecord]) -> Vec<DailyKpiRow> {
    let so = so_mistakes(mistakes);
    let rows = aggregate(sales, &so, |s| s.so_date, |m| m.mistake_date);
    info!(rows = rows.len(), "computed daily KPI table");
    rows
}

/// Monthly KPI table, keyed by `YYYY-MM` bucket.
pub fn monthly_kpi(sales: &[SalesRecord], mistakes: &[MistakeRecord]) -> Vec<MonthlyKpiRow> {
    let so = so_mistakes(mistakes);
    let rows = aggregate(
        sales,
        &so,
        |s| month_bucket(s.so_date),
        |m| month_bucket(m.mistake_date),
    );
    info!(rows = rows.len(), "computed monthly KPI table");
    rows
}

// ── Pure filters over the output tables ──────────────────────────────────────
//
// The aggregated tables stay immutable; each filter allocates a fresh subset.

/// Keep rows for the given agents. An empty selection keeps everything.
pub fn filter_by_agents<P: Clone>(rows: &[KpiRow<P>], agents: &[String]) -> Vec<KpiRow<P>> {
    if agents.is_empty() {
        return rows.to_vec();
    }
    rows.iter()
        .filter(|row| agents.iter().any(|a| *a == row.agent))
        .cloned()
        .collect()
}

/// Keep daily rows within the inclusive date range. Rows in the unknown-date
/// bucket are excluded once any bound is set, since they cannot be compared.
pub fn filter_by_date_range(
    rows: &[DailyKpiRow],
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> Vec<DailyKpiRow> {
    if from.is_none() && to.is_none() {
        return rows.to_vec();
    }
    rows.iter()
        .filter(|row| match row.period {
            Some(date) => {
                from.map_or(true, |f| date >= f) && to.map_or(true, |t| date <= t)
            }
            None => false,
        })
        .cloned()
        .collect()
}

/// Keep monthly rows for one `YYYY-MM` bucket.
pub fn filter_by_month(rows: &[MonthlyKpiRow], month: &str) -> Vec<MonthlyKpiRow> {
    rows.iter()
        .filter(|row| row.period.as_deref() == Some(month))
        .cloned()
        .collect()
}
