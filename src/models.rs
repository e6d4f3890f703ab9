use chrono::NaiveDate;
use serde::Serialize;

/// One sales order. A `None` date means the source cell could not be parsed;
/// such rows aggregate under their own "UNKNOWN" bucket instead of being
/// dropped.
#[derive(Debug, Clone)]
pub struct SalesRecord {
    pub agent: String,
    pub so_date: Option<NaiveDate>,
}

/// One logged mistake. `weight` is the "NO OF MISTAKE" value and may exceed 1
/// to represent severity.
#[derive(Debug, Clone)]
pub struct MistakeRecord {
    pub agent: String,
    pub mistake_date: Option<NaiveDate>,
    pub category: String,
    pub weight: f64,
}

/// Period key of an output table row, rendered into the exported report.
pub trait PeriodKey: Ord + Clone {
    fn label(&self) -> String;
}

/// Daily key: a calendar date, or the unknown-date bucket.
impl PeriodKey for Option<NaiveDate> {
    fn label(&self) -> String {
        match self {
            Some(date) => date.format("%Y-%m-%d").to_string(),
            None => "UNKNOWN".to_string(),
        }
    }
}

/// Monthly key: a `YYYY-MM` bucket, or the unknown-date bucket.
impl PeriodKey for Option<String> {
    fn label(&self) -> String {
        match self {
            Some(month) => month.clone(),
            None => "UNKNOWN".to_string(),
        }
    }
}

/// One row of the daily or monthly KPI table, keyed by (period, agent).
///
/// Scores are plain percentages and deliberately unclamped: mistake counts or
/// weights above SO_COUNT drive the score below zero so over-threshold
/// penalties stay visible. A zero SO_COUNT yields NaN scores.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct KpiRow<P> {
    pub period: P,
    pub agent: String,
    pub so_count: u64,
    pub count_of_mistake_so: u64,
    pub number_of_mistakes: f64,
    pub so_kpi_score: f64,
    pub so_kpi_fail: f64,
    pub mistake_kpi_score: f64,
    pub mistake_kpi_fail: f64,
}

pub type DailyKpiRow = KpiRow<Option<NaiveDate>>;
pub type MonthlyKpiRow = KpiRow<Option<String>>;

/// Per-agent KPI averages across all periods of one table.
#[derive(Debug, Clone)]
pub struct AgentSummary {
    pub agent: String,
    pub avg_so_kpi_score: f64,
    pub avg_mistake_kpi_score: f64,
    pub period_count: usize,
}
