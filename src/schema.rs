//! Header resolution for the two input files.
//!
//! Source exports drift in their header spelling ("Agent Name", "PERSON",
//! "SO / Bill", "so_bill"). Each logical column carries a ranked list of
//! accepted aliases, matched against a canonicalized header form; resolution
//! happens once per load and produces fixed column indexes. An unresolvable
//! column is a hard failure naming the dataset and the logical column.

use crate::error::{Dataset, KpiError, Result};

/// Canonical header form: surrounding whitespace stripped, uppercased.
pub fn canonical(header: &str) -> String {
    header.trim().to_uppercase()
}

/// Matching form: canonical form with spaces and underscores removed, so
/// "Agent Name", "AGENT_NAME" and "agentname" compare equal.
pub fn matching_key(header: &str) -> String {
    canonical(header)
        .chars()
        .filter(|c| *c != ' ' && *c != '_')
        .collect()
}

/// First column whose matching form contains every given keyword, scanning
/// headers in original order. Used for the SO/BILL category column, whose
/// header text varies too much for an alias list.
pub fn find_column(headers: &[String], keywords: &[&str]) -> Option<usize> {
    headers.iter().position(|h| {
        let key = matching_key(h);
        keywords.iter().all(|kw| key.contains(kw))
    })
}

/// First column whose matching form equals one of `aliases`, trying aliases
/// in rank order.
fn find_alias(headers: &[String], aliases: &[&str]) -> Option<usize> {
    aliases
        .iter()
        .find_map(|alias| headers.iter().position(|h| matching_key(h) == *alias))
}

/// Resolved column indexes for the sales file.
#[derive(Debug, Clone, Copy)]
pub struct SalesColumns {
    pub agent: usize,
    pub date: usize,
}

/// Resolved column indexes for the mistake file.
#[derive(Debug, Clone, Copy)]
pub struct MistakeColumns {
    pub agent: usize,
    pub date: usize,
    pub category: usize,
    pub weight: usize,
}

pub fn resolve_sales(headers: &[String]) -> Result<SalesColumns> {
    let agent =
        find_alias(headers, &["AGENT", "AGENTNAME"]).ok_or(KpiError::MissingColumn {
            dataset: Dataset::Sales,
            column: "agent",
        })?;
    let date = find_alias(headers, &["SODATE", "DATE"]).ok_or(KpiError::MissingColumn {
        dataset: Dataset::Sales,
        column: "order date",
    })?;
    Ok(SalesColumns { agent, date })
}

pub fn resolve_mistakes(headers: &[String]) -> Result<MistakeColumns> {
    let agent = find_alias(headers, &["AGENT", "PERSON"]).ok_or(KpiError::MissingColumn {
        dataset: Dataset::Mistakes,
        column: "agent",
    })?;
    let date =
        find_alias(headers, &["MISTAKEDATE", "DATE"]).ok_or(KpiError::MissingColumn {
            dataset: Dataset::Mistakes,
            column: "mistake date",
        })?;
    let category = find_column(headers, &["SO", "BILL"]).ok_or(KpiError::MissingColumn {
        dataset: Dataset::Mistakes,
        column: "SO/BILL category",
    })?;
    let weight = find_alias(headers, &["NOOFMISTAKE", "NUMBEROFMISTAKES"]).ok_or(
        KpiError::MissingColumn {
            dataset: Dataset::Mistakes,
            column: "NO OF MISTAKE",
        },
    )?;
    Ok(MistakeColumns {
        agent,
        date,
        category,
        weight,
    })
}
