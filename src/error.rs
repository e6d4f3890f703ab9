use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Which of the two input files a validation error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dataset {
    Sales,
    Mistakes,
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dataset::Sales => write!(f, "sales file"),
            Dataset::Mistakes => write!(f, "mistake file"),
        }
    }
}

/// All errors produced by the KPI pipeline.
#[derive(Error, Debug)]
pub enum KpiError {
    /// A required logical column could not be resolved from the headers.
    /// Fatal for the whole report: no partial computation proceeds.
    #[error("could not detect the {column} column in the {dataset}")]
    MissingColumn {
        dataset: Dataset,
        column: &'static str,
    },

    /// An input file could not be opened or read.
    #[error("failed to read {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// A malformed CSV record.
    #[error(transparent)]
    Csv(#[from] csv::Error),

    /// Pass-through for raw I/O errors without a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, KpiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_column_names_dataset_and_column() {
        let err = KpiError::MissingColumn {
            dataset: Dataset::Mistakes,
            column: "SO/BILL category",
        };
        let msg = err.to_string();
        assert!(msg.contains("SO/BILL category"));
        assert!(msg.contains("mistake file"));
    }

    #[test]
    fn dataset_display() {
        assert_eq!(Dataset::Sales.to_string(), "sales file");
        assert_eq!(Dataset::Mistakes.to_string(), "mistake file");
    }
}
