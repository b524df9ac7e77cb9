//! Section-level error taxonomy.
//!
//! None of these are fatal: a failing section is reported as unavailable and
//! the remaining sections still run.

/// Why a report section could not produce data.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SectionError {
    #[error("Column '{0}' not found in the data.")]
    MissingColumn(String),

    #[error("Column '{0}' is not numeric")]
    NotNumeric(String),

    #[error("Dataset '{0}' is not available")]
    DatasetUnavailable(String),
}
