//! Data types produced by the aggregation pipeline.
//!
//! Every statistic is an `Option<f64>`; `None` means the statistic could not
//! be computed and must be rendered as "not available".

use serde::{Deserialize, Serialize};

/// Direction of a ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// One `(group key, value)` pair of a ranking.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedEntry {
    pub key: String,
    pub value: f64,
}

/// Ordered result of a single grouped aggregation.
///
/// `key_label` and `value_label` name the two columns so the result can be
/// handed to a bar or pie chart as-is.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregationResult {
    pub key_label: String,
    pub value_label: String,
    pub entries: Vec<RankedEntry>,
}

impl AggregationResult {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries as `(key, value)` tuples.
    pub fn pairs(&self) -> Vec<(&str, f64)> {
        self.entries
            .iter()
            .map(|e| (e.key.as_str(), e.value))
            .collect()
    }
}

/// Five-number summary plus moments of one numeric column.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SummaryStats {
    pub count: usize,
    pub min: Option<f64>,
    pub q1: Option<f64>,
    pub median: Option<f64>,
    pub q3: Option<f64>,
    pub max: Option<f64>,
    pub mean: Option<f64>,
    pub mode: Option<f64>,
    pub variance: Option<f64>,
    pub std_dev: Option<f64>,
}

/// Summary of one named column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnSummary {
    pub column: String,
    pub stats: SummaryStats,
}

/// Summary of a value column within one group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupSummary {
    pub key: String,
    pub stats: SummaryStats,
}

/// Pearson correlation between two columns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Correlation {
    pub x: String,
    pub y: String,
    pub pairs: usize,
    pub coefficient: Option<f64>,
}
