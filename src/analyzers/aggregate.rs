use indexmap::IndexMap;

use crate::analyzers::summary::summarize;
use crate::analyzers::types::{AggregationResult, GroupSummary, RankedEntry, SortOrder};
use crate::analyzers::utility::{mean, present, round_to};
use crate::error::SectionError;
use crate::table::Table;

/// Value label of a [`value_counts`] result.
pub const COUNT_LABEL: &str = "count";

/// Collects the value column per group key, in first-seen group order.
///
/// Rows without a key are dropped before grouping.
fn group_values(
    table: &Table,
    key: &str,
    value: &str,
) -> Result<IndexMap<String, Vec<Option<f64>>>, SectionError> {
    let keys = table.require(key)?;
    let values = table.require_numeric(value)?;

    let mut groups: IndexMap<String, Vec<Option<f64>>> = IndexMap::new();
    for (row, v) in values.iter().enumerate() {
        if let Some(k) = keys.key_at(row) {
            groups.entry(k).or_default().push(*v);
        }
    }

    Ok(groups)
}

/// Stable sort by value, so ties keep first-seen group order.
fn rank(entries: &mut [RankedEntry], order: SortOrder) {
    match order {
        SortOrder::Ascending => entries.sort_by(|a, b| a.value.total_cmp(&b.value)),
        SortOrder::Descending => entries.sort_by(|a, b| b.value.total_cmp(&a.value)),
    }
}

fn mean_entries(table: &Table, key: &str, value: &str) -> Result<Vec<RankedEntry>, SectionError> {
    let groups = group_values(table, key, value)?;

    // Groups with no present values have no mean and are left out.
    Ok(groups
        .into_iter()
        .filter_map(|(key, values)| {
            mean(&present(&values)).map(|value| RankedEntry { key, value })
        })
        .collect())
}

/// Mean of `value` per `key`, ranked and cut to the first `limit` groups.
///
/// With `round`, values are rounded after ranking.
pub fn grouped_mean(
    table: &Table,
    key: &str,
    value: &str,
    order: SortOrder,
    limit: usize,
    round: Option<u32>,
) -> Result<AggregationResult, SectionError> {
    let mut entries = mean_entries(table, key, value)?;
    rank(&mut entries, order);
    entries.truncate(limit);

    if let Some(decimals) = round {
        for entry in &mut entries {
            entry.value = round_to(entry.value, decimals);
        }
    }

    Ok(AggregationResult {
        key_label: key.to_string(),
        value_label: value.to_string(),
        entries,
    })
}

/// Full ranking of the per-group mean, unrounded and untruncated.
pub fn ranked_mean(
    table: &Table,
    key: &str,
    value: &str,
    order: SortOrder,
) -> Result<AggregationResult, SectionError> {
    let mut entries = mean_entries(table, key, value)?;
    rank(&mut entries, order);

    Ok(AggregationResult {
        key_label: key.to_string(),
        value_label: value.to_string(),
        entries,
    })
}

/// Number of rows per distinct `key`, most frequent first.
pub fn value_counts(
    table: &Table,
    key: &str,
    limit: Option<usize>,
) -> Result<AggregationResult, SectionError> {
    let keys = table.require(key)?;

    let mut counts: IndexMap<String, usize> = IndexMap::new();
    for row in 0..table.len() {
        if let Some(k) = keys.key_at(row) {
            *counts.entry(k).or_default() += 1;
        }
    }

    let mut entries: Vec<RankedEntry> = counts
        .into_iter()
        .map(|(key, count)| RankedEntry {
            key,
            value: count as f64,
        })
        .collect();
    rank(&mut entries, SortOrder::Descending);
    if let Some(limit) = limit {
        entries.truncate(limit);
    }

    Ok(AggregationResult {
        key_label: key.to_string(),
        value_label: COUNT_LABEL.to_string(),
        entries,
    })
}

/// Summary statistics of `value` within each `key` group, in first-seen order.
///
/// Groups with no present values are left out.
pub fn grouped_summary(
    table: &Table,
    key: &str,
    value: &str,
) -> Result<Vec<GroupSummary>, SectionError> {
    let groups = group_values(table, key, value)?;

    Ok(groups
        .into_iter()
        .map(|(key, values)| GroupSummary {
            key,
            stats: summarize(&values),
        })
        .filter(|group| group.stats.count > 0)
        .collect())
}
