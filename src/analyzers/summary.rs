use crate::analyzers::types::{ColumnSummary, SummaryStats};
use crate::analyzers::utility::{mean, mode, present, quantile, sample_variance};
use crate::error::SectionError;
use crate::table::Table;

/// Summarizes the present values of a nullable series.
///
/// An all-missing series yields a summary whose statistics are all `None`.
pub fn summarize(values: &[Option<f64>]) -> SummaryStats {
    let mut sorted = present(values);
    sorted.sort_by(f64::total_cmp);

    let avg = mean(&sorted);
    let variance = avg.and_then(|m| sample_variance(&sorted, m));

    SummaryStats {
        count: sorted.len(),
        min: sorted.first().copied(),
        q1: quantile(&sorted, 0.25),
        median: quantile(&sorted, 0.5),
        q3: quantile(&sorted, 0.75),
        max: sorted.last().copied(),
        mean: avg,
        mode: mode(&sorted),
        variance,
        std_dev: variance.map(f64::sqrt),
    }
}

/// Summarizes one explicitly requested column.
pub fn summarize_column(table: &Table, column: &str) -> Result<ColumnSummary, SectionError> {
    let values = table.require_numeric(column)?;

    Ok(ColumnSummary {
        column: column.to_string(),
        stats: summarize(values),
    })
}

/// Summarizes each listed column that is present and numeric, in order.
///
/// Absent or non-numeric columns are skipped.
pub fn summarize_columns<S: AsRef<str>>(table: &Table, columns: &[S]) -> Vec<ColumnSummary> {
    columns
        .iter()
        .filter_map(|c| summarize_column(table, c.as_ref()).ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::coerce_columns;

    #[test]
    fn test_summary_of_known_series() {
        let stats = summarize(&[Some(4.0), None, Some(1.0), Some(3.0), Some(2.0), Some(4.0)]);

        assert_eq!(stats.count, 5);
        assert_eq!(stats.min, Some(1.0));
        assert_eq!(stats.q1, Some(2.0));
        assert_eq!(stats.median, Some(3.0));
        assert_eq!(stats.q3, Some(4.0));
        assert_eq!(stats.max, Some(4.0));
        assert_eq!(stats.mean, Some(2.8));
        assert_eq!(stats.mode, Some(4.0));
        assert!((stats.variance.unwrap() - 1.7).abs() < 1e-12);
        assert!((stats.std_dev.unwrap() - 1.7f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_all_missing_series_is_undefined() {
        let stats = summarize(&[None, None]);

        assert_eq!(stats.count, 0);
        assert_eq!(stats.min, None);
        assert_eq!(stats.median, None);
        assert_eq!(stats.mean, None);
        assert_eq!(stats.mode, None);
        assert_eq!(stats.std_dev, None);
    }

    #[test]
    fn test_single_value_has_no_spread() {
        let stats = summarize(&[Some(7.0)]);
        assert_eq!(stats.min, Some(7.0));
        assert_eq!(stats.q3, Some(7.0));
        assert_eq!(stats.variance, None);
    }

    #[test]
    fn test_quartiles_are_ordered() {
        let series: Vec<Option<f64>> = [9.0, -3.0, 12.5, 0.0, 4.25, 4.25, 100.0, 7.0]
            .into_iter()
            .map(Some)
            .collect();
        let s = summarize(&series);
        let (min, q1, med, q3, max) = (
            s.min.unwrap(),
            s.q1.unwrap(),
            s.median.unwrap(),
            s.q3.unwrap(),
            s.max.unwrap(),
        );
        assert!(min <= q1 && q1 <= med && med <= q3 && q3 <= max);
    }

    #[test]
    fn test_summarize_columns_skips_absent() {
        let csv = "price,rating,source\n€10,4.5,it\n€20,5,de\n";
        let mut table = Table::from_reader("pricing", csv.as_bytes()).unwrap();
        coerce_columns(&mut table, &["price", "rating"]);

        let summaries = summarize_columns(&table, &["price", "weight", "source", "rating"]);
        let names: Vec<_> = summaries.iter().map(|s| s.column.as_str()).collect();
        assert_eq!(names, ["price", "rating"]);
        assert_eq!(summaries[0].stats.mean, Some(15.0));
    }

    #[test]
    fn test_summarize_column_reports_missing() {
        let table = Table::from_reader("t", "a\n1\n".as_bytes()).unwrap();
        assert_eq!(
            summarize_column(&table, "b").unwrap_err(),
            SectionError::MissingColumn("b".into())
        );
    }
}
