use indexmap::IndexSet;
use serde::Serialize;

use crate::analyzers::aggregate::{grouped_mean, grouped_summary, ranked_mean, value_counts};
use crate::analyzers::correlation::correlate;
use crate::analyzers::summary::summarize_columns;
use crate::analyzers::types::{AggregationResult, ColumnSummary, Correlation, GroupSummary};
use crate::analyzers::utility::{mean, present, round_to};
use crate::error::SectionError;
use crate::records::{PricingRecord, ProductRecord};
use crate::report::config::SectionKind;
use crate::table::Table;

/// Headline counts for the catalog.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogOverview {
    pub products: usize,
    pub brands: usize,
    pub root_categories: usize,
    pub with_buy_box_price: usize,
    pub with_sales_rank: usize,
}

impl CatalogOverview {
    pub fn from_records(records: &[ProductRecord]) -> Self {
        let brands: IndexSet<&str> = records.iter().filter_map(|r| r.brand.as_deref()).collect();
        let roots: IndexSet<&str> = records
            .iter()
            .filter_map(|r| r.category_root.as_deref())
            .collect();

        Self {
            products: records.len(),
            brands: brands.len(),
            root_categories: roots.len(),
            with_buy_box_price: records.iter().filter(|r| r.buy_box_current.is_some()).count(),
            with_sales_rank: records.iter().filter(|r| r.sales_rank_90d.is_some()).count(),
        }
    }
}

/// Headline counts for the pricing dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PricingOverview {
    pub products: usize,
    pub sources: Vec<String>,
    pub rated: usize,
    pub average_rating: Option<f64>,
    pub total_reviews: Option<f64>,
}

impl PricingOverview {
    pub fn from_records(records: &[PricingRecord]) -> Self {
        let sources: IndexSet<&str> = records.iter().filter_map(|r| r.source.as_deref()).collect();
        let ratings: Vec<Option<f64>> = records.iter().map(|r| r.rating).collect();
        let reviews = present(&records.iter().map(|r| r.number_of_reviews).collect::<Vec<_>>());

        Self {
            products: records.len(),
            sources: sources.into_iter().map(str::to_string).collect(),
            rated: ratings.iter().flatten().count(),
            average_rating: mean(&present(&ratings)),
            total_reviews: (!reviews.is_empty()).then(|| reviews.iter().sum()),
        }
    }
}

/// Computed content of a section, shaped for direct charting.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SectionData {
    CatalogOverview(CatalogOverview),
    PricingOverview(PricingOverview),
    Ranking(AggregationResult),
    Summary {
        columns: Vec<ColumnSummary>,
    },
    Correlation(Correlation),
    Distribution {
        key_label: String,
        value_label: String,
        groups: Vec<GroupSummary>,
    },
}

/// Runs one section against its dataset.
pub fn evaluate(kind: &SectionKind, table: &Table) -> Result<SectionData, SectionError> {
    let data = match kind {
        SectionKind::CatalogOverview => {
            let records = ProductRecord::from_table(table);
            SectionData::CatalogOverview(CatalogOverview::from_records(&records))
        }
        SectionKind::PricingOverview => {
            let records = PricingRecord::from_table(table);
            SectionData::PricingOverview(PricingOverview::from_records(&records))
        }
        SectionKind::GroupedMean {
            key,
            value,
            order,
            limit,
            round,
        } => SectionData::Ranking(grouped_mean(table, key, value, *order, *limit, *round)?),
        SectionKind::Ranking {
            key,
            value,
            order,
            round,
        } => {
            let mut result = ranked_mean(table, key, value, *order)?;
            if let Some(decimals) = round {
                for entry in &mut result.entries {
                    entry.value = round_to(entry.value, *decimals);
                }
            }
            SectionData::Ranking(result)
        }
        SectionKind::ValueCounts { key, limit } => {
            SectionData::Ranking(value_counts(table, key, *limit)?)
        }
        SectionKind::Correlation { x, y } => SectionData::Correlation(correlate(table, x, y)?),
        SectionKind::Summary { columns } => SectionData::Summary {
            columns: summarize_columns(table, columns.as_slice()),
        },
        SectionKind::Distribution { key, value } => SectionData::Distribution {
            key_label: key.clone(),
            value_label: value.clone(),
            groups: grouped_summary(table, key, value)?,
        },
    };

    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::types::SortOrder;
    use crate::normalize::coerce_columns;
    use crate::records::pricing;

    fn pricing_table() -> Table {
        let csv = "price,rating,number_of_reviews,source\n\
                   €10,4.5,100,it\n\
                   €20,5,300,de\n\
                   n/a,4.5,,it\n\
                   €30,,50,\n";
        let mut table = Table::from_reader("pricing", csv.as_bytes()).unwrap();
        coerce_columns(&mut table, pricing::NUMERIC_COLUMNS);
        table
    }

    #[test]
    fn test_pricing_overview() {
        let data = evaluate(&SectionKind::PricingOverview, &pricing_table()).unwrap();
        let SectionData::PricingOverview(overview) = data else {
            panic!("unexpected section data");
        };

        assert_eq!(overview.products, 4);
        assert_eq!(overview.sources, ["it", "de"]);
        assert_eq!(overview.rated, 3);
        assert_eq!(overview.total_reviews, Some(450.0));
        assert!((overview.average_rating.unwrap() - 14.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_catalog_overview_on_pricing_columns_counts_rows_only() {
        let data = evaluate(&SectionKind::CatalogOverview, &pricing_table()).unwrap();
        assert_eq!(
            data,
            SectionData::CatalogOverview(CatalogOverview {
                products: 4,
                brands: 0,
                root_categories: 0,
                with_buy_box_price: 0,
                with_sales_rank: 0,
            })
        );
    }

    #[test]
    fn test_grouped_mean_section() {
        let kind = SectionKind::GroupedMean {
            key: "source".into(),
            value: "price".into(),
            order: SortOrder::Descending,
            limit: 10,
            round: Some(2),
        };
        let SectionData::Ranking(result) = evaluate(&kind, &pricing_table()).unwrap() else {
            panic!("unexpected section data");
        };
        assert_eq!(result.pairs(), [("de", 20.0), ("it", 10.0)]);
    }

    #[test]
    fn test_ranking_section_rounds_after_ranking() {
        let mut table =
            Table::from_reader("t", "k,v\na,1\na,2\na,2\nb,0.5\n".as_bytes()).unwrap();
        coerce_columns(&mut table, &["v"]);
        let kind = SectionKind::Ranking {
            key: "k".into(),
            value: "v".into(),
            order: SortOrder::Descending,
            round: Some(2),
        };
        let SectionData::Ranking(result) = evaluate(&kind, &table).unwrap() else {
            panic!("unexpected section data");
        };
        assert_eq!(result.pairs(), [("a", 1.67), ("b", 0.5)]);
    }

    #[test]
    fn test_missing_target_column() {
        let kind = SectionKind::Correlation {
            x: "price".into(),
            y: "discount".into(),
        };
        assert_eq!(
            evaluate(&kind, &pricing_table()).unwrap_err(),
            SectionError::MissingColumn("discount".into())
        );
    }

    #[test]
    fn test_distribution_section() {
        let kind = SectionKind::Distribution {
            key: "rating".into(),
            value: "price".into(),
        };
        let SectionData::Distribution { groups, .. } = evaluate(&kind, &pricing_table()).unwrap()
        else {
            panic!("unexpected section data");
        };

        let keys: Vec<_> = groups.iter().map(|g| g.key.as_str()).collect();
        assert_eq!(keys, ["4.5", "5.0"]);
        assert_eq!(groups[0].stats.count, 1);
        assert_eq!(groups[0].stats.mean, Some(10.0));
    }
}
