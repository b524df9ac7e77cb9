//! Report definition: which datasets are loaded and which sections run.
//!
//! Stored as JSON on disk:
//! ```json
//! {
//!   "title": "Brand and Category Performance Dashboard",
//!   "datasets": [
//!     { "name": "catalog", "path": "fragance_it_keepa.csv",
//!       "header_marker": "🚚", "numeric_columns": ["Buy Box : Current"],
//!       "drop_missing": ["Brand"] }
//!   ],
//!   "sections": [
//!     { "id": "brand-price", "title": "Top 10 Brands by Average Current Buy Box Price",
//!       "dataset": "catalog", "kind": "grouped_mean", "key": "Brand",
//!       "value": "Buy Box : Current", "order": "descending", "limit": 10 }
//!   ]
//! }
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::analyzers::types::SortOrder;
use crate::records::{catalog, pricing};

pub const CATALOG: &str = "catalog";
pub const PRICING: &str = "pricing";

/// How one input file is loaded and cleaned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetConfig {
    pub name: String,
    pub path: PathBuf,
    /// Stripped from every header before trimming.
    #[serde(default)]
    pub header_marker: Option<String>,
    #[serde(default)]
    pub numeric_columns: Vec<String>,
    /// Rows lacking a value in any of these columns are dropped after coercion.
    #[serde(default)]
    pub drop_missing: Vec<String>,
}

/// What a section computes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SectionKind {
    CatalogOverview,
    PricingOverview,
    /// Top-N mean of `value` per `key`.
    GroupedMean {
        key: String,
        value: String,
        order: SortOrder,
        limit: usize,
        #[serde(default)]
        round: Option<u32>,
    },
    /// Every group's mean of `value`, ranked on unrounded means.
    Ranking {
        key: String,
        value: String,
        order: SortOrder,
        #[serde(default)]
        round: Option<u32>,
    },
    ValueCounts {
        key: String,
        #[serde(default)]
        limit: Option<usize>,
    },
    Correlation {
        x: String,
        y: String,
    },
    /// Summary statistics of each listed column that exists.
    Summary {
        columns: Vec<String>,
    },
    /// Summary statistics of `value` within each `key` group.
    Distribution {
        key: String,
        value: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionConfig {
    pub id: String,
    pub title: String,
    pub dataset: String,
    #[serde(flatten)]
    pub kind: SectionKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportConfig {
    pub title: String,
    pub datasets: Vec<DatasetConfig>,
    pub sections: Vec<SectionConfig>,
}

impl ReportConfig {
    /// Loads a definition from a JSON file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report config {}", path.display()))?;
        let config = serde_json::from_str(&content)
            .with_context(|| format!("invalid report config {}", path.display()))?;
        Ok(config)
    }

    pub fn dataset(&self, name: &str) -> Option<&DatasetConfig> {
        self.datasets.iter().find(|d| d.name == name)
    }

    /// Points dataset `name` at another file. Returns false if no such dataset.
    pub fn override_path(&mut self, name: &str, path: impl Into<PathBuf>) -> bool {
        match self.datasets.iter_mut().find(|d| d.name == name) {
            Some(dataset) => {
                dataset.path = path.into();
                true
            }
            None => false,
        }
    }
}

fn section(id: &str, title: &str, dataset: &str, kind: SectionKind) -> SectionConfig {
    SectionConfig {
        id: id.to_string(),
        title: title.to_string(),
        dataset: dataset.to_string(),
        kind,
    }
}

fn owned(columns: &[&str]) -> Vec<String> {
    columns.iter().map(|c| c.to_string()).collect()
}

impl Default for ReportConfig {
    /// The full dashboard: catalog brand/category sections followed by the
    /// pricing and reviews sections.
    fn default() -> Self {
        use SectionKind::*;

        let datasets = vec![
            DatasetConfig {
                name: CATALOG.to_string(),
                path: PathBuf::from("fragance_it_keepa.csv"),
                header_marker: Some(catalog::HEADER_MARKER.to_string()),
                numeric_columns: owned(catalog::NUMERIC_COLUMNS),
                drop_missing: owned(&[catalog::BRAND]),
            },
            DatasetConfig {
                name: PRICING.to_string(),
                path: PathBuf::from("product_pricing.csv"),
                header_marker: None,
                numeric_columns: owned(pricing::NUMERIC_COLUMNS),
                drop_missing: Vec::new(),
            },
        ];

        let sections = vec![
            section("overview", "Overview", CATALOG, CatalogOverview),
            section(
                "brand-price",
                "Top 10 Brands by Average Current Buy Box Price",
                CATALOG,
                GroupedMean {
                    key: catalog::BRAND.into(),
                    value: catalog::BUY_BOX_CURRENT.into(),
                    order: SortOrder::Descending,
                    limit: 10,
                    round: None,
                },
            ),
            section(
                "brand-sales-rank",
                "Top 10 Brands by Average Sales Rank (90 days avg.)",
                CATALOG,
                GroupedMean {
                    key: catalog::BRAND.into(),
                    value: catalog::SALES_RANK_90D.into(),
                    order: SortOrder::Ascending,
                    limit: 10,
                    round: Some(2),
                },
            ),
            section(
                "statistical-summary",
                "Statistical Summary",
                CATALOG,
                Summary {
                    columns: owned(catalog::NUMERIC_COLUMNS),
                },
            ),
            section(
                "price-drop",
                "Brands by Average Price Drop (30 days)",
                CATALOG,
                Ranking {
                    key: catalog::BRAND.into(),
                    value: catalog::BUY_BOX_DROP_30D.into(),
                    order: SortOrder::Descending,
                    round: None,
                },
            ),
            section(
                "root-categories",
                "Top 10 Popular Root Categories",
                CATALOG,
                ValueCounts {
                    key: catalog::CATEGORY_ROOT.into(),
                    limit: Some(10),
                },
            ),
            section(
                "subcategories",
                "Top 10 Popular Subcategories",
                CATALOG,
                ValueCounts {
                    key: catalog::CATEGORY_SUB.into(),
                    limit: Some(10),
                },
            ),
            section(
                "category-sales-rank",
                "Average Sales Rank by Category",
                CATALOG,
                Ranking {
                    key: catalog::CATEGORY_ROOT.into(),
                    value: catalog::SALES_RANK_90D.into(),
                    order: SortOrder::Descending,
                    round: Some(2),
                },
            ),
            section("pricing-overview", "Pricing Overview", PRICING, PricingOverview),
            section(
                "price-by-source",
                "Average Price by Source",
                PRICING,
                GroupedMean {
                    key: pricing::SOURCE.into(),
                    value: pricing::PRICE.into(),
                    order: SortOrder::Descending,
                    limit: 10,
                    round: Some(2),
                },
            ),
            section(
                "rating-counts",
                "Products per Rating",
                PRICING,
                ValueCounts {
                    key: pricing::RATING.into(),
                    limit: None,
                },
            ),
            section(
                "reviews-by-rating",
                "Average Number of Reviews by Rating",
                PRICING,
                Ranking {
                    key: pricing::RATING.into(),
                    value: pricing::REVIEWS.into(),
                    order: SortOrder::Descending,
                    round: None,
                },
            ),
            section(
                "price-by-rating",
                "Price Distribution by Rating",
                PRICING,
                Distribution {
                    key: pricing::RATING.into(),
                    value: pricing::PRICE.into(),
                },
            ),
            section(
                "price-rating-correlation",
                "Price vs Rating",
                PRICING,
                Correlation {
                    x: pricing::PRICE.into(),
                    y: pricing::RATING.into(),
                },
            ),
            section(
                "reviews-rating-correlation",
                "Number of Reviews vs Rating",
                PRICING,
                Correlation {
                    x: pricing::REVIEWS.into(),
                    y: pricing::RATING.into(),
                },
            ),
            section(
                "pricing-summary",
                "Pricing Summary",
                PRICING,
                Summary {
                    columns: owned(pricing::NUMERIC_COLUMNS),
                },
            ),
        ];

        Self {
            title: "Brand and Category Performance Dashboard".to_string(),
            datasets,
            sections,
        }
    }
}
