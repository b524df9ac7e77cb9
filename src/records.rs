//! Typed row views over the two normalized datasets.

use serde::Serialize;

use crate::table::Table;

/// Catalog column names, after header cleanup.
pub mod catalog {
    pub const ASIN: &str = "ASIN";
    pub const EAN: &str = "EAN";
    pub const PART_NUMBER: &str = "PartNumber";
    pub const TITLE: &str = "Title";
    pub const BRAND: &str = "Brand";
    pub const IMAGE: &str = "Image";
    pub const CATEGORY_ROOT: &str = "Categories: Root";
    pub const CATEGORY_SUB: &str = "Categories: Sub";
    pub const CATEGORY_TREE: &str = "Categories: Tree";
    pub const SALES_RANK_30D: &str = "Sales Rank: 30 days avg.";
    pub const SALES_RANK_90D: &str = "Sales Rank: 90 days avg.";
    pub const BUY_BOX_CURRENT: &str = "Buy Box : Current";
    pub const BUY_BOX_90D_AVG: &str = "Buy Box : 90 days avg.";
    pub const BUY_BOX_DROP_1D: &str = "Buy Box : 1 day drop %";
    pub const BUY_BOX_DROP_7D: &str = "Buy Box : 7 days drop %";
    pub const BUY_BOX_DROP_30D: &str = "Buy Box : 30 days drop %";
    pub const BUY_BOX_DROP_90D: &str = "Buy Box : 90 days drop %";
    pub const REFERRAL_FEE: &str = "Referral Fee %";
    pub const DIMENSION: &str = "Item: Dimension (cm³)";
    pub const WEIGHT: &str = "Item: Weight (g)";

    /// Header marker stripped from the raw catalog export.
    pub const HEADER_MARKER: &str = "🚚";

    pub const NUMERIC_COLUMNS: &[&str] = &[
        SALES_RANK_90D,
        SALES_RANK_30D,
        BUY_BOX_CURRENT,
        BUY_BOX_90D_AVG,
        BUY_BOX_DROP_1D,
        BUY_BOX_DROP_7D,
        BUY_BOX_DROP_30D,
        BUY_BOX_DROP_90D,
        REFERRAL_FEE,
        DIMENSION,
        WEIGHT,
    ];
}

/// Pricing dataset column names.
pub mod pricing {
    pub const PRICE: &str = "price";
    pub const RATING: &str = "rating";
    pub const REVIEWS: &str = "number_of_reviews";
    pub const SOURCE: &str = "source";

    pub const NUMERIC_COLUMNS: &[&str] = &[PRICE, RATING, REVIEWS];
}

/// Reads typed cells from one row of a table; absent columns read as missing.
struct RowReader<'a> {
    table: &'a Table,
    row: usize,
}

impl RowReader<'_> {
    fn text(&self, column: &str) -> Option<String> {
        self.table.column(column).and_then(|c| c.key_at(self.row))
    }

    fn number(&self, column: &str) -> Option<f64> {
        self.table
            .column(column)
            .and_then(|c| c.as_numeric())
            .and_then(|cells| cells.get(self.row).copied().flatten())
    }
}

/// One row of the fragrance catalog.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProductRecord {
    pub asin: Option<String>,
    pub ean: Option<String>,
    pub part_number: Option<String>,
    pub title: Option<String>,
    pub brand: Option<String>,
    pub image: Option<String>,
    pub category_root: Option<String>,
    pub category_sub: Option<String>,
    pub category_tree: Option<String>,
    pub sales_rank_30d: Option<f64>,
    pub sales_rank_90d: Option<f64>,
    pub buy_box_current: Option<f64>,
    pub buy_box_90d_avg: Option<f64>,
    pub drop_1d_pct: Option<f64>,
    pub drop_7d_pct: Option<f64>,
    pub drop_30d_pct: Option<f64>,
    pub drop_90d_pct: Option<f64>,
    pub referral_fee_pct: Option<f64>,
    pub dimension_cm3: Option<f64>,
    pub weight_g: Option<f64>,
}

impl ProductRecord {
    /// Materializes every row of a normalized catalog table.
    pub fn from_table(table: &Table) -> Vec<Self> {
        use crate::records::catalog::*;

        (0..table.len())
            .map(|row| {
                let r = RowReader { table, row };
                ProductRecord {
                    asin: r.text(ASIN),
                    ean: r.text(EAN),
                    part_number: r.text(PART_NUMBER),
                    title: r.text(TITLE),
                    brand: r.text(BRAND),
                    image: r.text(IMAGE),
                    category_root: r.text(CATEGORY_ROOT),
                    category_sub: r.text(CATEGORY_SUB),
                    category_tree: r.text(CATEGORY_TREE),
                    sales_rank_30d: r.number(SALES_RANK_30D),
                    sales_rank_90d: r.number(SALES_RANK_90D),
                    buy_box_current: r.number(BUY_BOX_CURRENT),
                    buy_box_90d_avg: r.number(BUY_BOX_90D_AVG),
                    drop_1d_pct: r.number(BUY_BOX_DROP_1D),
                    drop_7d_pct: r.number(BUY_BOX_DROP_7D),
                    drop_30d_pct: r.number(BUY_BOX_DROP_30D),
                    drop_90d_pct: r.number(BUY_BOX_DROP_90D),
                    referral_fee_pct: r.number(REFERRAL_FEE),
                    dimension_cm3: r.number(DIMENSION),
                    weight_g: r.number(WEIGHT),
                }
            })
            .collect()
    }
}

/// One row of the product pricing/rating dataset.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PricingRecord {
    pub price: Option<f64>,
    pub rating: Option<f64>,
    pub number_of_reviews: Option<f64>,
    pub source: Option<String>,
}

impl PricingRecord {
    pub fn from_table(table: &Table) -> Vec<Self> {
        (0..table.len())
            .map(|row| {
                let r = RowReader { table, row };
                PricingRecord {
                    price: r.number(pricing::PRICE),
                    rating: r.number(pricing::RATING),
                    number_of_reviews: r.number(pricing::REVIEWS),
                    source: r.text(pricing::SOURCE),
                }
            })
            .collect()
    }
}
