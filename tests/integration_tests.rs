use fragrance_dashboard::analyzers::types::{AggregationResult, SortOrder};
use fragrance_dashboard::output::{render_text, write_section_tables};
use fragrance_dashboard::report::config::{
    CATALOG, PRICING, ReportConfig, SectionConfig, SectionKind,
};
use fragrance_dashboard::report::narrative::{NarrativeBundle, NoNarrative};
use fragrance_dashboard::report::section::SectionData;
use fragrance_dashboard::report::{Report, SectionOutcome, run};
use std::path::Path;

fn fixture(name: &str) -> String {
    format!("{}/tests/fixtures/{}", env!("CARGO_MANIFEST_DIR"), name)
}

fn fixture_config() -> ReportConfig {
    let mut config = ReportConfig::default();
    assert!(config.override_path(CATALOG, fixture("catalog.csv")));
    assert!(config.override_path(PRICING, fixture("pricing.csv")));
    config
}

fn ranking<'a>(report: &'a Report, id: &str) -> &'a AggregationResult {
    match report.section(id).and_then(|s| s.data()) {
        Some(SectionData::Ranking(result)) => result,
        other => panic!("section {id} is not a ranking: {other:?}"),
    }
}

fn keys(result: &AggregationResult) -> Vec<&str> {
    result.entries.iter().map(|e| e.key.as_str()).collect()
}

#[test]
fn test_full_dashboard_from_fixtures() {
    let report = run(&fixture_config(), &NoNarrative);

    assert_eq!(report.unavailable_count(), 0);

    let prices = ranking(&report, "brand-price");
    assert_eq!(
        keys(prices),
        ["La Mer", "Penhaligon's", "Tom Ford", "BVLGARI", "Chanel"]
    );
    assert_eq!(prices.entries[0].value, 239.43);
    assert!((prices.entries[4].value - 65.9).abs() < 1e-9);

    let sales = ranking(&report, "brand-sales-rank");
    assert_eq!(
        sales.pairs(),
        [
            ("Chanel", 3000.0),
            ("BVLGARI", 9800.0),
            ("La Mer", 13100.0),
            ("Penhaligon's", 41500.0),
            ("Guerlain", 88738.0),
            ("Tom Ford", 105114.5),
        ]
    );

    let drops = ranking(&report, "price-drop");
    assert_eq!(
        drops.pairs(),
        [
            ("Chanel", 10.0),
            ("Tom Ford", 7.0),
            ("La Mer", 5.0),
            ("Penhaligon's", 3.0),
            ("BVLGARI", 2.0),
        ]
    );

    // The unbranded product is dropped before any catalog section runs.
    let roots = ranking(&report, "root-categories");
    assert_eq!(
        roots.pairs(),
        [
            ("Bellezza", 5.0),
            ("Moda", 1.0),
            ("Salute e Cura della Persona", 1.0),
        ]
    );

    let categories = ranking(&report, "category-sales-rank");
    assert_eq!(
        keys(categories),
        ["Moda", "Salute e Cura della Persona", "Bellezza"]
    );
    assert_eq!(categories.entries[2].value, 14080.0);

    match report.section("overview").and_then(|s| s.data()) {
        Some(SectionData::CatalogOverview(o)) => {
            assert_eq!(o.products, 7);
            assert_eq!(o.brands, 6);
            assert_eq!(o.root_categories, 3);
            assert_eq!(o.with_buy_box_price, 6);
        }
        other => panic!("unexpected overview: {other:?}"),
    }
}

#[test]
fn test_pricing_sections_from_fixtures() {
    let report = run(&fixture_config(), &NoNarrative);

    assert_eq!(
        ranking(&report, "price-by-source").pairs(),
        [("amazon_de", 239.43), ("amazon_it", 76.48), ("amazon_fr", 19.0)]
    );
    assert_eq!(
        ranking(&report, "rating-counts").pairs(),
        [("4.5", 2.0), ("5.0", 2.0), ("4.0", 1.0), ("3.5", 1.0)]
    );
    assert_eq!(
        ranking(&report, "reviews-by-rating").pairs(),
        [("4.5", 624.5), ("4.0", 310.0), ("5.0", 88.0), ("3.5", 12.0)]
    );

    match report.section("price-rating-correlation").and_then(|s| s.data()) {
        Some(SectionData::Correlation(c)) => {
            assert_eq!(c.pairs, 5);
            let r = c.coefficient.expect("coefficient defined for 5 pairs");
            assert!(r > 0.0 && r <= 1.0);
        }
        other => panic!("unexpected correlation: {other:?}"),
    }

    match report.section("statistical-summary").and_then(|s| s.data()) {
        Some(SectionData::Summary { columns }) => {
            assert_eq!(columns.len(), 11);
            let weight = columns
                .iter()
                .find(|c| c.column == "Item: Weight (g)")
                .unwrap();
            assert_eq!(weight.stats.count, 6);
            for summary in columns {
                let s = &summary.stats;
                if let (Some(min), Some(q1), Some(med), Some(q3), Some(max)) =
                    (s.min, s.q1, s.median, s.q3, s.max)
                {
                    assert!(min <= q1 && q1 <= med && med <= q3 && q3 <= max);
                }
            }
        }
        other => panic!("unexpected summary: {other:?}"),
    }
}

#[test]
fn test_missing_column_and_missing_dataset_are_isolated() {
    let mut config = fixture_config();
    config.override_path(PRICING, fixture("does_not_exist.csv"));
    config.sections.insert(
        0,
        SectionConfig {
            id: "brand-rating".into(),
            title: "Average Rating by Brand".into(),
            dataset: CATALOG.into(),
            kind: SectionKind::GroupedMean {
                key: "Brand".into(),
                value: "Rating".into(),
                order: SortOrder::Descending,
                limit: 10,
                round: None,
            },
        },
    );

    let report = run(&config, &NoNarrative);

    assert_eq!(
        report.sections[0].outcome,
        SectionOutcome::Unavailable {
            reason: "Column 'Rating' not found in the data.".into()
        }
    );
    assert!(report.section("brand-price").unwrap().data().is_some());
    assert!(report.section("pricing-summary").unwrap().data().is_none());

    let mut buf = Vec::new();
    render_text(&report, &mut buf).unwrap();
    let text = String::from_utf8(buf).unwrap();
    assert!(text.contains("! Column 'Rating' not found in the data."));
    assert!(text.contains("! Dataset 'pricing' is not available"));
    assert!(!text.contains("NaN"));
    assert!(!text.contains("nan%"));
}

#[test]
fn test_demo_narrative_and_csv_export() {
    let narrative_path = format!("{}/demos/narrative.json", env!("CARGO_MANIFEST_DIR"));
    let bundle = NarrativeBundle::load(Path::new(&narrative_path)).unwrap();

    let report = run(&fixture_config(), &bundle);
    assert_eq!(report.narrative_version.as_deref(), Some("it-2024-07"));
    let brand_price = report.section("brand-price").unwrap();
    assert_eq!(brand_price.narrative.len(), 3);
    assert!(report.section("overview").unwrap().narrative.is_empty());

    let dir = tempfile::tempdir().unwrap();
    let written = write_section_tables(dir.path(), &report).unwrap();
    // Every section except the two overviews produces a table.
    assert_eq!(written, report.sections.len() - 2);

    let csv = std::fs::read_to_string(dir.path().join("brand-price.csv")).unwrap();
    assert_eq!(csv.lines().next(), Some("Brand,Buy Box : Current"));
    assert_eq!(csv.lines().count(), 6);
}
