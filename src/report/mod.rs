//! Report assembly.
//!
//! Loads the configured datasets, then evaluates each section in order.
//! A section that cannot be computed is kept in the report as unavailable
//! with a reason; it never stops the remaining sections.

pub mod config;
pub mod narrative;
pub mod section;

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, error, info, warn};

use crate::error::SectionError;
use crate::normalize::{clean_headers, coerce_columns};
use crate::table::Table;
use config::{DatasetConfig, ReportConfig};
use narrative::{NarrativeBlock, NarrativeSource};
use section::{SectionData, evaluate};

/// Normalized tables by dataset name. A dataset that failed to load is absent.
#[derive(Debug, Default)]
pub struct Datasets {
    tables: HashMap<String, Table>,
}

impl Datasets {
    /// Loads and normalizes every configured dataset. Load failures are
    /// logged and leave the dataset unavailable.
    pub fn load(configs: &[DatasetConfig]) -> Self {
        let mut datasets = Self::default();

        for config in configs {
            match Table::from_path(&config.name, &config.path) {
                Ok(table) => {
                    datasets.insert(prepare(table, config));
                }
                Err(e) => {
                    error!(
                        dataset = %config.name,
                        path = %config.path.display(),
                        error = %e,
                        "Dataset could not be loaded"
                    );
                }
            }
        }

        datasets
    }

    pub fn insert(&mut self, table: Table) {
        self.tables.insert(table.name().to_string(), table);
    }

    pub fn get(&self, name: &str) -> Option<&Table> {
        self.tables.get(name)
    }
}

/// Applies header cleanup, numeric coercion and upstream row drops.
pub fn prepare(mut table: Table, config: &DatasetConfig) -> Table {
    if let Some(marker) = &config.header_marker {
        clean_headers(&mut table, marker);
    }

    let converted = coerce_columns(&mut table, config.numeric_columns.as_slice());

    for column in &config.drop_missing {
        match table.drop_missing(column) {
            Ok(filtered) => {
                debug!(
                    dataset = %config.name,
                    column = %column,
                    dropped = table.len() - filtered.len(),
                    "Dropped rows without value"
                );
                table = filtered;
            }
            Err(e) => warn!(dataset = %config.name, error = %e, "Row filter skipped"),
        }
    }

    info!(
        dataset = %config.name,
        rows = table.len(),
        numeric_columns = converted,
        "Dataset ready"
    );
    table
}

/// Outcome of one section.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SectionOutcome {
    Ready { data: SectionData },
    Unavailable { reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionReport {
    pub id: String,
    pub title: String,
    pub dataset: String,
    #[serde(flatten)]
    pub outcome: SectionOutcome,
    pub narrative: Vec<NarrativeBlock>,
}

impl SectionReport {
    pub fn data(&self) -> Option<&SectionData> {
        match &self.outcome {
            SectionOutcome::Ready { data } => Some(data),
            SectionOutcome::Unavailable { .. } => None,
        }
    }
}

/// A fully evaluated report. Exists only for the lifetime of one run.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub title: String,
    pub generated_at: DateTime<Utc>,
    pub narrative_version: Option<String>,
    pub sections: Vec<SectionReport>,
}

impl Report {
    pub fn section(&self, id: &str) -> Option<&SectionReport> {
        self.sections.iter().find(|s| s.id == id)
    }

    pub fn unavailable_count(&self) -> usize {
        self.sections.iter().filter(|s| s.data().is_none()).count()
    }
}

/// Evaluates every section of `config` against `datasets`.
#[tracing::instrument(skip_all, fields(title = %config.title, sections = config.sections.len()))]
pub fn build_report(
    config: &ReportConfig,
    datasets: &Datasets,
    narrative: &dyn NarrativeSource,
) -> Report {
    let mut sections = Vec::with_capacity(config.sections.len());

    for section in &config.sections {
        let result = datasets
            .get(&section.dataset)
            .ok_or_else(|| SectionError::DatasetUnavailable(section.dataset.clone()))
            .and_then(|table| evaluate(&section.kind, table));

        let outcome = match result {
            Ok(data) => {
                debug!(section = %section.id, "Section computed");
                SectionOutcome::Ready { data }
            }
            Err(e) => {
                warn!(section = %section.id, error = %e, "Section unavailable");
                SectionOutcome::Unavailable {
                    reason: e.to_string(),
                }
            }
        };

        sections.push(SectionReport {
            id: section.id.clone(),
            title: section.title.clone(),
            dataset: section.dataset.clone(),
            outcome,
            narrative: narrative.blocks(&section.id),
        });
    }

    let report = Report {
        title: config.title.clone(),
        generated_at: Utc::now(),
        narrative_version: narrative.version().map(str::to_string),
        sections,
    };

    info!(
        sections = report.sections.len(),
        unavailable = report.unavailable_count(),
        "Report built"
    );
    report
}

/// Loads the datasets named by `config` and builds the report.
pub fn run(config: &ReportConfig, narrative: &dyn NarrativeSource) -> Report {
    let datasets = Datasets::load(&config.datasets);
    build_report(config, &datasets, narrative)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::types::SortOrder;
    use crate::report::config::{SectionConfig, SectionKind};
    use crate::report::narrative::{NarrativeBundle, NoNarrative};
    use std::path::PathBuf;

    fn catalog_config() -> DatasetConfig {
        DatasetConfig {
            name: "catalog".into(),
            path: PathBuf::from("unused.csv"),
            header_marker: Some("🚚".into()),
            numeric_columns: vec!["Buy Box : Current".into(), "Item: Weight (g)".into()],
            drop_missing: vec!["Brand".into()],
        }
    }

    fn catalog() -> Table {
        let csv = "Brand,🚚 Buy Box : Current \nX,€100.00\nX,€50\nY,€10\n,€500\n";
        let table = Table::from_reader("catalog", csv.as_bytes()).unwrap();
        prepare(table, &catalog_config())
    }

    fn brand_section(id: &str, value: &str) -> SectionConfig {
        SectionConfig {
            id: id.into(),
            title: id.into(),
            dataset: "catalog".into(),
            kind: SectionKind::GroupedMean {
                key: "Brand".into(),
                value: value.into(),
                order: SortOrder::Descending,
                limit: 2,
                round: None,
            },
        }
    }

    #[test]
    fn test_prepare_cleans_coerces_and_drops() {
        let table = catalog();
        assert_eq!(table.len(), 3);
        assert_eq!(
            table.require_numeric("Buy Box : Current").unwrap(),
            &[Some(100.0), Some(50.0), Some(10.0)]
        );
    }

    #[test]
    fn test_broken_section_does_not_stop_others() {
        let mut datasets = Datasets::default();
        datasets.insert(catalog());

        let config = ReportConfig {
            title: "t".into(),
            datasets: vec![],
            sections: vec![
                brand_section("weight", "Item: Weight (g)"),
                brand_section("price", "Buy Box : Current"),
                SectionConfig {
                    id: "ratings".into(),
                    title: "ratings".into(),
                    dataset: "pricing".into(),
                    kind: SectionKind::PricingOverview,
                },
            ],
        };

        let report = build_report(&config, &datasets, &NoNarrative);
        assert_eq!(report.sections.len(), 3);
        assert_eq!(report.unavailable_count(), 2);
        assert_eq!(
            report.section("weight").unwrap().outcome,
            SectionOutcome::Unavailable {
                reason: "Column 'Item: Weight (g)' not found in the data.".into()
            }
        );
        assert_eq!(
            report.section("ratings").unwrap().outcome,
            SectionOutcome::Unavailable {
                reason: "Dataset 'pricing' is not available".into()
            }
        );

        let Some(SectionData::Ranking(result)) = report.section("price").unwrap().data() else {
            panic!("price section should be ready");
        };
        assert_eq!(result.pairs(), [("X", 75.0), ("Y", 10.0)]);
    }

    #[test]
    fn test_narrative_is_attached_verbatim() {
        let mut datasets = Datasets::default();
        datasets.insert(catalog());

        let bundle: NarrativeBundle = serde_json::from_str(
            r#"{"version": "it-2024", "sections": {"price": [{"body": "La Mer (€239.43)"}]}}"#,
        )
        .unwrap();
        let config = ReportConfig {
            title: "t".into(),
            datasets: vec![],
            sections: vec![brand_section("price", "Buy Box : Current")],
        };

        let report = build_report(&config, &datasets, &bundle);
        assert_eq!(report.narrative_version.as_deref(), Some("it-2024"));
        assert_eq!(report.sections[0].narrative[0].body, "La Mer (€239.43)");
    }

    #[test]
    fn test_load_missing_file_leaves_dataset_unavailable() {
        let datasets = Datasets::load(&[catalog_config()]);
        assert!(datasets.get("catalog").is_none());
    }

    #[test]
    fn test_section_report_serializes_flat() {
        let section = SectionReport {
            id: "x".into(),
            title: "X".into(),
            dataset: "catalog".into(),
            outcome: SectionOutcome::Unavailable {
                reason: "gone".into(),
            },
            narrative: vec![],
        };
        let value = serde_json::to_value(&section).unwrap();
        assert_eq!(value["status"], "unavailable");
        assert_eq!(value["reason"], "gone");
    }
}
