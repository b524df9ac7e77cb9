//! CLI entry point for the fragrance dashboard.
//!
//! Provides subcommands for building the report from the catalog and pricing
//! datasets, listing the configured sections, and exporting the built-in
//! report definition.

use anyhow::Result;
use clap::{Parser, Subcommand};
use fragrance_dashboard::output::{print_pretty, render_text, write_json, write_section_tables};
use fragrance_dashboard::report::config::{CATALOG, PRICING, ReportConfig};
use fragrance_dashboard::report::narrative::{NarrativeBundle, NarrativeSource, NoNarrative};
use fragrance_dashboard::report::run;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "fragrance_dashboard")]
#[command(about = "Brand and category performance dashboard data", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the report and print it
    Report {
        /// Report definition (JSON); the built-in dashboard is used if omitted
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Catalog CSV, overrides the definition and CATALOG_PATH
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// Pricing CSV, overrides the definition and PRICING_PATH
        #[arg(long)]
        pricing: Option<PathBuf>,

        /// Narrative content (JSON) attached to sections
        #[arg(short, long)]
        narrative: Option<PathBuf>,

        /// Also write the report as JSON to this file
        #[arg(long)]
        json: Option<PathBuf>,

        /// Gzip compress the JSON output
        #[arg(long, default_value_t = false)]
        gzip: bool,

        /// Directory to write one chart-ready CSV per section
        #[arg(long)]
        csv_dir: Option<PathBuf>,
    },
    /// List the sections of a report definition
    ListSections {
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Write the built-in report definition as JSON
    InitConfig {
        /// Destination file; stdout if omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path = std::env::var("LOG_FILE_PATH")
        .unwrap_or_else(|_| "logs/fragrance_dashboard.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("fragrance_dashboard.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Report {
            config,
            catalog,
            pricing,
            narrative,
            json,
            gzip,
            csv_dir,
        } => {
            let mut definition = load_config(config.as_deref())?;
            apply_path_override(&mut definition, CATALOG, catalog, "CATALOG_PATH");
            apply_path_override(&mut definition, PRICING, pricing, "PRICING_PATH");

            let bundle = narrative
                .as_deref()
                .map(NarrativeBundle::load)
                .transpose()?;
            if let Some(bundle) = &bundle {
                for id in bundle.section_ids() {
                    if !definition.sections.iter().any(|s| s.id == id) {
                        warn!(section = id, "Narrative content for unknown section");
                    }
                }
            }
            let source: &dyn NarrativeSource = match &bundle {
                Some(b) => b,
                None => &NoNarrative,
            };

            let report = run(&definition, source);
            print_pretty(&report);

            let stdout = std::io::stdout();
            render_text(&report, &mut stdout.lock())?;

            if let Some(path) = json {
                write_json(&path, &report, gzip)?;
            }
            if let Some(dir) = csv_dir {
                write_section_tables(&dir, &report)?;
            }

            if report.unavailable_count() > 0 {
                warn!(
                    unavailable = report.unavailable_count(),
                    "Some sections could not be computed"
                );
            }
        }
        Commands::ListSections { config } => {
            let definition = load_config(config.as_deref())?;

            for dataset in &definition.datasets {
                info!(
                    dataset = %dataset.name,
                    path = %dataset.path.display(),
                    numeric_columns = dataset.numeric_columns.len(),
                    "Dataset"
                );
            }
            for section in &definition.sections {
                info!(
                    id = %section.id,
                    dataset = %section.dataset,
                    title = %section.title,
                    "Section"
                );
            }
            info!(
                datasets = definition.datasets.len(),
                sections = definition.sections.len(),
                "Report definition summary"
            );
        }
        Commands::InitConfig { output } => {
            let json = serde_json::to_string_pretty(&ReportConfig::default())?;
            match output {
                Some(path) => {
                    std::fs::write(&path, json)?;
                    info!(path = %path.display(), "Report definition written");
                }
                None => println!("{json}"),
            }
        }
    }

    Ok(())
}

/// Loads a report definition from `path`, or the built-in one.
fn load_config(path: Option<&Path>) -> Result<ReportConfig> {
    match path {
        Some(path) => {
            info!(path = %path.display(), "Loading report definition");
            ReportConfig::load(path)
        }
        None => Ok(ReportConfig::default()),
    }
}

/// CLI flag wins over the environment variable, which wins over the definition.
fn apply_path_override(
    config: &mut ReportConfig,
    dataset: &str,
    flag: Option<PathBuf>,
    env_var: &str,
) {
    let Some(path) = flag.or_else(|| std::env::var(env_var).ok().map(PathBuf::from)) else {
        return;
    };

    if !config.override_path(dataset, &path) {
        warn!(dataset, path = %path.display(), "No such dataset in report definition");
    }
}
