//! Output formatting and persistence for a built report.
//!
//! Supports a plain-text rendering, JSON export (optionally gzip-compressed)
//! and one chart-ready CSV table per section.

use anyhow::{Context, Result};
use csv::WriterBuilder;
use flate2::Compression;
use flate2::write::GzEncoder;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::analyzers::aggregate::COUNT_LABEL;
use crate::analyzers::types::{AggregationResult, SummaryStats};
use crate::report::section::SectionData;
use crate::report::{Report, SectionOutcome};

/// Marker for a statistic that could not be computed.
pub const NOT_AVAILABLE: &str = "n/a";

/// Formats a number with thousands separators and fixed decimals.
pub fn format_number(value: f64, decimals: usize) -> String {
    let formatted = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match formatted.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (formatted.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (idx, ch) in int_part.chars().enumerate() {
        if idx > 0 && (int_part.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 && formatted.chars().any(|c| c != '0' && c != '.') {
        "-"
    } else {
        ""
    };
    match frac_part {
        Some(frac) => format!("{sign}{grouped}.{frac}"),
        None => format!("{sign}{grouped}"),
    }
}

/// Formats a statistic, rendering a missing one as [`NOT_AVAILABLE`].
pub fn format_stat(value: Option<f64>, decimals: usize) -> String {
    value.map_or_else(|| NOT_AVAILABLE.to_string(), |v| format_number(v, decimals))
}

/// Logs the report using Rust's debug pretty-print format.
pub fn print_pretty(report: &Report) {
    debug!("{:#?}", report);
}

fn render_ranking(out: &mut impl Write, result: &AggregationResult) -> Result<()> {
    writeln!(out, "  {} | {}", result.key_label, result.value_label)?;
    if result.is_empty() {
        writeln!(out, "  (no groups)")?;
    }
    let decimals = if result.value_label == COUNT_LABEL { 0 } else { 2 };
    for entry in &result.entries {
        writeln!(out, "  {:<40} {:>16}", entry.key, format_number(entry.value, decimals))?;
    }
    Ok(())
}

fn summary_cells(stats: &SummaryStats) -> [String; 10] {
    [
        stats.count.to_string(),
        format_stat(stats.min, 2),
        format_stat(stats.q1, 2),
        format_stat(stats.median, 2),
        format_stat(stats.q3, 2),
        format_stat(stats.max, 2),
        format_stat(stats.mean, 2),
        format_stat(stats.mode, 2),
        format_stat(stats.variance, 2),
        format_stat(stats.std_dev, 2),
    ]
}

const SUMMARY_HEADERS: [&str; 10] = [
    "Count",
    "Min",
    "Q1",
    "Median",
    "Q3",
    "Max",
    "Mean",
    "Mode",
    "Variance",
    "Standard Deviation",
];

fn render_summary_row(out: &mut impl Write, name: &str, stats: &SummaryStats) -> Result<()> {
    writeln!(out, "  {name}")?;
    for (label, cell) in SUMMARY_HEADERS.iter().zip(summary_cells(stats)) {
        writeln!(out, "    {label:<20} {cell:>16}")?;
    }
    Ok(())
}

fn render_data(out: &mut impl Write, data: &SectionData) -> Result<()> {
    match data {
        SectionData::CatalogOverview(o) => {
            writeln!(out, "  Products:            {}", o.products)?;
            writeln!(out, "  Brands:              {}", o.brands)?;
            writeln!(out, "  Root categories:     {}", o.root_categories)?;
            writeln!(out, "  With Buy Box price:  {}", o.with_buy_box_price)?;
            writeln!(out, "  With sales rank:     {}", o.with_sales_rank)?;
        }
        SectionData::PricingOverview(o) => {
            writeln!(out, "  Products:            {}", o.products)?;
            writeln!(out, "  Sources:             {}", o.sources.join(", "))?;
            writeln!(out, "  Rated:               {}", o.rated)?;
            writeln!(out, "  Average rating:      {}", format_stat(o.average_rating, 2))?;
            writeln!(out, "  Total reviews:       {}", format_stat(o.total_reviews, 0))?;
        }
        SectionData::Ranking(result) => render_ranking(out, result)?,
        SectionData::Summary { columns } => {
            for summary in columns {
                render_summary_row(out, &summary.column, &summary.stats)?;
            }
        }
        SectionData::Correlation(c) => {
            writeln!(
                out,
                "  corr({}, {}) = {} over {} pairs",
                c.x,
                c.y,
                format_stat(c.coefficient, 3),
                c.pairs
            )?;
        }
        SectionData::Distribution {
            key_label,
            value_label,
            groups,
        } => {
            writeln!(out, "  {value_label} by {key_label}")?;
            for group in groups {
                render_summary_row(out, &group.key, &group.stats)?;
            }
        }
    }
    Ok(())
}

/// Renders the whole report as plain text.
pub fn render_text(report: &Report, out: &mut impl Write) -> Result<()> {
    writeln!(out, "# {}", report.title)?;
    writeln!(
        out,
        "Generated {} | narrative {}",
        report.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
        report.narrative_version.as_deref().unwrap_or("none")
    )?;

    for (idx, section) in report.sections.iter().enumerate() {
        writeln!(out)?;
        writeln!(out, "## {}. {} [{}]", idx + 1, section.title, section.id)?;

        match &section.outcome {
            SectionOutcome::Ready { data } => render_data(out, data)?,
            SectionOutcome::Unavailable { reason } => writeln!(out, "  ! {reason}")?,
        }

        for block in &section.narrative {
            if let Some(heading) = &block.heading {
                writeln!(out, "  ### {heading}")?;
            }
            for line in block.body.lines() {
                writeln!(out, "  {line}")?;
            }
        }
    }

    Ok(())
}

/// Writes the report as pretty JSON, gzip-compressed when `gzip` is set.
///
/// Returns the path written; `.gz` is appended when compressing.
pub fn write_json(path: &Path, report: &Report, gzip: bool) -> Result<PathBuf> {
    let body = serde_json::to_vec_pretty(report)?;

    let target = if gzip {
        let mut name = path.as_os_str().to_owned();
        name.push(".gz");
        PathBuf::from(name)
    } else {
        path.to_path_buf()
    };

    let file = File::create(&target)
        .with_context(|| format!("failed to create {}", target.display()))?;

    if gzip {
        let mut encoder = GzEncoder::new(file, Compression::default());
        encoder.write_all(&body)?;
        encoder.finish()?;
    } else {
        let mut file = file;
        file.write_all(&body)?;
    }

    info!(path = %target.display(), bytes = body.len(), gzip, "Report JSON written");
    Ok(target)
}

fn opt_cell(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn raw_summary_cells(stats: &SummaryStats) -> Vec<String> {
    vec![
        stats.count.to_string(),
        opt_cell(stats.min),
        opt_cell(stats.q1),
        opt_cell(stats.median),
        opt_cell(stats.q3),
        opt_cell(stats.max),
        opt_cell(stats.mean),
        opt_cell(stats.mode),
        opt_cell(stats.variance),
        opt_cell(stats.std_dev),
    ]
}

/// Writes one CSV per chartable section into `dir`, named `<section id>.csv`.
///
/// Missing statistics are written as empty cells. Overview and unavailable
/// sections are skipped. Returns the number of files written.
pub fn write_section_tables(dir: &Path, report: &Report) -> Result<usize> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create {}", dir.display()))?;

    let mut written = 0;
    for section in &report.sections {
        let Some(data) = section.data() else {
            continue;
        };

        let mut rows: Vec<Vec<String>> = Vec::new();
        match data {
            SectionData::CatalogOverview(_) | SectionData::PricingOverview(_) => continue,
            SectionData::Ranking(result) => {
                rows.push(vec![result.key_label.clone(), result.value_label.clone()]);
                for entry in &result.entries {
                    rows.push(vec![entry.key.clone(), entry.value.to_string()]);
                }
            }
            SectionData::Summary { columns } => {
                rows.push(summary_header("Column"));
                for summary in columns {
                    let mut row = vec![summary.column.clone()];
                    row.extend(raw_summary_cells(&summary.stats));
                    rows.push(row);
                }
            }
            SectionData::Distribution {
                key_label, groups, ..
            } => {
                rows.push(summary_header(key_label));
                for group in groups {
                    let mut row = vec![group.key.clone()];
                    row.extend(raw_summary_cells(&group.stats));
                    rows.push(row);
                }
            }
            SectionData::Correlation(c) => {
                rows.push(vec!["x".into(), "y".into(), "pairs".into(), "coefficient".into()]);
                rows.push(vec![
                    c.x.clone(),
                    c.y.clone(),
                    c.pairs.to_string(),
                    opt_cell(c.coefficient),
                ]);
            }
        }

        let path = dir.join(format!("{}.csv", section.id));
        let mut writer = WriterBuilder::new().from_path(&path)?;
        for row in &rows {
            writer.write_record(row)?;
        }
        writer.flush()?;

        debug!(path = %path.display(), rows = rows.len() - 1, "Section table written");
        written += 1;
    }

    info!(dir = %dir.display(), files = written, "Section tables written");
    Ok(written)
}

fn summary_header(first: &str) -> Vec<String> {
    std::iter::once(first)
        .chain(SUMMARY_HEADERS)
        .map(str::to_string)
        .collect()
}
