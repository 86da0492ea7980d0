//! Command implementations for the sales processor CLI
//!
//! This module contains the command execution logic, progress reporting and
//! report rendering for the CLI interface.

use colored::*;
use csv::WriterBuilder;
use indicatif::{HumanDuration, ProgressBar, ProgressStyle};
use rust_decimal::Decimal;
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

use crate::app::models::{CanonicalField, SaleTable};
use crate::app::services::file_discovery::discover_all;
use crate::app::services::sales_csv_parser::{ByteSource, ParseStats, SalesCsvParser};
use crate::app::services::sales_views::{
    Dimension, GroupTotal, MonthlyTotal, SalesSummary, group_totals, monthly_totals,
};
use crate::app::services::sample_export::generate_sample_bytes;
use crate::cli::args::{Commands, InspectArgs, OutputFormat, ProcessArgs, SampleArgs};
use crate::config::PipelineConfig;
use crate::{Error, Result};

/// Processing statistics for reporting
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProcessingStats {
    /// Export files found on disk
    pub files_discovered: usize,
    /// Files parsed without a structural error
    pub files_processed: usize,
    /// Files skipped for a structural error, with the reason
    pub failed_files: Vec<(String, String)>,
    /// Row counters summed over all processed files
    pub rows: ParseStats,
    /// Sales left after the command-line filters
    pub sales_reported: usize,
    /// Total processing time
    #[serde(skip)]
    pub processing_time: Duration,
}

/// Everything the process command reports
#[derive(Debug, Clone)]
pub struct SalesReport {
    pub stats: ProcessingStats,
    pub summary: SalesSummary,
    pub monthly: Vec<MonthlyTotal>,
    pub groups: Option<(Dimension, Vec<GroupTotal>)>,
}

/// Main command runner for the sales processor
pub fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Process(args) => run_process(&args).map(|_| ()),
        Commands::Inspect(args) => run_inspect(&args),
        Commands::Sample(args) => run_sample(&args),
    }
}

/// Parse all inputs, apply filters and print the report
///
/// 1. Set up logging and configuration
/// 2. Discover export files
/// 3. Parse them with progress reporting
/// 4. Filter, aggregate and report
pub fn run_process(args: &ProcessArgs) -> Result<SalesReport> {
    let start_time = Instant::now();

    setup_logging(args.get_log_level(), args.quiet)?;
    info!("Starting sales processor");
    debug!("Command line arguments: {:?}", args);

    args.validate()?;
    let config = load_configuration(args.config_file.as_deref(), |config| {
        args.apply_overrides(config)
    })?;

    let files = discover_all(&args.inputs, &config.file_pattern, config.recursive)?;
    if files.is_empty() {
        return Err(Error::source_missing(
            display_inputs(&args.inputs),
            format!("no files match '{}'", config.file_pattern),
        ));
    }
    info!("Processing {} export files", files.len());

    let sources: Vec<ByteSource> = files.iter().map(|f| ByteSource::path(&f.path)).collect();
    let parser = SalesCsvParser::new(config);

    let progress_bar = if args.show_progress() {
        let pb = ProgressBar::new(sources.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .map(|style| style.progress_chars("#>-"))
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        pb.set_message("Parsing exports...");
        Some(pb)
    } else {
        None
    };

    let batch = parser.parse_batch_with(&sources, |report| {
        if let Some(pb) = &progress_bar {
            pb.inc(1);
            pb.set_message(report.source_name.clone());
        }
    })?;

    if let Some(pb) = &progress_bar {
        pb.finish_with_message("Parsing complete");
    }

    let failed_files: Vec<(String, String)> = batch
        .failed_files()
        .map(|(name, e)| {
            error!("Failed to process {}: {}", name, e);
            (name.to_string(), e.to_string())
        })
        .collect();

    if batch.table.is_empty() {
        return Err(Error::empty_result(display_inputs(&args.inputs)));
    }

    let filter = args.sale_filter();
    let table = if filter.is_unrestricted() {
        batch.table.clone()
    } else {
        filter.apply(&batch.table)
    };
    if table.is_empty() {
        warn!("No sales left after filtering");
    }

    let report = build_report(args, &table, ProcessingStats {
        files_discovered: files.len(),
        files_processed: batch.succeeded_count(),
        failed_files,
        rows: batch.total_stats(),
        sales_reported: table.len(),
        processing_time: start_time.elapsed(),
    });

    generate_final_report(args.output_format, &report)?;

    Ok(report)
}

fn build_report(args: &ProcessArgs, table: &SaleTable, stats: ProcessingStats) -> SalesReport {
    let groups = args.group_by.map(|group_by| {
        let dimension = Dimension::from(group_by);
        let mut totals = group_totals(table, dimension);
        if let Some(top) = args.top {
            totals.truncate(top);
        }
        (dimension, totals)
    });

    SalesReport {
        stats,
        summary: SalesSummary::from_table(table),
        monthly: monthly_totals(table),
        groups,
    }
}

/// Parse one file and print how it was read
pub fn run_inspect(args: &InspectArgs) -> Result<()> {
    setup_logging(args.get_log_level(), false)?;

    let config = load_configuration(args.config_file.as_deref(), |_| {})?;
    let parser = SalesCsvParser::new(config);
    let result = parser.parse_source(&ByteSource::path(&args.file))?;

    println!("\n{}", "Export Inspection".bright_green().bold());
    println!("  {} {}", "File:".bright_cyan(), args.file.display());
    println!("  {} {:?}", "Delimiter:".bright_cyan(), result.delimiter);
    println!("  {} {}", "Header:".bright_cyan(), result.header.join(" | "));

    println!("\n{}", "Column Mapping".bright_green().bold());
    for field in CanonicalField::ALL {
        match result.column_map.assignment(field) {
            Some(assignment) => println!(
                "  {:<20} #{} '{}' ({})",
                field.name(),
                assignment.index,
                assignment.label,
                assignment.kind
            ),
            None => println!(
                "  {:<20} {}",
                field.name(),
                "not found".bright_yellow()
            ),
        }
    }

    let stats = &result.stats;
    println!("\n{}", "Rows".bright_green().bold());
    println!("  {} {}", "Data records:".bright_cyan(), stats.total_records);
    println!(
        "  {} {}",
        "Accepted:".bright_cyan(),
        stats.accepted.to_string().bright_white().bold()
    );
    println!("  {} {}", "Rejected (parse):".bright_cyan(), stats.rows_rejected_parse);
    println!("  {} {}", "Rejected (cancelled):".bright_cyan(), stats.rows_rejected_cancelled);
    println!("  {} {}", "Malformed:".bright_cyan(), stats.rows_malformed);
    println!("  {} {:.1}%", "Success rate:".bright_cyan(), stats.success_rate());

    if !stats.errors.is_empty() {
        println!("\n{}", "Rejections".bright_red().bold());
        for message in &stats.errors {
            println!("  • {}", message);
        }
    }

    println!();
    Ok(())
}

/// Write a synthetic export to a file or stdout
pub fn run_sample(args: &SampleArgs) -> Result<()> {
    setup_logging(args.get_log_level(), false)?;

    let options = args.sample_options();
    let bytes = generate_sample_bytes(&options)?;

    match &args.output {
        Some(path) => {
            std::fs::write(path, &bytes)
                .map_err(|e| Error::io(format!("Failed to write {}", path.display()), e))?;
            info!("Wrote {} sample rows to {}", options.rows, path.display());
            eprintln!(
                "{} {} ({} rows, seed {})",
                "Sample export written:".bright_green(),
                path.display(),
                options.rows,
                options.seed
            );
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&bytes)?;
            stdout.flush()?;
        }
    }

    Ok(())
}

/// Set up structured logging based on CLI arguments
fn setup_logging(log_level: &str, quiet: bool) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("sales_processor={}", log_level)));

    if quiet {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_timer(fmt::time::uptime())
                    .with_writer(std::io::stderr),
            )
            .init();
    }

    debug!("Logging initialized at level: {}", log_level);
    Ok(())
}

/// Load configuration using layered approach (defaults -> file -> args)
fn load_configuration<F>(config_file: Option<&Path>, overrides: F) -> Result<PipelineConfig>
where
    F: FnOnce(&mut PipelineConfig),
{
    match config_file {
        Some(path) => info!("Using config file: {}", path.display()),
        None => debug!("No explicit config file, trying the default location"),
    }

    let mut config = PipelineConfig::load(config_file)?;
    overrides(&mut config);
    config.validate()?;

    debug!("Loaded configuration: {:?}", config);
    Ok(config)
}

fn display_inputs(inputs: &[PathBuf]) -> String {
    inputs
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Generate final processing report
fn generate_final_report(format: OutputFormat, report: &SalesReport) -> Result<()> {
    match format {
        OutputFormat::Human => generate_human_report(report),
        OutputFormat::Json => generate_json_report(report),
        OutputFormat::Csv => generate_csv_report(report),
    }
}

/// Generate human-readable report
fn generate_human_report(report: &SalesReport) -> Result<()> {
    let stats = &report.stats;
    let summary = &report.summary;

    println!("\n{}", "Sales Summary".bright_green().bold());
    println!(
        "  {} {}",
        "Time elapsed:".bright_cyan(),
        HumanDuration(stats.processing_time)
    );
    println!(
        "  {} {} of {}",
        "Files processed:".bright_cyan(),
        stats.files_processed.to_string().bright_white(),
        stats.files_discovered
    );
    if !stats.failed_files.is_empty() {
        println!(
            "  {} {}",
            "Files failed:".bright_red(),
            stats.failed_files.len().to_string().bright_red().bold()
        );
        for (name, reason) in &stats.failed_files {
            println!("    • {}: {}", name, reason);
        }
    }
    println!(
        "  {} {} accepted, {} rejected ({} parse, {} cancelled, {} malformed)",
        "Rows:".bright_cyan(),
        stats.rows.accepted.to_string().bright_white().bold(),
        stats.rows.rejected_total(),
        stats.rows.rows_rejected_parse,
        stats.rows.rows_rejected_cancelled,
        stats.rows.rows_malformed
    );
    println!(
        "  {} {}",
        "Sales reported:".bright_cyan(),
        stats.sales_reported.to_string().bright_white().bold()
    );
    if let (Some(first), Some(last)) = (summary.first_date, summary.last_date) {
        println!("  {} {} to {}", "Period:".bright_cyan(), first, last);
    }
    println!(
        "  {} {} families, {} customers, {} salespeople",
        "Distinct:".bright_cyan(),
        summary.distinct_families,
        summary.distinct_customers,
        summary.distinct_salespeople
    );
    println!("  {} {}", "Gross sales:".bright_cyan(), format_amount(summary.gross_sales));
    println!("  {} {}", "Credit notes:".bright_cyan(), format_amount(summary.credit_total));
    println!(
        "  {} {}",
        "Net total:".bright_cyan(),
        format_amount(summary.net_total).bright_white().bold()
    );

    if !report.monthly.is_empty() {
        println!("\n{}", "Monthly Totals".bright_green().bold());
        for month in &report.monthly {
            println!(
                "  {}  {:>16}  ({} sales)",
                month.label(),
                format_amount(month.net_total),
                month.records
            );
        }
    }

    if let Some((dimension, groups)) = &report.groups {
        println!("\n{} {}", "Totals by".bright_green().bold(), dimension.to_string().bright_green().bold());
        for group in groups {
            println!(
                "  {:<32} {:>16}  ({} sales)",
                group.key,
                format_amount(group.net_total),
                group.records
            );
        }
    }

    println!();
    Ok(())
}

/// Generate JSON report for machine consumption
fn generate_json_report(report: &SalesReport) -> Result<()> {
    let stats = &report.stats;
    let json_report = serde_json::json!({
        "files_discovered": stats.files_discovered,
        "files_processed": stats.files_processed,
        "failed_files": stats.failed_files.iter().map(|(name, reason)| {
            serde_json::json!({
                "file": name,
                "error": reason
            })
        }).collect::<Vec<_>>(),
        "rows": stats.rows,
        "sales_reported": stats.sales_reported,
        "processing_time_seconds": stats.processing_time.as_secs_f64(),
        "summary": report.summary,
        "monthly_totals": report.monthly.iter().map(|m| {
            serde_json::json!({
                "month": m.label(),
                "records": m.records,
                "net_total": m.net_total
            })
        }).collect::<Vec<_>>(),
        "group_by": report.groups.as_ref().map(|(dimension, _)| dimension.to_string()),
        "groups": report.groups.as_ref().map(|(_, groups)| groups),
    });

    println!("{}", serde_json::to_string_pretty(&json_report)?);
    Ok(())
}

/// Generate CSV report for data analysis
fn generate_csv_report(report: &SalesReport) -> Result<()> {
    write_csv_report(report, std::io::stdout().lock())
}

/// Write the metric table and, when grouped, the group table after a blank line
fn write_csv_report<W: Write>(report: &SalesReport, mut out: W) -> Result<()> {
    let stats = &report.stats;
    let summary = &report.summary;

    let metrics: [(&str, String); 13] = [
        ("files_discovered", stats.files_discovered.to_string()),
        ("files_processed", stats.files_processed.to_string()),
        ("files_failed", stats.failed_files.len().to_string()),
        ("total_records", stats.rows.total_records.to_string()),
        ("rows_accepted", stats.rows.accepted.to_string()),
        ("rows_rejected_parse", stats.rows.rows_rejected_parse.to_string()),
        ("rows_rejected_cancelled", stats.rows.rows_rejected_cancelled.to_string()),
        ("rows_malformed", stats.rows.rows_malformed.to_string()),
        ("sales_reported", stats.sales_reported.to_string()),
        ("gross_sales", summary.gross_sales.to_string()),
        ("credit_total", summary.credit_total.to_string()),
        ("net_total", summary.net_total.to_string()),
        ("processing_time_seconds", stats.processing_time.as_secs_f64().to_string()),
    ];

    {
        let mut writer = WriterBuilder::new().from_writer(&mut out);
        writer.write_record(["metric", "value"])?;
        for (metric, value) in &metrics {
            writer.write_record([*metric, value.as_str()])?;
        }
        writer.flush()?;
    }

    if let Some((dimension, groups)) = &report.groups {
        writeln!(out)?;

        let mut writer = WriterBuilder::new().from_writer(&mut out);
        writer.write_record([dimension.to_string().as_str(), "records", "net_total"])?;
        for group in groups {
            writer.write_record([
                group.key.as_str(),
                group.records.to_string().as_str(),
                group.net_total.to_string().as_str(),
            ])?;
        }
        writer.flush()?;
    }

    Ok(())
}

/// Two decimals with a thousands separator, e.g. `-1,234.50`
fn format_amount(amount: Decimal) -> String {
    let rounded = amount.round_dp(2);
    let text = format!("{:.2}", rounded.abs());
    let (integer, fraction) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::new();
    for (i, c) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() { "-" } else { "" };
    format!("{}{}.{}", sign, grouped, fraction)
}
