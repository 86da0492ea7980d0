//! Command-line argument definitions for the sales processor
//!
//! This module defines the complete CLI interface using clap derive API.

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::app::services::sales_views::{Dimension, SaleFilter};
use crate::app::services::sample_export::SampleOptions;
use crate::config::{DelimiterPolicy, PipelineConfig};
use crate::{Error, Result};

/// CLI arguments for the sales export processor
///
/// Reads the CSV sales exports of a legacy accounting system and reports
/// clean, signed sales totals.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "sales-processor",
    version,
    about = "Normalize legacy accounting CSV sales exports and report sales totals",
    long_about = "Reads the irregular CSV sales exports of a legacy desktop accounting system \
                  (Windows-1252 text, optional sep= line, comma or semicolon delimiters, \
                  comma-decimal amounts), resolves their columns, signs credit notes, drops \
                  cancelled documents and reports the resulting sales."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands for the sales processor
#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Parse exports and report sales totals (main command)
    Process(ProcessArgs),
    /// Show how a single export is read: delimiter, columns and rejections
    Inspect(InspectArgs),
    /// Write a synthetic export in the accounting system's layout
    Sample(SampleArgs),
}

/// Arguments for the process command
#[derive(Debug, Clone, Parser)]
pub struct ProcessArgs {
    /// Export files or directories containing exports
    #[arg(value_name = "INPUT", required = true, num_args = 1..)]
    pub inputs: Vec<PathBuf>,

    /// File name pattern used when scanning directories
    #[arg(
        long = "pattern",
        value_name = "GLOB",
        help = "File name pattern for directory inputs (default: *.csv)"
    )]
    pub pattern: Option<String>,

    /// Only scan the top level of directory inputs
    #[arg(long = "no-recursive", help = "Do not descend into subdirectories")]
    pub no_recursive: bool,

    /// Path to configuration file
    ///
    /// JSON configuration file for labels, credit-note codes and formats. If not
    /// specified, looks for <config dir>/sales-processor/config.json
    #[arg(
        short = 'c',
        long = "config",
        value_name = "FILE",
        help = "Path to configuration file (JSON format)"
    )]
    pub config_file: Option<PathBuf>,

    /// How to pick the delimiter when the file has no sep= line
    #[arg(long = "delimiter-policy", value_enum, value_name = "POLICY")]
    pub delimiter_policy: Option<DelimiterPolicyArg>,

    /// Date pattern of the export's date column
    #[arg(
        long = "date-format",
        value_name = "FMT",
        help = "strftime-style date pattern (default: %d-%m-%Y)"
    )]
    pub date_format: Option<String>,

    /// Keep sales on or after this date
    #[arg(long = "from", value_name = "YYYY-MM-DD", value_parser = parse_iso_date)]
    pub date_from: Option<NaiveDate>,

    /// Keep sales on or before this date
    #[arg(long = "to", value_name = "YYYY-MM-DD", value_parser = parse_iso_date)]
    pub date_to: Option<NaiveDate>,

    /// Keep only these product families (repeatable)
    #[arg(long = "family", value_name = "FAMILY")]
    pub families: Vec<String>,

    /// Keep only these salespeople (repeatable)
    #[arg(long = "salesperson", value_name = "NAME")]
    pub salespeople: Vec<String>,

    /// Keep only these customers (repeatable)
    #[arg(long = "customer", value_name = "NAME")]
    pub customers: Vec<String>,

    /// Report net totals grouped by this column
    #[arg(long = "group-by", value_enum, value_name = "DIMENSION")]
    pub group_by: Option<GroupBy>,

    /// Limit the grouped report to the largest N groups
    #[arg(long = "top", value_name = "N")]
    pub top: Option<usize>,

    /// Logging verbosity level
    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        help = "Increase logging verbosity (-v: info, -vv: debug, -vvv: trace)"
    )]
    pub verbose: u8,

    /// Suppress output (quiet mode)
    ///
    /// Only show errors and the final report. Overrides verbose settings.
    #[arg(
        short = 'q',
        long = "quiet",
        help = "Suppress output except errors",
        conflicts_with = "verbose"
    )]
    pub quiet: bool,

    /// Output format for results
    #[arg(
        long = "output-format",
        value_enum,
        default_value = "human",
        help = "Output format for results"
    )]
    pub output_format: OutputFormat,
}

/// Arguments for the inspect command
#[derive(Debug, Clone, Parser)]
pub struct InspectArgs {
    /// Export file to inspect
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Path to configuration file
    #[arg(
        short = 'c',
        long = "config",
        value_name = "FILE",
        help = "Path to configuration file (JSON format)"
    )]
    pub config_file: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        help = "Enable verbose logging (-v: info, -vv: debug, -vvv: trace)"
    )]
    pub verbose: u8,
}

/// Arguments for the sample command
#[derive(Debug, Clone, Parser)]
pub struct SampleArgs {
    /// Output file; the export is written to stdout when omitted
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Number of sale lines
    #[arg(long = "rows", default_value_t = 1000)]
    pub rows: usize,

    /// Days of history before the end date
    #[arg(long = "days", default_value_t = 90)]
    pub days: u32,

    /// Last sale date (default: today)
    #[arg(long = "end-date", value_name = "YYYY-MM-DD", value_parser = parse_iso_date)]
    pub end_date: Option<NaiveDate>,

    /// Random seed; the same seed gives the same file
    #[arg(long = "seed", default_value_t = 42)]
    pub seed: u64,

    /// Enable verbose logging output
    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        help = "Enable verbose logging (-v: info, -vv: debug, -vvv: trace)"
    )]
    pub verbose: u8,
}

/// Output format options for machine-readable results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON format for scripting
    Json,
    /// CSV format for data analysis
    Csv,
}

/// Delimiter policy as accepted on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DelimiterPolicyArg {
    /// sep= line, else try comma and fall back to semicolon
    Trial,
    /// sep= line, else comma
    Comma,
}

impl From<DelimiterPolicyArg> for DelimiterPolicy {
    fn from(arg: DelimiterPolicyArg) -> Self {
        match arg {
            DelimiterPolicyArg::Trial => DelimiterPolicy::DeclarationOrTrial,
            DelimiterPolicyArg::Comma => DelimiterPolicy::DeclarationOrComma,
        }
    }
}

/// Grouping column as accepted on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum GroupBy {
    Family,
    Salesperson,
    Customer,
    DocumentCode,
}

impl From<GroupBy> for Dimension {
    fn from(arg: GroupBy) -> Self {
        match arg {
            GroupBy::Family => Dimension::Family,
            GroupBy::Salesperson => Dimension::Salesperson,
            GroupBy::Customer => Dimension::Customer,
            GroupBy::DocumentCode => Dimension::DocumentCode,
        }
    }
}

fn parse_iso_date(value: &str) -> std::result::Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|e| format!("invalid date '{}' (expected YYYY-MM-DD): {}", value, e))
}

impl ProcessArgs {
    /// Validate the process command arguments for consistency
    pub fn validate(&self) -> Result<()> {
        if let (Some(from), Some(to)) = (self.date_from, self.date_to) {
            if from > to {
                return Err(Error::configuration(format!(
                    "--from {} is after --to {}",
                    from, to
                )));
            }
        }

        if self.top == Some(0) {
            return Err(Error::configuration("--top must be greater than 0"));
        }

        if self.top.is_some() && self.group_by.is_none() {
            return Err(Error::configuration("--top requires --group-by"));
        }

        if let Some(config_file) = &self.config_file {
            if !config_file.exists() {
                return Err(Error::configuration(format!(
                    "Config file does not exist: {}",
                    config_file.display()
                )));
            }
        }

        Ok(())
    }

    /// Apply command-line overrides on top of a loaded configuration
    pub fn apply_overrides(&self, config: &mut PipelineConfig) {
        if let Some(policy) = self.delimiter_policy {
            config.delimiter_policy = policy.into();
        }
        if let Some(date_format) = &self.date_format {
            config.date_format = date_format.clone();
        }
        if let Some(pattern) = &self.pattern {
            config.file_pattern = pattern.clone();
        }
        if self.no_recursive {
            config.recursive = false;
        }
    }

    /// Build the row filter from the filter flags
    pub fn sale_filter(&self) -> SaleFilter {
        let mut filter = SaleFilter::new()
            .with_families(self.families.iter().cloned())
            .with_salespeople(self.salespeople.iter().cloned())
            .with_customers(self.customers.iter().cloned());
        filter.date_from = self.date_from;
        filter.date_to = self.date_to;
        filter
    }

    /// Determine the appropriate log level based on verbosity flags
    pub fn get_log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else {
            log_level_for(self.verbose)
        }
    }

    /// Check if we should show progress bars (not in quiet mode)
    pub fn show_progress(&self) -> bool {
        !self.quiet && self.output_format == OutputFormat::Human
    }
}

impl InspectArgs {
    pub fn get_log_level(&self) -> &'static str {
        log_level_for(self.verbose)
    }
}

impl SampleArgs {
    pub fn get_log_level(&self) -> &'static str {
        log_level_for(self.verbose)
    }

    /// Generator options from the flags, keeping defaults for the rest
    pub fn sample_options(&self) -> SampleOptions {
        let defaults = SampleOptions::default();
        SampleOptions {
            rows: self.rows,
            days: self.days,
            end_date: self.end_date.unwrap_or(defaults.end_date),
            seed: self.seed,
            ..defaults
        }
    }
}

fn log_level_for(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_process(argv: &[&str]) -> ProcessArgs {
        let args = Args::try_parse_from(argv).unwrap();
        match args.command {
            Some(Commands::Process(process)) => process,
            other => panic!("expected process command, got {:?}", other),
        }
    }

    #[test]
    fn test_process_args_parsing() {
        let args = parse_process(&[
            "sales-processor",
            "process",
            "jan.csv",
            "exports/",
            "--from",
            "2024-01-01",
            "--to",
            "2024-03-31",
            "--family",
            "ELET",
            "--family",
            "MOB",
            "--group-by",
            "document-code",
            "--top",
            "5",
            "--delimiter-policy",
            "comma",
            "--output-format",
            "json",
        ]);

        assert_eq!(args.inputs, vec![PathBuf::from("jan.csv"), PathBuf::from("exports/")]);
        assert_eq!(args.date_from, NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(args.families, vec!["ELET", "MOB"]);
        assert_eq!(args.group_by, Some(GroupBy::DocumentCode));
        assert_eq!(args.top, Some(5));
        assert_eq!(args.delimiter_policy, Some(DelimiterPolicyArg::Comma));
        assert_eq!(args.output_format, OutputFormat::Json);
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_process_requires_input() {
        assert!(Args::try_parse_from(["sales-processor", "process"]).is_err());
    }

    #[test]
    fn test_invalid_date_flag_is_rejected() {
        assert!(Args::try_parse_from(["sales-processor", "process", "a.csv", "--from", "01-03-2024"]).is_err());
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        assert!(Args::try_parse_from(["sales-processor", "process", "a.csv", "-q", "-v"]).is_err());
    }

    #[test]
    fn test_process_args_validation() {
        let args = parse_process(&["sales-processor", "process", "a.csv"]);
        assert!(args.validate().is_ok());

        let mut invalid_args = args.clone();
        invalid_args.date_from = NaiveDate::from_ymd_opt(2024, 5, 1);
        invalid_args.date_to = NaiveDate::from_ymd_opt(2024, 4, 1);
        assert!(invalid_args.validate().is_err());

        let mut invalid_args = args.clone();
        invalid_args.group_by = Some(GroupBy::Family);
        invalid_args.top = Some(0);
        assert!(invalid_args.validate().is_err());

        let mut invalid_args = args.clone();
        invalid_args.top = Some(3);
        assert!(invalid_args.validate().is_err());

        let mut invalid_args = args;
        invalid_args.config_file = Some(PathBuf::from("/nonexistent/config.json"));
        assert!(invalid_args.validate().is_err());
    }

    #[test]
    fn test_apply_overrides() {
        let args = parse_process(&[
            "sales-processor",
            "process",
            "exports",
            "--pattern",
            "vendas_*.csv",
            "--no-recursive",
            "--date-format",
            "%d/%m/%Y",
            "--delimiter-policy",
            "comma",
        ]);

        let mut config = PipelineConfig::default();
        args.apply_overrides(&mut config);

        assert_eq!(config.file_pattern, "vendas_*.csv");
        assert!(!config.recursive);
        assert_eq!(config.date_format, "%d/%m/%Y");
        assert_eq!(config.delimiter_policy, DelimiterPolicy::DeclarationOrComma);
    }

    #[test]
    fn test_sale_filter_from_flags() {
        let args = parse_process(&[
            "sales-processor",
            "process",
            "a.csv",
            "--salesperson",
            "Ana",
            "--to",
            "2024-02-29",
        ]);
        let filter = args.sale_filter();

        assert!(filter.salespeople.contains("Ana"));
        assert!(filter.families.is_empty());
        assert_eq!(filter.date_to, NaiveDate::from_ymd_opt(2024, 2, 29));
        assert!(!filter.is_unrestricted());
    }

    #[test]
    fn test_log_level() {
        let mut args = parse_process(&["sales-processor", "process", "a.csv"]);

        assert_eq!(args.get_log_level(), "warn");

        args.verbose = 1;
        assert_eq!(args.get_log_level(), "info");

        args.verbose = 2;
        assert_eq!(args.get_log_level(), "debug");

        args.verbose = 3;
        assert_eq!(args.get_log_level(), "trace");

        args.quiet = true;
        assert_eq!(args.get_log_level(), "error");
    }

    #[test]
    fn test_show_progress() {
        let mut args = parse_process(&["sales-processor", "process", "a.csv"]);
        assert!(args.show_progress());

        args.output_format = OutputFormat::Csv;
        assert!(!args.show_progress());

        args.output_format = OutputFormat::Human;
        args.quiet = true;
        assert!(!args.show_progress());
    }

    #[test]
    fn test_inspect_args() {
        let args = Args::try_parse_from(["sales-processor", "inspect", "jan.csv", "-vv"]).unwrap();
        let Some(Commands::Inspect(inspect)) = args.command else {
            panic!("expected inspect command");
        };
        assert_eq!(inspect.file, PathBuf::from("jan.csv"));
        assert_eq!(inspect.get_log_level(), "debug");
    }

    #[test]
    fn test_sample_args() {
        let args = Args::try_parse_from([
            "sales-processor",
            "sample",
            "-o",
            "demo.csv",
            "--rows",
            "200",
            "--end-date",
            "2024-03-31",
            "--seed",
            "7",
        ])
        .unwrap();
        let Some(Commands::Sample(sample)) = args.command else {
            panic!("expected sample command");
        };

        let options = sample.sample_options();
        assert_eq!(sample.output, Some(PathBuf::from("demo.csv")));
        assert_eq!(options.rows, 200);
        assert_eq!(options.days, 90);
        assert_eq!(options.seed, 7);
        assert_eq!(options.end_date, NaiveDate::from_ymd_opt(2024, 3, 31).unwrap());
    }
}
