use crate::strategy::ReconcileConfig;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(name = "boleto-interchange")]
#[command(about = "Generate CNAB240 remittance batches and reconcile bank return files", long_about = None)]
pub struct CliArgs {
    #[arg(
        long = "log-level",
        value_name = "LEVEL",
        default_value = "info",
        global = true,
        help = "Log level when RUST_LOG is not set (error, warn, info, debug, trace)"
    )]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Encode pending boletos into a remittance batch file
    Remit(RemitArgs),
    /// Apply a bank return file to the boleto export
    Reconcile(ReconcileArgs),
    /// Mark issued boletos past their due date as overdue
    SweepOverdue(SweepArgs),
}

#[derive(Args, Debug)]
pub struct RemitArgs {
    #[arg(long = "profile", value_name = "FILE", help = "Beneficiary profile (TOML)")]
    pub profile: PathBuf,

    #[arg(long = "boletos", value_name = "FILE", help = "Boleto export (CSV)")]
    pub boletos: PathBuf,

    #[arg(long = "sequence", value_name = "N", help = "Remittance file sequence number")]
    pub sequence: u32,

    #[arg(
        long = "date",
        value_name = "YYYY-MM-DD",
        help = "Generation date (default: today)"
    )]
    pub date: Option<NaiveDate>,

    #[arg(
        long = "output-dir",
        value_name = "DIR",
        default_value = ".",
        help = "Directory the batch file is written to"
    )]
    pub output_dir: PathBuf,
}

#[derive(Args, Debug)]
pub struct ReconcileArgs {
    #[arg(long = "return-file", value_name = "FILE", help = "Bank return file")]
    pub return_file: PathBuf,

    #[arg(long = "boletos", value_name = "FILE", help = "Boleto export (CSV)")]
    pub boletos: PathBuf,

    #[arg(
        long = "output",
        value_name = "FILE",
        help = "Where to write the updated boleto export (default: stdout)"
    )]
    pub output: Option<PathBuf>,

    #[arg(
        long = "rejections",
        value_name = "FILE",
        default_value = "rejections.csv",
        help = "Review report for events that could not be applied"
    )]
    pub rejections: PathBuf,

    #[arg(
        long = "strategy",
        value_name = "STRATEGY",
        default_value = "async",
        help = "Reconciliation strategy: 'sync' for sequential or 'async' for concurrent"
    )]
    pub strategy: StrategyType,

    #[arg(
        long = "max-concurrent",
        value_name = "COUNT",
        help = "Worker threads for the async strategy (default: CPU cores)"
    )]
    pub max_concurrent: Option<usize>,

    #[arg(
        long = "as-of",
        value_name = "YYYY-MM-DD",
        help = "Reference date for overdue events without a date (default: today)"
    )]
    pub as_of: Option<NaiveDate>,
}

#[derive(Args, Debug)]
pub struct SweepArgs {
    #[arg(long = "boletos", value_name = "FILE", help = "Boleto export (CSV)")]
    pub boletos: PathBuf,

    #[arg(
        long = "output",
        value_name = "FILE",
        help = "Where to write the updated boleto export (default: stdout)"
    )]
    pub output: Option<PathBuf>,

    #[arg(
        long = "as-of",
        value_name = "YYYY-MM-DD",
        help = "Date to evaluate due dates against (default: today)"
    )]
    pub as_of: Option<NaiveDate>,
}

#[derive(Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum StrategyType {
    Sync,
    Async,
}

impl ReconcileArgs {
    pub fn to_reconcile_config(&self) -> ReconcileConfig {
        match self.max_concurrent {
            Some(max_concurrent) => ReconcileConfig::new(max_concurrent),
            None => ReconcileConfig::default(),
        }
    }
}
