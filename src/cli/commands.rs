//! Subcommand execution
//!
//! Each command loads its inputs, runs one library operation and writes the
//! results. Structural and I/O failures are returned; per-event rejections
//! go to the review report.

use chrono::{Local, NaiveDate};
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use tracing::info;

use super::args::{CliArgs, Command, ReconcileArgs, RemitArgs, StrategyType, SweepArgs};
use crate::cnab::encode_remittance;
use crate::config::load_profile;
use crate::core::{sweep_overdue, BoletoStore};
use crate::io::{read_boletos, write_batch_file, write_boletos_csv, write_rejections_csv};
use crate::strategy::create_strategy;
use crate::types::{BoletoError, BoletoRecord, BoletoStatus};

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn write_boletos_to(records: &[BoletoRecord], path: Option<&Path>) -> Result<(), BoletoError> {
    match path {
        Some(path) => {
            let mut file = File::create(path)?;
            write_boletos_csv(records, &mut file)
        }
        None => {
            let mut stdout = io::stdout();
            write_boletos_csv(records, &mut stdout)
        }
    }
}

/// Execute the parsed command line
pub fn run(args: CliArgs) -> Result<(), BoletoError> {
    match args.command {
        Command::Remit(remit) => run_remit(remit),
        Command::Reconcile(reconcile) => run_reconcile(reconcile),
        Command::SweepOverdue(sweep) => run_sweep(sweep),
    }
}

fn run_remit(args: RemitArgs) -> Result<(), BoletoError> {
    let profile = load_profile(&args.profile)?;
    let pending: Vec<BoletoRecord> = read_boletos(&args.boletos)?
        .into_iter()
        .filter(|record| record.status == BoletoStatus::Issued)
        .collect();

    let generated_on = args.date.unwrap_or_else(today);
    let batch = encode_remittance(&profile, &pending, args.sequence, generated_on)?;
    let path = write_batch_file(&args.output_dir, &batch.metadata.file_name, &batch.bytes)?;

    info!(
        path = %path.display(),
        boletos = batch.metadata.boleto_count,
        total = %batch.metadata.total_value,
        "Remittance batch written"
    );
    writeln!(io::stdout(), "{}", path.display())?;
    Ok(())
}

fn run_reconcile(args: ReconcileArgs) -> Result<(), BoletoError> {
    let boletos = read_boletos(&args.boletos)?;
    let as_of = args.as_of.unwrap_or_else(today);

    let config = match args.strategy {
        StrategyType::Async => Some(args.to_reconcile_config()),
        StrategyType::Sync => None,
    };
    let strategy = create_strategy(args.strategy.clone(), config);
    let report = strategy.process(&args.return_file, boletos, as_of)?;

    let mut rejections = File::create(&args.rejections)?;
    write_rejections_csv(&report.result.rejected, &mut rejections)?;
    write_boletos_to(&report.boletos, args.output.as_deref())?;

    info!(
        applied = report.result.applied.len(),
        rejected = report.result.rejected.len(),
        report = %args.rejections.display(),
        "Return file reconciled"
    );
    Ok(())
}

fn run_sweep(args: SweepArgs) -> Result<(), BoletoError> {
    let mut store = BoletoStore::from_records(read_boletos(&args.boletos)?);
    let as_of = args.as_of.unwrap_or_else(today);

    sweep_overdue(&mut store, as_of);
    write_boletos_to(&store.into_records(), args.output.as_deref())
}
