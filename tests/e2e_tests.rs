//! End-to-end integration tests
//!
//! These tests drive the complete interchange cycle:
//! 1. Boletos are encoded into a remittance batch
//! 2. A simulated bank echoes them back in a return file
//! 3. The return file is reconciled against the boleto set
//!
//! Every reconciliation scenario runs twice: once with the sequential
//! strategy and once with the concurrent one.

#[cfg(test)]
mod tests {
    use boleto_interchange::cli::{self, CliArgs, StrategyType};
    use boleto_interchange::cnab::layout::{LINE_WIDTH, TRAILER_RECORD_COUNT};
    use boleto_interchange::config::load_profile;
    use boleto_interchange::core::TransitionOutcome;
    use boleto_interchange::io::read_boletos;
    use boleto_interchange::strategy::{create_strategy, ReconcileConfig, ReconcileReport};
    use boleto_interchange::types::{
        BeneficiaryProfile, BoletoError, BoletoRecord, BoletoStatus, Cents, Payer, ReturnEvent,
    };
    use boleto_interchange::{encode_remittance, encode_return};
    use chrono::NaiveDate;
    use clap::Parser;
    use rstest::rstest;
    use std::fs;
    use std::io::Write;
    use std::path::Path;
    use tempfile::{tempdir, NamedTempFile};

    fn date(month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, month, day).unwrap()
    }

    fn profile() -> BeneficiaryProfile {
        BeneficiaryProfile {
            bank_code: 1,
            bank_name: "BANCO DO BRASIL".to_string(),
            agency: 4321,
            account: 998877,
            account_digit: "X".to_string(),
            wallet: 17,
            tax_id: "12345678000190".to_string(),
            name: "BENEFICIARIO EXEMPLO".to_string(),
        }
    }

    fn boletos(n: u64) -> Vec<BoletoRecord> {
        (1..=n)
            .map(|id| BoletoRecord {
                id,
                our_number: Some(format!("{:010}", id)),
                document_number: format!("CT{}-{}", id / 10, id % 10),
                client_id: id / 10,
                contract_id: id / 10,
                installment: (id % 10) as u32 + 1,
                face_value: Some(Cents(25_000 + id as i64)),
                due_date: Some(date(5, 10)),
                payer: Payer {
                    tax_id: format!("{:011}", id),
                    name: format!("Pagador {}", id),
                    ..Payer::default()
                },
                status: BoletoStatus::Issued,
            })
            .collect()
    }

    fn echo_paid(records: &[BoletoRecord]) -> Vec<ReturnEvent> {
        records
            .iter()
            .map(|record| {
                ReturnEvent::paid(
                    record.our_number.as_deref().unwrap(),
                    date(5, 9),
                    record.face_value.unwrap(),
                )
            })
            .collect()
    }

    fn create_temp_file(bytes: &[u8]) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(bytes).expect("Failed to write to temp file");
        file.flush().expect("Failed to flush temp file");
        file
    }

    fn return_file(events: &[ReturnEvent]) -> NamedTempFile {
        let bytes = encode_return(&profile(), events, 1, date(5, 11)).unwrap();
        create_temp_file(&bytes)
    }

    fn reconcile(
        strategy_type: StrategyType,
        path: &Path,
        records: Vec<BoletoRecord>,
    ) -> Result<ReconcileReport, BoletoError> {
        let config = match strategy_type {
            StrategyType::Async => Some(ReconcileConfig::new(4)),
            StrategyType::Sync => None,
        };
        create_strategy(strategy_type, config).process(path, records, date(5, 31))
    }

    #[rstest]
    fn test_round_trip_all_applied(
        #[values(1, 2, 100)] n: u64,
        #[values(StrategyType::Sync, StrategyType::Async)] strategy: StrategyType,
    ) {
        let records = boletos(n);
        let batch = encode_remittance(&profile(), &records, 1, date(5, 1)).unwrap();
        assert_eq!(batch.metadata.record_count, 2 * n as usize + 2);
        assert!(batch.lines().all(|line| line.chars().count() == LINE_WIDTH));

        let file = return_file(&echo_paid(&records));
        let report = reconcile(strategy, file.path(), records).unwrap();

        assert_eq!(report.result.applied.len(), n as usize);
        assert!(report.result.rejected.is_empty());
        assert!(report.boletos.iter().all(|record| record.status.is_paid()));
    }

    #[rstest]
    fn test_replayed_return_file_is_noop(
        #[values(StrategyType::Sync, StrategyType::Async)] strategy: StrategyType,
    ) {
        let records = boletos(5);
        let file = return_file(&echo_paid(&records));

        let first = reconcile(strategy.clone(), file.path(), records).unwrap();
        let second = reconcile(strategy, file.path(), first.boletos.clone()).unwrap();

        assert!(second.result.rejected.is_empty());
        assert!(second
            .result
            .applied
            .iter()
            .all(|applied| applied.outcome == TransitionOutcome::Unchanged));
        assert_eq!(second.boletos, first.boletos);
    }

    #[rstest]
    fn test_conflicting_replay_keeps_original_settlement(
        #[values(StrategyType::Sync, StrategyType::Async)] strategy: StrategyType,
    ) {
        let records = boletos(1);
        let first = reconcile(strategy.clone(), return_file(&echo_paid(&records)).path(), records)
            .unwrap();

        let conflicting = return_file(&[ReturnEvent::paid("0000000001", date(5, 9), Cents(1))]);
        let second = reconcile(strategy, conflicting.path(), first.boletos.clone()).unwrap();

        assert!(matches!(
            second.result.rejected[0].reason,
            BoletoError::ConflictingSettlement { .. }
        ));
        assert_eq!(second.boletos, first.boletos);
    }

    #[rstest]
    fn test_cancel_after_payment_and_unknown_reference(
        #[values(StrategyType::Sync, StrategyType::Async)] strategy: StrategyType,
    ) {
        let records = boletos(3);
        let mut events = echo_paid(&records[..1]);
        events.push(ReturnEvent::cancelled("0000000001", date(5, 12)));
        events.push(ReturnEvent::paid("0000009999", date(5, 9), Cents(100)));
        events.push(ReturnEvent::cancelled("0000000002", date(5, 12)));
        events.push(ReturnEvent::overdue("0000000003", date(5, 20)));

        let report = reconcile(strategy, return_file(&events).path(), records).unwrap();

        assert_eq!(report.result.applied.len(), 3);
        assert_eq!(report.result.rejected.len(), 2);
        assert!(matches!(
            report.result.rejected[0].reason,
            BoletoError::AlreadySettled { .. }
        ));
        assert!(matches!(
            report.result.rejected[1].reason,
            BoletoError::UnknownBoleto { .. }
        ));
        assert!(report.boletos[0].status.is_paid());
        assert_eq!(report.boletos[1].status, BoletoStatus::Cancelled);
        assert_eq!(report.boletos[2].status, BoletoStatus::Overdue);
    }

    #[test]
    fn test_strategies_produce_identical_reports() {
        let records = boletos(50);
        let mut events = echo_paid(&records);
        for record in records.iter().step_by(7) {
            let our_number = record.our_number.as_deref().unwrap();
            events.push(ReturnEvent::cancelled(our_number, date(5, 12)));
            events.push(ReturnEvent::paid(our_number, date(5, 9), Cents(3)));
        }
        let file = return_file(&events);

        let sync = reconcile(StrategyType::Sync, file.path(), records.clone()).unwrap();
        let parallel = reconcile(StrategyType::Async, file.path(), records).unwrap();

        assert_eq!(sync, parallel);
    }

    #[rstest]
    fn test_trailer_count_mismatch_aborts_run(
        #[values(StrategyType::Sync, StrategyType::Async)] strategy: StrategyType,
    ) {
        let records = boletos(8);
        let bytes = encode_return(&profile(), &echo_paid(&records), 1, date(5, 11)).unwrap();

        // Declare 10 detail records in the trailer while the file holds 8
        let text = String::from_utf8(bytes).unwrap();
        let mut lines: Vec<String> = text.split("\r\n").map(str::to_string).collect();
        lines.retain(|line| !line.is_empty());
        let trailer = lines.last_mut().unwrap();
        trailer.replace_range(TRAILER_RECORD_COUNT.range(), "000010");
        let file = create_temp_file(format!("{}\r\n", lines.join("\r\n")).as_bytes());

        let err = reconcile(strategy, file.path(), records).unwrap_err();
        assert_eq!(
            err,
            BoletoError::CountMismatch {
                declared: 10,
                actual: 8
            }
        );
    }

    #[test]
    fn test_fixture_remittance() {
        let profile = load_profile(Path::new("tests/fixtures/beneficiary.toml")).unwrap();
        let records = read_boletos(Path::new("tests/fixtures/boletos.csv")).unwrap();
        assert_eq!(records.len(), 5);

        let pending: Vec<BoletoRecord> = records
            .into_iter()
            .filter(|record| record.status == BoletoStatus::Issued)
            .collect();
        let batch = encode_remittance(&profile, &pending, 42, date(5, 1)).unwrap();

        assert_eq!(batch.metadata.file_name, "REMESSA_01052024_42.REM");
        assert_eq!(batch.metadata.boleto_count, 3);
        assert_eq!(batch.metadata.total_value, Cents(190_050));
        assert_eq!(batch.bytes.len(), 8 * (LINE_WIDTH + 2));
        assert!(batch.bytes.is_ascii());
    }

    #[test]
    fn test_cli_reconcile_writes_outputs() {
        let dir = tempdir().unwrap();
        let events = vec![
            ReturnEvent::paid("0000000101", date(5, 9), Cents(35_000)),
            ReturnEvent::cancelled("0000000104", date(5, 12)),
        ];
        let return_path = dir.path().join("RETORNO.RET");
        fs::write(
            &return_path,
            encode_return(&profile(), &events, 3, date(5, 13)).unwrap(),
        )
        .unwrap();
        let output = dir.path().join("updated.csv");
        let rejections = dir.path().join("rejections.csv");

        let args = CliArgs::try_parse_from([
            "boleto-interchange",
            "reconcile",
            "--return-file",
            return_path.to_str().unwrap(),
            "--boletos",
            "tests/fixtures/boletos.csv",
            "--output",
            output.to_str().unwrap(),
            "--rejections",
            rejections.to_str().unwrap(),
            "--strategy",
            "sync",
            "--as-of",
            "2024-05-31",
        ])
        .unwrap();
        cli::run(args).unwrap();

        let updated = read_boletos(&output).unwrap();
        assert_eq!(updated.len(), 5);
        assert!(updated[0].status.is_paid());
        assert!(updated[3].status.is_paid());

        let report = fs::read_to_string(&rejections).unwrap();
        let lines: Vec<&str> = report.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[1].starts_with("3,0000000104,cancelled,business,"));
    }

    #[test]
    fn test_cli_remit_and_sweep() {
        let dir = tempdir().unwrap();

        let remit = CliArgs::try_parse_from([
            "boleto-interchange",
            "remit",
            "--profile",
            "tests/fixtures/beneficiary.toml",
            "--boletos",
            "tests/fixtures/boletos.csv",
            "--sequence",
            "7",
            "--date",
            "2024-05-01",
            "--output-dir",
            dir.path().to_str().unwrap(),
        ])
        .unwrap();
        cli::run(remit).unwrap();
        let batch = fs::read(dir.path().join("REMESSA_01052024_7.REM")).unwrap();
        assert_eq!(batch.len(), 8 * (LINE_WIDTH + 2));

        let swept = dir.path().join("swept.csv");
        let sweep = CliArgs::try_parse_from([
            "boleto-interchange",
            "sweep-overdue",
            "--boletos",
            "tests/fixtures/boletos.csv",
            "--as-of",
            "2024-05-12",
            "--output",
            swept.to_str().unwrap(),
        ])
        .unwrap();
        cli::run(sweep).unwrap();

        let statuses: Vec<BoletoStatus> = read_boletos(&swept)
            .unwrap()
            .iter()
            .map(|record| record.status)
            .collect();
        assert_eq!(statuses[0], BoletoStatus::Overdue);
        assert_eq!(statuses[1], BoletoStatus::Issued);
        assert_eq!(statuses[2], BoletoStatus::Issued);
        assert!(statuses[3].is_paid());
        assert_eq!(statuses[4], BoletoStatus::Cancelled);
    }
}
