//! Sequential reconciliation strategy
//!
//! Reads the return file, decodes it and applies every event in file order
//! against an in-memory `BoletoStore`.

use crate::cnab::decode_return;
use crate::core::{BoletoStore, Reconciler};
use crate::io::read_return_file;
use crate::strategy::{ReconcileReport, ReconcileStrategy};
use crate::types::{BoletoError, BoletoRecord};
use chrono::NaiveDate;
use std::path::Path;

#[derive(Debug, Clone, Copy)]
pub struct SyncReconcileStrategy;

impl ReconcileStrategy for SyncReconcileStrategy {
    fn process(
        &self,
        return_path: &Path,
        boletos: Vec<BoletoRecord>,
        as_of: NaiveDate,
    ) -> Result<ReconcileReport, BoletoError> {
        let bytes = read_return_file(return_path)?;
        let events = decode_return(&bytes)?;

        let mut store = BoletoStore::from_records(boletos);
        let result = Reconciler::new(as_of).reconcile(events, &mut store);

        Ok(ReconcileReport {
            result,
            boletos: store.into_records(),
        })
    }
}
