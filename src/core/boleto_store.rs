//! In-memory boleto store
//!
//! Holds the boleto set for a single-threaded reconciliation run. Boletos are
//! indexed by our-number; records the bank has not numbered yet are kept
//! aside so that the full set can still be written back.
//!
//! # Duplicate Handling
//!
//! If two records share an our-number, only the first occurrence is indexed.
//! Later ones are kept aside and logged.

use std::collections::HashMap;
use tracing::warn;

use super::traits::BoletoRepository;
use crate::types::{BoletoError, BoletoRecord};

/// Boleto store backed by a `HashMap`
#[derive(Debug, Default)]
pub struct BoletoStore {
    by_our_number: HashMap<String, BoletoRecord>,
    unnumbered: Vec<BoletoRecord>,
}

impl BoletoStore {
    pub fn new() -> Self {
        BoletoStore {
            by_our_number: HashMap::new(),
            unnumbered: Vec::new(),
        }
    }

    pub fn from_records(records: impl IntoIterator<Item = BoletoRecord>) -> Self {
        let mut store = Self::new();
        for record in records {
            store.insert(record);
        }
        store
    }

    /// Add a boleto (first occurrence of an our-number wins)
    pub fn insert(&mut self, record: BoletoRecord) {
        match record.our_number.clone() {
            Some(our_number) if !self.by_our_number.contains_key(&our_number) => {
                self.by_our_number.insert(our_number, record);
            }
            Some(our_number) => {
                warn!(%our_number, id = record.id, "Duplicate our number, record not indexed");
                self.unnumbered.push(record);
            }
            None => self.unnumbered.push(record),
        }
    }

    pub fn get(&self, our_number: &str) -> Option<&BoletoRecord> {
        self.by_our_number.get(our_number)
    }

    pub fn len(&self) -> usize {
        self.by_our_number.len() + self.unnumbered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every record, sorted by id for deterministic output
    pub fn into_records(self) -> Vec<BoletoRecord> {
        let mut records: Vec<BoletoRecord> = self
            .by_our_number
            .into_values()
            .chain(self.unnumbered)
            .collect();
        records.sort_by_key(|record| record.id);
        records
    }
}

impl BoletoRepository for BoletoStore {
    fn update<F, T>(&mut self, our_number: &str, f: F) -> Result<T, BoletoError>
    where
        F: FnOnce(&mut BoletoRecord) -> Result<T, BoletoError>,
    {
        let record = self
            .by_our_number
            .get_mut(our_number)
            .ok_or_else(|| BoletoError::unknown_boleto(our_number))?;
        f(record)
    }

    fn our_numbers(&self) -> Vec<String> {
        let mut numbers: Vec<String> = self.by_our_number.keys().cloned().collect();
        numbers.sort();
        numbers
    }
}
