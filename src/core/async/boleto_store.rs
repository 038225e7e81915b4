//! Thread-safe boleto store for concurrent reconciliation
//!
//! `SharedBoletoStore` keeps boletos in a `DashMap` keyed by our-number. The
//! `RefMut` guard returned by `get_mut` is held for the whole
//! lookup-transition-writeback of one event, which makes it the per-record
//! lock: two tasks touching the same boleto are serialized, tasks touching
//! different boletos are not.

use dashmap::DashMap;
use tracing::warn;

use crate::core::traits::BoletoRepository;
use crate::types::{BoletoError, BoletoRecord};

/// Concurrent boleto store
#[derive(Debug, Default)]
pub struct SharedBoletoStore {
    by_our_number: DashMap<String, BoletoRecord>,
    /// Records without an our-number (or with a duplicate one), carried through untouched
    unnumbered: Vec<BoletoRecord>,
}

impl SharedBoletoStore {
    pub fn new() -> Self {
        Self {
            by_our_number: DashMap::new(),
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
        let Some(our_number) = record.our_number.clone() else {
            self.unnumbered.push(record);
            return;
        };
        if self.by_our_number.contains_key(&our_number) {
            warn!(%our_number, id = record.id, "Duplicate our number, record not indexed");
            self.unnumbered.push(record);
        } else {
            self.by_our_number.insert(our_number, record);
        }
    }

    /// Get a copy of a boleto (read-only)
    pub fn get(&self, our_number: &str) -> Option<BoletoRecord> {
        self.by_our_number
            .get(our_number)
            .map(|entry| entry.value().clone())
    }

    /// Run `f` while holding the entry lock for `our_number`
    pub fn update<F, T>(&self, our_number: &str, f: F) -> Result<T, BoletoError>
    where
        F: FnOnce(&mut BoletoRecord) -> Result<T, BoletoError>,
    {
        match self.by_our_number.get_mut(our_number) {
            Some(mut entry) => f(entry.value_mut()),
            None => Err(BoletoError::unknown_boleto(our_number)),
        }
    }

    pub fn len(&self) -> usize {
        self.by_our_number.len() + self.unnumbered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of every record, sorted by id
    pub fn get_all_records(&self) -> Vec<BoletoRecord> {
        let mut records: Vec<BoletoRecord> = self
            .by_our_number
            .iter()
            .map(|entry| entry.value().clone())
            .chain(self.unnumbered.iter().cloned())
            .collect();
        records.sort_by_key(|record| record.id);
        records
    }
}

impl BoletoRepository for SharedBoletoStore {
    fn update<F, T>(&mut self, our_number: &str, f: F) -> Result<T, BoletoError>
    where
        F: FnOnce(&mut BoletoRecord) -> Result<T, BoletoError>,
    {
        SharedBoletoStore::update(self, our_number, f)
    }

    fn our_numbers(&self) -> Vec<String> {
        let mut numbers: Vec<String> = self
            .by_our_number
            .iter()
            .map(|entry| entry.key().clone())
            .collect();
        numbers.sort();
        numbers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BoletoStatus, Payer};
    use std::sync::Arc;
    use std::thread;

    fn record(id: u64, our_number: Option<&str>) -> BoletoRecord {
        BoletoRecord {
            id,
            our_number: our_number.map(str::to_string),
            document_number: format!("DOC{}", id),
            client_id: 1,
            contract_id: 1,
            installment: 1,
            face_value: None,
            due_date: None,
            payer: Payer::default(),
            status: BoletoStatus::Issued,
        }
    }

    #[test]
    fn test_duplicate_and_unnumbered_are_kept() {
        let store = SharedBoletoStore::from_records(vec![
            record(1, Some("A1")),
            record(2, Some("A1")),
            record(3, None),
        ]);
        assert_eq!(store.get("A1").unwrap().id, 1);
        assert_eq!(store.len(), 3);
        let ids: Vec<u64> = store.get_all_records().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_update_unknown_boleto() {
        let store = SharedBoletoStore::new();
        let result = store.update("ZZ", |_| Ok(()));
        assert_eq!(result.unwrap_err(), BoletoError::unknown_boleto("ZZ"));
    }

    #[test]
    fn test_concurrent_updates_to_same_record_are_serialized() {
        let store = Arc::new(SharedBoletoStore::from_records(vec![record(0, Some("A1"))]));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    for _ in 0..100 {
                        store
                            .update("A1", |record| {
                                record.installment += 1;
                                Ok(())
                            })
                            .unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(store.get("A1").unwrap().installment, 801);
    }
}
