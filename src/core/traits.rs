//! Repository abstraction used by reconciliation
//!
//! The engine never owns storage. It reaches persisted boletos through
//! [`BoletoRepository`], whose `update` is the per-record exclusive scope:
//! lookup, transition and write-back of one boleto happen inside a single
//! call, so two runs touching the same our-number cannot interleave.

use std::collections::HashMap;

use crate::types::{BoletoError, BoletoRecord};

/// Access to persisted boletos keyed by our-number
pub trait BoletoRepository {
    /// Run `f` with exclusive access to the boleto identified by `our_number`
    ///
    /// Changes made by `f` are persisted when it returns. Implementations
    /// return [`BoletoError::UnknownBoleto`] when no such boleto exists.
    fn update<F, T>(&mut self, our_number: &str, f: F) -> Result<T, BoletoError>
    where
        F: FnOnce(&mut BoletoRecord) -> Result<T, BoletoError>;

    /// Our-numbers of every boleto that can be reconciled
    fn our_numbers(&self) -> Vec<String>;
}

/// Repository view over a plain lookup callback
///
/// Boletos fetched through the callback are kept in an overlay for the rest
/// of the run, so a second event for the same our-number sees the state left
/// by the first one. The overlay's contents are the run's write-back set.
pub struct LookupOverlay<L> {
    lookup: L,
    touched: HashMap<String, BoletoRecord>,
}

impl<L> LookupOverlay<L>
where
    L: FnMut(&str) -> Option<BoletoRecord>,
{
    pub fn new(lookup: L) -> Self {
        LookupOverlay {
            lookup,
            touched: HashMap::new(),
        }
    }

    /// Records looked up during the run, in their latest state
    pub fn into_touched(self) -> HashMap<String, BoletoRecord> {
        self.touched
    }
}

impl<L> BoletoRepository for LookupOverlay<L>
where
    L: FnMut(&str) -> Option<BoletoRecord>,
{
    fn update<F, T>(&mut self, our_number: &str, f: F) -> Result<T, BoletoError>
    where
        F: FnOnce(&mut BoletoRecord) -> Result<T, BoletoError>,
    {
        if !self.touched.contains_key(our_number) {
            let record =
                (self.lookup)(our_number).ok_or_else(|| BoletoError::unknown_boleto(our_number))?;
            self.touched.insert(our_number.to_string(), record);
        }
        match self.touched.get_mut(our_number) {
            Some(record) => f(record),
            None => Err(BoletoError::unknown_boleto(our_number)),
        }
    }

    fn our_numbers(&self) -> Vec<String> {
        self.touched.keys().cloned().collect()
    }
}
