//! Beneficiary (cedente) profile supplied with every remittance batch

use serde::Deserialize;

/// Bank relationship of the company collecting the boletos
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BeneficiaryProfile {
    /// Three-digit FEBRABAN bank code
    pub bank_code: u16,
    /// Bank name printed in the file header
    #[serde(default)]
    pub bank_name: String,
    pub agency: u32,
    pub account: u64,
    /// Account check digit
    #[serde(default)]
    pub account_digit: String,
    /// Wallet (carteira) code
    pub wallet: u8,
    /// Beneficiary CPF or CNPJ, punctuation allowed
    pub tax_id: String,
    pub name: String,
}
