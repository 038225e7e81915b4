//! Beneficiary profile loading
//!
//! The profile is a small TOML file:
//!
//! ```toml
//! bank_code = 341
//! bank_name = "BANCO EXEMPLO"
//! agency = 1234
//! account = 56789
//! account_digit = "0"
//! wallet = 9
//! tax_id = "12.345.678/0001-90"
//! name = "Exemplo Cobrancas Ltda"
//! ```

use std::fs;
use std::path::Path;

use crate::io::files::not_found_or_io;
use crate::types::{BeneficiaryProfile, BoletoError};

/// Parse and validate a profile from TOML text
pub fn parse_profile(content: &str) -> Result<BeneficiaryProfile, BoletoError> {
    let profile: BeneficiaryProfile = toml::from_str(content)?;
    validate_profile(&profile)?;
    Ok(profile)
}

/// Load the beneficiary profile from a TOML file
pub fn load_profile(path: &Path) -> Result<BeneficiaryProfile, BoletoError> {
    let content = fs::read_to_string(path).map_err(|e| not_found_or_io(path, e))?;

    parse_profile(&content)
}

fn config_error(message: &str) -> BoletoError {
    BoletoError::ConfigError {
        message: message.to_string(),
    }
}

fn validate_profile(profile: &BeneficiaryProfile) -> Result<(), BoletoError> {
    if profile.bank_code == 0 || profile.bank_code > 999 {
        return Err(config_error("bank_code must be a three-digit code"));
    }
    if !profile.tax_id.chars().any(|c| c.is_ascii_digit()) {
        return Err(config_error("tax_id must contain digits"));
    }
    if profile.name.trim().is_empty() {
        return Err(config_error("name must not be empty"));
    }
    Ok(())
}
