//! Identity Resolver
//!
//! Derives the sign-in identity of an employee from the creation payload:
//!
//! - login = `lower(first name token) + "." + lower(last name token)`
//! - initial password = the digits-only form of the CPF (hashed before storage)
//!
//! Names with fewer than two tokens are rejected; a single-token name would
//! derive a login with a dangling separator ("ana."), which is never valid.
//!
//! Login and CPF are unique globally, across all companies. The uniqueness
//! constraint itself is enforced transactionally by the employee repository
//! through the `login_index` / `cpf_index` tables.

pub mod national_id;

pub use national_id::is_valid_cpf;

use crate::utils::validation::MAX_LOGIN_LEN;

/// Identity derivation failure, always a validation-level error
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("{0}")]
    InvalidName(String),

    #[error("{0}")]
    InvalidNationalId(String),
}

impl From<IdentityError> for crate::utils::AppError {
    fn from(e: IdentityError) -> Self {
        crate::utils::AppError::Validation(e.to_string())
    }
}

impl From<IdentityError> for crate::db::repository::RepoError {
    fn from(e: IdentityError) -> Self {
        crate::db::repository::RepoError::Validation(e.to_string())
    }
}

/// Derive the login handle from a full name.
///
/// The name is trimmed and split on whitespace; the handle is
/// `lower(first) + "." + lower(last)`.
pub fn derive_login(full_name: &str) -> Result<String, IdentityError> {
    let tokens: Vec<&str> = full_name.split_whitespace().collect();
    if tokens.len() < 2 {
        return Err(IdentityError::InvalidName(
            "Full name must contain at least a first and a last name".to_string(),
        ));
    }

    let first = tokens.first().unwrap_or(&"").to_lowercase();
    let last = tokens.last().unwrap_or(&"").to_lowercase();
    let login = format!("{}.{}", first, last);

    if login.len() > MAX_LOGIN_LEN {
        return Err(IdentityError::InvalidName(format!(
            "Derived login is too long ({} chars, max {})",
            login.len(),
            MAX_LOGIN_LEN
        )));
    }

    Ok(login)
}

/// Validate a CPF and return its canonical digits-only form.
///
/// The returned string is what gets stored on the employee document and what
/// seeds the initial password.
pub fn normalize_cpf(cpf: &str) -> Result<String, IdentityError> {
    let digits: String = cpf.chars().filter(|c| c.is_ascii_digit()).collect();
    if !is_valid_cpf(&digits) {
        return Err(IdentityError::InvalidNationalId(format!(
            "CPF '{}' is not valid",
            cpf
        )));
    }
    Ok(digits)
}

/// The initial plaintext password for a new employee: the digits-only CPF.
/// Callers must hash it before persisting anything.
pub fn initial_password(normalized_cpf: &str) -> String {
    normalized_cpf.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_is_first_dot_last_lowercased() {
        assert_eq!(derive_login("Ana Silva Santos").unwrap(), "ana.santos");
        assert_eq!(derive_login("  João  da Costa  ").unwrap(), "joão.costa");
    }

    #[test]
    fn single_token_name_is_rejected() {
        assert!(derive_login("Ana").is_err());
        assert!(derive_login("   ").is_err());
        assert!(derive_login("").is_err());
    }

    #[test]
    fn normalize_cpf_strips_formatting() {
        assert_eq!(normalize_cpf("529.982.247-25").unwrap(), "52998224725");
        assert_eq!(normalize_cpf("52998224725").unwrap(), "52998224725");
    }

    #[test]
    fn normalize_cpf_rejects_bad_check_digits() {
        assert!(normalize_cpf("529.982.247-26").is_err());
        assert!(normalize_cpf("123").is_err());
    }
}
