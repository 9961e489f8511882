//! Input validation helpers
//!
//! Custom format checks used by the `validator` derive on payloads, plus the
//! derived-login length limit shared with the identity resolver.

use validator::ValidationError;

/// Derived logins
pub const MAX_LOGIN_LEN: usize = 50;

// ── Custom format checks (validator derive) ─────────────────────────

/// CNPJ in the externally formatted shape `XX.XXX.XXX/XXXX-XX`.
pub fn validate_cnpj_format(value: &str) -> Result<(), ValidationError> {
    let bytes = value.as_bytes();
    let expected_punct = [(2, b'.'), (6, b'.'), (10, b'/'), (15, b'-')];
    let well_formed = bytes.len() == 18
        && bytes.iter().enumerate().all(|(i, b)| {
            match expected_punct.iter().find(|(pos, _)| *pos == i) {
                Some((_, punct)) => b == punct,
                None => b.is_ascii_digit(),
            }
        });
    if well_formed {
        Ok(())
    } else {
        Err(ValidationError::new("cnpj_format")
            .with_message("CNPJ must use the format XX.XXX.XXX/XXXX-XX".into()))
    }
}

/// Brazilian phone in `(XX) XXXXX-XXXX` or `(XX) XXXX-XXXX` form.
pub fn validate_phone_format(value: &str) -> Result<(), ValidationError> {
    let ok = matches!(value.len(), 14 | 15) && phone_shape_ok(value);
    if ok {
        Ok(())
    } else {
        Err(ValidationError::new("phone_format")
            .with_message("Phone must use the format (XX) XXXXX-XXXX".into()))
    }
}

fn phone_shape_ok(value: &str) -> bool {
    let bytes = value.as_bytes();
    // "(XX) " prefix, then 4 or 5 digits, '-', 4 digits
    if bytes.len() < 5 || bytes[0] != b'(' || bytes[3] != b')' || bytes[4] != b' ' {
        return false;
    }
    if !bytes[1].is_ascii_digit() || !bytes[2].is_ascii_digit() {
        return false;
    }
    let rest = &bytes[5..];
    let dash = match rest.len() {
        10 => 5, // XXXXX-XXXX
        9 => 4,  // XXXX-XXXX
        _ => return false,
    };
    rest.iter().enumerate().all(|(i, b)| {
        if i == dash {
            *b == b'-'
        } else {
            b.is_ascii_digit()
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cnpj_format_accepts_well_formed() {
        assert!(validate_cnpj_format("12.345.678/0001-95").is_ok());
    }

    #[test]
    fn cnpj_format_rejects_bare_digits() {
        assert!(validate_cnpj_format("12345678000195").is_err());
        assert!(validate_cnpj_format("12.345.678/0001-9X").is_err());
    }

    #[test]
    fn phone_format_accepts_both_lengths() {
        assert!(validate_phone_format("(11) 91234-5678").is_ok());
        assert!(validate_phone_format("(11) 1234-5678").is_ok());
    }

    #[test]
    fn phone_format_rejects_malformed() {
        assert!(validate_phone_format("11 91234-5678").is_err());
        assert!(validate_phone_format("(11)91234-5678").is_err());
        assert!(validate_phone_format("(11) 91234-567").is_err());
    }
}
