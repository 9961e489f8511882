//! CPF check-digit validation
//!
//! A CPF is 11 digits; the last two are check digits computed mod 11 over the
//! preceding digits. Sequences of a single repeated digit pass the arithmetic
//! but are not assignable, so they are rejected explicitly.

/// Validate a digits-only CPF string.
///
/// Expects formatting to be stripped already; any non-digit or a length other
/// than 11 fails.
pub fn is_valid_cpf(digits: &str) -> bool {
    if digits.len() != 11 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return false;
    }

    let d: Vec<u32> = digits.chars().filter_map(|c| c.to_digit(10)).collect();

    // Repeated-digit sequences like 111.111.111-11 are not valid CPFs
    if d.iter().all(|&x| x == d[0]) {
        return false;
    }

    check_digit(&d[..9], 10) == d[9] && check_digit(&d[..10], 11) == d[10]
}

/// Mod-11 check digit: weights descend from `start_weight` to 2.
fn check_digit(digits: &[u32], start_weight: u32) -> u32 {
    let sum: u32 = digits
        .iter()
        .enumerate()
        .map(|(i, &d)| d * (start_weight - i as u32))
        .sum();
    match sum % 11 {
        0 | 1 => 0,
        r => 11 - r,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_known_valid_cpfs() {
        assert!(is_valid_cpf("52998224725"));
        assert!(is_valid_cpf("11144477735"));
    }

    #[test]
    fn rejects_wrong_check_digits() {
        assert!(!is_valid_cpf("52998224726"));
        assert!(!is_valid_cpf("52998224735"));
    }

    #[test]
    fn rejects_repeated_digit_sequences() {
        assert!(!is_valid_cpf("00000000000"));
        assert!(!is_valid_cpf("11111111111"));
        assert!(!is_valid_cpf("99999999999"));
    }

    #[test]
    fn rejects_wrong_length_and_non_digits() {
        assert!(!is_valid_cpf(""));
        assert!(!is_valid_cpf("5299822472"));
        assert!(!is_valid_cpf("529982247255"));
        assert!(!is_valid_cpf("529.982.247-25"));
    }
}
