//! CFOP (Código Fiscal de Operações e Prestações) classification.
//!
//! The first digit of the 4-digit code determines the movement direction;
//! a small fixed set of codes marks operations that are tax-substitution
//! by force of law regardless of any declared CST.

use serde::{Deserialize, Serialize};

/// Direction of a goods movement, derived from the CFOP's first digit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Movement {
    /// First digit 1, 2 or 3: goods entering the company.
    Entrada,
    /// First digit 5, 6 or 7: goods leaving the company.
    Saida,
    /// Any other leading digit; excluded from state aggregation.
    Outra,
}

/// CFOP codes that denote tax substitution by law. Sorted for binary search.
pub const ST_BY_LAW_CFOPS: &[&str] = &["1403", "2403", "5405", "6404"];

/// Classify a CFOP by its first digit.
pub fn movement(cfop: &str) -> Movement {
    match cfop.trim().chars().next() {
        Some('1') | Some('2') | Some('3') => Movement::Entrada,
        Some('5') | Some('6') | Some('7') => Movement::Saida,
        _ => Movement::Outra,
    }
}

/// Whether the CFOP places the operation under tax substitution by law.
pub fn is_st_by_law(cfop: &str) -> bool {
    ST_BY_LAW_CFOPS.binary_search(&cfop.trim()).is_ok()
}

/// Whether the CFOP belongs to the broader substitution family (digits
/// two and three are "40", e.g. 5401, 6403). Weaker than the by-law set:
/// it never forces the substitution expectation on its own, but it does
/// block an override table from downgrading a declared substitution CST.
pub fn is_st_family(cfop: &str) -> bool {
    let code = cfop.trim();
    let mut chars = code.chars();
    code.len() == 4 && chars.nth(1) == Some('4') && chars.next() == Some('0')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn st_table_is_sorted() {
        for window in ST_BY_LAW_CFOPS.windows(2) {
            assert!(window[0] < window[1], "table not sorted at {:?}", window);
        }
    }

    #[test]
    fn entry_codes() {
        assert_eq!(movement("1102"), Movement::Entrada);
        assert_eq!(movement("2403"), Movement::Entrada);
        assert_eq!(movement("3102"), Movement::Entrada);
    }

    #[test]
    fn exit_codes() {
        assert_eq!(movement("5405"), Movement::Saida);
        assert_eq!(movement("6108"), Movement::Saida);
        assert_eq!(movement("7102"), Movement::Saida);
    }

    #[test]
    fn other_codes_excluded() {
        assert_eq!(movement("4102"), Movement::Outra);
        assert_eq!(movement(""), Movement::Outra);
        assert_eq!(movement("9"), Movement::Outra);
    }

    #[test]
    fn st_by_law_membership() {
        assert!(is_st_by_law("5405"));
        assert!(is_st_by_law("1403"));
        assert!(is_st_by_law(" 6404 "));
        assert!(!is_st_by_law("5102"));
        assert!(!is_st_by_law(""));
    }

    #[test]
    fn st_family_is_wider_than_by_law() {
        assert!(is_st_family("5401"));
        assert!(is_st_family("6403"));
        assert!(is_st_family("5405"));
        assert!(!is_st_family("5102"));
        assert!(!is_st_family("540"));
        assert!(!is_st_family("54011"));
    }
}
