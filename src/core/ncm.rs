//! NCM (Nomenclatura Comum do Mercosul) code normalization.
//!
//! NCM values arrive from invoice XML in inconsistent shapes: dotted
//! ("8471.30.12"), truncated ("84713"), padded with whitespace, or empty.
//! All comparisons inside the engine run on the canonical 8-digit form
//! produced by [`normalize`].

/// Canonical width of an NCM code.
pub const NCM_LEN: usize = 8;

/// Normalize a raw NCM string to its canonical 8-digit form.
///
/// Rules, applied in order:
/// 1. Drop every non-digit character (dots, dashes, spaces).
/// 2. Keep at most the leftmost 8 digits.
/// 3. Left-pad with zeros up to 8 digits.
///
/// An input with no digits at all normalizes to `"00000000"`.
pub fn normalize(raw: &str) -> String {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).take(NCM_LEN).collect();
    format!("{digits:0>8}")
}

/// Whether a raw NCM carries any digit payload at all. Lines without one
/// still participate in tax checks but are excluded from NCM evidence sets.
pub fn has_digits(raw: &str) -> bool {
    raw.chars().any(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_punctuation() {
        assert_eq!(normalize("8471.30.12"), "84713012");
        assert_eq!(normalize("8471-30-12"), "84713012");
        assert_eq!(normalize(" 84713012 "), "84713012");
    }

    #[test]
    fn pads_short_codes_on_the_left() {
        assert_eq!(normalize("84713"), "00084713");
        assert_eq!(normalize("1"), "00000001");
    }

    #[test]
    fn truncates_long_codes_keeping_leftmost() {
        assert_eq!(normalize("8471301299"), "84713012");
    }

    #[test]
    fn empty_becomes_all_zeros() {
        assert_eq!(normalize(""), "00000000");
        assert_eq!(normalize("abc"), "00000000");
    }

    #[test]
    fn normalization_is_idempotent() {
        let once = normalize("8471.30");
        assert_eq!(normalize(&once), once);
    }

    #[test]
    fn digit_presence() {
        assert!(has_digits("8471"));
        assert!(!has_digits(""));
        assert!(!has_digits("n/a"));
    }
}
