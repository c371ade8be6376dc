//! CST (Código de Situação Tributária) reference values.

/// ICMS CST for goods whose tax was withheld earlier under substitution.
pub const ICMS_SUBSTITUICAO: &str = "60";

/// ICMS CST flagging a legally reduced tax base.
pub const ICMS_REDUCAO_BASE: &str = "20";

/// ICMS CSTs whose base was fully or partly settled under substitution.
/// Sorted for binary search.
pub const ICMS_SUBSTITUICAO_FAMILIA: &[&str] = &["10", "30", "60", "70"];

/// Whether an ICMS CST belongs to the substitution family.
pub fn is_icms_substitution(cst: &str) -> bool {
    ICMS_SUBSTITUICAO_FAMILIA.binary_search(&cst.trim()).is_ok()
}

/// Default expected IPI CST: taxed exit.
pub const IPI_SAIDA_TRIBUTADA: &str = "50";

/// IPI CSTs denoting exemption or non-incidence on exit. Sorted.
pub const IPI_EXONERADO: &[&str] = &["52", "53", "54", "55"];

/// Whether an IPI CST denotes an exonerated exit.
pub fn is_ipi_exonerado(cst: &str) -> bool {
    IPI_EXONERADO.binary_search(&cst.trim()).is_ok()
}

/// Default expected PIS/COFINS CST: taxable operation at the basic rate.
pub const PIS_COFINS_TRIBUTAVEL: &str = "01";

/// PIS/COFINS CSTs denoting zero-rated, exempt or suspended exits.
/// Sorted for binary search.
pub const PIS_COFINS_EXONERADO: &[&str] = &["04", "05", "06", "07", "08", "09"];

/// Whether a PIS/COFINS CST denotes an exonerated operation.
pub fn is_pis_cofins_exonerado(cst: &str) -> bool {
    PIS_COFINS_EXONERADO.binary_search(&cst.trim()).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tables_are_sorted() {
        for window in ICMS_SUBSTITUICAO_FAMILIA.windows(2) {
            assert!(window[0] < window[1]);
        }
        for window in IPI_EXONERADO.windows(2) {
            assert!(window[0] < window[1]);
        }
        for window in PIS_COFINS_EXONERADO.windows(2) {
            assert!(window[0] < window[1]);
        }
    }

    #[test]
    fn substitution_family() {
        assert!(is_icms_substitution("60"));
        assert!(is_icms_substitution("10"));
        assert!(is_icms_substitution(" 70 "));
        assert!(!is_icms_substitution("00"));
        assert!(!is_icms_substitution("20"));
    }

    #[test]
    fn ipi_exoneration() {
        assert!(is_ipi_exonerado("52"));
        assert!(is_ipi_exonerado("55"));
        assert!(!is_ipi_exonerado("50"));
        assert!(!is_ipi_exonerado("99"));
    }
}
