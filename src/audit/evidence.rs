//! Purchase-side substitution evidence.
//!
//! An NCM that entered the company under tax substitution (substitution
//! CFOP or substitution-family CST on an entry line) is expected to leave
//! under substitution too. The set is built once per run from the entry
//! lines and consulted by the ICMS audit's cross-check rule.

use crate::core::cfop::{self, Movement};
use crate::core::{cst, ncm, InvoiceLine};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// NCMs known to have been purchased under tax substitution.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StEvidence {
    ncms: BTreeSet<String>,
}

impl StEvidence {
    pub fn empty() -> Self {
        StEvidence::default()
    }

    /// Collect evidence from entry lines. Exit lines and lines whose NCM
    /// carries no digits are ignored; status is not consulted — a
    /// purchase under substitution is evidence even on an odd document.
    pub fn from_entries<'a>(lines: impl IntoIterator<Item = &'a InvoiceLine>) -> Self {
        let mut ncms = BTreeSet::new();
        for line in lines {
            if line.movement() != Movement::Entrada {
                continue;
            }
            if !ncm::has_digits(&line.ncm) {
                continue;
            }
            if cfop::is_st_by_law(&line.cfop) || cst::is_icms_substitution(&line.icms.cst) {
                ncms.insert(line.ncm_normalized());
            }
        }
        StEvidence { ncms }
    }

    pub fn contains(&self, ncm_normalized: &str) -> bool {
        self.ncms.contains(ncm_normalized)
    }

    pub fn len(&self) -> usize {
        self.ncms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ncms.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{TaxFields, Uf};
    use rust_decimal_macros::dec;

    fn entry(cfop: &str, ncm: &str, icms_cst: &str) -> InvoiceLine {
        InvoiceLine::new("100", 1, Uf::Mg, Uf::Sp, cfop)
            .with_ncm(ncm)
            .with_icms(TaxFields::new(icms_cst, dec!(0), dec!(0), dec!(0)))
    }

    #[test]
    fn collects_st_cfop_entries() {
        let lines = vec![entry("1403", "8471.30.12", "00")];
        let evidence = StEvidence::from_entries(&lines);
        assert!(evidence.contains("84713012"));
    }

    #[test]
    fn collects_substitution_cst_entries() {
        let lines = vec![entry("1102", "850", "60")];
        let evidence = StEvidence::from_entries(&lines);
        assert!(evidence.contains("00000850"));
        assert_eq!(evidence.len(), 1);
    }

    #[test]
    fn ignores_plain_entries_and_exits() {
        let mut exit_st = entry("5405", "1234", "60");
        exit_st.cfop = "5405".to_string();
        let lines = vec![entry("1102", "850", "00"), exit_st];
        let evidence = StEvidence::from_entries(&lines);
        assert!(evidence.is_empty());
    }

    #[test]
    fn ignores_ncm_without_digits() {
        let lines = vec![entry("1403", "", "60")];
        let evidence = StEvidence::from_entries(&lines);
        assert!(evidence.is_empty());
    }
}
