//! ICMS rate reference data.
//!
//! Internal (intra-state) rates vary by UF and by year, so they live in an
//! injected [`RateTable`] value rather than in code paths. Interstate rates
//! follow the fixed federal rule (Resolução 22/1989 plus the 4% imported
//! rate of Resolução 13/2012) and are computed, not tabulated.

use crate::core::uf::Uf;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Interstate rate for goods with imported content (ORIGEM codes below).
pub const RATE_IMPORTED: Decimal = dec!(4.0);
/// Interstate rate from the South/Southeast block to states outside it.
pub const RATE_SOUTH_SOUTHEAST_OUT: Decimal = dec!(7.0);
/// General interstate rate.
pub const RATE_INTERSTATE_GENERAL: Decimal = dec!(12.0);
/// Fallback internal rate ("regra geral") when the table has no entry.
pub const RATE_INTERNAL_GENERAL: Decimal = dec!(18.0);

/// ORIGEM indicator codes that denote imported content, triggering the 4%
/// interstate rate. Sorted for binary search.
pub const IMPORTED_ORIGEM_CODES: &[u8] = &[1, 2, 3, 8];

/// Whether a product ORIGEM code denotes imported content.
pub fn is_imported_origem(origem: u8) -> bool {
    IMPORTED_ORIGEM_CODES.binary_search(&origem).is_ok()
}

/// Default interstate ICMS rate for a movement, per the federal rule:
///
/// 1. Imported-content ORIGEM ⇒ 4% regardless of the states involved.
/// 2. Origin in the South/Southeast block and destination outside it ⇒ 7%.
///    Espírito Santo counts as outside the block on the destination side.
/// 3. Everything else ⇒ 12%.
///
/// Only meaningful when `origin != dest`; same-state lines use the
/// destination's internal rate instead.
pub fn interstate_rate(origin: Uf, dest: Uf, origem: u8) -> Decimal {
    if is_imported_origem(origem) {
        RATE_IMPORTED
    } else if origin.is_south_southeast() && !dest.is_south_southeast() {
        RATE_SOUTH_SOUTHEAST_OUT
    } else {
        RATE_INTERSTATE_GENERAL
    }
}

/// Internal ICMS rates per UF for one reference year.
///
/// The table is plain data: deserialize one from configuration to audit a
/// different year without touching code. [`RateTable::brazil_2024`] ships
/// the 2024 modal rates (FECP surcharges embedded where the state collects
/// them together, e.g. RJ).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateTable {
    /// Human-readable label, surfaced in the report parameters sheet.
    pub label: String,
    internal: BTreeMap<Uf, Decimal>,
}

impl RateTable {
    /// Empty table with a label. Lines audited against a UF without an
    /// entry come out as "not evaluated" rather than silently compliant.
    pub fn empty(label: impl Into<String>) -> Self {
        RateTable { label: label.into(), internal: BTreeMap::new() }
    }

    /// Set or replace one UF's internal rate (builder style).
    pub fn with_internal_rate(mut self, uf: Uf, rate: Decimal) -> Self {
        self.internal.insert(uf, rate);
        self
    }

    /// Internal rate of a UF, if the table has one.
    pub fn internal_rate(&self, uf: Uf) -> Option<Decimal> {
        self.internal.get(&uf).copied()
    }

    /// Brazilian modal internal rates in force during 2024.
    pub fn brazil_2024() -> Self {
        let mut internal = BTreeMap::new();
        internal.insert(Uf::Ac, dec!(19.0));
        internal.insert(Uf::Al, dec!(19.0));
        internal.insert(Uf::Am, dec!(20.0));
        internal.insert(Uf::Ap, dec!(18.0));
        internal.insert(Uf::Ba, dec!(20.5));
        internal.insert(Uf::Ce, dec!(20.0));
        internal.insert(Uf::Df, dec!(20.0));
        internal.insert(Uf::Es, dec!(17.0));
        internal.insert(Uf::Go, dec!(19.0));
        internal.insert(Uf::Ma, dec!(22.0));
        internal.insert(Uf::Mg, dec!(18.0));
        internal.insert(Uf::Ms, dec!(17.0));
        internal.insert(Uf::Mt, dec!(17.0));
        internal.insert(Uf::Pa, dec!(19.0));
        internal.insert(Uf::Pb, dec!(20.0));
        internal.insert(Uf::Pe, dec!(20.5));
        internal.insert(Uf::Pi, dec!(21.0));
        internal.insert(Uf::Pr, dec!(19.5));
        internal.insert(Uf::Rj, dec!(22.0));
        internal.insert(Uf::Rn, dec!(18.0));
        internal.insert(Uf::Ro, dec!(19.5));
        internal.insert(Uf::Rr, dec!(20.0));
        internal.insert(Uf::Rs, dec!(17.0));
        internal.insert(Uf::Sc, dec!(17.0));
        internal.insert(Uf::Se, dec!(19.0));
        internal.insert(Uf::Sp, dec!(18.0));
        internal.insert(Uf::To, dec!(20.0));
        RateTable { label: "Brasil 2024".to_string(), internal }
    }
}

impl Default for RateTable {
    fn default() -> Self {
        RateTable::brazil_2024()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn imported_origem_table_is_sorted() {
        for window in IMPORTED_ORIGEM_CODES.windows(2) {
            assert!(window[0] < window[1]);
        }
    }

    #[test]
    fn brazil_2024_covers_all_states() {
        let table = RateTable::brazil_2024();
        for uf in Uf::ALL {
            assert!(table.internal_rate(uf).is_some(), "missing rate for {uf}");
        }
    }

    #[test]
    fn rj_embeds_fecp() {
        assert_eq!(RateTable::brazil_2024().internal_rate(Uf::Rj), Some(dec!(22.0)));
    }

    #[test]
    fn interstate_within_block_is_12() {
        assert_eq!(interstate_rate(Uf::Sp, Uf::Rj, 0), dec!(12.0));
        assert_eq!(interstate_rate(Uf::Mg, Uf::Rs, 0), dec!(12.0));
    }

    #[test]
    fn interstate_block_to_outside_is_7() {
        assert_eq!(interstate_rate(Uf::Sp, Uf::Ba, 0), dec!(7.0));
        // ES is a 7% destination despite its region
        assert_eq!(interstate_rate(Uf::Sp, Uf::Es, 0), dec!(7.0));
    }

    #[test]
    fn interstate_from_outside_is_12() {
        assert_eq!(interstate_rate(Uf::Ba, Uf::Sp, 0), dec!(12.0));
        assert_eq!(interstate_rate(Uf::Es, Uf::Sp, 0), dec!(12.0));
    }

    #[test]
    fn imported_content_is_4_everywhere() {
        assert_eq!(interstate_rate(Uf::Sp, Uf::Ba, 1), dec!(4.0));
        assert_eq!(interstate_rate(Uf::Ba, Uf::Sp, 2), dec!(4.0));
        assert_eq!(interstate_rate(Uf::Sp, Uf::Rj, 8), dec!(4.0));
    }

    #[test]
    fn empty_table_has_no_rates() {
        let table = RateTable::empty("vazio");
        assert_eq!(table.internal_rate(Uf::Sp), None);
        let table = table.with_internal_rate(Uf::Sp, dec!(18.0));
        assert_eq!(table.internal_rate(Uf::Sp), Some(dec!(18.0)));
    }
}
