//! Override resolution: what a gabarito row actually changes for one line.
//!
//! Each function consults at most one row (the table's first match for
//! the NCM) and returns `None` both when no row matches and when the row
//! carries nothing usable, so callers fall straight through to defaults.

use crate::core::cst;
use crate::gabarito::table::GabaritoTable;
use rust_decimal::Decimal;

/// ICMS expectations taken from a gabarito row.
#[derive(Debug, Clone, PartialEq)]
pub struct IcmsOverride {
    pub cst: Option<String>,
    pub rate: Option<Decimal>,
}

/// Resolve the ICMS override for one line.
///
/// `interstate` selects the interstate rate column when the table has
/// one, falling back to the general rate column otherwise.
///
/// Safety rule: when the line already declares the substitution CST and
/// stronger signals (`st_supported`: substitution-family CFOP or
/// purchase-side evidence) back it up, a row that does not itself declare
/// substitution is discarded — the gabarito may tighten expectations but
/// must never downgrade away from substitution.
pub fn icms_override(
    table: &GabaritoTable,
    ncm_normalized: &str,
    interstate: bool,
    declared_cst: &str,
    st_supported: bool,
) -> Option<IcmsOverride> {
    let row = table.lookup(ncm_normalized)?;

    let row_declares_st = row.cst.as_deref().map(str::trim) == Some(cst::ICMS_SUBSTITUICAO);
    if declared_cst.trim() == cst::ICMS_SUBSTITUICAO && !row_declares_st && st_supported {
        return None;
    }

    let rate = if interstate { row.rate_interstate.or(row.rate) } else { row.rate };
    if row.cst.is_none() && rate.is_none() {
        return None;
    }
    Some(IcmsOverride { cst: row.cst.clone(), rate })
}

/// IPI expectations taken from a gabarito row.
#[derive(Debug, Clone, PartialEq)]
pub struct IpiOverride {
    pub cst: Option<String>,
    pub rate: Option<Decimal>,
}

pub fn ipi_override(table: &GabaritoTable, ncm_normalized: &str) -> Option<IpiOverride> {
    let row = table.lookup(ncm_normalized)?;
    if row.cst.is_none() && row.rate.is_none() {
        return None;
    }
    Some(IpiOverride { cst: row.cst.clone(), rate: row.rate })
}

/// PIS/COFINS expectations taken from a gabarito row. Used for regime
/// exceptions such as mono-phase products.
#[derive(Debug, Clone, PartialEq)]
pub struct PisCofinsOverride {
    pub cst: Option<String>,
    pub pis_rate: Option<Decimal>,
    pub cofins_rate: Option<Decimal>,
}

pub fn pis_cofins_override(
    table: &GabaritoTable,
    ncm_normalized: &str,
) -> Option<PisCofinsOverride> {
    let row = table.lookup(ncm_normalized)?;
    if row.cst.is_none() && row.pis_rate.is_none() && row.cofins_rate.is_none() {
        return None;
    }
    Some(PisCofinsOverride {
        cst: row.cst.clone(),
        pis_rate: row.pis_rate,
        cofins_rate: row.cofins_rate,
    })
}
