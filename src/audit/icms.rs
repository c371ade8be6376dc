//! ICMS audit: expected rate/CST per line, mismatch diagnosis and the
//! complementary amount owed.
//!
//! Expectation precedence, first applicable rule wins:
//!
//! 1. CFOP in the substitution-by-law set ⇒ CST 60, rate 0.
//! 2. NCM purchased under substitution (entry-side evidence) ⇒ same.
//! 3. Gabarito row for the NCM ⇒ rate/CST from the row, taking the
//!    interstate rate column on interstate lines when present. A row
//!    that would downgrade a supported substitution is discarded
//!    ([`crate::gabarito::resolver::icms_override`]).
//! 4. Declared substitution CST backed by a substitution-family CFOP ⇒
//!    the declared substitution stands (the defaults below apply only
//!    when the classification is not already substitution-like).
//! 5. Interstate default: 4% imported content, 7% South/Southeast block
//!    to outside, else 12%.
//! 6. Same-state default: the 18% general rule.

use crate::audit::evidence::StEvidence;
use crate::audit::finding::{complementary, Action, RuleSource, Status, Verdict};
use crate::audit::RATE_TOLERANCE;
use crate::core::{cfop, cst, rates, round2, InvoiceLine};
use crate::gabarito::{resolver, GabaritoTable};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Tolerance when comparing the declared base against the product value.
pub const BASE_TOLERANCE: Decimal = dec!(0.10);

/// How the declared ICMS base relates to the product value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BaseClass {
    /// CST 20: base legally reduced.
    ReduzidaPorCst,
    /// Substitution-family CST: base settled upstream.
    Substituicao,
    /// Base within [`BASE_TOLERANCE`] of the product value.
    Integral,
    /// Base below the product value with no reducing CST.
    Reduzida,
}

impl BaseClass {
    pub fn label(&self) -> &'static str {
        match self {
            BaseClass::ReduzidaPorCst => "REDUZIDA POR CST",
            BaseClass::Substituicao => "SUBSTITUIÇÃO",
            BaseClass::Integral => "INTEGRAL",
            BaseClass::Reduzida => "REDUZIDA",
        }
    }
}

impl fmt::Display for BaseClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Full ICMS diagnostic for one line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IcmsFinding {
    /// Expected CST, when the applied rule prescribes one.
    pub expected_cst: Option<String>,
    pub expected_rate: Decimal,
    /// Which precedence rule set the expectation.
    pub source: RuleSource,
    pub rate_verdict: Verdict,
    pub cst_verdict: Verdict,
    pub base_class: BaseClass,
    /// `max(0, round2(base × expected_rate/100) − declared value)`.
    pub complement: Decimal,
    pub action: Action,
    /// One sentence naming the rule behind the expectation.
    pub note: String,
}

struct Expectation {
    cst: Option<String>,
    rate: Decimal,
    source: RuleSource,
    note: String,
}

fn expectation(
    line: &InvoiceLine,
    gabarito: Option<&GabaritoTable>,
    evidence: &StEvidence,
) -> Expectation {
    let ncm = line.ncm_normalized();
    let interstate = line.origin != line.dest;

    if cfop::is_st_by_law(&line.cfop) {
        return Expectation {
            cst: Some(cst::ICMS_SUBSTITUICAO.to_string()),
            rate: Decimal::ZERO,
            source: RuleSource::StPorCfop,
            note: format!("CFOP {} indica substituição tributária por lei", line.cfop.trim()),
        };
    }

    if evidence.contains(&ncm) {
        return Expectation {
            cst: Some(cst::ICMS_SUBSTITUICAO.to_string()),
            rate: Decimal::ZERO,
            source: RuleSource::StPorEvidencia,
            note: format!("NCM {ncm} adquirido com substituição tributária"),
        };
    }

    let st_supported = cfop::is_st_family(&line.cfop) || evidence.contains(&ncm);
    if let Some(found) = gabarito.and_then(|table| {
        resolver::icms_override(table, &ncm, interstate, &line.icms.cst, st_supported)
    }) {
        let rate = found.rate.unwrap_or_else(|| default_rate(line));
        return Expectation {
            cst: found.cst,
            rate,
            source: RuleSource::Gabarito,
            note: format!("Gabarito do cliente para o NCM {ncm}"),
        };
    }

    // The defaults only apply when the classification is not already
    // substitution-like: a declared CST 60 backed by a family CFOP stands.
    if line.icms.cst.trim() == cst::ICMS_SUBSTITUICAO && st_supported {
        return Expectation {
            cst: Some(cst::ICMS_SUBSTITUICAO.to_string()),
            rate: Decimal::ZERO,
            source: RuleSource::StPorCfop,
            note: format!(
                "CFOP {} da família ST mantém a substituição declarada",
                line.cfop.trim()
            ),
        };
    }

    if interstate {
        Expectation {
            cst: None,
            rate: rates::interstate_rate(line.origin, line.dest, line.origem),
            source: RuleSource::Interestadual,
            note: format!("Regra interestadual {} para {}", line.origin, line.dest),
        }
    } else {
        Expectation {
            cst: None,
            rate: rates::RATE_INTERNAL_GENERAL,
            source: RuleSource::RegraGeral,
            note: "Regra geral interna".to_string(),
        }
    }
}

/// Default rate had rules 5/6 applied, used when a gabarito row carries a
/// CST but no rate.
fn default_rate(line: &InvoiceLine) -> Decimal {
    if line.origin != line.dest {
        rates::interstate_rate(line.origin, line.dest, line.origem)
    } else {
        rates::RATE_INTERNAL_GENERAL
    }
}

fn classify_base(line: &InvoiceLine) -> BaseClass {
    let declared_cst = line.icms.cst.trim();
    if declared_cst == cst::ICMS_REDUCAO_BASE {
        BaseClass::ReduzidaPorCst
    } else if cst::is_icms_substitution(declared_cst) {
        BaseClass::Substituicao
    } else if (line.icms.base - line.product_value).abs() <= BASE_TOLERANCE {
        BaseClass::Integral
    } else {
        BaseClass::Reduzida
    }
}

/// Audit one line's ICMS declaration.
pub fn audit_line(
    line: &InvoiceLine,
    gabarito: Option<&GabaritoTable>,
    evidence: &StEvidence,
) -> IcmsFinding {
    let expected = expectation(line, gabarito, evidence);

    let declared_rate = line.icms.rate;
    let rate_verdict = if (expected.rate - declared_rate).abs() <= RATE_TOLERANCE {
        Verdict::ok()
    } else {
        Verdict::new(
            Status::Divergente,
            format!(
                "alíquota declarada {}% difere da esperada {}%",
                round2(declared_rate),
                round2(expected.rate)
            ),
        )
    };

    let declared_cst = line.icms.cst.trim();
    let cst_verdict = match expected.cst.as_deref() {
        Some(expected_cst) if expected_cst == declared_cst => Verdict::ok(),
        Some(expected_cst) => Verdict::new(
            Status::Divergente,
            format!("CST esperado {expected_cst}, declarado {declared_cst}"),
        ),
        None => Verdict::new(
            Status::NaoAvaliado,
            "sem CST esperado para a regra aplicada".to_string(),
        ),
    };

    let expected_value = round2(line.icms.base * expected.rate / dec!(100));
    let complement = complementary(expected_value, line.icms.value);

    let overpaid = round2(line.icms.value - expected_value) > Decimal::ZERO;
    let action = if complement > Decimal::ZERO {
        Action::RecolherComplemento
    } else if cst_verdict.status == Status::Divergente {
        Action::RevisarCadastro
    } else if rate_verdict.status == Status::Divergente && overpaid {
        Action::SolicitarRessarcimento
    } else {
        Action::Nenhuma
    };

    IcmsFinding {
        expected_cst: expected.cst,
        expected_rate: expected.rate,
        source: expected.source,
        rate_verdict,
        cst_verdict,
        base_class: classify_base(line),
        complement,
        action,
        note: expected.note,
    }
}
