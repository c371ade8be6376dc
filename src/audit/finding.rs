//! Shared diagnostic vocabulary for all per-tax audits.

use crate::core::round2;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of one check on one line.
///
/// `NaoAvaliado` is deliberately distinct from `Ok`: when reference data
/// is missing the check did not happen, and that must never read as
/// compliance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    Ok,
    Divergente,
    NaoDeclarado,
    DeclaracaoIndevida,
    NaoAplicavel,
    NaoAvaliado,
}

impl Status {
    /// Cell text used in report sheets.
    pub fn label(&self) -> &'static str {
        match self {
            Status::Ok => "OK",
            Status::Divergente => "DIVERGENTE",
            Status::NaoDeclarado => "NÃO DECLARADO",
            Status::DeclaracaoIndevida => "DECLARAÇÃO INDEVIDA",
            Status::NaoAplicavel => "NÃO APLICÁVEL",
            Status::NaoAvaliado => "NÃO AVALIADO",
        }
    }

    /// Whether the check found nothing owed (compliant or out of scope).
    pub fn is_compliant(&self) -> bool {
        matches!(self, Status::Ok | Status::NaoAplicavel)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A status plus the sentence justifying it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub status: Status,
    pub message: String,
}

impl Verdict {
    pub fn new(status: Status, message: impl Into<String>) -> Self {
        Verdict { status, message: message.into() }
    }

    pub fn ok() -> Self {
        Verdict { status: Status::Ok, message: "OK".to_string() }
    }
}

/// Recommended corrective action. Closed set; one per finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    Nenhuma,
    RecolherComplemento,
    RevisarCadastro,
    SolicitarRessarcimento,
}

impl Action {
    pub fn label(&self) -> &'static str {
        match self {
            Action::Nenhuma => "Nenhuma",
            Action::RecolherComplemento => "Recolher complemento",
            Action::RevisarCadastro => "Revisar cadastro",
            Action::SolicitarRessarcimento => "Solicitar ressarcimento",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Which rule produced the expectation a line was audited against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RuleSource {
    /// CFOP in the substitution-by-law set.
    StPorCfop,
    /// NCM seen entering under substitution.
    StPorEvidencia,
    /// Customer gabarito row.
    Gabarito,
    /// Federal interstate rate rule.
    Interestadual,
    /// General internal rate.
    RegraGeral,
    /// Hard-coded tax default.
    Padrao,
    /// PIS/COFINS regime configuration.
    Regime,
}

impl RuleSource {
    pub fn label(&self) -> &'static str {
        match self {
            RuleSource::StPorCfop => "ST por CFOP",
            RuleSource::StPorEvidencia => "ST por evidência de compra",
            RuleSource::Gabarito => "Gabarito",
            RuleSource::Interestadual => "Regra interestadual",
            RuleSource::RegraGeral => "Regra geral",
            RuleSource::Padrao => "Padrão",
            RuleSource::Regime => "Regime",
        }
    }
}

impl fmt::Display for RuleSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Complementary amount owed: `max(0, round2(expected − declared))`.
/// Never negative, for every tax type.
pub fn complementary(expected: Decimal, declared: Decimal) -> Decimal {
    round2(expected - declared).max(Decimal::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn complementary_is_never_negative() {
        assert_eq!(complementary(dec!(100.00), dec!(0)), dec!(100.00));
        assert_eq!(complementary(dec!(100.00), dec!(99.50)), dec!(0.50));
        assert_eq!(complementary(dec!(100.00), dec!(120.00)), dec!(0));
        assert_eq!(complementary(dec!(0), dec!(0)), dec!(0));
    }

    #[test]
    fn complementary_rounds_the_difference() {
        assert_eq!(complementary(dec!(10.005), dec!(0)), dec!(10.01));
        assert_eq!(complementary(dec!(10.004), dec!(10)), dec!(0.00));
    }

    #[test]
    fn status_compliance() {
        assert!(Status::Ok.is_compliant());
        assert!(Status::NaoAplicavel.is_compliant());
        assert!(!Status::Divergente.is_compliant());
        assert!(!Status::NaoDeclarado.is_compliant());
        assert!(!Status::NaoAvaliado.is_compliant());
    }

    #[test]
    fn labels_are_report_ready() {
        assert_eq!(Status::NaoDeclarado.label(), "NÃO DECLARADO");
        assert_eq!(Action::RecolherComplemento.label(), "Recolher complemento");
        assert_eq!(RuleSource::StPorCfop.label(), "ST por CFOP");
    }
}
