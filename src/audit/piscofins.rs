//! PIS/COFINS audit.
//!
//! Rates come from the configured regime, never inferred from the
//! documents; a gabarito row replaces them per NCM for regime exceptions
//! (mono-phase products, zero-rated baskets). Both contributions share
//! one expected CST and are otherwise audited independently, each with
//! the IPI pattern: rate tolerance, missing/undue declaration flags and
//! its own complementary amount. Base is the gross product value.

use crate::audit::finding::{complementary, Action, RuleSource, Status, Verdict};
use crate::audit::RATE_TOLERANCE;
use crate::core::{cst, round2, AuditConfig, InvoiceLine, TaxFields};
use crate::gabarito::{resolver, GabaritoTable};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Diagnostic for one contribution (PIS or COFINS) on one line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContributionFinding {
    pub expected_rate: Decimal,
    pub expected_value: Decimal,
    pub rate_verdict: Verdict,
    pub value_verdict: Verdict,
    pub complement: Decimal,
}

fn audit_contribution(
    name: &str,
    expected_cst: &str,
    expected_rate: Decimal,
    declared: &TaxFields,
    base: Decimal,
) -> ContributionFinding {
    let rate_verdict = if (expected_rate - declared.rate).abs() <= RATE_TOLERANCE {
        Verdict::ok()
    } else {
        Verdict::new(
            Status::Divergente,
            format!(
                "alíquota declarada {}% difere da esperada {}%",
                round2(declared.rate),
                round2(expected_rate)
            ),
        )
    };

    let expected_value = round2(base * expected_rate / dec!(100));
    let complement = complementary(expected_value, declared.value);

    let value_verdict = if declared.value > Decimal::ZERO && cst::is_pis_cofins_exonerado(expected_cst)
    {
        Verdict::new(
            Status::DeclaracaoIndevida,
            format!("{name} declarado {} com CST esperado {expected_cst} exonerado", declared.value),
        )
    } else if expected_rate > Decimal::ZERO && declared.value == Decimal::ZERO {
        Verdict::new(Status::NaoDeclarado, format!("{name} esperado de {expected_value} não declarado"))
    } else if complement > Decimal::ZERO {
        Verdict::new(
            Status::Divergente,
            format!("{name} declarado {} difere do esperado {expected_value}", declared.value),
        )
    } else {
        Verdict::ok()
    };

    ContributionFinding { expected_rate, expected_value, rate_verdict, value_verdict, complement }
}

/// PIS/COFINS diagnostic for one line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PisCofinsFinding {
    pub expected_cst: String,
    pub source: RuleSource,
    pub cst_verdict: Verdict,
    pub pis: ContributionFinding,
    pub cofins: ContributionFinding,
    pub action: Action,
}

/// Audit one line's PIS and COFINS declarations.
pub fn audit_line(
    line: &InvoiceLine,
    config: &AuditConfig,
    gabarito: Option<&GabaritoTable>,
) -> PisCofinsFinding {
    let ncm = line.ncm_normalized();
    let found = gabarito.and_then(|table| resolver::pis_cofins_override(table, &ncm));
    let source = if found.is_some() { RuleSource::Gabarito } else { RuleSource::Regime };

    let regime = config.regime;
    let (expected_cst, pis_rate, cofins_rate) = match found {
        Some(o) => (
            o.cst.unwrap_or_else(|| cst::PIS_COFINS_TRIBUTAVEL.to_string()),
            o.pis_rate.unwrap_or_else(|| regime.pis_rate()),
            o.cofins_rate.unwrap_or_else(|| regime.cofins_rate()),
        ),
        None => {
            (cst::PIS_COFINS_TRIBUTAVEL.to_string(), regime.pis_rate(), regime.cofins_rate())
        }
    };

    // PIS and COFINS carry the same CST on well-formed documents; the
    // PIS one is the side compared.
    let declared_cst = line.pis.cst.trim();
    let cst_verdict = if declared_cst == expected_cst {
        Verdict::ok()
    } else {
        Verdict::new(
            Status::Divergente,
            format!("CST esperado {expected_cst}, declarado {declared_cst}"),
        )
    };

    let base = line.product_value;
    let pis = audit_contribution("PIS", &expected_cst, pis_rate, &line.pis, base);
    let cofins = audit_contribution("COFINS", &expected_cst, cofins_rate, &line.cofins, base);

    let any_undue = pis.value_verdict.status == Status::DeclaracaoIndevida
        || cofins.value_verdict.status == Status::DeclaracaoIndevida;
    let action = if pis.complement + cofins.complement > Decimal::ZERO {
        Action::RecolherComplemento
    } else if any_undue {
        Action::SolicitarRessarcimento
    } else if cst_verdict.status == Status::Divergente {
        Action::RevisarCadastro
    } else {
        Action::Nenhuma
    };

    PisCofinsFinding { expected_cst, source, cst_verdict, pis, cofins, action }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{PisCofinsRegime, Uf};
    use crate::gabarito::GabaritoRow;

    fn compliant_line() -> InvoiceLine {
        InvoiceLine::new("55", 1, Uf::Sp, Uf::Rj, "6108")
            .with_ncm("84713012")
            .with_product("P-1", dec!(1000.00))
            .with_pis(TaxFields::new("01", dec!(1.65), dec!(1000.00), dec!(16.50)))
            .with_cofins(TaxFields::new("01", dec!(7.60), dec!(1000.00), dec!(76.00)))
    }

    #[test]
    fn nao_cumulativo_defaults_pass_a_compliant_line() {
        let config = AuditConfig::new(Uf::Sp);
        let finding = audit_line(&compliant_line(), &config, None);
        assert_eq!(finding.source, RuleSource::Regime);
        assert_eq!(finding.expected_cst, "01");
        assert_eq!(finding.pis.value_verdict.status, Status::Ok);
        assert_eq!(finding.cofins.value_verdict.status, Status::Ok);
        assert_eq!(finding.action, Action::Nenhuma);
    }

    #[test]
    fn cumulativo_regime_changes_both_rates() {
        let config = AuditConfig::new(Uf::Sp).with_regime(PisCofinsRegime::Cumulativo);
        let finding = audit_line(&compliant_line(), &config, None);
        assert_eq!(finding.pis.expected_rate, dec!(0.65));
        assert_eq!(finding.cofins.expected_rate, dec!(3.00));
        // declared at the non-cumulative rates: both diverge
        assert_eq!(finding.pis.rate_verdict.status, Status::Divergente);
        assert_eq!(finding.cofins.rate_verdict.status, Status::Divergente);
    }

    #[test]
    fn missing_both_contributions() {
        let config = AuditConfig::new(Uf::Sp);
        let mut line = compliant_line();
        line.pis = TaxFields::new("01", dec!(0), dec!(0), dec!(0));
        line.cofins = TaxFields::new("01", dec!(0), dec!(0), dec!(0));
        let finding = audit_line(&line, &config, None);
        assert_eq!(finding.pis.value_verdict.status, Status::NaoDeclarado);
        assert_eq!(finding.cofins.value_verdict.status, Status::NaoDeclarado);
        assert_eq!(finding.pis.complement, dec!(16.50));
        assert_eq!(finding.cofins.complement, dec!(76.00));
        assert_eq!(finding.action, Action::RecolherComplemento);
    }

    #[test]
    fn monophase_override_zeroes_expectations() {
        let gabarito = GabaritoTable::new("g").with_row(
            GabaritoRow::new("22021000")
                .with_cst("04")
                .with_pis_rate(dec!(0))
                .with_cofins_rate(dec!(0)),
        );
        let config = AuditConfig::new(Uf::Sp);
        let mut line = compliant_line();
        line.ncm = "2202.10.00".to_string();
        let finding = audit_line(&line, &config, Some(&gabarito));
        assert_eq!(finding.source, RuleSource::Gabarito);
        // declared PIS/COFINS on a mono-phase product: undue
        assert_eq!(finding.pis.value_verdict.status, Status::DeclaracaoIndevida);
        assert_eq!(finding.cofins.value_verdict.status, Status::DeclaracaoIndevida);
        assert_eq!(finding.action, Action::SolicitarRessarcimento);
        assert_eq!(finding.cst_verdict.status, Status::Divergente);
    }

    #[test]
    fn independent_complements() {
        let config = AuditConfig::new(Uf::Sp);
        let mut line = compliant_line();
        line.pis.value = dec!(10.00);
        let finding = audit_line(&line, &config, None);
        assert_eq!(finding.pis.complement, dec!(6.50));
        assert_eq!(finding.cofins.complement, dec!(0));
        assert_eq!(finding.action, Action::RecolherComplemento);
    }
}
