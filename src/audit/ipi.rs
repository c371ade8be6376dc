//! IPI audit.
//!
//! The default expectation is a taxed exit (CST 50) at rate zero; a
//! gabarito row replaces either per NCM. The base is the gross product
//! value, not the ICMS base.

use crate::audit::finding::{complementary, Action, RuleSource, Status, Verdict};
use crate::audit::RATE_TOLERANCE;
use crate::core::{cst, round2, InvoiceLine};
use crate::gabarito::{resolver, GabaritoTable};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// IPI diagnostic for one line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IpiFinding {
    pub expected_cst: String,
    pub expected_rate: Decimal,
    pub source: RuleSource,
    pub cst_verdict: Verdict,
    pub rate_verdict: Verdict,
    /// Value-level status: missing declaration, undue declaration, or the
    /// plain expected-vs-declared comparison.
    pub value_verdict: Verdict,
    pub complement: Decimal,
    pub action: Action,
}

/// Audit one line's IPI declaration.
pub fn audit_line(line: &InvoiceLine, gabarito: Option<&GabaritoTable>) -> IpiFinding {
    let ncm = line.ncm_normalized();
    let found = gabarito.and_then(|table| resolver::ipi_override(table, &ncm));
    let source = if found.is_some() { RuleSource::Gabarito } else { RuleSource::Padrao };
    let (expected_cst, expected_rate) = match found {
        Some(o) => (
            o.cst.unwrap_or_else(|| cst::IPI_SAIDA_TRIBUTADA.to_string()),
            o.rate.unwrap_or(Decimal::ZERO),
        ),
        None => (cst::IPI_SAIDA_TRIBUTADA.to_string(), Decimal::ZERO),
    };

    let declared_cst = line.ipi.cst.trim();
    let cst_verdict = if declared_cst == expected_cst {
        Verdict::ok()
    } else {
        Verdict::new(
            Status::Divergente,
            format!("CST esperado {expected_cst}, declarado {declared_cst}"),
        )
    };

    let rate_verdict = if (expected_rate - line.ipi.rate).abs() <= RATE_TOLERANCE {
        Verdict::ok()
    } else {
        Verdict::new(
            Status::Divergente,
            format!(
                "alíquota declarada {}% difere da esperada {}%",
                round2(line.ipi.rate),
                round2(expected_rate)
            ),
        )
    };

    let expected_value = round2(line.product_value * expected_rate / dec!(100));
    let complement = complementary(expected_value, line.ipi.value);

    let value_verdict = if line.ipi.value > Decimal::ZERO && cst::is_ipi_exonerado(&expected_cst) {
        Verdict::new(
            Status::DeclaracaoIndevida,
            format!("IPI declarado {} com CST esperado {expected_cst} exonerado", line.ipi.value),
        )
    } else if expected_rate > Decimal::ZERO && line.ipi.value == Decimal::ZERO {
        Verdict::new(
            Status::NaoDeclarado,
            format!("IPI esperado de {expected_value} não declarado"),
        )
    } else if complement > Decimal::ZERO {
        Verdict::new(
            Status::Divergente,
            format!("IPI declarado {} difere do esperado {expected_value}", line.ipi.value),
        )
    } else {
        Verdict::ok()
    };

    let action = if complement > Decimal::ZERO {
        Action::RecolherComplemento
    } else if value_verdict.status == Status::DeclaracaoIndevida {
        Action::SolicitarRessarcimento
    } else if cst_verdict.status == Status::Divergente {
        Action::RevisarCadastro
    } else {
        Action::Nenhuma
    };

    IpiFinding {
        expected_cst,
        expected_rate,
        source,
        cst_verdict,
        rate_verdict,
        value_verdict,
        complement,
        action,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{TaxFields, Uf};
    use crate::gabarito::GabaritoRow;

    fn line() -> InvoiceLine {
        InvoiceLine::new("55", 1, Uf::Sp, Uf::Rj, "6108")
            .with_ncm("84713012")
            .with_product("P-1", dec!(1000.00))
            .with_ipi(TaxFields::new("50", dec!(0), dec!(0), dec!(0)))
    }

    #[test]
    fn default_expectation_is_cst_50_rate_zero() {
        let finding = audit_line(&line(), None);
        assert_eq!(finding.expected_cst, "50");
        assert_eq!(finding.expected_rate, dec!(0));
        assert_eq!(finding.source, RuleSource::Padrao);
        assert_eq!(finding.value_verdict.status, Status::Ok);
        assert_eq!(finding.complement, dec!(0));
    }

    #[test]
    fn gabarito_rate_creates_missing_declaration() {
        let gabarito = GabaritoTable::new("g")
            .with_row(GabaritoRow::new("84713012").with_cst("50").with_rate(dec!(5.0)));
        let finding = audit_line(&line(), Some(&gabarito));
        assert_eq!(finding.source, RuleSource::Gabarito);
        assert_eq!(finding.value_verdict.status, Status::NaoDeclarado);
        // 1000 × 5% = 50 owed
        assert_eq!(finding.complement, dec!(50.00));
        assert_eq!(finding.action, Action::RecolherComplemento);
    }

    #[test]
    fn declared_value_with_exonerated_cst_is_undue() {
        let gabarito = GabaritoTable::new("g").with_row(GabaritoRow::new("84713012").with_cst("52"));
        let mut l = line();
        l.ipi = TaxFields::new("50", dec!(5.0), dec!(1000.00), dec!(50.00));
        let finding = audit_line(&l, Some(&gabarito));
        assert_eq!(finding.value_verdict.status, Status::DeclaracaoIndevida);
        assert_eq!(finding.complement, dec!(0));
        assert_eq!(finding.action, Action::SolicitarRessarcimento);
    }

    #[test]
    fn partial_declaration_diverges() {
        let gabarito = GabaritoTable::new("g")
            .with_row(GabaritoRow::new("84713012").with_rate(dec!(10.0)));
        let mut l = line();
        l.ipi = TaxFields::new("50", dec!(10.0), dec!(1000.00), dec!(60.00));
        let finding = audit_line(&l, Some(&gabarito));
        assert_eq!(finding.value_verdict.status, Status::Divergente);
        assert_eq!(finding.complement, dec!(40.00));
    }

    #[test]
    fn rate_tolerance_applies() {
        let gabarito = GabaritoTable::new("g")
            .with_row(GabaritoRow::new("84713012").with_rate(dec!(5.0)));
        let mut l = line();
        l.ipi = TaxFields::new("50", dec!(5.005), dec!(1000.00), dec!(50.00));
        let finding = audit_line(&l, Some(&gabarito));
        assert_eq!(finding.rate_verdict.status, Status::Ok);
        assert_eq!(finding.value_verdict.status, Status::Ok);
    }

    #[test]
    fn cst_mismatch_without_amounts_asks_for_review() {
        let mut l = line();
        l.ipi.cst = "99".to_string();
        let finding = audit_line(&l, None);
        assert_eq!(finding.cst_verdict.status, Status::Divergente);
        assert_eq!(finding.action, Action::RevisarCadastro);
    }
}
