//! DIFAL/FCP audit: the interstate rate differential owed to the
//! destination state.
//!
//! Only interstate lines owe DIFAL. The expected percentage is the
//! destination's internal rate minus the declared interstate rate,
//! floored at zero; the declared figure under comparison is the sum of
//! the DIFAL-proper and FCP-destination values, which is why the
//! tolerance here is wider than the ICMS one.

use crate::audit::finding::{complementary, Action, Status, Verdict};
use crate::core::{round2, AuditConfig, InvoiceLine};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Mismatch tolerance on the declared total, absorbing the compounded
/// rounding of two summed components.
pub const VALUE_TOLERANCE: Decimal = dec!(0.11);

/// Threshold below which an expected value counts as "nothing owed".
pub const OWED_THRESHOLD: Decimal = dec!(0.01);

/// DIFAL diagnostic for one line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DifalFinding {
    /// Whether the movement owes DIFAL at all (interstate).
    pub required: bool,
    /// `max(0, internal rate of destination − declared interstate rate)`.
    pub expected_rate: Decimal,
    pub expected_value: Decimal,
    /// Declared DIFAL plus declared FCP-destination.
    pub declared_value: Decimal,
    pub verdict: Verdict,
    pub complement: Decimal,
    pub action: Action,
}

impl DifalFinding {
    fn not_applicable(declared: Decimal) -> Self {
        DifalFinding {
            required: false,
            expected_rate: Decimal::ZERO,
            expected_value: Decimal::ZERO,
            declared_value: declared,
            verdict: Verdict::new(Status::NaoAplicavel, "operação interna não gera DIFAL"),
            complement: Decimal::ZERO,
            action: Action::Nenhuma,
        }
    }
}

/// The base DIFAL is computed on: the dedicated destination base when
/// declared, else the ICMS base.
fn difal_base(line: &InvoiceLine) -> Decimal {
    if line.difal.base != Decimal::ZERO {
        line.difal.base
    } else {
        line.icms.base
    }
}

/// Audit one line's DIFAL declaration.
pub fn audit_line(line: &InvoiceLine, config: &AuditConfig) -> DifalFinding {
    let declared = line.difal.value + line.difal.fcp_value;
    if line.origin == line.dest {
        return DifalFinding::not_applicable(declared);
    }

    let Some(internal) = config.rate_table.internal_rate(line.dest) else {
        return DifalFinding {
            required: true,
            expected_rate: Decimal::ZERO,
            expected_value: Decimal::ZERO,
            declared_value: declared,
            verdict: Verdict::new(
                Status::NaoAvaliado,
                format!(
                    "sem alíquota interna cadastrada para {} ({})",
                    line.dest, config.rate_table.label
                ),
            ),
            complement: Decimal::ZERO,
            action: Action::Nenhuma,
        };
    };

    let expected_rate = (internal - line.icms.rate).max(Decimal::ZERO);
    let expected_value = round2(difal_base(line) * expected_rate / dec!(100));

    let (verdict, complement) = if declared == Decimal::ZERO && expected_value > OWED_THRESHOLD {
        (
            Verdict::new(
                Status::NaoDeclarado,
                format!("DIFAL esperado de {expected_value} não declarado"),
            ),
            complementary(expected_value, declared),
        )
    } else if (expected_value - declared).abs() <= VALUE_TOLERANCE {
        (Verdict::ok(), Decimal::ZERO)
    } else {
        (
            Verdict::new(
                Status::Divergente,
                format!("DIFAL declarado {declared} difere do esperado {expected_value}"),
            ),
            complementary(expected_value, declared),
        )
    };

    let action = if complement > Decimal::ZERO {
        Action::RecolherComplemento
    } else if verdict.status == Status::Divergente {
        // declared exceeds expected beyond tolerance
        Action::SolicitarRessarcimento
    } else {
        Action::Nenhuma
    };

    DifalFinding {
        required: true,
        expected_rate,
        expected_value,
        declared_value: declared,
        verdict,
        complement,
        action,
    }
}
