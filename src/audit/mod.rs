//! Per-tax auditors.
//!
//! Each auditor is a pure function from one invoice line (plus injected
//! reference data) to a diagnostic finding; nothing here mutates the
//! line or reaches outside its parameters.

pub mod difal;
mod evidence;
mod finding;
pub mod icms;
pub mod ipi;
pub mod piscofins;

pub use evidence::StEvidence;
pub use finding::{complementary, Action, RuleSource, Status, Verdict};

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Tolerance for rate comparisons, in percentage points. Shared by the
/// ICMS, IPI and PIS/COFINS audits.
pub const RATE_TOLERANCE: Decimal = dec!(0.01);
