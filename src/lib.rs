//! # apura
//!
//! Fiscal audit engine for Brazilian NF-e invoices: per-line ICMS,
//! DIFAL/FCP, IPI and PIS/COFINS conformity checks, customer gabarito
//! overrides, and the 27-state substitution/DIFAL balance.
//!
//! All monetary values use [`rust_decimal::Decimal`] — never floating point.
//! Rates live on the 0–100 scale and amounts round half away from zero,
//! matching how the figures appear on the documents themselves.
//!
//! ## Quick Start
//!
//! ```rust
//! use apura::core::*;
//! use apura::gabarito::GabaritoSet;
//! use apura::report::run_audit;
//! use rust_decimal_macros::dec;
//!
//! // Interstate consumer sale SP -> RJ, declared at 12%, no DIFAL collected.
//! let line = InvoiceLine::new("1001", 1, Uf::Sp, Uf::Rj, "6108")
//!     .with_ncm("8471.30.12")
//!     .with_product("P-100", dec!(1000.00))
//!     .with_icms(TaxFields::new("00", dec!(12.0), dec!(1000.00), dec!(120.00)));
//!
//! let config = AuditConfig::new(Uf::Sp);
//! let report = run_audit(&config, &[line], &GabaritoSet::empty()).unwrap();
//!
//! // RJ internal 22% minus the 12% declared leaves a 10% DIFAL owed.
//! assert!(report.difal.to_csv().contains("NÃO DECLARADO"));
//! assert!(report.difal.to_csv().contains("100,00"));
//! assert_eq!(report.sheets().len(), 8);
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `core` (default) | Line types, tax auditors, state balance, report assembly |
//! | `extract` | NF-e 4.00 XML ingestion |
//! | `remote` | Remote gabarito retrieval over HTTP |
//! | `all` | Everything |

#[cfg(feature = "core")]
pub mod core;

#[cfg(feature = "core")]
pub mod gabarito;

#[cfg(feature = "core")]
pub mod audit;

#[cfg(feature = "core")]
pub mod balanco;

#[cfg(feature = "core")]
pub mod report;

#[cfg(feature = "extract")]
pub mod extract;

#[cfg(feature = "remote")]
pub mod remote;

// Re-export core types at crate root for convenience
#[cfg(feature = "core")]
pub use crate::core::*;
