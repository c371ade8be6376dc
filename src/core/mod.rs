//! Core data model and reference data.
//!
//! Invoice-line shape, run configuration, UF/CFOP/NCM classification and
//! the injected ICMS rate table. Everything downstream (auditors, state
//! balance, report) consumes only what is defined here.

pub mod cfop;
pub mod cst;
mod error;
pub mod ncm;
pub mod rates;
mod types;
mod uf;

pub use error::{AuditError, AuditResult};
pub use rates::RateTable;
pub use types::*;
pub use uf::Uf;
