//! Report assembly and tabular output.

mod assemble;
mod sheet;

pub use assemble::{run_audit, Report};
pub use sheet::{Cell, Sheet};
