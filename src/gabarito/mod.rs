//! Customer gabarito (override) tables.
//!
//! A gabarito replaces hard-coded rate/CST defaults for specific NCMs.
//! Loading detects the column schema once ([`schema`]), rows are indexed
//! by normalized NCM with first-match-wins ([`table`]), and [`resolver`]
//! decides what a matched row may actually change.

pub mod resolver;
pub mod schema;
mod table;

pub use resolver::{IcmsOverride, IpiOverride, PisCofinsOverride};
pub use table::{parse_rate, GabaritoRow, GabaritoSet, GabaritoTable};
