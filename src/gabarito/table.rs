//! Loaded gabarito tables and their lookup index.

use crate::core::{ncm, AuditResult};
use crate::gabarito::schema::Schema;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;

/// One gabarito row, already normalized. Absent cells stay `None` and
/// leave the engine default in force for that concept.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GabaritoRow {
    /// Canonical 8-digit NCM, the lookup key.
    pub ncm: String,
    pub cst: Option<String>,
    pub rate: Option<Decimal>,
    pub rate_interstate: Option<Decimal>,
    pub pis_rate: Option<Decimal>,
    pub cofins_rate: Option<Decimal>,
}

impl GabaritoRow {
    pub fn new(raw_ncm: &str) -> Self {
        GabaritoRow { ncm: ncm::normalize(raw_ncm), ..GabaritoRow::default() }
    }

    pub fn with_cst(mut self, cst: impl Into<String>) -> Self {
        self.cst = Some(cst.into());
        self
    }

    pub fn with_rate(mut self, rate: Decimal) -> Self {
        self.rate = Some(rate);
        self
    }

    pub fn with_rate_interstate(mut self, rate: Decimal) -> Self {
        self.rate_interstate = Some(rate);
        self
    }

    pub fn with_pis_rate(mut self, rate: Decimal) -> Self {
        self.pis_rate = Some(rate);
        self
    }

    pub fn with_cofins_rate(mut self, rate: Decimal) -> Self {
        self.cofins_rate = Some(rate);
        self
    }
}

/// Parse a spreadsheet cell as a rate. Accepts Brazilian comma decimals
/// ("18,5"), a trailing percent sign and surrounding whitespace. A cell
/// that still fails to parse yields `None` — one bad cell never sinks
/// the table.
pub fn parse_rate(cell: &str) -> Option<Decimal> {
    let cleaned = cell.trim().trim_end_matches('%').trim().replace(',', ".");
    if cleaned.is_empty() {
        return None;
    }
    Decimal::from_str(&cleaned).ok()
}

/// A customer override table keyed by normalized NCM.
///
/// Duplicate NCMs keep the first row encountered; this is the defined
/// tie-break, not an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GabaritoTable {
    pub name: String,
    rows: Vec<GabaritoRow>,
    index: HashMap<String, usize>,
}

impl GabaritoTable {
    pub fn new(name: impl Into<String>) -> Self {
        GabaritoTable { name: name.into(), rows: Vec::new(), index: HashMap::new() }
    }

    /// Build a table from a raw header row plus data records, detecting
    /// the column schema once up front. Cells that fail to parse are
    /// dropped field-by-field; rows whose NCM cell has no digits are
    /// skipped entirely.
    pub fn from_records(
        name: impl Into<String>,
        headers: &[String],
        records: &[Vec<String>],
    ) -> AuditResult<Self> {
        let name = name.into();
        let schema = Schema::detect(&name, headers)?;
        let mut table = GabaritoTable::new(name);

        let cell = |record: &[String], idx: Option<usize>| -> Option<String> {
            idx.and_then(|i| record.get(i)).map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
        };

        for record in records {
            let Some(raw_ncm) = record.get(schema.ncm) else { continue };
            if !ncm::has_digits(raw_ncm) {
                continue;
            }
            let mut row = GabaritoRow::new(raw_ncm);
            row.cst = cell(record, schema.cst);
            row.rate = cell(record, schema.rate).as_deref().and_then(parse_rate);
            row.rate_interstate =
                cell(record, schema.rate_interstate).as_deref().and_then(parse_rate);
            row.pis_rate = cell(record, schema.pis_rate).as_deref().and_then(parse_rate);
            row.cofins_rate = cell(record, schema.cofins_rate).as_deref().and_then(parse_rate);
            table.push(row);
        }
        Ok(table)
    }

    /// Append a row, keeping the existing one on NCM collision.
    pub fn push(&mut self, row: GabaritoRow) {
        let position = self.rows.len();
        self.index.entry(row.ncm.clone()).or_insert(position);
        self.rows.push(row);
    }

    pub fn with_row(mut self, row: GabaritoRow) -> Self {
        self.push(row);
        self
    }

    /// First row matching the normalized NCM, if any.
    pub fn lookup(&self, ncm_normalized: &str) -> Option<&GabaritoRow> {
        self.index.get(ncm_normalized).map(|&i| &self.rows[i])
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// The gabarito tables one run may carry, one per tax type. Any of them
/// may be absent; audits then run on hard-coded defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GabaritoSet {
    pub icms: Option<GabaritoTable>,
    pub ipi: Option<GabaritoTable>,
    pub pis_cofins: Option<GabaritoTable>,
}

impl GabaritoSet {
    pub fn empty() -> Self {
        GabaritoSet::default()
    }

    pub fn with_icms(mut self, table: GabaritoTable) -> Self {
        self.icms = Some(table);
        self
    }

    pub fn with_ipi(mut self, table: GabaritoTable) -> Self {
        self.ipi = Some(table);
        self
    }

    pub fn with_pis_cofins(mut self, table: GabaritoTable) -> Self {
        self.pis_cofins = Some(table);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn strings(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn builds_from_records_with_messy_cells() {
        let headers = strings(&["NCM", "CST", "ALQ ICMS", "ALQ INTERESTADUAL"]);
        let records = vec![
            strings(&["8471.30.12", "00", "18,0", "12"]),
            strings(&["850", "60", "", "4%"]),
            strings(&["sem ncm", "00", "18", "12"]),
        ];
        let table = GabaritoTable::from_records("g", &headers, &records).unwrap();
        assert_eq!(table.len(), 2);

        let row = table.lookup("84713012").unwrap();
        assert_eq!(row.cst.as_deref(), Some("00"));
        assert_eq!(row.rate, Some(dec!(18.0)));
        assert_eq!(row.rate_interstate, Some(dec!(12)));

        let row = table.lookup("00000850").unwrap();
        assert_eq!(row.rate, None);
        assert_eq!(row.rate_interstate, Some(dec!(4)));
    }

    #[test]
    fn first_row_wins_on_duplicate_ncm() {
        let table = GabaritoTable::new("g")
            .with_row(GabaritoRow::new("850").with_rate(dec!(18)))
            .with_row(GabaritoRow::new("850").with_rate(dec!(25)));
        assert_eq!(table.lookup("00000850").unwrap().rate, Some(dec!(18)));
    }

    #[test]
    fn lookup_uses_normalized_key_only() {
        let table = GabaritoTable::new("g").with_row(GabaritoRow::new("8504.10"));
        assert!(table.lookup("00850410").is_some());
        assert!(table.lookup("8504.10").is_none());
    }

    #[test]
    fn rate_parsing_accepts_brazilian_formats() {
        assert_eq!(parse_rate("18,5"), Some(dec!(18.5)));
        assert_eq!(parse_rate(" 12 % "), Some(dec!(12)));
        assert_eq!(parse_rate("4.00"), Some(dec!(4.00)));
        assert_eq!(parse_rate(""), None);
        assert_eq!(parse_rate("isento"), None);
    }
}
