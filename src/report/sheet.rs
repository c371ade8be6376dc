//! Tabular output: named sheets of typed cells with CSV rendering.
//!
//! The renderer collaborator consumes [`Sheet`] values; `to_csv` is the
//! reference serialization used in tests and by the bundled demos.
//! Conventions follow Brazilian spreadsheet practice: semicolon
//! separator, comma decimal marker, CRLF line endings, text always
//! quoted.

use crate::core::{round2, Uf};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One cell of a report sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Cell {
    Text(String),
    Number(Decimal),
    Integer(i64),
    Empty,
}

impl Cell {
    pub fn text(value: impl Into<String>) -> Cell {
        Cell::Text(value.into())
    }

    pub fn number(value: Decimal) -> Cell {
        Cell::Number(value)
    }

    pub fn integer(value: impl Into<i64>) -> Cell {
        Cell::Integer(value.into())
    }

    pub fn uf(uf: Uf) -> Cell {
        Cell::Text(uf.code().to_string())
    }

    /// SIM/NÃO flag cell.
    pub fn flag(value: bool) -> Cell {
        Cell::Text(if value { "SIM" } else { "NÃO" }.to_string())
    }

    fn render(&self) -> String {
        match self {
            Cell::Text(value) => quote(value),
            Cell::Number(value) => decimal_br(*value),
            Cell::Integer(value) => value.to_string(),
            Cell::Empty => String::new(),
        }
    }
}

/// Quote a text field, doubling embedded quotes.
fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

/// Render an amount with 2 decimal places and a comma marker.
fn decimal_br(value: Decimal) -> String {
    let mut rounded = round2(value);
    rounded.rescale(2);
    rounded.to_string().replace('.', ",")
}

/// A named output table: headers plus rows of cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sheet {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Sheet {
    pub fn new(name: impl Into<String>, headers: &[&str]) -> Self {
        Sheet {
            name: name.into(),
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    /// Append a row. Row width must match the header width.
    pub fn push_row(&mut self, row: Vec<Cell>) {
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Serialize to CSV: header line first, semicolon separated, CRLF.
    pub fn to_csv(&self) -> String {
        let mut out = String::new();
        out.push_str(&self.headers.iter().map(|h| quote(h)).collect::<Vec<_>>().join(";"));
        out.push_str("\r\n");
        for row in &self.rows {
            out.push_str(&row.iter().map(Cell::render).collect::<Vec<_>>().join(";"));
            out.push_str("\r\n");
        }
        out
    }
}
