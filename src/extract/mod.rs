//! NF-e XML ingestion (feature `extract`).
//!
//! Reads NF-e 4.00 documents, either a `nfeProc` envelope or a bare
//! `NFe`, and produces the normalized [`InvoiceLine`](crate::core::InvoiceLine)
//! records the auditors consume. One document yields one line per item.
//!
//! # Example
//!
//! ```no_run
//! use apura::extract;
//!
//! let xml = std::fs::read_to_string("nfe.xml").unwrap();
//! let lines = extract::extract_lines(&xml).unwrap();
//! for line in &lines {
//!     println!("{} item {} CFOP {}", line.document, line.item, line.cfop);
//! }
//! ```

mod nfe;

pub use nfe::extract_lines;
