use thiserror::Error;

/// Terminal failures of a report run.
///
/// Recoverable conditions (absent gabarito, missing rate-table entry,
/// malformed single field) never appear here — they degrade the affected
/// diagnostics to an explicit "not evaluated" status instead.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AuditError {
    /// No invoice lines at all; no partial report is produced.
    #[error("no invoice lines to audit")]
    EmptyInput,

    /// A gabarito table is present but a required concept has no
    /// matching column.
    #[error("gabarito '{table}' has no column for {concept}")]
    MissingColumn { table: String, concept: String },

    /// A field that must carry a specific shape could not be read.
    #[error("invalid {element}: {detail}")]
    InvalidField { element: String, detail: String },

    /// NF-e XML is structurally unparseable.
    #[cfg(feature = "extract")]
    #[error("NF-e XML error: {0}")]
    Xml(String),
}

/// Convenience alias used across the crate.
pub type AuditResult<T> = Result<T, AuditError>;
