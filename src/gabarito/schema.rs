//! Column-schema detection for gabarito spreadsheets.
//!
//! Customer gabaritos arrive with free-form headers ("NCM", "Ncm ",
//! "ALQ ICMS", "ALIQ. INTERESTADUAL", "CST SAÍDA"…). Instead of matching
//! substrings row by row, the mapping from header to concept is built
//! exactly once when the table loads; a table missing its key column is
//! rejected with a typed error right there.

use crate::core::{AuditError, AuditResult};

/// Typed concepts a gabarito column can map to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Concept {
    /// Product classification code — the lookup key. Required.
    Ncm,
    /// Expected tax situation code.
    Cst,
    /// Expected rate (internal / general).
    Rate,
    /// Expected rate for interstate movements, when split out.
    RateInterstate,
    /// Expected PIS rate (PIS/COFINS tables only).
    PisRate,
    /// Expected COFINS rate (PIS/COFINS tables only).
    CofinsRate,
}

/// Resolved column positions for one loaded table.
///
/// Only [`Concept::Ncm`] is mandatory; every other concept is optional
/// and simply narrows what the resolver can override.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    pub ncm: usize,
    pub cst: Option<usize>,
    pub rate: Option<usize>,
    pub rate_interstate: Option<usize>,
    pub pis_rate: Option<usize>,
    pub cofins_rate: Option<usize>,
}

fn is_rate_header(upper: &str) -> bool {
    upper.contains("ALIQ") || upper.contains("ALQ")
}

impl Schema {
    /// Detect the schema from a header row. First matching header wins
    /// per concept; later duplicates are ignored (defined tie-break, not
    /// an error). Fails only when no NCM column exists.
    pub fn detect(table: &str, headers: &[String]) -> AuditResult<Schema> {
        let upper: Vec<String> = headers.iter().map(|h| h.trim().to_uppercase()).collect();

        let ncm = upper
            .iter()
            .position(|h| h.contains("NCM"))
            .ok_or_else(|| AuditError::MissingColumn {
                table: table.to_string(),
                concept: "NCM".to_string(),
            })?;

        let mut schema = Schema { ncm, ..Schema::default() };
        for (idx, header) in upper.iter().enumerate() {
            if idx == ncm {
                continue;
            }
            if is_rate_header(header) {
                // "INTERES" and not "INTER": "ALIQUOTA INTERNA" is the
                // plain internal rate, not the interstate column.
                if header.contains("INTERES") {
                    schema.rate_interstate.get_or_insert(idx);
                } else if header.contains("PIS") {
                    schema.pis_rate.get_or_insert(idx);
                } else if header.contains("COFINS") {
                    schema.cofins_rate.get_or_insert(idx);
                } else {
                    schema.rate.get_or_insert(idx);
                }
            } else if header.contains("CST") {
                schema.cst.get_or_insert(idx);
            }
        }
        Ok(schema)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn detects_typical_icms_gabarito() {
        let schema = Schema::detect(
            "gabarito ICMS",
            &headers(&["NCM", "CST", "ALQ ICMS", "ALQ INTERESTADUAL"]),
        )
        .unwrap();
        assert_eq!(schema.ncm, 0);
        assert_eq!(schema.cst, Some(1));
        assert_eq!(schema.rate, Some(2));
        assert_eq!(schema.rate_interstate, Some(3));
    }

    #[test]
    fn detects_pis_cofins_pair() {
        let schema = Schema::detect(
            "gabarito PIS/COFINS",
            &headers(&["Ncm", "Cst Saida", "Aliq. PIS", "Aliq. COFINS"]),
        )
        .unwrap();
        assert_eq!(schema.pis_rate, Some(2));
        assert_eq!(schema.cofins_rate, Some(3));
        assert_eq!(schema.rate, None);
    }

    #[test]
    fn header_matching_is_case_insensitive() {
        let schema =
            Schema::detect("g", &headers(&["ncm do produto", "aliquota interna"])).unwrap();
        assert_eq!(schema.ncm, 0);
        assert_eq!(schema.rate, Some(1));
    }

    #[test]
    fn first_match_wins_on_duplicates() {
        let schema = Schema::detect("g", &headers(&["NCM", "ALQ", "ALQ ANTIGA"])).unwrap();
        assert_eq!(schema.rate, Some(1));
    }

    #[test]
    fn missing_ncm_is_a_typed_error() {
        let err = Schema::detect("gabarito IPI", &headers(&["CST", "ALQ"])).unwrap_err();
        match err {
            AuditError::MissingColumn { table, concept } => {
                assert_eq!(table, "gabarito IPI");
                assert_eq!(concept, "NCM");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
