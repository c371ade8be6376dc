//! Remote gabarito retrieval (feature `remote`).
//!
//! Downloads per-customer gabarito tables from an HTTP endpoint that
//! serves them as JSON, and materializes them as the
//! [`GabaritoSet`](crate::gabarito::GabaritoSet) the auditors consume.
//! The fetch is a blocking call with a short timeout and no retries; a
//! failure narrows the audit to its defaults, it never aborts the run.
//!
//! # Example
//!
//! ```ignore
//! use apura::remote::fetch_gabarito_set;
//!
//! // Blocking, requires network access.
//! let set = fetch_gabarito_set("https://gabaritos.example.com/v1", "cliente-042")?;
//! match set {
//!     Some(set) => println!("ICMS gabarito: {} itens", set.icms.map_or(0, |t| t.len())),
//!     None => println!("cliente sem gabarito publicado"),
//! }
//! ```

use crate::gabarito::{GabaritoSet, GabaritoTable};
use serde::Deserialize;
use std::fmt;

/// Error from the gabarito endpoint.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum FetchError {
    /// Network or HTTP transport error.
    Network(String),
    /// The endpoint answered with a non-success status.
    ApiError(String),
    /// The payload could not be turned into gabarito tables.
    ParseError(String),
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Network(e) => write!(f, "gabarito network error: {e}"),
            Self::ApiError(e) => write!(f, "gabarito API error: {e}"),
            Self::ParseError(e) => write!(f, "gabarito parse error: {e}"),
        }
    }
}

impl std::error::Error for FetchError {}

/// Endpoint response: one optional table per tax.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GabaritoApiResponse {
    icms: Option<GabaritoApiTable>,
    ipi: Option<GabaritoApiTable>,
    pis_cofins: Option<GabaritoApiTable>,
}

/// Raw table payload: header row plus data rows, cells as published.
#[derive(Debug, Deserialize)]
struct GabaritoApiTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

fn endpoint(base_url: &str, customer: &str) -> String {
    format!("{}/gabaritos/{customer}", base_url.trim_end_matches('/'))
}

fn build_table(name: &str, payload: GabaritoApiTable) -> Result<GabaritoTable, FetchError> {
    GabaritoTable::from_records(name, &payload.headers, &payload.rows)
        .map_err(|e| FetchError::ParseError(e.to_string()))
}

fn build_set(resp: GabaritoApiResponse) -> Result<GabaritoSet, FetchError> {
    let mut set = GabaritoSet::empty();
    if let Some(t) = resp.icms {
        set = set.with_icms(build_table("ICMS", t)?);
    }
    if let Some(t) = resp.ipi {
        set = set.with_ipi(build_table("IPI", t)?);
    }
    if let Some(t) = resp.pis_cofins {
        set = set.with_pis_cofins(build_table("PIS/COFINS", t)?);
    }
    Ok(set)
}

/// Fetch the gabarito tables published for one customer.
///
/// `base_url` is the service root; `customer` is the customer key as
/// registered on the endpoint. A customer without published tables
/// (HTTP 404) is not an error: the audit then runs on defaults alone.
///
/// Blocks for at most the 5-second timeout.
///
/// # Errors
///
/// Returns `FetchError::Network` on connection issues,
/// `FetchError::ApiError` on non-success statuses other than 404,
/// `FetchError::ParseError` when the payload is not a usable gabarito.
pub fn fetch_gabarito_set(
    base_url: &str,
    customer: &str,
) -> Result<Option<GabaritoSet>, FetchError> {
    let client = reqwest::blocking::Client::builder()
        .timeout(std::time::Duration::from_secs(5))
        .build()
        .map_err(|e| FetchError::Network(e.to_string()))?;

    let resp = client
        .get(endpoint(base_url, customer))
        .send()
        .map_err(|e| FetchError::Network(e.to_string()))?;

    let status = resp.status();
    if status == reqwest::StatusCode::NOT_FOUND {
        return Ok(None);
    }

    let body = resp.text().map_err(|e| FetchError::Network(e.to_string()))?;

    if !status.is_success() {
        return Err(FetchError::ApiError(format!("HTTP {status}: {body}")));
    }

    let api_resp: GabaritoApiResponse = serde_json::from_str(&body)
        .map_err(|e: serde_json::Error| FetchError::ParseError(e.to_string()))?;

    build_set(api_resp).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn endpoint_joins_without_double_slash() {
        assert_eq!(
            endpoint("https://g.example.com/v1/", "acme"),
            "https://g.example.com/v1/gabaritos/acme"
        );
        assert_eq!(
            endpoint("https://g.example.com/v1", "acme"),
            "https://g.example.com/v1/gabaritos/acme"
        );
    }

    #[test]
    fn response_deserialization() {
        let json = r#"{
            "icms": {
                "headers": ["NCM", "CST", "ALIQUOTA", "ALIQ INTERESTADUAL"],
                "rows": [["84713012", "00", "18", "12"]]
            },
            "pisCofins": {
                "headers": ["NCM", "CST", "ALIQ PIS", "ALIQ COFINS"],
                "rows": [["22021000", "04", "", ""]]
            }
        }"#;
        let resp: GabaritoApiResponse = serde_json::from_str(json).unwrap();
        assert!(resp.icms.is_some());
        assert!(resp.ipi.is_none());
        assert!(resp.pis_cofins.is_some());
    }

    #[test]
    fn build_set_materializes_lookup_tables() {
        let resp = GabaritoApiResponse {
            icms: Some(GabaritoApiTable {
                headers: vec!["NCM".into(), "CST".into(), "ALIQUOTA".into()],
                rows: vec![vec!["84713012".into(), "00".into(), "18,00".into()]],
            }),
            ipi: None,
            pis_cofins: None,
        };
        let set = build_set(resp).unwrap();
        let table = set.icms.as_ref().unwrap();
        let row = table.lookup("84713012").unwrap();
        assert_eq!(row.cst.as_deref(), Some("00"));
        assert_eq!(row.rate, Some(dec!(18.00)));
        assert!(set.ipi.is_none());
    }

    #[test]
    fn table_without_ncm_column_is_a_parse_error() {
        let resp = GabaritoApiResponse {
            icms: Some(GabaritoApiTable {
                headers: vec!["CST".into(), "ALIQUOTA".into()],
                rows: vec![],
            }),
            ipi: None,
            pis_cofins: None,
        };
        assert!(matches!(build_set(resp), Err(FetchError::ParseError(_))));
    }
}
