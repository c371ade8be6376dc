//! NF-e XML extraction: one invoice document to normalized lines.
//!
//! Walks the document once with a path stack, accumulating document-level
//! fields (number, parties, protocol status) and one item accumulator per
//! `<det>` block, then merges them at the end. Works on both `nfeProc`
//! envelopes and bare `NFe` documents; namespace prefixes are ignored.
//!
//! Per the ingestion contract, a missing or unparseable tax sub-element
//! zeroes that one field. Only structural problems are terminal: broken
//! XML, no `<det>` items, or an emitter/destination UF that is not a
//! Brazilian state code.

use crate::core::{AuditError, AuditResult, DifalFields, InvoiceLine, StFields, TaxFields, Uf};
use chrono::NaiveDate;
use quick_xml::events::Event;
use quick_xml::Reader;
use rust_decimal::Decimal;
use std::str::FromStr;

#[derive(Debug, Default)]
struct DocFields {
    document: String,
    issue_date: Option<NaiveDate>,
    origin: Option<String>,
    dest: Option<String>,
    status: String,
    ie_st: String,
    dest_ie: String,
}

#[derive(Debug, Default)]
struct ItemFields {
    item: Option<u32>,
    product_code: String,
    description: String,
    ncm: String,
    origem: u8,
    product_value: Decimal,
    cfop: String,
    icms: TaxFields,
    difal: DifalFields,
    st: StFields,
    ipi: TaxFields,
    pis: TaxFields,
    cofins: TaxFields,
}

fn parse_decimal(text: &str) -> Decimal {
    Decimal::from_str(text.trim()).unwrap_or(Decimal::ZERO)
}

fn parse_date(text: &str) -> Option<NaiveDate> {
    let day = text.get(..10)?;
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

fn parse_uf(raw: Option<&str>, element: &str) -> AuditResult<Uf> {
    let raw = raw.unwrap_or_default();
    Uf::from_code(raw).ok_or_else(|| AuditError::InvalidField {
        element: element.to_string(),
        detail: format!("'{raw}' não é uma UF"),
    })
}

/// Whether the path crosses an element with this exact local name.
fn under(path: &[String], section: &str) -> bool {
    path.iter().any(|p| p == section)
}

fn handle_item_text(path: &[String], tag: &str, text: &str, item: &mut ItemFields) {
    if under(path, "prod") {
        match tag {
            "cProd" => item.product_code = text.to_string(),
            "xProd" => item.description = text.to_string(),
            "NCM" => item.ncm = text.to_string(),
            "CFOP" => item.cfop = text.to_string(),
            "vProd" => item.product_value = parse_decimal(text),
            _ => {}
        }
    } else if under(path, "ICMSUFDest") {
        match tag {
            "vBCUFDest" => item.difal.base = parse_decimal(text),
            "vICMSUFDest" => item.difal.value = parse_decimal(text),
            "vFCPUFDest" => item.difal.fcp_value = parse_decimal(text),
            _ => {}
        }
    } else if under(path, "ICMS") {
        match tag {
            "orig" => item.origem = text.trim().parse().unwrap_or(0),
            "CST" | "CSOSN" => item.icms.cst = text.to_string(),
            "pICMS" => item.icms.rate = parse_decimal(text),
            "vBC" => item.icms.base = parse_decimal(text),
            "vICMS" => item.icms.value = parse_decimal(text),
            "vBCST" => item.st.base = parse_decimal(text),
            "vICMSST" => item.st.value = parse_decimal(text),
            "vFCPST" => item.st.fcp_value = parse_decimal(text),
            _ => {}
        }
    } else if under(path, "IPI") {
        match tag {
            "CST" => item.ipi.cst = text.to_string(),
            "pIPI" => item.ipi.rate = parse_decimal(text),
            "vBC" => item.ipi.base = parse_decimal(text),
            "vIPI" => item.ipi.value = parse_decimal(text),
            _ => {}
        }
    } else if under(path, "PIS") {
        match tag {
            "CST" => item.pis.cst = text.to_string(),
            "pPIS" => item.pis.rate = parse_decimal(text),
            "vBC" => item.pis.base = parse_decimal(text),
            "vPIS" => item.pis.value = parse_decimal(text),
            _ => {}
        }
    } else if under(path, "COFINS") {
        match tag {
            "CST" => item.cofins.cst = text.to_string(),
            "pCOFINS" => item.cofins.rate = parse_decimal(text),
            "vBC" => item.cofins.base = parse_decimal(text),
            "vCOFINS" => item.cofins.value = parse_decimal(text),
            _ => {}
        }
    }
}

fn handle_doc_text(path: &[String], tag: &str, text: &str, doc: &mut DocFields) {
    if under(path, "ide") {
        match tag {
            "nNF" => doc.document = text.to_string(),
            "dhEmi" | "dEmi" => doc.issue_date = parse_date(text),
            _ => {}
        }
    } else if under(path, "emit") {
        if under(path, "enderEmit") && tag == "UF" {
            doc.origin = Some(text.to_string());
        } else if tag == "IEST" {
            doc.ie_st = text.to_string();
        }
    } else if under(path, "dest") {
        if under(path, "enderDest") && tag == "UF" {
            doc.dest = Some(text.to_string());
        } else if tag == "IE" {
            doc.dest_ie = text.to_string();
        }
    } else if under(path, "infProt") && tag == "xMotivo" {
        doc.status = text.to_string();
    }
}

/// Extract the invoice lines of one NF-e document.
///
/// Returns one line per `<det>` block, carrying the document-level
/// fields (number, date, UFs, protocol status, registrations) on each.
/// A document without a destination address keeps the emitter's UF as
/// destination (consumer receipts omit `<dest>`).
pub fn extract_lines(xml: &str) -> AuditResult<Vec<InvoiceLine>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut path: Vec<String> = Vec::new();
    let mut doc = DocFields::default();
    let mut items: Vec<ItemFields> = Vec::new();
    let mut current: Option<ItemFields> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                let name = std::str::from_utf8(e.local_name().as_ref())
                    .unwrap_or("")
                    .to_string();
                if name == "det" {
                    let n = e
                        .try_get_attribute("nItem")
                        .ok()
                        .flatten()
                        .and_then(|a| a.unescape_value().ok())
                        .and_then(|v| v.parse::<u32>().ok());
                    current = Some(ItemFields { item: n, ..ItemFields::default() });
                }
                path.push(name);
            }
            Ok(Event::Text(ref e)) => {
                let text = e.unescape().unwrap_or_default().to_string();
                let text = text.trim();
                if text.is_empty() {
                    continue;
                }
                let Some(tag) = path.last().cloned() else { continue };
                match current.as_mut() {
                    Some(item) => handle_item_text(&path, &tag, text, item),
                    None => handle_doc_text(&path, &tag, text, &mut doc),
                }
            }
            Ok(Event::End(_)) => {
                if path.pop().as_deref() == Some("det") {
                    if let Some(item) = current.take() {
                        items.push(item);
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(AuditError::Xml(e.to_string())),
            _ => {}
        }
    }

    if items.is_empty() {
        return Err(AuditError::Xml("documento sem itens <det>".to_string()));
    }

    let origin = parse_uf(doc.origin.as_deref(), "emit/enderEmit/UF")?;
    let dest = match doc.dest.as_deref() {
        Some(raw) => parse_uf(Some(raw), "dest/enderDest/UF")?,
        None => origin,
    };

    let lines = items
        .into_iter()
        .enumerate()
        .map(|(i, item)| InvoiceLine {
            document: doc.document.clone(),
            item: item.item.unwrap_or(i as u32 + 1),
            issue_date: doc.issue_date,
            status: doc.status.clone(),
            product_code: item.product_code,
            description: item.description,
            ncm: item.ncm,
            origem: item.origem,
            product_value: item.product_value,
            origin,
            dest,
            cfop: item.cfop,
            dest_ie: doc.dest_ie.clone(),
            ie_st: doc.ie_st.clone(),
            icms: item.icms,
            difal: item.difal,
            st: item.st,
            ipi: item.ipi,
            pis: item.pis,
            cofins: item.cofins,
        })
        .collect();
    Ok(lines)
}
