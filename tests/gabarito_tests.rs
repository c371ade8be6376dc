use apura::audit::{icms, RuleSource, Status, StEvidence};
use apura::core::*;
use apura::gabarito::{schema::Schema, GabaritoSet, GabaritoTable};
use apura::report::run_audit;
use rust_decimal_macros::dec;

fn strings(cells: &[&str]) -> Vec<String> {
    cells.iter().map(|s| s.to_string()).collect()
}

// --- Loading real-world spreadsheets ---

#[test]
fn customer_spreadsheet_loads_and_drives_the_icms_audit() {
    let headers = strings(&["NCM", "CST Saída", "Aliq. ICMS", "Aliq. ICMS Interestadual"]);
    let records = vec![
        strings(&["8471.30.12", "00", "18,00%", "12"]),
        strings(&["2202.10.00", "60", "", ""]),
        strings(&["", "", "", ""]),
        strings(&["observações gerais", "", "", ""]),
    ];
    let table = GabaritoTable::from_records("gabarito ICMS", &headers, &records).unwrap();
    assert_eq!(table.len(), 2);

    let gabaritos = GabaritoSet::empty().with_icms(table);
    let line = InvoiceLine::new("100", 1, Uf::Sp, Uf::Sp, "5102")
        .with_ncm("84713012")
        .with_product("P-1", dec!(1000.00))
        .with_icms(TaxFields::new("00", dec!(12.0), dec!(1000.00), dec!(120.00)));
    let report = run_audit(&AuditConfig::new(Uf::Sp), &[line], &gabaritos).unwrap();

    let csv = report.icms.to_csv();
    // internal movement: the 18% column applies, 180 expected vs 120 declared
    assert!(csv.contains("\"Gabarito\""));
    assert!(csv.contains("60,00"));
    assert!(report.parameters.to_csv().contains("\"Gabarito ICMS\";\"carregado (2 itens)\""));
}

#[test]
fn table_without_ncm_column_is_rejected_up_front() {
    let headers = strings(&["Produto", "CST", "ALIQ"]);
    let err = GabaritoTable::from_records("gabarito do cliente", &headers, &[]).unwrap_err();
    match err {
        AuditError::MissingColumn { table, concept } => {
            assert_eq!(table, "gabarito do cliente");
            assert_eq!(concept, "NCM");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn schema_detection_splits_rate_columns_by_kind() {
    let schema = Schema::detect(
        "g",
        &strings(&["NCM", "CST", "ALIQ PIS", "ALIQ COFINS", "ALIQ ICMS", "ALIQ INTERESTADUAL"]),
    )
    .unwrap();
    assert_eq!(schema.pis_rate, Some(2));
    assert_eq!(schema.cofins_rate, Some(3));
    assert_eq!(schema.rate, Some(4));
    assert_eq!(schema.rate_interstate, Some(5));
}

// --- Override semantics through the auditors ---

#[test]
fn cst_only_row_keeps_the_default_rate() {
    let headers = strings(&["NCM", "CST"]);
    let records = vec![strings(&["8471.30.12", "20"])];
    let table = GabaritoTable::from_records("g", &headers, &records).unwrap();

    let line = InvoiceLine::new("100", 1, Uf::Sp, Uf::Ba, "6102")
        .with_ncm("84713012")
        .with_product("P-1", dec!(1000.00))
        .with_icms(TaxFields::new("20", dec!(7.0), dec!(800.00), dec!(56.00)));
    let finding = icms::audit_line(&line, Some(&table), &StEvidence::empty());

    assert_eq!(finding.source, RuleSource::Gabarito);
    assert_eq!(finding.expected_cst.as_deref(), Some("20"));
    // no rate in the row: SP -> BA default 7% stays in force
    assert_eq!(finding.expected_rate, dec!(7.0));
    assert_eq!(finding.rate_verdict.status, Status::Ok);
    assert_eq!(finding.cst_verdict.status, Status::Ok);
}

#[test]
fn unparseable_rate_cells_degrade_to_absent() {
    let headers = strings(&["NCM", "CST", "ALIQ"]);
    let records = vec![strings(&["8471.30.12", "00", "isento"])];
    let table = GabaritoTable::from_records("g", &headers, &records).unwrap();
    let row = table.lookup("84713012").unwrap();
    assert_eq!(row.cst.as_deref(), Some("00"));
    assert_eq!(row.rate, None);
}

#[test]
fn duplicate_ncm_keeps_the_first_row_through_the_audit() {
    let headers = strings(&["NCM", "CST", "ALIQ"]);
    let records = vec![
        strings(&["84713012", "00", "18"]),
        strings(&["84713012", "00", "25"]),
    ];
    let table = GabaritoTable::from_records("g", &headers, &records).unwrap();

    let line = InvoiceLine::new("100", 1, Uf::Sp, Uf::Sp, "5102")
        .with_ncm("84713012")
        .with_product("P-1", dec!(100.00))
        .with_icms(TaxFields::new("00", dec!(18.0), dec!(100.00), dec!(18.00)));
    let finding = icms::audit_line(&line, Some(&table), &StEvidence::empty());
    assert_eq!(finding.expected_rate, dec!(18.0));
    assert_eq!(finding.rate_verdict.status, Status::Ok);
}

#[test]
fn monophase_gabarito_flags_undue_contributions() {
    let headers = strings(&["NCM", "CST", "ALIQ PIS", "ALIQ COFINS"]);
    let records = vec![strings(&["2202.10.00", "04", "0", "0"])];
    let table = GabaritoTable::from_records("gabarito PIS/COFINS", &headers, &records).unwrap();

    let line = InvoiceLine::new("100", 1, Uf::Sp, Uf::Rj, "6108")
        .with_ncm("22021000")
        .with_product("REFRI", dec!(500.00))
        .with_pis(TaxFields::new("01", dec!(1.65), dec!(500.00), dec!(8.25)))
        .with_cofins(TaxFields::new("01", dec!(7.60), dec!(500.00), dec!(38.00)));
    let report = run_audit(
        &AuditConfig::new(Uf::Sp),
        &[line],
        &GabaritoSet::empty().with_pis_cofins(table),
    )
    .unwrap();

    let csv = report.pis_cofins.to_csv();
    assert!(csv.contains("\"DECLARAÇÃO INDEVIDA\""));
    assert!(csv.contains("\"Solicitar ressarcimento\""));
}
