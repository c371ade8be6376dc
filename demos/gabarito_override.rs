use apura::audit::{StEvidence, icms};
use apura::core::*;
use apura::gabarito::{GabaritoSet, GabaritoTable};
use apura::report::run_audit;
use rust_decimal_macros::dec;

fn strings(cells: &[&str]) -> Vec<String> {
    cells.iter().map(|c| c.to_string()).collect()
}

fn main() {
    // A customer spreadsheet as it actually arrives: decorated headers,
    // dotted NCMs, comma decimals and the odd unparseable cell. Column
    // detection and row parsing absorb all of it.
    let headers = strings(&["NCM ", "CST Saída", "Aliq. ICMS (%)", "Aliq. ICMS Interestadual"]);
    let records = vec![
        strings(&["8471.30.12", "00", "25,00", "12,00"]),
        strings(&["2202.10.00", "20", "12,5", ""]),
        strings(&["8517.12", "60", "isento", ""]),
    ];
    let table =
        GabaritoTable::from_records("ICMS do cliente", &headers, &records).expect("NCM column present");

    println!("=== Loaded Gabarito ===\n");
    println!("  table: {} ({} NCMs indexed)\n", table.name, table.len());
    for raw in ["8471.30.12", "22021000", "8517.12"] {
        match table.lookup(&ncm::normalize(raw)) {
            Some(row) => println!(
                "  {raw:<12} => cst={:<4} rate={:<8} interstate={}",
                row.cst.as_deref().unwrap_or("-"),
                row.rate.map_or("-".to_string(), |r| r.to_string()),
                row.rate_interstate.map_or("-".to_string(), |r| r.to_string()),
            ),
            None => println!("  {raw:<12} => no row"),
        }
    }

    // The same internal sale audited without and with the gabarito. The
    // regra geral expects 18%; the customer's table says this NCM sells
    // at 25% inside São Paulo.
    let line = InvoiceLine::new("3001", 1, Uf::Sp, Uf::Sp, "5102")
        .with_ncm("8471.30.12")
        .with_product("NB-15", dec!(1000.00))
        .with_icms(TaxFields::new("00", dec!(18.0), dec!(1000.00), dec!(180.00)));

    let evidence = StEvidence::empty();

    println!("\n=== Without Gabarito ===\n");
    let before = icms::audit_line(&line, None, &evidence);
    println!("  rule:       {}", before.source.label());
    println!("  expected:   {}%", before.expected_rate);
    println!("  verdict:    {}", before.rate_verdict.status.label());

    println!("\n=== With Gabarito ===\n");
    let after = icms::audit_line(&line, Some(&table), &evidence);
    println!("  rule:       {} ({})", after.source.label(), after.note);
    println!("  expected:   {}%", after.expected_rate);
    println!("  verdict:    {}", after.rate_verdict.status.label());
    println!("  complement: R$ {}", after.complement);
    println!("  action:     {}", after.action.label());

    // Full run with the table mounted
    let gabaritos = GabaritoSet::empty().with_icms(table);
    let report = run_audit(&AuditConfig::new(Uf::Sp), &[line], &gabaritos)
        .expect("line set is non-empty");

    println!("\n=== ICMS Sheet (CSV) ===\n");
    print!("{}", report.icms.to_csv());
}
