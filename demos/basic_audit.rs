use apura::audit::{StEvidence, icms};
use apura::core::*;
use apura::gabarito::GabaritoSet;
use apura::report::run_audit;
use rust_decimal_macros::dec;

fn main() {
    // One period for a São Paulo retailer: a compliant internal sale, an
    // interstate consumer sale declared at the wrong rate, and an ST
    // purchase from Bahia.
    let lines = vec![
        InvoiceLine::new("1001", 1, Uf::Sp, Uf::Sp, "5102")
            .with_ncm("8471.30.12")
            .with_product("NB-15", dec!(3500.00))
            .with_icms(TaxFields::new("00", dec!(18.0), dec!(3500.00), dec!(630.00)))
            .with_pis(TaxFields::new("01", dec!(1.65), dec!(3500.00), dec!(57.75)))
            .with_cofins(TaxFields::new("01", dec!(7.60), dec!(3500.00), dec!(266.00))),
        InvoiceLine::new("1002", 1, Uf::Sp, Uf::Rj, "6108")
            .with_ncm("8471.30.12")
            .with_product("NB-15", dec!(3500.00))
            // declared at the internal 18% instead of the interstate 12%
            .with_icms(TaxFields::new("00", dec!(18.0), dec!(3500.00), dec!(630.00)))
            .with_difal(DifalFields {
                base: dec!(3500.00),
                value: dec!(280.00),
                fcp_value: dec!(70.00),
            })
            .with_pis(TaxFields::new("01", dec!(1.65), dec!(3500.00), dec!(57.75)))
            .with_cofins(TaxFields::new("01", dec!(7.60), dec!(3500.00), dec!(266.00))),
        InvoiceLine::new("2001", 1, Uf::Ba, Uf::Sp, "2403")
            .with_ncm("2202.10.00")
            .with_product("REF-350", dec!(1200.00))
            .with_st(StFields { base: dec!(1560.00), value: dec!(98.00), fcp_value: dec!(0) }),
    ];

    println!("=== Period Lines ===\n");
    for line in &lines {
        println!(
            "  NF {} item {}: {} -> {}, CFOP {}, NCM {}, R$ {}",
            line.document,
            line.item,
            line.origin,
            line.dest,
            line.cfop,
            line.ncm_normalized(),
            line.product_value
        );
    }

    // Per-line ICMS diagnostics, no gabarito loaded
    println!("\n=== ICMS Findings ===\n");
    let evidence = StEvidence::from_entries(&lines);
    for line in lines.iter().filter(|l| l.movement() == cfop::Movement::Saida) {
        let finding = icms::audit_line(line, None, &evidence);
        println!("  NF {} item {}:", line.document, line.item);
        println!("    rule:     {} ({})", finding.source.label(), finding.note);
        println!(
            "    rate:     declared {}%, expected {}% => {}",
            line.icms.rate,
            finding.expected_rate,
            finding.rate_verdict.status.label()
        );
        if finding.complement > dec!(0) {
            println!("    owed:     R$ {}", finding.complement);
        }
        println!("    action:   {}", finding.action.label());
    }

    // Full report run
    let config = AuditConfig::new(Uf::Sp);
    let report = run_audit(&config, &lines, &GabaritoSet::empty()).expect("line set is non-empty");

    println!("\n=== Report Sheets ===\n");
    for sheet in report.sheets() {
        println!("  {:<14} {} rows", sheet.name, sheet.len());
    }

    let balance = &report.balance;
    println!("\n=== DIFAL/FCP Totals ===\n");
    println!("  exits:   DIFAL {}  FCP {}", balance.exit_total.difal, balance.exit_total.fcp);
    println!("  entries: ST    {}", balance.entry_total.st);
    println!("  net:     DIFAL {}", balance.net_total.difal);

    println!("\n=== ICMS Sheet (CSV) ===\n");
    print!("{}", report.icms.to_csv());
}
