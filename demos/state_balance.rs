use apura::balanco;
use apura::core::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn exit_to(doc: &str, dest: Uf, difal: Decimal, fcp: Decimal) -> InvoiceLine {
    InvoiceLine::new(doc, 1, Uf::Sp, dest, "6108").with_difal(DifalFields {
        base: dec!(0),
        value: difal,
        fcp_value: fcp,
    })
}

fn main() {
    // A São Paulo company shipping to three states, with goods coming
    // back from Minas and an IEST captured on the Rio flow.
    let lines = vec![
        exit_to("100", Uf::Rj, dec!(400.00), dec!(80.00)).with_ie_st("11223344"),
        exit_to("101", Uf::Rj, dec!(200.00), dec!(40.00)),
        exit_to("102", Uf::Mg, dec!(300.00), dec!(0)),
        exit_to("103", Uf::Ba, dec!(150.00), dec!(0)),
        // devolution: origin is the home state, so it groups by destination
        InvoiceLine::new("200", 1, Uf::Sp, Uf::Rj, "1202").with_difal(DifalFields {
            base: dec!(0),
            value: dec!(100.00),
            fcp_value: dec!(20.00),
        }),
        InvoiceLine::new("201", 1, Uf::Sp, Uf::Mg, "1202").with_difal(DifalFields {
            base: dec!(0),
            value: dec!(50.00),
            fcp_value: dec!(0),
        }),
    ];

    // MG is registered by configuration; RJ registers itself through the
    // captured IEST; BA stays unregistered.
    let config = AuditConfig::new(Uf::Sp).with_registered_uf(Uf::Mg);
    let balance = balanco::build(&lines, &config);

    println!("=== Per-State DIFAL/FCP Balance ===\n");
    println!("  {:<4} {:>10} {:>10} {:>10}  {:<10} {}", "UF", "exits", "entries", "net", "IEST", "registered");
    for row in balance.rows.iter().filter(|r| !r.exits.is_zero() || !r.entries.is_zero()) {
        println!(
            "  {:<4} {:>10} {:>10} {:>10}  {:<10} {}",
            row.uf.code(),
            row.exits.difal,
            row.entries.difal,
            row.net.difal,
            if row.ie_st.is_empty() { "-" } else { &row.ie_st },
            if row.registered { "yes" } else { "no" }
        );
    }

    println!("\n  Registered states net exits minus entries; the others");
    println!("  keep the full exit total because the entry-side tax was");
    println!("  never recoverable there.");

    println!("\n=== Totals ===\n");
    println!("  exits:   {}", balance.exit_total.difal);
    println!("  entries: {}", balance.entry_total.difal);
    println!("  net:     {}", balance.net_total.difal);
}
