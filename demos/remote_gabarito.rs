//! Fetches the gabarito tables published for one customer.
//!
//! Usage:
//!   cargo run --example remote_gabarito --features remote -- <base-url> <customer>
//!
//! Requires a live endpoint; without arguments it targets a local one.

use apura::remote;

fn main() {
    let mut args = std::env::args().skip(1);
    let base_url = args.next().unwrap_or_else(|| "http://localhost:8080".to_string());
    let customer = args.next().unwrap_or_else(|| "demo".to_string());

    println!("=== Remote Gabarito Fetch ===\n");
    println!("  base URL: {base_url}");
    println!("  customer: {customer}\n");

    match remote::fetch_gabarito_set(&base_url, &customer) {
        Ok(Some(set)) => {
            let tables = [
                ("ICMS", set.icms.as_ref()),
                ("IPI", set.ipi.as_ref()),
                ("PIS/COFINS", set.pis_cofins.as_ref()),
            ];
            for (tax, table) in tables {
                match table {
                    Some(t) => println!("  {tax:<11} => {} NCMs indexed", t.len()),
                    None => println!("  {tax:<11} => not published"),
                }
            }
        }
        Ok(None) => {
            println!("  no gabarito published for this customer (404)");
            println!("  the audit then runs on rate-table defaults alone");
        }
        Err(e) => println!("  fetch failed: {e}"),
    }
}
