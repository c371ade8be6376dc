#![no_main]

use libfuzzer_sys::fuzz_target;

use apura::core::{AuditConfig, Uf};
use apura::gabarito::GabaritoSet;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        // Extract → audit must not panic at any step.
        if let Ok(lines) = apura::extract::extract_lines(s) {
            let config = AuditConfig::new(Uf::Sp);
            let _ = apura::report::run_audit(&config, &lines, &GabaritoSet::empty());
        }
    }
});
