#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let normalized = apura::core::ncm::normalize(s);
        // Canonical form is always exactly 8 ASCII digits.
        assert_eq!(normalized.len(), 8);
        assert!(normalized.chars().all(|c| c.is_ascii_digit()));
        let _ = apura::core::ncm::has_digits(s);
    }
});
