#![no_main]

use libfuzzer_sys::fuzz_target;

// Interpret the input as a semicolon-separated spreadsheet: first line
// headers, the rest records. Loading must not panic on any shape.
fuzz_target!(|data: &[u8]| {
    let Ok(s) = std::str::from_utf8(data) else { return };
    let mut rows = s.lines();
    let Some(header_line) = rows.next() else { return };
    let headers: Vec<String> = header_line.split(';').map(str::to_string).collect();
    let records: Vec<Vec<String>> =
        rows.map(|line| line.split(';').map(str::to_string).collect()).collect();
    let _ = apura::gabarito::GabaritoTable::from_records("fuzz", &headers, &records);
});
