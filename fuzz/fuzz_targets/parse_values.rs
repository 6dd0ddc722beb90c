#![no_main]

use encore::inference::{ABTestAnalyzer, Sample};
use encore::input::parse_values;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        // Parsing must never panic, and neither may analyzing what it accepts
        if let Ok(values) = parse_values(input) {
            let (left, right) = values.split_at(values.len() / 2);
            let _ = ABTestAnalyzer::default().analyze(
                &Sample::from_options(left.iter().copied()),
                &Sample::from_options(right.iter().copied()),
            );
        }
    }
});
