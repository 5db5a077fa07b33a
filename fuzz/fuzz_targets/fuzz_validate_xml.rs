#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let result = einvoice_gate::validate(s, "xml");
        if result.normalized_invoice.is_none() {
            assert_eq!(result.errors.len(), 1);
        }
    }
});
