#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        // Any text must come back as a result, never a panic.
        let result = einvoice_gate::validate(s, "json");
        if let Some(invoice) = result.normalized_invoice {
            // The normalized invoice must survive a second pass unchanged.
            if let Ok(value) = serde_json::to_value(&invoice) {
                let again = einvoice_gate::validate(value, "json");
                assert_eq!(again.normalized_invoice.as_ref(), Some(&invoice));
            }
        }
    }
});
