#![no_main]
use admit_protocol::canonical_bytes;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Canonical encoding of any parseable JSON document must be total and
    // stable under re-encoding.
    if let Ok(value) = serde_json::from_slice::<serde_json::Value>(data) {
        let first = canonical_bytes(&value).unwrap();
        let reparsed: serde_json::Value = serde_json::from_slice(&first).unwrap();
        assert_eq!(first, canonical_bytes(&reparsed).unwrap());
    }
});
