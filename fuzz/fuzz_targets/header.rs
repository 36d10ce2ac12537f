#![no_main]

use bfa_wire::{ByteReader, RootHeader};
use libfuzzer_sys::fuzz_target;

// Fuzz target: RootHeader::read_from on raw bytes.
//
// Catches bugs in:
// - Root offset overflow near u32::MAX
// - Identifier detection on buffers shorter than 8 bytes
fuzz_target!(|data: &[u8]| {
    let reader = ByteReader::new(data);
    if let Ok(header) = RootHeader::read_from(&reader, true) {
        assert!(header.size() <= 8);
        if header.file_identifier.is_some() {
            assert!(data.len() >= 8);
        }
    }
});
