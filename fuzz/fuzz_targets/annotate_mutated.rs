#![no_main]

use arbitrary::Arbitrary;
use bfa_annotator::BinaryAnnotator;
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct Mutation {
    at: u8,
    value: u8,
}

// Fuzz target: a valid Monster buffer with a few bytes overwritten.
//
// Random bytes rarely get past the root vtable; mutating a well-formed
// buffer reaches the nested decoders. Whatever the damage, a map that
// comes back must still tile the buffer.
fuzz_target!(|mutations: Vec<Mutation>| {
    let (Ok(schema), Ok(mut buffer)) = (
        bfa_tests::fixtures::monster_schema(),
        bfa_tests::fixtures::monster_buffer(),
    ) else {
        return;
    };
    for m in mutations.iter().take(8) {
        let at = usize::from(m.at) % buffer.len();
        buffer[at] = m.value;
    }
    if let Ok(map) = BinaryAnnotator::annotate(&schema, &buffer) {
        assert!(map.is_fully_covered());
    }
});
