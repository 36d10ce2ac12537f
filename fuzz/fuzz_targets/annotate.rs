#![no_main]

use bfa_annotator::BinaryAnnotator;
use bfa_render::{AnnotationRenderer, DefaultRenderer, OutputMode, RenderConfig};
use libfuzzer_sys::fuzz_target;

// Fuzz target: annotate arbitrary bytes against the Monster schema.
//
// Catches bugs in:
// - Unchecked offsets (panics on out-of-range reads)
// - Unbounded recursion through self-referencing offsets
// - Sections that overlap or leave gaps after gap fill
// - Renderers choking on marker regions
fuzz_target!(|data: &[u8]| {
    let Ok(schema) = bfa_tests::fixtures::monster_schema() else {
        return;
    };
    let Ok(map) = BinaryAnnotator::annotate(&schema, data) else {
        return;
    };
    assert_eq!(map.buffer_len(), data.len() as u64);
    assert!(map.is_fully_covered());

    for mode in [OutputMode::Text, OutputMode::Json] {
        let config = RenderConfig {
            mode,
            ..RenderConfig::default()
        };
        let _ = DefaultRenderer.render(&map, data, &config);
    }
});
