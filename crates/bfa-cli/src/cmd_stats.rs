/// Implementation of `bfa stats`.
///
/// Annotates the buffer and prints how its bytes divide between section
/// kinds.
///
/// # Example output
///
/// ```text
/// File:     monster.bin  (212 bytes)
/// Root:     table `Monster`
/// Sections: 14 total
///
/// Kind          Count   Bytes
/// ───────────────────────────
/// header            1       8
/// table             1      12
/// root_table        1      40
/// vtable            2      30
/// string            3      31
/// vector            3      64
/// union             1      12
/// padding           2      15
/// ───────────────────────────
/// Total            14     212
///
/// Diagnostics: 0
/// ```
use anyhow::{Context, Result};
use bfa_annotator::{AnnotationMap, BinaryAnnotator, BinarySectionType};

use crate::StatsArgs;
use crate::input::Input;

/// Run the `bfa stats` command.
///
/// # Errors
///
/// Returns an error if an input cannot be loaded or annotation fails
/// fatally.
pub fn run(args: &StatsArgs) -> Result<()> {
    let input = Input::load(&args.input)?;
    let map = BinaryAnnotator::annotate_with_config(&input.schema, &input.buffer, &input.config)
        .with_context(|| format!("failed to annotate {}", args.input.binary.display()))?;

    println!(
        "File:     {}  ({} bytes)",
        args.input.binary.display(),
        input.buffer.len()
    );
    println!("Root:     table `{}`", input.root_name());
    println!("Sections: {} total", map.len());
    println!();

    let rule = "─".repeat(27);
    println!("{:<12} {:>6} {:>7}", "Kind", "Count", "Bytes");
    println!("{rule}");
    for (kind, count, bytes) in kind_totals(&map) {
        println!("{:<12} {count:>6} {bytes:>7}", kind.label());
    }
    let total_bytes: u64 = map.iter().map(|(_, s)| s.len()).sum();
    println!("{rule}");
    println!("{:<12} {:>6} {total_bytes:>7}", "Total", map.len());
    println!();
    println!("Diagnostics: {}", map.diagnostics().len());

    Ok(())
}

/// (kind, sections, bytes) for every kind present, in declaration order.
fn kind_totals(map: &AnnotationMap) -> Vec<(BinarySectionType, usize, u64)> {
    BinarySectionType::ALL
        .iter()
        .filter_map(|&kind| {
            let (count, bytes) = map
                .sections_of(kind)
                .fold((0, 0), |(count, bytes), s| (count + 1, bytes + s.len()));
            (count > 0).then_some((kind, count, bytes))
        })
        .collect()
}
