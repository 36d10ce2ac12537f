/// Implementation of `bfa validate`.
///
/// Annotates the buffer and reports a series of success checkmarks (`✓`)
/// or failure lines (`✗`). The command exits with code 0 on a clean buffer
/// and code 1 otherwise (the dispatcher in `main.rs` converts `Err` to
/// exit code 1).
///
/// # Success output
///
/// ```text
/// ✓ Root: table `Monster` at 0x001C
/// ✓ Sections: 14 sections annotated
/// ✓ Coverage: all 212 bytes accounted for
/// ✓ Diagnostics: none
/// ```
///
/// # Failure output
///
/// ```text
/// ✓ Root: table `Monster` at 0x001C
/// ✓ Sections: 13 sections annotated
/// ✓ Coverage: all 212 bytes accounted for
/// ✗ Diagnostics: 1 problem
///     +0x0040 union `Equipment` has no variant for discriminant 9 (at 0x40)
/// ```
///
/// A fatal error prints a single `✗ Error:` line instead.
use anyhow::{Result, anyhow};
use bfa_annotator::{AnnotationMap, BinaryAnnotator, BinarySectionType};

use crate::ValidateArgs;
use crate::input::Input;

/// Run the `bfa validate` command.
///
/// # Errors
///
/// Returns an error if an input cannot be loaded, annotation fails
/// fatally, the map does not cover the buffer, or any diagnostic was
/// collected.
pub fn run(args: &ValidateArgs, color: bool) -> Result<()> {
    let input = Input::load(&args.input)?;
    let marks = Marks { color };

    let map = match BinaryAnnotator::annotate_with_config(
        &input.schema,
        &input.buffer,
        &input.config,
    ) {
        Ok(map) => map,
        Err(e) => {
            println!("{} Error: {e}", marks.fail());
            return Err(anyhow!("validation failed"));
        }
    };

    let root_offset = map
        .iter()
        .find(|(_, s)| s.section_type == BinarySectionType::RootTable)
        .map_or(0, |(offset, _)| offset);
    println!(
        "{} Root: table `{}` at 0x{root_offset:04X}",
        marks.ok(),
        input.root_name()
    );
    println!(
        "{} Sections: {} section{} annotated",
        marks.ok(),
        map.len(),
        if map.len() == 1 { "" } else { "s" }
    );

    let covered = report_coverage(&map, &marks);
    let clean = report_diagnostics(&map, &marks);
    if covered && clean {
        Ok(())
    } else {
        Err(anyhow!("validation failed"))
    }
}

fn report_coverage(map: &AnnotationMap, marks: &Marks) -> bool {
    if map.is_fully_covered() {
        println!(
            "{} Coverage: all {} bytes accounted for",
            marks.ok(),
            map.buffer_len()
        );
        true
    } else {
        println!(
            "{} Coverage: sections overlap or leave gaps in {} bytes",
            marks.fail(),
            map.buffer_len()
        );
        false
    }
}

fn report_diagnostics(map: &AnnotationMap, marks: &Marks) -> bool {
    let diagnostics = map.diagnostics();
    if diagnostics.is_empty() {
        println!("{} Diagnostics: none", marks.ok());
        return true;
    }
    println!(
        "{} Diagnostics: {} problem{}",
        marks.fail(),
        diagnostics.len(),
        if diagnostics.len() == 1 { "" } else { "s" }
    );
    for diagnostic in diagnostics {
        match diagnostic.offset() {
            Some(offset) => println!("    +0x{offset:04X} {diagnostic}"),
            None => println!("    {diagnostic}"),
        }
    }
    false
}

/// Check and cross glyphs, green and red unless colour is off.
struct Marks {
    color: bool,
}

impl Marks {
    fn ok(&self) -> &'static str {
        if self.color { "\x1b[32m✓\x1b[0m" } else { "✓" }
    }

    fn fail(&self) -> &'static str {
        if self.color { "\x1b[31m✗\x1b[0m" } else { "✗" }
    }
}
