/// Implementation of `bfa annotate`.
///
/// Loads the schema and buffer, runs [`BinaryAnnotator`], and renders the
/// resulting map via [`DefaultRenderer`] to stdout or `-o <file>`.
///
/// # Example output (text)
///
/// ```text
/// header:
///   +0x0000 | 0C 00 00 00                 | UOffset32    | 0x0000000C (12) Loc: 0x000C | offset to root table `Root`
///
/// vtable (Root):
///   +0x0004 | 08 00                       | VOffset16    | 0x0008 (8) | size of this vtable
///   ...
/// ```
///
/// Errors downgraded during annotation appear in a trailing
/// `diagnostics:` block (text) or the `diagnostics` array (JSON); only a
/// fatal error fails the command.
use std::fs;
use std::io::{self, Write as _};

use anyhow::{Context, Result, anyhow};
use bfa_annotator::BinaryAnnotator;
use bfa_render::{AnnotationRenderer, DefaultRenderer, OutputMode, RenderConfig};

use crate::AnnotateArgs;
use crate::input::Input;

/// Run the `bfa annotate` command.
///
/// # Errors
///
/// Returns an error if an input cannot be loaded, the `--format` value is
/// unrecognised, annotation fails fatally, or the output cannot be written.
pub fn run(args: &AnnotateArgs) -> Result<()> {
    let mode = parse_format(&args.format)?;
    let input = Input::load(&args.input)?;

    let map = BinaryAnnotator::annotate_with_config(&input.schema, &input.buffer, &input.config)
        .with_context(|| format!("failed to annotate {}", args.input.binary.display()))?;

    let config = RenderConfig {
        mode,
        include_padding: !args.no_padding,
        max_hex_bytes: args.hex_bytes,
    };
    let rendered = DefaultRenderer
        .render(&map, &input.buffer, &config)
        .context("render failed")?;

    if let Some(path) = &args.output {
        fs::write(path, rendered.as_bytes())
            .with_context(|| format!("cannot write {}", path.display()))?;
    } else {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        handle
            .write_all(rendered.as_bytes())
            .context("cannot write to stdout")?;
        if !rendered.ends_with('\n') {
            handle.write_all(b"\n").context("cannot write to stdout")?;
        }
    }

    Ok(())
}

/// Parses the `--format` string to an [`OutputMode`].
fn parse_format(s: &str) -> Result<OutputMode> {
    match s.to_lowercase().as_str() {
        "text" | "txt" => Ok(OutputMode::Text),
        "json" => Ok(OutputMode::Json),
        _ => Err(anyhow!("unknown format {s:?}, expected text|json")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_names_are_case_insensitive() {
        assert_eq!(parse_format("JSON").unwrap(), OutputMode::Json);
        assert_eq!(parse_format("text").unwrap(), OutputMode::Text);
        assert!(parse_format("xml").is_err());
    }
}
