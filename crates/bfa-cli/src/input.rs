//! Loading the schema and buffer named on the command line.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use bfa_annotator::AnnotatorConfig;
use bfa_schema::Schema;
use tracing::debug;

use crate::InputArgs;

/// A loaded schema and buffer, ready to annotate.
pub struct Input {
    pub schema: Schema,
    pub buffer: Vec<u8>,
    pub config: AnnotatorConfig,
}

impl Input {
    /// Read both files named by `args`.
    ///
    /// # Errors
    ///
    /// Returns an error if either file cannot be read, the schema is not
    /// valid JSON for a [`Schema`], or the schema has no usable root table.
    pub fn load(args: &InputArgs) -> Result<Self> {
        let schema = load_schema(&args.schema)?;
        let buffer = fs::read(&args.binary)
            .with_context(|| format!("cannot read {}", args.binary.display()))?;
        debug!(
            binary = %args.binary.display(),
            bytes = buffer.len(),
            objects = schema.objects.len(),
            enums = schema.enums.len(),
            "inputs loaded"
        );
        let config = AnnotatorConfig {
            max_depth: args.max_depth,
            detect_file_identifier: !args.no_file_identifier,
            ..AnnotatorConfig::default()
        };
        Ok(Self {
            schema,
            buffer,
            config,
        })
    }

    /// Name of the schema's root table.
    pub fn root_name(&self) -> &str {
        self.schema
            .root_table()
            .map_or("?", |(_, root)| root.name.as_str())
    }
}

fn load_schema(path: &Path) -> Result<Schema> {
    let text =
        fs::read_to_string(path).with_context(|| format!("cannot read {}", path.display()))?;
    let schema: Schema = serde_json::from_str(&text)
        .with_context(|| format!("invalid schema JSON in {}", path.display()))?;
    schema
        .root_table()
        .with_context(|| format!("schema {} has no usable root table", path.display()))?;
    Ok(schema)
}
