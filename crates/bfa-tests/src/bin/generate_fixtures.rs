//! Writes the canonical fixtures to `fixtures/` for use with the `bfa` CLI.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin generate_fixtures -p bfa-tests
//! bfa annotate crates/bfa-tests/fixtures/monster.bin \
//!     --schema crates/bfa-tests/fixtures/monster.schema.json
//! ```
//!
//! | File                 | Contents                                 |
//! |----------------------|------------------------------------------|
//! | monster.bin          | `Monster` buffer (204 bytes)             |
//! | monster.schema.json  | `Monster` schema, struct layout computed |
//! | hi.bin               | `Root { value: 42, name: "hi" }`         |
//! | hi.schema.json       | `Root` schema                            |

#![allow(clippy::pedantic)]

use std::path::Path;

use bfa_schema::Schema;
use bfa_tests::fixtures;

fn main() {
    let manifest_dir = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let out_dir = manifest_dir.join("fixtures");
    std::fs::create_dir_all(&out_dir).unwrap();

    write_fixture(
        &out_dir,
        "monster",
        &fixtures::monster_schema().unwrap(),
        &fixtures::monster_buffer().unwrap(),
    );
    write_fixture(
        &out_dir,
        "hi",
        &fixtures::root_schema().unwrap(),
        &fixtures::hi_buffer(),
    );

    println!("Fixtures written to {}", out_dir.display());
}

fn write_fixture(dir: &Path, name: &str, schema: &Schema, buffer: &[u8]) {
    let schema_json = serde_json::to_string_pretty(schema).unwrap();
    std::fs::write(dir.join(format!("{name}.schema.json")), schema_json).unwrap();
    std::fs::write(dir.join(format!("{name}.bin")), buffer).unwrap();
    println!("  {name}: {} bytes", buffer.len());
}
