//! Rendered output of annotated fixtures.
//!
//! The text listing of the minimal fixture is pinned with an inline insta
//! snapshot; a change here is a change to the user-visible format (accept
//! with `cargo insta review` when deliberate). The larger fixtures are
//! checked structurally.

use bfa_annotator::BinaryAnnotator;
use bfa_render::{AnnotationRenderer, DefaultRenderer, OutputMode, RenderConfig};
use bfa_tests::fixtures::{self, monster};
use insta::assert_snapshot;

fn render(schema: &bfa_schema::Schema, buffer: &[u8], config: &RenderConfig) -> String {
    let map = BinaryAnnotator::annotate(schema, buffer).unwrap();
    DefaultRenderer.render(&map, buffer, config).unwrap()
}

#[test]
fn minimal_buffer_text() {
    let schema = fixtures::root_schema().unwrap();
    let text = render(&schema, &fixtures::hi_buffer(), &RenderConfig::default());
    assert_snapshot!(text.trim_end(), @r###"
header:
  +0x0000 | 0C 00 00 00                 | UOffset32    | 0x0000000C (12) Loc: 0x000C | offset to root table `Root`

vtable (Root):
  +0x0004 | 08 00                       | VOffset16    | 0x0008 (8) | size of this vtable
  +0x0006 | 0C 00                       | VOffset16    | 0x000C (12) | size of referring table
  +0x0008 | 08 00                       | VOffset16    | 0x0008 (8) | offset to field `value` (id: 0)
  +0x000A | 04 00                       | VOffset16    | 0x0004 (4) | offset to field `name` (id: 1)

root_table (Root):
  +0x000C | 08 00 00 00                 | SOffset32    | 0x00000008 (8) Loc: 0x0004 | offset to vtable
  +0x0010 | 08 00 00 00                 | UOffset32    | 0x00000008 (8) Loc: 0x0018 | offset to field `name` (string)
  +0x0014 | 2A 00 00 00                 | int32_t      | 0x0000002A (42) | table field `value` (int)

string (hi):
  +0x0018 | 02 00 00 00                 | uint32_t     | 0x00000002 (2) | length of string
  +0x001C | 68 69                       | char[2]      | "hi" | string literal
  +0x001E | 00                          | char         | 0x00 | string terminator

padding:
  +0x001F | 00                          | uint8_t[1]   | [0] | padding
"###);
}

#[test]
fn monster_text_lists_every_section() {
    let schema = fixtures::monster_schema().unwrap();
    let buffer = fixtures::monster_buffer().unwrap();
    let text = render(&schema, &buffer, &RenderConfig::default());

    let titles = text.lines().filter(|l| !l.starts_with(' ') && !l.is_empty()).count();
    assert_eq!(titles, 16);
    assert!(text.contains("  +0x0004 | 4D 4F 4E 53                 | char[4]      | \"MONS\" | file identifier"));
    assert!(text.contains("| float        | 1 | struct field `Vec3.x` (float)"));
    assert!(text.contains("| uint8_t[5]   | [0, 1, 2, 3, 4] | items of `inventory` (ubyte)"));
    assert!(text.contains("union (Weapon):"));
    assert!(!text.contains("diagnostics:"));
}

#[test]
fn monster_json_without_padding() {
    let schema = fixtures::monster_schema().unwrap();
    let buffer = fixtures::monster_buffer().unwrap();
    let config = RenderConfig {
        mode: OutputMode::Json,
        include_padding: false,
        ..RenderConfig::default()
    };
    let json = render(&schema, &buffer, &config);
    let doc: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(doc["buffer_len"], monster::LEN);
    let sections = doc["sections"].as_array().unwrap();
    assert_eq!(sections.len(), 14);
    assert!(sections.iter().all(|s| s["kind"] != "padding"));

    let root = sections
        .iter()
        .find(|s| s["kind"] == "root_table")
        .unwrap();
    assert_eq!(root["offset"], monster::TABLE);
    assert_eq!(root["regions"][0]["points_to"], monster::VTABLE);
}
