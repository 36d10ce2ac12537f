//! End-to-end annotation of well-formed fixtures.
//!
//! Every test annotates a buffer from `bfa_tests::fixtures` (or one laid
//! out inline with `FixtureBuilder`) and checks the resulting section map:
//! which sections exist, what they are named, and how their regions read.
//! Every well-formed buffer must come back fully covered and without
//! diagnostics.

use bfa_annotator::{
    AnnotationMap, AnnotatorConfig, BinaryAnnotator, BinaryRegionType, BinarySectionType,
};
use bfa_schema::{BaseType, SchemaBuilder, Type};
use bfa_tests::FixtureBuilder;
use bfa_tests::fixtures::{self, inbox, monster};

fn annotate_monster() -> AnnotationMap {
    let schema = fixtures::monster_schema().unwrap();
    let buffer = fixtures::monster_buffer().unwrap();
    BinaryAnnotator::annotate(&schema, &buffer).unwrap()
}

fn comments(map: &AnnotationMap, offset: u64) -> Vec<String> {
    map.get(offset)
        .unwrap_or_else(|| panic!("no section at {offset:#X}"))
        .regions
        .iter()
        .map(|r| r.comment.clone())
        .collect()
}

// ── Monster: section inventory ────────────────────────────────────────────────

#[test]
fn monster_sections_in_offset_order() {
    use BinarySectionType as K;

    let map = annotate_monster();
    let sections: Vec<(u64, BinarySectionType, Option<&str>)> = map
        .iter()
        .map(|(offset, s)| (offset, s.section_type, s.name.as_deref()))
        .collect();
    assert_eq!(
        sections,
        [
            (0x00, K::Header, None),
            (monster::VTABLE, K::VTable, Some("Monster")),
            (monster::TABLE, K::RootTable, Some("Monster")),
            (monster::NAME, K::String, Some("Orc")),
            (monster::INVENTORY, K::Vector, Some("Monster.inventory")),
            (0x59, K::Padding, None),
            (monster::WEAPONS, K::Vector, Some("Monster.weapons")),
            (monster::PATH, K::Vector, Some("Monster.path")),
            (monster::WEAPON_VTABLE, K::VTable, Some("Weapon")),
            (monster::SWORD, K::Table, Some("Weapon")),
            (monster::AXE, K::Table, Some("Weapon")),
            (monster::SWORD_NAME, K::String, Some("Sword")),
            (0xAE, K::Padding, None),
            (monster::AXE_NAME, K::String, Some("Axe")),
            (monster::BOW, K::Union, Some("Weapon")),
            (monster::BOW_NAME, K::String, Some("Bow")),
        ]
    );
    assert!(map.is_fully_covered());
    assert!(map.diagnostics().is_empty());
    assert_eq!(map.buffer_len(), monster::LEN);
}

#[test]
fn header_holds_root_offset_and_identifier() {
    let map = annotate_monster();
    let header = map.get(0).unwrap();
    assert_eq!(header.regions.len(), 2);
    assert_eq!(header.regions[0].region_type, BinaryRegionType::UOffset);
    assert_eq!(header.regions[0].points_to_offset, Some(monster::TABLE));
    assert_eq!(header.regions[1].region_type, BinaryRegionType::Char);
    assert_eq!(header.regions[1].array_length, Some(4));
    assert_eq!(header.regions[1].comment, "file identifier");
}

#[test]
fn identifier_detection_can_be_disabled() {
    let schema = fixtures::monster_schema().unwrap();
    let buffer = fixtures::monster_buffer().unwrap();
    let config = AnnotatorConfig {
        detect_file_identifier: false,
        ..AnnotatorConfig::default()
    };
    let map = BinaryAnnotator::annotate_with_config(&schema, &buffer, &config).unwrap();
    assert_eq!(map.get(0).unwrap().regions.len(), 1);
    // The four identifier bytes are now unclaimed.
    let gap = map.get(4).unwrap();
    assert_eq!(gap.section_type, BinarySectionType::Padding);
    assert_eq!(gap.regions[0].region_type, BinaryRegionType::Unknown);
    assert!(map.is_fully_covered());
}

// ── Monster: vtables and defaults ─────────────────────────────────────────────

#[test]
fn vtable_slots_describe_present_and_defaulted_fields() {
    let map = annotate_monster();
    let slots = comments(&map, monster::VTABLE);
    assert_eq!(slots.len(), 12);
    assert_eq!(slots[0], "size of this vtable");
    assert_eq!(slots[1], "size of referring table");
    assert_eq!(slots[2], "offset to field `pos` (id: 0)");
    assert_eq!(slots[3], "offset to field `mana` (id: 1) <defaults to 150>");
    assert_eq!(slots[9], "offset to field `equipped_type` (id: 7)");
    assert!(
        map.get(monster::VTABLE)
            .unwrap()
            .regions
            .iter()
            .all(|r| r.region_type == BinaryRegionType::VOffset)
    );
}

#[test]
fn shared_vtable_is_registered_once() {
    let map = annotate_monster();
    assert_eq!(map.sections_of(BinarySectionType::VTable).count(), 2);
    for table in [monster::SWORD, monster::AXE, monster::BOW] {
        let section = map.get(table).unwrap();
        assert_eq!(section.regions[0].region_type, BinaryRegionType::SOffset);
        assert_eq!(section.regions[0].points_to_offset, Some(monster::WEAPON_VTABLE));
    }
}

// ── Monster: root table fields ────────────────────────────────────────────────

#[test]
fn root_table_fields_in_layout_order() {
    let map = annotate_monster();
    assert_eq!(
        comments(&map, monster::TABLE),
        [
            "offset to vtable",
            "struct field `Vec3.x` (float)",
            "struct field `Vec3.y` (float)",
            "struct field `Vec3.z` (float)",
            "table field `hp` (short)",
            "table field `color` (ubyte) <Blue>",
            "table field `equipped_type` (utype) <Weapon>",
            "offset to field `name` (string)",
            "offset to field `inventory` (vector)",
            "offset to field `weapons` (vector)",
            "offset to field `equipped` (union of type `Weapon`)",
            "offset to field `path` (vector)",
        ]
    );
    let table = map.get(monster::TABLE).unwrap();
    assert_eq!(table.len(), 40);
    let equipped = table
        .regions
        .iter()
        .find(|r| r.offset == monster::EQUIPPED_FIELD)
        .unwrap();
    assert_eq!(equipped.points_to_offset, Some(monster::BOW));
}

#[test]
fn weapon_tables_close_their_trailing_padding() {
    let map = annotate_monster();
    let sword = map.get(monster::SWORD).unwrap();
    let kinds: Vec<(u64, BinaryRegionType, Option<u64>)> = sword
        .regions
        .iter()
        .map(|r| (r.offset - monster::SWORD, r.region_type, r.array_length))
        .collect();
    assert_eq!(
        kinds,
        [
            (0, BinaryRegionType::SOffset, None),
            (4, BinaryRegionType::UOffset, None),
            (8, BinaryRegionType::Int16, None),
            (10, BinaryRegionType::Uint8, Some(2)),
        ]
    );
    assert_eq!(sword.regions[3].comment, "padding");
}

// ── Monster: vectors ──────────────────────────────────────────────────────────

#[test]
fn scalar_vector_is_one_array_region() {
    let map = annotate_monster();
    let inventory = map.get(monster::INVENTORY).unwrap();
    assert_eq!(inventory.regions.len(), 2);
    assert_eq!(inventory.regions[0].comment, "length of vector (# items)");
    let items = &inventory.regions[1];
    assert_eq!(items.region_type, BinaryRegionType::Uint8);
    assert_eq!(items.array_length, Some(5));
    assert_eq!(items.comment, "items of `inventory` (ubyte)");
}

#[test]
fn table_vector_points_at_each_element() {
    let map = annotate_monster();
    let weapons = map.get(monster::WEAPONS).unwrap();
    let targets: Vec<Option<u64>> = weapons.regions[1..]
        .iter()
        .map(|r| r.points_to_offset)
        .collect();
    assert_eq!(targets, [Some(monster::SWORD), Some(monster::AXE)]);
    assert_eq!(weapons.regions[2].comment, "offset to table `Weapon` [1]");
}

#[test]
fn struct_vector_is_decoded_inline() {
    let map = annotate_monster();
    let path = map.get(monster::PATH).unwrap();
    assert_eq!(path.len(), 4 + 2 * 12);
    assert_eq!(path.regions.len(), 7);
    assert!(
        path.regions[1..]
            .iter()
            .all(|r| r.region_type == BinaryRegionType::Float)
    );
    assert_eq!(path.regions[4].comment, "struct field `Vec3.x` (float)");
    assert_eq!(path.regions[4].offset, monster::PATH + 16);
}

// ── Monster: strings and unions ───────────────────────────────────────────────

#[test]
fn strings_have_length_text_and_terminator() {
    let map = annotate_monster();
    let orc = map.get(monster::NAME).unwrap();
    let layout: Vec<(BinaryRegionType, Option<u64>)> = orc
        .regions
        .iter()
        .map(|r| (r.region_type, r.array_length))
        .collect();
    assert_eq!(
        layout,
        [
            (BinaryRegionType::Uint32, None),
            (BinaryRegionType::Char, Some(3)),
            (BinaryRegionType::Char, None),
        ]
    );
    assert_eq!(orc.regions[2].comment, "string terminator");
}

#[test]
fn union_target_is_a_union_section() {
    let map = annotate_monster();
    let bow = map.get(monster::BOW).unwrap();
    assert_eq!(bow.section_type, BinarySectionType::Union);
    assert_eq!(bow.regions[1].points_to_offset, Some(monster::BOW_NAME));
}

// ── Smaller buffers ───────────────────────────────────────────────────────────

#[test]
fn minimal_root_table() {
    let schema = fixtures::root_schema().unwrap();
    let map = BinaryAnnotator::annotate(&schema, &fixtures::hi_buffer()).unwrap();
    assert_eq!(map.len(), 5);
    assert_eq!(map.get(24).unwrap().name.as_deref(), Some("hi"));
    assert!(map.is_fully_covered());
}

#[test]
fn unknown_slots_from_a_newer_schema() {
    let schema = fixtures::root_schema().unwrap();
    let mut b = FixtureBuilder::new();
    b.uoffset("root");
    b.label("vtable").vtable_header(3, 16);
    b.slot("root", "root.value")
        .slot("root", "root.name")
        .slot("root", "root.extra");
    b.label("root").soffset("vtable");
    b.label("root.value").i32(7);
    b.label("root.name").uoffset("text");
    b.label("root.extra").u32(0xDEAD_BEEF);
    b.label("text").string("x");
    let buffer = b.finish().unwrap();

    let map = BinaryAnnotator::annotate(&schema, &buffer).unwrap();
    assert!(map.diagnostics().is_empty());
    assert!(map.is_fully_covered());

    let vtable = comments(&map, 4);
    assert_eq!(vtable[4], "offset to unknown field (id: 2)");

    let table = map.get(14).unwrap();
    let extra = table.regions.last().unwrap();
    assert_eq!(extra.offset, 26);
    assert_eq!(extra.region_type, BinaryRegionType::Unknown);
    assert_eq!(extra.array_length, Some(4));
    assert_eq!(extra.comment, "unknown field (id: 2) <possibly an offset>");
}

#[test]
fn deprecated_field_is_left_untyped() {
    let mut builder = SchemaBuilder::new();
    let root = builder.table("Root");
    builder
        .field(root, "value", Type::scalar(BaseType::Int))
        .deprecated = true;
    builder.field(root, "name", Type::string());
    builder.root(root);
    let schema = builder.build().unwrap();

    let map = BinaryAnnotator::annotate(&schema, &fixtures::hi_buffer()).unwrap();
    assert_eq!(
        comments(&map, 4)[2],
        "offset to deprecated field `value` (id: 0)"
    );
    let table = map.get(12).unwrap();
    assert!(
        table
            .regions
            .iter()
            .all(|r| r.region_type != BinaryRegionType::Int32)
    );
    assert!(map.diagnostics().is_empty());
    assert!(map.is_fully_covered());
}

#[test]
fn union_of_struct_wraps_the_struct() {
    let mut builder = SchemaBuilder::new();
    let point = builder.structure("Point");
    builder.field(point, "x", Type::scalar(BaseType::Int));
    builder.field(point, "y", Type::scalar(BaseType::Int));
    let shape = builder.union("Shape", &[("Point", Type::object(point))]);
    let root = builder.table("Root");
    builder.field(root, "shape", Type::union(shape));
    builder.root(root);
    let schema = builder.build().unwrap();

    let mut b = FixtureBuilder::new();
    b.uoffset("root");
    b.label("vtable").vtable_header(2, 12);
    b.slot("root", "root.shape_type").slot("root", "root.shape");
    b.label("root").soffset("vtable");
    b.label("root.shape").uoffset("point");
    b.label("root.shape_type").u8(1).zeros(3);
    b.label("point").i32(-3).i32(4);
    let buffer = b.finish().unwrap();

    let map = BinaryAnnotator::annotate(&schema, &buffer).unwrap();
    assert!(map.diagnostics().is_empty());
    let point = map.get(24).unwrap();
    assert_eq!(point.section_type, BinarySectionType::Union);
    assert_eq!(point.name.as_deref(), Some("Point"));
    assert_eq!(point.regions.len(), 2);
    assert!(map.is_fully_covered());
}

#[test]
fn shared_string_is_registered_once() {
    let mut builder = SchemaBuilder::new();
    let root = builder.table("Root");
    builder.field(root, "title", Type::string());
    builder.field(root, "subtitle", Type::string());
    builder.root(root);
    let schema = builder.build().unwrap();

    let mut b = FixtureBuilder::new();
    b.uoffset("root");
    b.label("vtable").vtable_header(2, 12);
    b.slot("root", "root.title").slot("root", "root.subtitle");
    b.label("root").soffset("vtable");
    b.label("root.title").uoffset("text");
    b.label("root.subtitle").uoffset("text");
    b.label("text").string("shared");
    let buffer = b.finish().unwrap();

    let map = BinaryAnnotator::annotate(&schema, &buffer).unwrap();
    assert!(map.diagnostics().is_empty());
    assert!(map.is_fully_covered());
    assert_eq!(map.sections_of(BinarySectionType::String).count(), 1);
    assert_eq!(map.get(24).unwrap().name.as_deref(), Some("shared"));

    let targets: Vec<Option<u64>> = map
        .get(12)
        .unwrap()
        .regions
        .iter()
        .map(|r| r.points_to_offset)
        .collect();
    assert_eq!(targets, [Some(4), Some(24), Some(24)]);
}

#[test]
fn int_vector_is_one_array_region() {
    let mut builder = SchemaBuilder::new();
    let root = builder.table("Root");
    builder.field(root, "values", Type::vector_of(BaseType::Int));
    builder.root(root);
    let schema = builder.build().unwrap();

    let mut b = FixtureBuilder::new();
    b.uoffset("root");
    b.label("vtable").vtable_header(1, 8).slot("root", "root.values");
    b.label("root").soffset("vtable");
    b.label("root.values").uoffset("values");
    b.align(4);
    b.label("values").u32(3).i32(1).i32(-2).i32(300);
    let buffer = b.finish().unwrap();

    let map = BinaryAnnotator::annotate(&schema, &buffer).unwrap();
    assert!(map.diagnostics().is_empty());
    assert!(map.is_fully_covered());

    let values = map.get(20).unwrap();
    assert_eq!(values.section_type, BinarySectionType::Vector);
    assert_eq!(values.regions.len(), 2);
    let items = &values.regions[1];
    assert_eq!(items.offset, 24);
    assert_eq!(items.region_type, BinaryRegionType::Int32);
    assert_eq!(items.array_length, Some(3));
    assert_eq!(items.length, 12);
    assert_eq!(items.comment, "items of `values` (int)");
}

#[test]
fn string_vector_points_at_each_string() {
    let mut builder = SchemaBuilder::new();
    let root = builder.table("Root");
    builder.field(root, "tags", Type::vector_of(BaseType::String));
    builder.root(root);
    let schema = builder.build().unwrap();

    let mut b = FixtureBuilder::new();
    b.uoffset("root");
    b.label("vtable").vtable_header(1, 8).slot("root", "root.tags");
    b.label("root").soffset("vtable");
    b.label("root.tags").uoffset("tags");
    b.align(4);
    b.label("tags").u32(2).uoffset("red").uoffset("blue");
    b.label("red").string("red");
    b.label("blue").string("blue");
    let buffer = b.finish().unwrap();

    let map = BinaryAnnotator::annotate(&schema, &buffer).unwrap();
    assert!(map.diagnostics().is_empty());
    assert!(map.is_fully_covered());

    let tags = map.get(20).unwrap();
    let elements: Vec<(Option<u64>, &str)> = tags.regions[1..]
        .iter()
        .map(|r| (r.points_to_offset, r.comment.as_str()))
        .collect();
    assert_eq!(
        elements,
        [
            (Some(32), "offset to string [0]"),
            (Some(40), "offset to string [1]"),
        ]
    );
    assert_eq!(map.get(32).unwrap().name.as_deref(), Some("red"));
    assert_eq!(map.get(40).unwrap().name.as_deref(), Some("blue"));
}

#[test]
fn struct_arrays_are_laid_out_inline() {
    let mut builder = SchemaBuilder::new();
    let pair = builder.structure("Pair");
    builder.field(pair, "a", Type::scalar(BaseType::Short));
    builder.field(pair, "b", Type::scalar(BaseType::Short));
    let grid = builder.structure("Grid");
    builder.field(grid, "cells", Type::array_of(BaseType::UByte, 3));
    builder.field(grid, "pairs", Type::array_of_structs(pair, 2));
    let root = builder.table("Root");
    builder.field(root, "grid", Type::object(grid));
    builder.root(root);
    let schema = builder.build().unwrap();

    let mut b = FixtureBuilder::new();
    b.uoffset("root");
    b.label("vtable").vtable_header(1, 16).slot("root", "root.grid");
    b.align(4);
    b.label("root").soffset("vtable");
    b.label("root.grid").bytes(&[1, 2, 3]).zeros(1);
    b.i16(10).i16(20).i16(30).i16(40);
    let buffer = b.finish().unwrap();

    let map = BinaryAnnotator::annotate(&schema, &buffer).unwrap();
    assert!(map.diagnostics().is_empty());
    assert!(map.is_fully_covered());

    let table = map.get(12).unwrap();
    let layout: Vec<(u64, BinaryRegionType, Option<u64>, &str)> = table
        .regions
        .iter()
        .map(|r| (r.offset, r.region_type, r.array_length, r.comment.as_str()))
        .collect();
    assert_eq!(
        layout,
        [
            (12, BinaryRegionType::SOffset, None, "offset to vtable"),
            (16, BinaryRegionType::Uint8, Some(3), "array field `Grid.cells` (ubyte[3])"),
            (19, BinaryRegionType::Uint8, Some(1), "padding"),
            (20, BinaryRegionType::Int16, None, "struct field `Pair.a` (short)"),
            (22, BinaryRegionType::Int16, None, "struct field `Pair.b` (short)"),
            (24, BinaryRegionType::Int16, None, "struct field `Pair.a` (short)"),
            (26, BinaryRegionType::Int16, None, "struct field `Pair.b` (short)"),
        ]
    );
}

// ── Inbox: unions in vectors and string variants ──────────────────────────────

#[test]
fn inbox_sections_in_offset_order() {
    use BinarySectionType as K;

    let schema = fixtures::inbox_schema().unwrap();
    let buffer = fixtures::inbox_buffer().unwrap();
    let map = BinaryAnnotator::annotate(&schema, &buffer).unwrap();
    let sections: Vec<(u64, BinarySectionType, Option<&str>)> = map
        .iter()
        .map(|(offset, s)| (offset, s.section_type, s.name.as_deref()))
        .collect();
    assert_eq!(
        sections,
        [
            (0x00, K::Header, None),
            (inbox::VTABLE, K::VTable, Some("Inbox")),
            (inbox::TABLE, K::RootTable, Some("Inbox")),
            (inbox::ITEMS_TYPE, K::Vector, Some("Inbox.items_type")),
            (0x1E, K::Padding, None),
            (inbox::ITEMS, K::Vector, Some("Inbox.items")),
            (inbox::TAG_VTABLE, K::VTable, Some("Tag")),
            (inbox::TAG, K::Union, Some("Tag")),
            (0x3A, K::Padding, None),
            (inbox::NOTE, K::String, Some("note")),
        ]
    );
    assert!(map.diagnostics().is_empty());
    assert!(map.is_fully_covered());
    assert_eq!(map.buffer_len(), inbox::LEN);
}

#[test]
fn union_vector_follows_its_discriminant_vector() {
    let schema = fixtures::inbox_schema().unwrap();
    let buffer = fixtures::inbox_buffer().unwrap();
    let map = BinaryAnnotator::annotate(&schema, &buffer).unwrap();

    let items = map.get(inbox::ITEMS).unwrap();
    let elements: Vec<(Option<u64>, &str)> = items.regions[1..]
        .iter()
        .map(|r| (r.points_to_offset, r.comment.as_str()))
        .collect();
    assert_eq!(
        elements,
        [
            (Some(inbox::TAG), "offset to union [0] (`Tag`)"),
            (Some(inbox::NOTE), "offset to union [1] (`Text`)"),
        ]
    );

    let types = map.get(inbox::ITEMS_TYPE).unwrap();
    assert_eq!(types.regions[1].region_type, BinaryRegionType::Uint8);
    assert_eq!(types.regions[1].array_length, Some(2));
}

#[test]
fn union_with_a_string_variant() {
    let schema = {
        let mut builder = SchemaBuilder::new();
        let tag = builder.table("Tag");
        builder.field(tag, "id", Type::scalar(BaseType::Short));
        let item = builder.union("Item", &[("Tag", Type::object(tag)), ("Text", Type::string())]);
        let root = builder.table("Root");
        builder.field(root, "payload", Type::union(item));
        builder.root(root);
        builder.build().unwrap()
    };

    let mut b = FixtureBuilder::new();
    b.uoffset("root");
    b.label("vtable").vtable_header(2, 12);
    b.slot("root", "root.payload_type").slot("root", "root.payload");
    b.label("root").soffset("vtable");
    b.label("root.payload").uoffset("text");
    b.label("root.payload_type").u8(2).zeros(3);
    b.label("text").string("note");
    let buffer = b.finish().unwrap();

    let map = BinaryAnnotator::annotate(&schema, &buffer).unwrap();
    assert!(map.diagnostics().is_empty());
    assert!(map.is_fully_covered());

    let text = map.get(24).unwrap();
    assert_eq!(text.section_type, BinarySectionType::String);
    assert_eq!(text.name.as_deref(), Some("note"));

    let table = map.get(12).unwrap();
    assert_eq!(table.regions[1].points_to_offset, Some(24));
    assert_eq!(
        table.regions[1].comment,
        "offset to field `payload` (union of type `Text`)"
    );
    assert_eq!(
        table.regions[2].comment,
        "table field `payload_type` (utype) <Text>"
    );
}
