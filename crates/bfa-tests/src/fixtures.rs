//! Canonical schemas and buffers.
//!
//! # `Monster` layout
//!
//! ```text
//! 0x00  header           root offset → 0x20, identifier "MONS"
//! 0x08  vtable Monster   10 slots, table size 40
//! 0x20  root_table       pos, hp, color, equipped_type, 5 offsets
//! 0x48  string "Orc"
//! 0x50  vector inventory [ubyte; 5]    (3 bytes padding follow)
//! 0x5C  vector weapons   [Weapon; 2]
//! 0x68  vector path      [Vec3; 2]
//! 0x84  vtable Weapon    shared by all three weapon tables
//! 0x8C  table Weapon     "Sword"
//! 0x98  table Weapon     "Axe"
//! 0xA4  string "Sword"   (2 bytes padding follow)
//! 0xB0  string "Axe"
//! 0xB8  union Weapon     "Bow", reached through `equipped`
//! 0xC4  string "Bow"
//! ```
//!
//! # `Inbox` layout
//!
//! ```text
//! 0x00  header           root offset → 0x0C
//! 0x04  vtable Inbox     2 slots, table size 12
//! 0x0C  root_table       items_type, items
//! 0x18  vector items_type [utype; 2] = Tag, Text  (2 bytes padding follow)
//! 0x20  vector items     [Item; 2]
//! 0x2C  vtable Tag
//! 0x32  union Tag        id = 7                  (2 bytes padding follow)
//! 0x3C  string "note"    the `Text` variant of items[1]
//! ```

use bfa_schema::{BaseType, Schema, SchemaBuilder, SchemaError, Type};

use crate::builder::{FixtureBuilder, FixtureError};

/// Buffer offsets of the `Monster` fixture.
pub mod monster {
    pub const LEN: u64 = 0xCC;
    pub const VTABLE: u64 = 0x08;
    pub const TABLE: u64 = 0x20;
    pub const NAME_FIELD: u64 = 0x34;
    pub const COLOR_FIELD: u64 = 0x32;
    pub const EQUIPPED_TYPE_FIELD: u64 = 0x33;
    pub const EQUIPPED_FIELD: u64 = 0x40;
    pub const PATH_FIELD: u64 = 0x44;
    pub const NAME: u64 = 0x48;
    pub const INVENTORY: u64 = 0x50;
    pub const WEAPONS: u64 = 0x5C;
    pub const PATH: u64 = 0x68;
    pub const WEAPON_VTABLE: u64 = 0x84;
    pub const SWORD: u64 = 0x8C;
    pub const AXE: u64 = 0x98;
    pub const SWORD_NAME: u64 = 0xA4;
    pub const AXE_NAME: u64 = 0xB0;
    pub const BOW: u64 = 0xB8;
    pub const BOW_NAME: u64 = 0xC4;
}

/// Buffer offsets of the `Inbox` fixture.
pub mod inbox {
    pub const LEN: u64 = 0x45;
    pub const VTABLE: u64 = 0x04;
    pub const TABLE: u64 = 0x0C;
    pub const ITEMS_TYPE_FIELD: u64 = 0x10;
    pub const ITEMS_FIELD: u64 = 0x14;
    pub const ITEMS_TYPE: u64 = 0x18;
    pub const ITEMS: u64 = 0x20;
    pub const TAG_VTABLE: u64 = 0x2C;
    pub const TAG: u64 = 0x32;
    pub const NOTE: u64 = 0x3C;
}

/// `Root { value: int (id 0), name: string (id 1) }`
///
/// # Errors
///
/// Never fails; the result type follows [`SchemaBuilder::build`].
pub fn root_schema() -> Result<Schema, SchemaError> {
    let mut b = SchemaBuilder::new();
    let root = b.table("Root");
    b.field(root, "value", Type::scalar(BaseType::Int));
    b.field(root, "name", Type::string());
    b.root(root);
    b.build()
}

/// A 32-byte `Root { value: 42, name: "hi" }`, one trailing padding byte.
#[rustfmt::skip]
#[must_use]
pub fn hi_buffer() -> Vec<u8> {
    vec![
        12, 0, 0, 0,                 // root offset → 12
        8, 0, 12, 0, 8, 0, 4, 0,     // vtable: size 8, table 12, value +8, name +4
        8, 0, 0, 0,                  // soffset → vtable at 4
        8, 0, 0, 0,                  // name → 24
        42, 0, 0, 0,                 // value
        2, 0, 0, 0, b'h', b'i', 0,   // "hi"
        0,                           // padding
    ]
}

/// The `Monster` schema:
///
/// ```text
/// struct Vec3 { x: float; y: float; z: float; }
/// enum Color : ubyte { Red, Green, Blue }
/// table Weapon { name: string; damage: short; }
/// union Equipment { Weapon }
/// table Monster {
///   pos: Vec3;            // 0
///   mana: short = 150;    // 1
///   hp: short = 100;      // 2
///   name: string;         // 3
///   inventory: [ubyte];   // 4
///   color: Color = Blue;  // 5
///   weapons: [Weapon];    // 6
///   equipped: Equipment;  // 7 (type), 8
///   path: [Vec3];         // 9
/// }
/// root_type Monster;
/// file_identifier "MONS";
/// ```
///
/// # Errors
///
/// Never fails; the result type follows [`SchemaBuilder::build`].
pub fn monster_schema() -> Result<Schema, SchemaError> {
    let mut b = SchemaBuilder::new();
    let vec3 = b.structure("Vec3");
    for axis in ["x", "y", "z"] {
        b.field(vec3, axis, Type::scalar(BaseType::Float));
    }
    let color = b.enumeration(
        "Color",
        BaseType::UByte,
        &[("Red", 0), ("Green", 1), ("Blue", 2)],
    );

    let weapon = b.table("Weapon");
    b.field(weapon, "name", Type::string());
    b.field(weapon, "damage", Type::scalar(BaseType::Short));
    let equipment = b.union("Equipment", &[("Weapon", Type::object(weapon))]);

    let monster = b.table("Monster");
    b.field(monster, "pos", Type::object(vec3));
    b.field(monster, "mana", Type::scalar(BaseType::Short)).default_integer = 150;
    b.field(monster, "hp", Type::scalar(BaseType::Short)).default_integer = 100;
    b.field(monster, "name", Type::string());
    b.field(monster, "inventory", Type::vector_of(BaseType::UByte));
    b.field(monster, "color", Type::enum_scalar(BaseType::UByte, color)).default_integer = 2;
    b.field(monster, "weapons", Type::vector_of_objects(weapon));
    b.field(monster, "equipped", Type::union(equipment));
    b.field(monster, "path", Type::vector_of_objects(vec3));
    b.root(monster).file_identifier("MONS");
    b.build()
}

/// A well-formed `Monster` with every field kind present except `mana`.
/// See the module docs for the layout.
///
/// # Errors
///
/// Never fails; the result type follows [`FixtureBuilder::finish`].
pub fn monster_buffer() -> Result<Vec<u8>, FixtureError> {
    let mut b = FixtureBuilder::new();
    b.uoffset("monster").bytes(b"MONS");

    b.label("monster.vtable").vtable_header(10, 40);
    b.slot("monster", "monster.pos")
        .absent()
        .slot("monster", "monster.hp")
        .slot("monster", "monster.name")
        .slot("monster", "monster.inventory")
        .slot("monster", "monster.color")
        .slot("monster", "monster.weapons")
        .slot("monster", "monster.equipped_type")
        .slot("monster", "monster.equipped")
        .slot("monster", "monster.path");

    b.label("monster").soffset("monster.vtable");
    b.label("monster.pos").f32(1.0).f32(2.0).f32(3.0);
    b.label("monster.hp").i16(300);
    b.label("monster.color").u8(2);
    b.label("monster.equipped_type").u8(1);
    b.label("monster.name").uoffset("orc");
    b.label("monster.inventory").uoffset("inventory");
    b.label("monster.weapons").uoffset("weapons");
    b.label("monster.equipped").uoffset("bow");
    b.label("monster.path").uoffset("path");

    b.label("orc").string("Orc");
    b.label("inventory").u32(5).bytes(&[0, 1, 2, 3, 4]).align(4);
    b.label("weapons").u32(2).uoffset("sword").uoffset("axe");
    b.label("path").u32(2);
    for value in [1.0, 2.0, 3.0, 4.0, 5.0, 6.0] {
        b.f32(value);
    }

    b.label("weapon.vtable").vtable_header(2, 12);
    b.slot("sword", "sword.name").slot("sword", "sword.damage");
    weapon(&mut b, "sword", 3);
    weapon(&mut b, "axe", 5);
    b.label("sword.text").string("Sword").align(4);
    b.label("axe.text").string("Axe");
    weapon(&mut b, "bow", 7);
    b.label("bow.text").string("Bow");
    b.finish()
}

/// The `Inbox` schema:
///
/// ```text
/// table Tag { id: short; }
/// union Item { Tag, Text: string }
/// table Inbox {
///   items: [Item];        // 0 (type), 1
/// }
/// root_type Inbox;
/// ```
///
/// # Errors
///
/// Never fails; the result type follows [`SchemaBuilder::build`].
pub fn inbox_schema() -> Result<Schema, SchemaError> {
    let mut b = SchemaBuilder::new();
    let tag = b.table("Tag");
    b.field(tag, "id", Type::scalar(BaseType::Short));
    let item = b.union("Item", &[("Tag", Type::object(tag)), ("Text", Type::string())]);
    let inbox = b.table("Inbox");
    b.field(inbox, "items", Type::vector_of_unions(item));
    b.root(inbox);
    b.build()
}

/// An `Inbox` holding a `Tag` and a `Text`. See the module docs for the
/// layout.
///
/// # Errors
///
/// Never fails; the result type follows [`FixtureBuilder::finish`].
pub fn inbox_buffer() -> Result<Vec<u8>, FixtureError> {
    let mut b = FixtureBuilder::new();
    b.uoffset("inbox");
    b.label("inbox.vtable").vtable_header(2, 12);
    b.slot("inbox", "inbox.items_type").slot("inbox", "inbox.items");
    b.label("inbox").soffset("inbox.vtable");
    b.label("inbox.items_type").uoffset("items_type");
    b.label("inbox.items").uoffset("items");

    b.label("items_type").u32(2).u8(1).u8(2).align(4);
    b.label("items").u32(2).uoffset("tag").uoffset("note");

    b.label("tag.vtable").vtable_header(1, 8).slot("tag", "tag.id");
    b.label("tag").soffset("tag.vtable");
    b.label("tag.id").i16(7).zeros(2).align(4);
    b.label("note").string("note");
    b.finish()
}

/// A 12-byte `Weapon` table using the shared weapon vtable.
fn weapon(b: &mut FixtureBuilder, name: &str, damage: i16) {
    b.label(name).soffset("weapon.vtable");
    b.label(&format!("{name}.name")).uoffset(&format!("{name}.text"));
    b.label(&format!("{name}.damage")).i16(damage).zeros(2);
}
