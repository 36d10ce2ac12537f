#![warn(clippy::pedantic)]

pub mod base_type;
pub mod builder;
pub mod error;
pub mod schema;

pub use base_type::BaseType;
pub use builder::SchemaBuilder;
pub use error::SchemaError;
pub use schema::{Enum, EnumId, EnumVal, Field, Object, ObjectId, Schema, Type};
