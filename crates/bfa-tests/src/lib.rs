//! Test support for the BFA workspace.
//!
//! [`FixtureBuilder`] lays buffers out byte by byte with named positions,
//! so a test can state where every table, vtable and string lives. The
//! [`fixtures`] module holds the canonical schemas and buffers shared by
//! the integration tests, the benchmarks and the fuzz target.

pub mod builder;
pub mod fixtures;

pub use builder::{FixtureBuilder, FixtureError};
