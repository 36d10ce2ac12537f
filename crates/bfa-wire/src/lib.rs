#![warn(clippy::pedantic)]

pub mod error;
pub mod header;
pub mod read;

pub use error::WireError;
pub use header::RootHeader;
pub use read::{ByteReader, Scalar};
