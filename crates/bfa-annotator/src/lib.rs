#![warn(clippy::pedantic)]

pub mod annotator;
pub mod config;
pub mod error;
pub mod map;
pub mod region;

mod padding;
mod string;
mod table;
mod union;
mod vector;
mod vtable;

pub use annotator::BinaryAnnotator;
pub use config::AnnotatorConfig;
pub use error::AnnotateError;
pub use map::AnnotationMap;
pub use region::{BinaryRegion, BinaryRegionType, BinarySection, BinarySectionType};
