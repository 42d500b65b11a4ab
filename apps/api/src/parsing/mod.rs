//! Section Parser and Header Name Extractor.

pub mod handlers;
pub mod name;
pub mod sections;

pub use name::extract_name;
pub use sections::{parse, ContentItem, ContentKind, Section, SectionModel};
