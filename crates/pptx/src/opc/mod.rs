//! Open Packaging Conventions: parts, relationships and content types.

pub mod content_types;
pub mod package;
pub mod part_name;
pub mod relationships;

pub use content_types::ContentTypes;
pub use package::{Package, Part};
pub use relationships::{rel_types, Relationship, Relationships};
