//! Relationship parts (`*.rels`).

use crate::opc::part_name::trailing_number;
use crate::xml::XmlElement;
use carousel_core::{Error, Result};

const NS_RELATIONSHIPS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";

/// Well-known relationship types.
pub mod rel_types {
    pub const OFFICE_DOCUMENT: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
    pub const SLIDE: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide";
    pub const SLIDE_LAYOUT: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout";
    pub const SLIDE_MASTER: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster";
    pub const NOTES_SLIDE: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/notesSlide";
    pub const NOTES_MASTER: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/notesMaster";
    pub const IMAGE: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";
}

/// A single relationship.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    /// Relationship ID (e.g., "rId1").
    pub id: String,
    /// Relationship type URI.
    pub rel_type: String,
    /// Target as written: relative part name or external URI.
    pub target: String,
    /// Whether the target lives outside the package.
    pub external: bool,
}

/// Relationships of one source, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Relationships {
    items: Vec<Relationship>,
}

impl Relationships {
    /// Create empty relationships.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a `.rels` part.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let root = XmlElement::parse_bytes(data)?;
        let mut rels = Self::new();

        for el in root.elements().filter(|e| e.is("Relationship")) {
            let attr = |name: &str| {
                el.attr(name).map(str::to_string).ok_or_else(|| {
                    Error::PptxParseError(format!("Relationship without {} attribute", name))
                })
            };
            rels.items.push(Relationship {
                id: attr("Id")?,
                rel_type: attr("Type")?,
                target: attr("Target")?,
                external: el.attr("TargetMode") == Some("External"),
            });
        }

        Ok(rels)
    }

    /// Serialize as a `.rels` part.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut root = XmlElement::new("Relationships").with_attr("xmlns", NS_RELATIONSHIPS);
        for rel in &self.items {
            let mut el = XmlElement::new("Relationship")
                .with_attr("Id", rel.id.as_str())
                .with_attr("Type", rel.rel_type.as_str())
                .with_attr("Target", rel.target.as_str());
            if rel.external {
                el = el.with_attr("TargetMode", "External");
            }
            root = root.with_child(el);
        }
        root.to_document()
    }

    /// Get a relationship by ID.
    pub fn get(&self, id: &str) -> Option<&Relationship> {
        self.items.iter().find(|r| r.id == id)
    }

    /// Get a relationship by type (returns first match).
    pub fn by_type(&self, rel_type: &str) -> Option<&Relationship> {
        self.items.iter().find(|r| r.rel_type == rel_type)
    }

    /// Get all relationships of a given type.
    pub fn all_by_type<'a>(&'a self, rel_type: &'a str) -> impl Iterator<Item = &'a Relationship> {
        self.items.iter().filter(move |r| r.rel_type == rel_type)
    }

    /// Add an internal relationship with a fresh ID.
    pub fn add(&mut self, rel_type: &str, target: &str) -> String {
        let id = self.next_id();
        self.add_with_id(&id, rel_type, target, false);
        id
    }

    /// Add an external relationship with a fresh ID.
    pub fn add_external(&mut self, rel_type: &str, target: &str) -> String {
        let id = self.next_id();
        self.add_with_id(&id, rel_type, target, true);
        id
    }

    /// Add a relationship with a specific ID, replacing one with the same ID.
    pub fn add_with_id(&mut self, id: &str, rel_type: &str, target: &str, external: bool) {
        self.items.retain(|r| r.id != id);
        self.items.push(Relationship {
            id: id.to_string(),
            rel_type: rel_type.to_string(),
            target: target.to_string(),
            external,
        });
    }

    /// Remove a relationship by ID.
    pub fn remove(&mut self, id: &str) -> Option<Relationship> {
        let pos = self.items.iter().position(|r| r.id == id)?;
        Some(self.items.remove(pos))
    }

    /// Iterate over all relationships.
    pub fn iter(&self) -> impl Iterator<Item = &Relationship> {
        self.items.iter()
    }

    /// Number of relationships.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Next unused `rIdN`.
    pub fn next_id(&self) -> String {
        let max = self
            .items
            .iter()
            .filter(|r| r.id.starts_with("rId"))
            .filter_map(|r| trailing_number(&r.id))
            .max()
            .unwrap_or(0);
        format!("rId{}", max + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/image" Target="../media/image1.png"/><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout" Target="../slideLayouts/slideLayout2.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink" Target="https://example.com/?a=1&amp;b=2" TargetMode="External"/></Relationships>"#;

    #[test]
    fn test_parse() {
        let rels = Relationships::from_bytes(RELS.as_bytes()).unwrap();
        assert_eq!(rels.len(), 3);
        assert_eq!(
            rels.by_type(rel_types::SLIDE_LAYOUT).unwrap().target,
            "../slideLayouts/slideLayout2.xml"
        );
        let link = rels.get("rId2").unwrap();
        assert!(link.external);
        assert_eq!(link.target, "https://example.com/?a=1&b=2");
    }

    #[test]
    fn test_next_id_and_add() {
        let mut rels = Relationships::from_bytes(RELS.as_bytes()).unwrap();
        assert_eq!(rels.next_id(), "rId4");
        let id = rels.add(rel_types::IMAGE, "../media/image2.png");
        assert_eq!(id, "rId4");
        assert_eq!(rels.all_by_type(rel_types::IMAGE).count(), 2);
        assert!(rels.remove("rId3").is_some());
        assert_eq!(rels.len(), 3);
    }

    #[test]
    fn test_roundtrip_keeps_order() {
        let rels = Relationships::from_bytes(RELS.as_bytes()).unwrap();
        let again = Relationships::from_bytes(&rels.to_bytes().unwrap()).unwrap();
        assert_eq!(rels, again);
        let ids: Vec<&str> = again.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["rId3", "rId1", "rId2"]);
    }

    #[test]
    fn test_empty() {
        let rels = Relationships::new();
        assert!(rels.is_empty());
        assert_eq!(rels.next_id(), "rId1");
    }
}
