//! `[Content_Types].xml` handling.

use crate::opc::part_name::extension_of;
use crate::xml::XmlElement;
use carousel_core::{Error, Result};

const NS_CONTENT_TYPES: &str = "http://schemas.openxmlformats.org/package/2006/content-types";

/// Content type of slide parts.
pub const SLIDE: &str = "application/vnd.openxmlformats-officedocument.presentationml.slide+xml";

/// Content type for an image file extension.
pub fn image_content_type(ext: &str) -> Option<&'static str> {
    match ext.to_lowercase().as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "bmp" => Some("image/bmp"),
        "tif" | "tiff" => Some("image/tiff"),
        "svg" => Some("image/svg+xml"),
        "emf" => Some("image/x-emf"),
        "wmf" => Some("image/x-wmf"),
        _ => None,
    }
}

/// Content type declarations of a package, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentTypes {
    /// Extension (lower-case) to content type.
    defaults: Vec<(String, String)>,
    /// Part name to content type.
    overrides: Vec<(String, String)>,
}

impl ContentTypes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `[Content_Types].xml`.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let root = XmlElement::parse_bytes(data)?;
        let mut ct = Self::new();

        for el in root.elements() {
            let content_type = el.attr("ContentType").ok_or_else(|| {
                Error::PptxParseError(format!("<{}> without ContentType", el.name))
            })?;
            match el.local_name() {
                "Default" => {
                    if let Some(ext) = el.attr("Extension") {
                        ct.add_default(ext, content_type);
                    }
                }
                "Override" => {
                    if let Some(part_name) = el.attr("PartName") {
                        ct.add_override(part_name, content_type);
                    }
                }
                _ => {}
            }
        }

        Ok(ct)
    }

    /// Serialize `[Content_Types].xml`.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut root = XmlElement::new("Types").with_attr("xmlns", NS_CONTENT_TYPES);
        for (ext, content_type) in &self.defaults {
            root = root.with_child(
                XmlElement::new("Default")
                    .with_attr("Extension", ext.as_str())
                    .with_attr("ContentType", content_type.as_str()),
            );
        }
        for (part_name, content_type) in &self.overrides {
            root = root.with_child(
                XmlElement::new("Override")
                    .with_attr("PartName", part_name.as_str())
                    .with_attr("ContentType", content_type.as_str()),
            );
        }
        root.to_document()
    }

    /// Content type of a part: its override, else its extension default.
    pub fn get(&self, part_name: &str) -> Option<&str> {
        self.override_for(part_name).or_else(|| {
            let ext = extension_of(part_name)?;
            self.default_for(&ext)
        })
    }

    /// The override registered for a part, if any.
    pub fn override_for(&self, part_name: &str) -> Option<&str> {
        self.overrides
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(part_name))
            .map(|(_, ct)| ct.as_str())
    }

    /// The default registered for an extension, if any.
    pub fn default_for(&self, ext: &str) -> Option<&str> {
        self.defaults
            .iter()
            .find(|(e, _)| e.eq_ignore_ascii_case(ext))
            .map(|(_, ct)| ct.as_str())
    }

    /// Register an extension default, replacing an existing one.
    pub fn add_default(&mut self, ext: &str, content_type: &str) {
        let ext = ext.to_lowercase();
        match self.defaults.iter_mut().find(|(e, _)| *e == ext) {
            Some(slot) => slot.1 = content_type.to_string(),
            None => self.defaults.push((ext, content_type.to_string())),
        }
    }

    /// Register an override, replacing an existing one.
    pub fn add_override(&mut self, part_name: &str, content_type: &str) {
        match self
            .overrides
            .iter_mut()
            .find(|(name, _)| name.eq_ignore_ascii_case(part_name))
        {
            Some(slot) => slot.1 = content_type.to_string(),
            None => self
                .overrides
                .push((part_name.to_string(), content_type.to_string())),
        }
    }

    /// Remove the override of a part.
    pub fn remove_override(&mut self, part_name: &str) -> Option<String> {
        let pos = self
            .overrides
            .iter()
            .position(|(name, _)| name.eq_ignore_ascii_case(part_name))?;
        Some(self.overrides.remove(pos).1)
    }

    /// Declare a part's content type with the least markup: rely on the
    /// extension default when it already matches, otherwise add an override.
    pub fn declare(&mut self, part_name: &str, content_type: &str) {
        let default_matches = extension_of(part_name)
            .and_then(|ext| self.default_for(&ext))
            .is_some_and(|ct| ct == content_type);
        if default_matches {
            self.remove_override(part_name);
        } else {
            self.add_override(part_name, content_type);
        }
    }
}
