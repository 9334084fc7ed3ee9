//! OPC package: the ZIP container behind a `.pptx` file.

use crate::opc::content_types::ContentTypes;
use crate::opc::part_name::{resolve, source_of_rels, rels_part_for};
use crate::opc::relationships::{rel_types, Relationship, Relationships};
use crate::xml::XmlElement;
use carousel_core::{Error, Result};
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek, Write};
use std::path::Path;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

const CONTENT_TYPES_ENTRY: &str = "[Content_Types].xml";
const PACKAGE_RELS_ENTRY: &str = "_rels/.rels";

fn zip_err(e: impl std::fmt::Display) -> Error {
    Error::ZipError(e.to_string())
}

/// One part of the package.
#[derive(Debug, Clone, PartialEq)]
pub struct Part {
    name: String,
    content_type: String,
    data: Vec<u8>,
    rels: Relationships,
}

impl Part {
    pub fn new(name: impl Into<String>, content_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            data,
            rels: Relationships::new(),
        }
    }

    /// Absolute part name, e.g. `/ppt/slides/slide1.xml`.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn set_data(&mut self, data: Vec<u8>) {
        self.data = data;
    }

    pub fn rels(&self) -> &Relationships {
        &self.rels
    }

    pub fn rels_mut(&mut self) -> &mut Relationships {
        &mut self.rels
    }

    pub fn set_rels(&mut self, rels: Relationships) {
        self.rels = rels;
    }

    /// Parse the part as XML.
    pub fn xml(&self) -> Result<XmlElement> {
        XmlElement::parse_bytes(&self.data)
            .map_err(|e| Error::XmlError(format!("{}: {}", self.name, e)))
    }

    /// Replace the part data with serialized XML.
    pub fn set_xml(&mut self, root: &XmlElement) -> Result<()> {
        self.data = root.to_document()?;
        Ok(())
    }

    /// Absolute part name targeted by an internal relationship of this part.
    pub fn target_of(&self, rel: &Relationship) -> Option<String> {
        if rel.external {
            None
        } else {
            Some(resolve(&self.name, &rel.target))
        }
    }
}

/// A presentation package held fully in memory.
#[derive(Debug, Clone, Default)]
pub struct Package {
    parts: BTreeMap<String, Part>,
    rels: Relationships,
    content_types: ContentTypes,
}

impl Package {
    /// Open a package from a file path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    /// Open a package from bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::from_reader(Cursor::new(bytes))
    }

    /// Open a package from a reader.
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        let mut archive = ZipArchive::new(reader)
            .map_err(|e| Error::ZipError(format!("Failed to open ZIP: {}", e)))?;

        let mut entries: Vec<(String, Vec<u8>)> = Vec::with_capacity(archive.len());
        for i in 0..archive.len() {
            let mut file = archive.by_index(i).map_err(zip_err)?;
            if file.is_dir() {
                continue;
            }
            let name = file.name().to_string();
            let mut data = Vec::new();
            file.read_to_end(&mut data)
                .map_err(|e| Error::ZipError(format!("Failed to read '{}': {}", name, e)))?;
            entries.push((name, data));
        }

        let content_types = entries
            .iter()
            .find(|(name, _)| name == CONTENT_TYPES_ENTRY)
            .map(|(_, data)| ContentTypes::from_bytes(data))
            .transpose()?
            .ok_or_else(|| Error::MissingPart(CONTENT_TYPES_ENTRY.into()))?;

        let mut package = Self {
            parts: BTreeMap::new(),
            rels: Relationships::new(),
            content_types,
        };
        let mut part_rels: HashMap<String, Relationships> = HashMap::new();

        for (entry, data) in entries {
            if entry == CONTENT_TYPES_ENTRY {
                continue;
            }
            let name = format!("/{}", entry);
            if name.ends_with(".rels") {
                if let Some(source) = source_of_rels(&name) {
                    let rels = Relationships::from_bytes(&data)?;
                    if source == "/" {
                        package.rels = rels;
                    } else {
                        part_rels.insert(source, rels);
                    }
                    continue;
                }
            }

            let content_type = package
                .content_types
                .get(&name)
                .unwrap_or("application/octet-stream")
                .to_string();
            package
                .parts
                .insert(name.clone(), Part::new(name, content_type, data));
        }

        for (source, rels) in part_rels {
            match package.parts.get_mut(&source) {
                Some(part) => part.set_rels(rels),
                None => log::debug!("Ignoring relationships of missing part {}", source),
            }
        }

        if package.rels.is_empty() {
            return Err(Error::MissingPart(PACKAGE_RELS_ENTRY.into()));
        }

        Ok(package)
    }

    /// Save the package to a file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        self.write_to(file)
    }

    /// Save the package to bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.write_to(Cursor::new(&mut buf))?;
        Ok(buf)
    }

    /// Write the package to a writer.
    pub fn write_to<W: Write + Seek>(&self, writer: W) -> Result<()> {
        let mut zip = ZipWriter::new(writer);
        let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

        zip.start_file(CONTENT_TYPES_ENTRY, options).map_err(zip_err)?;
        zip.write_all(&self.content_types.to_bytes()?)?;

        zip.start_file(PACKAGE_RELS_ENTRY, options).map_err(zip_err)?;
        zip.write_all(&self.rels.to_bytes()?)?;

        for (name, part) in &self.parts {
            zip.start_file(&name[1..], options).map_err(zip_err)?;
            zip.write_all(part.data())?;

            if !part.rels().is_empty() {
                let rels_name = rels_part_for(name);
                zip.start_file(&rels_name[1..], options).map_err(zip_err)?;
                zip.write_all(&part.rels().to_bytes()?)?;
            }
        }

        zip.finish().map_err(zip_err)?;
        Ok(())
    }

    pub fn part(&self, name: &str) -> Option<&Part> {
        self.parts.get(name)
    }

    pub fn part_mut(&mut self, name: &str) -> Option<&mut Part> {
        self.parts.get_mut(name)
    }

    /// Get a part or fail with [`Error::MissingPart`].
    pub fn require(&self, name: &str) -> Result<&Part> {
        self.parts
            .get(name)
            .ok_or_else(|| Error::MissingPart(name.to_string()))
    }

    /// Get a part mutably or fail with [`Error::MissingPart`].
    pub fn require_mut(&mut self, name: &str) -> Result<&mut Part> {
        self.parts
            .get_mut(name)
            .ok_or_else(|| Error::MissingPart(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.parts.contains_key(name)
    }

    /// Add a part, declaring its content type.
    pub fn add_part(&mut self, part: Part) {
        self.content_types.declare(part.name(), part.content_type());
        self.parts.insert(part.name().to_string(), part);
    }

    /// Remove a part and its content type override.
    pub fn remove_part(&mut self, name: &str) -> Option<Part> {
        self.content_types.remove_override(name);
        self.parts.remove(name)
    }

    pub fn part_names(&self) -> impl Iterator<Item = &str> {
        self.parts.keys().map(|k| k.as_str())
    }

    /// Package-level relationships (`/_rels/.rels`).
    pub fn relationships(&self) -> &Relationships {
        &self.rels
    }

    pub fn content_types(&self) -> &ContentTypes {
        &self.content_types
    }

    pub fn content_types_mut(&mut self) -> &mut ContentTypes {
        &mut self.content_types
    }

    /// Name of the main presentation part.
    pub fn main_part_name(&self) -> Result<String> {
        let rel = self
            .rels
            .by_type(rel_types::OFFICE_DOCUMENT)
            .ok_or_else(|| Error::PptxParseError("Package has no officeDocument relationship".into()))?;
        Ok(resolve("/", &rel.target))
    }

    /// First free name of the form `{prefix}{N}.{ext}`, N starting at 1.
    pub fn next_part_name(&self, prefix: &str, ext: &str) -> String {
        let mut n = 1u32;
        loop {
            let candidate = if ext.is_empty() {
                format!("{}{}", prefix, n)
            } else {
                format!("{}{}.{}", prefix, n, ext)
            };
            if !self.parts.keys().any(|k| k.eq_ignore_ascii_case(&candidate)) {
                return candidate;
            }
            n += 1;
        }
    }

    /// Drop every part that can no longer be reached from the package
    /// relationships. Returns the number of parts removed.
    pub fn prune_unreachable(&mut self) -> usize {
        let mut reachable: HashSet<String> = HashSet::new();
        let mut queue: VecDeque<String> = self
            .rels
            .iter()
            .filter(|r| !r.external)
            .map(|r| resolve("/", &r.target))
            .collect();

        while let Some(name) = queue.pop_front() {
            if !reachable.insert(name.clone()) {
                continue;
            }
            if let Some(part) = self.parts.get(&name) {
                queue.extend(part.rels().iter().filter_map(|r| part.target_of(r)));
            }
        }

        let orphans: Vec<String> = self
            .parts
            .keys()
            .filter(|k| !reachable.contains(*k))
            .cloned()
            .collect();
        for name in &orphans {
            log::debug!("Dropping unreachable part {}", name);
            self.remove_part(name);
        }
        orphans.len()
    }
}
