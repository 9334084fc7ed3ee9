//! Presentation-level view of a package: slide order, layouts, and adding or
//! removing slides.

use crate::opc::part_name::relative;
use crate::opc::{content_types, rel_types, Package, Part};
use crate::xml::{XmlElement, XmlNode, NS_A, NS_P, NS_R};
use carousel_core::{Error, Result};
use std::io::{Read, Seek};
use std::path::Path;

/// Slide ids below this value are reserved.
const MIN_SLIDE_ID: u32 = 256;

/// Largest slide id allowed in `p:sldId`.
const MAX_SLIDE_ID: u32 = 2_147_483_647;

/// A slide as listed in `p:sldIdLst`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlideRef {
    /// Value of `p:sldId@id`.
    pub id: u32,
    /// Relationship id from the presentation part to the slide.
    pub rel_id: String,
    /// Absolute part name of the slide.
    pub part_name: String,
}

/// Namespace prefixes used by a PresentationML part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prefixes {
    pub p: String,
    pub a: String,
    pub r: String,
}

impl Prefixes {
    /// Read prefixes from the root element's declarations, defaulting to the
    /// conventional `p`, `a` and `r`.
    pub fn of(root: &XmlElement) -> Self {
        let lookup = |ns: &str, fallback: &str| {
            root.prefix_for(ns).unwrap_or(fallback).to_string()
        };
        Self {
            p: lookup(NS_P, "p"),
            a: lookup(NS_A, "a"),
            r: lookup(NS_R, "r"),
        }
    }

    /// Like [`Prefixes::of`], declaring any missing namespace on the root.
    pub fn ensure(root: &mut XmlElement) -> Self {
        let prefixes = Self::of(root);
        for (prefix, ns) in [(&prefixes.a, NS_A), (&prefixes.r, NS_R), (&prefixes.p, NS_P)] {
            if root.prefix_for(ns).is_none() {
                root.set_attr(&format!("xmlns:{}", prefix), ns);
            }
        }
        prefixes
    }

    pub fn p(&self, local: &str) -> String {
        format!("{}:{}", self.p, local)
    }

    pub fn a(&self, local: &str) -> String {
        format!("{}:{}", self.a, local)
    }

    pub fn r(&self, local: &str) -> String {
        format!("{}:{}", self.r, local)
    }
}

/// A `.pptx` presentation.
#[derive(Debug, Clone)]
pub struct Presentation {
    package: Package,
    main_part: String,
}

impl Presentation {
    /// Open a presentation from a file path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_package(Package::open(path)?)
    }

    /// Open a presentation from bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::from_package(Package::from_bytes(bytes)?)
    }

    /// Open a presentation from a reader.
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        Self::from_package(Package::from_reader(reader)?)
    }

    /// Wrap a package whose main part is a presentation.
    pub fn from_package(package: Package) -> Result<Self> {
        let main_part = package.main_part_name()?;
        let root = package.require(&main_part)?.xml()?;
        if !root.is("presentation") {
            return Err(Error::UnsupportedFormat(format!(
                "main part is <{}>, not a presentation",
                root.name
            )));
        }
        Ok(Self { package, main_part })
    }

    /// Save to a file, dropping parts no slide refers to any more.
    pub fn save<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.package.prune_unreachable();
        self.package.save(path)
    }

    /// Save to bytes, dropping parts no slide refers to any more.
    pub fn to_bytes(&mut self) -> Result<Vec<u8>> {
        self.package.prune_unreachable();
        self.package.to_bytes()
    }

    pub fn package(&self) -> &Package {
        &self.package
    }

    pub fn package_mut(&mut self) -> &mut Package {
        &mut self.package
    }

    /// Name of the presentation part, usually `/ppt/presentation.xml`.
    pub fn main_part_name(&self) -> &str {
        &self.main_part
    }

    /// Parse a part as XML.
    pub fn read_xml(&self, part_name: &str) -> Result<XmlElement> {
        self.package.require(part_name)?.xml()
    }

    /// Replace a part's content with serialized XML.
    pub fn write_xml(&mut self, part_name: &str, root: &XmlElement) -> Result<()> {
        self.package.require_mut(part_name)?.set_xml(root)
    }

    /// Slides in presentation order.
    pub fn slides(&self) -> Result<Vec<SlideRef>> {
        let root = self.read_xml(&self.main_part)?;
        let main = self.package.require(&self.main_part)?;
        let rid_attr = Prefixes::of(&root).r("id");

        let Some(list) = root.child("sldIdLst") else {
            return Ok(Vec::new());
        };

        let mut slides = Vec::new();
        for entry in list.elements().filter(|e| e.is("sldId")) {
            let id = entry
                .attr("id")
                .and_then(|v| v.parse::<u32>().ok())
                .ok_or_else(|| Error::PptxParseError("p:sldId without numeric id".into()))?;
            let rel_id = entry
                .attr(&rid_attr)
                .ok_or_else(|| Error::PptxParseError(format!("p:sldId {} without {}", id, rid_attr)))?;
            let rel = main.rels().get(rel_id).ok_or_else(|| {
                Error::PptxParseError(format!("Slide relationship {} not found", rel_id))
            })?;
            let part_name = main.target_of(rel).ok_or_else(|| {
                Error::PptxParseError(format!("Slide relationship {} is external", rel_id))
            })?;
            slides.push(SlideRef {
                id,
                rel_id: rel_id.to_string(),
                part_name,
            });
        }
        Ok(slides)
    }

    /// Number of slides.
    pub fn slide_count(&self) -> Result<usize> {
        Ok(self.slides()?.len())
    }

    /// Slide layouts, master by master, in each master's layout order.
    pub fn slide_layouts(&self) -> Result<Vec<String>> {
        let root = self.read_xml(&self.main_part)?;
        let main = self.package.require(&self.main_part)?;
        let rid_attr = Prefixes::of(&root).r("id");

        let mut layouts = Vec::new();
        let Some(masters) = root.child("sldMasterIdLst") else {
            return Ok(layouts);
        };

        for master_ref in masters.elements().filter(|e| e.is("sldMasterId")) {
            let Some(master_name) = master_ref
                .attr(&rid_attr)
                .and_then(|rid| main.rels().get(rid))
                .and_then(|rel| main.target_of(rel))
            else {
                continue;
            };
            let master = self.package.require(&master_name)?;
            let master_root = master.xml()?;
            let master_rid = Prefixes::of(&master_root).r("id");

            if let Some(list) = master_root.child("sldLayoutIdLst") {
                for layout_ref in list.elements().filter(|e| e.is("sldLayoutId")) {
                    if let Some(layout) = layout_ref
                        .attr(&master_rid)
                        .and_then(|rid| master.rels().get(rid))
                        .and_then(|rel| master.target_of(rel))
                    {
                        layouts.push(layout);
                    }
                }
            }
        }
        Ok(layouts)
    }

    /// The layout a slide is based on.
    pub fn layout_of(&self, slide_part: &str) -> Result<Option<String>> {
        let slide = self.package.require(slide_part)?;
        Ok(slide
            .rels()
            .by_type(rel_types::SLIDE_LAYOUT)
            .and_then(|rel| slide.target_of(rel)))
    }

    /// A layout's display name (`p:cSld@name`), empty when unnamed.
    pub fn layout_name(&self, layout_part: &str) -> Result<String> {
        let root = self.read_xml(layout_part)?;
        Ok(root
            .child("cSld")
            .and_then(|c| c.attr("name"))
            .unwrap_or_default()
            .to_string())
    }

    /// Keep only the slides for which `keep(index)` is true.
    ///
    /// Removed slides lose their presentation relationship; their parts (and
    /// any notes or media only they used) are dropped from the package.
    pub fn retain_slides<F: Fn(usize) -> bool>(&mut self, keep: F) -> Result<usize> {
        let slides = self.slides()?;
        let doomed: Vec<&SlideRef> = slides
            .iter()
            .enumerate()
            .filter(|(i, _)| !keep(*i))
            .map(|(_, s)| s)
            .collect();
        if doomed.is_empty() {
            return Ok(0);
        }

        let mut root = self.read_xml(&self.main_part)?;
        if let Some(list) = root.child_mut("sldIdLst") {
            list.children.retain(|node| match node {
                XmlNode::Element(e) if e.is("sldId") => {
                    let id = e.attr("id").and_then(|v| v.parse::<u32>().ok());
                    !doomed.iter().any(|s| Some(s.id) == id)
                }
                _ => true,
            });
        }
        self.write_xml(&self.main_part.clone(), &root)?;

        let main = self.package.require_mut(&self.main_part)?;
        for slide in &doomed {
            main.rels_mut().remove(&slide.rel_id);
        }

        let removed = doomed.len();
        let pruned = self.package.prune_unreachable();
        log::debug!("Removed {} slide(s), {} part(s) dropped", removed, pruned);
        Ok(removed)
    }

    /// Remove one slide by its 0-based index.
    pub fn remove_slide(&mut self, index: usize) -> Result<()> {
        let count = self.slide_count()?;
        if index >= count {
            return Err(Error::TemplateError(format!(
                "Slide index {} out of range ({} slides)",
                index, count
            )));
        }
        self.retain_slides(|i| i != index)?;
        Ok(())
    }

    /// Remove every slide, keeping masters, layouts and theme.
    pub fn clear_slides(&mut self) -> Result<usize> {
        self.retain_slides(|_| false)
    }

    /// Append a blank slide based on `layout_part`; returns the slide part name.
    ///
    /// The slide starts with an empty shape tree and follows the master's
    /// color mapping.
    pub fn add_slide(&mut self, layout_part: &str) -> Result<String> {
        self.package.require(layout_part)?;

        let main_name = self.main_part.clone();
        let mut root = self.read_xml(&main_name)?;
        let px = Prefixes::ensure(&mut root);
        let next_id = next_slide_id(&root)?;

        let slide_name = self.package.next_part_name("/ppt/slides/slide", "xml");
        let mut slide = Part::new(slide_name.as_str(), content_types::SLIDE, Vec::new());
        slide.set_xml(&blank_slide())?;
        slide
            .rels_mut()
            .add(rel_types::SLIDE_LAYOUT, &relative(&slide_name, layout_part));
        self.package.add_part(slide);

        let rel_id = self
            .package
            .require_mut(&main_name)?
            .rels_mut()
            .add(rel_types::SLIDE, &relative(&main_name, &slide_name));

        let list = slide_id_list(&mut root, &px)?;
        list.children.push(XmlNode::Element(
            XmlElement::new(px.p("sldId"))
                .with_attr("id", next_id.to_string())
                .with_attr(px.r("id"), rel_id.as_str()),
        ));
        self.write_xml(&main_name, &root)?;

        log::debug!(
            "Added {} (slide id {}) on layout {}",
            slide_name,
            next_id,
            layout_part
        );
        Ok(slide_name)
    }
}

/// One past the largest id in `p:sldIdLst`, at least [`MIN_SLIDE_ID`].
fn next_slide_id(root: &XmlElement) -> Result<u32> {
    let max = root
        .child("sldIdLst")
        .and_then(|list| {
            list.elements()
                .filter_map(|e| e.attr("id").and_then(|v| v.parse::<u32>().ok()))
                .max()
        });
    let Some(max) = max else {
        return Ok(MIN_SLIDE_ID);
    };
    match max.checked_add(1) {
        Some(id) if id <= MAX_SLIDE_ID => Ok(id.max(MIN_SLIDE_ID)),
        _ => Err(Error::PptxParseError(format!(
            "No slide id left after {}",
            max
        ))),
    }
}

/// `p:sldIdLst`, created in schema position when missing.
fn slide_id_list<'a>(root: &'a mut XmlElement, px: &Prefixes) -> Result<&'a mut XmlElement> {
    let pos = match root.position_of("sldIdLst") {
        Some(pos) => pos,
        None => {
            let insert_at = ["handoutMasterIdLst", "notesMasterIdLst", "sldMasterIdLst"]
                .iter()
                .find_map(|name| root.position_of(name))
                .map_or(0, |pos| pos + 1);
            root.children
                .insert(insert_at, XmlNode::Element(XmlElement::new(px.p("sldIdLst"))));
            insert_at
        }
    };
    match root.children.get_mut(pos) {
        Some(XmlNode::Element(list)) => Ok(list),
        _ => Err(Error::PptxParseError("p:sldIdLst could not be created".into())),
    }
}

/// A slide with an empty shape tree that follows the master's color mapping.
pub fn blank_slide() -> XmlElement {
    let nv_grp_sp_pr = XmlElement::new("p:nvGrpSpPr")
        .with_child(
            XmlElement::new("p:cNvPr")
                .with_attr("id", "1")
                .with_attr("name", ""),
        )
        .with_child(XmlElement::new("p:cNvGrpSpPr"))
        .with_child(XmlElement::new("p:nvPr"));

    let xfrm = XmlElement::new("a:xfrm")
        .with_child(XmlElement::new("a:off").with_attr("x", "0").with_attr("y", "0"))
        .with_child(XmlElement::new("a:ext").with_attr("cx", "0").with_attr("cy", "0"))
        .with_child(XmlElement::new("a:chOff").with_attr("x", "0").with_attr("y", "0"))
        .with_child(XmlElement::new("a:chExt").with_attr("cx", "0").with_attr("cy", "0"));

    let sp_tree = XmlElement::new("p:spTree")
        .with_child(nv_grp_sp_pr)
        .with_child(XmlElement::new("p:grpSpPr").with_child(xfrm));

    XmlElement::new("p:sld")
        .with_attr("xmlns:a", NS_A)
        .with_attr("xmlns:r", NS_R)
        .with_attr("xmlns:p", NS_P)
        .with_child(XmlElement::new("p:cSld").with_child(sp_tree))
        .with_child(
            XmlElement::new("p:clrMapOvr").with_child(XmlElement::new("a:masterClrMapping")),
        )
}
