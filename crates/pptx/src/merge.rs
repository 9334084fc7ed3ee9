//! Slide-level merging of presentations.
//!
//! The first presentation provides theme, masters and layouts; its own slides
//! are dropped. Every slide of every input is then rebuilt on the matching
//! layout: relationships are copied (importing the parts they point to),
//! shapes and background are cloned, and relationship ids inside the cloned
//! markup are remapped.

use crate::discover::list_pptx;
use crate::opc::part_name::{numbered_stem, relative};
use crate::opc::{rel_types, Package, Part};
use crate::presentation::{Presentation, SlideRef};
use crate::shapes::{is_shape, shape_tree, shape_tree_mut};
use crate::xml::{XmlElement, XmlNode, NS_R};
use carousel_core::{Error, Result};
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Layout used when a slide's layout has no counterpart; "Blank" in the
/// default Office master.
pub const BLANK_LAYOUT_INDEX: usize = 6;

/// Relationship types that belong to the slide skeleton and are never copied.
const SKIPPED_REL_TYPES: [&str; 5] = [
    rel_types::SLIDE_LAYOUT,
    rel_types::SLIDE_MASTER,
    rel_types::SLIDE,
    rel_types::NOTES_SLIDE,
    rel_types::NOTES_MASTER,
];

/// Slides contributed by one input file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MergedFile {
    pub path: PathBuf,
    pub slides: usize,
}

/// Result of a merge.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MergeReport {
    pub files: Vec<MergedFile>,
    pub total_slides: usize,
}

/// Accumulates slides from several presentations onto one base.
pub struct SlideMerger {
    target: Presentation,
    layouts: Vec<String>,
    report: MergeReport,
}

impl SlideMerger {
    /// Start from `base` with all of its slides removed.
    pub fn from_base(mut base: Presentation) -> Result<Self> {
        base.clear_slides()?;
        let layouts = base.slide_layouts()?;
        if layouts.is_empty() {
            return Err(Error::TemplateError(
                "Base presentation has no slide layouts".into(),
            ));
        }
        Ok(Self {
            target: base,
            layouts,
            report: MergeReport::default(),
        })
    }

    /// Append every slide of the presentation at `path`.
    pub fn append_file(&mut self, path: &Path) -> Result<usize> {
        let source = Presentation::open(path)?;
        let count = self.append_presentation(&source)?;
        self.report.files.push(MergedFile {
            path: path.to_path_buf(),
            slides: count,
        });
        log::info!(
            "Added {} slide(s) from {}",
            count,
            path.file_name().unwrap_or_default().to_string_lossy()
        );
        Ok(count)
    }

    /// Append every slide of `source`, in order. Returns the number appended.
    pub fn append_presentation(&mut self, source: &Presentation) -> Result<usize> {
        let source_layouts = source.slide_layouts()?;
        let mut imported: HashMap<String, String> = HashMap::new();

        let slides = source.slides()?;
        for slide in &slides {
            self.append_slide(source, slide, &source_layouts, &mut imported)?;
        }
        self.report.total_slides += slides.len();
        Ok(slides.len())
    }

    pub fn report(&self) -> &MergeReport {
        &self.report
    }

    /// The merged presentation.
    pub fn into_presentation(self) -> Presentation {
        self.target
    }

    /// Finish and write the merged presentation.
    pub fn save(mut self, output: &Path) -> Result<MergeReport> {
        if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        self.target.save(output)?;
        log::info!(
            "Merged {} slide(s) into {}",
            self.report.total_slides,
            output.display()
        );
        Ok(self.report)
    }

    /// Target layout for a source layout: same position in the layout list,
    /// else the blank layout, else the first.
    fn target_layout(&self, source_layouts: &[String], source_layout: Option<&str>) -> &str {
        let matched = source_layout
            .and_then(|name| source_layouts.iter().position(|l| l == name))
            .and_then(|idx| self.layouts.get(idx));
        match matched {
            Some(layout) => layout,
            None => {
                log::debug!("No matching layout, falling back to the blank layout");
                self.layouts
                    .get(BLANK_LAYOUT_INDEX)
                    .unwrap_or(&self.layouts[0])
            }
        }
    }

    fn append_slide(
        &mut self,
        source: &Presentation,
        slide: &SlideRef,
        source_layouts: &[String],
        imported: &mut HashMap<String, String>,
    ) -> Result<String> {
        let source_layout = source.layout_of(&slide.part_name)?;
        let layout = self
            .target_layout(source_layouts, source_layout.as_deref())
            .to_string();
        let new_slide = self.target.add_slide(&layout)?;

        // relationships first, so cloned markup can be remapped
        let source_part = source.package().require(&slide.part_name)?;
        let mut rid_map: HashMap<String, String> = HashMap::new();
        for rel in source_part.rels().iter() {
            if SKIPPED_REL_TYPES.contains(&rel.rel_type.as_str()) {
                continue;
            }
            let new_id = if rel.external {
                self.target
                    .package_mut()
                    .require_mut(&new_slide)?
                    .rels_mut()
                    .add_external(&rel.rel_type, &rel.target)
            } else {
                let Some(target_name) = source_part.target_of(rel) else {
                    continue;
                };
                if !source.package().contains(&target_name) {
                    log::warn!(
                        "{}: relationship {} points to missing part {}",
                        slide.part_name,
                        rel.id,
                        target_name
                    );
                    continue;
                }
                let local = import_part(
                    source.package(),
                    self.target.package_mut(),
                    &target_name,
                    imported,
                )?;
                self.target
                    .package_mut()
                    .require_mut(&new_slide)?
                    .rels_mut()
                    .add(&rel.rel_type, &relative(&new_slide, &local))
            };
            rid_map.insert(rel.id.clone(), new_id);
        }

        let source_root = source_part.xml()?;
        let mut root = self.target.read_xml(&new_slide)?;
        let r_prefix = source_root.prefix_for(NS_R).unwrap_or("r").to_string();

        copy_namespaces(&source_root, &mut root);
        let mut dropped = 0;

        if let (Some(from), Some(to)) = (shape_tree(&source_root), shape_tree_mut(&mut root)) {
            to.children.retain(|node| match node {
                XmlNode::Element(e) => !is_shape(e),
                _ => true,
            });
            for shape in from.elements().filter(|e| is_shape(e)) {
                let mut shape = shape.clone();
                dropped += remap_rel_ids(&mut shape, &r_prefix, &rid_map);
                to.children.push(XmlNode::Element(shape));
            }
        }

        if let Some(bg) = source_root.find(&["cSld", "bg"]) {
            let mut bg = bg.clone();
            dropped += remap_rel_ids(&mut bg, &r_prefix, &rid_map);
            if let Some(c_sld) = root.child_mut("cSld") {
                c_sld.remove_children("bg");
                c_sld.children.insert(0, XmlNode::Element(bg));
            }
        }

        if let Some(clr_map) = source_root.child("clrMapOvr") {
            let clr_map = XmlNode::Element(clr_map.clone());
            match root.position_of("clrMapOvr") {
                Some(pos) => root.children[pos] = clr_map,
                None => root.children.push(clr_map),
            }
        }

        if dropped > 0 {
            log::warn!(
                "{}: dropped {} reference(s) to relationships that were not copied",
                slide.part_name,
                dropped
            );
        }

        self.target.write_xml(&new_slide, &root)?;
        log::debug!(
            "{} -> {} ({} relationship(s) copied)",
            slide.part_name,
            new_slide,
            rid_map.len()
        );
        Ok(new_slide)
    }
}

/// Copy `name` and everything it relates to from `source` into `target`.
///
/// An identical part already in `target` is reused; otherwise the part keeps
/// its name when free, else takes the next free numbered name.
/// Relationship ids inside imported parts are kept. Returns the part name in
/// `target`.
fn import_part(
    source: &Package,
    target: &mut Package,
    name: &str,
    imported: &mut HashMap<String, String>,
) -> Result<String> {
    if let Some(done) = imported.get(name) {
        return Ok(done.clone());
    }
    let part = source.require(name)?;

    if let Some(same) = find_identical(target, name, part) {
        imported.insert(name.to_string(), same.clone());
        return Ok(same);
    }

    let local = if target.contains(name) {
        let (prefix, ext) = numbered_stem(name);
        target.next_part_name(&prefix, &ext)
    } else {
        name.to_string()
    };
    // registered before recursing so cycles resolve to this part
    imported.insert(name.to_string(), local.clone());

    let mut copy = Part::new(local.as_str(), part.content_type(), part.data().to_vec());
    // reserve the name while children are imported
    target.add_part(copy.clone());

    for rel in part.rels().iter() {
        if rel.external {
            copy.rels_mut()
                .add_with_id(&rel.id, &rel.rel_type, &rel.target, true);
            continue;
        }
        if SKIPPED_REL_TYPES.contains(&rel.rel_type.as_str()) {
            continue;
        }
        let Some(child) = part.target_of(rel) else {
            continue;
        };
        if !source.contains(&child) {
            log::warn!("{}: relationship {} points to missing part {}", name, rel.id, child);
            continue;
        }
        let child_local = import_part(source, target, &child, imported)?;
        copy.rels_mut()
            .add_with_id(&rel.id, &rel.rel_type, &relative(&local, &child_local), false);
    }

    target.add_part(copy);
    log::debug!("Imported {} as {}", name, local);
    Ok(local)
}

/// A part of `target` that can stand in for `part`: the part of the same name
/// when identical, else for leaf parts any part with the same bytes.
fn find_identical(target: &Package, name: &str, part: &Part) -> Option<String> {
    let same = |candidate: &Part| {
        candidate.content_type() == part.content_type()
            && candidate.data() == part.data()
            && candidate.rels() == part.rels()
    };
    if target.part(name).is_some_and(same) {
        return Some(name.to_string());
    }
    if !part.rels().is_empty() {
        return None;
    }
    target
        .part_names()
        .find(|candidate| target.part(candidate).is_some_and(same))
        .map(str::to_string)
}

/// Hyperlink elements that are meaningless without their relationship.
const HYPERLINK_ELEMENTS: [&str; 3] = ["hlinkClick", "hlinkHover", "hlinkMouseOver"];

/// Rewrite every attribute in the relationships namespace through `rid_map`.
///
/// References with no copied relationship are dropped: hyperlink elements are
/// removed whole, other attributes are removed. Empty ids are left alone.
/// Returns the number of references dropped.
fn remap_rel_ids(
    el: &mut XmlElement,
    r_prefix: &str,
    rid_map: &HashMap<String, String>,
) -> usize {
    let qualified = format!("{}:", r_prefix);
    let is_dangling = |key: &str, value: &str| {
        key.starts_with(&qualified) && !value.is_empty() && !rid_map.contains_key(value)
    };
    let mut dropped = 0;

    el.walk_mut(&mut |e| {
        let before = e.children.len();
        e.children.retain(|node| match node {
            XmlNode::Element(child) if HYPERLINK_ELEMENTS.contains(&child.local_name()) => !child
                .attributes
                .iter()
                .any(|(key, value)| is_dangling(key, value)),
            _ => true,
        });
        dropped += before - e.children.len();

        let before = e.attributes.len();
        e.attributes.retain(|(key, value)| !is_dangling(key, value));
        dropped += before - e.attributes.len();

        for (key, value) in e.attributes.iter_mut() {
            if key.starts_with(&qualified) {
                if let Some(new_id) = rid_map.get(value.as_str()) {
                    *value = new_id.clone();
                }
            }
        }
    });
    dropped
}

/// Carry over namespace declarations and `Ignorable` lists the target lacks.
fn copy_namespaces(source_root: &XmlElement, target_root: &mut XmlElement) {
    for (key, value) in &source_root.attributes {
        let is_decl = key.starts_with("xmlns:");
        let is_ignorable = crate::xml::local_name(key) == "Ignorable";
        if !is_decl && !is_ignorable {
            continue;
        }
        match target_root.attr(key) {
            None => target_root.set_attr(key, value.as_str()),
            Some(existing) if existing != value && is_decl => {
                log::debug!("Prefix {} is bound differently in the target", key);
            }
            Some(_) => {}
        }
    }
}

/// Merge `files` in the given order into `output`. The first file supplies
/// theme, masters and layouts.
pub fn merge_files<P: AsRef<Path>>(files: &[P], output: &Path) -> Result<MergeReport> {
    let Some(first) = files.first() else {
        return Err(Error::TemplateError("No presentations to merge".into()));
    };

    let mut merger = SlideMerger::from_base(Presentation::open(first.as_ref())?)?;
    for file in files {
        merger.append_file(file.as_ref())?;
    }
    merger.save(output)
}

/// Merge every `.pptx` in `dir`, in file-name order, into `output`.
pub fn merge_dir(dir: &Path, output: &Path) -> Result<MergeReport> {
    let output_abs = output.canonicalize().ok();
    let files: Vec<PathBuf> = list_pptx(dir)?
        .into_iter()
        .filter(|f| output_abs.is_none() || f.canonicalize().ok() != output_abs)
        .collect();
    if files.is_empty() {
        return Err(Error::IoError(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("No PPTX files found in {}", dir.display()),
        )));
    }
    merge_files(&files, output)
}
