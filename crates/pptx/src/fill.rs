//! Template filling: replace placeholder tokens in text boxes with post
//! sections and drop images into picture placeholders.

use crate::opc::content_types::image_content_type;
use crate::opc::part_name::relative;
use crate::opc::{rel_types, Part};
use crate::presentation::{Prefixes, Presentation};
use crate::shapes::{
    inherited_xfrm, is_picture_placeholder, is_shape, max_shape_id, picture, placeholder_of,
    shape_tree_mut, text_of, xfrm_of,
};
use crate::xml::{XmlElement, XmlNode};
use carousel_core::{
    BlockStyle, Error, FitDefaults, PlaceholderSet, PostSections, Result, RunStyle,
    TemplateMapping, Token,
};
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// What a fill pass changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FillReport {
    /// Placeholder tokens replaced with section text.
    pub blocks_replaced: usize,
    /// Pictures placed into picture placeholders.
    pub images_inserted: usize,
    /// Tokens whose text is longer than the fitter's character limit.
    pub overflowing: Vec<String>,
}

/// Section text for a token together with its resolved formatting.
#[derive(Debug, Clone)]
struct Block {
    key: String,
    text: String,
    style: RunStyle,
}

/// Fills one template with the sections of a post.
#[derive(Debug, Clone)]
pub struct TemplateFiller {
    placeholders: PlaceholderSet,
    /// Token to block; `None` when the section is missing or empty.
    blocks: HashMap<String, Option<Block>>,
    image: Option<PathBuf>,
}

impl TemplateFiller {
    /// Resolve every block against the post up front.
    pub fn new(
        blocks: Vec<(String, BlockStyle)>,
        sections: &PostSections,
        defaults: &FitDefaults,
    ) -> Result<Self> {
        let placeholders = PlaceholderSet::new(blocks.iter().map(|(token, _)| token.clone()))?;

        let mut resolved = HashMap::with_capacity(blocks.len());
        for (token, style) in blocks {
            let text = sections.block_text(&style.key);
            let block = if text.is_empty() {
                log::debug!("No text for {} (section {})", token, style.key);
                None
            } else {
                let run_style = style.resolve(&text, defaults)?;
                Some(Block {
                    key: style.key,
                    text,
                    style: run_style,
                })
            };
            resolved.insert(token, block);
        }

        Ok(Self {
            placeholders,
            blocks: resolved,
            image: None,
        })
    }

    /// Filler for one configured template, including its image.
    pub fn from_mapping(
        mapping: &TemplateMapping,
        sections: &PostSections,
        defaults: &FitDefaults,
    ) -> Result<Self> {
        Ok(Self::new(mapping.styles(), sections, defaults)?.with_image(mapping.image.clone()))
    }

    /// Image for picture placeholders.
    pub fn with_image(mut self, image: Option<PathBuf>) -> Self {
        self.image = image;
        self
    }

    /// Fill every slide of `presentation` in place.
    pub fn fill(&self, presentation: &mut Presentation) -> Result<FillReport> {
        let mut report = FillReport::default();
        let mut media: Option<String> = None;

        for slide in presentation.slides()? {
            let layout_root = match presentation.layout_of(&slide.part_name)? {
                Some(layout) => Some(presentation.read_xml(&layout)?),
                None => None,
            };

            let mut root = presentation.read_xml(&slide.part_name)?;
            let px = if self.image.is_some() {
                Prefixes::ensure(&mut root)
            } else {
                Prefixes::of(&root)
            };
            let mut next_shape_id = max_shape_id(&root) + 1;
            let mut changed = false;

            let Some(tree) = shape_tree_mut(&mut root) else {
                log::debug!("{} has no shape tree", slide.part_name);
                continue;
            };

            let mut i = 0;
            while i < tree.children.len() {
                let XmlNode::Element(shape) = &mut tree.children[i] else {
                    i += 1;
                    continue;
                };
                if !is_shape(shape) {
                    i += 1;
                    continue;
                }

                if is_picture_placeholder(shape) {
                    let Some(image) = &self.image else {
                        i += 1;
                        continue;
                    };
                    let xfrm = xfrm_of(shape).or_else(|| {
                        let ph = placeholder_of(shape)?;
                        inherited_xfrm(layout_root.as_ref()?, &ph)
                    });
                    tree.children.remove(i);
                    changed = true;

                    if !image.exists() {
                        log::warn!("Image not found: {}", image.display());
                        continue;
                    }
                    let Some(xfrm) = xfrm else {
                        log::warn!(
                            "Picture placeholder on {} has no position, image skipped",
                            slide.part_name
                        );
                        continue;
                    };

                    let rel_id = embed_image(presentation, &slide.part_name, image, &mut media)?;
                    let pic = picture(&px, next_shape_id, &rel_id, xfrm);
                    next_shape_id += 1;
                    tree.children.insert(i, XmlNode::Element(pic));
                    report.images_inserted += 1;
                    log::debug!("Placed {} on {}", image.display(), slide.part_name);
                    i += 1;
                    continue;
                }

                if !shape.is("pic") && self.rewrite_text(shape, &px, &mut report) {
                    changed = true;
                }
                i += 1;
            }

            if changed {
                presentation.write_xml(&slide.part_name, &root)?;
            }
        }

        Ok(report)
    }

    /// Replace placeholder tokens in a shape's text. Returns whether the shape
    /// contained any.
    fn rewrite_text(&self, shape: &mut XmlElement, px: &Prefixes, report: &mut FillReport) -> bool {
        let Some(body) = shape.child_mut("txBody") else {
            return false;
        };
        let text = text_of(body);
        if !self.placeholders.contains_any(&text) {
            return false;
        }

        let mut runs = Vec::new();
        let mut paragraph_styles: Vec<&RunStyle> = Vec::new();

        for token in self.placeholders.tokenize(&text) {
            match token {
                Token::Literal(literal) => push_runs(&mut runs, px, literal, None),
                Token::Placeholder(name) => {
                    let Some(Some(block)) = self.blocks.get(name) else {
                        continue;
                    };
                    push_runs(&mut runs, px, &block.text, Some(&block.style));
                    paragraph_styles.push(&block.style);
                    report.blocks_replaced += 1;
                    if block.style.overflow {
                        log::warn!(
                            "{} ({} chars) exceeds the character limit",
                            name,
                            block.text.chars().count()
                        );
                        report.overflowing.push(name.to_string());
                    }
                    log::debug!(
                        "{} <- {} at {}pt",
                        name,
                        block.key,
                        block.style.size_pt
                    );
                }
            }
        }

        let Some(paragraph) = clear_to_first_paragraph(body, px) else {
            return false;
        };
        let insert_at = paragraph
            .position_of("endParaRPr")
            .unwrap_or(paragraph.children.len());
        for (offset, run) in runs.into_iter().enumerate() {
            paragraph
                .children
                .insert(insert_at + offset, XmlNode::Element(run));
        }

        // applied in order: the last block sets the spacing, alignment sticks
        for style in paragraph_styles {
            apply_paragraph_style(paragraph, px, style);
        }
        true
    }
}

/// Remove every paragraph but the first and strip its runs, breaks and
/// fields, keeping its `a:pPr` and `a:endParaRPr`.
fn clear_to_first_paragraph<'a>(
    body: &'a mut XmlElement,
    px: &Prefixes,
) -> Option<&'a mut XmlElement> {
    let mut seen_first = false;
    body.children.retain(|node| match node {
        XmlNode::Element(e) if e.is("p") => !std::mem::replace(&mut seen_first, true),
        _ => true,
    });
    if !seen_first {
        body.children.push(XmlNode::Element(XmlElement::new(px.a("p"))));
    }

    let paragraph = body.child_mut("p")?;
    paragraph.children.retain(|node| match node {
        XmlNode::Element(e) => !matches!(e.local_name(), "r" | "br" | "fld"),
        _ => false,
    });
    Some(paragraph)
}

/// Append runs for `text`, turning line feeds into `a:br`.
fn push_runs(runs: &mut Vec<XmlElement>, px: &Prefixes, text: &str, style: Option<&RunStyle>) {
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            let mut br = XmlElement::new(px.a("br"));
            if let Some(style) = style {
                br = br.with_child(run_properties(px, style));
            }
            runs.push(br);
        }
        if line.is_empty() {
            continue;
        }
        let mut run = XmlElement::new(px.a("r"));
        if let Some(style) = style {
            run = run.with_child(run_properties(px, style));
        }
        runs.push(run.with_child(XmlElement::new(px.a("t")).with_text(line)));
    }
}

/// `a:rPr` for a styled run: size, weight, then fill and typeface in schema order.
fn run_properties(px: &Prefixes, style: &RunStyle) -> XmlElement {
    let mut rpr = XmlElement::new(px.a("rPr"))
        .with_attr("lang", "en-US")
        .with_attr("sz", style.size_hundredths().to_string())
        .with_attr("b", if style.bold { "1" } else { "0" })
        .with_attr("dirty", "0");
    if let Some(color) = style.color {
        rpr = rpr.with_child(
            XmlElement::new(px.a("solidFill")).with_child(
                XmlElement::new(px.a("srgbClr")).with_attr("val", color.to_hex()),
            ),
        );
    }
    rpr.with_child(XmlElement::new(px.a("latin")).with_attr("typeface", style.font.as_str()))
}

/// Set paragraph line spacing and alignment.
fn apply_paragraph_style(paragraph: &mut XmlElement, px: &Prefixes, style: &RunStyle) {
    if paragraph.position_of("pPr").is_none() {
        paragraph
            .children
            .insert(0, XmlNode::Element(XmlElement::new(px.a("pPr"))));
    }
    let Some(ppr) = paragraph.child_mut("pPr") else {
        return;
    };

    if let Some(align) = style.align {
        ppr.set_attr("algn", align.as_ooxml());
    }

    ppr.remove_children("lnSpc");
    let ln_spc = XmlElement::new(px.a("lnSpc")).with_child(
        XmlElement::new(px.a("spcPct")).with_attr("val", style.line_spacing_pct().to_string()),
    );
    ppr.children.insert(0, XmlNode::Element(ln_spc));
}

/// Store `image` as a media part (once per fill) and relate it to the slide.
fn embed_image(
    presentation: &mut Presentation,
    slide_part: &str,
    image: &Path,
    media: &mut Option<String>,
) -> Result<String> {
    let package = presentation.package_mut();

    let media_name = match media {
        Some(name) => name.clone(),
        None => {
            let ext = image
                .extension()
                .and_then(|e| e.to_str())
                .map(str::to_lowercase)
                .unwrap_or_default();
            let content_type = image_content_type(&ext).ok_or_else(|| {
                Error::UnsupportedFormat(format!("Unsupported image type: {}", image.display()))
            })?;
            let data = std::fs::read(image)?;

            let name = package.next_part_name("/ppt/media/image", &ext);
            if package.content_types().default_for(&ext).is_none() {
                package.content_types_mut().add_default(&ext, content_type);
            }
            package.add_part(Part::new(name.as_str(), content_type, data));
            *media = Some(name.clone());
            name
        }
    };

    let slide = package.require_mut(slide_part)?;
    Ok(slide
        .rels_mut()
        .add(rel_types::IMAGE, &relative(slide_part, &media_name)))
}
