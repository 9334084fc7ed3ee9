//! Small presentations built in memory for integration tests.

#![allow(dead_code)]

use carousel_pptx::shapes::{is_shape, shape_tree, text_body, text_of};
use carousel_pptx::Presentation;
use std::io::{Cursor, Write};
use std::path::Path;
use zip::write::FileOptions;
use zip::ZipWriter;

pub const NS: &str = r#"xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main""#;

const REL: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const CT: &str = "application/vnd.openxmlformats-officedocument";

/// Bytes of a 1x1 "image"; content is never decoded.
pub const PIXEL: &[u8] = &[0x89, b'P', b'N', b'G', 0, 1, 2, 3];

const GROUP_HEADER: &str = r#"<p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/>"#;

/// A text box whose paragraphs are the lines of `text`.
pub fn text_shape(id: u32, text: &str) -> String {
    let paragraphs: String = text
        .split('\n')
        .map(|line| format!(r#"<a:p><a:r><a:rPr lang="en-US"/><a:t>{}</a:t></a:r></a:p>"#, line))
        .collect();
    format!(
        r#"<p:sp><p:nvSpPr><p:cNvPr id="{id}" name="Text {id}"/><p:cNvSpPr txBox="1"/><p:nvPr/></p:nvSpPr><p:spPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="100" cy="100"/></a:xfrm></p:spPr><p:txBody><a:bodyPr/><a:lstStyle/>{paragraphs}</p:txBody></p:sp>"#
    )
}

/// An empty picture placeholder inheriting its position from the layout.
pub fn picture_placeholder(id: u32) -> String {
    format!(
        r#"<p:sp><p:nvSpPr><p:cNvPr id="{id}" name="Picture Placeholder {id}"/><p:cNvSpPr/><p:nvPr><p:ph type="pic" idx="13"/></p:nvPr></p:nvSpPr><p:spPr/></p:sp>"#
    )
}

/// A text box whose single run links through the relationship `rel_id`.
pub fn linked_text_shape(id: u32, text: &str, rel_id: &str) -> String {
    format!(
        r#"<p:sp><p:nvSpPr><p:cNvPr id="{id}" name="Link {id}"/><p:cNvSpPr txBox="1"/><p:nvPr/></p:nvSpPr><p:spPr/><p:txBody><a:bodyPr/><a:lstStyle/><a:p><a:r><a:rPr lang="en-US"><a:hlinkClick r:id="{rel_id}"/></a:rPr><a:t>{text}</a:t></a:r></a:p></p:txBody></p:sp>"#
    )
}

/// A picture showing the image related by `rel_id`.
pub fn picture_shape(id: u32, rel_id: &str) -> String {
    format!(
        r#"<p:pic><p:nvPicPr><p:cNvPr id="{id}" name="Picture {id}"/><p:cNvPicPr/><p:nvPr/></p:nvPicPr><p:blipFill><a:blip r:embed="{rel_id}"/><a:stretch><a:fillRect/></a:stretch></p:blipFill><p:spPr><a:xfrm><a:off x="5" y="5"/><a:ext cx="50" cy="50"/></a:xfrm><a:prstGeom prst="rect"><a:avLst/></a:prstGeom></p:spPr></p:pic>"#
    )
}

/// A background filled with the image related by `rel_id`.
pub fn picture_background(rel_id: &str) -> String {
    format!(
        r#"<p:bg><p:bgPr><a:blipFill><a:blip r:embed="{rel_id}"/><a:stretch><a:fillRect/></a:stretch></a:blipFill><a:effectLst/></p:bgPr></p:bg>"#
    )
}

#[derive(Debug, Clone)]
struct SlideSpec {
    layout: usize,
    shapes: String,
    background: Option<String>,
    /// (id, relationship type suffix, target relative to the slide)
    rels: Vec<(String, String, String)>,
    /// Extra attributes on the `p:sld` root.
    root_attrs: String,
    color_map: Option<String>,
    notes: Option<String>,
}

/// Builds a `.pptx` with one master, named layouts and slides.
#[derive(Debug, Clone)]
pub struct DeckBuilder {
    layouts: Vec<String>,
    slides: Vec<SlideSpec>,
    media: Vec<(String, Vec<u8>)>,
}

impl DeckBuilder {
    pub fn new(layouts: &[&str]) -> Self {
        Self {
            layouts: layouts.iter().map(|s| s.to_string()).collect(),
            slides: Vec::new(),
            media: Vec::new(),
        }
    }

    /// Layouts named like the default Office master.
    pub fn office() -> Self {
        Self::new(&[
            "Title Slide",
            "Title and Content",
            "Section Header",
            "Two Content",
            "Comparison",
            "Title Only",
            "Blank",
            "Picture with Caption",
        ])
    }

    /// Add a slide on layout `layout` (0-based) with the given shape markup.
    pub fn slide(mut self, layout: usize, shapes: impl Into<String>) -> Self {
        self.slides.push(SlideSpec {
            layout,
            shapes: shapes.into(),
            background: None,
            rels: Vec::new(),
            root_attrs: String::new(),
            color_map: None,
            notes: None,
        });
        self
    }

    fn with_rel(mut self, rel_id: &str, kind: &str, target: &str) -> Self {
        if let Some(slide) = self.slides.last_mut() {
            slide
                .rels
                .push((rel_id.to_string(), kind.to_string(), target.to_string()));
        }
        self
    }

    /// Relate the last slide to an external hyperlink `url` as `rel_id`.
    pub fn with_hyperlink(self, rel_id: &str, url: &str) -> Self {
        self.with_rel(rel_id, "hyperlink", url)
    }

    /// Relate the last slide to slide `number` (1-based) of this deck.
    pub fn with_slide_link(self, rel_id: &str, number: usize) -> Self {
        self.with_rel(rel_id, "slide", &format!("slide{}.xml", number))
    }

    /// Add raw attributes (namespace declarations and the like) to the last slide's root.
    pub fn with_root_attrs(mut self, attrs: &str) -> Self {
        if let Some(slide) = self.slides.last_mut() {
            slide.root_attrs = format!(" {}", attrs);
        }
        self
    }

    /// Replace the last slide's `p:clrMapOvr` markup.
    pub fn with_color_map(mut self, clr_map_ovr: &str) -> Self {
        if let Some(slide) = self.slides.last_mut() {
            slide.color_map = Some(clr_map_ovr.to_string());
        }
        self
    }

    /// Give the last slide a notes slide with `text`; the deck gets a notes master.
    pub fn with_notes(mut self, text: &str) -> Self {
        if let Some(slide) = self.slides.last_mut() {
            slide.notes = Some(text.to_string());
        }
        self
    }

    /// Add `/ppt/media/<name>` and relate it to the last slide as `rel_id`.
    pub fn with_image(mut self, rel_id: &str, name: &str, data: &[u8]) -> Self {
        if !self.media.iter().any(|(n, _)| n == name) {
            self.media.push((name.to_string(), data.to_vec()));
        }
        if let Some(slide) = self.slides.last_mut() {
            slide.rels.push((
                rel_id.to_string(),
                "image".to_string(),
                format!("../media/{}", name),
            ));
        }
        self
    }

    /// Give the last slide a background.
    pub fn with_background(mut self, bg: impl Into<String>) -> Self {
        if let Some(slide) = self.slides.last_mut() {
            slide.background = Some(bg.into());
        }
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut files: Vec<(String, String)> = Vec::new();
        let n_layouts = self.layouts.len();

        let mut overrides = String::new();
        let mut push_override = |name: &str, ct: &str| {
            overrides.push_str(&format!(r#"<Override PartName="{}" ContentType="{}"/>"#, name, ct));
        };
        push_override("/ppt/presentation.xml", &format!("{}.presentationml.presentation.main+xml", CT));
        push_override("/ppt/slideMasters/slideMaster1.xml", &format!("{}.presentationml.slideMaster+xml", CT));
        push_override("/ppt/theme/theme1.xml", &format!("{}.theme+xml", CT));
        for i in 1..=n_layouts {
            push_override(
                &format!("/ppt/slideLayouts/slideLayout{}.xml", i),
                &format!("{}.presentationml.slideLayout+xml", CT),
            );
        }
        for i in 1..=self.slides.len() {
            push_override(
                &format!("/ppt/slides/slide{}.xml", i),
                &format!("{}.presentationml.slide+xml", CT),
            );
        }
        let has_notes = self.slides.iter().any(|s| s.notes.is_some());
        if has_notes {
            push_override(
                "/ppt/notesMasters/notesMaster1.xml",
                &format!("{}.presentationml.notesMaster+xml", CT),
            );
        }
        for i in 1..=self.slides.len() {
            if self.slides[i - 1].notes.is_some() {
                push_override(
                    &format!("/ppt/notesSlides/notesSlide{}.xml", i),
                    &format!("{}.presentationml.notesSlide+xml", CT),
                );
            }
        }
        files.push((
            "[Content_Types].xml".into(),
            format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Default Extension="png" ContentType="image/png"/>{}</Types>"#,
                overrides
            ),
        ));

        files.push((
            "_rels/.rels".into(),
            rels(&[("rId1", "officeDocument", "ppt/presentation.xml")]),
        ));

        let mut sld_ids = String::new();
        let mut pres_rels = vec![
            ("rId1".to_string(), "slideMaster".to_string(), "slideMasters/slideMaster1.xml".to_string()),
            ("rId2".to_string(), "theme".to_string(), "theme/theme1.xml".to_string()),
        ];
        for i in 0..self.slides.len() {
            let rid = format!("rId{}", i + 3);
            sld_ids.push_str(&format!(r#"<p:sldId id="{}" r:id="{}"/>"#, 256 + i, rid));
            pres_rels.push((rid, "slide".into(), format!("slides/slide{}.xml", i + 1)));
        }
        let mut notes_master_ids = String::new();
        if has_notes {
            let rid = format!("rId{}", self.slides.len() + 3);
            notes_master_ids = format!(
                r#"<p:notesMasterIdLst><p:notesMasterId r:id="{}"/></p:notesMasterIdLst>"#,
                rid
            );
            pres_rels.push((rid, "notesMaster".into(), "notesMasters/notesMaster1.xml".into()));
            files.push((
                "ppt/notesMasters/notesMaster1.xml".into(),
                format!(
                    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:notesMaster {NS}><p:cSld><p:spTree>{GROUP_HEADER}</p:spTree></p:cSld><p:clrMap bg1="lt1" tx1="dk1" bg2="lt2" tx2="dk2" accent1="accent1" accent2="accent2" accent3="accent3" accent4="accent4" accent5="accent5" accent6="accent6" hlink="hlink" folHlink="folHlink"/></p:notesMaster>"#
                ),
            ));
            files.push((
                "ppt/notesMasters/_rels/notesMaster1.xml.rels".into(),
                rels(&[("rId1", "theme", "../theme/theme1.xml")]),
            ));
        }
        files.push((
            "ppt/presentation.xml".into(),
            format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:presentation {NS}><p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst>{notes_master_ids}<p:sldIdLst>{sld_ids}</p:sldIdLst><p:sldSz cx="10800000" cy="13500000"/><p:notesSz cx="6858000" cy="9144000"/></p:presentation>"#
            ),
        ));
        files.push(("ppt/_rels/presentation.xml.rels".into(), rels_owned(&pres_rels)));

        let mut layout_ids = String::new();
        let mut master_rels = Vec::new();
        for i in 0..n_layouts {
            let rid = format!("rId{}", i + 1);
            layout_ids.push_str(&format!(r#"<p:sldLayoutId id="{}" r:id="{}"/>"#, 2147483649u64 + i as u64, rid));
            master_rels.push((rid, "slideLayout".to_string(), format!("../slideLayouts/slideLayout{}.xml", i + 1)));
        }
        master_rels.push((format!("rId{}", n_layouts + 1), "theme".into(), "../theme/theme1.xml".into()));
        files.push((
            "ppt/slideMasters/slideMaster1.xml".into(),
            format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:sldMaster {NS}><p:cSld><p:spTree>{GROUP_HEADER}</p:spTree></p:cSld><p:clrMap bg1="lt1" tx1="dk1" bg2="lt2" tx2="dk2" accent1="accent1" accent2="accent2" accent3="accent3" accent4="accent4" accent5="accent5" accent6="accent6" hlink="hlink" folHlink="folHlink"/><p:sldLayoutIdLst>{layout_ids}</p:sldLayoutIdLst></p:sldMaster>"#
            ),
        ));
        files.push(("ppt/slideMasters/_rels/slideMaster1.xml.rels".into(), rels_owned(&master_rels)));

        for (i, name) in self.layouts.iter().enumerate() {
            files.push((
                format!("ppt/slideLayouts/slideLayout{}.xml", i + 1),
                format!(
                    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:sldLayout {NS}><p:cSld name="{name}"><p:spTree>{GROUP_HEADER}<p:sp><p:nvSpPr><p:cNvPr id="2" name="Picture Placeholder"/><p:cNvSpPr/><p:nvPr><p:ph type="pic" idx="13"/></p:nvPr></p:nvSpPr><p:spPr><a:xfrm><a:off x="100" y="200"/><a:ext cx="3000" cy="4000"/></a:xfrm></p:spPr></p:sp></p:spTree></p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sldLayout>"#
                ),
            ));
            files.push((
                format!("ppt/slideLayouts/_rels/slideLayout{}.xml.rels", i + 1),
                rels(&[("rId1", "slideMaster", "../slideMasters/slideMaster1.xml")]),
            ));
        }

        files.push((
            "ppt/theme/theme1.xml".into(),
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><a:theme xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" name="Test"><a:themeElements/></a:theme>"#.into(),
        ));

        for (i, slide) in self.slides.iter().enumerate() {
            let bg = slide.background.clone().unwrap_or_default();
            let attrs = &slide.root_attrs;
            let color_map = slide
                .color_map
                .clone()
                .unwrap_or_else(|| "<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr>".to_string());
            files.push((
                format!("ppt/slides/slide{}.xml", i + 1),
                format!(
                    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:sld {NS}{attrs}><p:cSld>{bg}<p:spTree>{GROUP_HEADER}{}</p:spTree></p:cSld>{color_map}</p:sld>"#,
                    slide.shapes
                ),
            ));
            let mut slide_rels = vec![(
                "rId1".to_string(),
                "slideLayout".to_string(),
                format!("../slideLayouts/slideLayout{}.xml", slide.layout + 1),
            )];
            slide_rels.extend(slide.rels.iter().cloned());
            if let Some(notes) = &slide.notes {
                let notes_rid = format!("rId{}", slide_rels.len() + 1);
                slide_rels.push((
                    notes_rid,
                    "notesSlide".into(),
                    format!("../notesSlides/notesSlide{}.xml", i + 1),
                ));
                files.push((
                    format!("ppt/notesSlides/notesSlide{}.xml", i + 1),
                    format!(
                        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:notes {NS}><p:cSld><p:spTree>{GROUP_HEADER}{}</p:spTree></p:cSld></p:notes>"#,
                        text_shape(2, notes)
                    ),
                ));
                files.push((
                    format!("ppt/notesSlides/_rels/notesSlide{}.xml.rels", i + 1),
                    rels_owned(&[
                        (
                            "rId1".to_string(),
                            "notesMaster".to_string(),
                            "../notesMasters/notesMaster1.xml".to_string(),
                        ),
                        (
                            "rId2".to_string(),
                            "slide".to_string(),
                            format!("../slides/slide{}.xml", i + 1),
                        ),
                    ]),
                ));
            }
            files.push((format!("ppt/slides/_rels/slide{}.xml.rels", i + 1), rels_owned(&slide_rels)));
        }

        let mut buf = Vec::new();
        {
            let mut zip = ZipWriter::new(Cursor::new(&mut buf));
            let options = FileOptions::default();
            for (name, content) in &files {
                zip.start_file(name.as_str(), options).unwrap();
                zip.write_all(content.as_bytes()).unwrap();
            }
            for (name, data) in &self.media {
                zip.start_file(format!("ppt/media/{}", name), options).unwrap();
                zip.write_all(data).unwrap();
            }
            zip.finish().unwrap();
        }
        buf
    }

    pub fn write(&self, path: &Path) {
        std::fs::write(path, self.build()).unwrap();
    }

    pub fn open(&self) -> Presentation {
        Presentation::from_bytes(&self.build()).unwrap()
    }
}

fn rels(items: &[(&str, &str, &str)]) -> String {
    let owned: Vec<(String, String, String)> = items
        .iter()
        .map(|(a, b, c)| (a.to_string(), b.to_string(), c.to_string()))
        .collect();
    rels_owned(&owned)
}

fn rels_owned(items: &[(String, String, String)]) -> String {
    let body: String = items
        .iter()
        .map(|(id, kind, target)| {
            let mode = if target.contains("://") {
                r#" TargetMode="External""#
            } else {
                ""
            };
            format!(
                r#"<Relationship Id="{}" Type="{}/{}" Target="{}"{}/>"#,
                id, REL, kind, target, mode
            )
        })
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">{}</Relationships>"#,
        body
    )
}

/// Text of every text-bearing shape on every slide.
pub fn slide_texts(presentation: &Presentation) -> Vec<Vec<String>> {
    presentation
        .slides()
        .unwrap()
        .iter()
        .map(|slide| {
            let root = presentation.read_xml(&slide.part_name).unwrap();
            shape_tree(&root)
                .map(|tree| {
                    tree.elements()
                        .filter(|e| is_shape(e))
                        .filter_map(text_body)
                        .map(text_of)
                        .collect()
                })
                .unwrap_or_default()
        })
        .collect()
}

/// Local names of the shapes on a slide.
pub fn shape_kinds(presentation: &Presentation, slide_part: &str) -> Vec<String> {
    let root = presentation.read_xml(slide_part).unwrap();
    shape_tree(&root)
        .map(|tree| {
            tree.elements()
                .filter(|e| is_shape(e))
                .map(|e| e.local_name().to_string())
                .collect()
        })
        .unwrap_or_default()
}
