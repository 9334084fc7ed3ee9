//! Helpers for reading and building shapes in a slide's shape tree.

use crate::presentation::Prefixes;
use crate::xml::XmlElement;

/// Position and size of a shape, in EMUs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Xfrm {
    pub x: i64,
    pub y: i64,
    pub cx: i64,
    pub cy: i64,
}

/// Placeholder identity (`p:ph`) of a shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceholderInfo {
    /// `type` attribute; absent means a body/object placeholder.
    pub kind: Option<String>,
    /// `idx` attribute, linking slide placeholders to layout placeholders.
    pub idx: Option<String>,
}

/// The shape tree (`p:cSld/p:spTree`) of a slide, layout or master.
pub fn shape_tree(root: &XmlElement) -> Option<&XmlElement> {
    root.find(&["cSld", "spTree"])
}

/// Mutable access to the shape tree.
pub fn shape_tree_mut(root: &mut XmlElement) -> Option<&mut XmlElement> {
    root.find_mut(&["cSld", "spTree"])
}

/// Whether a shape tree child is a shape rather than the tree's own header.
pub fn is_shape(el: &XmlElement) -> bool {
    !matches!(el.local_name(), "nvGrpSpPr" | "grpSpPr" | "extLst")
}

/// Non-visual properties (`p:nvSpPr`, `p:nvPicPr`, ...) of a shape.
fn non_visual(el: &XmlElement) -> Option<&XmlElement> {
    el.elements()
        .find(|c| c.local_name().starts_with("nv") && c.local_name().ends_with("Pr"))
}

/// Placeholder identity of a shape, if it is one.
pub fn placeholder_of(el: &XmlElement) -> Option<PlaceholderInfo> {
    let ph = non_visual(el)?.find(&["nvPr", "ph"])?;
    Some(PlaceholderInfo {
        kind: ph.attr("type").map(str::to_string),
        idx: ph.attr("idx").map(str::to_string),
    })
}

/// Whether a shape is a picture placeholder waiting for an image.
pub fn is_picture_placeholder(el: &XmlElement) -> bool {
    el.is("sp")
        && placeholder_of(el).is_some_and(|ph| ph.kind.as_deref() == Some("pic"))
}

/// Own transform of a shape, if it declares one.
pub fn xfrm_of(el: &XmlElement) -> Option<Xfrm> {
    let xfrm = match el.local_name() {
        "graphicFrame" => el.child("xfrm")?,
        "grpSp" => el.find(&["grpSpPr", "xfrm"])?,
        _ => el.find(&["spPr", "xfrm"])?,
    };
    let off = xfrm.child("off")?;
    let ext = xfrm.child("ext")?;
    let num = |e: &XmlElement, name: &str| e.attr(name).and_then(|v| v.parse::<i64>().ok());
    Some(Xfrm {
        x: num(off, "x")?,
        y: num(off, "y")?,
        cx: num(ext, "cx")?,
        cy: num(ext, "cy")?,
    })
}

/// Find the layout placeholder a slide placeholder inherits from: same `idx`
/// when the slide placeholder has one, otherwise same `type`.
pub fn inherited_xfrm(layout_root: &XmlElement, ph: &PlaceholderInfo) -> Option<Xfrm> {
    let tree = shape_tree(layout_root)?;
    tree.elements()
        .filter(|e| is_shape(e))
        .find(|e| match placeholder_of(e) {
            Some(candidate) if ph.idx.is_some() => candidate.idx == ph.idx,
            Some(candidate) => candidate.kind == ph.kind,
            None => false,
        })
        .and_then(xfrm_of)
}

/// The text body of a shape.
pub fn text_body(el: &XmlElement) -> Option<&XmlElement> {
    el.child("txBody")
}

/// Text of a text body: paragraphs joined by `\n`, line breaks as `\n`.
pub fn text_of(tx_body: &XmlElement) -> String {
    tx_body
        .elements()
        .filter(|e| e.is("p"))
        .map(paragraph_text)
        .collect::<Vec<_>>()
        .join("\n")
}

fn paragraph_text(p: &XmlElement) -> String {
    let mut text = String::new();
    for child in p.elements() {
        match child.local_name() {
            "r" | "fld" => {
                if let Some(t) = child.child("t") {
                    text.push_str(&t.text());
                }
            }
            "br" => text.push('\n'),
            _ => {}
        }
    }
    text
}

/// Largest `cNvPr@id` used anywhere in a slide.
pub fn max_shape_id(root: &XmlElement) -> u32 {
    let mut max = 0;
    root.walk(&mut |e| {
        if e.is("cNvPr") {
            if let Some(id) = e.attr("id").and_then(|v| v.parse::<u32>().ok()) {
                max = max.max(id);
            }
        }
    });
    max
}

/// A picture shape showing the image related by `rel_id`, stretched over `xfrm`.
pub fn picture(px: &Prefixes, id: u32, rel_id: &str, xfrm: Xfrm) -> XmlElement {
    let nv_pic_pr = XmlElement::new(px.p("nvPicPr"))
        .with_child(
            XmlElement::new(px.p("cNvPr"))
                .with_attr("id", id.to_string())
                .with_attr("name", format!("Picture {}", id.saturating_sub(1))),
        )
        .with_child(
            XmlElement::new(px.p("cNvPicPr")).with_child(
                XmlElement::new(px.a("picLocks")).with_attr("noChangeAspect", "1"),
            ),
        )
        .with_child(XmlElement::new(px.p("nvPr")));

    let blip_fill = XmlElement::new(px.p("blipFill"))
        .with_child(XmlElement::new(px.a("blip")).with_attr(px.r("embed"), rel_id))
        .with_child(XmlElement::new(px.a("stretch")).with_child(XmlElement::new(px.a("fillRect"))));

    let sp_pr = XmlElement::new(px.p("spPr"))
        .with_child(
            XmlElement::new(px.a("xfrm"))
                .with_child(
                    XmlElement::new(px.a("off"))
                        .with_attr("x", xfrm.x.to_string())
                        .with_attr("y", xfrm.y.to_string()),
                )
                .with_child(
                    XmlElement::new(px.a("ext"))
                        .with_attr("cx", xfrm.cx.to_string())
                        .with_attr("cy", xfrm.cy.to_string()),
                ),
        )
        .with_child(
            XmlElement::new(px.a("prstGeom"))
                .with_attr("prst", "rect")
                .with_child(XmlElement::new(px.a("avLst"))),
        );

    XmlElement::new(px.p("pic"))
        .with_child(nv_pic_pr)
        .with_child(blip_fill)
        .with_child(sp_pr)
}
