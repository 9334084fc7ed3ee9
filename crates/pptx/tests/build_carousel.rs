//! Integration test: the build pipeline

mod common;

use carousel_core::CarouselConfig;
use carousel_pptx::{build_and_merge, build_carousel, Presentation};
use common::{picture_placeholder, shape_kinds, slide_texts, text_shape, DeckBuilder, PIXEL};
use pretty_assertions::assert_eq;
use std::path::Path;

const POST: &str = "
[HOOK]
Ship it today
[HOOK_SUB]
Why waiting costs more

[CTA]
Follow for more
[cta_sub]
Repost if useful
";

const CONFIG: &str = r##"{
  "templates": [
    {
      "template": "templates/Cover.pptx",
      "image": null,
      "blocks": {
        "[HOOK]": { "key": "HOOK", "bold": true, "text-block-height": 430 },
        "[HOOK_SUB]": { "key": "HOOK_SUB", "size": 17 }
      }
    },
    {
      "template": "templates/CTA.pptx",
      "image": "images/me.png",
      "blocks": {
        "[CTA]": { "key": "CTA", "bold": true, "align": "center", "color": "#ffcc00" },
        "[CTA_SUB]": "CTA_SUB"
      }
    }
  ]
}"##;

fn write_project(root: &Path) -> CarouselConfig {
    std::fs::create_dir_all(root.join("templates")).unwrap();
    std::fs::create_dir_all(root.join("images")).unwrap();

    DeckBuilder::office()
        .slide(0, text_shape(2, "[HOOK]") + &text_shape(3, "[HOOK_SUB]"))
        .write(&root.join("templates/Cover.pptx"));
    DeckBuilder::office()
        .slide(
            7,
            text_shape(2, "[CTA]\n[CTA_SUB]") + &picture_placeholder(3),
        )
        .write(&root.join("templates/CTA.pptx"));
    std::fs::write(root.join("images/me.png"), PIXEL).unwrap();

    let config_path = root.join("carousel.json");
    std::fs::write(&config_path, CONFIG).unwrap();
    CarouselConfig::from_path(&config_path).unwrap()
}

#[test]
fn test_build_writes_numbered_outputs() {
    let project = tempfile::tempdir().unwrap();
    let config = write_project(project.path());
    let out_dir = project.path().join("concluded");

    let report = build_carousel(POST, &config, &out_dir, "my_carousel.pptx").unwrap();
    assert_eq!(
        report.outputs(),
        vec![
            out_dir.join("1-my_carousel.pptx"),
            out_dir.join("2-my_carousel.pptx"),
        ]
    );
    assert!(report.merged.is_none());
    assert_eq!(report.slides[0].fill.blocks_replaced, 2);
    assert_eq!(report.slides[1].fill.images_inserted, 1);

    let cta = Presentation::open(out_dir.join("2-my_carousel.pptx")).unwrap();
    assert_eq!(
        slide_texts(&cta),
        vec![vec!["Follow for more\nRepost if useful".to_string()]]
    );
    let slides = cta.slides().unwrap();
    assert_eq!(shape_kinds(&cta, &slides[0].part_name), vec!["sp", "pic"]);

    let root = cta.read_xml(&slides[0].part_name).unwrap();
    let paragraph = root
        .find(&["cSld", "spTree", "sp", "txBody", "p"])
        .unwrap();
    assert_eq!(paragraph.child("pPr").unwrap().attr("algn"), Some("ctr"));
    let color = paragraph
        .find(&["r", "rPr", "solidFill", "srgbClr"])
        .unwrap();
    assert_eq!(color.attr("val"), Some("FFCC00"));
}

#[test]
fn test_build_and_merge() {
    let project = tempfile::tempdir().unwrap();
    let config = write_project(project.path());
    let out_dir = project.path().join("concluded");
    let merged_path = project.path().join("final").join("deck.pptx");

    // a stale file in the output directory is not merged
    std::fs::create_dir_all(&out_dir).unwrap();
    DeckBuilder::office()
        .slide(0, text_shape(2, "stale"))
        .write(&out_dir.join("0-old.pptx"));

    let report = build_and_merge(POST, &config, &out_dir, "deck.pptx", &merged_path).unwrap();
    let merged_report = report.merged.unwrap();
    assert_eq!(merged_report.total_slides, 2);

    let merged = Presentation::open(&merged_path).unwrap();
    assert_eq!(
        slide_texts(&merged),
        vec![
            vec!["Ship it today".to_string(), "Why waiting costs more".to_string()],
            vec!["Follow for more\nRepost if useful".to_string()],
        ]
    );
}

#[test]
fn test_missing_template_fails() {
    let project = tempfile::tempdir().unwrap();
    let config_path = project.path().join("carousel.json");
    std::fs::write(&config_path, CONFIG).unwrap();
    let config = CarouselConfig::from_path(&config_path).unwrap();

    let result = build_carousel(POST, &config, &project.path().join("out"), "x.pptx");
    assert!(result.is_err());
}
