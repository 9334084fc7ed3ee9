//! Splitting presentations into one file per slide, named after the slide's
//! layout.

use crate::discover::list_pptx;
use crate::presentation::Presentation;
use carousel_core::Result;
use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// One file written by a split.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SplitOutput {
    pub source: PathBuf,
    pub style: String,
    /// 0-based slide index in the source.
    pub slide: usize,
    pub layout: String,
    pub path: PathBuf,
}

/// File stem for a layout name: trimmed, spaces replaced by underscores.
pub fn layout_file_stem(layout_name: &str, slide: usize) -> String {
    let stem = layout_name.trim().replace(' ', "_");
    if stem.is_empty() {
        format!("Slide_{}", slide + 1)
    } else {
        stem
    }
}

/// Style prefix of a file named `<style>-<rest>.pptx`.
pub fn style_of(path: &Path) -> Option<String> {
    let stem = path.file_stem()?.to_str()?;
    let (style, _) = stem.split_once('-')?;
    Some(style.to_string())
}

/// Write every slide of `path` to `out_dir/<LayoutName>.pptx`, each a copy of
/// the source with all other slides removed.
pub fn split_file(path: &Path, style: &str, out_dir: &Path) -> Result<Vec<SplitOutput>> {
    let presentation = Presentation::open(path)?;
    std::fs::create_dir_all(out_dir)?;

    let slides = presentation.slides()?;
    let mut written = Vec::with_capacity(slides.len());
    let mut seen: HashSet<String> = HashSet::new();

    for (idx, slide) in slides.iter().enumerate() {
        let layout = match presentation.layout_of(&slide.part_name)? {
            Some(layout_part) => presentation.layout_name(&layout_part)?,
            None => String::new(),
        };
        let stem = layout_file_stem(&layout, idx);
        let out_path = out_dir.join(format!("{}.pptx", stem));
        if !seen.insert(stem) {
            log::info!(
                "Slide {} of {} overwrites {}",
                idx + 1,
                path.display(),
                out_path.display()
            );
        }

        let mut single = presentation.clone();
        single.retain_slides(|i| i == idx)?;
        single.save(&out_path)?;
        log::info!("Slide {} -> {}", idx + 1, out_path.display());

        written.push(SplitOutput {
            source: path.to_path_buf(),
            style: style.to_string(),
            slide: idx,
            layout,
            path: out_path,
        });
    }
    Ok(written)
}

/// Split every `<style>-<rest>.pptx` in `dir` into `dir/<style>/`. Files
/// without a style prefix are skipped.
pub fn split_dir(dir: &Path) -> Result<Vec<SplitOutput>> {
    let mut written = Vec::new();
    for path in list_pptx(dir)? {
        let Some(style) = style_of(&path) else {
            log::warn!("Skipped (no style prefix): {}", path.display());
            continue;
        };
        log::info!("Processing {} (style={})", path.display(), style);
        let out_dir = dir.join(&style);
        written.extend(split_file(&path, &style, &out_dir)?);
    }
    Ok(written)
}
