//! The carousel build: fill every configured template with one post, then
//! optionally merge the results into a single deck.

use crate::fill::{FillReport, TemplateFiller};
use crate::merge::{merge_files, MergeReport};
use crate::presentation::Presentation;
use carousel_core::{CarouselConfig, FitDefaults, PostSections, Result, TemplateMapping};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// One filled template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuiltSlide {
    pub template: PathBuf,
    pub output: PathBuf,
    pub fill: FillReport,
}

/// Result of [`build_carousel`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BuildReport {
    pub slides: Vec<BuiltSlide>,
    /// Set when the outputs were merged.
    pub merged: Option<MergeReport>,
}

impl BuildReport {
    /// Paths of the filled files, in template order.
    pub fn outputs(&self) -> Vec<PathBuf> {
        self.slides.iter().map(|s| s.output.clone()).collect()
    }
}

/// Fill one template and save it to `output`.
pub fn fill_template(
    mapping: &TemplateMapping,
    sections: &PostSections,
    defaults: &FitDefaults,
    output: &Path,
) -> Result<FillReport> {
    let mut presentation = Presentation::open(&mapping.template)?;
    let report = TemplateFiller::from_mapping(mapping, sections, defaults)?.fill(&mut presentation)?;
    presentation.save(output)?;
    Ok(report)
}

/// Fill every template with `post_text`, writing `<out_dir>/<n>-<output_name>`
/// for the n-th template (1-based).
pub fn build_carousel(
    post_text: &str,
    config: &CarouselConfig,
    out_dir: &Path,
    output_name: &str,
) -> Result<BuildReport> {
    let sections = PostSections::parse(post_text);
    log::debug!("Post sections: {:?}", sections.keys().collect::<Vec<_>>());
    std::fs::create_dir_all(out_dir)?;

    let mut report = BuildReport::default();
    for (idx, mapping) in config.templates.iter().enumerate() {
        let output = out_dir.join(format!("{}-{}", idx + 1, output_name));
        let fill = fill_template(mapping, &sections, &config.defaults, &output)?;
        log::info!("Saved {}", output.display());
        report.slides.push(BuiltSlide {
            template: mapping.template.clone(),
            output,
            fill,
        });
    }
    Ok(report)
}

/// [`build_carousel`], then merge exactly the files it wrote, in order.
pub fn build_and_merge(
    post_text: &str,
    config: &CarouselConfig,
    out_dir: &Path,
    output_name: &str,
    merged: &Path,
) -> Result<BuildReport> {
    let mut report = build_carousel(post_text, config, out_dir, output_name)?;
    report.merged = Some(merge_files(&report.outputs(), merged)?);
    Ok(report)
}
