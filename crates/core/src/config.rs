//! Carousel configuration: which templates to fill and how each block looks.
//!
//! Loaded from JSON. Each template entry maps placeholder tokens found in the
//! template's text boxes to a post section, optionally with style overrides.

use crate::color::RgbColor;
use crate::error::{Error, Result};
use crate::fit::{fit_font, fit_logarithmic, FitParams, FitStrategy};
use crate::types::{Alignment, RunStyle};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Shared sizing and font defaults applied to every block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitDefaults {
    /// Width of the fitting box in points.
    pub box_width_pt: f64,
    /// Height of the fitting box when a block sets no `text-block-height`.
    pub box_height_pt: f64,
    /// Character count past which a block is reported as overflowing.
    pub max_chars: usize,
    /// Smallest font size ever written to a run.
    pub min_run_size_pt: f64,
    /// Base line height for the logarithmic fitter.
    pub log_base_line_height: f64,
    /// Typeface for bold blocks.
    pub bold_font: String,
    /// Typeface for regular blocks.
    pub regular_font: String,
}

impl Default for FitDefaults {
    fn default() -> Self {
        Self {
            box_width_pt: 395.0,
            box_height_pt: 505.0,
            max_chars: 840,
            min_run_size_pt: 12.0,
            log_base_line_height: 0.8,
            bold_font: "Poppins".to_string(),
            regular_font: "Poppins thin".to_string(),
        }
    }
}

/// Style overrides for one placeholder.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlockStyle {
    /// Post section whose text replaces the placeholder.
    pub key: String,
    /// Fixed font size; fitted when absent.
    #[serde(default)]
    pub size: Option<f64>,
    #[serde(default)]
    pub bold: bool,
    /// Typeface override.
    #[serde(default)]
    pub font: Option<String>,
    /// Hex color such as `#fff`.
    #[serde(default)]
    pub color: Option<String>,
    /// `left`, `center` or `right`; anything else is ignored.
    #[serde(default)]
    pub align: Option<String>,
    /// Paragraph line spacing, overriding the derived value.
    #[serde(default, rename = "line-height")]
    pub line_height: Option<f64>,
    /// Spacing used to derive the paragraph spacing, overriding the fitted one.
    #[serde(default)]
    pub line_spacing: Option<f64>,
    /// Height of the fitting box in points.
    #[serde(default, rename = "text-block-height")]
    pub text_block_height: Option<f64>,
    #[serde(default)]
    pub fit: FitStrategy,
}

impl BlockStyle {
    /// A plain block for a section, with every style derived.
    pub fn for_key(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Self::default()
        }
    }

    /// Resolve the final run and paragraph formatting for `text`.
    pub fn resolve(&self, text: &str, defaults: &FitDefaults) -> Result<RunStyle> {
        let fit = match self.fit {
            FitStrategy::Binary => {
                let params = FitParams::default()
                    .with_box(
                        defaults.box_width_pt,
                        self.text_block_height.unwrap_or(defaults.box_height_pt),
                    )
                    .with_max_chars(defaults.max_chars);
                fit_font(text, &params)
            }
            FitStrategy::Logarithmic => {
                fit_logarithmic(text, defaults.log_base_line_height, defaults.max_chars)
            }
        };

        let size_pt = self.size.unwrap_or(fit.size_pt).max(defaults.min_run_size_pt);
        let spacing = self.line_spacing.unwrap_or(fit.line_spacing);
        let line_spacing = self.line_height.unwrap_or_else(|| (spacing + 0.15).min(1.2));

        let font = match &self.font {
            Some(font) => font.clone(),
            None if self.bold => defaults.bold_font.clone(),
            None => defaults.regular_font.clone(),
        };

        let color = self.color.as_deref().map(RgbColor::from_hex).transpose()?;

        let align = self.align.as_deref().and_then(|name| {
            let parsed = Alignment::from_name(name);
            if parsed.is_none() {
                log::warn!("Ignoring unknown alignment '{}' for {}", name, self.key);
            }
            parsed
        });

        Ok(RunStyle {
            size_pt,
            bold: self.bold,
            font,
            color,
            line_spacing,
            align,
            overflow: fit.overflow,
        })
    }
}

/// A block entry: a bare section key or a full style object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BlockSpec {
    Key(String),
    Style(BlockStyle),
}

impl BlockSpec {
    /// Normalize into a style object.
    pub fn to_style(&self) -> BlockStyle {
        match self {
            BlockSpec::Key(key) => BlockStyle::for_key(key.clone()),
            BlockSpec::Style(style) => style.clone(),
        }
    }
}

/// One template to fill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateMapping {
    /// Path to the `.pptx` template.
    pub template: PathBuf,
    /// Image placed into picture placeholders.
    #[serde(default)]
    pub image: Option<PathBuf>,
    /// Placeholder token (e.g. `[HOOK]`) to block spec.
    pub blocks: BTreeMap<String, BlockSpec>,
}

impl TemplateMapping {
    /// Placeholder tokens paired with normalized styles.
    pub fn styles(&self) -> Vec<(String, BlockStyle)> {
        self.blocks
            .iter()
            .map(|(token, spec)| (token.clone(), spec.to_style()))
            .collect()
    }
}

/// The full carousel configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarouselConfig {
    #[serde(default)]
    pub defaults: FitDefaults,
    pub templates: Vec<TemplateMapping>,
}

impl CarouselConfig {
    /// Parse a configuration from JSON text. Paths are kept as written.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        if config.templates.is_empty() {
            return Err(Error::ConfigError("No templates configured".into()));
        }
        Ok(config)
    }

    /// Load a configuration file, resolving relative paths against its directory.
    pub fn from_path(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            Error::ConfigError(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let mut config = Self::from_json_str(&json)?;
        if let Some(base) = path.parent() {
            config.resolve_paths(base);
        }
        Ok(config)
    }

    /// Make relative template and image paths relative to `base` instead.
    pub fn resolve_paths(&mut self, base: &Path) {
        let rebase = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };
        for mapping in &mut self.templates {
            rebase(&mut mapping.template);
            if let Some(image) = mapping.image.as_mut() {
                rebase(image);
            }
        }
    }
}
