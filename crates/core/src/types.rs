//! Domain types describing how substituted text is rendered.

use crate::color::RgbColor;
use serde::{Deserialize, Serialize};

/// Horizontal paragraph alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    Left,
    Center,
    Right,
}

impl Alignment {
    /// Parse an alignment name, ignoring case. Unknown names yield `None`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "left" => Some(Self::Left),
            "center" => Some(Self::Center),
            "right" => Some(Self::Right),
            _ => None,
        }
    }

    /// Value of the DrawingML `algn` attribute.
    pub fn as_ooxml(&self) -> &'static str {
        match self {
            Self::Left => "l",
            Self::Center => "ctr",
            Self::Right => "r",
        }
    }
}

/// Fully resolved formatting for one substituted block.
#[derive(Debug, Clone, PartialEq)]
pub struct RunStyle {
    /// Font size in points.
    pub size_pt: f64,
    /// Whether the run is bold.
    pub bold: bool,
    /// Latin typeface name.
    pub font: String,
    /// Optional solid fill color.
    pub color: Option<RgbColor>,
    /// Paragraph line spacing multiplier.
    pub line_spacing: f64,
    /// Optional paragraph alignment.
    pub align: Option<Alignment>,
    /// Whether the fitter flagged the text as too long.
    pub overflow: bool,
}

impl RunStyle {
    /// Font size in hundredths of a point, as stored in `a:rPr@sz`.
    pub fn size_hundredths(&self) -> u32 {
        (self.size_pt * 100.0).round().max(0.0) as u32
    }

    /// Line spacing in thousandths of a percent, as stored in `a:spcPct@val`.
    pub fn line_spacing_pct(&self) -> u32 {
        (self.line_spacing * 100_000.0).round().max(0.0) as u32
    }
}
