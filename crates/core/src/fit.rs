//! Font size estimation for text blocks placed in fixed-size boxes.
//!
//! There is no font metrics lookup here. Character widths are approximated as
//! a fixed fraction of the font size, which is good enough to pick a size that
//! keeps a block inside its box on a carousel slide.

use serde::{Deserialize, Serialize};

/// Binary search steps, always run in full.
const MAX_SEARCH_STEPS: usize = 20;

/// Texts longer than this use the narrower character width estimate.
const WIDE_TEXT_THRESHOLD: usize = 120;

/// Texts longer than this get slightly looser line spacing.
const LONG_TEXT_THRESHOLD: usize = 100;

/// Constraints for [`fit_font`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitParams {
    /// Box width in points.
    pub max_width_pt: f64,
    /// Box height in points.
    pub max_height_pt: f64,
    /// Line spacing multiplier used for the height estimate.
    pub base_line_spacing: f64,
    /// Smallest size the search may return.
    pub min_font_size: f64,
    /// Largest size the search may return.
    pub max_font_size: f64,
    /// Character count beyond which the text is reported as overflowing.
    pub max_chars: usize,
}

impl Default for FitParams {
    fn default() -> Self {
        Self {
            max_width_pt: 505.0,
            max_height_pt: 200.0,
            base_line_spacing: 0.85,
            min_font_size: 17.0,
            max_font_size: 110.0,
            max_chars: 840,
        }
    }
}

impl FitParams {
    /// Set the box dimensions in points.
    pub fn with_box(mut self, width_pt: f64, height_pt: f64) -> Self {
        self.max_width_pt = width_pt;
        self.max_height_pt = height_pt;
        self
    }

    /// Set the overflow character limit.
    pub fn with_max_chars(mut self, max_chars: usize) -> Self {
        self.max_chars = max_chars;
        self
    }
}

/// How a block's font size is estimated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FitStrategy {
    /// Box-constrained binary search ([`fit_font`]).
    #[default]
    Binary,
    /// Length-based logarithmic curve ([`fit_logarithmic`]).
    Logarithmic,
}

/// Estimated size and spacing for a text block.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FontFit {
    /// Font size in whole points.
    pub size_pt: f64,
    /// Line spacing multiplier, rounded to two decimals.
    pub line_spacing: f64,
    /// Whether the text is longer than the configured character limit.
    pub overflow: bool,
}

/// Estimate a font size that keeps `text` inside the box described by `params`.
///
/// Binary search over `[min_font_size, max_font_size]`: at each candidate size
/// the number of lines is estimated from an average character width, and the
/// size is accepted when those lines fit the box height.
pub fn fit_font(text: &str, params: &FitParams) -> FontFit {
    let num_chars = text.trim().chars().count();
    let width_factor = if num_chars > WIDE_TEXT_THRESHOLD { 1.1 } else { 1.25 };

    let chars_per_line = |font_size: f64| -> usize {
        let avg_char_width = font_size * width_factor;
        (params.max_width_pt / avg_char_width).floor().max(0.0) as usize
    };

    let mut low = params.min_font_size;
    let mut high = params.max_font_size;
    let mut best = params.min_font_size;

    // Keeps iterating past low > high; mid then converges on the last fitting size.
    for _ in 0..MAX_SEARCH_STEPS {
        let mid = (low + high) / 2.0;
        let cpl = chars_per_line(mid);
        let fits = cpl > 0 && {
            let estimated_lines = (num_chars / cpl) as f64;
            estimated_lines * mid * params.base_line_spacing <= params.max_height_pt
        };

        if fits {
            best = mid;
            low = mid + 1.0;
        } else {
            high = mid - 1.0;
        }
    }

    let size_pt = best.floor();

    let mut line_spacing = params.base_line_spacing;
    if num_chars > LONG_TEXT_THRESHOLD {
        line_spacing = (params.base_line_spacing + 0.1).min(1.0);
    }

    FontFit {
        size_pt,
        line_spacing: round2(line_spacing),
        overflow: num_chars > params.max_chars,
    }
}

/// Estimate a font size from text length alone.
///
/// Smooth logarithmic decay: roughly 110pt for 25 characters, 80pt for 50 and
/// 40pt past 100, never below 25pt. Line spacing grows with length up to 0.9.
pub fn fit_logarithmic(text: &str, base_line_height: f64, max_chars: usize) -> FontFit {
    const INTERCEPT: f64 = 160.0;
    const DECAY: f64 = 25.0;
    const MIN_SIZE: f64 = 25.0;
    const MAX_SIZE: f64 = 110.0;

    let num_chars = text.trim().chars().count().max(1);

    let size_pt = if num_chars <= 10 {
        MAX_SIZE
    } else {
        (INTERCEPT - DECAY * ((num_chars - 10) as f64).ln()).clamp(MIN_SIZE, MAX_SIZE)
    };
    let line_spacing = (base_line_height + (num_chars as f64 / 60.0) * 0.15).min(0.9);

    FontFit {
        size_pt: round2(size_pt),
        line_spacing: round2(line_spacing),
        overflow: num_chars > max_chars,
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
