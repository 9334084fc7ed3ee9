//! Core domain types, post parsing, font fitting and template configuration
//! for carousel deck generation.

pub mod color;
pub mod config;
pub mod error;
pub mod fit;
pub mod placeholder;
pub mod post;
pub mod types;

pub use color::RgbColor;
pub use config::{BlockSpec, BlockStyle, CarouselConfig, FitDefaults, TemplateMapping};
pub use error::{Error, Result};
pub use fit::{fit_font, fit_logarithmic, FitParams, FitStrategy, FontFit};
pub use placeholder::{PlaceholderSet, Token};
pub use post::{PostSections, SECTIONS};
pub use types::{Alignment, RunStyle};
