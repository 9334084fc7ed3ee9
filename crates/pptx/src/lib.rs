//! PPTX (Office Open XML) package editing for carousel decks.
//!
//! A `.pptx` file is a ZIP archive of XML parts. This crate reads it into an
//! in-memory package, fills templates, and merges or splits presentations at
//! the slide level.

pub mod carousel;
pub mod discover;
pub mod fill;
pub mod merge;
pub mod opc;
pub mod presentation;
pub mod shapes;
pub mod split;
pub mod xml;

pub use carousel::{build_and_merge, build_carousel, fill_template, BuildReport, BuiltSlide};
pub use discover::list_pptx;
pub use fill::{FillReport, TemplateFiller};
pub use merge::{merge_dir, merge_files, MergeReport, MergedFile, SlideMerger};
pub use presentation::{Presentation, SlideRef};
pub use split::{split_dir, split_file, SplitOutput};
