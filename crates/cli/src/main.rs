//! CLI tool for building, merging and splitting carousel decks.

use anyhow::{Context, Result};
use carousel_core::{
    fit_font, fit_logarithmic, CarouselConfig, FitDefaults, FitParams, PostSections,
};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

/// Build LinkedIn carousel decks from PowerPoint templates.
#[derive(Parser, Debug)]
#[command(name = "carousel")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fill every configured template with a post
    Build {
        /// Post text file with [SECTION] tags
        #[arg(short, long)]
        post: PathBuf,

        /// Template configuration (JSON)
        #[arg(short, long)]
        config: PathBuf,

        /// Directory for the filled files
        #[arg(short, long, default_value = "concluded")]
        out_dir: PathBuf,

        /// Base output file name; each file is prefixed with its position
        #[arg(short, long, default_value = "my_carousel.pptx")]
        name: String,

        /// Also merge the filled files into this deck
        #[arg(short, long)]
        merged: Option<PathBuf>,
    },

    /// Merge every .pptx in a directory into one deck
    Merge {
        /// Directory with the decks, merged in file-name order
        input_dir: PathBuf,

        /// Output file
        output: PathBuf,
    },

    /// Split each <style>-<name>.pptx into one file per slide layout
    Split {
        /// Directory with the decks
        input_dir: PathBuf,
    },

    /// Print the sections of a post as JSON
    Parse {
        /// Post text file
        post: PathBuf,
    },

    /// Print the estimated font size for a text
    Fit {
        /// Text to fit
        text: String,

        /// Box width in points
        #[arg(long, default_value = "395")]
        width: f64,

        /// Box height in points
        #[arg(long, default_value = "505")]
        height: f64,

        /// Character limit for the overflow flag
        #[arg(long, default_value = "840")]
        max_chars: usize,

        /// Use the length-based logarithmic estimate
        #[arg(short, long)]
        logarithmic: bool,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    if args.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    }

    match args.command {
        Command::Build {
            post,
            config,
            out_dir,
            name,
            merged,
        } => build(&post, &config, &out_dir, &name, merged.as_deref()),
        Command::Merge { input_dir, output } => merge(&input_dir, &output),
        Command::Split { input_dir } => split(&input_dir),
        Command::Parse { post } => parse(&post),
        Command::Fit {
            text,
            width,
            height,
            max_chars,
            logarithmic,
        } => {
            let fit = if logarithmic {
                fit_logarithmic(&text, FitDefaults::default().log_base_line_height, max_chars)
            } else {
                let params = FitParams::default()
                    .with_box(width, height)
                    .with_max_chars(max_chars);
                fit_font(&text, &params)
            };
            println!("{}", serde_json::to_string_pretty(&fit)?);
            Ok(())
        }
    }
}

/// Read a post file.
fn read_post(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn build(
    post: &Path,
    config_path: &Path,
    out_dir: &Path,
    name: &str,
    merged: Option<&Path>,
) -> Result<()> {
    let post_text = read_post(post)?;
    let config = CarouselConfig::from_path(config_path)
        .with_context(|| format!("Failed to load {}", config_path.display()))?;

    let report = match merged {
        Some(merged) => {
            carousel_pptx::build_and_merge(&post_text, &config, out_dir, name, merged)
        }
        None => carousel_pptx::build_carousel(&post_text, &config, out_dir, name),
    }
    .context("Failed to build carousel")?;

    for slide in &report.slides {
        println!(
            "Saved: {} ({} block(s), {} image(s))",
            slide.output.display(),
            slide.fill.blocks_replaced,
            slide.fill.images_inserted
        );
        for token in &slide.fill.overflowing {
            eprintln!("  Warning: {} is longer than the character limit", token);
        }
    }
    if let (Some(path), Some(merged)) = (merged, &report.merged) {
        println!("Merged {} slide(s) into {}", merged.total_slides, path.display());
    }
    Ok(())
}

fn merge(input_dir: &Path, output: &Path) -> Result<()> {
    let report = carousel_pptx::merge_dir(input_dir, output)
        .with_context(|| format!("Failed to merge {}", input_dir.display()))?;

    for file in &report.files {
        println!("Added {} slide(s) from {}", file.slides, file.path.display());
    }
    println!("Final merged file saved as: {}", output.display());
    println!("Total slides: {}", report.total_slides);
    Ok(())
}

fn split(input_dir: &Path) -> Result<()> {
    let written = carousel_pptx::split_dir(input_dir)
        .with_context(|| format!("Failed to split {}", input_dir.display()))?;

    for output in &written {
        println!(
            "{} slide {} -> {}",
            output.source.display(),
            output.slide + 1,
            output.path.display()
        );
    }
    Ok(())
}

fn parse(post: &Path) -> Result<()> {
    let sections = PostSections::parse(&read_post(post)?);
    println!("{}", serde_json::to_string_pretty(&sections)?);
    Ok(())
}
