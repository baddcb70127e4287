//! Codefence - live embedded code editors in a terminal document.
//!
//! # Usage
//!
//! ```bash
//! codefence                       # built-in demo document
//! codefence notes.md              # host a markdown file
//! codefence --image photo.png     # image used by Insert image
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};

use codefence::app::App;
use codefence::highlight::{HighlightBackground, set_background_mode};

/// Syntax highlight theme background.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ThemeMode {
    Auto,
    Light,
    Dark,
}

/// A terminal document editor with live embedded code widgets
#[derive(Parser, Debug)]
#[command(name = "codefence", version, about, long_about = None)]
struct Cli {
    /// Markdown file to host (omit for the built-in demo document)
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Image file the Insert image command uploads
    #[arg(long, value_name = "PATH")]
    image: Option<PathBuf>,

    /// Force syntax highlight theme background (light or dark)
    #[arg(long, value_enum, default_value = "auto")]
    theme: ThemeMode,
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.theme {
        ThemeMode::Auto => set_background_mode(None),
        ThemeMode::Light => set_background_mode(Some(HighlightBackground::Light)),
        ThemeMode::Dark => set_background_mode(Some(HighlightBackground::Dark)),
    }

    if let Some(file) = &cli.file
        && !file.exists()
    {
        anyhow::bail!("File not found: {}", file.display());
    }
    if let Some(image) = &cli.image
        && !image.exists()
    {
        anyhow::bail!("Image not found: {}", image.display());
    }

    let mut app = App::new(cli.file).with_image(cli.image);
    app.run().context("Application error")
}
