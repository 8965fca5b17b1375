//! Command-line startup options.

use std::path::PathBuf;

use clap::Parser;

/// pixed, a small pixel editor.
///
/// Opens the given image file, or a blank canvas when none is given.
#[derive(Parser, Debug)]
#[command(name = "pixed", about = "Edit raster images pixel by pixel", version)]
pub struct CliArgs {
    /// Image file to open (PNG, BMP, TGA, JPEG, WEBP, TIFF, ICO, ...).
    pub image: Option<PathBuf>,

    /// Width of the blank canvas when no image file is given.
    #[arg(long, value_name = "PIXELS")]
    pub width: Option<u32>,

    /// Height of the blank canvas when no image file is given.
    #[arg(long, value_name = "PIXELS")]
    pub height: Option<u32>,

    /// Echo log lines to stderr as well as the session log file.
    #[arg(short, long)]
    pub verbose: bool,
}
