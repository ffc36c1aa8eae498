//! Screenshots of the software display
//!
//! Saved as PNG to `<data dir>/screenshots/` unless a path is given.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::display::SoftwareDisplay;

/// Directory screenshots are written to by default.
pub fn screenshots_dir() -> Result<PathBuf> {
    let dir = redview_core::config::data_dir()
        .context("Could not determine data directory")?
        .join("screenshots");
    std::fs::create_dir_all(&dir).context("Failed to create screenshots directory")?;
    Ok(dir)
}

/// Generate a timestamped filename with a mode prefix.
pub fn timestamped_filename(mode: &str, extension: &str) -> String {
    let now = chrono::Local::now();
    format!(
        "redview_{}_{}.{}",
        mode,
        now.format("%Y-%m-%d_%H-%M-%S"),
        extension
    )
}

/// Write the display canvas as an RGBA PNG.
pub fn save_png(display: &SoftwareDisplay, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).context("Failed to create screenshot directory")?;
    }
    let file = File::create(path).context("Failed to create screenshot file")?;
    let writer = BufWriter::new(file);

    let mut encoder = png::Encoder::new(writer, display.width(), display.height());
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);

    let mut png_writer = encoder
        .write_header()
        .context("Failed to write PNG header")?;
    png_writer
        .write_image_data(display.rgba_bytes())
        .context("Failed to write PNG data")?;

    tracing::info!("Screenshot saved: {}", path.display());
    Ok(())
}

/// Save to the default screenshots directory with a timestamped name.
pub fn save_screenshot(display: &SoftwareDisplay, mode: &str) -> Result<PathBuf> {
    let path = screenshots_dir()?.join(timestamped_filename(mode, "png"));
    save_png(display, &path)?;
    Ok(path)
}
