//! Image file posterization.
//!
//! Decoding and encoding go through the `image` crate; the pixel mapping
//! itself lives in [`spectrum_core::posterize`].

use crate::error::CliError;
use spectrum_core::{posterize_rgba, ColorSpaceIndex, PaletteStore};
use std::path::Path;

/// Reads `input`, maps every pixel onto `palette` and writes the result to
/// `output` as PNG. Returns the image dimensions.
///
/// Returns `CliError::Io` on read, decode or write failure.
pub fn posterize_file(
    input: &Path,
    output: &Path,
    palette: &PaletteStore,
    index: &ColorSpaceIndex,
) -> Result<(u32, u32), CliError> {
    let img = image::open(input)
        .map_err(|e| CliError::Io(format!("cannot open {}: {e}", input.display())))?
        .to_rgba8();
    let (w, h) = img.dimensions();
    let rgba = posterize_rgba(img.as_raw(), palette, index)?;
    let out = image::RgbaImage::from_raw(w, h, rgba)
        .ok_or_else(|| CliError::Io("RGBA buffer size mismatch".into()))?;
    out.save_with_format(output, image::ImageFormat::Png)
        .map_err(|e| CliError::Io(format!("cannot write {}: {e}", output.display())))?;
    Ok((w, h))
}
