//! Palette posterization of RGBA8 pixel buffers.
//!
//! Every pixel is resolved to a Munsell color through the index's reverse
//! table, snapped to the closest palette entry, and written back as that
//! entry's RGB. Alpha passes through untouched.

use crate::color::Rgb;
use crate::error::SpectrumError;
use crate::index::ColorSpaceIndex;
use crate::munsell::MunsellColor;
use crate::store::PaletteStore;
use std::collections::HashMap;

/// Maps an RGBA8 buffer onto the colors of `palette`.
///
/// Resolution is cached per distinct RGB triple, so images with few colors
/// are cheap regardless of size. Returns `SpectrumError::InvalidArgument` if
/// the buffer length is not a multiple of 4 or the palette is empty.
pub fn posterize_rgba(
    pixels: &[u8],
    palette: &PaletteStore,
    index: &ColorSpaceIndex,
) -> Result<Vec<u8>, SpectrumError> {
    if pixels.len() % 4 != 0 {
        return Err(SpectrumError::InvalidArgument(format!(
            "RGBA buffer length {} is not a multiple of 4",
            pixels.len()
        )));
    }
    if palette.is_empty() {
        return Err(SpectrumError::InvalidArgument(
            "cannot posterize against an empty palette".into(),
        ));
    }

    let mut cache: HashMap<[u8; 3], [u8; 3]> = HashMap::new();
    let mut out = Vec::with_capacity(pixels.len());
    for px in pixels.chunks_exact(4) {
        let key = [px[0], px[1], px[2]];
        let mapped = match cache.get(&key) {
            Some(&mapped) => mapped,
            None => {
                let mapped = snap(key, palette, index)?;
                cache.insert(key, mapped);
                mapped
            }
        };
        out.extend_from_slice(&[mapped[0], mapped[1], mapped[2], px[3]]);
    }

    tracing::debug!(
        pixels = pixels.len() / 4,
        distinct = cache.len(),
        "posterized buffer"
    );
    Ok(out)
}

fn snap(
    rgb: [u8; 3],
    palette: &PaletteStore,
    index: &ColorSpaceIndex,
) -> Result<[u8; 3], SpectrumError> {
    let color = MunsellColor::from_rgb(Rgb::from_u8(rgb[0], rgb[1], rgb[2]), index)?;
    let closest = palette
        .closest_color(&color, index)?
        .ok_or_else(|| SpectrumError::InvalidArgument("palette is empty".into()))?;
    Ok(closest.color(index)?.to_u8())
}
