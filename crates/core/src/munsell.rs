//! The Munsell color value type and its derived operations.
//!
//! A [`MunsellColor`] is a (hue, value, chroma) triple. Its RGB rendition is
//! resolved through a [`ColorSpaceIndex`] the first time it is asked for and
//! cached on the instance afterwards; neutral colors skip the index and use
//! `value / 10` on every channel.

use crate::color::{mix_rgb, Rgb};
use crate::error::SpectrumError;
use crate::hue::{Hue, GRAYSCALE_PREFIX};
use crate::index::ColorSpaceIndex;
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// Upper bound on Munsell value (lightness).
pub const MAX_VALUE: f64 = 10.0;
/// Upper bound on Munsell chroma.
pub const MAX_CHROMA: f64 = 40.0;

/// A color in the Munsell system.
///
/// Equality is structural over (hue, value, chroma); the cached RGB does not
/// take part in it.
#[derive(Debug, Clone)]
pub struct MunsellColor {
    hue: Hue,
    value: f64,
    chroma: f64,
    rgb: OnceLock<Rgb>,
}

impl MunsellColor {
    /// Creates a validated color.
    ///
    /// Returns `SpectrumError::InvalidArgument` if `value` is outside [0, 10]
    /// or `chroma` exceeds 40 (or either is NaN).
    pub fn new(hue: Hue, value: f64, chroma: f64) -> Result<Self, SpectrumError> {
        if !(0.0..=MAX_VALUE).contains(&value) {
            return Err(SpectrumError::InvalidArgument(format!(
                "Munsell value must be within [0, {MAX_VALUE}], got {value}"
            )));
        }
        if chroma.is_nan() || chroma > MAX_CHROMA {
            return Err(SpectrumError::InvalidArgument(format!(
                "Munsell chroma must not exceed {MAX_CHROMA}, got {chroma}"
            )));
        }
        Ok(Self {
            hue,
            value,
            chroma,
            rgb: OnceLock::new(),
        })
    }

    /// A validated color whose RGB is already known, such as a table entry.
    pub(crate) fn resolved(
        hue: Hue,
        value: f64,
        chroma: f64,
        rgb: Rgb,
    ) -> Result<Self, SpectrumError> {
        let color = Self::new(hue, value, chroma)?;
        let _ = color.rgb.set(rgb);
        Ok(color)
    }

    /// The neutral color `N<value>`.
    pub fn neutral(value: f64) -> Result<Self, SpectrumError> {
        Self::new(Hue::GRAYSCALE, value, 0.0)
    }

    pub fn hue(&self) -> Hue {
        self.hue
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn chroma(&self) -> f64 {
        self.chroma
    }

    pub fn is_grayscale(&self) -> bool {
        self.hue.is_grayscale()
    }

    /// The RGB rendition of this color, resolved once and cached.
    ///
    /// The cache is filled by whichever index resolves the color first, so a
    /// color should only ever be resolved against a single index.
    pub fn color(&self, index: &ColorSpaceIndex) -> Result<Rgb, SpectrumError> {
        if let Some(rgb) = self.rgb.get() {
            return Ok(*rgb);
        }
        let rgb = if self.hue.is_grayscale() {
            Rgb::gray(self.value / MAX_VALUE)
        } else {
            index.lookup(self.hue, self.value, self.chroma)?
        };
        Ok(*self.rgb.get_or_init(|| rgb))
    }

    /// Resolves an RGB color back to the Munsell system.
    ///
    /// Exact grays short-circuit to `N(red * 10)`; everything else goes
    /// through the index's reverse table.
    pub fn from_rgb(rgb: Rgb, index: &ColorSpaceIndex) -> Result<Self, SpectrumError> {
        if rgb.is_gray() {
            return Self::neutral(rgb.r * MAX_VALUE);
        }
        index.lookup_rgb(rgb).cloned()
    }

    /// Sum of absolute RGB channel differences between the two resolved colors.
    pub fn distance(
        &self,
        other: &MunsellColor,
        index: &ColorSpaceIndex,
    ) -> Result<f64, SpectrumError> {
        Ok(self.color(index)?.distance(other.color(index)?))
    }

    /// The color on the opposite side of the hue circle, at the same value and
    /// chroma. Neutral colors have no hue to rotate and are their own
    /// complement.
    pub fn complementary_color(&self) -> Result<Self, SpectrumError> {
        if self.hue.is_grayscale() {
            return Self::new(self.hue, self.value, self.chroma);
        }
        let hue = Hue::new((self.hue.value() + 50.0) % 100.0)?;
        Self::new(hue, self.value, self.chroma)
    }

    /// The nine other integer-stepped hues of this color's sector.
    ///
    /// Offsets advance by 1..=9 modulo 10 and wrap around inside the sector
    /// rather than spilling into the neighbouring prefix, so `5R` yields
    /// `6R, 7R, 8R, 9R, 0R, 1R, ...` and never `1YR`.
    pub fn analogous_colors(&self) -> Result<Vec<Self>, SpectrumError> {
        let prefix = self.hue.prefix();
        let offset = self.hue.hue_value();
        (1..10)
            .map(|step| {
                let hue = Hue::from_prefix(prefix, (offset + step as f64) % 10.0)?;
                Self::new(hue, self.value, self.chroma)
            })
            .collect()
    }

    /// Mixes `colors` with the given weights and resolves the result back to
    /// a Munsell color.
    ///
    /// Returns `Ok(None)` when the mix is undefined: empty input, mismatched
    /// lengths, or weights summing to zero.
    pub fn mix(
        colors: &[MunsellColor],
        weights: &[f64],
        index: &ColorSpaceIndex,
    ) -> Result<Option<Self>, SpectrumError> {
        if colors.is_empty() || colors.len() != weights.len() {
            return Ok(None);
        }
        let rgbs = colors
            .iter()
            .map(|c| c.color(index))
            .collect::<Result<Vec<_>, _>>()?;
        match mix_rgb(&rgbs, weights) {
            Some(mixed) => Self::from_rgb(mixed, index).map(Some),
            None => Ok(None),
        }
    }

    /// Weighted RGB average of `colors`, without resolving back to Munsell.
    pub fn mix_rgb(
        colors: &[MunsellColor],
        weights: &[f64],
        index: &ColorSpaceIndex,
    ) -> Result<Option<Rgb>, SpectrumError> {
        if colors.is_empty() || colors.len() != weights.len() {
            return Ok(None);
        }
        let rgbs = colors
            .iter()
            .map(|c| c.color(index))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(mix_rgb(&rgbs, weights))
    }
}

impl PartialEq for MunsellColor {
    fn eq(&self, other: &Self) -> bool {
        self.hue == other.hue && self.value == other.value && self.chroma == other.chroma
    }
}

/// `N5` for neutrals, otherwise `5R, 5, 4` with value and chroma rounded.
impl fmt::Display for MunsellColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.hue.is_grayscale() {
            return write!(f, "{GRAYSCALE_PREFIX}{}", self.value.round() as i64);
        }
        write!(
            f,
            "{}, {}, {}",
            self.hue,
            self.value.round() as i64,
            self.chroma.round() as i64
        )
    }
}

/// Parses Munsell notation: `5R/5/4`, `5R 5/4` or a neutral `N5` / `N 5`.
impl FromStr for MunsellColor {
    type Err = SpectrumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed =
            || SpectrumError::InvalidArgument(format!("malformed Munsell color '{s}'"));
        let number = |part: &str| part.trim().parse::<f64>().map_err(|_| malformed());

        let trimmed = s.trim();
        if let Some(rest) = trimmed.strip_prefix(GRAYSCALE_PREFIX) {
            let rest = rest.trim().trim_end_matches('/');
            return Self::neutral(number(rest)?);
        }

        let parts: Vec<&str> = trimmed
            .split(|c: char| c == '/' || c.is_whitespace())
            .filter(|p| !p.is_empty())
            .collect();
        let [hue, value, chroma] = parts.as_slice() else {
            return Err(malformed());
        };
        Self::new(hue.parse()?, number(*value)?, number(*chroma)?)
    }
}

impl Serialize for MunsellColor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;
        let mut state = serializer.serialize_struct("MunsellColor", 3)?;
        state.serialize_field("hue", &self.hue)?;
        state.serialize_field("value", &self.value)?;
        state.serialize_field("chroma", &self.chroma)?;
        state.end()
    }
}
