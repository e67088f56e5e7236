//! Opaque RGB color type and the channel arithmetic shared by lookups,
//! distances and mixing.
//!
//! Channels are `f64` in [0, 1]. Dataset rows carry 8-bit channels, which are
//! scaled by 1/255 on the way in. Alpha is always opaque and is not stored.

use crate::error::SpectrumError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Opaque RGB color with components in [0, 1].
///
/// Serializes as a hex string `"#rrggbb"` for human-readable formats.
/// The hex round-trip has 8-bit quantization (1/255 precision loss).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Rgb {
    /// Creates a color from channels in [0, 1]. Values are stored as given.
    pub const fn new(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    /// A neutral color with all three channels set to `shade`.
    pub const fn gray(shade: f64) -> Self {
        Self {
            r: shade,
            g: shade,
            b: shade,
        }
    }

    /// Creates a color from 8-bit channels.
    pub fn from_u8(r: u8, g: u8, b: u8) -> Self {
        Self {
            r: r as f64 / 255.0,
            g: g as f64 / 255.0,
            b: b as f64 / 255.0,
        }
    }

    /// Parses a hex color string like "#ff00aa" or "ff00aa" (case insensitive).
    ///
    /// Returns `SpectrumError::InvalidArgument` if the input is not a valid
    /// 6-digit hex color.
    pub fn from_hex(hex: &str) -> Result<Rgb, SpectrumError> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(SpectrumError::InvalidArgument(format!(
                "expected 6 hex digits, got '{hex}'"
            )));
        }
        let channel = |range: std::ops::Range<usize>, name: &str| {
            u8::from_str_radix(&hex[range], 16).map_err(|e| {
                SpectrumError::InvalidArgument(format!("invalid {name} component: {e}"))
            })
        };
        Ok(Rgb::from_u8(
            channel(0..2, "red")?,
            channel(2..4, "green")?,
            channel(4..6, "blue")?,
        ))
    }

    /// Quantizes the channels to 8 bits with rounding, clamping to [0, 1] first.
    pub fn to_u8(self) -> [u8; 3] {
        [
            (self.r.clamp(0.0, 1.0) * 255.0).round() as u8,
            (self.g.clamp(0.0, 1.0) * 255.0).round() as u8,
            (self.b.clamp(0.0, 1.0) * 255.0).round() as u8,
        ]
    }

    /// Converts the color to a hex string like `"#rrggbb"`.
    pub fn to_hex(self) -> String {
        let [r, g, b] = self.to_u8();
        format!("#{r:02x}{g:02x}{b:02x}")
    }

    /// True when all three channels are exactly equal.
    pub fn is_gray(self) -> bool {
        self.r == self.g && self.g == self.b
    }

    /// Sum of the absolute channel differences.
    ///
    /// This is a cheap proxy, not a perceptual metric: it lives in [0, 3] and
    /// treats the three channels as equally important.
    pub fn distance(self, other: Rgb) -> f64 {
        (self.r - other.r).abs() + (self.g - other.g).abs() + (self.b - other.b).abs()
    }
}

impl Serialize for Rgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Rgb {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Rgb::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// Weighted per-channel average of `colors`.
///
/// Returns `None` if the slices are empty, differ in length, or the weights
/// sum to exactly zero (the mix is undefined).
pub fn mix_rgb(colors: &[Rgb], weights: &[f64]) -> Option<Rgb> {
    if colors.is_empty() || colors.len() != weights.len() {
        return None;
    }

    let (mut r, mut g, mut b, mut total) = (0.0, 0.0, 0.0, 0.0);
    for (color, &weight) in colors.iter().zip(weights) {
        r += color.r * weight;
        g += color.g * weight;
        b += color.b * weight;
        total += weight;
    }

    if total == 0.0 {
        return None;
    }
    Some(Rgb::new(r / total, g / total, b / total))
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < EPSILON
    }

    // -- Hex parsing --

    #[test]
    fn from_hex_parses_with_and_without_hash() {
        let a = Rgb::from_hex("#ff8000").unwrap();
        let b = Rgb::from_hex("FF8000").unwrap();
        assert_eq!(a, b);
        assert!(approx_eq(a.r, 1.0));
        assert!(approx_eq(a.g, 128.0 / 255.0));
        assert!(approx_eq(a.b, 0.0));
    }

    #[test]
    fn from_hex_rejects_wrong_length() {
        assert!(matches!(
            Rgb::from_hex("#fff"),
            Err(SpectrumError::InvalidArgument(_))
        ));
    }

    #[test]
    fn from_hex_rejects_non_hex_digits() {
        assert!(Rgb::from_hex("#zz0000").is_err());
    }

    #[test]
    fn from_hex_rejects_multibyte_input() {
        assert!(Rgb::from_hex("ééé").is_err());
    }

    #[test]
    fn to_hex_matches_parsed_input() {
        assert_eq!(Rgb::from_hex("#c83232").unwrap().to_hex(), "#c83232");
    }

    #[test]
    fn to_u8_clamps_out_of_range_channels() {
        assert_eq!(Rgb::new(1.5, -0.2, 0.5).to_u8(), [255, 0, 128]);
    }

    #[test]
    fn serde_uses_hex_string() {
        let rgb = Rgb::from_u8(200, 50, 50);
        let json = serde_json::to_string(&rgb).unwrap();
        assert_eq!(json, "\"#c83232\"");
        let back: Rgb = serde_json::from_str(&json).unwrap();
        assert_eq!(back, rgb);
    }

    // -- Distance --

    #[test]
    fn distance_is_sum_of_absolute_channel_differences() {
        let a = Rgb::new(0.1, 0.5, 0.9);
        let b = Rgb::new(0.4, 0.3, 1.0);
        assert!(approx_eq(a.distance(b), 0.3 + 0.2 + 0.1));
        assert!(approx_eq(b.distance(a), a.distance(b)));
    }

    #[test]
    fn distance_to_self_is_zero() {
        let a = Rgb::from_u8(12, 34, 56);
        assert_eq!(a.distance(a), 0.0);
    }

    // -- Mixing --

    #[test]
    fn mix_rgb_all_zero_weights_is_none() {
        let colors = [Rgb::from_u8(255, 0, 0), Rgb::from_u8(0, 0, 255)];
        assert!(mix_rgb(&colors, &[0.0, 0.0]).is_none());
    }

    #[test]
    fn mix_rgb_empty_or_mismatched_is_none() {
        assert!(mix_rgb(&[], &[]).is_none());
        assert!(mix_rgb(&[Rgb::gray(0.5)], &[1.0, 2.0]).is_none());
    }

    #[test]
    fn mix_rgb_single_nonzero_weight_returns_that_color() {
        let red = Rgb::from_u8(200, 50, 50);
        let blue = Rgb::from_u8(10, 20, 230);
        let mixed = mix_rgb(&[red, blue], &[0.0, 3.5]).unwrap();
        assert!(approx_eq(mixed.r, blue.r), "r: {} vs {}", mixed.r, blue.r);
        assert!(approx_eq(mixed.g, blue.g), "g: {} vs {}", mixed.g, blue.g);
        assert!(approx_eq(mixed.b, blue.b), "b: {} vs {}", mixed.b, blue.b);
    }

    #[test]
    fn mix_rgb_equal_weights_averages_channels() {
        let mixed = mix_rgb(&[Rgb::new(1.0, 0.0, 0.2), Rgb::new(0.0, 1.0, 0.4)], &[2.0, 2.0])
            .unwrap();
        assert!(approx_eq(mixed.r, 0.5));
        assert!(approx_eq(mixed.g, 0.5));
        assert!(approx_eq(mixed.b, 0.3));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn mix_stays_within_channel_bounds(
                a in (0u8..=255, 0u8..=255, 0u8..=255),
                b in (0u8..=255, 0u8..=255, 0u8..=255),
                wa in 0.0_f64..20.0,
                wb in 0.01_f64..20.0,
            ) {
                let ca = Rgb::from_u8(a.0, a.1, a.2);
                let cb = Rgb::from_u8(b.0, b.1, b.2);
                let mixed = mix_rgb(&[ca, cb], &[wa, wb]).unwrap();
                let channels = [
                    (mixed.r, ca.r, cb.r),
                    (mixed.g, ca.g, cb.g),
                    (mixed.b, ca.b, cb.b),
                ];
                for (m, x, y) in channels {
                    prop_assert!(
                        m >= x.min(y) - EPSILON && m <= x.max(y) + EPSILON,
                        "mixed channel {} outside [{}, {}]", m, x.min(y), x.max(y)
                    );
                }
            }
        }
    }
}
