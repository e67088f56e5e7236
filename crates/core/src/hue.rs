//! Circular Munsell hue position.
//!
//! The hue circle is stored as a single number in [0, 100]: ten sectors of
//! width 10, one per prefix in [`HUE_PREFIXES`]. `2.5R` is 2.5, `5YR` is 15,
//! `10RP` is 100 (an alias for the end of the last sector). The value -1 marks
//! a neutral color with no hue at all, written with the prefix `N`.

use crate::error::SpectrumError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// The ten hue sectors in circular order, each 10 units wide.
pub const HUE_PREFIXES: [&str; 10] = ["R", "YR", "Y", "GY", "G", "BG", "B", "PB", "P", "RP"];

/// Prefix used for neutral (grayscale) colors.
pub const GRAYSCALE_PREFIX: &str = "N";

const GRAYSCALE_VALUE: f64 = -1.0;

/// A position on the Munsell hue circle, or the grayscale sentinel.
///
/// Equality and hashing are exact on the underlying number, so a `Hue` can key
/// the lookup tables in [`ColorSpaceIndex`](crate::index::ColorSpaceIndex).
#[derive(Debug, Clone, Copy)]
pub struct Hue {
    value: f64,
}

impl Hue {
    /// The "no hue" sentinel used by neutral colors.
    pub const GRAYSCALE: Hue = Hue {
        value: GRAYSCALE_VALUE,
    };

    /// Creates a hue from its position on the circle.
    ///
    /// Accepts -1 (grayscale) or anything in [0, 100]. Returns
    /// `SpectrumError::InvalidArgument` otherwise, including for NaN.
    pub fn new(value: f64) -> Result<Self, SpectrumError> {
        let grayscale = value == GRAYSCALE_VALUE;
        if value.is_nan() || (!grayscale && value < 0.0) || value > 100.0 {
            return Err(SpectrumError::InvalidArgument(format!(
                "hue value must be -1 or within [0, 100], got {value}"
            )));
        }
        // normalizes -0.0 so that Eq/Hash agree with ==
        Ok(Self { value: value + 0.0 })
    }

    /// Creates a hue from a sector prefix and an offset within that sector.
    ///
    /// The prefix `N` always yields [`Hue::GRAYSCALE`], whatever the offset.
    /// Any other prefix must be one of [`HUE_PREFIXES`].
    pub fn from_prefix(prefix: &str, offset: f64) -> Result<Self, SpectrumError> {
        if prefix == GRAYSCALE_PREFIX {
            return Ok(Self::GRAYSCALE);
        }
        let index = HUE_PREFIXES
            .iter()
            .position(|&p| p == prefix)
            .ok_or_else(|| {
                SpectrumError::InvalidArgument(format!("prefix '{prefix}' is not a valid hue"))
            })?;
        Self::new(index as f64 * 10.0 + offset)
    }

    /// Raw position on the circle: -1 for grayscale, otherwise [0, 100].
    pub fn value(self) -> f64 {
        self.value
    }

    pub fn is_grayscale(self) -> bool {
        self.value == GRAYSCALE_VALUE
    }

    /// Sector code: `N` for grayscale, `RP` for the 100 alias, otherwise the
    /// sector containing the value.
    pub fn prefix(self) -> &'static str {
        if self.is_grayscale() {
            GRAYSCALE_PREFIX
        } else if self.value == 100.0 {
            "RP"
        } else {
            HUE_PREFIXES[self.value as usize / 10]
        }
    }

    /// Offset within the sector, in [0, 10]. Zero for grayscale, 10 for the
    /// 100 alias.
    pub fn hue_value(self) -> f64 {
        if self.is_grayscale() {
            0.0
        } else if self.value == 100.0 {
            10.0
        } else {
            self.value % 10.0
        }
    }
}

impl PartialEq for Hue {
    fn eq(&self, other: &Self) -> bool {
        self.value.to_bits() == other.value.to_bits()
    }
}

impl Eq for Hue {}

impl Hash for Hue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.to_bits().hash(state);
    }
}

/// Integer offsets print bare (`5R`), fractional ones with two decimals
/// rounded half up (`2.50R`, `2.125R` as `2.13R`).
impl fmt::Display for Hue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let offset = self.hue_value();
        if offset % 1.0 == 0.0 {
            write!(f, "{}{}", offset as i64, self.prefix())
        } else {
            let rounded = (offset * 100.0 + 0.5).floor() / 100.0;
            write!(f, "{rounded:.2}{}", self.prefix())
        }
    }
}

/// Parses strings like `2.5R`, `10RP` or `N`: a leading numeric run followed
/// by a trailing alphabetic prefix.
impl FromStr for Hue {
    type Err = SpectrumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let numeric_len = s
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(s.len());
        let prefix_start = s
            .char_indices()
            .rev()
            .take_while(|(_, c)| c.is_alphabetic())
            .last()
            .map_or(s.len(), |(i, _)| i);
        let numeric = &s[..numeric_len];
        let prefix = &s[prefix_start..];

        if prefix == GRAYSCALE_PREFIX && numeric.is_empty() {
            return Ok(Self::GRAYSCALE);
        }
        let offset: f64 = numeric.parse().map_err(|_| {
            SpectrumError::InvalidArgument(format!("malformed hue string '{s}'"))
        })?;
        Self::from_prefix(prefix, offset)
    }
}

impl Serialize for Hue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Hue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -- Construction --

    #[test]
    fn new_accepts_bounds_and_grayscale() {
        assert!(Hue::new(0.0).is_ok());
        assert!(Hue::new(100.0).is_ok());
        assert!(Hue::new(-1.0).unwrap().is_grayscale());
    }

    #[test]
    fn new_rejects_out_of_range() {
        for bad in [-0.5, -2.0, 100.01, f64::NAN] {
            assert!(
                matches!(Hue::new(bad), Err(SpectrumError::InvalidArgument(_))),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn negative_zero_equals_zero() {
        assert_eq!(Hue::new(-0.0).unwrap(), Hue::new(0.0).unwrap());
    }

    #[test]
    fn from_prefix_computes_sector_value() {
        assert_eq!(Hue::from_prefix("R", 2.5).unwrap().value(), 2.5);
        assert_eq!(Hue::from_prefix("YR", 5.0).unwrap().value(), 15.0);
        assert_eq!(Hue::from_prefix("RP", 10.0).unwrap().value(), 100.0);
    }

    #[test]
    fn from_prefix_n_is_grayscale_regardless_of_offset() {
        assert!(Hue::from_prefix("N", 7.0).unwrap().is_grayscale());
    }

    #[test]
    fn from_prefix_rejects_unknown_prefix() {
        assert!(matches!(
            Hue::from_prefix("Q", 1.0),
            Err(SpectrumError::InvalidArgument(_))
        ));
    }

    // -- Derived fields --

    #[test]
    fn value_100_is_rp_alias() {
        let hue = Hue::new(100.0).unwrap();
        assert_eq!(hue.prefix(), "RP");
        assert_eq!(hue.hue_value(), 10.0);
    }

    #[test]
    fn grayscale_has_n_prefix_and_zero_offset() {
        assert_eq!(Hue::GRAYSCALE.prefix(), "N");
        assert_eq!(Hue::GRAYSCALE.hue_value(), 0.0);
    }

    #[test]
    fn sector_boundaries_belong_to_next_sector() {
        let hue = Hue::new(10.0).unwrap();
        assert_eq!(hue.prefix(), "YR");
        assert_eq!(hue.hue_value(), 0.0);
    }

    // -- Parsing and display --

    #[test]
    fn parse_fractional_hue() {
        let hue: Hue = "2.5R".parse().unwrap();
        assert_eq!(hue.prefix(), "R");
        assert_eq!(hue.hue_value(), 2.5);
    }

    #[test]
    fn parse_two_letter_prefix() {
        let hue: Hue = "7.5PB".parse().unwrap();
        assert_eq!(hue.value(), 77.5);
    }

    #[test]
    fn parse_bare_n_is_grayscale() {
        assert!("N".parse::<Hue>().unwrap().is_grayscale());
    }

    #[test]
    fn parse_rejects_missing_number_and_unknown_prefix() {
        assert!("R".parse::<Hue>().is_err());
        assert!("5X".parse::<Hue>().is_err());
        assert!("".parse::<Hue>().is_err());
    }

    #[test]
    fn display_integer_offset_has_no_decimals() {
        assert_eq!(Hue::from_prefix("R", 5.0).unwrap().to_string(), "5R");
        assert_eq!(Hue::new(100.0).unwrap().to_string(), "10RP");
    }

    #[test]
    fn display_fractional_offset_has_two_decimals() {
        assert_eq!(Hue::from_prefix("R", 2.5).unwrap().to_string(), "2.50R");
    }

    #[test]
    fn display_rounds_third_decimal_half_up() {
        assert_eq!(Hue::from_prefix("R", 2.125).unwrap().to_string(), "2.13R");
        assert_eq!(Hue::from_prefix("B", 7.375).unwrap().to_string(), "7.38B");
        assert_eq!(Hue::from_prefix("R", 2.124).unwrap().to_string(), "2.12R");
    }

    #[test]
    fn serde_round_trips_through_string() {
        let hue = Hue::from_prefix("BG", 2.5).unwrap();
        let json = serde_json::to_string(&hue).unwrap();
        assert_eq!(json, "\"2.50BG\"");
        let back: Hue = serde_json::from_str(&json).unwrap();
        assert_eq!(back, hue);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prefix_and_offset_survive_construction(
                sector in 0usize..10,
                offset in 0.0_f64..9.99,
            ) {
                let prefix = HUE_PREFIXES[sector];
                let hue = Hue::from_prefix(prefix, offset).unwrap();
                prop_assert_eq!(hue.prefix(), prefix);
                prop_assert!(
                    (hue.hue_value() - offset).abs() < 1e-9,
                    "offset {} came back as {}", offset, hue.hue_value()
                );
            }

            #[test]
            fn in_range_values_always_construct(value in 0.0_f64..=100.0) {
                prop_assert!(Hue::new(value).is_ok());
            }
        }
    }
}
