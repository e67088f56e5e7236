//! Bidirectional nearest-neighbor lookup between Munsell and RGB.
//!
//! The index holds two three-level tables built once from dataset rows:
//!
//! - forward: hue → value → chroma → RGB
//! - reverse: red → green → blue → Munsell color
//!
//! Every level keeps dataset insertion order. A lookup walks the levels one
//! at a time; when a level has no exact key it picks the nearest key at that
//! level and carries on below it. The result is a greedy per-level
//! approximation, not the globally nearest triple: a query can land on a
//! value layer whose chromas are all far from the requested chroma even when
//! a neighbouring layer holds a closer match. Callers see this as part of the
//! color model, so the policy must not be swapped for a global search.

use crate::color::Rgb;
use crate::error::SpectrumError;
use crate::hue::Hue;
use crate::munsell::{MunsellColor, MAX_CHROMA, MAX_VALUE};
use indexmap::IndexMap;
use std::hash::Hash;

/// One row of the Munsell → RGB dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct ForwardRow {
    pub hue: Hue,
    pub value: i32,
    pub chroma: i32,
    pub rgb: Rgb,
}

impl ForwardRow {
    pub fn new(hue: Hue, value: i32, chroma: i32, rgb: Rgb) -> Self {
        Self {
            hue,
            value,
            chroma,
            rgb,
        }
    }
}

/// One row of the RGB → Munsell dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct ReverseRow {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub color: MunsellColor,
}

impl ReverseRow {
    pub fn new(red: u8, green: u8, blue: u8, color: MunsellColor) -> Self {
        Self {
            red,
            green,
            blue,
            color,
        }
    }
}

type Table<K1, K2, K3, V> = IndexMap<K1, IndexMap<K2, IndexMap<K3, V>>>;
type ValueLayer = IndexMap<i32, IndexMap<i32, Rgb>>;

/// Immutable Munsell ↔ RGB lookup tables.
///
/// Build it once with [`ColorSpaceIndex::build`] and share it by reference;
/// nothing mutates it afterwards. The [`Default`] index is empty and fails
/// every non-neutral lookup with `SpectrumError::LookupFailure`.
#[derive(Debug, Default)]
pub struct ColorSpaceIndex {
    forward: Table<Hue, i32, i32, Rgb>,
    reverse: Table<i32, i32, i32, MunsellColor>,
    forward_len: usize,
    reverse_len: usize,
}

impl ColorSpaceIndex {
    /// Builds both tables from ordered dataset rows.
    ///
    /// Forward rows with a value or chroma of 0, or with a value above 10 or
    /// a chroma above 40, lie outside the defined solid and are skipped. A
    /// repeated key keeps its first position and takes the later row's
    /// payload.
    pub fn build<F, R>(forward_rows: F, reverse_rows: R) -> Result<Self, SpectrumError>
    where
        F: IntoIterator<Item = ForwardRow>,
        R: IntoIterator<Item = ReverseRow>,
    {
        let mut index = Self::default();
        let mut dropped = 0usize;

        for row in forward_rows {
            let value_in_range = row.value > 0 && row.value as f64 <= MAX_VALUE;
            let chroma_in_range = row.chroma > 0 && row.chroma as f64 <= MAX_CHROMA;
            if !value_in_range || !chroma_in_range {
                dropped += 1;
                continue;
            }
            let previous = index
                .forward
                .entry(row.hue)
                .or_default()
                .entry(row.value)
                .or_default()
                .insert(row.chroma, row.rgb);
            if previous.is_none() {
                index.forward_len += 1;
            }
        }

        for row in reverse_rows {
            let previous = index
                .reverse
                .entry(i32::from(row.red))
                .or_default()
                .entry(i32::from(row.green))
                .or_default()
                .insert(i32::from(row.blue), row.color);
            if previous.is_none() {
                index.reverse_len += 1;
            }
        }

        tracing::debug!(
            forward = index.forward_len,
            dropped,
            hues = index.forward.len(),
            reverse = index.reverse_len,
            "built color-space index"
        );
        Ok(index)
    }

    /// Number of distinct (hue, value, chroma) entries in the forward table.
    pub fn len(&self) -> usize {
        self.forward_len
    }

    /// Number of distinct (red, green, blue) entries in the reverse table.
    pub fn reverse_len(&self) -> usize {
        self.reverse_len
    }

    /// True when both tables are empty.
    pub fn is_empty(&self) -> bool {
        self.forward_len == 0 && self.reverse_len == 0
    }

    /// Every hue in the forward table, in dataset order.
    pub fn hues(&self) -> impl Iterator<Item = Hue> + '_ {
        self.forward.keys().copied()
    }

    /// Resolves a Munsell triple to RGB.
    ///
    /// The hue level falls back to the closest hue sharing the same prefix
    /// (or the closest hue overall if the prefix is absent from the table).
    /// Value and chroma are matched on their rounded integers and fall back
    /// to the key with the smallest absolute distance to the unrounded input.
    pub fn lookup(&self, hue: Hue, value: f64, chroma: f64) -> Result<Rgb, SpectrumError> {
        let values = self.forward_hue_layer(hue)?;
        let chromas = nearest(values, round_key(value), |&k| (value - k as f64).abs())
            .ok_or_else(|| missing_layer("value", hue))?;
        nearest(chromas, round_key(chroma), |&k| (chroma - k as f64).abs())
            .copied()
            .ok_or_else(|| missing_layer("chroma", hue))
    }

    /// Resolves 8-bit channels to a Munsell color.
    pub fn lookup_channels(
        &self,
        red: u8,
        green: u8,
        blue: u8,
    ) -> Result<&MunsellColor, SpectrumError> {
        self.lookup_scaled(red as f64, green as f64, blue as f64)
    }

    /// Resolves a fractional RGB color (such as a mix) to a Munsell color.
    ///
    /// Each channel is scaled to [0, 255] and matched on its truncated
    /// integer, falling back to the key nearest to the scaled channel.
    pub fn lookup_rgb(&self, rgb: Rgb) -> Result<&MunsellColor, SpectrumError> {
        self.lookup_scaled(rgb.r * 255.0, rgb.g * 255.0, rgb.b * 255.0)
    }

    fn lookup_scaled(
        &self,
        red: f64,
        green: f64,
        blue: f64,
    ) -> Result<&MunsellColor, SpectrumError> {
        let channel = |target: f64| move |&k: &i32| (target - k as f64).abs();
        let greens = nearest(&self.reverse, truncate_key(red), channel(red))
            .ok_or_else(|| SpectrumError::LookupFailure("reverse table is empty".into()))?;
        let blues = nearest(greens, truncate_key(green), channel(green))
            .ok_or_else(|| SpectrumError::LookupFailure("reverse green layer is empty".into()))?;
        nearest(blues, truncate_key(blue), channel(blue))
            .ok_or_else(|| SpectrumError::LookupFailure("reverse blue layer is empty".into()))
    }

    /// The entry with the highest chroma anywhere under `hue`.
    ///
    /// Entries are scanned in dataset order and a chroma equal to the current
    /// best replaces it, so ties go to the last one seen. Returns
    /// `SpectrumError::InvalidArgument` if the hue is not in the table.
    pub fn highest_chroma_in_hue(&self, hue: Hue) -> Result<MunsellColor, SpectrumError> {
        let values = self.exact_hue_layer(hue)?;
        let mut best: Option<(i32, i32, Rgb)> = None;
        for (&value, chromas) in values {
            for (&chroma, &rgb) in chromas {
                if best.map_or(true, |(_, best_chroma, _)| chroma >= best_chroma) {
                    best = Some((value, chroma, rgb));
                }
            }
        }
        let (value, chroma, rgb) = best
            .ok_or_else(|| SpectrumError::InvalidArgument(format!("hue {hue} has no entries")))?;
        MunsellColor::resolved(hue, value as f64, chroma as f64, rgb)
    }

    /// The hue's vertical slice, one row per value layer in dataset order.
    ///
    /// Each row starts with a neutral swatch whose value is the 1-based row
    /// number, followed by the layer's chromas in dataset order.
    pub fn color_matrix(&self, hue: Hue) -> Result<Vec<Vec<MunsellColor>>, SpectrumError> {
        let values = self.exact_hue_layer(hue)?;
        values
            .iter()
            .enumerate()
            .map(|(row, (&value, chromas))| {
                let mut colors = Vec::with_capacity(chromas.len() + 1);
                colors.push(MunsellColor::neutral((row + 1) as f64)?);
                for (&chroma, &rgb) in chromas {
                    colors.push(MunsellColor::resolved(hue, value as f64, chroma as f64, rgb)?);
                }
                Ok(colors)
            })
            .collect()
    }

    fn exact_hue_layer(&self, hue: Hue) -> Result<&ValueLayer, SpectrumError> {
        self.forward.get(&hue).ok_or_else(|| {
            SpectrumError::InvalidArgument(format!("hue {hue} is not in the index"))
        })
    }

    fn forward_hue_layer(&self, hue: Hue) -> Result<&ValueLayer, SpectrumError> {
        if let Some(layer) = self.forward.get(&hue) {
            return Ok(layer);
        }
        let distance = |candidate: &&Hue| (hue.value() - candidate.value()).abs();
        let closest = self
            .forward
            .keys()
            .filter(|candidate| candidate.prefix() == hue.prefix())
            .min_by(|a, b| distance(a).total_cmp(&distance(b)))
            .or_else(|| {
                self.forward
                    .keys()
                    .min_by(|a, b| distance(a).total_cmp(&distance(b)))
            })
            .ok_or_else(|| SpectrumError::LookupFailure("forward table is empty".into()))?;
        tracing::trace!(requested = %hue, resolved = %closest, "hue fell back to nearest");
        Ok(&self.forward[closest])
    }
}

/// Exact match on `key`, otherwise the value under the key with the smallest
/// `distance`. Ties go to the first key in insertion order.
fn nearest<'a, K, V>(
    layer: &'a IndexMap<K, V>,
    key: K,
    distance: impl Fn(&K) -> f64,
) -> Option<&'a V>
where
    K: Hash + Eq + std::fmt::Debug,
{
    if let Some(found) = layer.get(&key) {
        return Some(found);
    }
    let (resolved, found) = layer
        .iter()
        .min_by(|(a, _), (b, _)| distance(a).total_cmp(&distance(b)))?;
    tracing::trace!(requested = ?key, resolved = ?resolved, "key fell back to nearest");
    Some(found)
}

/// Rounds half up to the integer key used by the forward table.
fn round_key(x: f64) -> i32 {
    (x + 0.5).floor() as i32
}

/// Drops the fraction of a non-negative scaled channel.
fn truncate_key(x: f64) -> i32 {
    x.floor() as i32
}

fn missing_layer(level: &str, hue: Hue) -> SpectrumError {
    SpectrumError::LookupFailure(format!("no {level} layer under hue {hue}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hue(prefix: &str, offset: f64) -> Hue {
        Hue::from_prefix(prefix, offset).unwrap()
    }

    fn fwd(prefix: &str, offset: f64, value: i32, chroma: i32, rgb: [u8; 3]) -> ForwardRow {
        let rgb = Rgb::from_u8(rgb[0], rgb[1], rgb[2]);
        ForwardRow::new(hue(prefix, offset), value, chroma, rgb)
    }

    fn rev(rgb: [u8; 3], notation: &str) -> ReverseRow {
        ReverseRow::new(rgb[0], rgb[1], rgb[2], notation.parse().unwrap())
    }

    fn sample_index() -> ColorSpaceIndex {
        ColorSpaceIndex::build(
            vec![
                fwd("R", 2.5, 4, 2, [120, 90, 90]),
                fwd("R", 2.5, 4, 6, [150, 70, 70]),
                fwd("R", 2.5, 6, 8, [210, 110, 100]),
                fwd("R", 7.5, 5, 4, [190, 80, 60]),
                fwd("YR", 2.5, 5, 4, [180, 110, 60]),
                fwd("B", 5.0, 0, 4, [0, 0, 0]),
                fwd("B", 5.0, 5, 0, [0, 0, 0]),
            ],
            vec![
                rev([150, 70, 70], "2.5R/4/6"),
                rev([150, 80, 70], "2.5R/4/5"),
                rev([190, 80, 60], "7.5R/5/4"),
            ],
        )
        .unwrap()
    }

    // -- Building --

    #[test]
    fn build_drops_zero_value_and_zero_chroma_rows() {
        let index = sample_index();
        assert_eq!(index.len(), 5);
        assert!(index.hues().all(|h| h.prefix() != "B"));
    }

    #[test]
    fn build_keeps_hue_order() {
        let hues: Vec<String> = sample_index().hues().map(|h| h.to_string()).collect();
        assert_eq!(hues, vec!["2.50R", "7.50R", "2.50YR"]);
    }

    #[test]
    fn build_skips_rows_outside_the_solid() {
        let index = ColorSpaceIndex::build(
            vec![
                fwd("R", 5.0, 5, 4, [200, 50, 50]),
                fwd("R", 5.0, 5, 42, [255, 0, 0]),
                fwd("R", 5.0, 11, 4, [1, 2, 3]),
            ],
            vec![],
        )
        .unwrap();
        assert_eq!(index.len(), 1);
        // chroma 42 never made it in, so 40 resolves to the 4 entry
        let rgb = index.lookup(hue("R", 5.0), 5.0, 40.0).unwrap();
        assert_eq!(rgb.to_u8(), [200, 50, 50]);
        let highest = index.highest_chroma_in_hue(hue("R", 5.0)).unwrap();
        assert_eq!(highest.chroma(), 4.0);
    }

    #[test]
    fn repeated_key_takes_later_payload() {
        let index = ColorSpaceIndex::build(
            vec![fwd("R", 5.0, 5, 4, [1, 1, 1]), fwd("R", 5.0, 5, 4, [9, 9, 9])],
            vec![],
        )
        .unwrap();
        assert_eq!(index.len(), 1);
        assert_eq!(index.lookup(hue("R", 5.0), 5.0, 4.0).unwrap().to_u8(), [9, 9, 9]);
    }

    #[test]
    fn default_index_is_empty() {
        let index = ColorSpaceIndex::default();
        assert!(index.is_empty());
        assert_eq!(index.hues().count(), 0);
    }

    // -- Forward lookup --

    #[test]
    fn single_row_exact_match() {
        let index =
            ColorSpaceIndex::build(vec![fwd("R", 5.0, 5, 4, [200, 50, 50])], vec![]).unwrap();
        let rgb = index.lookup(hue("R", 5.0), 5.0, 4.0).unwrap();
        assert_eq!(rgb, Rgb::from_u8(200, 50, 50));
    }

    #[test]
    fn value_and_chroma_match_on_rounded_keys() {
        let rgb = sample_index().lookup(hue("R", 2.5), 4.4, 5.6).unwrap();
        assert_eq!(rgb.to_u8(), [150, 70, 70]);
    }

    #[test]
    fn hue_falls_back_within_prefix() {
        // 6R is closer to 7.5R than to 2.5R, and 2.5YR is excluded by prefix.
        let rgb = sample_index().lookup(hue("R", 6.0), 5.0, 4.0).unwrap();
        assert_eq!(rgb.to_u8(), [190, 80, 60]);
    }

    #[test]
    fn hue_fallback_tie_prefers_dataset_order() {
        // 5R is equidistant from 2.5R and 7.5R.
        let rgb = sample_index().lookup(hue("R", 5.0), 4.0, 2.0).unwrap();
        assert_eq!(rgb.to_u8(), [120, 90, 90]);
    }

    #[test]
    fn hue_fallback_widens_when_prefix_is_absent() {
        let rgb = sample_index().lookup(hue("Y", 0.0), 5.0, 4.0).unwrap();
        assert_eq!(rgb.to_u8(), [180, 110, 60]);
    }

    #[test]
    fn fallback_is_greedy_per_level() {
        // Value 6 rounds to the 6 layer, whose only chroma is 8, even though
        // (4, 6) would be a closer overall triple for chroma 6.
        let rgb = sample_index().lookup(hue("R", 2.5), 5.6, 6.0).unwrap();
        assert_eq!(rgb.to_u8(), [210, 110, 100]);
    }

    #[test]
    fn missing_value_layer_uses_nearest_unrounded_distance() {
        // 4.6 rounds to 5 (absent); 4 is nearer than 6.
        let rgb = sample_index().lookup(hue("R", 2.5), 4.6, 2.0).unwrap();
        assert_eq!(rgb.to_u8(), [120, 90, 90]);
    }

    #[test]
    fn empty_forward_table_is_lookup_failure() {
        let index = ColorSpaceIndex::default();
        assert!(matches!(
            index.lookup(hue("R", 5.0), 5.0, 4.0),
            Err(SpectrumError::LookupFailure(_))
        ));
    }

    // -- Reverse lookup --

    #[test]
    fn reverse_exact_match() {
        let index = sample_index();
        let color = index.lookup_channels(190, 80, 60).unwrap();
        assert_eq!(color.to_string(), "7.50R, 5, 4");
    }

    #[test]
    fn reverse_lookup_of_fractional_rgb_truncates_channels() {
        let index = ColorSpaceIndex::build(
            vec![],
            vec![rev([149, 70, 70], "2.5R/4/2"), rev([150, 70, 70], "2.5R/4/6")],
        )
        .unwrap();
        // 149.6 is nearer to 150, but its exact key is 149.
        let rgb = Rgb::new(149.6 / 255.0, 70.0 / 255.0, 70.0 / 255.0);
        assert_eq!(index.lookup_rgb(rgb).unwrap().chroma(), 2.0);
    }

    #[test]
    fn reverse_lookup_of_8bit_rgb_hits_its_own_key() {
        let rows: Vec<ReverseRow> = (0..=255u8)
            .map(|k| ReverseRow::new(k, 0, 0, MunsellColor::neutral(k as f64 / 25.5).unwrap()))
            .collect();
        let index = ColorSpaceIndex::build(vec![], rows).unwrap();
        for k in 0..=255u8 {
            let found = index.lookup_rgb(Rgb::from_u8(k, 0, 0)).unwrap();
            assert_eq!(found.value(), k as f64 / 25.5, "channel {k}");
        }
    }

    #[test]
    fn reverse_falls_back_per_channel() {
        let index = sample_index();
        // red 160 -> nearest 150; green 76 -> nearest 80 under 150.
        let color = index.lookup_channels(160, 76, 10).unwrap();
        assert_eq!(color.chroma(), 5.0);
    }

    #[test]
    fn empty_reverse_table_is_lookup_failure() {
        let index = ColorSpaceIndex::build(vec![fwd("R", 5.0, 5, 4, [1, 2, 3])], vec![]).unwrap();
        assert!(matches!(
            index.lookup_channels(1, 2, 3),
            Err(SpectrumError::LookupFailure(_))
        ));
    }

    // -- Hue slices --

    #[test]
    fn highest_chroma_scans_whole_hue() {
        let best = sample_index().highest_chroma_in_hue(hue("R", 2.5)).unwrap();
        assert_eq!(best.value(), 6.0);
        assert_eq!(best.chroma(), 8.0);
    }

    #[test]
    fn highest_chroma_tie_goes_to_last_seen() {
        let index = ColorSpaceIndex::build(
            vec![fwd("G", 5.0, 4, 8, [1, 1, 1]), fwd("G", 5.0, 6, 8, [2, 2, 2])],
            vec![],
        )
        .unwrap();
        let best = index.highest_chroma_in_hue(hue("G", 5.0)).unwrap();
        assert_eq!(best.value(), 6.0);
        assert_eq!(best.color(&index).unwrap().to_u8(), [2, 2, 2]);
    }

    #[test]
    fn highest_chroma_of_unknown_hue_is_error() {
        assert!(matches!(
            sample_index().highest_chroma_in_hue(hue("P", 5.0)),
            Err(SpectrumError::InvalidArgument(_))
        ));
    }

    #[test]
    fn color_matrix_rows_follow_dataset_order() {
        let matrix = sample_index().color_matrix(hue("R", 2.5)).unwrap();
        assert_eq!(matrix.len(), 2);

        assert_eq!(matrix[0][0], MunsellColor::neutral(1.0).unwrap());
        let chromas: Vec<f64> = matrix[0][1..].iter().map(|c| c.chroma()).collect();
        assert_eq!(chromas, vec![2.0, 6.0]);
        assert!(matrix[0][1..].iter().all(|c| c.value() == 4.0));

        assert_eq!(matrix[1][0], MunsellColor::neutral(2.0).unwrap());
        assert_eq!(matrix[1].len(), 2);
        assert_eq!(matrix[1][1].value(), 6.0);
    }

    #[test]
    fn color_matrix_entries_carry_table_rgb() {
        let index = sample_index();
        let matrix = index.color_matrix(hue("R", 2.5)).unwrap();
        assert_eq!(matrix[0][2].color(&index).unwrap().to_u8(), [150, 70, 70]);
    }
}
