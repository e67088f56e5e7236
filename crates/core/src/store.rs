//! Bounded, most-recent-first color collections feeding the mixing solver.
//!
//! A [`PaletteStore`] holds the colors a user has picked; a [`MixerStore`]
//! holds the colors currently being mixed plus the desired target color.
//! Both are plain owned values with no persistence and are meant for a
//! single writer.

use crate::error::SpectrumError;
use crate::index::ColorSpaceIndex;
use crate::munsell::MunsellColor;
use crate::solver::{MixingWeightSolver, MixingWeights};

/// Maximum number of colors a store keeps.
pub const PALETTE_CAPACITY: usize = 8;

/// Ordered colors, newest first, capped at [`PALETTE_CAPACITY`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PaletteStore {
    colors: Vec<MunsellColor>,
}

impl PaletteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `color` at the front, then drops whatever sits past the
    /// capacity. Duplicates are allowed, so this is not an LRU.
    pub fn add_color(&mut self, color: MunsellColor) {
        self.colors.insert(0, color);
        self.colors.truncate(PALETTE_CAPACITY);
    }

    /// Removes the first color equal to `color`, if any.
    pub fn remove_color(&mut self, color: &MunsellColor) {
        if let Some(pos) = self.colors.iter().position(|c| c == color) {
            self.colors.remove(pos);
        }
    }

    pub fn contains(&self, color: &MunsellColor) -> bool {
        self.colors.contains(color)
    }

    /// The stored color nearest to `target`, first one wins on ties.
    ///
    /// Returns `Ok(None)` for an empty store.
    pub fn closest_color(
        &self,
        target: &MunsellColor,
        index: &ColorSpaceIndex,
    ) -> Result<Option<&MunsellColor>, SpectrumError> {
        let mut best: Option<(&MunsellColor, f64)> = None;
        for color in &self.colors {
            let distance = target.distance(color, index)?;
            if best.map_or(true, |(_, d)| distance < d) {
                best = Some((color, distance));
            }
        }
        Ok(best.map(|(color, _)| color))
    }

    pub fn colors(&self) -> &[MunsellColor] {
        &self.colors
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MunsellColor> {
        self.colors.iter()
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn clear(&mut self) {
        self.colors.clear();
    }
}

impl<'a> IntoIterator for &'a PaletteStore {
    type Item = &'a MunsellColor;
    type IntoIter = std::slice::Iter<'a, MunsellColor>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// The mixing bench: colors being combined and the color being aimed for.
#[derive(Debug, Clone, Default)]
pub struct MixerStore {
    colors: PaletteStore,
    desired: Option<MunsellColor>,
}

impl MixerStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_color(&mut self, color: MunsellColor) {
        self.colors.add_color(color);
    }

    pub fn remove_color(&mut self, color: &MunsellColor) {
        self.colors.remove_color(color);
    }

    pub fn contains(&self, color: &MunsellColor) -> bool {
        self.colors.contains(color)
    }

    pub fn colors(&self) -> &[MunsellColor] {
        self.colors.colors()
    }

    pub fn clear(&mut self) {
        self.colors.clear();
    }

    pub fn desired(&self) -> Option<&MunsellColor> {
        self.desired.as_ref()
    }

    pub fn set_desired(&mut self, color: Option<MunsellColor>) {
        self.desired = color;
    }

    /// Mixes every color on the bench with equal weight.
    ///
    /// Returns `Ok(None)` when the bench is empty.
    pub fn mix(&self, index: &ColorSpaceIndex) -> Result<Option<MunsellColor>, SpectrumError> {
        let weights = vec![1.0; self.colors.len()];
        MunsellColor::mix(self.colors.colors(), &weights, index)
    }

    /// Runs the default solver for the desired color against `palette`.
    pub fn find_mixing_weights(
        &self,
        palette: &PaletteStore,
        index: &ColorSpaceIndex,
    ) -> Result<MixingWeights, SpectrumError> {
        self.find_mixing_weights_with(palette, &MixingWeightSolver::new(index))
    }

    /// Same as [`MixerStore::find_mixing_weights`] with a configured solver.
    pub fn find_mixing_weights_with(
        &self,
        palette: &PaletteStore,
        solver: &MixingWeightSolver<'_>,
    ) -> Result<MixingWeights, SpectrumError> {
        solver.solve(self.desired(), palette.colors())
    }
}
