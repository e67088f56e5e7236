//! Two-phase grid search for subtractive mixing weights.
//!
//! Given a desired color and a palette of up to [`PALETTE_CAPACITY`] colors,
//! the solver picks one weight per palette entry so that the weighted RGB
//! average lands as close as possible (by [`Rgb::distance`]) to the desired
//! color.
//!
//! Phase 1 tries every combination of the coarse candidate weights. Phase 2
//! builds a five-value window around each coarse winner and tries every
//! combination of those windows. Both phases walk their grid with the same
//! [`WeightGrid`] odometer, skip combinations whose weights sum to zero, and
//! only replace the best result on a strict improvement, so the earliest
//! combination in enumeration order wins ties.

use crate::color::{mix_rgb, Rgb};
use crate::error::SpectrumError;
use crate::index::ColorSpaceIndex;
use crate::munsell::MunsellColor;
use crate::params::param_f64_list;
use crate::store::PALETTE_CAPACITY;
use serde::Serialize;
use serde_json::Value;

/// Candidate weights tried for every palette entry in phase 1.
pub const COARSE_WEIGHTS: [f64; 5] = [0.0, 2.0, 5.0, 8.0, 14.0];
/// Phase 2 window for an entry whose coarse weight was zero.
pub const ZERO_WINDOW: [f64; 5] = [0.0, 0.2, 0.5, 1.0, 2.0];
/// Phase 2 offsets applied to a nonzero coarse weight.
pub const REFINE_OFFSETS: [f64; 5] = [-2.0, -1.0, 0.0, 1.0, 2.0];
/// Largest candidate set allowed per position; with the palette capacity this
/// bounds each phase to 5^8 = 390 625 combinations.
pub const MAX_CANDIDATES: usize = 5;

/// Tunable candidate sets for the solver.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SolverParams {
    pub coarse_weights: Vec<f64>,
    pub zero_window: Vec<f64>,
    pub refine_offsets: Vec<f64>,
}

impl Default for SolverParams {
    fn default() -> Self {
        Self {
            coarse_weights: COARSE_WEIGHTS.to_vec(),
            zero_window: ZERO_WINDOW.to_vec(),
            refine_offsets: REFINE_OFFSETS.to_vec(),
        }
    }
}

impl SolverParams {
    /// Extracts candidate sets from a JSON object, falling back to defaults
    /// for missing keys, then validates them.
    pub fn from_json(params: &Value) -> Result<Self, SpectrumError> {
        let params = Self {
            coarse_weights: param_f64_list(params, "coarse_weights", &COARSE_WEIGHTS),
            zero_window: param_f64_list(params, "zero_window", &ZERO_WINDOW),
            refine_offsets: param_f64_list(params, "refine_offsets", &REFINE_OFFSETS),
        };
        params.validate()?;
        Ok(params)
    }

    /// Checks that every set holds 1 to [`MAX_CANDIDATES`] finite values and
    /// that weights (not offsets) are non-negative.
    pub fn validate(&self) -> Result<(), SpectrumError> {
        let sets = [
            ("coarse_weights", &self.coarse_weights, false),
            ("zero_window", &self.zero_window, false),
            ("refine_offsets", &self.refine_offsets, true),
        ];
        for (name, set, signed) in sets {
            if set.is_empty() || set.len() > MAX_CANDIDATES {
                return Err(SpectrumError::InvalidArgument(format!(
                    "{name} must hold between 1 and {MAX_CANDIDATES} values, got {}",
                    set.len()
                )));
            }
            if set.iter().any(|w| !w.is_finite() || (!signed && *w < 0.0)) {
                return Err(SpectrumError::InvalidArgument(format!(
                    "{name} must hold finite{} values, got {set:?}",
                    if signed { "" } else { ", non-negative" }
                )));
            }
        }
        Ok(())
    }

    /// The phase 2 window around a coarse weight. Shifted weights are floored
    /// at zero; with the default sets they never go below it.
    fn window(&self, weight: f64) -> Vec<f64> {
        if weight == 0.0 {
            self.zero_window.clone()
        } else {
            self.refine_offsets
                .iter()
                .map(|offset| (weight + offset).max(0.0))
                .collect()
        }
    }
}

/// Cartesian product over per-position candidate sets, in odometer order.
///
/// The first item takes every position's first candidate. Each step advances
/// the last position; a position that runs past its last candidate resets to
/// its first and carries into the one before it. Iteration ends when the
/// first position would carry. Any empty set (or no positions at all) yields
/// nothing.
#[derive(Debug, Clone)]
pub struct WeightGrid<'a> {
    candidates: &'a [Vec<f64>],
    positions: Vec<usize>,
    done: bool,
}

impl<'a> WeightGrid<'a> {
    pub fn new(candidates: &'a [Vec<f64>]) -> Self {
        Self {
            candidates,
            positions: vec![0; candidates.len()],
            done: candidates.is_empty() || candidates.iter().any(Vec::is_empty),
        }
    }

    /// Total number of combinations the grid yields from the start.
    pub fn combinations(&self) -> usize {
        self.candidates.iter().map(Vec::len).product()
    }

    fn advance(&mut self) {
        for i in (0..self.positions.len()).rev() {
            if self.positions[i] + 1 < self.candidates[i].len() {
                self.positions[i] += 1;
                return;
            }
            self.positions[i] = 0;
        }
        self.done = true;
    }
}

impl Iterator for WeightGrid<'_> {
    type Item = Vec<f64>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let weights = self
            .positions
            .iter()
            .zip(self.candidates)
            .map(|(&p, set)| set[p])
            .collect();
        self.advance();
        Some(weights)
    }
}

/// The solver's answer: one weight per palette entry, in palette order, and
/// the distance its mix leaves to the desired color.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MixingWeights {
    pub weights: Vec<f64>,
    pub distance: f64,
}

/// Brute-force mixing-weight optimizer bound to a color-space index.
#[derive(Debug)]
pub struct MixingWeightSolver<'a> {
    index: &'a ColorSpaceIndex,
    params: SolverParams,
}

impl<'a> MixingWeightSolver<'a> {
    /// A solver using the default candidate sets.
    pub fn new(index: &'a ColorSpaceIndex) -> Self {
        Self {
            index,
            params: SolverParams::default(),
        }
    }

    /// A solver using custom candidate sets, validated up front.
    pub fn with_params(
        index: &'a ColorSpaceIndex,
        params: SolverParams,
    ) -> Result<Self, SpectrumError> {
        params.validate()?;
        Ok(Self { index, params })
    }

    pub fn params(&self) -> &SolverParams {
        &self.params
    }

    /// Finds mixing weights for `palette` that best approximate `desired`.
    ///
    /// Returns `SpectrumError::SolverPrecondition` if `desired` is `None`, the
    /// palette is empty, or it holds more than [`PALETTE_CAPACITY`] colors.
    /// Returns `SpectrumError::SolverExhausted` if every combination sums to
    /// zero weight.
    pub fn solve(
        &self,
        desired: Option<&MunsellColor>,
        palette: &[MunsellColor],
    ) -> Result<MixingWeights, SpectrumError> {
        let desired = desired
            .ok_or_else(|| SpectrumError::SolverPrecondition("no desired color is set".into()))?;
        if palette.is_empty() {
            return Err(SpectrumError::SolverPrecondition("palette is empty".into()));
        }
        if palette.len() > PALETTE_CAPACITY {
            return Err(SpectrumError::SolverPrecondition(format!(
                "palette holds {} colors, at most {PALETTE_CAPACITY} are supported",
                palette.len()
            )));
        }

        let target = desired.color(self.index)?;
        let colors = palette
            .iter()
            .map(|c| c.color(self.index))
            .collect::<Result<Vec<_>, _>>()?;

        let coarse = vec![self.params.coarse_weights.clone(); palette.len()];
        let mut best = None;
        let evaluated = search(&coarse, &colors, target, &mut best);
        let coarse_best = best.clone().ok_or(SpectrumError::SolverExhausted)?;
        tracing::debug!(
            phase = "coarse",
            evaluated,
            distance = coarse_best.distance,
            "mixing search phase complete"
        );

        let windows: Vec<Vec<f64>> = coarse_best
            .weights
            .iter()
            .map(|&w| self.params.window(w))
            .collect();
        let evaluated = search(&windows, &colors, target, &mut best);
        let best = best.ok_or(SpectrumError::SolverExhausted)?;
        tracing::debug!(
            phase = "refine",
            evaluated,
            distance = best.distance,
            "mixing search phase complete"
        );
        Ok(best)
    }
}

/// Walks the grid, keeping the strictly best mix in `best`. Returns how many
/// combinations had a defined mix.
fn search(
    candidates: &[Vec<f64>],
    colors: &[Rgb],
    target: Rgb,
    best: &mut Option<MixingWeights>,
) -> usize {
    let mut evaluated = 0;
    for weights in WeightGrid::new(candidates) {
        let Some(mixed) = mix_rgb(colors, &weights) else {
            continue;
        };
        evaluated += 1;
        let distance = target.distance(mixed);
        if best.as_ref().map_or(true, |b| distance < b.distance) {
            *best = Some(MixingWeights { weights, distance });
        }
    }
    evaluated
}
