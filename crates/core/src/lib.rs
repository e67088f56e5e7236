#![deny(unsafe_code)]
//! Core types for the spectrum Munsell color toolkit.
//!
//! Provides the `Hue` and `MunsellColor` value types, the `ColorSpaceIndex`
//! Munsell ↔ RGB lookup tables, bounded `PaletteStore`/`MixerStore`
//! collections, the two-phase `MixingWeightSolver`, palette posterization,
//! and parameter helpers.

pub mod color;
pub mod error;
pub mod hue;
pub mod index;
pub mod munsell;
pub mod params;
pub mod posterize;
pub mod solver;
pub mod store;

pub use color::{mix_rgb, Rgb};
pub use error::SpectrumError;
pub use hue::{Hue, HUE_PREFIXES};
pub use index::{ColorSpaceIndex, ForwardRow, ReverseRow};
pub use munsell::MunsellColor;
pub use posterize::posterize_rgba;
pub use solver::{MixingWeightSolver, MixingWeights, SolverParams, WeightGrid};
pub use store::{MixerStore, PaletteStore, PALETTE_CAPACITY};
