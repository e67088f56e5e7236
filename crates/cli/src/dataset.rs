//! CSV dataset loading for the color-space index.
//!
//! Two comma-separated files feed the index:
//!
//! - forward (`Munsell2RGB.csv`): `key,_,prefix,offset,value,chroma,r,g,b`,
//!   header line starts with `Key`
//! - reverse (`RGB2Munsell.csv`): `r,g,b,hue,value,chroma`, header line
//!   starts with `Red`
//!
//! RGB columns are 0–255 numbers. Blank lines are ignored.

use crate::error::CliError;
use spectrum_core::{ColorSpaceIndex, ForwardRow, Hue, MunsellColor, ReverseRow, Rgb};
use std::path::Path;

/// Reads both dataset files and builds the index.
pub fn load_index(forward: &Path, reverse: &Path) -> Result<ColorSpaceIndex, CliError> {
    let forward_rows = parse_forward(&read(forward)?, forward)?;
    let reverse_rows = parse_reverse(&read(reverse)?, reverse)?;
    tracing::debug!(
        forward = forward_rows.len(),
        reverse = reverse_rows.len(),
        "dataset rows parsed"
    );
    Ok(ColorSpaceIndex::build(forward_rows, reverse_rows)?)
}

fn read(path: &Path) -> Result<String, CliError> {
    std::fs::read_to_string(path)
        .map_err(|e| CliError::Io(format!("cannot read {}: {e}", path.display())))
}

/// Parses forward rows, skipping the `Key` header.
pub fn parse_forward(text: &str, source: &Path) -> Result<Vec<ForwardRow>, CliError> {
    rows(text, "Key")
        .map(|(line, fields)| forward_row(&fields).map_err(|e| located(source, line, e)))
        .collect()
}

/// Parses reverse rows, skipping the `Red` header.
pub fn parse_reverse(text: &str, source: &Path) -> Result<Vec<ReverseRow>, CliError> {
    rows(text, "Red")
        .map(|(line, fields)| reverse_row(&fields).map_err(|e| located(source, line, e)))
        .collect()
}

/// Non-blank, non-header lines split on commas, with 1-based line numbers.
fn rows<'a>(text: &'a str, header: &'a str) -> impl Iterator<Item = (usize, Vec<&'a str>)> {
    text.lines()
        .enumerate()
        .filter(move |(_, line)| !line.trim().is_empty() && !line.starts_with(header))
        .map(|(i, line)| (i + 1, line.split(',').map(str::trim).collect()))
}

fn located(source: &Path, line: usize, msg: String) -> CliError {
    CliError::Input(format!("{}:{line}: {msg}", source.display()))
}

fn forward_row(fields: &[&str]) -> Result<ForwardRow, String> {
    if fields.len() < 9 {
        return Err(format!("expected 9 columns, got {}", fields.len()));
    }
    let hue = Hue::from_prefix(fields[2], number(fields[3], "offset")?)
        .map_err(|e| e.to_string())?;
    let value = integer(fields[4], "value")?;
    let chroma = integer(fields[5], "chroma")?;
    let rgb = Rgb::new(
        channel(fields[6], "red")? / 255.0,
        channel(fields[7], "green")? / 255.0,
        channel(fields[8], "blue")? / 255.0,
    );
    Ok(ForwardRow::new(hue, value, chroma, rgb))
}

fn reverse_row(fields: &[&str]) -> Result<ReverseRow, String> {
    if fields.len() < 6 {
        return Err(format!("expected 6 columns, got {}", fields.len()));
    }
    let hue = fields[3].parse::<Hue>().map_err(|e| e.to_string())?;
    let color = MunsellColor::new(
        hue,
        number(fields[4], "value")?,
        number(fields[5], "chroma")?,
    )
    .map_err(|e| e.to_string())?;
    Ok(ReverseRow::new(
        channel(fields[0], "red")?.round() as u8,
        channel(fields[1], "green")?.round() as u8,
        channel(fields[2], "blue")?.round() as u8,
        color,
    ))
}

fn number(field: &str, name: &str) -> Result<f64, String> {
    field
        .parse::<f64>()
        .map_err(|_| format!("invalid {name} '{field}'"))
}

fn integer(field: &str, name: &str) -> Result<i32, String> {
    field
        .parse::<i32>()
        .map_err(|_| format!("invalid {name} '{field}'"))
}

/// A 0–255 channel; fractional values are allowed.
fn channel(field: &str, name: &str) -> Result<f64, String> {
    let v = number(field, name)?;
    if !(0.0..=255.0).contains(&v) {
        return Err(format!("{name} channel {v} is outside [0, 255]"));
    }
    Ok(v)
}
