#![deny(unsafe_code)]
//! CLI binary for the spectrum Munsell color toolkit.
//!
//! Subcommands:
//! - `hues` — list every hue in the forward dataset
//! - `lookup <color>` / `reverse <hex>` — convert between Munsell and RGB
//! - `complement <color>` / `analogous <color>` — derived hues
//! - `highest <hue>` / `matrix <hue>` — per-hue views of the dataset
//! - `mix <colors>...` — weighted mix of Munsell colors
//! - `solve <desired> <palette>...` — search mixing weights for a target
//! - `posterize <input> <output>` — snap an image onto a palette

mod dataset;
mod error;
mod snapshot;

use clap::{Parser, Subcommand};
use error::CliError;
use serde_json::json;
use spectrum_core::{
    ColorSpaceIndex, Hue, MixerStore, MixingWeightSolver, MunsellColor, PaletteStore, Rgb,
    SolverParams, PALETTE_CAPACITY,
};
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(name = "spectrum", about = "Munsell color lookup and mixing CLI")]
struct Cli {
    /// Output as JSON instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    /// Munsell → RGB dataset.
    #[arg(long, global = true, default_value = "Munsell2RGB.csv")]
    forward: PathBuf,

    /// RGB → Munsell dataset.
    #[arg(long, global = true, default_value = "RGB2Munsell.csv")]
    reverse: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List every hue in the forward dataset, in dataset order.
    Hues,
    /// Resolve a Munsell color (e.g. "5R/5/4" or "N5") to RGB.
    Lookup { color: String },
    /// Resolve a hex RGB color (e.g. "#c83232") to Munsell.
    Reverse { rgb: String },
    /// Print the complementary color.
    Complement { color: String },
    /// Print the nine analogous colors within the same hue sector.
    Analogous { color: String },
    /// Print the highest-chroma dataset entry of a hue (e.g. "5R").
    Highest { hue: String },
    /// Print the value × chroma matrix of a hue.
    Matrix { hue: String },
    /// Mix Munsell colors, equally unless weights are given.
    Mix {
        #[arg(required = true)]
        colors: Vec<String>,

        /// Comma-separated weights, one per color.
        #[arg(short, long, value_delimiter = ',')]
        weights: Vec<f64>,
    },
    /// Find mixing weights that approximate a desired color from a palette.
    Solve {
        desired: String,

        /// Up to eight palette colors.
        #[arg(required = true)]
        palette: Vec<String>,

        /// Solver candidate sets as a JSON string.
        #[arg(long, default_value = "{}")]
        params: String,
    },
    /// Snap every pixel of an image onto the closest palette color.
    Posterize {
        input: PathBuf,
        output: PathBuf,

        /// Up to eight palette colors.
        #[arg(short, long, required = true, num_args = 1..)]
        palette: Vec<String>,
    },
}

fn parse_color(s: &str) -> Result<MunsellColor, CliError> {
    s.parse()
        .map_err(|e| CliError::Input(format!("bad color '{s}': {e}")))
}

fn parse_hue(s: &str) -> Result<Hue, CliError> {
    s.parse()
        .map_err(|e| CliError::Input(format!("bad hue '{s}': {e}")))
}

/// Builds a palette that keeps the command-line order.
fn parse_palette(colors: &[String]) -> Result<PaletteStore, CliError> {
    if colors.len() > PALETTE_CAPACITY {
        return Err(CliError::Input(format!(
            "at most {PALETTE_CAPACITY} palette colors are supported, got {}",
            colors.len()
        )));
    }
    let mut palette = PaletteStore::new();
    for color in colors.iter().rev() {
        palette.add_color(parse_color(color)?);
    }
    Ok(palette)
}

fn color_json(
    color: &MunsellColor,
    index: &ColorSpaceIndex,
) -> Result<serde_json::Value, CliError> {
    Ok(json!({
        "color": color,
        "notation": color.to_string(),
        "rgb": color.color(index)?,
    }))
}

fn print_json(value: &serde_json::Value) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn run(cli: Cli) -> Result<(), CliError> {
    let load = || dataset::load_index(&cli.forward, &cli.reverse);

    match &cli.command {
        Command::Hues => {
            let index = load()?;
            let hues: Vec<String> = index.hues().map(|h| h.to_string()).collect();
            if cli.json {
                print_json(&json!({ "hues": hues }))?;
            } else {
                println!("{}", hues.join(" "));
            }
        }
        Command::Lookup { color } => {
            let index = load()?;
            let color = parse_color(color)?;
            if cli.json {
                print_json(&color_json(&color, &index)?)?;
            } else {
                println!("{color} -> {}", color.color(&index)?.to_hex());
            }
        }
        Command::Reverse { rgb } => {
            let index = load()?;
            let parsed = Rgb::from_hex(rgb)?;
            let color = MunsellColor::from_rgb(parsed, &index)?;
            if cli.json {
                print_json(&json!({
                    "rgb": parsed,
                    "color": color,
                    "notation": color.to_string(),
                }))?;
            } else {
                println!("{} -> {color}", parsed.to_hex());
            }
        }
        Command::Complement { color } => {
            let complement = parse_color(color)?.complementary_color()?;
            if cli.json {
                print_json(&json!({
                    "color": complement,
                    "notation": complement.to_string(),
                }))?;
            } else {
                println!("{complement}");
            }
        }
        Command::Analogous { color } => {
            let analogues = parse_color(color)?.analogous_colors()?;
            if cli.json {
                print_json(&json!({ "colors": analogues }))?;
            } else {
                for analogue in &analogues {
                    println!("{analogue}");
                }
            }
        }
        Command::Highest { hue } => {
            let index = load()?;
            let highest = index.highest_chroma_in_hue(parse_hue(hue)?)?;
            if cli.json {
                print_json(&color_json(&highest, &index)?)?;
            } else {
                println!("{highest} -> {}", highest.color(&index)?.to_hex());
            }
        }
        Command::Matrix { hue } => {
            let index = load()?;
            let matrix = index.color_matrix(parse_hue(hue)?)?;
            if cli.json {
                let rows = matrix
                    .iter()
                    .map(|row| {
                        row.iter()
                            .map(|c| color_json(c, &index))
                            .collect::<Result<Vec<_>, _>>()
                    })
                    .collect::<Result<Vec<Vec<_>>, _>>()?;
                print_json(&json!({ "rows": rows }))?;
            } else {
                for row in &matrix {
                    let cells = row
                        .iter()
                        .map(|c| c.color(&index).map(Rgb::to_hex))
                        .collect::<Result<Vec<_>, _>>()?;
                    println!("{}", cells.join(" "));
                }
            }
        }
        Command::Mix { colors, weights } => {
            let index = load()?;
            let colors = colors
                .iter()
                .map(|c| parse_color(c))
                .collect::<Result<Vec<_>, _>>()?;
            let mixed = if weights.is_empty() {
                if colors.len() > PALETTE_CAPACITY {
                    return Err(CliError::Input(format!(
                        "at most {PALETTE_CAPACITY} colors mix without explicit weights"
                    )));
                }
                let mut mixer = MixerStore::new();
                colors.into_iter().for_each(|c| mixer.add_color(c));
                mixer.mix(&index)?
            } else {
                if weights.len() != colors.len() {
                    return Err(CliError::Input(format!(
                        "got {} weights for {} colors",
                        weights.len(),
                        colors.len()
                    )));
                }
                MunsellColor::mix(&colors, weights, &index)?
            };
            match (mixed, cli.json) {
                (Some(color), true) => print_json(&color_json(&color, &index)?)?,
                (Some(color), false) => println!("{color} -> {}", color.color(&index)?.to_hex()),
                (None, true) => print_json(&json!({ "color": null }))?,
                (None, false) => println!("no mix: weights sum to zero"),
            }
        }
        Command::Solve {
            desired,
            palette,
            params,
        } => {
            let params: serde_json::Value = serde_json::from_str(params)
                .map_err(|e| CliError::Input(format!("invalid --params JSON: {e}")))?;
            let params = SolverParams::from_json(&params)?;
            let palette = parse_palette(palette)?;
            let index = load()?;

            let mut mixer = MixerStore::new();
            mixer.set_desired(Some(parse_color(desired)?));
            let solver = MixingWeightSolver::with_params(&index, params)?;
            let result = mixer.find_mixing_weights_with(&palette, &solver)?;

            if cli.json {
                let entries: Vec<_> = palette
                    .iter()
                    .zip(&result.weights)
                    .map(|(color, weight)| json!({ "color": color, "weight": weight }))
                    .collect();
                print_json(&json!({
                    "weights": result.weights,
                    "distance": result.distance,
                    "palette": entries,
                }))?;
            } else {
                for (color, weight) in palette.iter().zip(&result.weights) {
                    println!("{weight:>5} × {color}");
                }
                println!("distance {:.4}", result.distance);
            }
        }
        Command::Posterize {
            input,
            output,
            palette,
        } => {
            let palette = parse_palette(palette)?;
            let index = load()?;
            let (w, h) = snapshot::posterize_file(input, output, &palette, &index)?;
            if cli.json {
                print_json(&json!({
                    "input": input.display().to_string(),
                    "output": output.display().to_string(),
                    "width": w,
                    "height": h,
                }))?;
            } else {
                eprintln!(
                    "posterized {} ({w}x{h}, {} colors) -> {}",
                    input.display(),
                    palette.len(),
                    output.display()
                );
            }
        }
    }

    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let json_mode = cli.json;
    if let Err(e) = run(cli) {
        tracing::debug!(exit_code = e.exit_code(), "command failed");
        if json_mode {
            let j = json!({"error": e.to_string(), "exit_code": e.exit_code()});
            eprintln!("{}", serde_json::to_string_pretty(&j).unwrap_or_default());
        } else {
            eprintln!("error: {e}");
        }
        process::exit(e.exit_code());
    }
}
