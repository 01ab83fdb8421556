use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use settings::{AntialiasSetting, MAX_FPS};

#[derive(Parser, Debug)]
#[command(
    name = "orbitload",
    author,
    version,
    about = "Rotating-ellipse loading animation",
    arg_required_else_help = false,
    args_conflicts_with_subcommands = true
)]
pub struct Cli {
    #[command(flatten)]
    pub run: RunArgs,
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Open the window and animate (the default).
    Run(RunArgs),
    /// Compute one frame headlessly and print every ellipse placement as JSON.
    Inspect(InspectArgs),
    /// Print the configuration file path that `run` would read.
    ConfigPath,
}

#[derive(Parser, Debug, Default)]
pub struct RunArgs {
    /// Configuration file; falls back to `$ORBITLOAD_CONFIG`, then `config.toml`
    /// in the user config directory.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Window size in physical pixels (e.g. `800x800`).
    #[arg(long, value_name = "WIDTHxHEIGHT", value_parser = parse_size)]
    pub size: Option<(u32, u32)>,

    /// Override the animation frame rate.
    #[arg(long, value_name = "FPS", value_parser = parse_fps)]
    pub fps: Option<f32>,

    /// Anti-aliasing policy: `auto`, `off`, or an MSAA sample count (2/4/8/16).
    #[arg(long, value_name = "MODE", value_parser = settings::parse_antialias)]
    pub antialias: Option<AntialiasSetting>,

    /// Clear to an opaque background instead of a transparent one.
    #[arg(long)]
    pub opaque: bool,

    /// Exit after this long (`30s`, `2m`, or plain seconds).
    #[arg(long, value_name = "DURATION", value_parser = parse_run_for)]
    pub run_for: Option<Duration>,
}

#[derive(Parser, Debug)]
pub struct InspectArgs {
    /// Frame counter to evaluate.
    #[arg(long, default_value_t = 1)]
    pub frame: u64,

    #[arg(long, default_value_t = 800, value_parser = clap::value_parser!(u32).range(1..))]
    pub width: u32,

    #[arg(long, default_value_t = 800, value_parser = clap::value_parser!(u32).range(1..))]
    pub height: u32,

    /// Pretty-print the JSON output.
    #[arg(long)]
    pub pretty: bool,
}

pub fn parse() -> Cli {
    Cli::parse()
}

pub fn parse_size(value: &str) -> Result<(u32, u32), String> {
    let (w, h) = value
        .trim()
        .split_once(['x', 'X'])
        .ok_or_else(|| "expected WIDTHxHEIGHT".to_string())?;
    let width = w
        .trim()
        .parse::<u32>()
        .map_err(|_| format!("invalid width '{w}'"))?;
    let height = h
        .trim()
        .parse::<u32>()
        .map_err(|_| format!("invalid height '{h}'"))?;
    if width == 0 || height == 0 {
        return Err("window dimensions must be greater than zero".into());
    }
    Ok((width, height))
}

pub fn parse_fps(value: &str) -> Result<f32, String> {
    let fps: f32 = value
        .trim()
        .parse()
        .map_err(|_| format!("invalid frame rate '{value}'"))?;
    if !fps.is_finite() || fps <= 0.0 || fps > MAX_FPS {
        return Err(format!("frame rate must be in (0, {MAX_FPS}]"));
    }
    Ok(fps)
}

fn parse_run_for(value: &str) -> Result<Duration, String> {
    let duration = settings::parse_duration(value)?;
    if duration.is_zero() {
        return Err("run duration must be greater than zero".into());
    }
    Ok(duration)
}
