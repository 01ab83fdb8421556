use anyhow::{Context, Result};
use renderer::{Antialiasing, GpuPowerPreference, Renderer, RendererConfig, SurfaceAlpha};
use settings::{AntialiasSetting, PowerSetting, Settings};
use sketch::LoadingSpinner;
use tracing_subscriber::EnvFilter;

use crate::cli::RunArgs;
use crate::paths::ConfigLocation;

pub fn run(args: RunArgs) -> Result<()> {
    let location = ConfigLocation::resolve(args.config.clone())?;
    let settings = load_settings(&location)?;
    let config = build_renderer_config(&args, &settings);

    tracing::info!(
        width = config.surface_size.0,
        height = config.surface_size.1,
        antialias = ?config.antialiasing,
        surface_alpha = ?config.surface_alpha,
        "starting loading animation"
    );
    Renderer::new(config).run(LoadingSpinner::new())
}

/// Logs to stderr so `inspect` output on stdout stays machine-readable.
pub fn initialise_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_settings(location: &ConfigLocation) -> Result<Settings> {
    let settings = if location.explicit {
        Settings::load(&location.path)
    } else {
        Settings::load_or_default(&location.path)
    }
    .with_context(|| format!("failed to load config {}", location.path.display()))?;

    if location.path.exists() {
        tracing::info!(path = %location.path.display(), "loaded configuration");
    } else {
        tracing::debug!(path = %location.path.display(), "no configuration file; using defaults");
    }
    Ok(settings)
}

/// Layers CLI flags over the config file over the built-in defaults.
pub fn build_renderer_config(args: &RunArgs, settings: &Settings) -> RendererConfig {
    let defaults = RendererConfig::default();
    let window = &settings.window;
    let render = &settings.render;

    let surface_size = args
        .size
        .unwrap_or_else(|| settings.window_size(defaults.surface_size));
    let surface_alpha = if args.opaque || !window.transparent {
        SurfaceAlpha::Opaque
    } else {
        SurfaceAlpha::Transparent
    };

    RendererConfig {
        surface_size,
        title: window.title.clone().unwrap_or(defaults.title),
        antialiasing: args
            .antialias
            .or(render.antialias)
            .map(to_antialiasing)
            .unwrap_or(defaults.antialiasing),
        surface_alpha,
        decorations: window.decorations,
        target_fps: args.fps.or(render.fps),
        run_for: args.run_for.or(render.run_for),
        gpu_power: render
            .power
            .map(to_power_preference)
            .unwrap_or(defaults.gpu_power),
    }
}

fn to_antialiasing(setting: AntialiasSetting) -> Antialiasing {
    match setting.samples() {
        None => Antialiasing::Auto,
        Some(1) => Antialiasing::Off,
        Some(samples) => Antialiasing::Samples(samples),
    }
}

fn to_power_preference(setting: PowerSetting) -> GpuPowerPreference {
    match setting {
        PowerSetting::Low => GpuPowerPreference::Low,
        PowerSetting::High => GpuPowerPreference::High,
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn defaults_without_flags_or_config() {
        let config = build_renderer_config(&RunArgs::default(), &Settings::default());
        assert_eq!(config.surface_size, (800, 800));
        assert_eq!(config.title, "orbitload");
        assert_eq!(config.antialiasing, Antialiasing::Auto);
        assert_eq!(config.surface_alpha, SurfaceAlpha::Transparent);
        assert_eq!(config.target_fps, None);
        assert_eq!(config.run_for, None);
    }

    #[test]
    fn config_file_fills_gaps() {
        let settings = Settings::from_toml_str(
            r#"
[window]
width = 1000
title = "Please wait"
transparent = false

[render]
fps = 30
antialias = "off"
power = "high"
"#,
        )
        .unwrap();
        let config = build_renderer_config(&RunArgs::default(), &settings);
        assert_eq!(config.surface_size, (1000, 800));
        assert_eq!(config.title, "Please wait");
        assert_eq!(config.surface_alpha, SurfaceAlpha::Opaque);
        assert_eq!(config.target_fps, Some(30.0));
        assert_eq!(config.antialiasing, Antialiasing::Off);
        assert_eq!(config.gpu_power, GpuPowerPreference::High);
    }

    #[test]
    fn flags_override_config() {
        let settings = Settings::from_toml_str(
            "[window]\nwidth = 1000\nheight = 1000\n[render]\nfps = 30\nrun_for = 10\n",
        )
        .unwrap();
        let args = RunArgs {
            size: Some((320, 240)),
            fps: Some(120.0),
            antialias: Some(AntialiasSetting::Samples8),
            opaque: true,
            run_for: Some(Duration::from_secs(2)),
            ..RunArgs::default()
        };
        let config = build_renderer_config(&args, &settings);
        assert_eq!(config.surface_size, (320, 240));
        assert_eq!(config.target_fps, Some(120.0));
        assert_eq!(config.antialiasing, Antialiasing::Samples(8));
        assert_eq!(config.surface_alpha, SurfaceAlpha::Opaque);
        assert_eq!(config.run_for, Some(Duration::from_secs(2)));
    }

    #[test]
    fn explicit_missing_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let location = ConfigLocation {
            path: dir.path().join("missing.toml"),
            explicit: true,
        };
        assert!(load_settings(&location).is_err());

        let implicit = ConfigLocation {
            explicit: false,
            ..location
        };
        assert_eq!(load_settings(&implicit).unwrap(), Settings::default());
    }
}
