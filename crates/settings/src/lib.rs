use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::de::{self, Deserializer};
use serde::Deserialize;

/// Highest frame rate accepted from configuration.
pub const MAX_FPS: f32 = 1000.0;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
    #[error("failed to read configuration at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Root of the `config.toml` file. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub window: WindowSettings,
    pub render: RenderSettings,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WindowSettings {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub title: Option<String>,
    /// Let the desktop show through the cleared background.
    pub transparent: bool,
    pub decorations: bool,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            width: None,
            height: None,
            title: None,
            transparent: true,
            decorations: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderSettings {
    pub fps: Option<f32>,
    #[serde(deserialize_with = "deserialize_antialias_opt")]
    pub antialias: Option<AntialiasSetting>,
    /// Stop animating after this long; `None` runs until the window closes.
    #[serde(deserialize_with = "deserialize_duration_opt")]
    pub run_for: Option<Duration>,
    pub power: Option<PowerSetting>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AntialiasSetting {
    Auto,
    Off,
    Samples2,
    Samples4,
    Samples8,
    Samples16,
}

impl AntialiasSetting {
    pub fn from_samples(samples: u32) -> Option<Self> {
        match samples {
            0 | 1 => Some(Self::Off),
            2 => Some(Self::Samples2),
            4 => Some(Self::Samples4),
            8 => Some(Self::Samples8),
            16 => Some(Self::Samples16),
            _ => None,
        }
    }

    /// Requested MSAA sample count; `None` means "pick the best available".
    pub fn samples(self) -> Option<u32> {
        match self {
            Self::Auto => None,
            Self::Off => Some(1),
            Self::Samples2 => Some(2),
            Self::Samples4 => Some(4),
            Self::Samples8 => Some(8),
            Self::Samples16 => Some(16),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PowerSetting {
    Low,
    High,
}

fn deserialize_duration_opt<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
where
    D: Deserializer<'de>,
{
    struct Visitor;
    impl<'de> de::Visitor<'de> for Visitor {
        type Value = Option<Duration>;

        fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            formatter.write_str("a duration as number of seconds or human-readable string")
        }

        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            parse_duration(v).map(Some).map_err(E::custom)
        }

        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Some(Duration::from_secs(v)))
        }

        fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if v < 0 {
                return Err(E::custom("duration must be non-negative"));
            }
            Ok(Some(Duration::from_secs(v as u64)))
        }

        fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            seconds_to_duration(v)
                .map(Some)
                .map_err(|err| E::custom(format!("duration {err}")))
        }
    }

    deserializer.deserialize_any(Visitor)
}

fn deserialize_antialias_opt<'de, D>(deserializer: D) -> Result<Option<AntialiasSetting>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Helper {
        Str(String),
        Num(i64),
    }

    let helper: Option<Helper> = Option::deserialize(deserializer)?;
    let result = match helper {
        None => None,
        Some(Helper::Str(raw)) => Some(parse_antialias(&raw).map_err(de::Error::custom)?),
        Some(Helper::Num(value)) => {
            if value < 0 {
                return Err(de::Error::custom("antialias value must be non-negative"));
            }
            Some(parse_antialias(&value.to_string()).map_err(de::Error::custom)?)
        }
    };
    Ok(result)
}

/// Parses `auto`, `off`, or an MSAA sample count (2/4/8/16).
pub fn parse_antialias(raw: &str) -> Result<AntialiasSetting, String> {
    let normalized = raw.trim().to_ascii_lowercase();
    match normalized.as_str() {
        "auto" | "max" | "default" => Ok(AntialiasSetting::Auto),
        "off" | "none" | "disable" | "disabled" => Ok(AntialiasSetting::Off),
        other => other
            .parse::<u32>()
            .ok()
            .and_then(AntialiasSetting::from_samples)
            .ok_or_else(|| {
                format!("invalid antialias setting '{other}'; use auto/off or 2/4/8/16")
            }),
    }
}

fn seconds_to_duration(seconds: f64) -> Result<Duration, String> {
    if !seconds.is_finite() || seconds.is_sign_negative() {
        return Err("must be a finite, non-negative number".into());
    }
    Duration::try_from_secs_f64(seconds).map_err(|_| "is out of range".into())
}

/// Parses a human-readable duration (`"10s"`, `"1m 30s"`) or plain seconds.
pub fn parse_duration(raw: &str) -> Result<Duration, String> {
    let trimmed = raw.trim();
    if let Ok(seconds) = trimmed.parse::<f64>() {
        return seconds_to_duration(seconds).map_err(|err| format!("duration '{raw}' {err}"));
    }
    humantime::parse_duration(trimmed).map_err(|err| format!("invalid duration '{raw}': {err}"))
}

impl Settings {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let raw: Settings = toml::from_str(input)?;
        raw.validate()?;
        Ok(raw)
    }

    /// Reads and validates the file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Like [`Settings::load`], but a missing file yields the defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (key, value) in [
            ("window.width", self.window.width),
            ("window.height", self.window.height),
        ] {
            if value == Some(0) {
                return Err(ConfigError::Invalid(format!("{key} must be greater than zero")));
            }
        }

        if let Some(fps) = self.render.fps {
            if !fps.is_finite() || fps <= 0.0 || fps > MAX_FPS {
                return Err(ConfigError::Invalid(format!(
                    "render.fps must be in (0, {MAX_FPS}], got {fps}"
                )));
            }
        }

        if let Some(duration) = self.render.run_for {
            if duration.is_zero() {
                return Err(ConfigError::Invalid(
                    "render.run_for must be greater than zero".into(),
                ));
            }
        }

        Ok(())
    }

    /// Configured window size, taking unset dimensions from `fallback`.
    pub fn window_size(&self, fallback: (u32, u32)) -> (u32, u32) {
        (
            self.window.width.unwrap_or(fallback.0),
            self.window.height.unwrap_or(fallback.1),
        )
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    const SAMPLE: &str = r#"
[window]
width = 640
height = 480
title = "Loading"
transparent = false

[render]
fps = 60
antialias = 4
run_for = "1m 30s"
power = "high"
"#;

    #[test]
    fn parses_sample_config() {
        let settings = Settings::from_toml_str(SAMPLE).expect("parse settings");
        assert_eq!(settings.window_size((1, 1)), (640, 480));
        assert_eq!(settings.window.title.as_deref(), Some("Loading"));
        assert!(!settings.window.transparent);
        assert!(settings.window.decorations);
        assert_eq!(settings.render.fps, Some(60.0));
        assert_eq!(settings.render.antialias, Some(AntialiasSetting::Samples4));
        assert_eq!(settings.render.run_for, Some(Duration::from_secs(90)));
        assert_eq!(settings.render.power, Some(PowerSetting::High));
    }

    #[test]
    fn empty_config_uses_defaults() {
        let settings = Settings::from_toml_str("").unwrap();
        assert_eq!(settings, Settings::default());
        assert!(settings.window.transparent);
        assert_eq!(settings.window_size((800, 600)), (800, 600));

        let partial = Settings::from_toml_str("[window]\nheight = 300").unwrap();
        assert_eq!(partial.window_size((800, 600)), (800, 300));
    }

    #[test]
    fn accepts_numeric_and_string_forms() {
        let settings = Settings::from_toml_str(
            r#"
[render]
antialias = "off"
run_for = 5
"#,
        )
        .unwrap();
        assert_eq!(settings.render.antialias, Some(AntialiasSetting::Off));
        assert_eq!(settings.render.run_for, Some(Duration::from_secs(5)));
    }

    #[test]
    fn rejects_out_of_range_values() {
        for input in [
            "[window]\nwidth = 0",
            "[render]\nfps = 0",
            "[render]\nfps = 5000",
            "[render]\nrun_for = \"0s\"",
        ] {
            let err = Settings::from_toml_str(input).unwrap_err();
            assert!(matches!(err, ConfigError::Invalid(_)), "{input}: {err}");
        }
    }

    #[test]
    fn rejects_malformed_values() {
        for input in [
            "[render]\nantialias = 3",
            "[render]\nrun_for = \"soon\"",
            "[render]\npower = \"medium\"",
            "[window]\ncolour = \"red\"",
        ] {
            let err = Settings::from_toml_str(input).unwrap_err();
            assert!(matches!(err, ConfigError::Parse(_)), "{input}: {err}");
        }
    }

    #[test]
    fn parse_duration_handles_seconds_and_humantime() {
        assert_eq!(parse_duration("2.5").unwrap(), Duration::from_millis(2500));
        assert_eq!(parse_duration("250ms").unwrap(), Duration::from_millis(250));
        assert!(parse_duration("-1").is_err());
        assert!(parse_duration("1e30").is_err());
    }

    #[test]
    fn oversized_durations_are_errors() {
        let err = Settings::from_toml_str("[render]\nrun_for = 1e30\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)), "{err}");
        let err = Settings::from_toml_str("[render]\nrun_for = \"1e30\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)), "{err}");
    }

    #[test]
    fn load_reads_files_and_tolerates_missing_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        assert_eq!(Settings::load_or_default(&path).unwrap(), Settings::default());
        assert!(matches!(
            Settings::load(&path),
            Err(ConfigError::Io { .. })
        ));

        let mut file = fs::File::create(&path).unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        drop(file);

        let settings = Settings::load_or_default(&path).unwrap();
        assert_eq!(settings.render.fps, Some(60.0));
    }
}
