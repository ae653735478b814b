use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use serde::{Deserialize, Deserializer, Serialize};

use crate::cli::Cli;

pub const DEFAULT_FPS: u8 = 30;

/// Effect preferences persisted between sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectSettings {
    /// Raw tier as stored; clamped when the profile is derived.
    #[serde(deserialize_with = "lenient_quality")]
    pub quality: Option<i64>,
    pub enabled: bool,
    pub fps: u8,
}

impl Default for EffectSettings {
    fn default() -> Self {
        Self {
            quality: None,
            enabled: true,
            fps: DEFAULT_FPS,
        }
    }
}

impl EffectSettings {
    pub fn from_cli_defaults(cli: &Cli) -> Self {
        let mut settings = Self::default();
        settings.apply_cli(cli);
        settings
    }

    fn apply_cli(&mut self, cli: &Cli) {
        if cli.quality.is_some() {
            self.quality = cli.quality;
        }
        if cli.no_effects {
            self.enabled = false;
        }
        if let Some(fps) = cli.fps {
            self.fps = fps;
        }
        self.fps = self.fps.clamp(15, 60);
    }
}

/// Accepts any JSON number for `quality`; non-numeric values read as unset.
fn lenient_quality<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().map(|f| f.round() as i64)),
        _ => None,
    })
}

pub fn load_settings(cli: &Cli, enable_disk: bool) -> (EffectSettings, Option<PathBuf>) {
    if !enable_disk {
        return (EffectSettings::from_cli_defaults(cli), None);
    }

    let Some(path) = settings_path() else {
        return (EffectSettings::from_cli_defaults(cli), None);
    };

    (load_settings_at(cli, &path), Some(path))
}

/// Stored settings at `path` with command-line flags layered on top.
pub fn load_settings_at(cli: &Cli, path: &Path) -> EffectSettings {
    let mut settings = EffectSettings::default();
    if let Ok(content) = fs::read_to_string(path) {
        match serde_json::from_str::<EffectSettings>(&content) {
            Ok(saved) => settings = saved,
            Err(err) => log::warn!("ignoring unreadable settings {}: {err}", path.display()),
        }
    }
    settings.apply_cli(cli);
    settings
}

pub fn save_settings(path: &Path, settings: EffectSettings) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("creating settings directory failed")?;
    }
    let payload =
        serde_json::to_string_pretty(&settings).context("serializing settings payload failed")?;
    fs::write(path, payload).context("writing settings file failed")
}

fn settings_path() -> Option<PathBuf> {
    if let Some(base) = std::env::var_os("AMBIENT_FX_CONFIG_DIR") {
        return Some(PathBuf::from(base).join("settings.json"));
    }

    let home = std::env::var_os("HOME")?;
    Some(
        PathBuf::from(home)
            .join(".config")
            .join("ambient-fx")
            .join("settings.json"),
    )
}
