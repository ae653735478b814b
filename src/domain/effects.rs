use serde::{Deserialize, Serialize};

use super::quality::{QualityProfile, QualityTier};

/// The single weather visual category driving the overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EffectMode {
    Clear,
    Cloudy,
    Rain,
    Thunder,
    Snow,
    Fog,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RainIntensity {
    Steady,
    Heavy,
}

/// Everything the host hands over on a weather refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EffectInputs {
    pub weather_code: Option<i64>,
    pub enabled: bool,
    pub quality: Option<i64>,
}

impl EffectInputs {
    #[must_use]
    pub fn new(weather_code: Option<i64>, enabled: bool, quality: Option<i64>) -> Self {
        Self {
            weather_code,
            enabled,
            quality,
        }
    }

    pub fn tier(&self) -> QualityTier {
        QualityTier::from_setting(self.quality)
    }
}

impl Default for EffectInputs {
    fn default() -> Self {
        Self::new(None, true, None)
    }
}

pub const ALL_MODES: [EffectMode; 6] = [
    EffectMode::Clear,
    EffectMode::Cloudy,
    EffectMode::Rain,
    EffectMode::Thunder,
    EffectMode::Snow,
    EffectMode::Fog,
];

impl EffectMode {
    pub fn label(self) -> &'static str {
        match self {
            Self::Clear => "clear",
            Self::Cloudy => "cloudy",
            Self::Rain => "rain",
            Self::Thunder => "thunder",
            Self::Snow => "snow",
            Self::Fog => "fog",
        }
    }

    pub fn rain_intensity(self) -> Option<RainIntensity> {
        match self {
            Self::Rain => Some(RainIntensity::Steady),
            Self::Thunder => Some(RainIntensity::Heavy),
            Self::Clear | Self::Cloudy | Self::Snow | Self::Fog => None,
        }
    }

    pub fn has_lightning(self) -> bool {
        self == Self::Thunder
    }

    /// Whether this mode needs the particle surface under `profile`.
    pub fn requires_simulation(self, profile: &QualityProfile) -> bool {
        self.rain_intensity().is_some() && profile.simulation_enabled()
    }
}

impl std::fmt::Display for EffectMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Maps an Open-Meteo WMO weather code to an effect mode. Unknown codes fall back to cloudy.
#[must_use]
pub fn classify(code: i64) -> EffectMode {
    match code {
        0..=2 => EffectMode::Clear,
        3 => EffectMode::Cloudy,
        45 | 48 => EffectMode::Fog,
        51 | 53 | 55 | 56 | 57 | 61 | 63 | 65 | 66 | 67 | 80 | 81 | 82 => EffectMode::Rain,
        71 | 73 | 75 | 77 | 85 | 86 => EffectMode::Snow,
        95 | 96 | 99 => EffectMode::Thunder,
        _ => EffectMode::Cloudy,
    }
}

/// Disabled effects or a missing code force the clear mode.
#[must_use]
pub fn resolve_mode(inputs: &EffectInputs) -> EffectMode {
    match inputs.weather_code {
        Some(code) if inputs.enabled => classify(code),
        _ => EffectMode::Clear,
    }
}
