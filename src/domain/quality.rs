use serde::{Deserialize, Serialize};

pub const MIN_TIER: u8 = 1;
pub const MAX_TIER: u8 = 5;
pub const DEFAULT_TIER: u8 = 3;

/// User-facing fidelity setting, always within `1..=5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "u8", from = "i64")]
pub struct QualityTier(u8);

impl QualityTier {
    /// Clamps any integer onto the nearest valid tier.
    #[must_use]
    pub fn new(raw: i64) -> Self {
        let clamped = raw.clamp(i64::from(MIN_TIER), i64::from(MAX_TIER));
        Self(u8::try_from(clamped).unwrap_or(DEFAULT_TIER))
    }

    /// Missing settings fall back to the medium tier.
    #[must_use]
    pub fn from_setting(raw: Option<i64>) -> Self {
        raw.map_or_else(Self::default, Self::new)
    }

    pub fn get(self) -> u8 {
        self.0
    }

    #[must_use]
    pub fn raised(self) -> Self {
        Self::new(i64::from(self.0) + 1)
    }

    #[must_use]
    pub fn lowered(self) -> Self {
        Self::new(i64::from(self.0) - 1)
    }

    pub fn all() -> impl Iterator<Item = Self> {
        (MIN_TIER..=MAX_TIER).map(Self)
    }
}

impl Default for QualityTier {
    fn default() -> Self {
        Self(DEFAULT_TIER)
    }
}

impl From<i64> for QualityTier {
    fn from(raw: i64) -> Self {
        Self::new(raw)
    }
}

impl From<QualityTier> for u8 {
    fn from(tier: QualityTier) -> Self {
        tier.0
    }
}

impl std::fmt::Display for QualityTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "q{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MaterialComplexity {
    Flat,
    Lit,
    Refractive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FrameCadence {
    /// Render only after an explicit invalidation.
    OnDemand,
    /// Render on every display refresh.
    Continuous,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QualityProfile {
    pub tier: QualityTier,
    pub rain_particle_count: usize,
    pub window_drop_count: usize,
    pub geometry_detail: u8,
    pub material: MaterialComplexity,
    pub environment_reflections: bool,
    pub device_scale_cap: f32,
    pub cadence: FrameCadence,
}

impl QualityProfile {
    /// Tier 1 renders through declarative layers only.
    pub fn simulation_enabled(&self) -> bool {
        self.rain_particle_count > 0
    }
}

#[must_use]
pub fn profile_for(tier: QualityTier) -> QualityProfile {
    let (rain, window, detail, material, scale_cap) = match tier.get() {
        1 => (0, 0, 0, MaterialComplexity::Flat, 1.0),
        2 => (30, 8, 3, MaterialComplexity::Flat, 1.0),
        3 => (50, 12, 6, MaterialComplexity::Lit, 1.5),
        4 => (75, 16, 8, MaterialComplexity::Refractive, 2.0),
        _ => (100, 20, 12, MaterialComplexity::Refractive, 2.0),
    };
    QualityProfile {
        tier,
        rain_particle_count: rain,
        window_drop_count: window,
        geometry_detail: detail,
        material,
        environment_reflections: tier.get() >= MAX_TIER,
        device_scale_cap: scale_cap,
        cadence: if tier.get() >= 3 {
            FrameCadence::Continuous
        } else {
            FrameCadence::OnDemand
        },
    }
}
