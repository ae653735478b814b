pub mod effects;
pub mod quality;

pub use effects::{EffectInputs, EffectMode, RainIntensity, classify, resolve_mode};
pub use quality::{
    DEFAULT_TIER, FrameCadence, MaterialComplexity, QualityProfile, QualityTier, profile_for,
};
