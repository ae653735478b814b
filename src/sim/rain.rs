use glam::Vec3;
use rand::Rng;

use super::{ParticleTransform, SimBounds};
use crate::domain::RainIntensity;

/// Fall speed of a drop with `fall_speed_factor == 1.0`, in world units per second.
pub const BASE_FALL_SPEED: f32 = 18.0;
/// Lateral wind applied in heavy rain, in world units per second.
pub const HEAVY_WIND_SPEED: f32 = 6.0;

const STREAK_LENGTH: f32 = 0.9;
const HEAVY_STREAK_BOOST: f32 = 1.35;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RainDrop {
    pub position: Vec3,
    /// Always within `(0.5, 1.0]`.
    pub fall_speed_factor: f32,
    pub visual_scale: f32,
}

impl RainDrop {
    fn random(rng: &mut impl Rng, bounds: &SimBounds) -> Self {
        Self {
            position: Vec3::new(
                rng.random_range(-bounds.half_width..bounds.half_width),
                rng.random_range(bounds.bottom()..bounds.top()),
                -rng.random_range(bounds.near..bounds.far),
            ),
            fall_speed_factor: 1.0 - rng.random_range(0.0..0.5),
            visual_scale: rng.random_range(0.8..1.2),
        }
    }

    pub fn vertical_speed(&self) -> f32 {
        self.fall_speed_factor * BASE_FALL_SPEED
    }
}

/// Streak angle from vertical for a drop falling at `vertical_speed` under `wind_speed`.
///
/// Equals `atan(wind_speed / vertical_speed)` for any positive fall speed and is exactly zero
/// in still air.
#[must_use]
pub fn streak_tilt(wind_speed: f32, vertical_speed: f32) -> f32 {
    if wind_speed == 0.0 {
        return 0.0;
    }
    wind_speed.atan2(vertical_speed)
}

/// The primary falling-rain field.
#[derive(Debug, Clone)]
pub struct RainField {
    drops: Vec<RainDrop>,
    bounds: SimBounds,
    intensity: RainIntensity,
    elapsed: f32,
}

impl RainField {
    #[must_use]
    pub fn new(count: usize, bounds: SimBounds, intensity: RainIntensity) -> Self {
        let mut rng = rand::rng();
        let drops = (0..count)
            .map(|_| RainDrop::random(&mut rng, &bounds))
            .collect();
        Self {
            drops,
            bounds,
            intensity,
            elapsed: 0.0,
        }
    }

    pub fn len(&self) -> usize {
        self.drops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drops.is_empty()
    }

    pub fn drops(&self) -> &[RainDrop] {
        &self.drops
    }

    pub fn bounds(&self) -> SimBounds {
        self.bounds
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn intensity(&self) -> RainIntensity {
        self.intensity
    }

    pub fn set_intensity(&mut self, intensity: RainIntensity) {
        self.intensity = intensity;
    }

    pub fn wind_speed(&self) -> f32 {
        match self.intensity {
            RainIntensity::Steady => 0.0,
            RainIntensity::Heavy => HEAVY_WIND_SPEED,
        }
    }

    pub fn step(&mut self, dt: f32) {
        if dt <= 0.0 {
            return;
        }
        self.elapsed += dt;
        let wind = self.wind_speed();
        let bounds = self.bounds;
        let mut rng = rand::rng();
        for drop in &mut self.drops {
            let fall = drop.vertical_speed();
            drop.position.y -= fall * dt;
            drop.position.x = bounds.wrap_x(drop.position.x + wind * dt);
            if drop.position.y < bounds.bottom() {
                drop.position.y = bounds.top();
                drop.position.x = respawn_x(&mut rng, &bounds, wind, fall);
            }
        }
    }

    /// Maps the field into new bounds while keeping every drop.
    pub fn rescale(&mut self, bounds: SimBounds) {
        let sx = bounds.half_width / self.bounds.half_width;
        let sy = bounds.half_height / self.bounds.half_height;
        for drop in &mut self.drops {
            drop.position.x *= sx;
            drop.position.y *= sy;
        }
        self.bounds = bounds;
    }

    pub fn transforms(&self) -> impl Iterator<Item = ParticleTransform> + '_ {
        let wind = self.wind_speed();
        let stretch = match self.intensity {
            RainIntensity::Steady => 1.0,
            RainIntensity::Heavy => HEAVY_STREAK_BOOST,
        };
        self.drops.iter().map(move |drop| ParticleTransform {
            position: drop.position,
            tilt: streak_tilt(wind, drop.vertical_speed()),
            scale: Vec3::new(
                drop.visual_scale,
                drop.visual_scale * STREAK_LENGTH * stretch,
                drop.visual_scale,
            ),
        })
    }
}

/// New X for a drop re-entering at the top. The downwind strip it would drift across during
/// half a fall is excluded, so respawns lean upwind.
fn respawn_x(rng: &mut impl Rng, bounds: &SimBounds, wind: f32, fall_speed: f32) -> f32 {
    let hw = bounds.half_width;
    if wind == 0.0 || fall_speed <= 0.0 {
        return rng.random_range(-hw..hw);
    }
    let fall_time = (bounds.half_height * 2.0) / fall_speed;
    let drift = (wind * fall_time * 0.5).clamp(-0.9 * hw, 0.9 * hw);
    if drift > 0.0 {
        rng.random_range(-hw..hw - drift)
    } else {
        rng.random_range(-hw - drift..hw)
    }
}
