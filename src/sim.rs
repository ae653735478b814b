pub mod ambient;
pub mod lightning;
pub mod rain;
pub mod window;

use std::time::Duration;

use glam::Vec3;

pub use ambient::{AmbientClock, AmbientPhases, LoopingAnimation};
pub use lightning::LightningFlash;
pub use rain::{RainDrop, RainField, streak_tilt};
pub use window::{SlideState, WindowDrop, WindowDropField};

/// Longest frame delta fed into a simulation step.
pub const MAX_FRAME_DELTA: f32 = 0.25;

const HALF_HEIGHT: f32 = 10.0;
const NEAR_DEPTH: f32 = 2.0;
const FAR_DEPTH: f32 = 12.0;

/// Simulation volume in world units, centered on the camera axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimBounds {
    pub half_width: f32,
    pub half_height: f32,
    pub near: f32,
    pub far: f32,
}

impl SimBounds {
    #[must_use]
    pub fn for_aspect(aspect: f32) -> Self {
        let aspect = if aspect.is_finite() && aspect > 0.0 {
            aspect
        } else {
            1.0
        };
        Self {
            half_width: HALF_HEIGHT * aspect,
            half_height: HALF_HEIGHT,
            near: NEAR_DEPTH,
            far: FAR_DEPTH,
        }
    }

    pub fn top(&self) -> f32 {
        self.half_height
    }

    pub fn bottom(&self) -> f32 {
        -self.half_height
    }

    pub fn width(&self) -> f32 {
        self.half_width * 2.0
    }

    /// Toroidal wrap on the horizontal axis.
    pub fn wrap_x(&self, x: f32) -> f32 {
        (x + self.half_width).rem_euclid(self.width()) - self.half_width
    }

    /// 0.0 at the near plane, 1.0 at the far plane.
    pub fn depth_fraction(&self, z: f32) -> f32 {
        ((-z - self.near) / (self.far - self.near)).clamp(0.0, 1.0)
    }

    pub fn contains_xy(&self, position: Vec3) -> bool {
        position.x.abs() <= self.half_width && position.y.abs() <= self.half_height
    }
}

/// What a simulator emits for each particle every frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleTransform {
    pub position: Vec3,
    /// Streak angle from vertical in radians; positive leans with the wind.
    pub tilt: f32,
    pub scale: Vec3,
}

#[must_use]
pub fn clamp_delta(dt: Duration) -> f32 {
    dt.as_secs_f32().clamp(0.0, MAX_FRAME_DELTA)
}

/// Turns a per-frame chance tuned at 60 fps into one for an arbitrary delta.
#[must_use]
pub(crate) fn chance_for_delta(per_frame_at_60: f64, dt: f32) -> f64 {
    let frames = f64::from(dt.max(0.0)) * 60.0;
    (1.0 - (1.0 - per_frame_at_60).powf(frames)).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_x_is_toroidal() {
        let bounds = SimBounds::for_aspect(2.0);
        assert!((bounds.wrap_x(21.0) - -19.0).abs() < 1e-4);
        assert!((bounds.wrap_x(-21.0) - 19.0).abs() < 1e-4);
        assert!((bounds.wrap_x(3.5) - 3.5).abs() < 1e-6);
    }

    #[test]
    fn degenerate_aspect_falls_back_to_square() {
        assert_eq!(SimBounds::for_aspect(0.0), SimBounds::for_aspect(1.0));
        assert_eq!(SimBounds::for_aspect(f32::NAN), SimBounds::for_aspect(1.0));
    }

    #[test]
    fn delta_is_clamped() {
        assert_eq!(clamp_delta(Duration::from_secs(3)), MAX_FRAME_DELTA);
        assert!((clamp_delta(Duration::from_millis(16)) - 0.016).abs() < 1e-6);
    }

    #[test]
    fn frame_chance_scales_with_delta() {
        assert_eq!(chance_for_delta(0.01, 0.0), 0.0);
        let one_frame = chance_for_delta(0.01, 1.0 / 60.0);
        assert!((one_frame - 0.01).abs() < 1e-9);
        assert!(chance_for_delta(0.01, 0.25) > one_frame);
    }
}
