use glam::Vec3;
use rand::Rng;

use super::{ParticleTransform, SimBounds, chance_for_delta};

/// Chance per 60 fps frame that a resting drop starts to slide.
pub const SLIDE_CHANCE_PER_FRAME: f64 = 0.004;
/// Downward acceleration of a sliding drop, in glass units per second squared.
pub const SLIDE_ACCELERATION: f32 = 3.5;
/// Extra vertical scale per unit of slide velocity.
pub const STRETCH_PER_VELOCITY: f32 = 0.6;

/// Depth of the glass plane in front of the camera.
const GLASS_DEPTH: f32 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SlideState {
    Dormant,
    Sliding { velocity: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowDrop {
    pub position: Vec3,
    pub state: SlideState,
    pub visual_scale: f32,
}

impl WindowDrop {
    fn dormant_at_random(rng: &mut impl Rng, bounds: &SimBounds) -> Self {
        Self {
            position: Vec3::new(
                rng.random_range(-bounds.half_width..bounds.half_width),
                rng.random_range(bounds.bottom()..bounds.top()),
                -GLASS_DEPTH,
            ),
            state: SlideState::Dormant,
            visual_scale: rng.random_range(0.6..1.4),
        }
    }

    pub fn slide_velocity(&self) -> f32 {
        match self.state {
            SlideState::Dormant => 0.0,
            SlideState::Sliding { velocity } => velocity,
        }
    }

    pub fn is_sliding(&self) -> bool {
        matches!(self.state, SlideState::Sliding { .. })
    }

    /// Vertical scale; stretches with slide velocity into a streak.
    pub fn vertical_stretch(&self) -> f32 {
        self.visual_scale * (1.0 + self.slide_velocity() * STRETCH_PER_VELOCITY)
    }

    /// dormant -(chance)-> sliding -(leaves glass)-> dormant somewhere else.
    fn advance(&mut self, dt: f32, start_slide: bool, rng: &mut impl Rng, bounds: &SimBounds) {
        match self.state {
            SlideState::Dormant => {
                if start_slide {
                    self.state = SlideState::Sliding { velocity: 0.0 };
                }
            }
            SlideState::Sliding { velocity } => {
                let velocity = velocity + SLIDE_ACCELERATION * dt;
                self.position.y -= velocity * dt;
                if self.position.y < bounds.bottom() {
                    *self = Self::dormant_at_random(rng, bounds);
                } else {
                    self.state = SlideState::Sliding { velocity };
                }
            }
        }
    }
}

/// Drops clinging to the glass plane in front of the rain field.
#[derive(Debug, Clone)]
pub struct WindowDropField {
    drops: Vec<WindowDrop>,
    bounds: SimBounds,
    elapsed: f32,
}

impl WindowDropField {
    #[must_use]
    pub fn new(count: usize, bounds: SimBounds) -> Self {
        let bounds = glass_bounds(bounds);
        let mut rng = rand::rng();
        let drops = (0..count)
            .map(|_| WindowDrop::dormant_at_random(&mut rng, &bounds))
            .collect();
        Self {
            drops,
            bounds,
            elapsed: 0.0,
        }
    }

    pub fn len(&self) -> usize {
        self.drops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drops.is_empty()
    }

    pub fn drops(&self) -> &[WindowDrop] {
        &self.drops
    }

    pub fn bounds(&self) -> SimBounds {
        self.bounds
    }

    pub fn sliding_count(&self) -> usize {
        self.drops.iter().filter(|d| d.is_sliding()).count()
    }

    pub fn step(&mut self, dt: f32) {
        if dt <= 0.0 {
            return;
        }
        self.elapsed += dt;
        let chance = chance_for_delta(SLIDE_CHANCE_PER_FRAME, dt);
        let bounds = self.bounds;
        let mut rng = rand::rng();
        for drop in &mut self.drops {
            let start_slide = rng.random_bool(chance);
            drop.advance(dt, start_slide, &mut rng, &bounds);
        }
    }

    pub fn rescale(&mut self, bounds: SimBounds) {
        let bounds = glass_bounds(bounds);
        let sx = bounds.half_width / self.bounds.half_width;
        let sy = bounds.half_height / self.bounds.half_height;
        for drop in &mut self.drops {
            drop.position.x *= sx;
            drop.position.y *= sy;
        }
        self.bounds = bounds;
    }

    pub fn transforms(&self) -> impl Iterator<Item = ParticleTransform> + '_ {
        self.drops.iter().map(|drop| ParticleTransform {
            position: drop.position,
            tilt: 0.0,
            scale: Vec3::new(drop.visual_scale, drop.vertical_stretch(), drop.visual_scale),
        })
    }
}

fn glass_bounds(bounds: SimBounds) -> SimBounds {
    SimBounds {
        near: GLASS_DEPTH,
        far: GLASS_DEPTH,
        ..bounds
    }
}
