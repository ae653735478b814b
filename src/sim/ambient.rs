/// A loop whose phase runs from 0.0 to 1.0 once per period, then wraps.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoopingAnimation {
    period_secs: f32,
    phase: f32,
}

impl LoopingAnimation {
    pub fn new(period_secs: f32) -> Self {
        Self {
            period_secs: period_secs.max(f32::EPSILON),
            phase: 0.0,
        }
    }

    pub fn advance(&mut self, dt: f32) {
        self.phase = (self.phase + dt.max(0.0) / self.period_secs).rem_euclid(1.0);
    }

    pub fn phase(&self) -> f32 {
        self.phase
    }

    /// Integer step for painters that walk `steps` positions per loop.
    pub fn step(&self, steps: usize) -> usize {
        ((self.phase * steps as f32) as usize).min(steps.saturating_sub(1))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmbientPhases {
    pub sun: LoopingAnimation,
    pub cloud: LoopingAnimation,
    pub fog: LoopingAnimation,
    pub snow: LoopingAnimation,
    pub rain: LoopingAnimation,
}

/// Drives every declarative loop. Layers keep looping while hidden so a fade-in never pops.
#[derive(Debug, Clone)]
pub struct AmbientClock {
    phases: AmbientPhases,
}

impl Default for AmbientClock {
    fn default() -> Self {
        Self::new()
    }
}

impl AmbientClock {
    pub fn new() -> Self {
        Self {
            phases: AmbientPhases {
                sun: LoopingAnimation::new(16.0),
                cloud: LoopingAnimation::new(48.0),
                fog: LoopingAnimation::new(30.0),
                snow: LoopingAnimation::new(12.0),
                rain: LoopingAnimation::new(1.6),
            },
        }
    }

    pub fn advance(&mut self, dt: f32) {
        let p = &mut self.phases;
        for anim in [&mut p.sun, &mut p.cloud, &mut p.fog, &mut p.snow, &mut p.rain] {
            anim.advance(dt);
        }
    }

    pub fn phases(&self) -> AmbientPhases {
        self.phases
    }
}
