use rand::Rng;

use super::chance_for_delta;

/// Chance per 60 fps frame that a quiet sky strikes.
pub const STRIKE_CHANCE_PER_FRAME: f64 = 0.006;
/// Chance that a strike is followed by a second, dimmer return stroke.
pub const RESTRIKE_CHANCE: f64 = 0.35;

const MIN_QUIET_SECS: f32 = 1.2;
const FLASH_SECS: std::ops::Range<f32> = 0.06..0.22;
const RESTRIKE_GAP_SECS: std::ops::Range<f32> = 0.05..0.16;
const RESTRIKE_INTENSITY: f32 = 0.55;

#[derive(Debug, Clone, Copy, PartialEq)]
enum FlashState {
    Quiet { for_secs: f32 },
    Flash { remaining: f32, intensity: f32, restrike: bool },
    Gap { remaining: f32 },
}

/// Binary flash overlay for thunderstorms, fired on an irregular low-rate schedule.
#[derive(Debug, Clone)]
pub struct LightningFlash {
    state: FlashState,
    eligible: bool,
    strikes: u64,
}

impl Default for LightningFlash {
    fn default() -> Self {
        Self::new()
    }
}

impl LightningFlash {
    pub fn new() -> Self {
        Self {
            state: FlashState::Quiet { for_secs: 0.0 },
            eligible: false,
            strikes: 0,
        }
    }

    pub fn is_eligible(&self) -> bool {
        self.eligible
    }

    /// Ineligible skies go dark immediately.
    pub fn set_eligible(&mut self, eligible: bool) {
        if !eligible {
            self.state = FlashState::Quiet { for_secs: 0.0 };
        }
        self.eligible = eligible;
    }

    pub fn is_flashing(&self) -> bool {
        matches!(self.state, FlashState::Flash { .. })
    }

    /// Brightness of the current flash, 0.0 when dark.
    pub fn intensity(&self) -> f32 {
        match self.state {
            FlashState::Flash { intensity, .. } => intensity,
            FlashState::Quiet { .. } | FlashState::Gap { .. } => 0.0,
        }
    }

    /// Primary strikes since creation; return strokes are not counted.
    pub fn strikes(&self) -> u64 {
        self.strikes
    }

    pub fn tick(&mut self, dt: f32) {
        if !self.eligible || dt <= 0.0 {
            return;
        }
        let mut rng = rand::rng();
        self.state = match self.state {
            FlashState::Quiet { for_secs } => {
                let for_secs = for_secs + dt;
                if for_secs >= MIN_QUIET_SECS
                    && rng.random_bool(chance_for_delta(STRIKE_CHANCE_PER_FRAME, dt))
                {
                    self.strikes += 1;
                    FlashState::Flash {
                        remaining: rng.random_range(FLASH_SECS),
                        intensity: 1.0,
                        restrike: rng.random_bool(RESTRIKE_CHANCE),
                    }
                } else {
                    FlashState::Quiet { for_secs }
                }
            }
            FlashState::Flash {
                remaining,
                intensity,
                restrike,
            } => {
                let remaining = remaining - dt;
                if remaining > 0.0 {
                    FlashState::Flash {
                        remaining,
                        intensity,
                        restrike,
                    }
                } else if restrike {
                    FlashState::Gap {
                        remaining: rng.random_range(RESTRIKE_GAP_SECS),
                    }
                } else {
                    FlashState::Quiet { for_secs: 0.0 }
                }
            }
            FlashState::Gap { remaining } => {
                let remaining = remaining - dt;
                if remaining > 0.0 {
                    FlashState::Gap { remaining }
                } else {
                    FlashState::Flash {
                        remaining: rng.random_range(FLASH_SECS),
                        intensity: RESTRIKE_INTENSITY,
                        restrike: false,
                    }
                }
            }
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    #[test]
    fn ineligible_sky_never_flashes() {
        let mut flash = LightningFlash::new();
        for _ in 0..20_000 {
            flash.tick(DT);
            assert!(!flash.is_flashing());
        }
        assert_eq!(flash.strikes(), 0);
    }

    #[test]
    fn eligible_sky_eventually_strikes() {
        let mut flash = LightningFlash::new();
        flash.set_eligible(true);
        for _ in 0..60 * 120 {
            flash.tick(DT);
        }
        assert!(flash.strikes() > 0);
    }

    #[test]
    fn strike_timing_is_irregular() {
        let mut flash = LightningFlash::new();
        flash.set_eligible(true);
        let mut onsets = Vec::new();
        let mut was_flashing = false;
        for frame in 0..60 * 60 * 10 {
            let before = flash.strikes();
            flash.tick(DT);
            if flash.strikes() > before {
                onsets.push(frame);
            }
            was_flashing |= flash.is_flashing();
        }
        assert!(was_flashing);
        assert!(onsets.len() >= 4, "only {} strikes", onsets.len());
        let gaps: Vec<i32> = onsets.windows(2).map(|w| w[1] - w[0]).collect();
        assert!(
            gaps.iter().any(|g| *g != gaps[0]),
            "strike gaps were perfectly periodic: {gaps:?}"
        );
    }

    #[test]
    fn strikes_respect_quiet_period() {
        let mut flash = LightningFlash::new();
        flash.set_eligible(true);
        let quiet_frames = (MIN_QUIET_SECS / DT) as usize;
        for _ in 0..quiet_frames - 1 {
            flash.tick(DT);
        }
        assert_eq!(flash.strikes(), 0);
    }

    #[test]
    fn disabling_cuts_an_active_flash() {
        let mut flash = LightningFlash::new();
        flash.set_eligible(true);
        for _ in 0..60 * 600 {
            flash.tick(DT);
            if flash.is_flashing() {
                break;
            }
        }
        assert!(flash.is_flashing());
        assert!(flash.intensity() > 0.0);
        flash.set_eligible(false);
        assert!(!flash.is_flashing());
        assert_eq!(flash.intensity(), 0.0);
    }
}
