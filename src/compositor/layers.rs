use crate::domain::EffectMode;

/// Seconds for a layer to fade fully in or out.
pub const FADE_SECS: f32 = 1.2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerKind {
    Vignette,
    Sun,
    Cloud,
    Fog,
    Snow,
    /// Flat looping rain used when no particle surface is mounted.
    Rain,
    /// The particle surface.
    Particles,
    Lightning,
}

/// Paint order, back to front.
pub const LAYER_ORDER: [LayerKind; 8] = [
    LayerKind::Vignette,
    LayerKind::Sun,
    LayerKind::Cloud,
    LayerKind::Fog,
    LayerKind::Snow,
    LayerKind::Rain,
    LayerKind::Particles,
    LayerKind::Lightning,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VignetteTone {
    Warm,
    Overcast,
    Neutral,
}

impl VignetteTone {
    pub fn for_mode(mode: EffectMode) -> Self {
        match mode {
            EffectMode::Clear => Self::Warm,
            EffectMode::Cloudy => Self::Overcast,
            EffectMode::Rain | EffectMode::Thunder | EffectMode::Snow | EffectMode::Fog => {
                Self::Neutral
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Layer {
    pub kind: LayerKind,
    pub opacity: f32,
    pub target: f32,
}

impl Layer {
    pub fn is_visible(&self) -> bool {
        self.opacity > 0.0
    }

    pub fn is_fading(&self) -> bool {
        self.opacity != self.target
    }

    fn advance(&mut self, dt: f32) {
        let step = dt / FADE_SECS;
        self.opacity = if self.opacity < self.target {
            (self.opacity + step).min(self.target)
        } else {
            (self.opacity - step).max(self.target)
        };
    }
}

/// Whether `kind` belongs to the picture of `mode`.
#[must_use]
pub fn layer_active(kind: LayerKind, mode: EffectMode, particles_mounted: bool) -> bool {
    let rainy = mode.rain_intensity().is_some();
    match kind {
        LayerKind::Vignette => true,
        LayerKind::Sun => mode == EffectMode::Clear,
        LayerKind::Cloud => matches!(
            mode,
            EffectMode::Cloudy | EffectMode::Rain | EffectMode::Thunder
        ),
        LayerKind::Fog => mode == EffectMode::Fog,
        LayerKind::Snow => mode == EffectMode::Snow,
        LayerKind::Rain => rainy && !particles_mounted,
        LayerKind::Particles => rainy && particles_mounted,
        LayerKind::Lightning => mode.has_lightning(),
    }
}

/// Every declarative layer stays present; only opacities move.
#[derive(Debug, Clone)]
pub struct LayerStack {
    layers: [Layer; LAYER_ORDER.len()],
    tone: VignetteTone,
}

impl LayerStack {
    /// A stack already showing `mode`, without a fade.
    #[must_use]
    pub fn settled(mode: EffectMode) -> Self {
        let mut stack = Self {
            layers: LAYER_ORDER.map(|kind| Layer {
                kind,
                opacity: 0.0,
                target: 0.0,
            }),
            tone: VignetteTone::for_mode(mode),
        };
        stack.retarget(mode, false);
        for layer in &mut stack.layers {
            layer.opacity = layer.target;
        }
        stack
    }

    pub fn retarget(&mut self, mode: EffectMode, particles_mounted: bool) {
        self.tone = VignetteTone::for_mode(mode);
        for layer in &mut self.layers {
            layer.target = if layer_active(layer.kind, mode, particles_mounted) {
                1.0
            } else {
                0.0
            };
        }
    }

    /// Moves the particle layer's opacity onto the flat rain layer so released particles fade
    /// out through the cheap layer instead of vanishing.
    pub fn hand_off_particles(&mut self) {
        let particles = self.get(LayerKind::Particles).opacity;
        let rain = self.get_mut(LayerKind::Rain);
        rain.opacity = rain.opacity.max(particles);
        self.get_mut(LayerKind::Particles).opacity = 0.0;
    }

    pub fn advance(&mut self, dt: f32) {
        if dt <= 0.0 {
            return;
        }
        for layer in &mut self.layers {
            layer.advance(dt);
        }
    }

    pub fn get(&self, kind: LayerKind) -> &Layer {
        &self.layers[index_of(kind)]
    }

    fn get_mut(&mut self, kind: LayerKind) -> &mut Layer {
        &mut self.layers[index_of(kind)]
    }

    pub fn opacity(&self, kind: LayerKind) -> f32 {
        self.get(kind).opacity
    }

    pub fn tone(&self) -> VignetteTone {
        self.tone
    }

    pub fn is_settled(&self) -> bool {
        self.layers.iter().all(|layer| !layer.is_fading())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Layer> {
        self.layers.iter()
    }
}

fn index_of(kind: LayerKind) -> usize {
    LAYER_ORDER
        .iter()
        .position(|candidate| *candidate == kind)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settled_stack_shows_mode_immediately() {
        let stack = LayerStack::settled(EffectMode::Clear);
        assert_eq!(stack.opacity(LayerKind::Sun), 1.0);
        assert_eq!(stack.opacity(LayerKind::Vignette), 1.0);
        assert_eq!(stack.opacity(LayerKind::Rain), 0.0);
        assert_eq!(stack.tone(), VignetteTone::Warm);
        assert!(stack.is_settled());
    }

    #[test]
    fn crossfade_overlaps_outgoing_and_incoming() {
        let mut stack = LayerStack::settled(EffectMode::Clear);
        stack.retarget(EffectMode::Snow, false);
        stack.advance(FADE_SECS / 2.0);
        let sun = stack.opacity(LayerKind::Sun);
        let snow = stack.opacity(LayerKind::Snow);
        assert!(sun > 0.0 && sun < 1.0);
        assert!(snow > 0.0 && snow < 1.0);
        stack.advance(FADE_SECS);
        assert_eq!(stack.opacity(LayerKind::Sun), 0.0);
        assert_eq!(stack.opacity(LayerKind::Snow), 1.0);
        assert!(stack.is_settled());
    }

    #[test]
    fn rain_uses_flat_layer_without_particles() {
        assert!(layer_active(LayerKind::Rain, EffectMode::Rain, false));
        assert!(!layer_active(LayerKind::Particles, EffectMode::Rain, false));
        assert!(!layer_active(LayerKind::Rain, EffectMode::Thunder, true));
        assert!(layer_active(LayerKind::Particles, EffectMode::Thunder, true));
        assert!(!layer_active(LayerKind::Particles, EffectMode::Snow, true));
    }

    #[test]
    fn hand_off_moves_particle_opacity_to_flat_rain() {
        let mut stack = LayerStack::settled(EffectMode::Clear);
        stack.retarget(EffectMode::Rain, true);
        stack.advance(FADE_SECS);
        assert_eq!(stack.opacity(LayerKind::Particles), 1.0);
        stack.hand_off_particles();
        stack.retarget(EffectMode::Clear, false);
        assert_eq!(stack.opacity(LayerKind::Particles), 0.0);
        assert_eq!(stack.opacity(LayerKind::Rain), 1.0);
        stack.advance(FADE_SECS);
        assert_eq!(stack.opacity(LayerKind::Rain), 0.0);
    }

    #[test]
    fn lightning_layer_only_for_thunder() {
        for mode in crate::domain::effects::ALL_MODES {
            assert_eq!(
                layer_active(LayerKind::Lightning, mode, true),
                mode == EffectMode::Thunder
            );
        }
    }
}
