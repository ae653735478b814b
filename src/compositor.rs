pub mod layers;

use std::time::Duration;

pub use layers::{FADE_SECS, LAYER_ORDER, Layer, LayerKind, LayerStack, VignetteTone};

use crate::{
    diagnostics::{LogSink, Severity},
    domain::{
        EffectInputs, EffectMode, QualityProfile, QualityTier, RainIntensity, profile_for,
        resolve_mode,
    },
    render::{FrameScheduler, GraphicsDevice, RenderSurface, ResourceTracker, Sprite, Viewport},
    sim::{AmbientClock, AmbientPhases, LightningFlash, SimBounds, clamp_delta},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceStatus {
    /// Particle surface mounted and simulating.
    Mounted,
    /// Current mode renders through declarative layers only.
    Flat,
    /// The device failed; every mode renders flat for the rest of the session.
    Degraded,
}

/// Read-only picture of one frame for painters.
#[derive(Debug, Clone)]
pub struct EffectFrame<'a> {
    pub mode: EffectMode,
    pub tier: QualityTier,
    pub layers: &'a LayerStack,
    pub phases: AmbientPhases,
    pub sprites: &'a [Sprite],
    pub bounds: Option<SimBounds>,
    pub flash: f32,
    /// Strikes so far; painters use it to place the bolt.
    pub strikes: u64,
    pub surface: SurfaceStatus,
}

pub struct EffectCompositor {
    device: Box<dyn GraphicsDevice>,
    scheduler: FrameScheduler,
    sink: Box<dyn LogSink>,
    inputs: EffectInputs,
    mode: EffectMode,
    profile: QualityProfile,
    viewport: Viewport,
    surface: Option<RenderSurface>,
    degraded: bool,
    layers: LayerStack,
    lightning: LightningFlash,
    ambient: AmbientClock,
}

impl std::fmt::Debug for EffectCompositor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectCompositor")
            .field("device", &self.device.label())
            .field("mode", &self.mode)
            .field("tier", &self.profile.tier)
            .field("surface", &self.surface_status())
            .finish_non_exhaustive()
    }
}

impl EffectCompositor {
    /// Starts in the clear picture with nothing allocated.
    pub fn new(
        device: Box<dyn GraphicsDevice>,
        sink: Box<dyn LogSink>,
        viewport: Viewport,
    ) -> Self {
        let inputs = EffectInputs::default();
        Self {
            device,
            scheduler: FrameScheduler::new(),
            sink,
            inputs,
            mode: EffectMode::Clear,
            profile: profile_for(inputs.tier()),
            viewport,
            surface: None,
            degraded: false,
            layers: LayerStack::settled(EffectMode::Clear),
            lightning: LightningFlash::new(),
            ambient: AmbientClock::new(),
        }
    }

    /// Applies a weather refresh. The only way the mode ever changes.
    pub fn update(&mut self, inputs: EffectInputs) {
        let mode = resolve_mode(&inputs);
        let profile = profile_for(inputs.tier());
        let profile_changed = profile != self.profile;
        self.inputs = inputs;
        self.profile = profile;

        if mode != self.mode {
            self.mode = mode;
            self.sink.log(&format!("effect={mode}"), Severity::Info);
        }

        self.sync_surface(profile_changed);
        self.layers.retarget(self.mode, self.surface.is_some());
        self.lightning.set_eligible(self.mode.has_lightning());
    }

    /// One display frame.
    pub fn tick(&mut self, dt: Duration) {
        let dt = clamp_delta(dt);
        self.layers.advance(dt);
        self.ambient.advance(dt);
        self.lightning.tick(dt);
        if let Some(surface) = &mut self.surface {
            surface.tick(dt);
        }
    }

    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        let Some(surface) = &mut self.surface else {
            return;
        };
        if let Err(err) = surface.resize(&mut *self.device, viewport) {
            self.degrade(&err.to_string());
        }
    }

    /// Releases the particle surface. Also happens on drop.
    pub fn shutdown(&mut self) {
        if let Some(surface) = self.surface.take() {
            surface.unmount();
        }
    }

    #[must_use]
    pub fn frame(&self) -> EffectFrame<'_> {
        EffectFrame {
            mode: self.mode,
            tier: self.profile.tier,
            layers: &self.layers,
            phases: self.ambient.phases(),
            sprites: self
                .surface
                .as_ref()
                .map(RenderSurface::sprites)
                .unwrap_or_default(),
            bounds: self.surface.as_ref().map(|s| s.rain().bounds()),
            flash: self.lightning.intensity(),
            strikes: self.lightning.strikes(),
            surface: self.surface_status(),
        }
    }

    pub fn mode(&self) -> EffectMode {
        self.mode
    }

    pub fn inputs(&self) -> EffectInputs {
        self.inputs
    }

    pub fn profile(&self) -> &QualityProfile {
        &self.profile
    }

    pub fn surface(&self) -> Option<&RenderSurface> {
        self.surface.as_ref()
    }

    pub fn surface_status(&self) -> SurfaceStatus {
        if self.surface.is_some() {
            SurfaceStatus::Mounted
        } else if self.degraded {
            SurfaceStatus::Degraded
        } else {
            SurfaceStatus::Flat
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    pub fn layers(&self) -> &LayerStack {
        &self.layers
    }

    pub fn lightning(&self) -> &LightningFlash {
        &self.lightning
    }

    pub fn scheduler(&self) -> &FrameScheduler {
        &self.scheduler
    }

    pub fn resources(&self) -> &ResourceTracker {
        self.device.tracker()
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn sync_surface(&mut self, profile_changed: bool) {
        let wants = !self.degraded && self.mode.requires_simulation(&self.profile);
        if !wants || profile_changed {
            self.release_surface();
        }
        if !wants {
            return;
        }
        let Some(intensity) = self.mode.rain_intensity() else {
            return;
        };
        match &mut self.surface {
            Some(surface) => surface.set_intensity(intensity),
            None => self.mount_surface(intensity),
        }
    }

    fn mount_surface(&mut self, intensity: RainIntensity) {
        match RenderSurface::mount(
            &mut *self.device,
            &self.scheduler,
            self.viewport,
            self.profile,
            intensity,
        ) {
            Ok(surface) => self.surface = Some(surface),
            Err(err) => self.degrade(&err.to_string()),
        }
    }

    fn release_surface(&mut self) {
        if let Some(surface) = self.surface.take() {
            self.layers.hand_off_particles();
            surface.unmount();
        }
    }

    fn degrade(&mut self, reason: &str) {
        self.release_surface();
        self.layers.retarget(self.mode, false);
        if !self.degraded {
            self.degraded = true;
            self.sink.log(
                &format!("effects: particle surface unavailable ({reason}); using flat layers"),
                Severity::Warn,
            );
        }
    }
}

impl Drop for EffectCompositor {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests;
