use std::mem::size_of;

use super::{
    Viewport,
    device::{GpuResource, GraphicsDevice, ResourceKind, SurfaceError},
    scheduler::{FrameHandle, FrameScheduler, ON_DEMAND_INTERVAL},
};
use crate::{
    domain::{FrameCadence, QualityProfile, RainIntensity},
    sim::{ParticleTransform, RainField, SimBounds, WindowDropField},
};

const BYTES_PER_CELL: usize = 4;
const LIGHTING_BYTES: usize = 256;
const ENVIRONMENT_MAP_BYTES: usize = 6 * 64 * 64 * 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpriteKind {
    RainStreak,
    WindowBead,
    WindowStreak,
}

/// One renderable particle emitted by the last rendered frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sprite {
    pub kind: SpriteKind,
    pub transform: ParticleTransform,
    /// 0.0 at the near plane, 1.0 at the far plane.
    pub depth: f32,
}

#[derive(Debug)]
struct SurfaceResources {
    canvas: GpuResource,
    _lighting: GpuResource,
    _environment: Option<GpuResource>,
    _rain_instances: GpuResource,
    _window_instances: Option<GpuResource>,
}

impl SurfaceResources {
    fn acquire(
        device: &mut dyn GraphicsDevice,
        viewport: Viewport,
        profile: &QualityProfile,
    ) -> Result<Self, SurfaceError> {
        let canvas = allocate_canvas(device, viewport, profile)?;
        let lighting = device.allocate(ResourceKind::Lighting, LIGHTING_BYTES)?;
        let environment = if profile.environment_reflections {
            Some(device.allocate(ResourceKind::EnvironmentMap, ENVIRONMENT_MAP_BYTES)?)
        } else {
            None
        };
        let rain_instances = device.allocate(
            ResourceKind::InstanceBuffer,
            instance_bytes(profile.rain_particle_count),
        )?;
        let window_instances = if profile.window_drop_count > 0 {
            Some(device.allocate(
                ResourceKind::InstanceBuffer,
                instance_bytes(profile.window_drop_count),
            )?)
        } else {
            None
        };
        Ok(Self {
            canvas,
            _lighting: lighting,
            _environment: environment,
            _rain_instances: rain_instances,
            _window_instances: window_instances,
        })
    }
}

/// The particle surface for rain-family modes. It holds every device resource and its frame
/// registration for as long as it lives; dropping it releases all of them.
#[derive(Debug)]
pub struct RenderSurface {
    viewport: Viewport,
    profile: QualityProfile,
    device_scale: f32,
    rain: RainField,
    window: WindowDropField,
    frame: FrameHandle,
    since_render: f32,
    frames_rendered: u64,
    sprites: Vec<Sprite>,
    resources: SurfaceResources,
}

impl RenderSurface {
    /// Acquires the canvas, lighting, optional environment map and instance buffers, then
    /// registers for frames at the profile's cadence. Partial allocations are released on error.
    pub fn mount(
        device: &mut dyn GraphicsDevice,
        scheduler: &FrameScheduler,
        viewport: Viewport,
        profile: QualityProfile,
        intensity: RainIntensity,
    ) -> Result<Self, SurfaceError> {
        if !profile.simulation_enabled() {
            return Err(SurfaceError::ContextUnavailable(format!(
                "quality {} renders without a particle surface",
                profile.tier
            )));
        }
        let resources = SurfaceResources::acquire(device, viewport, &profile)?;
        let bounds = SimBounds::for_aspect(viewport.aspect());
        let mut surface = Self {
            viewport,
            profile,
            device_scale: viewport.effective_scale(profile.device_scale_cap),
            rain: RainField::new(profile.rain_particle_count, bounds, intensity),
            window: WindowDropField::new(profile.window_drop_count, bounds),
            frame: scheduler.register(profile.cadence),
            since_render: 0.0,
            frames_rendered: 0,
            sprites: Vec::with_capacity(profile.rain_particle_count + profile.window_drop_count),
            resources,
        };
        surface.rebuild_sprites();
        log::debug!(
            "surface mounted on {}: {} rain, {} window drops, {:?}",
            device.label(),
            surface.rain.len(),
            surface.window.len(),
            profile.cadence
        );
        Ok(surface)
    }

    /// Advances the simulation when the frame registration fires. Returns whether it rendered.
    pub fn tick(&mut self, dt: f32) -> bool {
        self.since_render += dt.max(0.0);
        if self.frame.cadence() == FrameCadence::OnDemand && self.since_render >= ON_DEMAND_INTERVAL
        {
            self.frame.invalidate();
        }
        if !self.frame.take_frame() {
            return false;
        }
        let step = std::mem::take(&mut self.since_render);
        self.rain.step(step);
        self.window.step(step);
        self.rebuild_sprites();
        self.frames_rendered += 1;
        true
    }

    pub fn set_intensity(&mut self, intensity: RainIntensity) {
        if self.rain.intensity() != intensity {
            self.rain.set_intensity(intensity);
            self.frame.invalidate();
        }
    }

    /// Reallocates the canvas for a new viewport; particles are rescaled, never respawned.
    pub fn resize(
        &mut self,
        device: &mut dyn GraphicsDevice,
        viewport: Viewport,
    ) -> Result<(), SurfaceError> {
        if viewport == self.viewport {
            return Ok(());
        }
        self.resources.canvas = allocate_canvas(device, viewport, &self.profile)?;
        let bounds = SimBounds::for_aspect(viewport.aspect());
        self.rain.rescale(bounds);
        self.window.rescale(bounds);
        self.viewport = viewport;
        self.device_scale = viewport.effective_scale(self.profile.device_scale_cap);
        self.rebuild_sprites();
        self.frame.invalidate();
        Ok(())
    }

    /// Explicit teardown; equivalent to dropping the surface.
    pub fn unmount(self) {}

    pub fn rain(&self) -> &RainField {
        &self.rain
    }

    pub fn window(&self) -> &WindowDropField {
        &self.window
    }

    pub fn sprites(&self) -> &[Sprite] {
        &self.sprites
    }

    pub fn profile(&self) -> &QualityProfile {
        &self.profile
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn device_scale(&self) -> f32 {
        self.device_scale
    }

    /// Size of the backing canvas allocation.
    pub fn canvas_bytes(&self) -> usize {
        self.resources.canvas.bytes()
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }

    pub fn cadence(&self) -> FrameCadence {
        self.frame.cadence()
    }

    fn rebuild_sprites(&mut self) {
        let bounds = self.rain.bounds();
        self.sprites.clear();
        self.sprites
            .extend(self.rain.transforms().map(|transform| Sprite {
                kind: SpriteKind::RainStreak,
                depth: bounds.depth_fraction(transform.position.z),
                transform,
            }));
        self.sprites.extend(
            self.window
                .drops()
                .iter()
                .zip(self.window.transforms())
                .map(|(drop, transform)| Sprite {
                    kind: if drop.is_sliding() {
                        SpriteKind::WindowStreak
                    } else {
                        SpriteKind::WindowBead
                    },
                    depth: 0.0,
                    transform,
                }),
        );
    }
}

impl Drop for RenderSurface {
    fn drop(&mut self) {
        log::debug!(
            "surface released after {} frames",
            self.frames_rendered
        );
    }
}

fn allocate_canvas(
    device: &mut dyn GraphicsDevice,
    viewport: Viewport,
    profile: &QualityProfile,
) -> Result<GpuResource, SurfaceError> {
    let scale = viewport.effective_scale(profile.device_scale_cap);
    device.allocate(
        ResourceKind::Canvas,
        viewport.backing_cells(scale) * BYTES_PER_CELL,
    )
}

fn instance_bytes(count: usize) -> usize {
    count * size_of::<ParticleTransform>()
}
