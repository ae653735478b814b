pub mod device;
pub mod scheduler;
pub mod surface;

pub use device::{
    GpuResource, GraphicsDevice, ResourceKind, ResourceTracker, SurfaceError, TerminalDevice,
    UnavailableDevice,
};
pub use scheduler::{FrameHandle, FrameScheduler, ON_DEMAND_INTERVAL};
pub use surface::{RenderSurface, Sprite, SpriteKind};

/// Terminal cells are roughly twice as tall as they are wide.
const CELL_ASPECT: f32 = 2.0;
/// Cell height in pixels that counts as scale 1.
const BASE_CELL_PX: f32 = 16.0;

/// Output area the overlay is drawn into.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub cols: u16,
    pub rows: u16,
    pub device_scale: f32,
}

impl Viewport {
    #[must_use]
    pub fn new(cols: u16, rows: u16) -> Self {
        Self {
            cols,
            rows,
            device_scale: 1.0,
        }
    }

    #[must_use]
    pub fn with_device_scale(mut self, scale: f32) -> Self {
        self.device_scale = scale;
        self
    }

    /// Scale from the terminal's reported pixel size; zero means unknown and keeps 1.0.
    #[must_use]
    pub fn with_pixel_size(self, width_px: u16, height_px: u16) -> Self {
        if width_px == 0 || height_px == 0 || self.rows == 0 {
            return self;
        }
        let cell_height = f32::from(height_px) / f32::from(self.rows);
        self.with_device_scale((cell_height / BASE_CELL_PX).max(1.0))
    }

    pub fn aspect(&self) -> f32 {
        if self.rows == 0 {
            return 1.0;
        }
        f32::from(self.cols) / (f32::from(self.rows) * CELL_ASPECT)
    }

    /// Device scale limited by a quality ceiling.
    #[must_use]
    pub fn effective_scale(&self, cap: f32) -> f32 {
        self.device_scale.clamp(1.0, cap.max(1.0))
    }

    /// Cells in the backing canvas at the given scale.
    pub fn backing_cells(&self, scale: f32) -> usize {
        let w = (f32::from(self.cols) * scale).ceil() as usize;
        let h = (f32::from(self.rows) * scale).ceil() as usize;
        w * h
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(80, 24)
    }
}
