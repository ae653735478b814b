use crate::{
    cli::Cli,
    compositor::EffectCompositor,
    diagnostics::DiagnosticsLog,
    render::{
        GpuResource, GraphicsDevice, ResourceKind, ResourceTracker, SurfaceError, TerminalDevice,
        Viewport,
    },
};

/// Hands out `budget` allocations, then reports exhaustion.
#[derive(Debug)]
pub(crate) struct FailAfterDevice {
    budget: usize,
    tracker: ResourceTracker,
}

impl FailAfterDevice {
    pub(crate) fn new(budget: usize) -> Self {
        Self {
            budget,
            tracker: ResourceTracker::new(),
        }
    }
}

impl GraphicsDevice for FailAfterDevice {
    fn label(&self) -> &str {
        "fail-after"
    }

    fn tracker(&self) -> &ResourceTracker {
        &self.tracker
    }

    fn allocate(&mut self, kind: ResourceKind, bytes: usize) -> Result<GpuResource, SurfaceError> {
        if self.budget == 0 {
            return Err(SurfaceError::ResourceExhausted { kind, bytes });
        }
        self.budget -= 1;
        Ok(self.tracker.register(kind, bytes))
    }
}

pub(crate) fn compositor_with(
    device: Box<dyn GraphicsDevice>,
) -> (EffectCompositor, DiagnosticsLog, ResourceTracker) {
    let log = DiagnosticsLog::new();
    let tracker = device.tracker().clone();
    let compositor = EffectCompositor::new(device, Box::new(log.clone()), Viewport::new(120, 40));
    (compositor, log, tracker)
}

pub(crate) fn terminal_compositor() -> (EffectCompositor, DiagnosticsLog, ResourceTracker) {
    compositor_with(Box::new(TerminalDevice::new()))
}

pub(crate) fn state_test_cli() -> Cli {
    Cli {
        weather_code: Some(61),
        quality: Some(3),
        no_effects: false,
        fps: Some(30),
        demo: false,
        refresh_interval: 20,
        simulate_gpu_failure: false,
        log_file: None,
        no_persist: true,
    }
}
