#![allow(dead_code)]

use std::time::Duration;

use ambient_fx::{
    cli::Cli,
    compositor::{EffectCompositor, FADE_SECS},
    diagnostics::DiagnosticsLog,
    domain::EffectInputs,
    render::{GraphicsDevice, ResourceTracker, TerminalDevice, Viewport},
};

pub const FRAME: Duration = Duration::from_millis(16);

pub fn fixture_cli(weather_code: Option<i64>, quality: Option<i64>) -> Cli {
    Cli {
        weather_code,
        quality,
        no_effects: false,
        fps: Some(30),
        demo: false,
        refresh_interval: 20,
        simulate_gpu_failure: false,
        log_file: None,
        no_persist: true,
    }
}

pub fn inputs(code: i64, quality: i64) -> EffectInputs {
    EffectInputs::new(Some(code), true, Some(quality))
}

pub fn compositor_on(
    device: Box<dyn GraphicsDevice>,
) -> (EffectCompositor, DiagnosticsLog, ResourceTracker) {
    let log = DiagnosticsLog::new();
    let tracker = device.tracker().clone();
    let compositor = EffectCompositor::new(device, Box::new(log.clone()), Viewport::new(120, 40));
    (compositor, log, tracker)
}

pub fn compositor() -> (EffectCompositor, DiagnosticsLog, ResourceTracker) {
    compositor_on(Box::new(TerminalDevice::new()))
}

/// Ticks past a full crossfade.
pub fn settle(compositor: &mut EffectCompositor) {
    let frames = (FADE_SECS / FRAME.as_secs_f32()).ceil() as usize + 2;
    for _ in 0..frames {
        compositor.tick(FRAME);
    }
}
