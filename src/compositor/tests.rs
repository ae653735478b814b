use std::time::Duration;

use super::*;
use crate::{
    render::{ResourceKind, UnavailableDevice},
    test_support::{FailAfterDevice, compositor_with, terminal_compositor},
};

const FRAME: Duration = Duration::from_millis(16);

fn inputs(code: i64, quality: i64) -> EffectInputs {
    EffectInputs::new(Some(code), true, Some(quality))
}

fn settle(compositor: &mut EffectCompositor) {
    let frames = (FADE_SECS / FRAME.as_secs_f32()).ceil() as usize + 2;
    for _ in 0..frames {
        compositor.tick(FRAME);
    }
}

#[test]
fn thunder_at_top_quality_mounts_surface_with_wind() {
    let (mut compositor, log, tracker) = terminal_compositor();
    compositor.update(inputs(95, 5));

    assert_eq!(compositor.mode(), EffectMode::Thunder);
    assert_eq!(compositor.surface_status(), SurfaceStatus::Mounted);
    let surface = compositor.surface().expect("surface");
    assert_eq!(surface.rain().len(), 100);
    assert!(surface.rain().wind_speed() > 0.0);
    assert!(surface.rain().transforms().all(|t| t.tilt > 0.0));
    assert!(compositor.lightning().is_eligible());
    assert_eq!(tracker.live_of(ResourceKind::EnvironmentMap), 1);
    assert_eq!(log.messages(), vec!["effect=thunder".to_string()]);
}

#[test]
fn clear_at_lowest_quality_is_flat_with_sun() {
    let (mut compositor, log, tracker) = terminal_compositor();
    compositor.update(inputs(0, 1));

    assert_eq!(compositor.mode(), EffectMode::Clear);
    assert_eq!(compositor.surface_status(), SurfaceStatus::Flat);
    assert_eq!(compositor.layers().opacity(LayerKind::Sun), 1.0);
    assert_eq!(tracker.live(), 0);
    assert!(log.is_empty());
}

#[test]
fn disabled_effects_force_clear_without_allocations() {
    for code in [0, 3, 45, 61, 71, 95, 1234] {
        let (mut compositor, _log, tracker) = terminal_compositor();
        compositor.update(EffectInputs::new(Some(code), false, Some(5)));
        assert_eq!(compositor.mode(), EffectMode::Clear);
        assert!(compositor.surface().is_none());
        assert_eq!(tracker.live(), 0);
        assert_eq!(compositor.scheduler().active(), 0);
    }
}

#[test]
fn missing_weather_code_is_clear() {
    let (mut compositor, _log, _tracker) = terminal_compositor();
    compositor.update(EffectInputs::new(None, true, Some(4)));
    assert_eq!(compositor.mode(), EffectMode::Clear);
}

#[test]
fn leaving_rain_releases_every_resource_and_remount_is_fresh() {
    let (mut compositor, _log, tracker) = terminal_compositor();
    compositor.update(inputs(61, 4));
    settle(&mut compositor);
    assert!(tracker.live() > 0);
    assert_eq!(compositor.scheduler().active(), 1);

    compositor.update(inputs(0, 4));
    assert!(compositor.surface().is_none());
    assert_eq!(tracker.live(), 0);
    assert_eq!(compositor.scheduler().active(), 0);

    compositor.update(inputs(63, 4));
    let surface = compositor.surface().expect("remounted");
    assert_eq!(surface.frames_rendered(), 0);
    assert_eq!(surface.rain().elapsed(), 0.0);
    assert_eq!(surface.window().sliding_count(), 0);
    assert_eq!(surface.rain().len(), 75);
    assert_eq!(compositor.scheduler().active(), 1);
}

#[test]
fn non_rain_modes_never_hold_a_surface() {
    for code in [0, 3, 45, 71] {
        let (mut compositor, _log, tracker) = terminal_compositor();
        compositor.update(inputs(code, 5));
        settle(&mut compositor);
        assert!(compositor.surface().is_none(), "code {code}");
        assert_eq!(tracker.live(), 0);
    }
}

#[test]
fn rain_at_tier_one_uses_flat_rain_layer() {
    let (mut compositor, _log, tracker) = terminal_compositor();
    compositor.update(inputs(61, 1));
    settle(&mut compositor);
    assert_eq!(compositor.surface_status(), SurfaceStatus::Flat);
    assert_eq!(compositor.layers().opacity(LayerKind::Rain), 1.0);
    assert_eq!(compositor.layers().opacity(LayerKind::Particles), 0.0);
    assert_eq!(tracker.total_allocations(), 0);
}

#[test]
fn one_log_entry_per_mode_change() {
    let (mut compositor, log, _tracker) = terminal_compositor();
    compositor.update(inputs(61, 3));
    compositor.update(inputs(63, 3));
    compositor.update(inputs(65, 2));
    compositor.update(inputs(71, 2));
    compositor.update(inputs(7, 2));
    compositor.update(inputs(3, 2));
    assert_eq!(
        log.messages(),
        vec![
            "effect=rain".to_string(),
            "effect=snow".to_string(),
            "effect=cloudy".to_string(),
        ]
    );
}

#[test]
fn mode_change_crossfades_layers() {
    let (mut compositor, _log, _tracker) = terminal_compositor();
    compositor.update(inputs(45, 3));
    compositor.tick(Duration::from_secs_f32(FADE_SECS / 2.0));
    let layers = compositor.layers();
    assert!(layers.opacity(LayerKind::Sun) > 0.0);
    assert!(layers.opacity(LayerKind::Fog) > 0.0);
    assert!(!layers.is_settled());
    settle(&mut compositor);
    assert_eq!(compositor.layers().opacity(LayerKind::Sun), 0.0);
    assert_eq!(compositor.layers().opacity(LayerKind::Fog), 1.0);
}

#[test]
fn released_particles_fade_out_through_flat_rain() {
    let (mut compositor, _log, _tracker) = terminal_compositor();
    compositor.update(inputs(61, 3));
    settle(&mut compositor);
    assert_eq!(compositor.layers().opacity(LayerKind::Particles), 1.0);

    compositor.update(inputs(0, 3));
    assert_eq!(compositor.layers().opacity(LayerKind::Rain), 1.0);
    compositor.tick(FRAME);
    let rain = compositor.layers().opacity(LayerKind::Rain);
    assert!(rain > 0.0 && rain < 1.0);
}

#[test]
fn graphics_failure_falls_back_to_flat_layers_and_warns_once() {
    let (mut compositor, log, _tracker) =
        compositor_with(Box::new(UnavailableDevice::new("no adapter")));
    compositor.update(inputs(61, 5));
    assert_eq!(compositor.mode(), EffectMode::Rain);
    assert_eq!(compositor.surface_status(), SurfaceStatus::Degraded);
    settle(&mut compositor);
    assert_eq!(compositor.layers().opacity(LayerKind::Rain), 1.0);

    compositor.update(inputs(0, 5));
    compositor.update(inputs(95, 5));
    assert!(compositor.surface().is_none());
    let warnings = log
        .recent(usize::MAX)
        .into_iter()
        .filter(|entry| entry.severity == crate::diagnostics::Severity::Warn)
        .count();
    assert_eq!(warnings, 1);
    assert_eq!(
        log.messages()
            .iter()
            .filter(|m| m.starts_with("effect="))
            .count(),
        3
    );
}

#[test]
fn partial_allocation_failure_leaves_nothing_behind() {
    let (mut compositor, _log, tracker) = compositor_with(Box::new(FailAfterDevice::new(2)));
    compositor.update(inputs(95, 4));
    assert!(compositor.is_degraded());
    assert_eq!(tracker.live(), 0);
    assert_eq!(compositor.scheduler().active(), 0);
}

#[test]
fn quality_change_remounts_with_new_counts() {
    let (mut compositor, log, tracker) = terminal_compositor();
    compositor.update(inputs(61, 2));
    assert_eq!(compositor.surface().expect("tier 2").rain().len(), 30);
    compositor.update(inputs(61, 5));
    assert_eq!(compositor.surface().expect("tier 5").rain().len(), 100);
    assert_eq!(tracker.live_of(ResourceKind::Canvas), 1);
    compositor.update(inputs(61, 1));
    assert!(compositor.surface().is_none());
    assert_eq!(tracker.live(), 0);
    assert_eq!(log.len(), 1);
}

#[test]
fn rain_to_thunder_keeps_surface_and_adds_wind() {
    let (mut compositor, _log, tracker) = terminal_compositor();
    compositor.update(inputs(61, 3));
    settle(&mut compositor);
    let allocations = tracker.total_allocations();
    compositor.update(inputs(95, 3));
    let surface = compositor.surface().expect("still mounted");
    assert!(surface.frames_rendered() > 0);
    assert!(surface.rain().wind_speed() > 0.0);
    assert_eq!(tracker.total_allocations(), allocations);
}

#[test]
fn out_of_range_quality_is_clamped() {
    let (mut compositor, _log, _tracker) = terminal_compositor();
    compositor.update(inputs(61, 42));
    assert_eq!(compositor.profile().tier.get(), 5);
    compositor.update(inputs(61, -3));
    assert_eq!(compositor.profile().tier.get(), 1);
    assert!(compositor.surface().is_none());
    compositor.update(EffectInputs::new(Some(61), true, None));
    assert_eq!(compositor.profile().tier.get(), 3);
}

#[test]
fn frame_snapshot_exposes_sprites_only_when_mounted() {
    let (mut compositor, _log, _tracker) = terminal_compositor();
    compositor.update(inputs(61, 3));
    compositor.tick(FRAME);
    let frame = compositor.frame();
    assert_eq!(frame.sprites.len(), 50 + 12);
    assert!(frame.bounds.is_some());
    assert_eq!(frame.surface, SurfaceStatus::Mounted);

    compositor.update(inputs(71, 3));
    let frame = compositor.frame();
    assert!(frame.sprites.is_empty());
    assert!(frame.bounds.is_none());
}

#[test]
fn shutdown_and_drop_release_resources() {
    let (mut compositor, _log, tracker) = terminal_compositor();
    compositor.update(inputs(95, 5));
    compositor.shutdown();
    assert_eq!(tracker.live(), 0);

    let (mut compositor, _log, tracker) = terminal_compositor();
    compositor.update(inputs(95, 5));
    assert!(tracker.live() > 0);
    drop(compositor);
    assert_eq!(tracker.live(), 0);
}

#[test]
fn resize_keeps_particles() {
    let (mut compositor, _log, tracker) = terminal_compositor();
    compositor.update(inputs(61, 4));
    compositor.resize(Viewport::new(60, 20));
    let surface = compositor.surface().expect("mounted");
    assert_eq!(surface.viewport(), Viewport::new(60, 20));
    assert_eq!(surface.rain().len(), 75);
    assert_eq!(tracker.live_of(ResourceKind::Canvas), 1);
}
