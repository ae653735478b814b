#![allow(
    clippy::cast_lossless,
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss
)]

use ratatui::{buffer::Buffer, layout::Rect, style::Color, widgets::Widget};

use super::painters::{
    Canvas, blank_canvas, paint_clouds, paint_flat_rain, paint_fog_banks, paint_lightning_bolt,
    paint_snowfall, paint_sprites, paint_sun,
};
use crate::{
    compositor::{EffectFrame, LayerKind, VignetteTone},
    domain::{RainIntensity, profile_for},
};

type Rgb = (f32, f32, f32);

const BAYER_4X4: [[u8; 4]; 4] = [[0, 8, 2, 10], [12, 4, 14, 6], [3, 11, 1, 9], [15, 7, 13, 5]];
const FLASH_RGB: Rgb = (235.0, 240.0, 255.0);
/// Flash strength above which the bolt itself is drawn.
const BOLT_THRESHOLD: f32 = 0.3;

/// Paints one effect frame as the full-screen backdrop.
pub struct EffectOverlay<'a> {
    pub frame: &'a EffectFrame<'a>,
}

impl<'a> EffectOverlay<'a> {
    pub fn new(frame: &'a EffectFrame<'a>) -> Self {
        Self { frame }
    }
}

impl Widget for EffectOverlay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.is_empty() {
            return;
        }
        let frame = self.frame;
        let layers = frame.layers;
        let flash = frame.flash * layers.opacity(LayerKind::Lightning);
        paint_backdrop(
            area,
            buf,
            layers.tone(),
            layers.opacity(LayerKind::Vignette),
            flash,
        );

        let (w, h) = (area.width as usize, area.height as usize);
        for layer in layers.iter() {
            if !layer.is_visible() || layer.kind == LayerKind::Vignette {
                continue;
            }
            let mut canvas = blank_canvas(w, h);
            if !paint_layer(layer.kind, frame, &mut canvas) {
                continue;
            }
            composite(area, buf, &canvas, layer.opacity, layer_color(layer.kind));
        }
    }
}

/// Draws `kind` into `canvas`; false when the layer has nothing to show this frame.
fn paint_layer(kind: LayerKind, frame: &EffectFrame<'_>, canvas: &mut Canvas) -> bool {
    let phases = frame.phases;
    match kind {
        LayerKind::Vignette => return false,
        LayerKind::Sun => paint_sun(canvas, phases.sun),
        LayerKind::Cloud => paint_clouds(canvas, phases.cloud),
        LayerKind::Fog => paint_fog_banks(canvas, phases.fog),
        LayerKind::Snow => paint_snowfall(canvas, phases.snow),
        LayerKind::Rain => {
            let heavy = frame.mode.rain_intensity() == Some(RainIntensity::Heavy);
            paint_flat_rain(canvas, phases.rain, heavy);
        }
        LayerKind::Particles => {
            let Some(bounds) = frame.bounds else {
                return false;
            };
            let material = profile_for(frame.tier).material;
            paint_sprites(canvas, frame.sprites, &bounds, material);
        }
        LayerKind::Lightning => {
            if frame.flash < BOLT_THRESHOLD {
                return false;
            }
            paint_lightning_bolt(canvas, frame.strikes);
        }
    }
    true
}

fn layer_color(kind: LayerKind) -> Color {
    match kind {
        LayerKind::Vignette => Color::Rgb(0, 0, 0),
        LayerKind::Sun => Color::Rgb(255, 214, 120),
        LayerKind::Cloud => Color::Rgb(200, 205, 215),
        LayerKind::Fog => Color::Rgb(170, 176, 186),
        LayerKind::Snow => Color::Rgb(240, 244, 255),
        LayerKind::Rain => Color::Rgb(120, 160, 210),
        LayerKind::Particles => Color::Rgb(150, 190, 235),
        LayerKind::Lightning => Color::Rgb(255, 255, 220),
    }
}

fn tone_gradient(tone: VignetteTone) -> (Rgb, Rgb) {
    match tone {
        VignetteTone::Warm => ((38.0, 46.0, 84.0), (92.0, 70.0, 60.0)),
        VignetteTone::Overcast => ((52.0, 58.0, 68.0), (78.0, 82.0, 90.0)),
        VignetteTone::Neutral => ((20.0, 28.0, 40.0), (44.0, 52.0, 64.0)),
    }
}

/// Gradient by tone, darkened toward the edges by the vignette and lifted by any flash.
fn paint_backdrop(area: Rect, buf: &mut Buffer, tone: VignetteTone, vignette: f32, flash: f32) {
    let (top, bottom) = tone_gradient(tone);
    for y in area.top()..area.bottom() {
        let row_color = lerp(top, bottom, ratio(y - area.top(), area.height));
        for x in area.left()..area.right() {
            let edge = edge_distance(area, x, y);
            let darken = 1.0 - 0.45 * vignette * edge * edge;
            let base = scale(row_color, darken);
            let color = to_color(lerp(base, FLASH_RGB, flash.clamp(0.0, 1.0)));
            if let Some(cell) = buf.cell_mut((x, y)) {
                cell.set_char(' ').set_bg(color);
            }
        }
    }
}

/// Shows a canvas cell only where the ordered-dither threshold falls under `opacity`.
fn composite(area: Rect, buf: &mut Buffer, canvas: &Canvas, opacity: f32, color: Color) {
    for (dy, row) in canvas.iter().enumerate() {
        for (dx, ch) in row.iter().enumerate() {
            if *ch == ' ' || !dither_visible(dx, dy, opacity) {
                continue;
            }
            let pos = (area.x + dx as u16, area.y + dy as u16);
            if let Some(cell) = buf.cell_mut(pos) {
                cell.set_char(*ch).set_fg(color);
            }
        }
    }
}

#[must_use]
pub fn dither_visible(x: usize, y: usize, opacity: f32) -> bool {
    let threshold = (f32::from(BAYER_4X4[y % 4][x % 4]) + 0.5) / 16.0;
    threshold < opacity
}

fn ratio(offset: u16, span: u16) -> f32 {
    if span <= 1 {
        0.0
    } else {
        offset as f32 / (span - 1) as f32
    }
}

/// 0.0 in the centre, 1.0 at the corners.
fn edge_distance(area: Rect, x: u16, y: u16) -> f32 {
    let nx = ratio(x - area.left(), area.width) * 2.0 - 1.0;
    let ny = ratio(y - area.top(), area.height) * 2.0 - 1.0;
    ((nx * nx + ny * ny) / 2.0).sqrt().min(1.0)
}

fn lerp(a: Rgb, b: Rgb, t: f32) -> Rgb {
    (
        a.0 + (b.0 - a.0) * t,
        a.1 + (b.1 - a.1) * t,
        a.2 + (b.2 - a.2) * t,
    )
}

fn scale(c: Rgb, factor: f32) -> Rgb {
    (c.0 * factor, c.1 * factor, c.2 * factor)
}

fn to_color(c: Rgb) -> Color {
    Color::Rgb(
        c.0.clamp(0.0, 255.0) as u8,
        c.1.clamp(0.0, 255.0) as u8,
        c.2.clamp(0.0, 255.0) as u8,
    )
}
