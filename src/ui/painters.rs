#![allow(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss
)]

use glam::Vec3;

use crate::{
    domain::MaterialComplexity,
    render::{Sprite, SpriteKind},
    sim::{LoopingAnimation, SimBounds},
};

pub type Canvas = Vec<Vec<char>>;

pub fn blank_canvas(width: usize, height: usize) -> Canvas {
    vec![vec![' '; width]; height]
}

fn dims(canvas: &[Vec<char>]) -> (usize, usize) {
    (canvas.first().map_or(0, Vec::len), canvas.len())
}

pub fn paint_sun(canvas: &mut [Vec<char>], phase: LoopingAnimation) {
    let (w, h) = dims(canvas);
    if w < 12 || h < 6 {
        return;
    }
    let cx = w - w / 5;
    let cy = h / 5 + 1;
    let disc: [&[char]; 3] = [
        &[' ', '▄', '█', '█', '▄', ' '],
        &['█', '█', '█', '█', '█', '█'],
        &[' ', '▀', '█', '█', '▀', ' '],
    ];
    for (row_idx, row) in disc.iter().enumerate() {
        let y = (cy + row_idx).saturating_sub(1);
        for (col, ch) in row.iter().enumerate() {
            let x = (cx + col).saturating_sub(3);
            if *ch != ' '
                && let Some(cell) = canvas.get_mut(y).and_then(|r| r.get_mut(x))
            {
                *cell = *ch;
            }
        }
    }
    paint_sun_rays(canvas, cx, cy, phase.step(2));
}

fn paint_sun_rays(canvas: &mut [Vec<char>], cx: usize, cy: usize, pulse: usize) {
    let reach = 5 + pulse;
    let rays: [(isize, isize, char); 6] = [
        (-1, 0, '─'),
        (1, 0, '─'),
        (0, -1, '│'),
        (0, 1, '│'),
        (-1, -1, '╲'),
        (1, -1, '╱'),
    ];
    for (dx, dy, glyph) in rays {
        let x = cx as isize + dx * reach as isize;
        let y = cy as isize + dy * (reach as isize / 2).max(2);
        if x < 0 || y < 0 {
            continue;
        }
        if let Some(cell) = canvas
            .get_mut(y as usize)
            .and_then(|row| row.get_mut(x as usize))
            && *cell == ' '
        {
            *cell = glyph;
        }
    }
}

pub fn paint_clouds(canvas: &mut [Vec<char>], phase: LoopingAnimation) {
    let (w, h) = dims(canvas);
    if w < 10 || h < 4 {
        return;
    }
    let cloud_w = (w / 5).clamp(8, 28);
    let span = w + cloud_w;
    let drift = phase.step(span);
    let sky = (h / 2).max(4);
    for (idx, row) in [1, sky / 3 + 1, sky / 2 + 2].into_iter().enumerate() {
        let cx = (drift + idx * span / 3) % span;
        let rows = if idx == 1 { 2 } else { 3 };
        draw_cloud(canvas, cx, row, cloud_w, rows, w, h);
    }
}

struct CloudGeometry {
    cx: usize,
    cy: usize,
    width: usize,
    canvas_width: usize,
    floor: usize,
}

fn draw_cloud(
    canvas: &mut [Vec<char>],
    cx: usize,
    cy: usize,
    cloud_w: usize,
    rows: usize,
    canvas_w: usize,
    floor: usize,
) {
    let cloud = CloudGeometry {
        cx,
        cy,
        width: cloud_w,
        canvas_width: canvas_w,
        floor,
    };
    for (row_idx, pattern) in cloud_patterns(rows).iter().enumerate() {
        if !paint_cloud_row(canvas, pattern, row_idx, &cloud) {
            break;
        }
    }
}

fn cloud_patterns(rows: usize) -> &'static [&'static [char]] {
    if rows >= 3 {
        &[
            &[' ', '░', '░', '▒', '▒', '░', '░', ' '],
            &['░', '▒', '▓', '▓', '▓', '▓', '▒', '░'],
            &[' ', ' ', '░', '▒', '▒', '░', ' ', ' '],
        ]
    } else {
        &[
            &[' ', '░', '▒', '▒', '▒', '░', ' '],
            &['░', '▒', '▓', '▓', '▒', '░', ' '],
        ]
    }
}

fn paint_cloud_row(
    canvas: &mut [Vec<char>],
    pattern: &[char],
    row_idx: usize,
    cloud: &CloudGeometry,
) -> bool {
    let y = cloud.cy + row_idx;
    if y >= cloud.floor || y >= canvas.len() {
        return false;
    }
    let pat_len = pattern.len();
    for col in 0..cloud.width {
        let x = cloud.cx.wrapping_sub(cloud.width / 2).wrapping_add(col);
        if x >= cloud.canvas_width {
            continue;
        }
        let ch = pattern[((col * pat_len) / cloud.width.max(1)).min(pat_len - 1)];
        if ch != ' ' && canvas[y][x] == ' ' {
            canvas[y][x] = ch;
        }
    }
    true
}

pub fn paint_fog_banks(canvas: &mut [Vec<char>], phase: LoopingAnimation) {
    let (w, h) = dims(canvas);
    if w == 0 || h < 3 {
        return;
    }
    let drift_phase = phase.step(w);
    let density_chars = ['░', '░', '▒', '░'];
    let bands = (h / 3).max(2);
    for band in 0..bands {
        let y = h - 1 - band * 3 / 2;
        let drift = (drift_phase + band * 7) % w;
        let Some(row) = canvas.get_mut(y) else {
            continue;
        };
        for (x, cell) in row.iter_mut().enumerate() {
            let shifted = (x + drift) % w;
            let wave = ((shifted as f32 / w as f32) * std::f32::consts::PI * 3.0).sin();
            if wave > -0.2 && *cell == ' ' {
                let idx = ((wave + 1.0) / 2.0 * (density_chars.len() - 1) as f32).round() as usize;
                *cell = density_chars[idx.min(density_chars.len() - 1)];
            }
        }
    }
    let upper = h.saturating_sub(bands * 3 / 2);
    for (y, row) in canvas.iter_mut().enumerate().take(upper).skip(1) {
        for (x, cell) in row.iter_mut().enumerate() {
            if (x + y + drift_phase / 3).is_multiple_of(7) && *cell == ' ' {
                *cell = '·';
            }
        }
    }
}

pub fn paint_snowfall(canvas: &mut [Vec<char>], phase: LoopingAnimation) {
    let (w, h) = dims(canvas);
    if w == 0 || h < 3 {
        return;
    }
    let phase = phase.step(h * 2);
    let flakes = ['·', '*', '✧', '·', '·', '*'];
    for layer in 0..3 {
        let speed = layer + 1;
        let spacing = 3 + layer;
        for x in 0..w {
            if !(x + layer * 7).is_multiple_of(spacing) {
                continue;
            }
            let y = (phase * speed / 2 + x * 5 + layer * 11) % h;
            if canvas[y][x] == ' ' {
                canvas[y][x] = flakes[(x + layer + phase) % flakes.len()];
            }
        }
    }
}

/// Looping streaks used when no particle surface is mounted.
pub fn paint_flat_rain(canvas: &mut [Vec<char>], phase: LoopingAnimation, heavy: bool) {
    let (w, h) = dims(canvas);
    if w == 0 || h < 3 {
        return;
    }
    let phase = phase.step(h);
    let (density, drops, glyph) = if heavy { (2, 3, '╲') } else { (3, 2, '│') };
    for x in 0..w {
        if !(x + phase).is_multiple_of(density) {
            continue;
        }
        for d in 0..drops {
            let y = (phase + x * 3 + d * 4) % h;
            if canvas[y][x] == ' ' {
                canvas[y][x] = glyph;
            }
        }
    }
}

pub fn paint_lightning_bolt(canvas: &mut [Vec<char>], strikes: u64) {
    let (w, h) = dims(canvas);
    if w < 6 || h < 5 {
        return;
    }
    let mut x = (w / 5 + (strikes as usize * 37) % (w * 3 / 5)).min(w - 2);
    for (y, row) in canvas.iter_mut().enumerate().take(h * 2 / 3).skip(1) {
        row[x] = if y % 2 == 0 { '╲' } else { '╱' };
        if y % 2 == 0 && x + 1 < w {
            x += 1;
        } else {
            x = x.saturating_sub(1);
        }
    }
}

/// Orthographic projection of a simulation point onto canvas cells.
#[must_use]
pub fn project(position: Vec3, bounds: &SimBounds, width: usize, height: usize) -> Option<(usize, usize)> {
    if width == 0 || height == 0 || !bounds.contains_xy(position) {
        return None;
    }
    let u = (position.x + bounds.half_width) / bounds.width();
    let v = (bounds.top() - position.y) / (bounds.half_height * 2.0);
    let x = ((u * width as f32) as usize).min(width - 1);
    let y = ((v * height as f32) as usize).min(height - 1);
    Some((x, y))
}

#[must_use]
pub fn streak_glyph(tilt: f32) -> char {
    if tilt > 0.12 {
        '╲'
    } else if tilt < -0.12 {
        '╱'
    } else {
        '│'
    }
}

/// Far rain thins to dots unless the material can afford refraction.
fn sprite_glyph(sprite: &Sprite, material: MaterialComplexity) -> char {
    match sprite.kind {
        SpriteKind::RainStreak => {
            if sprite.depth > 0.75 && material < MaterialComplexity::Refractive {
                '·'
            } else if sprite.depth > 0.45 && material == MaterialComplexity::Flat {
                '¦'
            } else {
                streak_glyph(sprite.transform.tilt)
            }
        }
        SpriteKind::WindowBead => match material {
            MaterialComplexity::Flat => '.',
            MaterialComplexity::Lit => '∘',
            MaterialComplexity::Refractive => '◌',
        },
        SpriteKind::WindowStreak => '┆',
    }
}

/// Rain first, then the glass drops on top of it.
pub fn paint_sprites(
    canvas: &mut [Vec<char>],
    sprites: &[Sprite],
    bounds: &SimBounds,
    material: MaterialComplexity,
) {
    let (w, h) = dims(canvas);
    for sprite in sprites {
        let Some((x, y)) = project(sprite.transform.position, bounds, w, h) else {
            continue;
        };
        let glyph = sprite_glyph(sprite, material);
        canvas[y][x] = glyph;
        if sprite.kind == SpriteKind::WindowStreak && sprite.transform.scale.y > 1.5 && y > 0 {
            canvas[y - 1][x] = '╎';
        }
    }
}
