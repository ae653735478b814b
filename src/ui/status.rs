use chrono::Local;
use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::{app::state::AppState, compositor::SurfaceStatus, diagnostics::Severity};

/// Diagnostics lines shown above the status bar.
pub const DIAGNOSTIC_LINES: usize = 3;

pub fn render_clock(frame: &mut Frame, area: Rect) {
    let now = Local::now();
    let clock = Paragraph::new(vec![
        Line::from(now.format("%H:%M").to_string())
            .style(Style::default().fg(Color::White).add_modifier(Modifier::BOLD)),
        Line::from(now.format("%A %-d %B").to_string()).style(Style::default().fg(Color::Gray)),
    ])
    .alignment(Alignment::Center);
    let height = 2.min(area.height);
    let clock_area = Rect {
        y: area.y + area.height.saturating_sub(height) / 3,
        height,
        ..area
    };
    frame.render_widget(clock, clock_area);
}

#[must_use]
pub fn status_line(state: &AppState) -> Line<'static> {
    let compositor = &state.compositor;
    let inputs = compositor.inputs();
    let code = inputs
        .weather_code
        .map_or_else(|| "--".to_string(), |code| code.to_string());
    let (surface, surface_color) = match compositor.surface_status() {
        SurfaceStatus::Mounted => {
            let count = compositor
                .surface()
                .map_or(0, |surface| surface.rain().len() + surface.window().len());
            (format!("particles {count}"), Color::LightCyan)
        }
        SurfaceStatus::Flat => ("flat".to_string(), Color::Gray),
        SurfaceStatus::Degraded => ("degraded".to_string(), Color::Yellow),
    };
    let effects = if inputs.enabled { "" } else { " (effects off)" };

    Line::from(vec![
        Span::styled(
            format!(" {}{effects} ", compositor.mode()),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!("code {code} · {} · ", compositor.profile().tier)),
        Span::styled(surface, Style::default().fg(surface_color)),
        Span::raw(format!(" · {} fps", state.settings.fps)),
        Span::styled(
            "   e effects  n/p weather  +/- quality  q quit",
            Style::default().fg(Color::DarkGray),
        ),
    ])
}

pub fn render_status(frame: &mut Frame, area: Rect, state: &AppState) {
    if area.height == 0 {
        return;
    }
    let bar = Rect {
        y: area.bottom() - 1,
        height: 1,
        ..area
    };
    frame.render_widget(Paragraph::new(status_line(state)), bar);

    let entries = state.diagnostics.recent(DIAGNOSTIC_LINES);
    let rows = (entries.len() as u16).min(area.height.saturating_sub(1));
    if rows == 0 {
        return;
    }
    let lines: Vec<Line> = entries
        .iter()
        .skip(entries.len() - usize::from(rows))
        .map(|entry| {
            let color = match entry.severity {
                Severity::Info => Color::Gray,
                Severity::Warn => Color::Yellow,
                Severity::Error => Color::LightRed,
            };
            Line::from(vec![
                Span::styled(
                    entry.at.format("%H:%M:%S ").to_string(),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::styled(
                    format!("{:<5} ", entry.severity.label()),
                    Style::default().fg(color),
                ),
                Span::raw(entry.message.clone()),
            ])
        })
        .collect();
    let log_area = Rect {
        y: bar.y - rows,
        height: rows,
        ..area
    };
    frame.render_widget(Paragraph::new(lines), log_area);
}
