use std::{path::PathBuf, time::Instant};

use anyhow::Result;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tokio::sync::mpsc;

use crate::{
    app::{
        events::{AppEvent, start_frame_task, start_refresh_task},
        settings::{EffectSettings, load_settings, save_settings},
    },
    cli::{Cli, DEMO_CODES},
    compositor::EffectCompositor,
    diagnostics::{DiagnosticsLog, Severity},
    domain::EffectInputs,
    render::{GraphicsDevice, TerminalDevice, UnavailableDevice, Viewport},
};

#[derive(Debug)]
pub struct AppState {
    pub running: bool,
    pub compositor: EffectCompositor,
    pub diagnostics: DiagnosticsLog,
    pub settings: EffectSettings,
    pub weather_code: Option<i64>,
    pub demo: bool,
    pub last_frame_at: Instant,
    pub frame_tick: u64,
    settings_path: Option<PathBuf>,
    script_index: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyCommand {
    Quit,
    ToggleEffects,
    NextCode,
    PreviousCode,
    RaiseQuality,
    LowerQuality,
    Refresh,
}

impl AppState {
    pub fn new(cli: &Cli, viewport: Viewport) -> Self {
        let (settings, settings_path) = load_settings(cli, !cli.no_persist);
        let diagnostics = DiagnosticsLog::new();
        let device: Box<dyn GraphicsDevice> = if cli.simulate_gpu_failure {
            Box::new(UnavailableDevice::new("simulated graphics failure"))
        } else {
            Box::new(TerminalDevice::new())
        };
        let compositor = EffectCompositor::new(device, Box::new(diagnostics.clone()), viewport);

        Self {
            running: true,
            compositor,
            diagnostics,
            settings,
            weather_code: cli.initial_inputs().weather_code,
            demo: cli.demo,
            last_frame_at: Instant::now(),
            frame_tick: 0,
            settings_path,
            script_index: 0,
        }
    }

    pub fn inputs(&self) -> EffectInputs {
        EffectInputs::new(
            self.weather_code,
            self.settings.enabled,
            self.settings.quality,
        )
    }

    pub async fn handle_event(
        &mut self,
        event: AppEvent,
        tx: &mpsc::Sender<AppEvent>,
        cli: &Cli,
    ) -> Result<()> {
        match event {
            AppEvent::Bootstrap => {
                cli.validate()?;
                start_frame_task(tx.clone(), self.settings.fps);
                if self.demo {
                    start_refresh_task(tx.clone(), cli.refresh_interval);
                }
                self.apply_inputs();
            }
            AppEvent::TickFrame => {
                let now = Instant::now();
                let delta = now.duration_since(self.last_frame_at);
                self.last_frame_at = now;
                self.frame_tick = self.frame_tick.saturating_add(1);
                self.compositor.tick(delta);
            }
            AppEvent::TickRefresh => {
                if self.demo {
                    self.step_script(1);
                }
                self.apply_inputs();
            }
            AppEvent::Input(event) => self.handle_input(event, tx).await?,
            AppEvent::Quit => {
                self.running = false;
                self.compositor.shutdown();
            }
        }

        Ok(())
    }

    async fn handle_input(&mut self, event: Event, tx: &mpsc::Sender<AppEvent>) -> Result<()> {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                let Some(command) = key_command(key) else {
                    return Ok(());
                };
                match command {
                    KeyCommand::Quit => tx.send(AppEvent::Quit).await?,
                    KeyCommand::ToggleEffects => {
                        self.settings.enabled = !self.settings.enabled;
                        self.persist_settings();
                        self.apply_inputs();
                    }
                    KeyCommand::NextCode => {
                        self.step_script(1);
                        self.apply_inputs();
                    }
                    KeyCommand::PreviousCode => {
                        self.step_script(-1);
                        self.apply_inputs();
                    }
                    KeyCommand::RaiseQuality => {
                        self.set_quality(self.inputs().tier().raised().get());
                    }
                    KeyCommand::LowerQuality => {
                        self.set_quality(self.inputs().tier().lowered().get());
                    }
                    KeyCommand::Refresh => self.apply_inputs(),
                }
            }
            Event::Resize(cols, rows) => {
                self.compositor.resize(terminal_viewport(cols, rows));
            }
            _ => {}
        }
        Ok(())
    }

    fn apply_inputs(&mut self) {
        self.compositor.update(self.inputs());
    }

    fn set_quality(&mut self, tier: u8) {
        if self.settings.quality == Some(i64::from(tier)) {
            return;
        }
        self.settings.quality = Some(i64::from(tier));
        self.persist_settings();
        self.apply_inputs();
    }

    fn step_script(&mut self, direction: isize) {
        let len = DEMO_CODES.len() as isize;
        let current = self
            .weather_code
            .and_then(|code| DEMO_CODES.iter().position(|candidate| *candidate == code))
            .map_or(self.script_index as isize, |idx| idx as isize);
        self.script_index = (current + direction).rem_euclid(len) as usize;
        self.weather_code = Some(DEMO_CODES[self.script_index]);
    }

    fn persist_settings(&self) {
        let Some(path) = &self.settings_path else {
            return;
        };
        if let Err(err) = save_settings(path, self.settings) {
            self.diagnostics
                .push(format!("settings: {err:#}"), Severity::Error);
        }
    }
}

/// Viewport for the live terminal, scaled when it reports its pixel size.
pub fn terminal_viewport(cols: u16, rows: u16) -> Viewport {
    let viewport = Viewport::new(cols, rows);
    match crossterm::terminal::window_size() {
        Ok(size) => viewport.with_pixel_size(size.width, size.height),
        Err(_) => viewport,
    }
}

fn key_command(key: KeyEvent) -> Option<KeyCommand> {
    if matches!(key.code, KeyCode::Char('c' | 'C'))
        && key.modifiers.contains(KeyModifiers::CONTROL)
    {
        return Some(KeyCommand::Quit);
    }
    if key
        .modifiers
        .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT | KeyModifiers::SUPER)
    {
        return None;
    }
    match key.code {
        KeyCode::Esc => Some(KeyCommand::Quit),
        KeyCode::Right => Some(KeyCommand::NextCode),
        KeyCode::Left => Some(KeyCommand::PreviousCode),
        KeyCode::Char(ch) => match ch.to_ascii_lowercase() {
            'q' => Some(KeyCommand::Quit),
            'e' => Some(KeyCommand::ToggleEffects),
            'n' => Some(KeyCommand::NextCode),
            'p' => Some(KeyCommand::PreviousCode),
            '+' | '=' => Some(KeyCommand::RaiseQuality),
            '-' | '_' => Some(KeyCommand::LowerQuality),
            'r' => Some(KeyCommand::Refresh),
            _ => None,
        },
        _ => None,
    }
}
