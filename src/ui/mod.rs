pub mod overlay;
pub mod painters;
pub mod status;

use ratatui::{Frame, layout::Rect};

use crate::app::state::AppState;
use overlay::EffectOverlay;

pub fn render(frame: &mut Frame, state: &AppState) {
    let area = frame.area();
    let effect_frame = state.compositor.frame();
    frame.render_widget(EffectOverlay::new(&effect_frame), area);

    if area.height >= 6 {
        let top = Rect {
            height: area.height - 2,
            ..area
        };
        status::render_clock(frame, top);
    }
    status::render_status(frame, area, state);
}
