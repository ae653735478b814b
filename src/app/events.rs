use std::time::Duration;

use crossterm::event::{Event, EventStream};
use futures::StreamExt;
use rand::Rng;
use tokio::time::{MissedTickBehavior, interval, sleep};

#[derive(Debug)]
pub enum AppEvent {
    Bootstrap,
    TickFrame,
    /// A new weather reading is due (demo mode advances its script).
    TickRefresh,
    Input(Event),
    Quit,
}

pub fn spawn_input_task() -> impl futures::Stream<Item = Event> {
    EventStream::new().filter_map(|event| async move { event.ok() })
}

pub fn start_frame_task(tx: tokio::sync::mpsc::Sender<AppEvent>, fps: u8) {
    let fps = fps.clamp(15, 60);
    tokio::spawn(async move {
        let mut ticker = interval(Duration::from_millis(1000_u64 / u64::from(fps)));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            if tx.send(AppEvent::TickFrame).await.is_err() {
                break;
            }
        }
    });
}

const MIN_REFRESH_SECS: u64 = 2;
const MAX_REFRESH_SECS: u64 = 86_400;

pub fn start_refresh_task(tx: tokio::sync::mpsc::Sender<AppEvent>, refresh_secs: u64) {
    tokio::spawn(async move {
        loop {
            let jitter = rand::rng().random_range(-0.1f32..0.1f32);
            sleep(refresh_wait(refresh_secs, jitter)).await;
            if tx.send(AppEvent::TickRefresh).await.is_err() {
                break;
            }
        }
    });
}

#[allow(clippy::cast_precision_loss)]
fn refresh_wait(refresh_secs: u64, jitter: f32) -> Duration {
    let base = refresh_secs.clamp(MIN_REFRESH_SECS, MAX_REFRESH_SECS);
    let secs = ((base as f32) * (1.0 + jitter)).max(1.0);
    Duration::try_from_secs_f32(secs).unwrap_or(Duration::from_secs(base))
}
