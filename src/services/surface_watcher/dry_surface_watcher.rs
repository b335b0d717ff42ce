use crate::error::Result;
use crate::events::{ControllerEvent, SurfaceEvent};
use tokio::sync::mpsc::UnboundedSender;
use tokio::time::{interval, Duration};
use tracing::info;

use super::r#trait::SurfaceWatcherTrait;

/// Эмуляция оконной среды: периодически "отбирает" фокус у оверлея,
/// чтобы проверить возврат фокуса и уровня.
pub struct DryRunSurfaceWatcher {
    events: UnboundedSender<ControllerEvent>,
}

impl DryRunSurfaceWatcher {
    pub fn new(events: UnboundedSender<ControllerEvent>) -> Self {
        Self { events }
    }

    async fn run_impl(self) -> Result<()> {
        info!("Dry-run режим - SurfaceWatcher работает в режиме эмуляции");

        let script = [SurfaceEvent::Blur, SurfaceEvent::Focus];
        let mut index = 0;
        let mut tick = interval(Duration::from_secs(15));
        // Первый тик срабатывает сразу
        tick.tick().await;

        loop {
            tick.tick().await;

            let event = script[index].clone();
            info!("Dry-run: эмулируем событие поверхности: {}", event);
            if self.events.send(ControllerEvent::Surface(event)).is_err() {
                return Ok(());
            }
            index = (index + 1) % script.len();
        }
    }
}

#[async_trait::async_trait]
impl SurfaceWatcherTrait for DryRunSurfaceWatcher {
    async fn run(self: Box<Self>) -> Result<()> {
        (*self).run_impl().await
    }
}
