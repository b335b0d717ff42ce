use crate::config::Config;
use crate::debug_if_enabled;
use crate::error::Result;
use crate::events::{ControllerEvent, SurfaceEvent, ThemeSnapshot, ThemeSource};
use crate::services::surface_host::exact_title_pattern;
use crate::services::theme::read_theme_snapshot;
use std::process::Command;
use tokio::sync::mpsc::UnboundedSender;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{debug, info, warn};
use zbus::Connection;

use super::observation::{transitions, WindowObservation};
use super::r#trait::SurfaceWatcherTrait;

const THEME_POLL_INTERVAL: Duration = Duration::from_secs(2);

pub struct RealSurfaceWatcher {
    title: String,
    theme_source: ThemeSource,
    watch_interval: Duration,
    events: UnboundedSender<ControllerEvent>,
    connection: Option<Connection>,
    theme: ThemeSnapshot,
    observation: WindowObservation,
}

impl RealSurfaceWatcher {
    pub fn new(
        config: &Config,
        events: UnboundedSender<ControllerEvent>,
        connection: Option<Connection>,
        initial_theme: ThemeSnapshot,
    ) -> Self {
        info!("Инициализация RealSurfaceWatcher для окна \"{}\"", config.window.title);
        Self {
            title: config.window.title.clone(),
            theme_source: config.window.theme_source,
            watch_interval: config.watch_interval(),
            events,
            connection,
            theme: initial_theme,
            observation: WindowObservation::missing(),
        }
    }

    fn xdotool(args: &[&str]) -> Option<String> {
        let output = Command::new("xdotool").args(args).output().ok()?;
        if !output.status.success() {
            return None;
        }
        Some(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    fn observe(&self) -> WindowObservation {
        let pattern = exact_title_pattern(&self.title);
        let Some(id) = Self::xdotool(&["search", "--limit", "1", "--name", &pattern])
            .and_then(|out| out.lines().next().map(str::to_string))
        else {
            return WindowObservation::missing();
        };

        let active = Self::xdotool(&["getactivewindow"])
            .is_some_and(|active| active.trim() == id);

        let hidden = Command::new("xprop")
            .args(["-id", &id, "_NET_WM_STATE"])
            .output()
            .map(|out| String::from_utf8_lossy(&out.stdout).contains("_NET_WM_STATE_HIDDEN"))
            .unwrap_or(false);

        WindowObservation {
            exists: true,
            active,
            hidden,
        }
    }

    fn emit(&self, event: SurfaceEvent) -> bool {
        debug!("Событие поверхности: {}", event);
        self.events.send(ControllerEvent::Surface(event)).is_ok()
    }

    async fn run_impl(mut self) -> Result<()> {
        info!(
            "RealSurfaceWatcher запущен (опрос окна каждые {:?}, темы каждые {:?})",
            self.watch_interval, THEME_POLL_INTERVAL
        );
        if self.connection.is_none() && self.theme_source == ThemeSource::System {
            warn!("D-Bus недоступен, смена системной темы отслеживаться не будет");
        }

        let mut window_tick = interval(self.watch_interval);
        window_tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut theme_tick = interval(THEME_POLL_INTERVAL);
        theme_tick.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = window_tick.tick() => {
                    let current = self.observe();
                    for event in transitions(self.observation, current) {
                        if !self.emit(event) {
                            return Ok(());
                        }
                    }
                    if self.observation.exists != current.exists {
                        debug_if_enabled!("Окно оверлея присутствует: {}", current.exists);
                    }
                    self.observation = current;
                }
                _ = theme_tick.tick(), if self.theme_source == ThemeSource::System && self.connection.is_some() => {
                    let theme = read_theme_snapshot(self.connection.as_ref(), self.theme_source).await;
                    if theme != self.theme {
                        info!("Системная тема изменилась: {}", theme);
                        self.theme = theme;
                        if !self.emit(SurfaceEvent::ThemeUpdated(theme)) {
                            return Ok(());
                        }
                    }
                }
            }
        }
    }
}

#[async_trait::async_trait]
impl SurfaceWatcherTrait for RealSurfaceWatcher {
    async fn run(self: Box<Self>) -> Result<()> {
        (*self).run_impl().await
    }
}
