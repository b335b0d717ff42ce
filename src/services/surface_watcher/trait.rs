use crate::config::Config;
use crate::error::Result;
use crate::events::{ControllerEvent, ThemeSnapshot};
use tokio::sync::mpsc::UnboundedSender;
use zbus::Connection;

/// Trait for surface watchers that can run in different modes
#[async_trait::async_trait]
pub trait SurfaceWatcherTrait {
    /// Run the surface watcher
    async fn run(self: Box<Self>) -> Result<()>;
}

/// Factory function to create an appropriate surface watcher based on the dry_run flag
pub fn create_surface_watcher(
    config: &Config,
    events: UnboundedSender<ControllerEvent>,
    connection: Option<Connection>,
    initial_theme: ThemeSnapshot,
    dry_run: bool,
) -> Box<dyn SurfaceWatcherTrait + Send> {
    if dry_run {
        Box::new(super::dry_surface_watcher::DryRunSurfaceWatcher::new(events))
    } else {
        Box::new(super::surface_watcher::RealSurfaceWatcher::new(
            config,
            events,
            connection,
            initial_theme,
        ))
    }
}
