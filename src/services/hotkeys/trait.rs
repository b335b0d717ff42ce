use crate::config::Config;
use crate::error::Result;
use crate::events::ControllerEvent;
use tokio::sync::mpsc::UnboundedSender;

use super::registry::SharedRegistry;

/// Trait for hotkey listeners that can run in different modes
#[async_trait::async_trait]
pub trait HotkeyListenerTrait {
    /// Run the hotkey listener
    async fn run(self: Box<Self>) -> Result<()>;
}

/// Factory function to create an appropriate hotkey listener based on the dry_run flag
pub fn create_hotkey_listener(
    config: &Config,
    registry: SharedRegistry,
    events: UnboundedSender<ControllerEvent>,
    dry_run: bool,
) -> Result<Box<dyn HotkeyListenerTrait + Send>> {
    if dry_run {
        Ok(Box::new(super::dry_hotkey_listener::DryRunHotkeyListener::new(
            registry, events,
        )))
    } else {
        Ok(Box::new(super::hotkey_listener::RealHotkeyListener::new(
            config, registry, events,
        )?))
    }
}
