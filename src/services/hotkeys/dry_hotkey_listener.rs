use crate::error::Result;
use crate::events::{ControllerEvent, HotkeyAction, KeyCombo};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn};

use super::r#trait::HotkeyListenerTrait;
use super::registry::{HotkeyRegistry, SharedRegistry, DEFAULT_BINDINGS};

/// Эмуляция горячих клавиш: комбинации ("Ctrl+Alt+Up") или имена действий
/// ("toggle-color") построчно из stdin.
pub struct DryRunHotkeyListener {
    registry: SharedRegistry,
    events: UnboundedSender<ControllerEvent>,
}

impl DryRunHotkeyListener {
    pub fn new(registry: SharedRegistry, events: UnboundedSender<ControllerEvent>) -> Self {
        info!("Инициализация DryRunHotkeyListener");
        Self { registry, events }
    }

    async fn run_impl(self) -> Result<()> {
        info!("Dry-run режим - горячие клавиши читаются из stdin");

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Some(line) = lines.next_line().await? {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let action = {
                let registry = self.registry.read();
                resolve_line(&registry, line)
            };

            match action {
                Some(action) => {
                    info!("[DRY RUN] Горячая клавиша: {}", action);
                    if self.events.send(ControllerEvent::Hotkey(action)).is_err() {
                        break;
                    }
                }
                None => warn!("[DRY RUN] Нет зарегистрированной горячей клавиши для '{}'", line),
            }
        }

        debug!("stdin закрыт, DryRunHotkeyListener остановлен");
        Ok(())
    }
}

/// Имя действия допускается только если оно сейчас зарегистрировано
fn resolve_line(registry: &HotkeyRegistry, line: &str) -> Option<HotkeyAction> {
    if let Ok(combo) = line.parse::<KeyCombo>() {
        if let Some(action) = registry.lookup(&combo) {
            return Some(action);
        }
    }

    DEFAULT_BINDINGS
        .iter()
        .find(|(_, action)| action.name() == line)
        .and_then(|(accelerator, _)| accelerator.parse::<KeyCombo>().ok())
        .and_then(|combo| registry.lookup(&combo))
}

#[async_trait::async_trait]
impl HotkeyListenerTrait for DryRunHotkeyListener {
    async fn run(self: Box<Self>) -> Result<()> {
        (*self).run_impl().await
    }
}
