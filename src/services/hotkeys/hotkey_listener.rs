use crate::config::Config;
use crate::debug_if_enabled;
use crate::error::{OverlayError, Result};
use crate::events::{ControllerEvent, HotkeyAction, KeyCode, KeyEvent, KeyState};
use crate::utils::DeviceFinder;
use evdev::{Device, EventType};
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

use super::modifier_state::ModifierState;
use super::r#trait::HotkeyListenerTrait;
use super::registry::{HotkeyRegistry, SharedRegistry};

/// Слушатель глобальных горячих клавиш поверх evdev.
///
/// Устройства читаются без эксклюзивного захвата: нажатия продолжают
/// доходить до остальных приложений.
pub struct RealHotkeyListener {
    registry: SharedRegistry,
    events: UnboundedSender<ControllerEvent>,
    devices: Vec<Device>,
}

impl RealHotkeyListener {
    pub fn new(
        config: &Config,
        registry: SharedRegistry,
        events: UnboundedSender<ControllerEvent>,
    ) -> Result<Self> {
        info!("Инициализация RealHotkeyListener");

        let mut devices = Vec::new();
        for path in DeviceFinder::find_keyboard_devices(&config.input.device_path)? {
            match Device::open(&path) {
                Ok(device) => {
                    info!(
                        "Слушаем устройство {:?} ({})",
                        path,
                        device.name().unwrap_or("Unknown")
                    );
                    devices.push(device);
                }
                Err(e) => warn!("Не удалось открыть устройство {:?}: {}", path, e),
            }
        }

        if devices.is_empty() {
            return OverlayError::device_not_found("Ни одно клавиатурное устройство не удалось открыть");
        }

        Ok(Self {
            registry,
            events,
            devices,
        })
    }

    async fn run_impl(self) -> Result<()> {
        info!(
            "RealHotkeyListener запущен, устройств: {}",
            self.devices.len()
        );

        let mut tasks = JoinSet::new();
        for device in self.devices {
            tasks.spawn(Self::listen(device, self.registry.clone(), self.events.clone()));
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Ok(())) => {}
                Ok(Err(e)) => error!("Чтение устройства прекращено: {}", e),
                Err(e) => error!("Задача чтения устройства завершилась аварийно: {}", e),
            }
        }

        info!("RealHotkeyListener остановлен");
        Ok(())
    }

    async fn listen(
        device: Device,
        registry: SharedRegistry,
        events: UnboundedSender<ControllerEvent>,
    ) -> Result<()> {
        let device_name = device.name().unwrap_or("Unknown").to_string();
        let mut stream = device.into_event_stream()?;
        let mut modifiers = ModifierState::new();

        loop {
            let event = stream.next_event().await?;
            if event.event_type() != EventType::KEY {
                continue;
            }

            let Some(state) = KeyState::from_evdev_value(event.value()) else {
                debug_if_enabled!("Неизвестное значение события: {}", event.value());
                continue;
            };

            let action = {
                let registry = registry.read();
                match_hotkey(&registry, &mut modifiers, event.code(), state, &device_name)
            };

            if let Some(action) = action {
                info!("Горячая клавиша: {}", action);
                if events.send(ControllerEvent::Hotkey(action)).is_err() {
                    // Контроллер завершился
                    return Ok(());
                }
            }
        }
    }
}

/// Обновить модификаторы и сопоставить нажатие с зарегистрированной комбинацией
pub(crate) fn match_hotkey(
    registry: &HotkeyRegistry,
    modifiers: &mut ModifierState,
    code: u16,
    state: KeyState,
    device_name: &str,
) -> Option<HotkeyAction> {
    if modifiers.update_key(evdev::KeyCode::new(code), state != KeyState::Released) {
        return None;
    }
    if state == KeyState::Released {
        return None;
    }

    let key_event = KeyEvent::new(
        KeyCode(code),
        state,
        modifiers.to_modifiers(),
        device_name.to_string(),
    );
    debug_if_enabled!("Событие клавиши: {}", key_event);

    registry.lookup(&key_event.combo())
}

#[async_trait::async_trait]
impl HotkeyListenerTrait for RealHotkeyListener {
    async fn run(self: Box<Self>) -> Result<()> {
        (*self).run_impl().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mappings::KeyNameToEvdevCode;

    fn code(name: &str) -> u16 {
        KeyNameToEvdevCode::translate(name).unwrap()
    }

    fn registry() -> HotkeyRegistry {
        let mut registry = HotkeyRegistry::new();
        registry.register_defaults();
        registry
    }

    #[test]
    fn test_combo_fires_with_modifiers_held() {
        let registry = registry();
        let mut modifiers = ModifierState::new();

        assert_eq!(match_hotkey(&registry, &mut modifiers, 29, KeyState::Pressed, "kbd"), None);
        assert_eq!(match_hotkey(&registry, &mut modifiers, 56, KeyState::Pressed, "kbd"), None);
        assert_eq!(
            match_hotkey(&registry, &mut modifiers, code("up"), KeyState::Pressed, "kbd"),
            Some(HotkeyAction::IncreaseOpacity)
        );
        assert_eq!(
            match_hotkey(&registry, &mut modifiers, code("up"), KeyState::Repeat, "kbd"),
            Some(HotkeyAction::IncreaseOpacity)
        );
        assert_eq!(match_hotkey(&registry, &mut modifiers, code("up"), KeyState::Released, "kbd"), None);
    }

    #[test]
    fn test_plain_key_is_ignored() {
        let registry = registry();
        let mut modifiers = ModifierState::new();
        assert_eq!(match_hotkey(&registry, &mut modifiers, code("b"), KeyState::Pressed, "kbd"), None);
    }

    #[test]
    fn test_released_modifier_stops_matching() {
        let registry = registry();
        let mut modifiers = ModifierState::new();

        match_hotkey(&registry, &mut modifiers, 29, KeyState::Pressed, "kbd");
        match_hotkey(&registry, &mut modifiers, 56, KeyState::Pressed, "kbd");
        match_hotkey(&registry, &mut modifiers, 56, KeyState::Released, "kbd");
        assert_eq!(match_hotkey(&registry, &mut modifiers, code("l"), KeyState::Pressed, "kbd"), None);
    }

    #[test]
    fn test_unregistered_table_matches_nothing() {
        let mut registry = registry();
        registry.unregister_all();
        let mut modifiers = ModifierState::new();

        match_hotkey(&registry, &mut modifiers, 29, KeyState::Pressed, "kbd");
        match_hotkey(&registry, &mut modifiers, 56, KeyState::Pressed, "kbd");
        assert_eq!(match_hotkey(&registry, &mut modifiers, code("q"), KeyState::Pressed, "kbd"), None);
    }
}
