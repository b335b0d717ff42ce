use crate::error::{OverlayError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub struct DeviceFinder;

impl DeviceFinder {
    /// Найти клавиатурные устройства для прослушивания горячих клавиш.
    ///
    /// Явный путь даёт ровно одно устройство; "auto" собирает все доступные
    /// клавиатуры, так как комбинация может прийти с любой из них.
    pub fn find_keyboard_devices(device_path: &str) -> Result<Vec<PathBuf>> {
        if device_path != "auto" {
            let path = PathBuf::from(device_path);
            return if path.exists() {
                info!("Используется указанное устройство: {:?}", path);
                Ok(vec![path])
            } else {
                OverlayError::device_not_found(format!("Указанное устройство не найдено: {:?}", path))
            };
        }

        Self::auto_find_keyboards()
    }

    fn auto_find_keyboards() -> Result<Vec<PathBuf>> {
        info!("Начинаем автопоиск клавиатурных устройств...");

        let input_dir = Path::new("/dev/input");
        let entries = fs::read_dir(input_dir)
            .map_err(|e| OverlayError::Permission(format!("Нет доступа к /dev/input: {}", e)))?;

        let mut event_devices = Vec::new();
        for entry in entries {
            let path = entry?.path();
            let is_event = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|name| name.starts_with("event"));
            if is_event {
                event_devices.push(path);
            }
        }

        event_devices.sort();

        let keyboards: Vec<PathBuf> = event_devices
            .into_iter()
            .filter(|path| Self::is_keyboard_device(path))
            .collect();

        if keyboards.is_empty() {
            return OverlayError::device_not_found(
                "Не найдено доступное клавиатурное устройство. \
                 Убедитесь, что пользователь добавлен в группу 'input'",
            );
        }

        info!("Найдено клавиатурных устройств: {}", keyboards.len());
        Ok(keyboards)
    }

    fn is_keyboard_device(device_path: &Path) -> bool {
        let device = match evdev::Device::open(device_path) {
            Ok(device) => device,
            Err(e) => {
                debug!("Не удалось открыть устройство {:?}: {}", device_path, e);
                return false;
            }
        };

        let device_name = device.name().unwrap_or("Unknown").to_lowercase();
        if is_pointer_name(&device_name) {
            debug!("Исключаем устройство как мышь/тачпад: {:?} ({})", device_path, device_name);
            return false;
        }

        let has_keys = device.supported_keys().is_some_and(|keys| {
            let basic_keys = keys.contains(evdev::KeyCode::KEY_A)
                && keys.contains(evdev::KeyCode::KEY_LEFTCTRL)
                && keys.contains(evdev::KeyCode::KEY_LEFTALT);

            basic_keys && keys.iter().count() > 20
        });

        if has_keys {
            info!("Устройство {:?} подходит как клавиатура ({})", device_path, device_name);
        } else {
            warn!("Устройство {:?} не похоже на клавиатуру ({})", device_path, device_name);
        }
        has_keys
    }
}

fn is_pointer_name(name: &str) -> bool {
    ["mouse", "touchpad", "trackpoint", "deathadder"]
        .iter()
        .any(|marker| name.contains(marker))
}
