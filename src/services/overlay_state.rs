use crate::services::SettingsStore;
use crate::settings::{OverlaySettings, SettingsPatch};
use tracing::debug;

impl From<OverlaySettings> for SettingsPatch {
    fn from(settings: OverlaySettings) -> Self {
        Self {
            opacity: Some(settings.opacity),
            is_black: Some(settings.is_black),
            line_height: Some(settings.line_height),
            show_footer: Some(settings.show_footer),
            show_dashed_lines: Some(settings.show_dashed_lines),
        }
    }
}

/// Результат применения обновления
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Applied {
    pub previous: OverlaySettings,
    pub current: OverlaySettings,
    /// Хотя бы одно запрошенное значение было приведено к диапазону
    pub adjusted: bool,
}

impl Applied {
    pub fn changed(&self) -> bool {
        self.previous != self.current
    }
}

/// Единственный владелец текущих настроек оверлея.
///
/// Любое изменение проходит через [`OverlayState::apply`], где значения
/// приводятся к диапазонам; запись на диск выполняется отдельно через
/// [`OverlayState::save`], чтобы контроллер сохранял фиксированный порядок шагов.
#[derive(Debug)]
pub struct OverlayState {
    settings: OverlaySettings,
    store: SettingsStore,
}

impl OverlayState {
    /// Создать состояние с умолчаниями и сразу наложить сохранённую запись
    pub fn load(store: SettingsStore) -> Self {
        let settings = store.load();
        Self { settings, store }
    }

    pub fn get(&self) -> OverlaySettings {
        self.settings
    }

    pub fn apply(&mut self, patch: &SettingsPatch) -> Applied {
        let previous = self.settings;
        let current = previous.merged(patch);

        let adjusted = patch.opacity.is_some_and(|v| v != current.opacity)
            || patch.line_height.is_some_and(|v| v != current.line_height);

        self.settings = current;
        debug!("Настройки обновлены: {:?} -> {:?}", previous, current);

        Applied {
            previous,
            current,
            adjusted,
        }
    }

    /// Заменить запись целиком (тоже через [`OverlayState::apply`])
    pub fn set(&mut self, next: OverlaySettings) -> Applied {
        self.apply(&SettingsPatch::from(next))
    }

    pub fn save(&self) -> bool {
        self.store.save(&self.settings)
    }
}
