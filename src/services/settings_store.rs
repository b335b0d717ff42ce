use crate::error::{OverlayError, Result};
use crate::settings::OverlaySettings;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Хранилище настроек оверлея в JSON файле.
///
/// Ни чтение, ни запись не прерывают работу: при ошибке чтения возвращаются
/// значения по умолчанию, ошибка записи только логируется.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Загрузить настройки: умолчания ⊕ сохранённые значения
    pub fn load(&self) -> OverlaySettings {
        match self.try_load() {
            Ok(Some(settings)) => {
                info!("Загружены настройки из {:?}: {:?}", self.path, settings);
                settings
            }
            Ok(None) => {
                info!("Сохранённые настройки не найдены, используются значения по умолчанию");
                OverlaySettings::default()
            }
            Err(e) => {
                warn!(
                    "Не удалось прочитать настройки из {:?}: {}. Используются значения по умолчанию",
                    self.path, e
                );
                OverlaySettings::default()
            }
        }
    }

    fn try_load(&self) -> Result<Option<OverlaySettings>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let data = fs::read_to_string(&self.path)?;
        let settings: OverlaySettings = serde_json::from_str(&data)?;
        Ok(Some(settings.clamped()))
    }

    /// Сохранить запись целиком; возвращает false при ошибке
    pub fn save(&self, settings: &OverlaySettings) -> bool {
        match self.try_save(settings) {
            Ok(()) => {
                debug!("Настройки сохранены: {:?}", settings);
                true
            }
            Err(e) => {
                warn!("Ошибка сохранения настроек в {:?}: {}", self.path, e);
                false
            }
        }
    }

    fn try_save(&self, settings: &OverlaySettings) -> Result<()> {
        let parent = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(parent)?;

        let json = serde_json::to_string_pretty(settings)?;

        // Запись во временный файл и атомарная замена: при падении между
        // записями на диске остаётся либо старая, либо новая версия целиком
        let file_name = self
            .path
            .file_name()
            .ok_or_else(|| OverlayError::Internal(format!("Некорректный путь настроек: {:?}", self.path)))?;
        let mut tmp_name = file_name.to_os_string();
        tmp_name.push(".tmp");
        let tmp_path = parent.join(tmp_name);

        fs::write(&tmp_path, json)?;
        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }
}
