use anyhow::{Context, Result};
use directories::{BaseDirs, ProjectDirs};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::events::ThemeSource;

/// Имя приложения, используемое для пользовательских каталогов
pub const APP_NAME: &str = "reading-overlay";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub logging: LoggingConfig,
    pub input: InputConfig,
    pub window: WindowConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub bridge: BridgeConfig,
    #[serde(default)]
    pub instance: InstanceConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InputConfig {
    pub device_path: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WindowConfig {
    /// Заголовок окна рендерера, к которому привязывается контроллер
    pub title: String,
    pub theme_source: ThemeSource,
    pub reassert_interval_ms: u64,
    pub blur_refocus_delay_ms: u64,
    pub click_through_delay_ms: u64,
    pub watch_interval_ms: u64,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct StorageConfig {
    pub settings_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct BridgeConfig {
    pub socket_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct InstanceConfig {
    pub socket_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "compact".to_string(),
            },
            input: InputConfig {
                device_path: "auto".to_string(),
            },
            window: WindowConfig {
                title: "Reading Overlay".to_string(),
                theme_source: ThemeSource::System,
                reassert_interval_ms: 5000,
                blur_refocus_delay_ms: 50,
                click_through_delay_ms: 500,
                watch_interval_ms: 250,
            },
            storage: StorageConfig::default(),
            bridge: BridgeConfig::default(),
            instance: InstanceConfig::default(),
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        let config_path = config_path.as_ref();

        // Файл конфигурации необязателен: значения по умолчанию лежат в основе
        let figment = Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(config_path))
            .merge(Env::prefixed("OVERLAY_").split("__"));

        let config: Config = figment
            .extract()
            .with_context(|| format!("Не удалось загрузить конфигурацию из {:?}", config_path))?;

        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        match self.logging.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!("Неверный уровень логирования: {}", self.logging.level),
        }

        match self.logging.format.as_str() {
            "compact" | "pretty" => {}
            _ => anyhow::bail!("Неверный формат логирования: {}", self.logging.format),
        }

        if self.window.title.trim().is_empty() {
            anyhow::bail!("window.title не может быть пустым");
        }

        if self.window.reassert_interval_ms < 500 {
            anyhow::bail!("reassert_interval_ms должно быть минимум 500");
        }

        if self.window.blur_refocus_delay_ms == 0 || self.window.click_through_delay_ms == 0 {
            anyhow::bail!("Задержки blur_refocus_delay_ms и click_through_delay_ms должны быть больше 0");
        }

        if self.window.watch_interval_ms < 50 {
            anyhow::bail!("watch_interval_ms должно быть минимум 50");
        }

        Ok(())
    }

    pub fn reassert_interval(&self) -> Duration {
        Duration::from_millis(self.window.reassert_interval_ms)
    }

    pub fn blur_refocus_delay(&self) -> Duration {
        Duration::from_millis(self.window.blur_refocus_delay_ms)
    }

    pub fn click_through_delay(&self) -> Duration {
        Duration::from_millis(self.window.click_through_delay_ms)
    }

    pub fn watch_interval(&self) -> Duration {
        Duration::from_millis(self.window.watch_interval_ms)
    }

    /// Путь к файлу сохранённых настроек оверлея
    pub fn settings_path(&self) -> PathBuf {
        if let Some(path) = &self.storage.settings_path {
            return path.clone();
        }

        match ProjectDirs::from("", "", APP_NAME) {
            Some(dirs) => dirs.config_dir().join("settings.json"),
            None => std::env::temp_dir().join(APP_NAME).join("settings.json"),
        }
    }

    pub fn bridge_socket_path(&self) -> PathBuf {
        self.bridge
            .socket_path
            .clone()
            .unwrap_or_else(|| runtime_dir().join("bridge.sock"))
    }

    pub fn instance_socket_path(&self) -> PathBuf {
        self.instance
            .socket_path
            .clone()
            .unwrap_or_else(|| runtime_dir().join("instance.sock"))
    }
}

/// Каталог для сокетов: $XDG_RUNTIME_DIR/reading-overlay, иначе временный каталог
fn runtime_dir() -> PathBuf {
    BaseDirs::new()
        .and_then(|dirs| dirs.runtime_dir().map(Path::to_path_buf))
        .unwrap_or_else(std::env::temp_dir)
        .join(APP_NAME)
}
