use serde::{Deserialize, Serialize};
use std::fmt;

/// Событие оконной среды, относящееся к поверхности оверлея
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceEvent {
    Focus,
    Blur,
    Show,
    Close,
    ThemeUpdated(ThemeSnapshot),
}

impl fmt::Display for SurfaceEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SurfaceEvent::Focus => write!(f, "focus"),
            SurfaceEvent::Blur => write!(f, "blur"),
            SurfaceEvent::Show => write!(f, "show"),
            SurfaceEvent::Close => write!(f, "close"),
            SurfaceEvent::ThemeUpdated(theme) => write!(f, "theme-updated ({})", theme),
        }
    }
}

/// Источник темы, аналог настройки приложения "system/light/dark"
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeSource {
    #[default]
    System,
    Light,
    Dark,
}

/// Снимок системной темы; не сохраняется, только пересылается рендереру
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeSnapshot {
    pub should_use_dark_colors: bool,
    pub theme_source: ThemeSource,
}

impl ThemeSnapshot {
    /// Учесть принудительный источник темы из конфигурации
    pub fn resolve(source: ThemeSource, system_prefers_dark: bool) -> Self {
        let should_use_dark_colors = match source {
            ThemeSource::System => system_prefers_dark,
            ThemeSource::Light => false,
            ThemeSource::Dark => true,
        };
        Self {
            should_use_dark_colors,
            theme_source: source,
        }
    }
}

impl fmt::Display for ThemeSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:?}, dark: {}",
            self.theme_source, self.should_use_dark_colors
        )
    }
}

/// Полезная область основного дисплея (без панелей)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorkArea {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl fmt::Display for WorkArea {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}+{}+{}", self.width, self.height, self.x, self.y)
    }
}

/// Параметры создания поверхности оверлея
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceOptions {
    pub bounds: WorkArea,
    pub transparent: bool,
    pub frame: bool,
    pub resizable: bool,
    pub focusable: bool,
    pub has_shadow: bool,
    pub always_on_top: bool,
}

impl SurfaceOptions {
    /// Оверлей: без рамки, прозрачный, неизменяемого размера, без тени
    pub fn overlay(bounds: WorkArea) -> Self {
        Self {
            bounds,
            transparent: true,
            frame: false,
            resizable: false,
            focusable: true,
            has_shadow: false,
            always_on_top: true,
        }
    }
}
