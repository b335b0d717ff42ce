//! Сообщения канала между контроллером и рендерером оверлея.
//!
//! На проводе каждое сообщение имеет вид `{"channel": "<имя>", "payload": <значение>}`.

use crate::events::ThemeSnapshot;
use crate::settings::{OverlaySettings, SettingsPatch};
use serde::{Deserialize, Serialize};

/// Полный снимок состояния, отправляемый при (пере)подключении рендерера
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsSnapshot {
    #[serde(flatten)]
    pub settings: OverlaySettings,
    pub system_theme: ThemeSnapshot,
}

/// Сообщения контроллер -> рендерер
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "channel", content = "payload", rename_all = "kebab-case")]
pub enum OutboundMessage {
    LoadSettings(SettingsSnapshot),
    AdjustOpacity(f64),
    ToggleColor(bool),
    AdjustLineHeight(i32),
    ToggleDashedLines(bool),
    ForceAlwaysOnTop,
    SystemThemeChanged(ThemeSnapshot),
}

impl OutboundMessage {
    pub fn channel(&self) -> &'static str {
        match self {
            OutboundMessage::LoadSettings(_) => "load-settings",
            OutboundMessage::AdjustOpacity(_) => "adjust-opacity",
            OutboundMessage::ToggleColor(_) => "toggle-color",
            OutboundMessage::AdjustLineHeight(_) => "adjust-line-height",
            OutboundMessage::ToggleDashedLines(_) => "toggle-dashed-lines",
            OutboundMessage::ForceAlwaysOnTop => "force-always-on-top",
            OutboundMessage::SystemThemeChanged(_) => "system-theme-changed",
        }
    }
}

/// Параметры проброса событий мыши
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MouseForwardOptions {
    #[serde(default)]
    pub forward: bool,
}

/// Запрос `set-ignore-mouse-events`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "IgnoreMouseEventsPayload")]
pub struct IgnoreMouseEvents {
    pub ignore: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<MouseForwardOptions>,
}

/// Формы полезной нагрузки, которые присылает рендерер:
/// `true`, `[true]`, `[true, {"forward": true}]` или `{"ignore": true, "options": {...}}`
#[derive(Deserialize)]
#[serde(untagged)]
enum IgnoreMouseEventsPayload {
    Flag(bool),
    WithOptions(bool, MouseForwardOptions),
    Single([bool; 1]),
    Object {
        ignore: bool,
        #[serde(default)]
        options: Option<MouseForwardOptions>,
    },
}

impl From<IgnoreMouseEventsPayload> for IgnoreMouseEvents {
    fn from(payload: IgnoreMouseEventsPayload) -> Self {
        match payload {
            IgnoreMouseEventsPayload::Flag(ignore) | IgnoreMouseEventsPayload::Single([ignore]) => Self {
                ignore,
                options: None,
            },
            IgnoreMouseEventsPayload::WithOptions(ignore, options) => Self {
                ignore,
                options: Some(options),
            },
            IgnoreMouseEventsPayload::Object { ignore, options } => Self { ignore, options },
        }
    }
}

impl IgnoreMouseEvents {
    /// Без явных параметров события мыши пробрасываются нижележащим окнам
    pub fn forward(&self) -> bool {
        self.options.map_or(true, |options| options.forward)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowControl {
    Minimize,
    Close,
}

/// Сообщения рендерер -> контроллер
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "channel", content = "payload", rename_all = "kebab-case")]
pub enum InboundMessage {
    UpdateSettings(SettingsPatch),
    SetIgnoreMouseEvents(IgnoreMouseEvents),
    WindowControl(WindowControl),
}
