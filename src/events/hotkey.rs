use serde::{Deserialize, Serialize};
use std::fmt;

/// Действие, привязанное к глобальной горячей клавише
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HotkeyAction {
    IncreaseOpacity,
    DecreaseOpacity,
    ToggleColor,
    IncreaseLineHeight,
    DecreaseLineHeight,
    ToggleDashedLines,
    Quit,
}

impl HotkeyAction {
    pub fn name(&self) -> &'static str {
        match self {
            HotkeyAction::IncreaseOpacity => "increase-opacity",
            HotkeyAction::DecreaseOpacity => "decrease-opacity",
            HotkeyAction::ToggleColor => "toggle-color",
            HotkeyAction::IncreaseLineHeight => "increase-line-height",
            HotkeyAction::DecreaseLineHeight => "decrease-line-height",
            HotkeyAction::ToggleDashedLines => "toggle-dashed-lines",
            HotkeyAction::Quit => "quit",
        }
    }
}

impl fmt::Display for HotkeyAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
