use crate::events::{HotkeyAction, OutboundMessage};
use crate::settings::OverlaySettings;

impl HotkeyAction {
    /// Чистый переход состояния; `None` для действий, не меняющих настройки
    pub fn apply(&self, current: &OverlaySettings) -> Option<OverlaySettings> {
        let next = match self {
            HotkeyAction::IncreaseOpacity => current.increase_opacity(),
            HotkeyAction::DecreaseOpacity => current.decrease_opacity(),
            HotkeyAction::ToggleColor => current.toggle_color(),
            HotkeyAction::IncreaseLineHeight => current.increase_line_height(),
            HotkeyAction::DecreaseLineHeight => current.decrease_line_height(),
            HotkeyAction::ToggleDashedLines => current.toggle_dashed_lines(),
            HotkeyAction::Quit => return None,
        };
        Some(next)
    }

    /// Сообщение об изменённом поле, построенное из уже применённого состояния
    pub fn delta(&self, settings: &OverlaySettings) -> Option<OutboundMessage> {
        match self {
            HotkeyAction::IncreaseOpacity | HotkeyAction::DecreaseOpacity => {
                Some(OutboundMessage::AdjustOpacity(settings.opacity))
            }
            HotkeyAction::ToggleColor => Some(OutboundMessage::ToggleColor(settings.is_black)),
            HotkeyAction::IncreaseLineHeight | HotkeyAction::DecreaseLineHeight => {
                Some(OutboundMessage::AdjustLineHeight(settings.line_height))
            }
            HotkeyAction::ToggleDashedLines => {
                Some(OutboundMessage::ToggleDashedLines(settings.show_dashed_lines))
            }
            HotkeyAction::Quit => None,
        }
    }
}
