use crate::mappings::KeyNameToEvdevCode;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Состояние клавиши
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyState {
    Pressed,
    Released,
    Repeat,
}

impl KeyState {
    /// Значение поля `value` события evdev
    pub fn from_evdev_value(value: i32) -> Option<Self> {
        match value {
            0 => Some(KeyState::Released),
            1 => Some(KeyState::Pressed),
            2 => Some(KeyState::Repeat),
            _ => None,
        }
    }
}

/// Код клавиши (evdev коды)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyCode(pub u16);

impl KeyCode {
    pub fn new(code: u16) -> Self {
        Self(code)
    }
}

impl fmt::Display for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match KeyNameToEvdevCode::reverse_translate(self.0) {
            Some(name) if name.len() == 1 => write!(f, "{}", name.to_uppercase()),
            Some(name) => {
                let mut chars = name.chars();
                match chars.next() {
                    Some(first) => write!(f, "{}{}", first.to_uppercase(), chars.as_str()),
                    None => write!(f, "KEY_{}", self.0),
                }
            }
            None => write!(f, "KEY_{}", self.0),
        }
    }
}

/// Модификаторы клавиш
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub super_key: bool,
}

impl Modifiers {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn with_ctrl(mut self, ctrl: bool) -> Self {
        self.ctrl = ctrl;
        self
    }

    #[cfg(test)]
    pub fn with_alt(mut self, alt: bool) -> Self {
        self.alt = alt;
        self
    }

    #[cfg(test)]
    pub fn with_shift(mut self, shift: bool) -> Self {
        self.shift = shift;
        self
    }

    pub fn is_empty(&self) -> bool {
        !self.ctrl && !self.alt && !self.shift && !self.super_key
    }

    pub fn to_vec(&self) -> Vec<&'static str> {
        let mut result = Vec::new();
        if self.ctrl { result.push("Ctrl"); }
        if self.alt { result.push("Alt"); }
        if self.shift { result.push("Shift"); }
        if self.super_key { result.push("Super"); }
        result
    }

    /// Разобрать одно имя модификатора, вернуть false если это не модификатор
    fn set_by_name(&mut self, name: &str) -> bool {
        match name.to_lowercase().as_str() {
            "ctrl" | "control" | "commandorcontrol" | "cmdorctrl" => self.ctrl = true,
            "alt" | "option" => self.alt = true,
            "shift" => self.shift = true,
            "super" | "meta" | "cmd" | "command" => self.super_key = true,
            _ => return false,
        }
        true
    }
}

impl fmt::Display for Modifiers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let modifiers = self.to_vec();
        if modifiers.is_empty() {
            write!(f, "none")
        } else {
            write!(f, "{}", modifiers.join("+"))
        }
    }
}

/// Комбинация клавиш глобальной горячей клавиши ("Ctrl+Alt+Up")
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyCombo {
    pub modifiers: Modifiers,
    pub key_code: KeyCode,
}

impl KeyCombo {
    pub fn new(modifiers: Modifiers, key_code: KeyCode) -> Self {
        Self { modifiers, key_code }
    }
}

impl FromStr for KeyCombo {
    type Err = String;

    fn from_str(accelerator: &str) -> Result<Self, Self::Err> {
        let accelerator = accelerator.trim();
        if accelerator.is_empty() {
            return Err("Пустая комбинация клавиш".to_string());
        }

        // "Ctrl+Alt++" не поддерживается; для '=' и '-' используются сами символы
        let parts: Vec<&str> = accelerator.split('+').map(str::trim).collect();
        let (key, modifier_parts) = match parts.split_last() {
            Some((key, rest)) if !key.is_empty() => (*key, rest),
            _ => return Err(format!("Не указана клавиша в комбинации '{}'", accelerator)),
        };

        let mut modifiers = Modifiers::new();
        for part in modifier_parts {
            if !modifiers.set_by_name(part) {
                return Err(format!("Неверный модификатор '{}' в '{}'", part, accelerator));
            }
        }

        let code = KeyNameToEvdevCode::translate(key)?;
        Ok(Self::new(modifiers, KeyCode::new(code)))
    }
}

impl fmt::Display for KeyCombo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.modifiers.is_empty() {
            write!(f, "{}", self.key_code)
        } else {
            write!(f, "{}+{}", self.modifiers, self.key_code)
        }
    }
}

/// Событие клавиатуры
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    pub key_code: KeyCode,
    pub state: KeyState,
    pub modifiers: Modifiers,
    pub timestamp: std::time::Instant,
    pub device_name: String,
}

impl KeyEvent {
    pub fn new(
        key_code: KeyCode,
        state: KeyState,
        modifiers: Modifiers,
        device_name: String,
    ) -> Self {
        Self {
            key_code,
            state,
            modifiers,
            timestamp: std::time::Instant::now(),
            device_name,
        }
    }

    pub fn combo(&self) -> KeyCombo {
        KeyCombo::new(self.modifiers, self.key_code)
    }
}

impl fmt::Display for KeyEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}[{}] {:?} ({})",
            self.combo(),
            self.device_name,
            self.state,
            self.timestamp.elapsed().as_millis()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modifiers_creation() {
        let modifiers = Modifiers::new().with_ctrl(true).with_shift(true);

        assert!(modifiers.ctrl);
        assert!(modifiers.shift);
        assert!(!modifiers.alt);
        assert!(!modifiers.super_key);
        assert!(!modifiers.is_empty());
    }

    #[test]
    fn test_parse_accelerator() {
        let combo: KeyCombo = "Ctrl+Alt+Up".parse().unwrap();
        assert_eq!(combo.modifiers, Modifiers::new().with_ctrl(true).with_alt(true));
        assert_eq!(combo.key_code, KeyCode::new(103));

        let combo: KeyCombo = "ctrl + alt + =".parse().unwrap();
        assert_eq!(combo.key_code, KeyCode::new(13));

        assert!("Ctrl+Alt+".parse::<KeyCombo>().is_err());
        assert!("Hyper+Q".parse::<KeyCombo>().is_err());
        assert!("".parse::<KeyCombo>().is_err());
    }

    #[test]
    fn test_combo_display() {
        let combo: KeyCombo = "Ctrl+Alt+B".parse().unwrap();
        assert_eq!(combo.to_string(), "Ctrl+Alt+B");

        let combo: KeyCombo = "Ctrl+Alt+Down".parse().unwrap();
        assert_eq!(combo.to_string(), "Ctrl+Alt+Down");
    }

    #[test]
    fn test_key_event_combo() {
        let event = KeyEvent::new(
            KeyCode::new(38),
            KeyState::Pressed,
            Modifiers::new().with_ctrl(true).with_alt(true),
            "test".to_string(),
        );

        assert_eq!(event.combo(), "Ctrl+Alt+L".parse().unwrap());
    }
}
