use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Преобразование имён клавиш в evdev коды
/// Отвечает за трансляцию строковых имён клавиш (как в записи "Ctrl+Alt+Up") в числовые коды evdev
pub struct KeyNameToEvdevCode;

// Каноническое имя клавиши -> evdev код; порядок важен для обратного преобразования
const KEY_TABLE: &[(&str, u16)] = &[
    // Буквенные клавиши
    ("a", 30), ("b", 48), ("c", 46), ("d", 32), ("e", 18), ("f", 33),
    ("g", 34), ("h", 35), ("i", 23), ("j", 36), ("k", 37), ("l", 38),
    ("m", 50), ("n", 49), ("o", 24), ("p", 25), ("q", 16), ("r", 19),
    ("s", 31), ("t", 20), ("u", 22), ("v", 47), ("w", 17), ("x", 45),
    ("y", 21), ("z", 44),

    // Цифровые клавиши (верхний ряд)
    ("1", 2), ("2", 3), ("3", 4), ("4", 5), ("5", 6),
    ("6", 7), ("7", 8), ("8", 9), ("9", 10), ("0", 11),

    // Знаки
    ("-", 12),   // KEY_MINUS
    ("=", 13),   // KEY_EQUAL

    // Специальные клавиши
    ("space", 57), ("enter", 28), ("escape", 1), ("backspace", 14), ("tab", 15),

    // Стрелки
    ("up", 103), ("down", 108), ("left", 105), ("right", 106),

    // Функциональные клавиши
    ("f1", 59), ("f2", 60), ("f3", 61), ("f4", 62), ("f5", 63), ("f6", 64),
    ("f7", 65), ("f8", 66), ("f9", 67), ("f10", 68), ("f11", 87), ("f12", 88),
];

// Альтернативные написания, встречающиеся в записях горячих клавиш
const KEY_ALIASES: &[(&str, &str)] = &[
    ("minus", "-"),
    ("equal", "="),
    ("plus", "="),
    ("esc", "escape"),
    ("return", "enter"),
];

static NAME_TO_CODE: Lazy<HashMap<&'static str, u16>> = Lazy::new(|| {
    let mut map: HashMap<&'static str, u16> = KEY_TABLE.iter().copied().collect();
    for (alias, canonical) in KEY_ALIASES {
        if let Some(code) = map.get(canonical).copied() {
            map.insert(alias, code);
        }
    }
    map
});

impl KeyNameToEvdevCode {
    /// Получить evdev код клавиши по её имени
    pub fn translate(key_name: &str) -> Result<u16, String> {
        let normalized = key_name.trim().to_lowercase();
        NAME_TO_CODE
            .get(normalized.as_str())
            .copied()
            .ok_or_else(|| format!("Unknown key: {}", key_name))
    }

    /// Получить имя клавиши по evdev коду
    pub fn reverse_translate(keycode: u16) -> Option<&'static str> {
        KEY_TABLE
            .iter()
            .find(|(_, code)| *code == keycode)
            .map(|(name, _)| *name)
    }
}
