use crate::error::{OverlayError, Result};
use crate::events::{HotkeyAction, KeyCombo};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Фиксированная таблица глобальных горячих клавиш
pub const DEFAULT_BINDINGS: &[(&str, HotkeyAction)] = &[
    ("Ctrl+Alt+Up", HotkeyAction::IncreaseOpacity),
    ("Ctrl+Alt+Down", HotkeyAction::DecreaseOpacity),
    ("Ctrl+Alt+B", HotkeyAction::ToggleColor),
    ("Ctrl+Alt+=", HotkeyAction::IncreaseLineHeight),
    ("Ctrl+Alt+-", HotkeyAction::DecreaseLineHeight),
    ("Ctrl+Alt+L", HotkeyAction::ToggleDashedLines),
    ("Ctrl+Alt+Q", HotkeyAction::Quit),
];

pub type SharedRegistry = Arc<RwLock<HotkeyRegistry>>;

/// Зарегистрированные глобальные горячие клавиши.
///
/// Слушатели клавиатуры только читают реестр; регистрацией управляет контроллер.
#[derive(Debug, Default)]
pub struct HotkeyRegistry {
    bindings: HashMap<KeyCombo, HotkeyAction>,
}

impl HotkeyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> SharedRegistry {
        Arc::new(RwLock::new(Self::new()))
    }

    pub fn unregister_all(&mut self) {
        if !self.bindings.is_empty() {
            debug!("Снятие {} глобальных горячих клавиш", self.bindings.len());
        }
        self.bindings.clear();
    }

    /// Зарегистрировать комбинацию; занятая комбинация не перезаписывается
    pub fn register(&mut self, accelerator: &str, action: HotkeyAction) -> Result<()> {
        let combo: KeyCombo = accelerator
            .parse()
            .map_err(|e: String| OverlayError::Internal(format!("Некорректная комбинация '{}': {}", accelerator, e)))?;

        if let Some(existing) = self.bindings.get(&combo) {
            return Err(OverlayError::Internal(format!(
                "Комбинация {} уже занята действием {}",
                combo, existing
            )));
        }

        self.bindings.insert(combo, action);
        Ok(())
    }

    /// Проход регистрации: сначала снимаются все прежние привязки
    pub fn register_defaults(&mut self) -> usize {
        self.unregister_all();
        info!("Регистрация глобальных горячих клавиш...");

        for (accelerator, action) in DEFAULT_BINDINGS {
            match self.register(accelerator, *action) {
                Ok(()) => debug!("{}: {}", accelerator, action),
                Err(e) => warn!("Не удалось зарегистрировать {}: {}", accelerator, e),
            }
        }

        info!("Зарегистрировано {} горячих клавиш", self.bindings.len());
        self.bindings.len()
    }

    pub fn lookup(&self, combo: &KeyCombo) -> Option<HotkeyAction> {
        self.bindings.get(combo).copied()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
