pub mod bridge;
pub mod hotkey;
pub mod keyboard;
pub mod window;

pub use bridge::{InboundMessage, OutboundMessage, SettingsSnapshot, WindowControl};
pub use hotkey::HotkeyAction;
pub use keyboard::{KeyCode, KeyCombo, KeyEvent, KeyState, Modifiers};
pub use window::{SurfaceEvent, SurfaceOptions, ThemeSnapshot, ThemeSource, WorkArea};

/// Единый поток событий, который обрабатывает цикл контроллера.
///
/// Все источники (горячие клавиши, оконная среда, рендерер, второй экземпляр,
/// отложенные таймеры) только отправляют эти события; состояние меняет
/// исключительно контроллер, строго по одному событию за раз.
#[derive(Debug, Clone, PartialEq)]
pub enum ControllerEvent {
    Hotkey(HotkeyAction),
    Surface(SurfaceEvent),
    Inbound(InboundMessage),
    /// Рендерер (пере)подключился и ждёт полный снимок
    RendererConnected,
    SecondInstance,
    /// Истекла задержка после потери фокуса
    BlurSettled,
    /// Истекла задержка включения сквозного режима после создания
    EnableClickThrough,
    Shutdown,
}

impl ControllerEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            ControllerEvent::Hotkey(_) => "hotkey",
            ControllerEvent::Surface(_) => "surface",
            ControllerEvent::Inbound(_) => "inbound",
            ControllerEvent::RendererConnected => "renderer-connected",
            ControllerEvent::SecondInstance => "second-instance",
            ControllerEvent::BlurSettled => "blur-settled",
            ControllerEvent::EnableClickThrough => "enable-click-through",
            ControllerEvent::Shutdown => "shutdown",
        }
    }
}
