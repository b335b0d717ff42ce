mod actions;
mod dry_hotkey_listener;
mod hotkey_listener;
mod modifier_state;
mod registry;
mod r#trait;

pub use self::registry::{HotkeyRegistry, SharedRegistry};
pub use self::r#trait::{create_hotkey_listener, HotkeyListenerTrait};
