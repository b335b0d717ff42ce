pub mod bridge;
pub mod controller;
pub mod hotkeys;
pub mod overlay_state;
pub mod presentation;
pub mod settings_store;
pub mod surface_host;
pub mod surface_watcher;
pub mod theme;

pub use controller::{ControllerTimings, OverlayController};
pub use overlay_state::OverlayState;
pub use presentation::PresentationEnforcer;
pub use settings_store::SettingsStore;
