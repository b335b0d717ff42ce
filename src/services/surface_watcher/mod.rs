//! SurfaceWatcher: наблюдение за окном оверлея и системной темой.
//!
//! Наблюдатель только сообщает о переходах (фокус, потеря фокуса, показ,
//! закрытие, смена темы) в виде `ControllerEvent::Surface`. Реакцию на них
//! выбирает контроллер.

mod dry_surface_watcher;
mod observation;
mod surface_watcher;
mod r#trait;

pub use self::r#trait::{create_surface_watcher, SurfaceWatcherTrait};
