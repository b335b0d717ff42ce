use crate::config::Config;
use crate::error::Result;
use crate::events::{SurfaceOptions, WorkArea};

/// Операции оконной среды над поверхностью оверлея.
///
/// Методы синхронные и быстрые: цикл контроллера вызывает их по одному.
pub trait SurfaceHost: Send {
    /// Полезная область основного дисплея
    fn primary_work_area(&self) -> Result<WorkArea>;

    /// Создать (или привязаться к) поверхность с заданными параметрами
    fn create(&mut self, options: &SurfaceOptions) -> Result<()>;

    /// Поверхность уничтожена; после этого любые операции бессмысленны
    fn is_destroyed(&self) -> bool;

    /// Поверх всех окон с наивысшим уровнем
    fn set_always_on_top(&mut self) -> Result<()>;

    fn focus(&mut self) -> Result<()>;

    fn set_ignore_mouse_events(&mut self, ignore: bool, forward: bool) -> Result<()>;

    fn is_minimized(&self) -> Result<bool>;

    fn restore(&mut self) -> Result<()>;

    fn minimize(&mut self) -> Result<()>;

    fn close(&mut self) -> Result<()>;
}

/// Factory function to create an appropriate surface host based on the dry_run flag
pub fn create_surface_host(config: &Config, dry_run: bool) -> Box<dyn SurfaceHost> {
    if dry_run {
        Box::new(super::dry_run::DryRunSurface::new())
    } else {
        Box::new(super::x11::X11Surface::new(&config.window.title))
    }
}
