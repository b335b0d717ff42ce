//! SurfaceHost: возможности оконной среды, которыми пользуется оверлей
//!
//! Модули здесь отвечают ТОЛЬКО за выполнение операций над единственной
//! поверхностью оверлея (геометрия, "поверх всех", фокус, сквозной режим,
//! сворачивание). Решения о том, когда и что повторно применять, принимает
//! PresentationEnforcer.

mod dry_run;
mod r#trait;
mod x11;

pub use self::dry_run::{DryRunSurface, SurfaceState};
pub use self::r#trait::{create_surface_host, SurfaceHost};
pub(crate) use self::x11::exact_title_pattern;
