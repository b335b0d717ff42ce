use crate::error::Result;
use crate::events::{SurfaceOptions, WindowControl, WorkArea};
use crate::services::surface_host::SurfaceHost;
use tracing::{debug, info, warn};

/// Область по умолчанию, если оконная среда не сообщила рабочую область
const FALLBACK_WORK_AREA: WorkArea = WorkArea {
    x: 0,
    y: 0,
    width: 1920,
    height: 1080,
};

/// PresentationEnforcer владеет единственной поверхностью оверлея и
/// повторно применяет её обязательные свойства.
///
/// Responsibilities (strict):
/// - Every operation checks liveness first and silently skips on a destroyed surface.
/// - Re-assertion is idempotent and may be called arbitrarily often.
/// - Host failures are logged, never propagated to the caller.
/// - Do NOT touch overlay settings; that belongs to OverlayState.
pub struct PresentationEnforcer {
    host: Box<dyn SurfaceHost>,
    click_through: bool,
    destroyed: bool,
}

impl PresentationEnforcer {
    pub fn new(host: Box<dyn SurfaceHost>) -> Self {
        Self {
            host,
            click_through: false,
            destroyed: false,
        }
    }

    /// Создать поверхность на всю рабочую область основного дисплея
    pub fn create_surface(&mut self) -> Result<()> {
        let work_area = match self.host.primary_work_area() {
            Ok(area) => area,
            Err(e) => {
                warn!("Не удалось получить рабочую область дисплея: {}. Используется {}", e, FALLBACK_WORK_AREA);
                FALLBACK_WORK_AREA
            }
        };

        info!("Создание поверхности оверлея: {}", work_area);
        self.host.create(&SurfaceOptions::overlay(work_area))?;
        self.destroyed = false;
        self.click_through = false;

        self.reassert_topmost();
        self.refocus();
        Ok(())
    }

    pub fn is_destroyed(&mut self) -> bool {
        if !self.destroyed && self.host.is_destroyed() {
            info!("Оконная среда сообщила об уничтожении поверхности");
            self.destroyed = true;
        }
        self.destroyed
    }

    /// Поверхность закрывается: дальнейшие операции становятся no-op
    pub fn mark_destroyed(&mut self) {
        if !self.destroyed {
            info!("Поверхность оверлея помечена как уничтоженная");
        }
        self.destroyed = true;
    }

    pub fn click_through_enabled(&self) -> bool {
        self.click_through
    }

    fn guarded<F>(&mut self, operation: &str, f: F) -> bool
    where
        F: FnOnce(&mut dyn SurfaceHost) -> Result<()>,
    {
        if self.is_destroyed() {
            debug!("Пропуск '{}': поверхность уничтожена", operation);
            return false;
        }

        match f(self.host.as_mut()) {
            Ok(()) => true,
            Err(e) => {
                debug!("Операция '{}' не выполнена: {}", operation, e);
                // Ошибка могла означать исчезновение окна
                self.is_destroyed();
                false
            }
        }
    }

    pub fn reassert_topmost(&mut self) -> bool {
        self.guarded("always-on-top", |host| host.set_always_on_top())
    }

    pub fn refocus(&mut self) -> bool {
        self.guarded("focus", |host| host.focus())
    }

    /// Фокус получен: только "поверх всех"
    pub fn on_focus(&mut self) {
        self.reassert_topmost();
    }

    /// Истекла задержка после потери фокуса: вернуть фокус и уровень
    pub fn on_blur_settled(&mut self) {
        self.reassert_topmost();
        self.refocus();
    }

    pub fn on_show(&mut self) {
        self.reassert_topmost();
        self.refocus();
    }

    pub fn set_click_through(&mut self, ignore: bool, forward: bool) -> bool {
        let applied = self.guarded("set-ignore-mouse-events", |host| {
            host.set_ignore_mouse_events(ignore, forward)
        });
        if applied {
            self.click_through = ignore;
            debug!("Сквозной режим мыши: {} (forward: {})", ignore, forward);
        } else if !self.destroyed {
            warn!("Не удалось переключить сквозной режим мыши (ignore: {}), остаётся {}", ignore, self.click_through);
        }
        applied
    }

    /// Повторный запуск приложения: развернуть, сфокусировать, поднять
    pub fn restore_and_raise(&mut self) {
        let minimized = !self.is_destroyed() && self.host.is_minimized().unwrap_or(false);
        if minimized {
            self.guarded("restore", |host| host.restore());
        }
        self.refocus();
        self.reassert_topmost();
    }

    pub fn window_control(&mut self, action: WindowControl) {
        match action {
            WindowControl::Minimize => {
                self.guarded("minimize", |host| host.minimize());
            }
            WindowControl::Close => {
                self.guarded("close", |host| host.close());
            }
        }
    }
}
