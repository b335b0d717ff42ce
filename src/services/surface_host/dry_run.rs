use crate::error::{OverlayError, Result};
use crate::events::{SurfaceOptions, WorkArea};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::info;

use super::r#trait::SurfaceHost;

/// Наблюдаемые флаги представления поверхности
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PresentationFlags {
    pub always_on_top: bool,
    pub focused: bool,
    pub minimized: bool,
    pub ignore_mouse: bool,
    pub forward_mouse: bool,
}

/// Полное состояние эмулируемой поверхности
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SurfaceState {
    pub created: u32,
    pub options: Option<SurfaceOptions>,
    pub flags: PresentationFlags,
    /// Сколько раз уровень "поверх всех" реально менялся
    pub topmost_changes: u32,
    pub destroyed: bool,
}

/// Эмуляция оконной среды в памяти: dry-run режим и тесты
pub struct DryRunSurface {
    state: Arc<Mutex<SurfaceState>>,
    work_area: WorkArea,
}

impl DryRunSurface {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(SurfaceState::default())),
            work_area: WorkArea {
                x: 0,
                y: 0,
                width: 1920,
                height: 1080,
            },
        }
    }

    /// Общий доступ к состоянию (для наблюдения снаружи после передачи владения)
    pub fn state(&self) -> Arc<Mutex<SurfaceState>> {
        Arc::clone(&self.state)
    }

    fn live(&self) -> Result<parking_lot::MutexGuard<'_, SurfaceState>> {
        let state = self.state.lock();
        if state.destroyed {
            return Err(OverlayError::Host("Поверхность уже уничтожена".to_string()));
        }
        Ok(state)
    }
}

impl Default for DryRunSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl SurfaceHost for DryRunSurface {
    fn primary_work_area(&self) -> Result<WorkArea> {
        Ok(self.work_area)
    }

    fn create(&mut self, options: &SurfaceOptions) -> Result<()> {
        let mut state = self.state.lock();
        info!("[DRY RUN] Создание поверхности {}", options.bounds);
        state.created += 1;
        state.options = Some(*options);
        state.destroyed = false;
        state.flags = PresentationFlags {
            always_on_top: options.always_on_top,
            focused: options.focusable,
            ..PresentationFlags::default()
        };
        Ok(())
    }

    fn is_destroyed(&self) -> bool {
        self.state.lock().destroyed
    }

    fn set_always_on_top(&mut self) -> Result<()> {
        let mut state = self.live()?;
        if !state.flags.always_on_top {
            state.flags.always_on_top = true;
            state.topmost_changes += 1;
        }
        Ok(())
    }

    fn focus(&mut self) -> Result<()> {
        let mut state = self.live()?;
        state.flags.focused = true;
        Ok(())
    }

    fn set_ignore_mouse_events(&mut self, ignore: bool, forward: bool) -> Result<()> {
        let mut state = self.live()?;
        state.flags.ignore_mouse = ignore;
        state.flags.forward_mouse = ignore && forward;
        Ok(())
    }

    fn is_minimized(&self) -> Result<bool> {
        Ok(self.live()?.flags.minimized)
    }

    fn restore(&mut self) -> Result<()> {
        let mut state = self.live()?;
        state.flags.minimized = false;
        Ok(())
    }

    fn minimize(&mut self) -> Result<()> {
        let mut state = self.live()?;
        info!("[DRY RUN] Поверхность свёрнута");
        state.flags.minimized = true;
        state.flags.focused = false;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        let mut state = self.live()?;
        info!("[DRY RUN] Поверхность закрыта");
        state.destroyed = true;
        state.flags = PresentationFlags::default();
        Ok(())
    }
}
