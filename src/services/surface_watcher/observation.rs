use crate::events::SurfaceEvent;

/// Наблюдаемое состояние окна оверлея на момент опроса
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WindowObservation {
    pub exists: bool,
    pub active: bool,
    pub hidden: bool,
}

impl WindowObservation {
    pub fn missing() -> Self {
        Self::default()
    }
}

/// Переходы между двумя опросами в терминах событий поверхности
pub fn transitions(previous: WindowObservation, current: WindowObservation) -> Vec<SurfaceEvent> {
    let mut events = Vec::new();

    if previous.exists && !current.exists {
        events.push(SurfaceEvent::Close);
        return events;
    }
    if !current.exists {
        return events;
    }

    if previous.hidden && !current.hidden {
        events.push(SurfaceEvent::Show);
    }
    if current.active && !previous.active {
        events.push(SurfaceEvent::Focus);
    }
    if previous.active && !current.active {
        events.push(SurfaceEvent::Blur);
    }

    events
}
