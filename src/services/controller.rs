use crate::config::Config;
use crate::error::{OverlayError, Result};
use crate::events::{
    ControllerEvent, HotkeyAction, InboundMessage, OutboundMessage, SettingsSnapshot, SurfaceEvent,
    ThemeSnapshot, WindowControl,
};
use crate::services::bridge::Bridge;
use crate::services::hotkeys::SharedRegistry;
use crate::services::{OverlayState, PresentationEnforcer};
use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::Duration;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};
use tracing::{debug, error, info};

/// Задержки и период повторного применения свойств поверхности
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerTimings {
    pub reassert_interval: Duration,
    pub blur_refocus_delay: Duration,
    pub click_through_delay: Duration,
}

impl ControllerTimings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            reassert_interval: config.reassert_interval(),
            blur_refocus_delay: config.blur_refocus_delay(),
            click_through_delay: config.click_through_delay(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Единственный писатель состояния оверлея.
///
/// Responsibilities (strict):
/// - Events are handled one at a time, in arrival order.
/// - Per event: mutation, then presentation, then outbound message, then persistence.
/// - A panic inside a handler is logged and the loop moves on to the next event.
pub struct OverlayController {
    state: OverlayState,
    enforcer: PresentationEnforcer,
    bridge: Bridge,
    registry: SharedRegistry,
    theme: ThemeSnapshot,
    events: UnboundedSender<ControllerEvent>,
    timings: ControllerTimings,
    stopped: bool,
}

impl OverlayController {
    pub fn new(
        state: OverlayState,
        enforcer: PresentationEnforcer,
        bridge: Bridge,
        registry: SharedRegistry,
        theme: ThemeSnapshot,
        events: UnboundedSender<ControllerEvent>,
        timings: ControllerTimings,
    ) -> Self {
        Self {
            state,
            enforcer,
            bridge,
            registry,
            theme,
            events,
            timings,
            stopped: false,
        }
    }

    /// Создать поверхность, зарегистрировать горячие клавиши, отправить снимок
    pub fn start(&mut self) -> Result<()> {
        info!("Загружены настройки: {:?}", self.state.get());

        self.enforcer.create_surface()?;
        self.schedule(self.timings.click_through_delay, ControllerEvent::EnableClickThrough);

        self.registry.write().register_defaults();
        self.send_snapshot();
        Ok(())
    }

    /// `start` в пуле блокирующих задач: поиск окна рендерера может ждать его появления
    pub async fn start_blocking(mut self) -> Result<Self> {
        tokio::task::spawn_blocking(move || {
            self.start()?;
            Ok(self)
        })
        .await
        .map_err(|e| OverlayError::Internal(format!("Запуск контроллера прерван: {}", e)))?
    }

    pub async fn run(mut self, mut events: UnboundedReceiver<ControllerEvent>) -> Result<()> {
        let period = self.timings.reassert_interval;
        let mut ticker = Some(interval_at(Instant::now() + period, period));
        if let Some(ticker) = ticker.as_mut() {
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        }
        info!("Контроллер запущен (период повторного применения: {:?})", period);

        loop {
            tokio::select! {
                event = events.recv() => {
                    let Some(event) = event else {
                        info!("Все источники событий закрыты");
                        break;
                    };
                    if self.dispatch(event) == Flow::Quit {
                        break;
                    }
                }
                _ = next_tick(&mut ticker) => {
                    self.on_tick();
                }
            }

            if ticker.is_some() && self.enforcer.is_destroyed() {
                info!("Поверхность уничтожена, периодическое повторное применение остановлено");
                ticker = None;
            }
        }

        self.shutdown();
        Ok(())
    }

    /// Обработать одно событие, изолируя панику обработчика
    pub fn dispatch(&mut self, event: ControllerEvent) -> Flow {
        let kind = event.kind();
        debug!("Событие контроллера: {}", kind);

        match catch_unwind(AssertUnwindSafe(|| self.handle_event(event))) {
            Ok(flow) => flow,
            Err(payload) => {
                error!("Сбой при обработке события {}: {}", kind, panic_message(payload.as_ref()));
                Flow::Continue
            }
        }
    }

    fn handle_event(&mut self, event: ControllerEvent) -> Flow {
        match event {
            ControllerEvent::Hotkey(action) => self.handle_hotkey(action),
            ControllerEvent::Surface(event) => self.handle_surface(event),
            ControllerEvent::Inbound(message) => self.handle_inbound(message),
            ControllerEvent::RendererConnected => {
                self.send_snapshot();
                Flow::Continue
            }
            ControllerEvent::SecondInstance => {
                self.enforcer.restore_and_raise();
                Flow::Continue
            }
            ControllerEvent::BlurSettled => {
                self.enforcer.on_blur_settled();
                Flow::Continue
            }
            ControllerEvent::EnableClickThrough => {
                self.enforcer.set_click_through(true, true);
                Flow::Continue
            }
            ControllerEvent::Shutdown => Flow::Quit,
        }
    }

    fn handle_hotkey(&mut self, action: HotkeyAction) -> Flow {
        let Some(next) = action.apply(&self.state.get()) else {
            info!("Горячая клавиша завершения");
            return Flow::Quit;
        };

        let applied = self.state.set(next);
        if !applied.changed() {
            debug!("{}: значение уже на границе диапазона", action);
        }
        self.enforcer.reassert_topmost();
        if let Some(message) = action.delta(&applied.current) {
            self.bridge.send(message);
        }
        self.state.save();
        Flow::Continue
    }

    fn handle_surface(&mut self, event: SurfaceEvent) -> Flow {
        match event {
            SurfaceEvent::Focus => self.enforcer.on_focus(),
            SurfaceEvent::Blur => {
                self.schedule(self.timings.blur_refocus_delay, ControllerEvent::BlurSettled);
            }
            SurfaceEvent::Show => self.enforcer.on_show(),
            SurfaceEvent::Close => {
                info!("Поверхность оверлея закрывается");
                self.state.save();
                self.enforcer.mark_destroyed();
                return Flow::Quit;
            }
            SurfaceEvent::ThemeUpdated(theme) => {
                self.theme = theme;
                self.bridge.send(OutboundMessage::SystemThemeChanged(theme));
            }
        }
        Flow::Continue
    }

    fn handle_inbound(&mut self, message: InboundMessage) -> Flow {
        match message {
            InboundMessage::UpdateSettings(patch) => {
                let applied = self.state.apply(&patch);
                if applied.adjusted {
                    // Рендерер прислал значение вне диапазона: вернуть ему действующее
                    self.send_snapshot();
                }
                self.state.save();
            }
            InboundMessage::SetIgnoreMouseEvents(request) => {
                if self.enforcer.click_through_enabled() == request.ignore {
                    debug!("Сквозной режим уже {}", request.ignore);
                }
                self.enforcer.set_click_through(request.ignore, request.forward());
            }
            InboundMessage::WindowControl(WindowControl::Minimize) => {
                self.enforcer.window_control(WindowControl::Minimize);
            }
            InboundMessage::WindowControl(WindowControl::Close) => {
                info!("Рендерер запросил закрытие оверлея");
                self.state.save();
                self.enforcer.window_control(WindowControl::Close);
                self.enforcer.mark_destroyed();
                return Flow::Quit;
            }
        }
        Flow::Continue
    }

    fn on_tick(&mut self) {
        if self.enforcer.is_destroyed() {
            return;
        }
        self.enforcer.reassert_topmost();
        self.bridge.send(OutboundMessage::ForceAlwaysOnTop);
    }

    fn send_snapshot(&self) {
        self.bridge.send(OutboundMessage::LoadSettings(SettingsSnapshot {
            settings: self.state.get(),
            system_theme: self.theme,
        }));
    }

    /// Отложенное действие возвращается в общую очередь событий
    fn schedule(&self, delay: Duration, event: ControllerEvent) {
        let events = self.events.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = events.send(event);
        });
    }

    /// Снять горячие клавиши, сохранить настройки и закрыть поверхность;
    /// повторный вызов ничего не делает
    pub fn shutdown(&mut self) {
        if self.stopped {
            return;
        }
        self.stopped = true;

        info!("Остановка контроллера...");
        self.registry.write().unregister_all();
        if self.state.save() {
            info!("Настройки сохранены");
        }

        // Уже закрытая поверхность пропускается проверкой в enforcer
        self.enforcer.window_control(WindowControl::Close);
        self.enforcer.mark_destroyed();
    }
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "неизвестная паника".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::bridge::IgnoreMouseEvents;
    use crate::events::ThemeSource;
    use crate::services::hotkeys::HotkeyRegistry;
    use crate::events::{SurfaceOptions, WorkArea};
    use crate::services::surface_host::{DryRunSurface, SurfaceHost, SurfaceState};
    use crate::services::SettingsStore;
    use crate::settings::{OverlaySettings, SettingsPatch};
    use parking_lot::Mutex;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use tokio::sync::{broadcast, mpsc};

    struct Harness {
        controller: OverlayController,
        surface: Arc<Mutex<SurfaceState>>,
        outbound: broadcast::Receiver<OutboundMessage>,
        events: mpsc::UnboundedReceiver<ControllerEvent>,
        registry: SharedRegistry,
        path: PathBuf,
        _dir: tempfile::TempDir,
    }

    impl Harness {
        fn drain(&mut self) -> Vec<OutboundMessage> {
            let mut messages = Vec::new();
            while let Ok(message) = self.outbound.try_recv() {
                messages.push(message);
            }
            messages
        }

        fn persisted(&self) -> OverlaySettings {
            SettingsStore::new(&self.path).load()
        }
    }

    fn timings() -> ControllerTimings {
        ControllerTimings {
            reassert_interval: Duration::from_millis(50),
            blur_refocus_delay: Duration::from_millis(10),
            click_through_delay: Duration::from_millis(10),
        }
    }

    /// Эмулируемая поверхность с управляемыми сбоями
    struct FaultyHost {
        inner: DryRunSurface,
        panic_on_topmost: Arc<AtomicBool>,
        create_delay: Duration,
    }

    impl FaultyHost {
        fn new(inner: DryRunSurface) -> Self {
            Self {
                inner,
                panic_on_topmost: Arc::new(AtomicBool::new(false)),
                create_delay: Duration::ZERO,
            }
        }
    }

    impl SurfaceHost for FaultyHost {
        fn primary_work_area(&self) -> Result<WorkArea> {
            self.inner.primary_work_area()
        }

        fn create(&mut self, options: &SurfaceOptions) -> Result<()> {
            std::thread::sleep(self.create_delay);
            self.inner.create(options)
        }

        fn is_destroyed(&self) -> bool {
            self.inner.is_destroyed()
        }

        fn set_always_on_top(&mut self) -> Result<()> {
            if self.panic_on_topmost.swap(false, Ordering::SeqCst) {
                panic!("оконная среда отказала");
            }
            self.inner.set_always_on_top()
        }

        fn focus(&mut self) -> Result<()> {
            self.inner.focus()
        }

        fn set_ignore_mouse_events(&mut self, ignore: bool, forward: bool) -> Result<()> {
            self.inner.set_ignore_mouse_events(ignore, forward)
        }

        fn is_minimized(&self) -> Result<bool> {
            self.inner.is_minimized()
        }

        fn restore(&mut self) -> Result<()> {
            self.inner.restore()
        }

        fn minimize(&mut self) -> Result<()> {
            self.inner.minimize()
        }

        fn close(&mut self) -> Result<()> {
            self.inner.close()
        }
    }

    fn harness(initial: Option<OverlaySettings>) -> Harness {
        let surface = DryRunSurface::new();
        let surface_state = surface.state();
        harness_on(initial, Box::new(surface), surface_state)
    }

    fn harness_on(
        initial: Option<OverlaySettings>,
        host: Box<dyn SurfaceHost>,
        surface_state: Arc<Mutex<SurfaceState>>,
    ) -> Harness {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        if let Some(initial) = initial {
            assert!(SettingsStore::new(&path).save(&initial));
        }

        let bridge = Bridge::new();
        let outbound = bridge.subscribe();
        let registry = HotkeyRegistry::shared();
        let (tx, rx) = mpsc::unbounded_channel();

        let mut controller = OverlayController::new(
            OverlayState::load(SettingsStore::new(&path)),
            PresentationEnforcer::new(host),
            bridge,
            registry.clone(),
            ThemeSnapshot::resolve(ThemeSource::Dark, false),
            tx,
            timings(),
        );
        controller.start().unwrap();

        let mut harness = Harness {
            controller,
            surface: surface_state,
            outbound,
            events: rx,
            registry,
            path,
            _dir: dir,
        };
        harness.drain();
        harness
    }

    #[tokio::test]
    async fn test_start_registers_and_sends_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let bridge = Bridge::new();
        let mut outbound = bridge.subscribe();
        let registry = HotkeyRegistry::shared();
        let (tx, _rx) = mpsc::unbounded_channel();

        let mut controller = OverlayController::new(
            OverlayState::load(SettingsStore::new(dir.path().join("settings.json"))),
            PresentationEnforcer::new(Box::new(DryRunSurface::new())),
            bridge,
            registry.clone(),
            ThemeSnapshot::resolve(ThemeSource::Dark, false),
            tx,
            timings(),
        );
        controller.start().unwrap();

        assert_eq!(registry.read().len(), 7);
        match outbound.try_recv().unwrap() {
            OutboundMessage::LoadSettings(snapshot) => {
                assert_eq!(snapshot.settings, OverlaySettings::default());
                assert!(snapshot.system_theme.should_use_dark_colors);
            }
            other => panic!("ожидался снимок, получено {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_opacity_steps_persist_across_reload() {
        let mut h = harness(None);

        for _ in 0..3 {
            assert_eq!(
                h.controller.dispatch(ControllerEvent::Hotkey(HotkeyAction::IncreaseOpacity)),
                Flow::Continue
            );
        }

        assert_eq!(
            h.drain(),
            vec![
                OutboundMessage::AdjustOpacity(0.55),
                OutboundMessage::AdjustOpacity(0.6),
                OutboundMessage::AdjustOpacity(0.65),
            ]
        );
        assert_eq!(h.persisted().opacity, 0.65);
        assert!(h.surface.lock().flags.always_on_top);
    }

    #[tokio::test]
    async fn test_opacity_saturates_at_max() {
        let mut h = harness(Some(OverlaySettings {
            opacity: 0.98,
            ..Default::default()
        }));

        h.controller.dispatch(ControllerEvent::Hotkey(HotkeyAction::IncreaseOpacity));
        h.controller.dispatch(ControllerEvent::Hotkey(HotkeyAction::IncreaseOpacity));

        assert_eq!(
            h.drain(),
            vec![OutboundMessage::AdjustOpacity(1.0), OutboundMessage::AdjustOpacity(1.0)]
        );
        assert_eq!(h.persisted().opacity, 1.0);
    }

    #[tokio::test]
    async fn test_line_height_floor_is_never_crossed() {
        let mut h = harness(Some(OverlaySettings {
            line_height: 20,
            ..Default::default()
        }));

        h.controller.dispatch(ControllerEvent::Hotkey(HotkeyAction::DecreaseLineHeight));

        assert_eq!(h.drain(), vec![OutboundMessage::AdjustLineHeight(20)]);
        assert_eq!(h.persisted().line_height, 20);
    }

    #[tokio::test]
    async fn test_second_instance_restores_minimized_surface() {
        let mut h = harness(None);
        h.controller.dispatch(ControllerEvent::Inbound(InboundMessage::WindowControl(
            WindowControl::Minimize,
        )));
        h.surface.lock().flags.always_on_top = false;
        assert!(h.surface.lock().flags.minimized);

        h.controller.dispatch(ControllerEvent::SecondInstance);

        let flags = h.surface.lock().flags;
        assert!(!flags.minimized);
        assert!(flags.focused);
        assert!(flags.always_on_top);
        assert_eq!(h.surface.lock().created, 1);
    }

    #[tokio::test]
    async fn test_out_of_range_patch_is_clamped_and_resent() {
        let mut h = harness(None);

        h.controller.dispatch(ControllerEvent::Inbound(InboundMessage::UpdateSettings(
            SettingsPatch {
                line_height: Some(1000),
                show_footer: Some(true),
                ..Default::default()
            },
        )));

        let persisted = h.persisted();
        assert_eq!(persisted.line_height, 300);
        assert!(persisted.show_footer);

        match h.drain().as_slice() {
            [OutboundMessage::LoadSettings(snapshot)] => assert_eq!(snapshot.settings.line_height, 300),
            other => panic!("ожидался снимок, получено {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_in_range_patch_is_persisted_silently() {
        let mut h = harness(None);

        h.controller.dispatch(ControllerEvent::Inbound(InboundMessage::UpdateSettings(
            SettingsPatch {
                opacity: Some(0.3),
                ..Default::default()
            },
        )));

        assert!(h.drain().is_empty());
        assert_eq!(h.persisted().opacity, 0.3);
    }

    #[tokio::test]
    async fn test_close_persists_then_ignores_surface() {
        let mut h = harness(None);
        h.controller.dispatch(ControllerEvent::Hotkey(HotkeyAction::ToggleColor));

        assert_eq!(h.controller.dispatch(ControllerEvent::Surface(SurfaceEvent::Close)), Flow::Quit);
        assert!(!h.persisted().is_black);

        h.controller.dispatch(ControllerEvent::Surface(SurfaceEvent::Show));
        h.controller.dispatch(ControllerEvent::SecondInstance);
        h.controller.on_tick();
        assert_eq!(h.surface.lock().created, 1);
    }

    #[tokio::test]
    async fn test_blur_schedules_refocus() {
        let mut h = harness(None);
        h.surface.lock().flags.focused = false;

        h.controller.dispatch(ControllerEvent::Surface(SurfaceEvent::Blur));
        assert!(!h.surface.lock().flags.focused);

        // Первым приходит включение сквозного режима, запланированное при старте
        loop {
            let event = tokio::time::timeout(Duration::from_secs(2), h.events.recv())
                .await
                .unwrap()
                .unwrap();
            let settled = event == ControllerEvent::BlurSettled;
            h.controller.dispatch(event);
            if settled {
                break;
            }
        }

        assert!(h.surface.lock().flags.focused);
        assert!(h.surface.lock().flags.always_on_top);
    }

    #[tokio::test]
    async fn test_click_through_requests() {
        let mut h = harness(None);

        h.controller.dispatch(ControllerEvent::EnableClickThrough);
        assert!(h.surface.lock().flags.ignore_mouse);

        h.controller.dispatch(ControllerEvent::Inbound(InboundMessage::SetIgnoreMouseEvents(
            IgnoreMouseEvents {
                ignore: false,
                options: None,
            },
        )));
        assert!(!h.surface.lock().flags.ignore_mouse);
    }

    #[tokio::test]
    async fn test_tick_reasserts_and_pings() {
        let mut h = harness(None);
        h.surface.lock().flags.always_on_top = false;

        h.controller.on_tick();

        assert!(h.surface.lock().flags.always_on_top);
        assert_eq!(h.drain(), vec![OutboundMessage::ForceAlwaysOnTop]);
    }

    #[tokio::test]
    async fn test_theme_update_is_forwarded_and_kept_for_snapshots() {
        let mut h = harness(None);
        let light = ThemeSnapshot::resolve(ThemeSource::System, false);

        h.controller.dispatch(ControllerEvent::Surface(SurfaceEvent::ThemeUpdated(light)));
        h.controller.dispatch(ControllerEvent::RendererConnected);

        let messages = h.drain();
        assert_eq!(messages[0], OutboundMessage::SystemThemeChanged(light));
        match &messages[1] {
            OutboundMessage::LoadSettings(snapshot) => assert_eq!(snapshot.system_theme, light),
            other => panic!("ожидался снимок, получено {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_quit_hotkey_unregisters_and_saves() {
        let h = harness(None);
        let registry = h.registry.clone();
        let path = h.path.clone();
        let surface = Arc::clone(&h.surface);
        let (tx, rx) = mpsc::unbounded_channel();

        tx.send(ControllerEvent::Hotkey(HotkeyAction::DecreaseOpacity)).unwrap();
        tx.send(ControllerEvent::Hotkey(HotkeyAction::Quit)).unwrap();

        tokio::time::timeout(Duration::from_secs(2), h.controller.run(rx))
            .await
            .unwrap()
            .unwrap();

        assert!(registry.read().is_empty());
        assert_eq!(SettingsStore::new(&path).load().opacity, 0.45);
        assert!(surface.lock().destroyed);
    }

    #[tokio::test]
    async fn test_shutdown_after_close_does_not_touch_surface() {
        let mut h = harness(None);
        h.controller.dispatch(ControllerEvent::Surface(SurfaceEvent::Close));
        h.surface.lock().destroyed = false;

        h.controller.shutdown();
        h.controller.shutdown();

        assert!(!h.surface.lock().destroyed);
        assert!(h.registry.read().is_empty());
    }

    #[tokio::test]
    async fn test_panicking_handler_does_not_stop_loop() {
        let surface = DryRunSurface::new();
        let surface_state = surface.state();
        let host = FaultyHost::new(surface);
        let panic_on_topmost = Arc::clone(&host.panic_on_topmost);
        let mut h = harness_on(None, Box::new(host), surface_state);

        panic_on_topmost.store(true, Ordering::SeqCst);
        assert_eq!(
            h.controller.dispatch(ControllerEvent::Hotkey(HotkeyAction::IncreaseOpacity)),
            Flow::Continue
        );
        assert!(!panic_on_topmost.load(Ordering::SeqCst));

        assert_eq!(
            h.controller.dispatch(ControllerEvent::Hotkey(HotkeyAction::IncreaseOpacity)),
            Flow::Continue
        );

        assert_eq!(h.drain(), vec![OutboundMessage::AdjustOpacity(0.6)]);
        assert_eq!(h.persisted().opacity, 0.6);
        assert!(h.surface.lock().flags.always_on_top);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticker_stops_once_surface_is_destroyed() {
        let mut h = harness(None);
        let period = timings().reassert_interval;
        let (tx, rx) = mpsc::unbounded_channel();
        let run = tokio::spawn(h.controller.run(rx));

        tokio::time::sleep(period * 2 + period / 2).await;
        let mut before = Vec::new();
        while let Ok(message) = h.outbound.try_recv() {
            before.push(message);
        }
        assert_eq!(before, vec![OutboundMessage::ForceAlwaysOnTop; 2]);

        h.surface.lock().destroyed = true;
        tx.send(ControllerEvent::Hotkey(HotkeyAction::ToggleColor)).unwrap();
        tokio::time::sleep(period * 10).await;

        drop(tx);
        run.await.unwrap().unwrap();

        let mut after = Vec::new();
        while let Ok(message) = h.outbound.try_recv() {
            after.push(message);
        }
        assert_eq!(after, vec![OutboundMessage::ToggleColor(false)]);
    }

    #[tokio::test]
    async fn test_start_blocking_keeps_runtime_responsive() {
        let dir = tempfile::tempdir().unwrap();
        let mut host = FaultyHost::new(DryRunSurface::new());
        host.create_delay = Duration::from_millis(300);
        let (tx, _rx) = mpsc::unbounded_channel();
        let registry = HotkeyRegistry::shared();

        let controller = OverlayController::new(
            OverlayState::load(SettingsStore::new(dir.path().join("settings.json"))),
            PresentationEnforcer::new(Box::new(host)),
            Bridge::new(),
            registry.clone(),
            ThemeSnapshot::resolve(ThemeSource::Dark, false),
            tx,
            timings(),
        );

        let started_at = std::time::Instant::now();
        let (controller, side_task_elapsed) = tokio::join!(controller.start_blocking(), async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            started_at.elapsed()
        });

        assert!(controller.is_ok());
        assert!(side_task_elapsed < Duration::from_millis(300));
        assert_eq!(registry.read().len(), 7);
    }

    #[test]
    fn test_panic_message_extraction() {
        let payload = catch_unwind(|| panic!("сбой")).unwrap_err();
        assert_eq!(panic_message(payload.as_ref()), "сбой");
    }
}
