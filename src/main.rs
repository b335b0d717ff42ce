use anyhow::Result;
use clap::Parser;
use tokio::signal;
use tokio::signal::unix::{signal as unix_signal, SignalKind};
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use zbus::Connection;
mod config;
mod error;
mod events;
pub mod mappings;
mod services;
mod settings;
mod utils;

use config::Config;
use events::ControllerEvent;
use services::bridge::{Bridge, BridgeServer};
use services::hotkeys::{create_hotkey_listener, HotkeyRegistry};
use services::surface_host::create_surface_host;
use services::surface_watcher::create_surface_watcher;
use services::theme::read_theme_snapshot;
use services::{ControllerTimings, OverlayController, OverlayState, PresentationEnforcer, SettingsStore};
use utils::single_instance::{self, InstanceRole};

#[derive(Parser, Debug)]
#[command(name = "reading-overlay")]
#[command(about = "Прозрачная линейка для чтения поверх всех окон, управляемая горячими клавишами")]
struct Args {
    /// Путь к файлу конфигурации
    #[arg(short, long, default_value = "overlay.toml")]
    config: String,

    /// Режим сухого запуска (эмуляция оконной среды, горячие клавиши из stdin)
    #[arg(long)]
    dry_run: bool,

    /// Уровень логирования (перекрывает logging.level)
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = Config::load(&args.config)?;

    let level = args.log_level.as_deref().unwrap_or(&config.logging.level);
    init_tracing(level, &config.logging.format)?;
    install_panic_hook();

    info!("Запуск Reading Overlay v{}", env!("CARGO_PKG_VERSION"));
    info!("Конфигурация загружена из: {}", args.config);

    if args.dry_run {
        warn!("Режим сухого запуска - оконная среда эмулируется");
    }

    // Второй экземпляр только будит первый и завершается
    let instance_guard = match single_instance::acquire(&config.instance_socket_path()).await? {
        InstanceRole::Primary(guard) => guard,
        InstanceRole::Secondary => {
            info!("Активирован уже запущенный экземпляр, завершение");
            return Ok(());
        }
    };

    if !args.dry_run {
        utils::permissions::check_permissions()?;
    }

    let dbus = if args.dry_run {
        None
    } else {
        match Connection::session().await {
            Ok(connection) => Some(connection),
            Err(e) => {
                warn!("Сессионная шина D-Bus недоступна: {}", e);
                None
            }
        }
    };
    let theme = read_theme_snapshot(dbus.as_ref(), config.window.theme_source).await;
    info!("Системная тема: {}", theme);

    let (events_tx, events_rx) = mpsc::unbounded_channel::<ControllerEvent>();
    let registry = HotkeyRegistry::shared();
    let bridge = Bridge::new();

    let store = SettingsStore::new(config.settings_path());
    info!("Файл настроек: {:?}", store.path());

    let controller = OverlayController::new(
        OverlayState::load(store),
        PresentationEnforcer::new(create_surface_host(&config, args.dry_run)),
        bridge.clone(),
        registry.clone(),
        theme,
        events_tx.clone(),
        ControllerTimings::from_config(&config),
    );

    let bridge_handle = BridgeServer::bind(&config.bridge_socket_path(), bridge, events_tx.clone())?.serve();
    let instance_handle = instance_guard.serve(events_tx.clone());

    // Поиск окна рендерера блокирует поток до его появления
    let controller = controller.start_blocking().await?;

    let hotkey_listener = create_hotkey_listener(&config, registry, events_tx.clone(), args.dry_run)?;
    let surface_watcher = create_surface_watcher(&config, events_tx.clone(), dbus, theme, args.dry_run);

    info!("Все компоненты инициализированы");

    let hotkey_handle = tokio::spawn(async move {
        if let Err(e) = hotkey_listener.run().await {
            error!("Ошибка в HotkeyListener: {}", e);
        }
    });
    let watcher_handle = tokio::spawn(async move {
        if let Err(e) = surface_watcher.run().await {
            error!("Ошибка в SurfaceWatcher: {}", e);
        }
    });
    let mut controller_handle = tokio::spawn(controller.run(events_rx));

    info!("Все сервисы запущены");

    let mut terminate = unix_signal(SignalKind::terminate())?;
    let controller_finished = tokio::select! {
        result = &mut controller_handle => {
            log_controller_result(result);
            true
        }
        result = signal::ctrl_c() => {
            match result {
                Ok(()) => info!("Получен сигнал завершения (Ctrl+C)"),
                Err(err) => error!("Ошибка при ожидании сигнала завершения: {}", err),
            }
            false
        }
        _ = terminate.recv() => {
            info!("Получен сигнал SIGTERM");
            false
        }
    };

    info!("Завершение работы...");

    if !controller_finished {
        // Контроллер сам снимает горячие клавиши и сохраняет настройки
        let _ = events_tx.send(ControllerEvent::Shutdown);
        match tokio::time::timeout(tokio::time::Duration::from_secs(5), controller_handle).await {
            Ok(result) => log_controller_result(result),
            Err(_) => warn!("Таймаут при остановке контроллера"),
        }
    }

    hotkey_handle.abort();
    watcher_handle.abort();
    bridge_handle.abort();
    instance_handle.abort();

    let shutdown_timeout = tokio::time::Duration::from_secs(5);
    let shutdown_result = tokio::time::timeout(shutdown_timeout, async {
        let _ = hotkey_handle.await;
        let _ = watcher_handle.await;
        let _ = bridge_handle.await;
        let _ = instance_handle.await;
    })
    .await;

    match shutdown_result {
        Ok(_) => info!("Все сервисы завершили работу корректно"),
        Err(_) => warn!("Таймаут при завершении сервисов"),
    }

    info!("Reading Overlay завершил работу");
    Ok(())
}

fn log_controller_result(result: std::result::Result<error::Result<()>, tokio::task::JoinError>) {
    match result {
        Ok(Ok(())) => info!("Контроллер остановлен"),
        Ok(Err(e)) => error!("Ошибка в контроллере: {}", e),
        Err(e) => error!("Задача контроллера завершилась аварийно: {}", e),
    }
}

fn init_tracing(level: &str, format: &str) -> Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?;

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        "pretty" => registry.with(tracing_subscriber::fmt::layer().pretty()).init(),
        _ => registry.with(tracing_subscriber::fmt::layer().compact()).init(),
    }

    Ok(())
}

/// Паника в любой задаче попадает в лог, а не только в stderr
fn install_panic_hook() {
    std::panic::set_hook(Box::new(|panic_info| {
        error!("Паника: {}", panic_info);
    }));
}
