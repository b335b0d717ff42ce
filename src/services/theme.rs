use crate::error::{OverlayError, Result};
use crate::events::{ThemeSnapshot, ThemeSource};
use tracing::debug;
use zbus::zvariant::OwnedValue;
use zbus::Connection;

const PORTAL_DESTINATION: &str = "org.freedesktop.portal.Desktop";
const PORTAL_PATH: &str = "/org/freedesktop/portal/desktop";
const PORTAL_SETTINGS: &str = "org.freedesktop.portal.Settings";

/// Значения org.freedesktop.appearance color-scheme
const COLOR_SCHEME_PREFER_DARK: u32 = 1;

/// Прочитать предпочтение тёмной темы через XDG desktop portal
pub async fn system_prefers_dark(connection: &Connection) -> Result<bool> {
    let reply = connection
        .call_method(
            Some(PORTAL_DESTINATION),
            PORTAL_PATH,
            Some(PORTAL_SETTINGS),
            "ReadOne",
            &("org.freedesktop.appearance", "color-scheme"),
        )
        .await?;

    let value: OwnedValue = reply.body().deserialize()?;
    let scheme = u32::try_from(value)
        .map_err(|e| OverlayError::Internal(format!("Неожиданный тип color-scheme: {}", e)))?;

    debug!("Системная цветовая схема: {}", scheme);
    Ok(scheme == COLOR_SCHEME_PREFER_DARK)
}

/// Снимок темы с учётом источника из конфигурации; без портала тема считается светлой
pub async fn read_theme_snapshot(connection: Option<&Connection>, source: ThemeSource) -> ThemeSnapshot {
    if source != ThemeSource::System {
        return ThemeSnapshot::resolve(source, false);
    }

    let prefers_dark = match connection {
        Some(connection) => match system_prefers_dark(connection).await {
            Ok(prefers_dark) => prefers_dark,
            Err(e) => {
                debug!("Не удалось прочитать системную тему: {}", e);
                false
            }
        },
        None => false,
    };

    ThemeSnapshot::resolve(source, prefers_dark)
}
