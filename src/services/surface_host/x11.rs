use crate::error::{OverlayError, Result};
use crate::events::{SurfaceOptions, WorkArea};
use crate::overlay_error;
use std::fmt::Display;
use std::process::Command;
use std::time::Duration;
use tracing::{debug, info, warn};
use x11rb::connection::Connection;
use x11rb::protocol::shape::SK;
use x11rb::protocol::xfixes::ConnectionExt as _;
use x11rb::rust_connection::RustConnection;

use super::r#trait::SurfaceHost;

/// Окно рендерера может появиться позже контроллера
const WINDOW_SEARCH_ATTEMPTS: u32 = 20;
const WINDOW_SEARCH_DELAY: Duration = Duration::from_millis(250);

/// Поверхность оверлея под X11: окно рендерера находится по заголовку и
/// управляется через xdotool, wmctrl и xprop. Входная форма окна для
/// сквозного режима задаётся напрямую через XFixes.
pub struct X11Surface {
    title: String,
    window_id: Option<String>,
    destroyed: bool,
    display: Option<String>,
    connection: Option<RustConnection>,
}

impl X11Surface {
    pub fn new(title: &str) -> Self {
        info!("Инициализация X11Surface для окна \"{}\"", title);
        Self {
            title: title.to_string(),
            window_id: None,
            destroyed: false,
            display: None,
            connection: None,
        }
    }

    /// Подключение к X-серверу открывается при первой необходимости
    fn x_connection(&mut self) -> Result<&RustConnection> {
        if self.connection.is_none() {
            let (connection, _) = x11rb::connect(self.display.as_deref())
                .map_err(|e| overlay_error!(host, "Нет подключения к X-серверу: {}", e))?;
            let version = connection
                .xfixes_query_version(5, 0)
                .map_err(x_error)?
                .reply()
                .map_err(x_error)?;
            debug!("XFixes {}.{}", version.major_version, version.minor_version);
            self.connection = Some(connection);
        }

        self.connection
            .as_ref()
            .ok_or_else(|| OverlayError::Host("Нет подключения к X-серверу".to_string()))
    }

    fn run(program: &str, args: &[&str]) -> Result<String> {
        let output = Command::new(program).args(args).output().map_err(|e| {
            debug!("{} не найден или не работает: {}", program, e);
            overlay_error!(host, "{} не найден: {}", program, e)
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            debug!("{} {:?} вернул ошибку: {}", program, args, stderr.trim());
            return Err(overlay_error!(host, "{} вернул ошибку: {}", program, stderr.trim()));
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    fn find_window(&self) -> Result<String> {
        let pattern = exact_title_pattern(&self.title);
        let stdout = Self::run("xdotool", &["search", "--limit", "1", "--name", &pattern])?;
        stdout
            .lines()
            .next()
            .map(str::to_string)
            .ok_or_else(|| overlay_error!(host, "Окно \"{}\" не найдено", self.title))
    }

    fn wait_for_window(&self) -> Result<String> {
        let mut attempt = 1;
        loop {
            match self.find_window() {
                Ok(id) => return Ok(id),
                Err(e) if attempt >= WINDOW_SEARCH_ATTEMPTS => return Err(e),
                Err(e) => {
                    debug!("Попытка {} поиска окна оверлея: {}", attempt, e);
                    std::thread::sleep(WINDOW_SEARCH_DELAY);
                    attempt += 1;
                }
            }
        }
    }

    fn window_id(&self) -> Result<&str> {
        if self.destroyed {
            return Err(OverlayError::Host("Поверхность уже уничтожена".to_string()));
        }
        self.window_id
            .as_deref()
            .ok_or_else(|| OverlayError::Host("Поверхность ещё не создана".to_string()))
    }

    /// Выполнить команду над окном; если окно исчезло, пометить поверхность уничтоженной
    fn on_window(&mut self, program: &str, args: &[&str]) -> Result<String> {
        let id = self.window_id()?.to_string();
        let full: Vec<&str> = args
            .iter()
            .map(|arg| if *arg == "{id}" { id.as_str() } else { *arg })
            .collect();

        match Self::run(program, &full) {
            Ok(stdout) => Ok(stdout),
            Err(e) => {
                if Self::run("xdotool", &["getwindowname", &id]).is_err() {
                    warn!("Окно оверлея {} больше не существует", id);
                    self.destroyed = true;
                }
                Err(e)
            }
        }
    }
}

fn x_error(e: impl Display) -> OverlayError {
    overlay_error!(host, "Ошибка X11: {}", e)
}

/// Шаблон `xdotool search --name` для точного совпадения заголовка
/// (расширенные регулярные выражения POSIX)
pub(crate) fn exact_title_pattern(title: &str) -> String {
    let mut pattern = String::with_capacity(title.len() + 2);
    pattern.push('^');
    for c in title.chars() {
        if r"\.^$|?*+()[]{}".contains(c) {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('$');
    pattern
}

/// xdotool печатает идентификатор окна в десятичном виде
fn parse_window_id(id: &str) -> Result<u32> {
    id.trim()
        .parse()
        .map_err(|e| overlay_error!(host, "Некорректный идентификатор окна '{}': {}", id, e))
}

/// Разобрать вывод `xprop -root _NET_WORKAREA`; первая четвёрка относится к первому рабочему столу
pub(crate) fn parse_work_area(output: &str) -> Option<WorkArea> {
    let (_, values) = output.split_once('=')?;
    let numbers: Vec<i64> = values
        .split(',')
        .take(4)
        .map(|v| v.trim().parse::<i64>())
        .collect::<std::result::Result<_, _>>()
        .ok()?;

    match numbers.as_slice() {
        [x, y, width, height] if *width > 0 && *height > 0 => Some(WorkArea {
            x: *x as i32,
            y: *y as i32,
            width: *width as u32,
            height: *height as u32,
        }),
        _ => None,
    }
}

impl SurfaceHost for X11Surface {
    fn primary_work_area(&self) -> Result<WorkArea> {
        let stdout = Self::run("xprop", &["-root", "_NET_WORKAREA"])?;
        parse_work_area(&stdout)
            .ok_or_else(|| overlay_error!(host, "Не удалось разобрать _NET_WORKAREA: {}", stdout))
    }

    fn create(&mut self, options: &SurfaceOptions) -> Result<()> {
        let id = self.wait_for_window()?;
        info!("Найдено окно оверлея {} (\"{}\")", id, self.title);
        self.window_id = Some(id);
        self.destroyed = false;

        let bounds = options.bounds;
        let geometry = format!("0,{},{},{},{}", bounds.x, bounds.y, bounds.width, bounds.height);
        self.on_window("wmctrl", &["-i", "-r", "{id}", "-e", &geometry])?;

        if !options.frame {
            // Motif hints: flags=2 (decorations), decorations=0
            self.on_window(
                "xprop",
                &["-id", "{id}", "-f", "_MOTIF_WM_HINTS", "32c", "-set", "_MOTIF_WM_HINTS", "2, 0, 0, 0, 0"],
            )?;
        }

        // Прозрачность, тень и фиксированный размер задаёт визуал окна рендерера
        debug!(
            "Параметры окна: transparent={}, resizable={}, shadow={}",
            options.transparent, options.resizable, options.has_shadow
        );

        if options.always_on_top {
            self.on_window("wmctrl", &["-i", "-r", "{id}", "-b", "add,above,sticky"])?;
        }
        if options.focusable {
            self.on_window("xdotool", &["windowactivate", "{id}"])?;
        }

        Ok(())
    }

    fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    fn set_always_on_top(&mut self) -> Result<()> {
        self.on_window("wmctrl", &["-i", "-r", "{id}", "-b", "add,above"])?;
        Ok(())
    }

    fn focus(&mut self) -> Result<()> {
        self.on_window("xdotool", &["windowactivate", "{id}"])?;
        Ok(())
    }

    fn set_ignore_mouse_events(&mut self, ignore: bool, forward: bool) -> Result<()> {
        let window = parse_window_id(self.window_id()?)?;
        let connection = self.x_connection()?;

        // Пустая входная форма пропускает события мыши к нижележащим окнам,
        // отсутствующая (NONE) возвращает форму по умолчанию
        if ignore {
            let region = connection.generate_id().map_err(x_error)?;
            connection.xfixes_create_region(region, &[]).map_err(x_error)?;
            connection
                .xfixes_set_window_shape_region(window, SK::INPUT, 0, 0, region)
                .map_err(x_error)?;
            connection.xfixes_destroy_region(region).map_err(x_error)?;
        } else {
            connection
                .xfixes_set_window_shape_region(window, SK::INPUT, 0, 0, x11rb::NONE)
                .map_err(x_error)?;
        }
        connection.flush().map_err(x_error)?;

        debug!("Входная форма окна {:#x}: ignore={}, forward={}", window, ignore, forward);
        Ok(())
    }

    fn is_minimized(&self) -> Result<bool> {
        let id = self.window_id()?;
        let stdout = Self::run("xprop", &["-id", id, "_NET_WM_STATE"])?;
        Ok(stdout.contains("_NET_WM_STATE_HIDDEN"))
    }

    fn restore(&mut self) -> Result<()> {
        self.on_window("xdotool", &["windowmap", "{id}"])?;
        self.on_window("wmctrl", &["-i", "-a", "{id}"])?;
        Ok(())
    }

    fn minimize(&mut self) -> Result<()> {
        self.on_window("xdotool", &["windowminimize", "{id}"])?;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.on_window("wmctrl", &["-i", "-c", "{id}"])?;
        self.destroyed = true;
        Ok(())
    }
}
