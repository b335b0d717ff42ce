use crate::error::Result;
use crate::events::ControllerEvent;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

const ACTIVATE_REQUEST: &str = "activate";

/// Роль процесса после попытки занять блокировку экземпляра
pub enum InstanceRole {
    Primary(InstanceGuard),
    /// Работающий экземпляр уже уведомлён; процесс должен завершиться
    Secondary,
}

/// Блокировка единственного экземпляра: владелец слушает сокет и
/// превращает каждое подключение в `ControllerEvent::SecondInstance`.
pub struct InstanceGuard {
    path: PathBuf,
    listener: UnixListener,
}

pub async fn acquire(path: &Path) -> Result<InstanceRole> {
    match UnixStream::connect(path).await {
        Ok(mut stream) => {
            info!("Оверлей уже запущен, передаём запрос активации");
            stream
                .write_all(format!("{}\n", ACTIVATE_REQUEST).as_bytes())
                .await?;
            stream.shutdown().await?;
            return Ok(InstanceRole::Secondary);
        }
        Err(e) if matches!(e.kind(), ErrorKind::NotFound | ErrorKind::ConnectionRefused) => {
            debug!("Работающий экземпляр не найден ({}): {:?}", e, path);
        }
        Err(e) => return Err(e.into()),
    }

    if path.exists() {
        warn!("Удаление устаревшего сокета экземпляра {:?}", path);
        std::fs::remove_file(path)?;
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let listener = UnixListener::bind(path)?;
    info!("Блокировка экземпляра получена: {:?}", path);
    Ok(InstanceRole::Primary(InstanceGuard {
        path: path.to_path_buf(),
        listener,
    }))
}

impl InstanceGuard {
    pub fn serve(self, events: UnboundedSender<ControllerEvent>) -> JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                let stream = match self.listener.accept().await {
                    Ok((stream, _)) => stream,
                    Err(e) => {
                        warn!("Ошибка приёма подключения второго экземпляра: {}", e);
                        continue;
                    }
                };

                let mut line = String::new();
                let mut reader = BufReader::new(stream);
                if let Err(e) = reader.read_line(&mut line).await {
                    debug!("Не удалось прочитать запрос второго экземпляра: {}", e);
                    continue;
                }

                if line.trim() != ACTIVATE_REQUEST {
                    debug!("Неизвестный запрос второго экземпляра: {:?}", line.trim());
                    continue;
                }

                info!("Запущен второй экземпляр, активируем оверлей");
                if events.send(ControllerEvent::SecondInstance).is_err() {
                    break;
                }
            }
        })
    }
}

impl Drop for InstanceGuard {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            debug!("Не удалось удалить сокет экземпляра {:?}: {}", self.path, e);
        }
    }
}
