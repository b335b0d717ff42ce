use crate::error::{OverlayError, Result};
use crate::events::ControllerEvent;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::codec::{decode_inbound, encode_outbound};
use super::Bridge;

pub struct BridgeServer {
    path: PathBuf,
    listener: UnixListener,
    bridge: Bridge,
    events: UnboundedSender<ControllerEvent>,
}

impl BridgeServer {
    pub fn bind(path: &Path, bridge: Bridge, events: UnboundedSender<ControllerEvent>) -> Result<Self> {
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let listener = UnixListener::bind(path)
            .map_err(|e| OverlayError::Bridge(format!("Не удалось открыть сокет {:?}: {}", path, e)))?;

        let mut permissions = std::fs::metadata(path)?.permissions();
        permissions.set_mode(0o600);
        std::fs::set_permissions(path, permissions)?;

        info!("Канал рендерера слушает {:?}", path);
        Ok(Self {
            path: path.to_path_buf(),
            listener,
            bridge,
            events,
        })
    }

    pub fn serve(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                match self.listener.accept().await {
                    Ok((stream, _)) => {
                        // Подписка до уведомления контроллера: полный снимок не теряется
                        let outbound = self.bridge.subscribe();
                        let events = self.events.clone();
                        if events.send(ControllerEvent::RendererConnected).is_err() {
                            break;
                        }
                        tokio::spawn(async move {
                            if let Err(e) = handle_connection(stream, outbound, events).await {
                                warn!("Ошибка соединения с рендерером: {}", e);
                            }
                        });
                    }
                    Err(e) => warn!("Не удалось принять подключение рендерера: {}", e),
                }
            }
        })
    }
}

impl Drop for BridgeServer {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            debug!("Не удалось удалить сокет канала {:?}: {}", self.path, e);
        }
    }
}

async fn handle_connection(
    stream: UnixStream,
    mut outbound: tokio::sync::broadcast::Receiver<crate::events::OutboundMessage>,
    events: UnboundedSender<ControllerEvent>,
) -> Result<()> {
    info!("Рендерер подключён");
    let (reader, mut writer) = stream.into_split();
    let mut lines = BufReader::new(reader).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }
                match decode_inbound(&line) {
                    Ok(message) => {
                        debug!("<- {:?}", message);
                        if events.send(ControllerEvent::Inbound(message)).is_err() {
                            break;
                        }
                    }
                    Err(e) => warn!("Некорректное сообщение рендерера отброшено: {}", e),
                }
            }
            message = outbound.recv() => {
                match message {
                    Ok(message) => {
                        writer.write_all(encode_outbound(&message)?.as_bytes()).await?;
                        writer.flush().await?;
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!("Рендерер не успевает читать, пропущено сообщений: {}", skipped);
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        }
    }

    info!("Рендерер отключён");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{InboundMessage, OutboundMessage, WindowControl};
    use std::time::Duration;
    use tokio::sync::mpsc;

    async fn next_event(rx: &mut mpsc::UnboundedReceiver<ControllerEvent>) -> ControllerEvent {
        tokio::time::timeout(Duration::from_secs(2), rx.recv())
            .await
            .unwrap()
            .unwrap()
    }

    #[tokio::test]
    async fn test_renderer_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bridge.sock");
        let bridge = Bridge::new();
        let (tx, mut rx) = mpsc::unbounded_channel();

        let server = BridgeServer::bind(&path, bridge.clone(), tx).unwrap();
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        let handle = server.serve();

        let client = UnixStream::connect(&path).await.unwrap();
        assert_eq!(next_event(&mut rx).await, ControllerEvent::RendererConnected);

        let (reader, mut writer) = client.into_split();
        let mut lines = BufReader::new(reader).lines();

        bridge.send(OutboundMessage::AdjustLineHeight(65));
        let line = tokio::time::timeout(Duration::from_secs(2), lines.next_line())
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        assert_eq!(line, r#"{"channel":"adjust-line-height","payload":65}"#);

        writer.write_all(b"garbage\n").await.unwrap();
        writer
            .write_all(b"{\"channel\":\"window-control\",\"payload\":\"minimize\"}\n")
            .await
            .unwrap();
        assert_eq!(
            next_event(&mut rx).await,
            ControllerEvent::Inbound(InboundMessage::WindowControl(WindowControl::Minimize))
        );

        handle.abort();
    }

    #[tokio::test]
    async fn test_stale_socket_file_is_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bridge.sock");
        std::fs::write(&path, b"stale").unwrap();

        let (tx, _rx) = mpsc::unbounded_channel();
        let server = BridgeServer::bind(&path, Bridge::new(), tx).unwrap();
        drop(server);
        assert!(!path.exists());
    }
}
