//! Канал между контроллером и рендерером: NDJSON поверх Unix-сокета.
//!
//! Исходящие сообщения рассылаются всем подключённым рендерерам без
//! ожидания ответа; входящие превращаются в `ControllerEvent::Inbound`.

mod codec;
mod server;

pub use self::codec::{decode_inbound, encode_outbound};
pub use self::server::BridgeServer;

use crate::events::OutboundMessage;
use tokio::sync::broadcast;
use tracing::debug;

const OUTBOUND_CAPACITY: usize = 64;

/// Отправка сообщений рендереру
#[derive(Debug, Clone)]
pub struct Bridge {
    tx: broadcast::Sender<OutboundMessage>,
}

impl Bridge {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(OUTBOUND_CAPACITY);
        Self { tx }
    }

    /// Fire-and-forget: отсутствие рендерера не является ошибкой
    pub fn send(&self, message: OutboundMessage) {
        let channel = message.channel();
        match self.tx.send(message) {
            Ok(receivers) => debug!("-> {} (получателей: {})", channel, receivers),
            Err(_) => debug!("-> {} отброшено: рендерер не подключён", channel),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<OutboundMessage> {
        self.tx.subscribe()
    }
}

impl Default for Bridge {
    fn default() -> Self {
        Self::new()
    }
}
