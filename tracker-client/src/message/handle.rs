use async_trait::async_trait;
use shared::ChannelEvent;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::{ClientError, ClientResult};

/// Opens event channels
#[async_trait]
pub trait ChannelConnector: Send + Sync {
    async fn connect(&self) -> ClientResult<ChannelHandle>;
}

/// Cloneable sending half of a [`ChannelHandle`]
#[derive(Debug, Clone)]
pub struct ChannelSender {
    tx: mpsc::Sender<ChannelEvent>,
}

impl ChannelSender {
    pub async fn send(&self, event: ChannelEvent) -> ClientResult<()> {
        self.tx
            .send(event)
            .await
            .map_err(|_| ClientError::Connection("event channel closed".to_string()))
    }
}

/// Owned, explicitly closed event channel
///
/// Events are delivered in arrival order. Events that arrive before the
/// first [`recv`](Self::recv) are buffered.
#[derive(Debug)]
pub struct ChannelHandle {
    sender: ChannelSender,
    incoming: mpsc::Receiver<ChannelEvent>,
    shutdown: CancellationToken,
}

impl ChannelHandle {
    /// Assemble a handle from its parts; `shutdown` is cancelled on close
    pub fn from_parts(
        outgoing: mpsc::Sender<ChannelEvent>,
        incoming: mpsc::Receiver<ChannelEvent>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            sender: ChannelSender { tx: outgoing },
            incoming,
            shutdown,
        }
    }

    pub fn sender(&self) -> ChannelSender {
        self.sender.clone()
    }

    pub async fn send(&self, event: ChannelEvent) -> ClientResult<()> {
        self.sender.send(event).await
    }

    /// Next event; `None` once the channel is closed
    pub async fn recv(&mut self) -> Option<ChannelEvent> {
        self.incoming.recv().await
    }

    /// Close the channel; buffered events are discarded
    pub fn close(&mut self) {
        if !self.shutdown.is_cancelled() {
            tracing::debug!("Closing event channel");
            self.shutdown.cancel();
        }
        self.incoming.close();
    }
}

impl Drop for ChannelHandle {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}
