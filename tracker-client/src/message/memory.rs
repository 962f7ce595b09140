use async_trait::async_trait;
use parking_lot::Mutex;
use shared::ChannelEvent;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::{CHANNEL_BUFFER, ChannelConnector, ChannelHandle};
use crate::{ClientError, ClientResult};

/// Hub side of an in-memory channel
#[derive(Debug)]
pub struct MemoryPeer {
    /// hub -> viewer
    pub to_viewer: mpsc::Sender<ChannelEvent>,
    /// viewer -> hub
    pub from_viewer: mpsc::Receiver<ChannelEvent>,
    shutdown: CancellationToken,
}

impl MemoryPeer {
    /// Push an event to the viewer
    pub async fn push(&self, event: ChannelEvent) -> ClientResult<()> {
        self.to_viewer
            .send(event)
            .await
            .map_err(|_| ClientError::Connection("viewer side closed".to_string()))
    }

    /// Whether the viewer closed its handle
    pub fn viewer_closed(&self) -> bool {
        self.shutdown.is_cancelled()
    }
}

/// Connector that hands out one prepared in-memory channel
#[derive(Debug)]
pub struct MemoryConnector {
    handle: Mutex<Option<ChannelHandle>>,
}

impl MemoryConnector {
    pub fn pair() -> (Self, MemoryPeer) {
        let (to_viewer, incoming) = mpsc::channel(CHANNEL_BUFFER);
        let (outgoing, from_viewer) = mpsc::channel(CHANNEL_BUFFER);
        let shutdown = CancellationToken::new();

        let handle = ChannelHandle::from_parts(outgoing, incoming, shutdown.clone());
        let peer = MemoryPeer {
            to_viewer,
            from_viewer,
            shutdown,
        };
        (
            Self {
                handle: Mutex::new(Some(handle)),
            },
            peer,
        )
    }
}

#[async_trait]
impl ChannelConnector for MemoryConnector {
    async fn connect(&self) -> ClientResult<ChannelHandle> {
        self.handle
            .lock()
            .take()
            .ok_or_else(|| ClientError::Connection("in-memory channel already taken".to_string()))
    }
}
