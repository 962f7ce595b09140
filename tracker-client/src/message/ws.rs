//! WebSocket event channel
//!
//! One background task owns the socket and bridges it to the handle's
//! mpsc queues. Frames that do not decode as a known event are logged and
//! skipped.

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use shared::ChannelEvent;
use tokio::sync::mpsc;
use tokio::time::Duration;
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;

use super::{CHANNEL_BUFFER, ChannelConnector, ChannelHandle};
use crate::{ClientConfig, ClientResult};

const PING_INTERVAL: Duration = Duration::from_secs(30);

/// Connects to a hub's `/ws` endpoint
#[derive(Debug, Clone)]
pub struct WsConnector {
    url: String,
}

impl WsConnector {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(config.ws_url())
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl ChannelConnector for WsConnector {
    async fn connect(&self) -> ClientResult<ChannelHandle> {
        let (ws_stream, _response) = tokio_tungstenite::connect_async(self.url.as_str()).await?;
        tracing::info!(url = %self.url, "Event channel connected");

        let (outgoing, outgoing_rx) = mpsc::channel(CHANNEL_BUFFER);
        let (incoming_tx, incoming) = mpsc::channel(CHANNEL_BUFFER);
        let shutdown = CancellationToken::new();

        tokio::spawn(run_socket(
            ws_stream,
            outgoing_rx,
            incoming_tx,
            shutdown.clone(),
        ));

        Ok(ChannelHandle::from_parts(outgoing, incoming, shutdown))
    }
}

async fn run_socket<S>(
    ws_stream: S,
    mut outgoing_rx: mpsc::Receiver<ChannelEvent>,
    incoming_tx: mpsc::Sender<ChannelEvent>,
    shutdown: CancellationToken,
) where
    S: futures::Stream<Item = Result<Message, tokio_tungstenite::tungstenite::Error>>
        + futures::Sink<Message, Error = tokio_tungstenite::tungstenite::Error>
        + Unpin,
{
    let (mut ws_sink, mut ws_stream) = ws_stream.split();

    let mut ping_interval = tokio::time::interval(PING_INTERVAL);
    ping_interval.tick().await; // skip immediate

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => {
                let _ = ws_sink.send(Message::Close(None)).await;
                break;
            }

            _ = ping_interval.tick() => {
                if ws_sink.send(Message::Ping(vec![].into())).await.is_err() {
                    break;
                }
            }

            outgoing = outgoing_rx.recv() => {
                let Some(event) = outgoing else { break };
                match event.to_text() {
                    Ok(text) => {
                        if let Err(e) = ws_sink.send(Message::Text(text.into())).await {
                            tracing::warn!("Failed to send {}: {}", event.name(), e);
                            break;
                        }
                    }
                    Err(e) => tracing::error!("Failed to encode {}: {}", event.name(), e),
                }
            }

            msg = ws_stream.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => match ChannelEvent::from_text(text.as_str()) {
                        Ok(event) => {
                            if incoming_tx.send(event).await.is_err() {
                                break;
                            }
                        }
                        Err(e) => tracing::warn!("Discarding undecodable frame: {}", e),
                    },
                    Some(Ok(Message::Ping(data))) => {
                        let _ = ws_sink.send(Message::Pong(data)).await;
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        tracing::warn!("Event channel error: {}", e);
                        break;
                    }
                    _ => {}
                }
            }
        }
    }

    tracing::info!("Event channel closed");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ClientError;
    use shared::{OrderSnapshot, ReceiveStatusPayload};
    use tokio::net::TcpListener;
    use tokio::time::timeout;
    use tokio_tungstenite::tungstenite;

    #[tokio::test]
    async fn test_secure_url_reaches_tls_handshake() {
        // Plain TCP peer that hangs up before any TLS handshake
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            if let Ok((stream, _)) = listener.accept().await {
                drop(stream);
            }
        });

        let config = ClientConfig::new(format!("https://127.0.0.1:{port}"));
        let connector = WsConnector::from_config(&config);
        assert!(connector.url().starts_with("wss://"));

        let err = connector.connect().await.unwrap_err();
        assert!(
            matches!(err, ClientError::WebSocket(tungstenite::Error::Io(_))),
            "unexpected error: {err}"
        );
    }

    #[tokio::test]
    async fn test_undecodable_frames_are_skipped() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let hub = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
            ws.send(Message::Text("not json".into())).await.unwrap();
            ws.send(Message::Text(r#"{"event":"explode","data":{}}"#.into()))
                .await
                .unwrap();
            let event = ChannelEvent::ReceiveStatus(ReceiveStatusPayload::new(
                "123",
                OrderSnapshot::zero_state(),
            ));
            ws.send(Message::Text(event.to_text().unwrap().into()))
                .await
                .unwrap();
            ws
        });

        let mut handle = WsConnector::new(format!("ws://{addr}/ws"))
            .connect()
            .await
            .unwrap();
        let event = timeout(Duration::from_secs(5), handle.recv())
            .await
            .unwrap()
            .unwrap();
        assert!(matches!(
            event,
            ChannelEvent::ReceiveStatus(ref payload) if payload.order_id.as_deref() == Some("123")
        ));

        let _socket = hub.await.unwrap();
        handle.close();
    }
}
