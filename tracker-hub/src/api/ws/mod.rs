//! Event channel endpoint
//!
//! GET /ws
//!
//! Frames are JSON text `{"event": "...", "data": {...}}`:
//! - Viewer → Hub: `update_status`
//! - Hub → every viewer: `receive_status`
//! - Hub → issuing viewer: `status_rejected`

use axum::Router;
use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::IntoResponse;
use axum::routing::get;
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use shared::{ChannelEvent, ProtocolError, ReceiveStatusPayload, RejectionPayload};
use tokio::sync::broadcast;
use tokio::time::Duration;

use crate::core::ServerState;
use crate::message::{ConnectionId, InboundEvent};

const PING_INTERVAL: Duration = Duration::from_secs(30);

pub fn router() -> Router<ServerState> {
    Router::new().route("/ws", get(handle_ws))
}

/// GET /ws
///
/// A new session first receives the current snapshot of every known order.
async fn handle_ws(State(state): State<ServerState>, ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.on_upgrade(move |socket| viewer_session(socket, state))
}

async fn viewer_session(socket: WebSocket, state: ServerState) {
    let connection_id = ConnectionId::new();
    let bus = state.message_bus().clone();
    let shutdown = bus.shutdown_token().clone();

    // Subscribe before registering so no broadcast after connect is missed
    let mut broadcast_rx = bus.subscribe();
    let mut direct_rx = bus.connect(connection_id);
    let (mut sink, mut stream) = socket.split();

    tracing::info!(
        connection_id = %connection_id,
        viewers = bus.connected_count(),
        "Viewer connected"
    );

    // The viewer may have pulled before this subscription existed
    if resend_snapshots(&mut sink, &state).await.is_err() {
        bus.disconnect(connection_id);
        return;
    }

    let mut ping_interval = tokio::time::interval(PING_INTERVAL);
    ping_interval.tick().await; // skip immediate

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => {
                let _ = sink.send(Message::Close(None)).await;
                break;
            }

            _ = ping_interval.tick() => {
                if sink.send(Message::Ping(Vec::new().into())).await.is_err() {
                    break;
                }
            }

            event = broadcast_rx.recv() => {
                match event {
                    Ok(event) => {
                        if send_event(&mut sink, &event).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(
                            connection_id = %connection_id,
                            lagged = n,
                            "Viewer lagged, resending current snapshots"
                        );
                        broadcast_rx = bus.subscribe();
                        if resend_snapshots(&mut sink, &state).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }

            Some(event) = direct_rx.recv() => {
                if send_event(&mut sink, &event).await.is_err() {
                    break;
                }
            }

            msg = stream.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        handle_text(&mut sink, &state, connection_id, text.as_str()).await;
                    }
                    Some(Ok(Message::Binary(_))) => {
                        tracing::debug!(connection_id = %connection_id, "Ignoring binary frame");
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        tracing::debug!(
                            connection_id = %connection_id,
                            "Viewer socket error: {}",
                            e
                        );
                        break;
                    }
                    _ => {}
                }
            }
        }
    }

    bus.disconnect(connection_id);
    tracing::info!(connection_id = %connection_id, "Viewer disconnected");
}

/// Forward a viewer frame to the message handler
///
/// Frames that do not decode never reach the handler; the rejection goes
/// straight back on this socket.
async fn handle_text(
    sink: &mut SplitSink<WebSocket, Message>,
    state: &ServerState,
    connection_id: ConnectionId,
    text: &str,
) {
    match ChannelEvent::from_text(text) {
        Ok(event) => {
            tracing::debug!(connection_id = %connection_id, event = event.name(), "Event received");
            let inbound = InboundEvent {
                connection_id,
                event,
            };
            if let Err(e) = state.message_bus().send_to_server(inbound) {
                tracing::error!(connection_id = %connection_id, "Failed to forward event: {}", e);
            }
        }
        Err(e) => {
            tracing::warn!(connection_id = %connection_id, "Malformed frame: {}", e);
            let error = ProtocolError::MalformedIntent(e.to_string());
            let rejection = ChannelEvent::StatusRejected(RejectionPayload::new("", "", &error));
            let _ = send_event(sink, &rejection).await;
        }
    }
}

async fn resend_snapshots(
    sink: &mut SplitSink<WebSocket, Message>,
    state: &ServerState,
) -> Result<(), axum::Error> {
    for (order_id, snapshot) in state.store().snapshots() {
        let event = ChannelEvent::ReceiveStatus(ReceiveStatusPayload::new(order_id, snapshot));
        send_event(sink, &event).await?;
    }
    Ok(())
}

async fn send_event(
    sink: &mut SplitSink<WebSocket, Message>,
    event: &ChannelEvent,
) -> Result<(), axum::Error> {
    match event.to_text() {
        Ok(text) => sink.send(Message::Text(text.into())).await,
        Err(e) => {
            tracing::error!(event = event.name(), "Failed to encode event: {}", e);
            Ok(())
        }
    }
}
