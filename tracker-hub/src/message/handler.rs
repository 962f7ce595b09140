//! Message Handler
//!
//! Single consumer of viewer events. Every intent for every order passes
//! through [`MessageHandler::run`] one at a time, so the order in which
//! `receive_status` events are broadcast is the order in which the store
//! applied them.

use shared::{ChannelEvent, ProtocolError, ReceiveStatusPayload, RejectionPayload};
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use super::bus::{ConnectionId, InboundEvent, MessageBus};
use crate::orders::OrderStore;

pub struct MessageHandler {
    receiver: broadcast::Receiver<InboundEvent>,
    bus: MessageBus,
    store: OrderStore,
    shutdown_token: CancellationToken,
}

impl MessageHandler {
    pub fn new(bus: MessageBus, store: OrderStore) -> Self {
        Self {
            receiver: bus.subscribe_to_clients(),
            shutdown_token: bus.shutdown_token().clone(),
            bus,
            store,
        }
    }

    /// Process viewer events until shutdown
    pub async fn run(mut self) {
        tracing::info!("🎯 Message handler started");

        loop {
            tokio::select! {
                _ = self.shutdown_token.cancelled() => {
                    tracing::info!("Message handler shutting down");
                    break;
                }

                inbound = self.receiver.recv() => {
                    match inbound {
                        Ok(inbound) => self.handle_event(inbound),
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            tracing::warn!("Message handler lagged, skipped {} intents", skipped);
                        }
                        Err(broadcast::error::RecvError::Closed) => {
                            tracing::info!("Message channel closed");
                            break;
                        }
                    }
                }
            }
        }

        tracing::info!("Message handler stopped");
    }

    fn handle_event(&self, inbound: InboundEvent) {
        let InboundEvent {
            connection_id,
            event,
        } = inbound;

        let payload = match event {
            ChannelEvent::UpdateStatus(payload) => payload,
            other => {
                tracing::warn!(
                    connection_id = %connection_id,
                    event = other.name(),
                    "Viewer sent a hub-only event"
                );
                let error = ProtocolError::MalformedIntent(format!(
                    "{} cannot be sent by a viewer",
                    other.name()
                ));
                self.reject(connection_id, RejectionPayload::new("", "", &error));
                return;
            }
        };

        match self.store.apply_update(&payload) {
            Ok(snapshot) => {
                let event = ChannelEvent::ReceiveStatus(ReceiveStatusPayload::new(
                    payload.order_id.as_str(),
                    snapshot,
                ));
                self.bus.publish(event);
            }
            Err(error) => {
                tracing::warn!(
                    connection_id = %connection_id,
                    order_id = %payload.order_id,
                    new_status = %payload.new_status,
                    error = %error,
                    "Intent rejected"
                );
                let rejection =
                    RejectionPayload::new(&payload.order_id, &payload.new_status, &error);
                self.reject(connection_id, rejection);
            }
        }
    }

    /// Report a rejection to the issuing viewer only
    fn reject(&self, connection_id: ConnectionId, payload: RejectionPayload) {
        if let Err(e) = self
            .bus
            .send_to_client(connection_id, ChannelEvent::StatusRejected(payload))
        {
            tracing::debug!(connection_id = %connection_id, "Rejection not delivered: {}", e);
        }
    }
}
