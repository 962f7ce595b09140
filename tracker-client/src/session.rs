//! ViewerSession - one mounted viewer
//!
//! Lifecycle:
//!
//! 1. [`mount`](ViewerSession::mount): open the event channel, then pull the
//!    current snapshot. Pushes that arrive during the pull stay buffered in
//!    the channel and are applied after it. A failed pull is logged and the
//!    zero state is kept.
//! 2. [`run`](ViewerSession::run) / [`step`](ViewerSession::step): handle
//!    channel events strictly one at a time.
//! 3. [`unmount`](ViewerSession::unmount): close the channel.
//!
//! Every change of the derived view is published on a `watch` channel.

use async_trait::async_trait;
use shared::{
    ChannelEvent, OrderSnapshot, RejectionPayload, Stage, StatusIntent, UpdateStatusPayload,
    ViewRole,
};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::message::{ChannelConnector, ChannelHandle, ChannelSender};
use crate::projector::ClientProjector;
use crate::view::ViewModel;
use crate::{ClientConfig, ClientResult, HttpClient};

/// Source of the initial snapshot
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    async fn pull(&self, order_id: &str) -> ClientResult<OrderSnapshot>;
}

#[async_trait]
impl SnapshotSource for HttpClient {
    async fn pull(&self, order_id: &str) -> ClientResult<OrderSnapshot> {
        self.fetch_snapshot(order_id).await
    }
}

/// Sends this viewer's intents; usable while the session loop runs
#[derive(Debug, Clone)]
pub struct SessionControls {
    order_id: String,
    sender: ChannelSender,
}

impl SessionControls {
    pub async fn send_intent(&self, intent: StatusIntent) -> ClientResult<()> {
        tracing::debug!(order_id = %self.order_id, intent = %intent, "Sending intent");
        let payload = UpdateStatusPayload::new(self.order_id.as_str(), intent);
        self.sender.send(ChannelEvent::UpdateStatus(payload)).await
    }

    pub async fn place_order(&self) -> ClientResult<()> {
        self.send_intent(StatusIntent::place_order()).await
    }

    pub async fn advance(&self, stage: Stage) -> ClientResult<()> {
        self.send_intent(StatusIntent::Advance(stage)).await
    }

    pub async fn reset(&self) -> ClientResult<()> {
        self.send_intent(StatusIntent::Reset).await
    }
}

pub struct ViewerSession {
    projector: ClientProjector,
    role: ViewRole,
    storefront: String,
    channel: ChannelHandle,
    view_tx: watch::Sender<ViewModel>,
    last_rejection: Option<RejectionPayload>,
}

impl ViewerSession {
    /// Open the channel, pull the initial snapshot and derive the first view
    pub async fn mount(
        config: &ClientConfig,
        role: ViewRole,
        connector: &dyn ChannelConnector,
        source: &dyn SnapshotSource,
    ) -> ClientResult<Self> {
        let channel = connector.connect().await?;
        let mut projector = ClientProjector::new(config.order_id.as_str());

        match source.pull(&config.order_id).await {
            Ok(snapshot) => {
                tracing::info!(
                    order_id = %config.order_id,
                    status = %snapshot.status,
                    "Initial snapshot pulled"
                );
                projector.apply(snapshot);
            }
            Err(e) => {
                tracing::warn!(
                    order_id = %config.order_id,
                    "Snapshot pull failed, keeping defaults: {}",
                    e
                );
            }
        }

        let (view_tx, _) = watch::channel(projector.view(role, &config.storefront));

        Ok(Self {
            projector,
            role,
            storefront: config.storefront.clone(),
            channel,
            view_tx,
            last_rejection: None,
        })
    }

    pub fn controls(&self) -> SessionControls {
        SessionControls {
            order_id: self.projector.order_id().to_string(),
            sender: self.channel.sender(),
        }
    }

    /// Subscribe to derived view updates
    pub fn views(&self) -> watch::Receiver<ViewModel> {
        self.view_tx.subscribe()
    }

    pub fn view(&self) -> ViewModel {
        self.projector.view(self.role, &self.storefront)
    }

    pub fn projector(&self) -> &ClientProjector {
        &self.projector
    }

    pub fn role(&self) -> ViewRole {
        self.role
    }

    /// Most recent rejection of one of this viewer's intents
    pub fn last_rejection(&self) -> Option<&RejectionPayload> {
        self.last_rejection.as_ref()
    }

    /// Handle the next channel event; `false` once the channel is closed
    pub async fn step(&mut self) -> bool {
        match self.channel.recv().await {
            Some(event) => {
                self.handle_event(event);
                true
            }
            None => false,
        }
    }

    /// Handle events until the channel closes or `shutdown` fires, then unmount
    pub async fn run(mut self, shutdown: CancellationToken) {
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                open = self.step() => {
                    if !open {
                        let order_id = self.projector.order_id();
                        tracing::info!(order_id = %order_id, "Event channel ended");
                        break;
                    }
                }
            }
        }
        self.unmount();
    }

    /// Close the channel
    pub fn unmount(mut self) {
        self.channel.close();
        tracing::debug!(order_id = %self.projector.order_id(), "Viewer unmounted");
    }

    fn handle_event(&mut self, event: ChannelEvent) {
        match event {
            ChannelEvent::ReceiveStatus(payload) => {
                if self.projector.apply_push(payload) {
                    let snapshot = self.projector.snapshot();
                    tracing::debug!(
                        order_id = %self.projector.order_id(),
                        is_ordered = snapshot.is_ordered,
                        status = %snapshot.status,
                        "Snapshot applied"
                    );
                    self.view_tx.send_replace(self.view());
                }
            }
            ChannelEvent::StatusRejected(rejection) => {
                tracing::warn!(
                    order_id = %rejection.order_id,
                    new_status = %rejection.new_status,
                    code = %rejection.code,
                    "Intent rejected by hub: {}",
                    rejection.message
                );
                self.last_rejection = Some(rejection);
            }
            ChannelEvent::UpdateStatus(_) => {
                tracing::debug!("Ignoring update_status received from hub");
            }
        }
    }
}
