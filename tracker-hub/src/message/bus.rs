//! 消息总线核心实现
//!
//! - `client_tx`: 所有 viewer 发来的事件，汇入唯一的 [`MessageHandler`]
//! - `server_tx`: hub 广播给所有 viewer 的事件
//! - `clients`: 每个连接的单播队列，用于只发给发起方的 `status_rejected`

use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use shared::ChannelEvent;
use tokio::sync::{broadcast, mpsc};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::utils::AppError;

/// Configuration for the bus channels
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Capacity of the broadcast channels and of each unicast queue (default: 1024)
    pub channel_capacity: usize,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 1024,
        }
    }
}

/// Identity of one viewer connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Event received from a viewer, tagged with its connection
#[derive(Debug, Clone)]
pub struct InboundEvent {
    pub connection_id: ConnectionId,
    pub event: ChannelEvent,
}

/// 消息总线 - 负责事件路由
#[derive(Debug, Clone)]
pub struct MessageBus {
    /// viewer -> hub
    client_tx: broadcast::Sender<InboundEvent>,
    /// hub -> every viewer
    server_tx: broadcast::Sender<ChannelEvent>,
    pub(crate) config: TransportConfig,
    shutdown_token: CancellationToken,
    /// 已连接的 viewer (Connection ID -> 单播队列)
    clients: Arc<DashMap<ConnectionId, mpsc::Sender<ChannelEvent>>>,
}

impl MessageBus {
    /// 创建默认配置的消息总线
    pub fn new() -> Self {
        Self::from_config(TransportConfig::default())
    }

    pub fn from_config(config: TransportConfig) -> Self {
        let capacity = config.channel_capacity.max(1);
        let (client_tx, _) = broadcast::channel(capacity);
        let (server_tx, _) = broadcast::channel(capacity);
        Self {
            client_tx,
            server_tx,
            config,
            shutdown_token: CancellationToken::new(),
            clients: Arc::new(DashMap::new()),
        }
    }

    /// 广播给所有 viewer，返回收到的订阅者数量
    ///
    /// 没有 viewer 在线不算错误。
    pub fn publish(&self, event: ChannelEvent) -> usize {
        let name = event.name();
        match self.server_tx.send(event) {
            Ok(receivers) => {
                tracing::debug!(event = name, receivers, "Event published");
                receivers
            }
            Err(_) => {
                tracing::debug!(event = name, "No viewers subscribed, event dropped");
                0
            }
        }
    }

    /// 发送到 hub (viewer -> MessageHandler)
    pub fn send_to_server(&self, inbound: InboundEvent) -> Result<(), AppError> {
        self.client_tx
            .send(inbound)
            .map_err(|e| AppError::internal(format!("Message handler unavailable: {e}")))?;
        Ok(())
    }

    /// 单播到指定 viewer
    ///
    /// # 错误
    ///
    /// viewer 未连接或其队列已满
    pub fn send_to_client(
        &self,
        connection_id: ConnectionId,
        event: ChannelEvent,
    ) -> Result<(), AppError> {
        let Some(queue) = self.clients.get(&connection_id) else {
            return Err(AppError::Disconnected(connection_id.to_string()));
        };
        queue.try_send(event).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => {
                AppError::internal(format!("Queue full for viewer {connection_id}"))
            }
            mpsc::error::TrySendError::Closed(_) => {
                AppError::Disconnected(connection_id.to_string())
            }
        })
    }

    /// 注册 viewer 连接，返回其单播接收端
    pub fn connect(&self, connection_id: ConnectionId) -> mpsc::Receiver<ChannelEvent> {
        let (tx, rx) = mpsc::channel(self.config.channel_capacity.max(1));
        self.clients.insert(connection_id, tx);
        tracing::debug!(connection_id = %connection_id, "Viewer registered");
        rx
    }

    pub fn disconnect(&self, connection_id: ConnectionId) {
        if self.clients.remove(&connection_id).is_some() {
            tracing::debug!(connection_id = %connection_id, "Viewer unregistered");
        }
    }

    pub fn connected_count(&self) -> usize {
        self.clients.len()
    }

    /// 订阅 viewer 事件 (MessageHandler 专用)
    pub fn subscribe_to_clients(&self) -> broadcast::Receiver<InboundEvent> {
        self.client_tx.subscribe()
    }

    /// 订阅 hub 广播 (viewer 连接专用)
    pub fn subscribe(&self) -> broadcast::Receiver<ChannelEvent> {
        self.server_tx.subscribe()
    }

    pub fn shutdown_token(&self) -> &CancellationToken {
        &self.shutdown_token
    }

    pub fn shutdown(&self) {
        tracing::info!("Shutting down message bus");
        self.shutdown_token.cancel();
    }
}

impl Default for MessageBus {
    fn default() -> Self {
        Self::new()
    }
}
