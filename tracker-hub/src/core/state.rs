use std::sync::Arc;
use tokio::task::JoinHandle;

use crate::core::Config;
use crate::message::{MessageBus, MessageHandler};
use crate::orders::OrderStore;

/// 服务器状态 - 持有所有服务的共享引用
///
/// 所有字段都是浅拷贝，可以直接作为 axum state 传递。
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Config | 配置项 (不可变) |
/// | store | OrderStore | 订单状态 |
/// | message_bus | Arc<MessageBus> | 事件总线 |
#[derive(Clone, Debug)]
pub struct ServerState {
    pub config: Config,
    pub store: OrderStore,
    pub message_bus: Arc<MessageBus>,
}

impl ServerState {
    pub fn new(config: Config, store: OrderStore, message_bus: Arc<MessageBus>) -> Self {
        Self {
            config,
            store,
            message_bus,
        }
    }

    /// 按配置初始化订单存储与消息总线
    pub fn initialize(config: &Config) -> Self {
        let store = OrderStore::new(&config.stage_time_format);
        let message_bus = Arc::new(MessageBus::from_config(config.transport()));
        Self::new(config.clone(), store, message_bus)
    }

    /// 启动后台任务 (消息处理器)
    pub fn start_background_tasks(&self) -> JoinHandle<()> {
        let handler = MessageHandler::new((*self.message_bus).clone(), self.store.clone());
        tokio::spawn(handler.run())
    }

    pub fn message_bus(&self) -> &MessageBus {
        &self.message_bus
    }

    pub fn store(&self) -> &OrderStore {
        &self.store
    }
}
