//! Order Tracker Hub - 订单状态同步中心
//!
//! 持有每个订单的权威状态，向所有 viewer 提供拉取与推送两条同步路径：
//!
//! - **拉取**: `GET /order/{id}` 返回当前快照
//! - **推送**: `GET /ws` 事件通道，接收 `update_status`，广播 `receive_status`
//!
//! # 模块结构
//!
//! ```text
//! tracker-hub/src/
//! ├── core/          # 配置、状态、服务器、错误
//! ├── api/           # HTTP 路由与 WebSocket 会话
//! ├── message/       # 事件总线与处理器
//! ├── orders/        # 订单状态存储
//! └── utils/         # 错误、日志、时间
//! ```

pub mod api;
pub mod core;
pub mod message;
pub mod orders;
pub mod utils;

// Re-export 公共类型
pub use core::{Config, Server, ServerState};
pub use message::{MessageBus, MessageHandler};
pub use orders::OrderStore;
pub use utils::{AppError, AppResult};

// Re-export logger functions
pub use utils::logger::init_logger_with_file;

/// 加载 `.env` 并初始化日志
pub fn setup_environment() {
    dotenv::dotenv().ok();

    let log_level = std::env::var("LOG_LEVEL").ok();
    let log_json = std::env::var("LOG_JSON")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(false);
    let log_dir = std::env::var("LOG_DIR").ok().filter(|d| !d.is_empty());

    init_logger_with_file(log_level.as_deref(), log_json, log_dir.as_deref());
}

pub fn print_banner() {
    println!(
        r#"
  _____                 _
 |_   _| __ __ _  ___  | | __ ___  _ __
   | || '__/ _` |/ __| | |/ // _ \| '__|
   | || | | (_| | (__  |   <|  __/| |
   |_||_|  \__,_|\___| |_|\_\\___||_|
    "#
    );
}
