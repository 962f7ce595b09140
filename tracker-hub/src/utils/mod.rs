//! 工具模块 - 通用工具函数和类型
//!
//! # 内容
//!
//! - [`AppError`] - HTTP / 事件通道错误类型
//! - [`logger`] - 日志初始化
//! - [`time`] - 阶段时间戳格式化

pub mod error;
pub mod logger;
pub mod time;

pub use error::{AppError, AppResult, ErrorBody};
pub use time::{Clock, SystemClock};
