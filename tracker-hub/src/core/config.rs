use std::net::SocketAddr;

use crate::message::TransportConfig;
use crate::utils::time::resolve_format;

/// 服务器配置
///
/// # 环境变量
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | HTTP_HOST | 0.0.0.0 | 监听地址 |
/// | HTTP_PORT | 3000 | HTTP / WebSocket 端口 |
/// | CHANNEL_CAPACITY | 1024 | 事件通道容量 |
/// | LOG_LEVEL | info | 日志级别 (`RUST_LOG` 优先) |
/// | LOG_JSON | false | JSON 日志格式 |
/// | LOG_DIR | - | 日志目录，不设置则只输出到终端 |
/// | STAGE_TIME_FORMAT | %I:%M %p | 阶段时间格式 (strftime) |
/// | ENVIRONMENT | development | 运行环境 |
///
/// # 示例
///
/// ```ignore
/// HTTP_PORT=8080 STAGE_TIME_FORMAT=%H:%M cargo run -p tracker-hub
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    pub http_host: String,
    pub http_port: u16,
    pub channel_capacity: usize,
    pub log_level: String,
    pub log_json: bool,
    pub log_dir: Option<String>,
    /// strftime pattern for stage times
    pub stage_time_format: String,
    /// 运行环境: development | staging | production
    pub environment: String,
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 未设置或无法解析的变量使用默认值 (无效的 STAGE_TIME_FORMAT 记录警告后回退)
    pub fn from_env() -> Self {
        let stage_time_format = resolve_format(std::env::var("STAGE_TIME_FORMAT").ok().as_deref());

        Self {
            http_host: std::env::var("HTTP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            channel_capacity: std::env::var("CHANNEL_CAPACITY")
                .ok()
                .and_then(|c| c.parse().ok())
                .filter(|c| *c > 0)
                .unwrap_or(1024),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_json: std::env::var("LOG_JSON")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            log_dir: std::env::var("LOG_DIR").ok().filter(|d| !d.is_empty()),
            stage_time_format,
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
        }
    }

    /// 使用自定义值覆盖部分配置
    ///
    /// 常用于测试场景 (端口 0 = 随机端口)
    pub fn with_overrides(http_host: impl Into<String>, http_port: u16) -> Self {
        let mut config = Self::from_env();
        config.http_host = http_host.into();
        config.http_port = http_port;
        config
    }

    /// 监听地址
    pub fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.http_host, self.http_port).parse()
    }

    pub fn transport(&self) -> TransportConfig {
        TransportConfig {
            channel_capacity: self.channel_capacity,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides() {
        let config = Config::with_overrides("127.0.0.1", 0);
        assert_eq!(config.http_host, "127.0.0.1");
        assert_eq!(config.socket_addr().unwrap().port(), 0);
        assert!(crate::utils::time::is_valid_format(&config.stage_time_format));
    }
}
