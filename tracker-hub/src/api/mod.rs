//! API 路由模块
//!
//! - [`health`] - 健康检查
//! - [`orders`] - 订单快照拉取
//! - [`ws`] - 事件通道 (WebSocket)

pub mod health;
pub mod orders;
pub mod ws;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::core::ServerState;

// Re-export common types for handlers
pub use crate::utils::{AppError, AppResult};

/// Build a router with all routes registered (no middleware, no state)
pub fn build_router() -> Router<ServerState> {
    Router::new()
        // Health API
        .merge(health::router())
        // Pull sync
        .merge(orders::router())
        // Push sync
        .merge(ws::router())
}

/// Build a fully configured application with all middleware and state
pub fn build_app(state: ServerState) -> Router {
    build_router()
        .with_state(state)
        // ========== Tower HTTP Middleware ==========
        // CORS - viewers may be served from another origin
        .layer(CorsLayer::permissive())
        // Trace - Request tracing
        .layer(TraceLayer::new_for_http())
}
