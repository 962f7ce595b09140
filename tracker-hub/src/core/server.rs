//! Server Implementation
//!
//! HTTP + WebSocket 服务器启动和管理

use std::future::Future;
use tokio::net::TcpListener;

use crate::api::build_app;
use crate::core::{Config, Result, ServerState};

/// HTTP Server
pub struct Server {
    config: Config,
    state: Option<ServerState>,
}

impl Server {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            state: None,
        }
    }

    /// Create server with existing state (shared with tests)
    pub fn with_state(config: Config, state: ServerState) -> Self {
        Self {
            config,
            state: Some(state),
        }
    }

    /// Bind the configured address and serve until Ctrl-C
    pub async fn run(&self) -> Result<()> {
        let addr = self.config.socket_addr()?;
        let listener = TcpListener::bind(addr).await?;

        let shutdown = async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutting down...");
        };

        self.serve(listener, shutdown).await
    }

    /// Serve on an already bound listener until `shutdown` resolves or the
    /// message bus is shut down
    pub async fn serve<F>(&self, listener: TcpListener, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let state = match &self.state {
            Some(s) => s.clone(),
            None => ServerState::initialize(&self.config),
        };

        let handler_task = state.start_background_tasks();
        let app = build_app(state.clone());
        let token = state.message_bus().shutdown_token().clone();

        tracing::info!("🚚 Order tracker hub listening on {}", listener.local_addr()?);

        let graceful = {
            let token = token.clone();
            async move {
                tokio::select! {
                    _ = shutdown => {}
                    _ = token.cancelled() => {}
                }
                // Close open viewer sessions so the server can drain
                token.cancel();
            }
        };

        axum::serve(listener, app)
            .with_graceful_shutdown(graceful)
            .await?;

        state.message_bus().shutdown();
        if let Err(e) = handler_task.await {
            tracing::error!("Message handler task failed: {}", e);
        }

        tracing::info!("Order tracker hub stopped");
        Ok(())
    }
}
