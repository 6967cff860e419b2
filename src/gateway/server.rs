//! # 网关服务器
//!
//! 生命周期：`Unstarted → Serving → Stopped`。配置在绑定监听端口之前完成校验，
//! 上游客户端随服务器一起在优雅关闭后释放。

use std::future::Future;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;

use super::routes::create_router;
use super::state::AppState;
use crate::app::GatewayContext;
use crate::config::GatewayConfig;
use crate::error::{GatewayError, Result};
use crate::logging::{LogComponent, LogStage};
use crate::{lerror, linfo};

/// 网关服务器
pub struct GatewayServer {
    state: AppState,
    router: Router,
}

impl GatewayServer {
    /// 校验配置并装配路由，尚未绑定端口
    pub fn new(config: GatewayConfig) -> Result<Self> {
        let context = Arc::new(GatewayContext::initialize(config)?);
        let state = AppState::new(context);
        let router = create_router(state.clone());

        Ok(Self { state, router })
    }

    /// 已装配好的路由，测试中可直接用 `oneshot` 驱动
    #[must_use]
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// 绑定配置的监听地址并运行，直到收到 Ctrl+C
    pub async fn serve(self) -> Result<()> {
        let address = self.state.config().listen_address();
        let listener = TcpListener::bind(&address).await.map_err(|e| {
            GatewayError::server_start_with_source(format!("Failed to bind {address}"), e)
        })?;
        self.serve_with_listener(listener, shutdown_signal()).await
    }

    /// 在给定的监听器上运行，`shutdown` 完成后优雅退出
    pub async fn serve_with_listener<F>(self, listener: TcpListener, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let local_addr = listener.local_addr()?;
        let config = self.state.config();
        linfo!(
            "system",
            LogStage::Startup,
            LogComponent::ServerSetup,
            "serving",
            &format!("PluginBans gateway listening on {local_addr}"),
            upstream = %config.upstream_base_url,
            max_body_bytes = config.max_body_bytes
        );

        let Self { state, router } = self;
        let result = axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await;
        drop(state);

        match result {
            Ok(()) => {
                linfo!(
                    "system",
                    LogStage::Shutdown,
                    LogComponent::ServerSetup,
                    "stopped",
                    "Gateway stopped, upstream client released"
                );
                Ok(())
            }
            Err(e) => {
                lerror!(
                    "system",
                    LogStage::Shutdown,
                    LogComponent::ServerSetup,
                    "serve_failed",
                    &format!("Gateway server error: {e}")
                );
                Err(GatewayError::server_start_with_source("Gateway server error", e))
            }
        }
    }
}

/// 等待 Ctrl+C
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        lerror!(
            "system",
            LogStage::Shutdown,
            LogComponent::Main,
            "signal_handler_failed",
            &format!("Failed to listen for shutdown signal: {e}")
        );
        std::future::pending::<()>().await;
    }
    linfo!(
        "system",
        LogStage::Shutdown,
        LogComponent::Main,
        "shutdown_signal",
        "Shutdown signal received"
    );
}
