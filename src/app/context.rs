//! 应用上下文
//!
//! 启动时构建一次，持有所有请求共享的只读状态：配置快照、入站认证器、上游客户端。

use std::sync::Arc;

use crate::auth::{AuthUtils, Authenticator};
use crate::config::GatewayConfig;
use crate::error::Result;
use crate::linfo;
use crate::logging::{LogComponent, LogStage};
use crate::proxy::UpstreamClient;

/// 网关共享上下文
#[derive(Clone)]
pub struct GatewayContext {
    config: Arc<GatewayConfig>,
    authenticator: Authenticator,
    upstream: UpstreamClient,
}

impl GatewayContext {
    /// 校验配置并创建共享的上游客户端
    pub fn initialize(config: GatewayConfig) -> Result<Self> {
        config.validate()?;

        let upstream = UpstreamClient::new(&config)?;
        let authenticator = Authenticator::new(&config.gateway_token);

        linfo!(
            "system",
            LogStage::Startup,
            LogComponent::Upstream,
            "upstream_client_ready",
            "Upstream HTTP client created",
            upstream = %config.upstream_base_url,
            upstream_token = %AuthUtils::sanitize_api_key(&config.upstream_token),
            timeout_secs = config.request_timeout.as_secs_f64(),
            trust_env = config.upstream_trust_env
        );

        Ok(Self {
            config: Arc::new(config),
            authenticator,
            upstream,
        })
    }

    /// 只读配置快照
    #[must_use]
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// 入站令牌校验器
    #[must_use]
    pub const fn authenticator(&self) -> &Authenticator {
        &self.authenticator
    }

    /// 共享的上游客户端
    #[must_use]
    pub const fn upstream(&self) -> &UpstreamClient {
        &self.upstream
    }
}
