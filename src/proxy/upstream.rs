//! # 上游 HTTP 客户端
//!
//! 进程内唯一的连接池，启动时创建、关闭时释放，所有请求并发共享。

use std::time::Duration;

use axum::http::{HeaderValue, header};
use bytes::Bytes;

use super::forwarding::{OutboundCall, RelayedResponse};
use crate::auth::X_API_TOKEN;
use crate::config::GatewayConfig;
use crate::error::{GatewayError, Result};

const USER_AGENT: &str = concat!("pluginbans-gateway/", env!("CARGO_PKG_VERSION"));

/// 共享的上游客户端
///
/// `reqwest::Client` 内部是 `Arc`，克隆只增加引用计数。
#[derive(Clone)]
pub struct UpstreamClient {
    http_client: reqwest::Client,
    upstream_token: HeaderValue,
    timeout: Duration,
}

impl UpstreamClient {
    /// 按配置创建客户端
    ///
    /// 未开启 `upstream_trust_env` 时忽略 `HTTP_PROXY` 等环境代理设置。
    pub fn new(config: &GatewayConfig) -> Result<Self> {
        let mut upstream_token = HeaderValue::from_str(&config.upstream_token).map_err(|e| {
            GatewayError::config_with_source("PLUGINBANS_TOKEN is not a valid header value", e)
        })?;
        upstream_token.set_sensitive(true);

        let mut builder = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(60))
            .user_agent(USER_AGENT);

        if !config.upstream_trust_env {
            builder = builder.no_proxy();
        }

        let http_client = builder.build().map_err(|e| {
            GatewayError::server_start_with_source("Failed to create upstream HTTP client", e)
        })?;

        Ok(Self {
            http_client,
            upstream_token,
            timeout: config.request_timeout,
        })
    }

    /// 每次上游调用的超时
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// 发送一次上游调用并读取完整响应
    ///
    /// 只有传输层失败（连接、超时、DNS、TLS、读取响应体）才返回错误，
    /// 上游的 4xx/5xx 原样作为 [`RelayedResponse`] 返回。
    pub async fn execute(&self, call: OutboundCall) -> Result<RelayedResponse> {
        let OutboundCall { method, url, body } = call;

        let mut request = self
            .http_client
            .request(method, &url)
            .header(X_API_TOKEN, self.upstream_token.clone())
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(body) = body {
            request = request.body(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let content_type = response.headers().get(header::CONTENT_TYPE).cloned();
        let body: Bytes = response.bytes().await?;

        Ok(RelayedResponse::new(status, content_type, body))
    }
}
