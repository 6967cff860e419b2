//! # 集成测试公共工具
//!
//! Mock 上游、路由装配与请求辅助函数

#![allow(dead_code)]

use std::time::Duration;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{HeaderMap, Method, Request, StatusCode};
use bytes::Bytes;
use pluginbans_gateway::{GatewayConfig, GatewayServer};
use tokio::net::TcpListener;
use tower::ServiceExt;
use wiremock::MockServer;

/// 调用方使用的网关令牌
pub const GATEWAY_TOKEN: &str = "gw-integration-token";
/// 网关发往上游的令牌
pub const UPSTREAM_TOKEN: &str = "upstream-integration-token";
/// Mock 上游挂载 API 的前缀
pub const UPSTREAM_PREFIX: &str = "/api/v1";

/// Mock 上游服务器
pub struct MockUpstream {
    server: MockServer,
}

impl MockUpstream {
    /// 启动 Mock 服务器
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    /// 网关应使用的上游基础地址
    pub fn base_url(&self) -> String {
        format!("{}{UPSTREAM_PREFIX}", self.server.uri())
    }

    /// 上游侧的完整路径
    pub fn path(endpoint: &str) -> String {
        format!("{UPSTREAM_PREFIX}{endpoint}")
    }

    pub fn server(&self) -> &MockServer {
        &self.server
    }

    /// 校验所有 `.expect(..)` 约束
    pub async fn verify(&self) {
        self.server.verify().await;
    }
}

/// 指向给定上游的测试配置
pub fn test_config(base_url: &str) -> GatewayConfig {
    GatewayConfig::new(UPSTREAM_TOKEN, GATEWAY_TOKEN)
        .with_upstream_base_url(base_url)
        .with_request_timeout(Duration::from_secs(2))
        .with_listen("127.0.0.1", 18080)
}

/// 按配置装配路由
pub fn build_router(config: GatewayConfig) -> Router {
    GatewayServer::new(config)
        .expect("test config must be valid")
        .router()
}

/// 带 `X-API-Token` 的请求
pub fn authed_request(method: Method, uri: &str, body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("x-api-token", GATEWAY_TOKEN)
        .body(body.into())
        .expect("valid request")
}

/// 不带任何凭证的请求
pub fn anonymous_request(method: Method, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .expect("valid request")
}

/// 网关响应的各部分
pub struct CapturedResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl CapturedResponse {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).expect("response body is JSON")
    }

    pub fn content_type(&self) -> &str {
        self.headers
            .get("content-type")
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
    }
}

/// 通过 `oneshot` 发送请求并读取完整响应
pub async fn send(router: Router, request: Request<Body>) -> CapturedResponse {
    let response = router.oneshot(request).await.expect("router is infallible");
    let status = response.status();
    let headers = response.headers().clone();
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("readable body");
    CapturedResponse {
        status,
        headers,
        body,
    }
}

/// 一个当前无人监听的本地地址，用于模拟连接被拒绝
pub async fn refused_base_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);
    format!("http://{addr}/api/v1")
}
