//! # 转发动作
//!
//! 把一次已认证的入站调用转成上游调用，并原样回传状态码、响应体和
//! `Content-Type`。传输层失败统一转成 502。

use std::time::Instant;

use axum::http::{HeaderValue, Method, StatusCode, header};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;

use crate::app::GatewayContext;
use crate::error::{GatewayError, describe_error_chain};
use crate::logging::{LogComponent, LogStage};
use crate::{ldebug, linfo, lwarn, upstream_error};

/// POST 空请求体时发往上游的替代内容
pub const EMPTY_JSON_OBJECT: &[u8] = b"{}";

/// 上游未给出 `Content-Type` 时使用的默认值
pub const DEFAULT_CONTENT_TYPE: &str = "application/json";

/// 转发使用的方法
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProxyMethod {
    /// 不带请求体
    Get,
    /// 带请求体，空体替换为 `{}`
    Post,
}

impl ProxyMethod {
    /// 对应的 HTTP 方法
    #[must_use]
    pub const fn as_http(self) -> Method {
        match self {
            Self::Get => Method::GET,
            Self::Post => Method::POST,
        }
    }
}

/// 由入站请求推导出的上游调用
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundCall {
    /// HTTP 方法
    pub method: Method,
    /// 完整目标地址：上游基础地址 + 路径 + 原始查询串
    pub url: String,
    /// 请求体，GET 为 `None`
    pub body: Option<Bytes>,
}

impl OutboundCall {
    /// 构建 GET 调用
    #[must_use]
    pub fn get(base_url: &str, path: &str, query: Option<&str>) -> Self {
        Self {
            method: Method::GET,
            url: build_target_url(base_url, path, query),
            body: None,
        }
    }

    /// 构建 POST 调用，空请求体替换为 `{}`
    #[must_use]
    pub fn post(base_url: &str, path: &str, query: Option<&str>, body: Bytes) -> Self {
        let body = if body.is_empty() {
            Bytes::from_static(EMPTY_JSON_OBJECT)
        } else {
            body
        };
        Self {
            method: Method::POST,
            url: build_target_url(base_url, path, query),
            body: Some(body),
        }
    }
}

/// 拼接上游地址，查询串原样附加
#[must_use]
pub fn build_target_url(base_url: &str, path: &str, query: Option<&str>) -> String {
    match query.filter(|query| !query.is_empty()) {
        Some(query) => format!("{base_url}{path}?{query}"),
        None => format!("{base_url}{path}"),
    }
}

/// 回传给调用方的上游响应
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayedResponse {
    /// 上游状态码
    pub status: StatusCode,
    /// 上游 `Content-Type`，缺省为 `application/json`
    pub content_type: HeaderValue,
    /// 上游响应体，不做任何修改
    pub body: Bytes,
}

impl RelayedResponse {
    /// 从上游响应的各部分构建
    #[must_use]
    pub fn new(status: StatusCode, content_type: Option<HeaderValue>, body: Bytes) -> Self {
        Self {
            status,
            content_type: content_type
                .unwrap_or_else(|| HeaderValue::from_static(DEFAULT_CONTENT_TYPE)),
            body,
        }
    }
}

impl IntoResponse for RelayedResponse {
    fn into_response(self) -> Response {
        (
            self.status,
            [(header::CONTENT_TYPE, self.content_type)],
            self.body,
        )
            .into_response()
    }
}

/// 单个端点的转发动作
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyAction {
    method: ProxyMethod,
    upstream_path: String,
}

impl ProxyAction {
    /// 创建转发动作；`upstream_path` 已完成路径参数替换
    #[must_use]
    pub fn new(method: ProxyMethod, upstream_path: impl Into<String>) -> Self {
        Self {
            method,
            upstream_path: upstream_path.into(),
        }
    }

    /// GET 转发
    #[must_use]
    pub fn get(upstream_path: impl Into<String>) -> Self {
        Self::new(ProxyMethod::Get, upstream_path)
    }

    /// POST 转发
    #[must_use]
    pub fn post(upstream_path: impl Into<String>) -> Self {
        Self::new(ProxyMethod::Post, upstream_path)
    }

    /// 上游路径
    #[must_use]
    pub fn upstream_path(&self) -> &str {
        &self.upstream_path
    }

    /// 构建上游调用；GET 忽略入站请求体
    #[must_use]
    pub fn outbound_call(&self, base_url: &str, query: Option<&str>, body: Bytes) -> OutboundCall {
        match self.method {
            ProxyMethod::Get => OutboundCall::get(base_url, &self.upstream_path, query),
            ProxyMethod::Post => OutboundCall::post(base_url, &self.upstream_path, query, body),
        }
    }

    /// 执行转发并生成给调用方的响应
    ///
    /// 调用方必须已经通过认证。
    pub async fn execute(
        &self,
        context: &GatewayContext,
        request_id: &str,
        query: Option<&str>,
        body: Bytes,
    ) -> Response {
        let call = self.outbound_call(&context.config().upstream_base_url, query, body);
        ldebug!(
            request_id,
            LogStage::Forwarding,
            LogComponent::Proxy,
            "forward",
            "forwarding request upstream",
            method = %call.method,
            upstream_path = %self.upstream_path
        );

        let started = Instant::now();
        match context.upstream().execute(call).await {
            Ok(relayed) => {
                linfo!(
                    request_id,
                    LogStage::Response,
                    LogComponent::Proxy,
                    "relay",
                    "relaying upstream response",
                    method = %self.method.as_http(),
                    upstream_path = %self.upstream_path,
                    status = relayed.status.as_u16(),
                    elapsed_ms = started.elapsed().as_millis()
                );
                relayed.into_response()
            }
            Err(err) => {
                lwarn!(
                    request_id,
                    LogStage::Response,
                    LogComponent::Upstream,
                    "upstream_unavailable",
                    &format!("upstream call failed: {}", describe_error_chain(&err)),
                    method = %self.method.as_http(),
                    upstream_path = %self.upstream_path,
                    elapsed_ms = started.elapsed().as_millis()
                );
                upstream_unavailable(err).into_response()
            }
        }
    }
}

/// 把任意转发失败统一成 `UpstreamUnavailable`
fn upstream_unavailable(err: GatewayError) -> GatewayError {
    match err {
        GatewayError::UpstreamUnavailable { .. } => err,
        other => upstream_error!("{}", other),
    }
}
