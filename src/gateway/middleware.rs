//! # 网关中间件
//!
//! - `request_id_middleware`: 为每个请求生成唯一 `request_id`，注入请求扩展并写回响应头
//! - `require_gateway_token`: 校验入站令牌，失败时直接返回 401，不会产生任何上游调用

use std::fmt;
use std::ops::Deref;

use axum::extract::{Request, State};
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use uuid::Uuid;

use super::state::AppState;
use crate::error::AuthError;
use crate::logging::{LogComponent, LogStage};
use crate::{ldebug, lwarn};

/// 响应中回写请求 ID 的头
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// 请求ID类型
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestId(String);

impl RequestId {
    /// 生成新的 UUID v4 请求ID
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// 字符串形式
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl Deref for RequestId {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

/// 请求ID中间件
pub async fn request_id_middleware(mut request: Request, next: Next) -> Response {
    let request_id = RequestId::new();
    request.extensions_mut().insert(request_id.clone());

    let mut response = next.run(request).await;
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

/// 入站认证中间件
pub async fn require_gateway_token(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let request_id = request
        .extensions()
        .get::<RequestId>()
        .map_or_else(|| "unknown".to_string(), ToString::to_string);

    match state.authenticator().authorize(request.headers()) {
        Ok(()) => {
            ldebug!(
                request_id,
                LogStage::Authentication,
                LogComponent::Auth,
                "authorized",
                "gateway token accepted",
                path = %request.uri().path()
            );
            next.run(request).await
        }
        Err(err) => {
            let reason = match err {
                AuthError::MissingToken => "missing_token",
                AuthError::InvalidToken => "invalid_token",
            };
            lwarn!(
                request_id,
                LogStage::Authentication,
                LogComponent::Auth,
                "unauthorized",
                "rejecting request without a valid gateway token",
                reason = reason,
                method = %request.method(),
                path = %request.uri().path()
            );
            err.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_ids_are_unique_uuids() {
        let first = RequestId::new();
        let second = RequestId::new();
        assert_ne!(first, second);
        assert!(Uuid::parse_str(first.as_str()).is_ok());
    }
}
