//! # 请求处理器

use std::collections::HashMap;

use axum::Json;
use axum::extract::rejection::PathRejection;
use axum::extract::{FromRequestParts, Path, State};
use axum::http::request::Parts;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use serde::Serialize;
use serde_json::json;

use super::middleware::RequestId;
use super::routes::RouteSpec;
use super::state::AppState;
use crate::proxy::ProxyAction;

/// 根路径返回的服务描述
pub const SERVICE_NAME: &str = "PluginBans Gateway";

/// `GET /` 的响应体
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceDescriptor {
    /// 服务名
    pub service: &'static str,
    /// 上游基础地址
    pub upstream: String,
    /// `host:port` 监听地址
    pub listen: String,
    /// crate 版本
    pub version: &'static str,
}

/// 根路径处理器，无需认证
pub async fn root_handler(State(state): State<AppState>) -> Json<ServiceDescriptor> {
    let config = state.config();
    Json(ServiceDescriptor {
        service: SERVICE_NAME,
        upstream: config.upstream_base_url.clone(),
        listen: config.listen_address(),
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// 路由模板中的路径参数；静态路由得到空表
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathParams(pub HashMap<String, String>);

impl<S> FromRequestParts<S> for PathParams
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Path::<HashMap<String, String>>::from_request_parts(parts, state).await {
            Ok(Path(params)) => Ok(Self(params)),
            Err(PathRejection::MissingPathParams(_)) => Ok(Self::default()),
            Err(rejection) => Err(rejection.into_response()),
        }
    }
}

/// 只读端点上的 HEAD 请求
pub async fn method_not_allowed() -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        [(header::ALLOW, "GET")],
        Json(json!({ "detail": "Method Not Allowed" })),
    )
        .into_response()
}

/// 按路由表转发一次已认证的请求
pub async fn forward(
    spec: RouteSpec,
    state: &AppState,
    request_id: &RequestId,
    params: &HashMap<String, String>,
    query: Option<&str>,
    body: Bytes,
) -> Response {
    ProxyAction::new(spec.method, spec.upstream_path(params))
        .execute(state, request_id.as_str(), query, body)
        .await
}
