//! # 路由配置
//!
//! `/api/v1` 下的端点全部由 [`API_ROUTES`] 描述：方法、入站路径模板、上游路径模板。
//! 新增端点只需要在表里加一行。

use std::collections::HashMap;

use axum::Router;
use axum::extract::{DefaultBodyLimit, Extension, RawQuery, State};
use axum::middleware;
use axum::routing::{MethodRouter, get, post};
use bytes::Bytes;
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use super::handlers::{self, PathParams};
use super::middleware::{RequestId, request_id_middleware, require_gateway_token};
use super::state::AppState;
use crate::proxy::ProxyMethod;

/// 需要认证的端点前缀
pub const API_PREFIX: &str = "/api/v1";

/// 路径段编码集：只转义在路径段里有歧义的字符，`:` `@` `+` 等子分隔符保持原样
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// 单个转发端点
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteSpec {
    /// 入站和上游共用的方法
    pub method: ProxyMethod,
    /// 入站路径模板（相对 [`API_PREFIX`]）
    pub path: &'static str,
    /// 上游路径模板（相对上游基础地址）
    pub upstream: &'static str,
}

impl RouteSpec {
    const fn new(method: ProxyMethod, path: &'static str, upstream: &'static str) -> Self {
        Self {
            method,
            path,
            upstream,
        }
    }

    /// 用路径参数填充上游模板，参数按路径段规则编码
    #[must_use]
    pub fn upstream_path(&self, params: &HashMap<String, String>) -> String {
        self.upstream
            .split('/')
            .map(|segment| {
                segment
                    .strip_prefix('{')
                    .and_then(|rest| rest.strip_suffix('}'))
                    .map_or_else(
                        || segment.to_string(),
                        |name| {
                            params
                                .get(name)
                                .map(|value| encode_path_segment(value))
                                .unwrap_or_default()
                        },
                    )
            })
            .collect::<Vec<_>>()
            .join("/")
    }
}

/// 按路径段规则编码单个参数
#[must_use]
pub fn encode_path_segment(value: &str) -> String {
    utf8_percent_encode(value, PATH_SEGMENT).to_string()
}

/// 网关转发的全部端点
pub const API_ROUTES: [RouteSpec; 7] = [
    RouteSpec::new(ProxyMethod::Get, "/health", "/health"),
    RouteSpec::new(ProxyMethod::Get, "/meta", "/meta"),
    RouteSpec::new(ProxyMethod::Post, "/punishments", "/punishments"),
    RouteSpec::new(ProxyMethod::Get, "/punishments/{id}", "/punishments/{id}"),
    RouteSpec::new(
        ProxyMethod::Post,
        "/punishments/{id}/revoke",
        "/punishments/{id}/revoke",
    ),
    RouteSpec::new(
        ProxyMethod::Get,
        "/players/{target}/active",
        "/players/{target}/active",
    ),
    RouteSpec::new(
        ProxyMethod::Get,
        "/players/{target}/history",
        "/players/{target}/history",
    ),
];

/// 创建完整路由：根描述 + 需要认证的 `/api/v1`
pub fn create_router(state: AppState) -> Router {
    let api_routes = api_routes()
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_gateway_token,
        ))
        .layer(DefaultBodyLimit::max(state.config().max_body_bytes));

    Router::new()
        .route("/", get(handlers::root_handler))
        .nest(API_PREFIX, api_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(middleware::from_fn(request_id_middleware)),
        )
        .with_state(state)
}

fn api_routes() -> Router<AppState> {
    API_ROUTES
        .iter()
        .fold(Router::new(), |router, spec| {
            router.route(spec.path, method_router(*spec))
        })
}

fn method_router(spec: RouteSpec) -> MethodRouter<AppState> {
    match spec.method {
        ProxyMethod::Get => get(
            move |State(state): State<AppState>,
                  Extension(request_id): Extension<RequestId>,
                  PathParams(params): PathParams,
                  RawQuery(query): RawQuery| async move {
                handlers::forward(
                    spec,
                    &state,
                    &request_id,
                    &params,
                    query.as_deref(),
                    Bytes::new(),
                )
                .await
            },
        )
        // axum 默认把 HEAD 交给 GET 处理器，这里显式拒绝
        .head(handlers::method_not_allowed),
        ProxyMethod::Post => post(
            move |State(state): State<AppState>,
                  Extension(request_id): Extension<RequestId>,
                  PathParams(params): PathParams,
                  RawQuery(query): RawQuery,
                  body: Bytes| async move {
                handlers::forward(spec, &state, &request_id, &params, query.as_deref(), body)
                    .await
            },
        ),
    }
}
