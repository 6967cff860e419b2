//! # 代理模块
//!
//! 上游 HTTP 客户端与单个端点的转发动作

pub mod forwarding;
pub mod upstream;

pub use forwarding::{
    DEFAULT_CONTENT_TYPE, EMPTY_JSON_OBJECT, OutboundCall, ProxyAction, ProxyMethod,
    RelayedResponse, build_target_url,
};
pub use upstream::UpstreamClient;
