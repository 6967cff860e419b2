//! # PluginBans Gateway
//!
//! 面向 PluginBans REST API 的认证网关：校验调用方令牌，换成上游令牌后转发，
//! 并原样回传上游的状态码、响应体与 `Content-Type`。

pub mod app;
pub mod auth;
pub mod config;
pub mod error;
pub mod gateway;
pub mod logging;
pub mod proxy;

// Re-export commonly used types
pub use config::GatewayConfig;
pub use error::{GatewayError, Result};
pub use gateway::GatewayServer;
