//! # 网关配置快照
//!
//! 启动时解析一次，之后以 `Arc<GatewayConfig>` 只读共享给所有请求。

use std::fmt;
use std::time::Duration;

use url::Url;

use crate::auth::AuthUtils;
use crate::ensure_config;
use crate::error::Result;

/// 默认上游地址
pub const DEFAULT_UPSTREAM_BASE_URL: &str = "http://127.0.0.1:8777/api/v1";
/// 默认上游请求超时（秒）
pub const DEFAULT_REQUEST_TIMEOUT_SECONDS: f64 = 10.0;
/// 默认监听地址
pub const DEFAULT_LISTEN_HOST: &str = "0.0.0.0";
/// 默认监听端口
pub const DEFAULT_LISTEN_PORT: u16 = 8080;
/// 默认最大请求体（1MB）
pub const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;

/// 已解析的网关配置
#[derive(Clone, PartialEq)]
pub struct GatewayConfig {
    /// 上游 API 基础地址，不带结尾 `/`
    pub upstream_base_url: String,
    /// 发往上游的 `X-API-Token`
    pub upstream_token: String,
    /// 调用方必须出示的网关令牌
    pub gateway_token: String,
    /// 每次上游调用的超时
    pub request_timeout: Duration,
    /// 监听主机
    pub listen_host: String,
    /// 监听端口
    pub listen_port: u16,
    /// 是否读取系统/环境代理设置
    pub upstream_trust_env: bool,
    /// 入站请求体上限（字节）
    pub max_body_bytes: usize,
}

impl GatewayConfig {
    /// 用必填的两个令牌和其余默认值构建配置
    #[must_use]
    pub fn new(upstream_token: impl Into<String>, gateway_token: impl Into<String>) -> Self {
        Self {
            upstream_base_url: DEFAULT_UPSTREAM_BASE_URL.to_string(),
            upstream_token: upstream_token.into(),
            gateway_token: gateway_token.into(),
            request_timeout: Duration::from_secs_f64(DEFAULT_REQUEST_TIMEOUT_SECONDS),
            listen_host: DEFAULT_LISTEN_HOST.to_string(),
            listen_port: DEFAULT_LISTEN_PORT,
            upstream_trust_env: false,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }

    /// 替换上游地址（去掉结尾的 `/`）
    #[must_use]
    pub fn with_upstream_base_url(mut self, base_url: impl AsRef<str>) -> Self {
        self.upstream_base_url = normalize_base_url(base_url.as_ref());
        self
    }

    /// 替换上游超时
    #[must_use]
    pub const fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// 替换请求体上限
    #[must_use]
    pub const fn with_max_body_bytes(mut self, max_body_bytes: usize) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }

    /// 替换监听地址
    #[must_use]
    pub fn with_listen(mut self, host: impl Into<String>, port: u16) -> Self {
        self.listen_host = host.into();
        self.listen_port = port;
        self
    }

    /// `host:port` 形式的监听地址
    #[must_use]
    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.listen_host, self.listen_port)
    }

    /// 验证配置的有效性
    ///
    /// 任一令牌为空都视为致命错误，必须在绑定监听端口之前调用。
    pub fn validate(&self) -> Result<()> {
        ensure_config!(
            !self.upstream_token.trim().is_empty(),
            "PLUGINBANS_TOKEN is required"
        );
        ensure_config!(
            !self.gateway_token.trim().is_empty(),
            "GATEWAY_TOKEN is required"
        );

        let url = Url::parse(&self.upstream_base_url).map_err(|e| {
            crate::error::GatewayError::config_with_source(
                format!("Invalid upstream base URL: {}", self.upstream_base_url),
                e,
            )
        })?;
        ensure_config!(
            matches!(url.scheme(), "http" | "https") && url.host().is_some(),
            "Upstream base URL must be an absolute http(s) URL: {}",
            self.upstream_base_url
        );

        ensure_config!(
            !self.request_timeout.is_zero(),
            "REQUEST_TIMEOUT_SECONDS must be greater than 0"
        );
        ensure_config!(
            self.max_body_bytes > 0,
            "GATEWAY_MAX_BODY_BYTES must be greater than 0"
        );
        ensure_config!(
            !self.listen_host.is_empty(),
            "GATEWAY_HOST cannot be empty"
        );
        Ok(())
    }
}

// 令牌不能出现在日志里
impl fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("upstream_base_url", &self.upstream_base_url)
            .field(
                "upstream_token",
                &AuthUtils::sanitize_api_key(&self.upstream_token),
            )
            .field(
                "gateway_token",
                &AuthUtils::sanitize_api_key(&self.gateway_token),
            )
            .field("request_timeout", &self.request_timeout)
            .field("listen_host", &self.listen_host)
            .field("listen_port", &self.listen_port)
            .field("upstream_trust_env", &self.upstream_trust_env)
            .field("max_body_bytes", &self.max_body_bytes)
            .finish()
    }
}

/// 去掉首尾空白和结尾的 `/`
#[must_use]
pub fn normalize_base_url(base_url: &str) -> String {
    base_url.trim().trim_end_matches('/').to_string()
}
