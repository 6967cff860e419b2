//! # 认证工具函数
//!
//! 从入站请求头中提取网关令牌

use axum::http::{HeaderMap, header};

/// 调用方和上游都使用的令牌请求头
pub const X_API_TOKEN: &str = "x-api-token";

/// `Authorization` 头中 Bearer 令牌的前缀（区分大小写）
pub const BEARER_PREFIX: &str = "Bearer ";

/// 认证工具类
pub struct AuthUtils;

impl AuthUtils {
    /// 净化令牌用于日志记录
    ///
    /// # 返回
    /// 脱敏后的字符串，格式: "sk-1***2345"；过短的令牌只返回 "***"
    #[must_use]
    pub fn sanitize_api_key(api_key: &str) -> String {
        let chars: Vec<char> = api_key.chars().collect();
        if chars.len() > 10 {
            let head: String = chars[..4].iter().collect();
            let tail: String = chars[chars.len() - 4..].iter().collect();
            format!("{head}***{tail}")
        } else {
            "***".to_string()
        }
    }

    /// 从 `Authorization` 头中提取 Bearer 令牌（去掉首尾空白）
    ///
    /// # 返回
    /// - `Some(String)`: 前缀之后的部分，可能为空
    /// - `None`: 不是以 `"Bearer "` 开头
    #[must_use]
    pub fn extract_bearer_token(auth_header: &str) -> Option<String> {
        auth_header
            .strip_prefix(BEARER_PREFIX)
            .map(|token| token.trim().to_string())
    }

    /// 按优先级提取入站令牌
    ///
    /// 1. 非空的 `X-API-Token`，去掉首尾空白（只含空白时得到空串，不再回退）
    /// 2. 以 `"Bearer "` 开头的 `Authorization`
    /// 3. 否则为空串
    #[must_use]
    pub fn extract_gateway_token(headers: &HeaderMap) -> String {
        if let Some(value) = headers.get(X_API_TOKEN).filter(|value| !value.is_empty()) {
            return String::from_utf8_lossy(value.as_bytes()).trim().to_string();
        }

        headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(Self::extract_bearer_token)
            .unwrap_or_default()
    }
}
