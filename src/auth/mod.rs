//! # 认证模块
//!
//! 入站网关令牌的提取与常量时间校验

mod authenticator;
mod utils;

pub use authenticator::Authenticator;
pub use utils::{AuthUtils, BEARER_PREFIX, X_API_TOKEN};
