//! # 配置管理模块
//!
//! 启动时从环境变量和配置文件加载一次网关配置

mod app_config;
mod loader;

pub use app_config::{
    DEFAULT_LISTEN_HOST, DEFAULT_LISTEN_PORT, DEFAULT_MAX_BODY_BYTES,
    DEFAULT_REQUEST_TIMEOUT_SECONDS, DEFAULT_UPSTREAM_BASE_URL, GatewayConfig, normalize_base_url,
};
pub use loader::{
    ALL_SETTINGS, CONFIG_PATH_ENV, ConfigLoader, DEFAULT_CONFIG_FILE, Setting, build_env_overrides,
    load_file_config,
};

/// 从进程环境加载并验证配置
pub fn load_config() -> crate::error::Result<GatewayConfig> {
    ConfigLoader::from_environment()?.load()
}
