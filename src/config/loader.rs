//! # 配置加载器
//!
//! 从配置文件和环境变量解析 [`GatewayConfig`]。环境变量优先于文件，
//! 空白的环境变量视为未设置。

use std::collections::HashMap;
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{debug, info};

use super::app_config::{
    DEFAULT_LISTEN_HOST, DEFAULT_LISTEN_PORT, DEFAULT_MAX_BODY_BYTES, DEFAULT_REQUEST_TIMEOUT_SECONDS,
    DEFAULT_UPSTREAM_BASE_URL, GatewayConfig, normalize_base_url,
};
use crate::error::{GatewayError, Result};

/// 指定配置文件路径的环境变量
pub const CONFIG_PATH_ENV: &str = "GATEWAY_CONFIG";
/// 未指定时使用的配置文件
pub const DEFAULT_CONFIG_FILE: &str = "gateway-config.json";

/// 一项配置：环境变量名与文件键名
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Setting {
    /// 环境变量名
    pub env: &'static str,
    /// 配置文件中的键
    pub key: &'static str,
}

impl Setting {
    const fn new(env: &'static str, key: &'static str) -> Self {
        Self { env, key }
    }

    fn label(self) -> String {
        format!("{}/{}", self.env, self.key)
    }
}

/// 上游 API 基础地址
pub const UPSTREAM_BASE_URL: Setting = Setting::new("PLUGINBANS_BASE_URL", "upstream_base_url");
/// 上游令牌
pub const UPSTREAM_TOKEN: Setting = Setting::new("PLUGINBANS_TOKEN", "upstream_token");
/// 网关令牌
pub const GATEWAY_TOKEN: Setting = Setting::new("GATEWAY_TOKEN", "gateway_token");
/// 上游超时（秒，可为小数）
pub const REQUEST_TIMEOUT_SECONDS: Setting =
    Setting::new("REQUEST_TIMEOUT_SECONDS", "request_timeout_seconds");
/// 监听主机
pub const LISTEN_HOST: Setting = Setting::new("GATEWAY_HOST", "listen_host");
/// 监听端口
pub const LISTEN_PORT: Setting = Setting::new("GATEWAY_PORT", "listen_port");
/// 是否信任环境代理
pub const UPSTREAM_TRUST_ENV: Setting = Setting::new("UPSTREAM_TRUST_ENV", "upstream_trust_env");
/// 请求体上限
pub const MAX_BODY_BYTES: Setting = Setting::new("GATEWAY_MAX_BODY_BYTES", "max_body_bytes");

/// 所有已知配置项
pub const ALL_SETTINGS: [Setting; 8] = [
    UPSTREAM_BASE_URL,
    UPSTREAM_TOKEN,
    GATEWAY_TOKEN,
    REQUEST_TIMEOUT_SECONDS,
    LISTEN_HOST,
    LISTEN_PORT,
    UPSTREAM_TRUST_ENV,
    MAX_BODY_BYTES,
];

/// 配置加载器
///
/// 不实现 `Debug`：内部持有明文令牌。
#[derive(Default, Clone)]
pub struct ConfigLoader {
    /// 配置文件中的值（已转成字符串）
    file_values: HashMap<String, String>,
    /// 非空白的环境变量覆盖
    env_overrides: HashMap<String, String>,
}

impl ConfigLoader {
    /// 使用给定的文件值和环境变量覆盖创建加载器
    #[must_use]
    pub const fn new(
        file_values: HashMap<String, String>,
        env_overrides: HashMap<String, String>,
    ) -> Self {
        Self {
            file_values,
            env_overrides,
        }
    }

    /// 从进程环境创建：读取 `GATEWAY_CONFIG` 指向的文件和所有环境变量覆盖
    pub fn from_environment() -> Result<Self> {
        let config_path = env::var(CONFIG_PATH_ENV)
            .ok()
            .filter(|path| !path.trim().is_empty())
            .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE), PathBuf::from);

        let file_values = load_file_config(&config_path)?;
        let env_overrides = build_env_overrides();

        info!(
            config_file = %config_path.display(),
            file_keys = file_values.len(),
            env_overrides = env_overrides.len(),
            "configuration sources resolved"
        );

        Ok(Self::new(file_values, env_overrides))
    }

    /// 解析并验证配置快照
    pub fn load(&self) -> Result<GatewayConfig> {
        let upstream_base_url =
            normalize_base_url(&self.read_setting(UPSTREAM_BASE_URL, DEFAULT_UPSTREAM_BASE_URL));

        let timeout_seconds =
            self.read_float_setting(REQUEST_TIMEOUT_SECONDS, DEFAULT_REQUEST_TIMEOUT_SECONDS)?;
        let request_timeout = Duration::try_from_secs_f64(timeout_seconds)
            .ok()
            .filter(|timeout| !timeout.is_zero())
            .ok_or_else(|| {
                GatewayError::config(format!(
                    "Invalid timeout for {}: {timeout_seconds}",
                    REQUEST_TIMEOUT_SECONDS.label()
                ))
            })?;

        let config = GatewayConfig {
            upstream_base_url,
            upstream_token: self.read_setting(UPSTREAM_TOKEN, ""),
            gateway_token: self.read_setting(GATEWAY_TOKEN, ""),
            request_timeout,
            listen_host: self.read_setting(LISTEN_HOST, DEFAULT_LISTEN_HOST),
            listen_port: self.read_int_setting(LISTEN_PORT, DEFAULT_LISTEN_PORT)?,
            upstream_trust_env: self.read_bool_setting(UPSTREAM_TRUST_ENV, false),
            max_body_bytes: self.read_int_setting(MAX_BODY_BYTES, DEFAULT_MAX_BODY_BYTES)?,
        };

        config.validate()?;
        debug!(?config, "configuration loaded");
        Ok(config)
    }

    /// 读取字符串配置：环境变量 > 文件 > 默认值
    #[must_use]
    pub fn read_setting(&self, setting: Setting, default: &str) -> String {
        if let Some(value) = self.env_overrides.get(setting.env) {
            return value.clone();
        }
        self.file_values
            .get(setting.key)
            .map_or_else(|| default.to_string(), |value| value.trim().to_string())
    }

    fn read_int_setting<T>(&self, setting: Setting, default: T) -> Result<T>
    where
        T: std::str::FromStr + ToString,
        T::Err: std::error::Error + Send + Sync + 'static,
    {
        let value = self.read_setting(setting, &default.to_string());
        value.parse::<T>().map_err(|e| {
            GatewayError::config_with_source(
                format!("Invalid integer for {}: {value}", setting.label()),
                e,
            )
        })
    }

    fn read_float_setting(&self, setting: Setting, default: f64) -> Result<f64> {
        let value = self.read_setting(setting, &default.to_string());
        value.parse::<f64>().map_err(|e| {
            GatewayError::config_with_source(
                format!("Invalid float for {}: {value}", setting.label()),
                e,
            )
        })
    }

    fn read_bool_setting(&self, setting: Setting, default: bool) -> bool {
        let value = self
            .read_setting(setting, if default { "true" } else { "false" })
            .to_lowercase();
        matches!(value.as_str(), "1" | "true" | "yes" | "on")
    }
}

/// 收集所有非空白的环境变量覆盖
#[must_use]
pub fn build_env_overrides() -> HashMap<String, String> {
    ALL_SETTINGS
        .iter()
        .filter_map(|setting| {
            env::var(setting.env)
                .ok()
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .map(|value| (setting.env.to_string(), value))
        })
        .collect()
}

/// 加载配置文件
///
/// 文件不存在时返回空表；`.toml` 按 TOML 解析，其余按 JSON 解析。
pub fn load_file_config(path: &Path) -> Result<HashMap<String, String>> {
    if !path.exists() {
        debug!(path = %path.display(), "config file not found, using environment and defaults");
        return Ok(HashMap::new());
    }

    let content = std::fs::read_to_string(path).map_err(|e| {
        GatewayError::config_with_source(format!("读取配置文件失败: {}", path.display()), e)
    })?;

    let is_toml = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

    let root: serde_json::Value = if is_toml {
        let table: toml::Table = toml::from_str(&content).map_err(|e| {
            GatewayError::config_with_source(
                format!("TOML解析失败 - 配置文件: {}", path.display()),
                e,
            )
        })?;
        serde_json::to_value(table)?
    } else {
        serde_json::from_str(&content).map_err(|e| {
            GatewayError::config_with_source(
                format!("JSON解析失败 - 配置文件: {}", path.display()),
                e,
            )
        })?
    };

    let serde_json::Value::Object(map) = root else {
        return Err(GatewayError::config(format!(
            "Gateway config must be JSON object: {}",
            path.display()
        )));
    };

    Ok(map
        .into_iter()
        .filter_map(|(key, value)| stringify_value(value).map(|value| (key, value)))
        .collect())
}

/// 把文件中的标量值转成字符串，`null` 视为未设置
fn stringify_value(value: serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::Null => None,
        serde_json::Value::String(text) => Some(text),
        serde_json::Value::Bool(flag) => Some(flag.to_string()),
        serde_json::Value::Number(number) => Some(number.to_string()),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    fn map(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    fn tokens_in_file() -> HashMap<String, String> {
        map(&[("upstream_token", "up-file"), ("gateway_token", "gw-file")])
    }

    #[test]
    fn defaults_apply_when_only_tokens_set() {
        let config = ConfigLoader::new(tokens_in_file(), HashMap::new())
            .load()
            .unwrap();

        assert_eq!(config.upstream_base_url, DEFAULT_UPSTREAM_BASE_URL);
        assert_eq!(config.request_timeout, Duration::from_secs(10));
        assert_eq!(config.listen_address(), "0.0.0.0:8080");
        assert!(!config.upstream_trust_env);
        assert_eq!(config.max_body_bytes, DEFAULT_MAX_BODY_BYTES);
    }

    #[test]
    fn environment_wins_over_file() {
        let env = map(&[("GATEWAY_TOKEN", "gw-env"), ("GATEWAY_PORT", "9100")]);
        let mut file = tokens_in_file();
        file.insert("listen_port".into(), "9000".into());

        let config = ConfigLoader::new(file, env).load().unwrap();
        assert_eq!(config.gateway_token, "gw-env");
        assert_eq!(config.upstream_token, "up-file");
        assert_eq!(config.listen_port, 9100);
    }

    #[test]
    fn missing_tokens_fail_fast() {
        let err = ConfigLoader::new(map(&[("gateway_token", "gw")]), HashMap::new())
            .load()
            .unwrap_err();
        assert!(err.to_string().contains("PLUGINBANS_TOKEN is required"));

        let err = ConfigLoader::new(map(&[("upstream_token", "up")]), HashMap::new())
            .load()
            .unwrap_err();
        assert!(err.to_string().contains("GATEWAY_TOKEN is required"));
    }

    #[test]
    fn unparseable_numbers_are_configuration_errors() {
        let mut file = tokens_in_file();
        file.insert("listen_port".into(), "eighty".into());
        let err = ConfigLoader::new(file, HashMap::new()).load().unwrap_err();
        assert!(
            err.to_string()
                .contains("Invalid integer for GATEWAY_PORT/listen_port: eighty")
        );

        let env = map(&[("REQUEST_TIMEOUT_SECONDS", "soon")]);
        let err = ConfigLoader::new(tokens_in_file(), env).load().unwrap_err();
        assert!(err.to_string().contains("Invalid float"));
    }

    #[test]
    fn non_positive_timeout_is_rejected() {
        for raw in ["0", "-1", "NaN"] {
            let env = map(&[("REQUEST_TIMEOUT_SECONDS", raw)]);
            assert!(
                ConfigLoader::new(tokens_in_file(), env).load().is_err(),
                "timeout {raw} should be rejected"
            );
        }
    }

    #[test]
    fn fractional_timeout_is_kept() {
        let env = map(&[("REQUEST_TIMEOUT_SECONDS", "2.5")]);
        let config = ConfigLoader::new(tokens_in_file(), env).load().unwrap();
        assert_eq!(config.request_timeout, Duration::from_millis(2500));
    }

    #[test]
    fn bool_setting_accepts_truthy_words() {
        for raw in ["1", "true", "YES", "On"] {
            let env = map(&[("UPSTREAM_TRUST_ENV", raw)]);
            let config = ConfigLoader::new(tokens_in_file(), env).load().unwrap();
            assert!(config.upstream_trust_env, "{raw} should enable trust_env");
        }
        let env = map(&[("UPSTREAM_TRUST_ENV", "enabled")]);
        let config = ConfigLoader::new(tokens_in_file(), env).load().unwrap();
        assert!(!config.upstream_trust_env);
    }

    #[test]
    fn json_file_values_are_stringified() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"{{"upstream_token": " up ", "gateway_token": "gw", "listen_port": 8181,
                "request_timeout_seconds": 3.5, "upstream_trust_env": true, "listen_host": null}}"#
        )
        .unwrap();

        let values = load_file_config(file.path()).unwrap();
        assert_eq!(values.get("listen_port").map(String::as_str), Some("8181"));
        assert_eq!(values.get("upstream_trust_env").map(String::as_str), Some("true"));
        assert!(!values.contains_key("listen_host"));

        let config = ConfigLoader::new(values, HashMap::new()).load().unwrap();
        assert_eq!(config.upstream_token, "up");
        assert_eq!(config.listen_port, 8181);
        assert_eq!(config.request_timeout, Duration::from_millis(3500));
        assert!(config.upstream_trust_env);
        assert_eq!(config.listen_host, DEFAULT_LISTEN_HOST);
    }

    #[test]
    fn toml_file_is_supported() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "upstream_token = \"up\"\ngateway_token = \"gw\"\nupstream_base_url = \"https://forum.example.com/api/v1/\""
        )
        .unwrap();

        let config = ConfigLoader::new(load_file_config(file.path()).unwrap(), HashMap::new())
            .load()
            .unwrap();
        assert_eq!(config.upstream_base_url, "https://forum.example.com/api/v1");
    }

    #[test]
    fn non_object_file_is_rejected() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, "[1, 2, 3]").unwrap();
        let err = load_file_config(file.path()).unwrap_err();
        assert!(err.to_string().contains("must be JSON object"));
    }

    #[test]
    fn missing_file_is_empty() {
        let values = load_file_config(Path::new("/definitely/not/here/gateway-config.json")).unwrap();
        assert!(values.is_empty());
    }
}
