//! # 配置加载集成测试
//!
//! 文件 + 环境变量覆盖 → 校验后的快照 → 网关装配

use std::collections::HashMap;
use std::io::Write;
use std::time::Duration;

use pluginbans_gateway::config::{ConfigLoader, load_file_config};
use pluginbans_gateway::{GatewayError, GatewayServer};
use pretty_assertions::assert_eq;
use tempfile::NamedTempFile;

fn settings_file(suffix: &str, content: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(suffix)
        .tempfile()
        .unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect()
}

#[test]
fn environment_overrides_file_values() {
    let file = settings_file(
        ".json",
        r#"{
            "upstream_base_url": "http://file.local/api/v1/",
            "upstream_token": "file-upstream",
            "gateway_token": "file-gateway",
            "request_timeout_seconds": 2.5,
            "listen_port": 9000
        }"#,
    );
    let file_values = load_file_config(file.path()).unwrap();
    let loader = ConfigLoader::new(
        file_values,
        env(&[("GATEWAY_TOKEN", "env-gateway"), ("GATEWAY_PORT", "9100")]),
    );

    let config = loader.load().unwrap();

    assert_eq!(config.upstream_base_url, "http://file.local/api/v1");
    assert_eq!(config.upstream_token, "file-upstream");
    assert_eq!(config.gateway_token, "env-gateway");
    assert_eq!(config.request_timeout, Duration::from_millis(2500));
    assert_eq!(config.listen_port, 9100);
}

#[test]
fn toml_settings_file_is_supported() {
    let file = settings_file(
        ".toml",
        "upstream_token = \"up\"\ngateway_token = \"gw\"\nupstream_trust_env = true\nmax_body_bytes = 2048\n",
    );
    let config = ConfigLoader::new(load_file_config(file.path()).unwrap(), HashMap::new())
        .load()
        .unwrap();

    assert!(config.upstream_trust_env);
    assert_eq!(config.max_body_bytes, 2048);
}

#[test]
fn missing_gateway_token_aborts_startup() {
    let loader = ConfigLoader::new(HashMap::new(), env(&[("PLUGINBANS_TOKEN", "up")]));
    let err = loader.load().err().unwrap();

    assert!(matches!(err, GatewayError::Config { .. }));
    assert!(err.to_string().contains("GATEWAY_TOKEN"));
}

#[test]
fn gateway_cannot_be_assembled_from_invalid_config() {
    let config = pluginbans_gateway::GatewayConfig::new("", "gw");
    let err = GatewayServer::new(config).err().unwrap();
    assert!(err.to_string().contains("PLUGINBANS_TOKEN"));
}

#[test]
fn relative_base_url_is_rejected() {
    let loader = ConfigLoader::new(
        HashMap::new(),
        env(&[
            ("PLUGINBANS_TOKEN", "up"),
            ("GATEWAY_TOKEN", "gw"),
            ("PLUGINBANS_BASE_URL", "/api/v1"),
        ]),
    );
    assert!(loader.load().is_err());
}
