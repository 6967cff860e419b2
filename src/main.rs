//! # PluginBans Gateway 主程序
//!
//! 加载配置后启动网关；配置无效时记录致命日志并以非零状态退出，不会绑定端口。

use pluginbans_gateway::{
    GatewayServer, Result, config, lerror, linfo,
    logging::{self, LogComponent, LogStage},
};

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志系统
    logging::init_optimized_logging(None);

    linfo!(
        "system",
        LogStage::Startup,
        LogComponent::Main,
        "service_starting",
        "服务启动"
    );

    let server = match config::load_config().and_then(GatewayServer::new) {
        Ok(server) => server,
        Err(e) => {
            lerror!(
                "system",
                LogStage::Startup,
                LogComponent::Config,
                "config_invalid",
                &format!("配置无效，网关未启动: {e}")
            );
            std::process::exit(1);
        }
    };

    if let Err(e) = server.serve().await {
        lerror!(
            "system",
            LogStage::Shutdown,
            LogComponent::Main,
            "service_failed",
            &format!("服务运行失败: {e}")
        );
        std::process::exit(1);
    }

    linfo!(
        "system",
        LogStage::Shutdown,
        LogComponent::Main,
        "service_shutdown",
        "服务正常关闭"
    );
    Ok(())
}
