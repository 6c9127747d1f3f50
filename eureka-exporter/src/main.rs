use std::sync::Arc;

use common::config::AppConfig;
use common::logging;
use common::registry_center::registry_fetcher;
use common::service::shutdown_signal;
use common::Error;
use eureka_exporter::cli::Cli;
use eureka_exporter::{build_router, AppState, RegistryMetrics};
use prometheus::Registry;
use tokio::net::TcpListener;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse_args(std::env::args());

    // 加载配置，失败时用默认日志输出错误后退出
    let config = match AppConfig::from_file(&cli.conf) {
        Ok(config) => Arc::new(config),
        Err(e) => {
            logging::init()?;
            error!("配置文件 '{}' 解析失败: {}", cli.conf, e);
            return Err(e.into());
        }
    };

    // 初始化日志
    logging::init_from_config(&config.log)?;
    info!(
        "配置加载成功, version: {}, port: {}, registry: {}",
        config.version, config.port, config.url
    );

    // 注册采集器
    let registry = Registry::new();
    let metrics = RegistryMetrics::new(config.clone(), registry_fetcher())?;
    registry.register(Box::new(metrics))?;

    let app = build_router(AppState::new(registry, &config.version));

    // 绑定地址
    let addr = config.listen_addr();
    let listener = match TcpListener::bind(&addr).await.map_err(Error::from) {
        Ok(listener) => listener,
        Err(e) => {
            error!("监听 {} 失败: {}", addr, e);
            return Err(e.into());
        }
    };
    info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("eureka-exporter 已关闭");
    Ok(())
}
