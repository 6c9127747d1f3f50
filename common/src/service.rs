use tracing::info;

/// 处理优雅关闭
///
/// 等待 Ctrl+C 或 SIGTERM，返回后 HTTP 服务停止接收新连接
pub async fn shutdown_signal() {
    use tokio::signal;

    // 监听 Ctrl+C 信号
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("无法安装Ctrl+C处理器: {}", e);
            std::future::pending::<()>().await;
        }
    };

    // 在Unix系统上监听 SIGTERM 信号
    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("无法安装SIGTERM处理器: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    // 在非Unix系统上创建一个永不返回的future
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    // 等待任一信号
    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("接收到关闭信号，准备优雅关闭...");
}
