use anyhow::Result;
use std::env;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use crate::configs::LogConfig;

// 日志输出格式类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    // 普通文本格式
    Plain,
    // JSON格式，适合ELK等日志聚合系统
    Json,
}

impl LogFormat {
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => LogFormat::Json,
            _ => LogFormat::Plain,
        }
    }
}

/// 使用默认设置初始化日志系统
///
/// 配置文件加载失败时使用，保证致命错误也能输出日志
pub fn init() -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(env_filter)
        .with_ansi(true)
        .with_thread_names(true)
        .try_init()
        .map_err(|e| anyhow::anyhow!("日志系统初始化失败: {}", e))?;

    Ok(())
}

/// 从配置初始化日志系统
///
/// # 参数
/// * `config` - 日志配置
///
/// # 示例
/// ```no_run
/// use common::config::AppConfig;
/// use common::logging;
///
/// fn main() -> anyhow::Result<()> {
///     let config = AppConfig::from_file("./config.yml")?;
///     logging::init_from_config(&config.log)?;
///     tracing::info!("日志系统从配置初始化成功");
///     Ok(())
/// }
/// ```
pub fn init_from_config(config: &LogConfig) -> Result<()> {
    let filter_string = config.filter_directives();

    // 检查环境变量是否有覆盖设置
    let env_filter = if let Ok(env_filter) = env::var("RUST_LOG") {
        EnvFilter::new(env_filter)
    } else {
        EnvFilter::new(filter_string)
    };

    // 检查是否有组件特定的环境变量覆盖
    let env_filter = check_env_component_overrides(env_filter);

    let log_format = config
        .format
        .as_deref()
        .map(LogFormat::from_str)
        .unwrap_or(LogFormat::Plain);

    let result = match log_format {
        LogFormat::Plain => fmt()
            .with_env_filter(env_filter)
            .with_ansi(true)
            .with_thread_names(true)
            .try_init(),
        LogFormat::Json => fmt()
            .with_env_filter(env_filter)
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_thread_names(true)
            .try_init(),
    };
    result.map_err(|e| anyhow::anyhow!("日志系统初始化失败: {}", e))?;

    info!("日志系统从配置初始化成功，全局级别: {}", config.level);
    info!("日志格式: {:?}", log_format);

    if let Some(components) = &config.components {
        for (component, level) in components {
            info!("组件 {} 日志级别: {}", component, level);
        }
    }

    Ok(())
}

/// 检查环境变量中是否有组件特定的日志级别覆盖
fn check_env_component_overrides(mut env_filter: EnvFilter) -> EnvFilter {
    // 常见的组件名称
    let common_components = ["reqwest", "hyper", "axum", "tower_http"];

    for component in &common_components {
        let env_var_name = format!("RUST_LOG_{}", component.to_uppercase());
        if let Ok(level) = env::var(&env_var_name) {
            // 尝试添加指令，如果解析失败则忽略
            if let Ok(directive) = format!("{}={}", component, level).parse() {
                env_filter = env_filter.add_directive(directive);
            }
        }
    }

    env_filter
}
