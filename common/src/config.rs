use std::fs;

use config::{Config, ConfigError, Environment};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::configs::LogConfig;
use crate::registry_center::FetchRequest;
use crate::{Error, Result};

/// 默认配置文件路径
pub const DEFAULT_CONFIG_PATH: &str = "./config.yml";

/// 环境变量覆盖前缀，例如 `EUREKA_EXPORTER__LOG__LEVEL=debug`
pub const ENV_PREFIX: &str = "EUREKA_EXPORTER";

/// 应用配置
///
/// 启动时加载一次，之后只读，通过 `Arc` 传给采集器。
/// 未知字段会导致加载失败。
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// 注册中心地址，例如 `http://eureka:8761/eureka/apps`
    pub url: String,
    /// 首页展示的版本号
    pub version: String,
    /// exporter 自身的监听端口
    pub port: u16,
    /// 请求注册中心使用的 HTTP 方法
    #[serde(default = "default_method")]
    pub method: String,
    /// Basic 认证用户名
    #[serde(default)]
    pub user: String,
    /// Basic 认证密码
    #[serde(default)]
    pub password: String,
    /// 原样写入 Authorization 请求头
    #[serde(default)]
    pub auth: String,
    #[serde(default)]
    pub log: LogConfig,
}

fn default_method() -> String {
    "GET".to_string()
}

impl AppConfig {
    // 从配置文件加载，环境变量优先级更高
    pub fn from_file(file_path: &str) -> Result<Self> {
        let config = Self::load(file_path, ENV_PREFIX)?;
        info!("已加载配置文件: {}", file_path);
        Ok(config)
    }

    // 直接从YAML字符串加载，不读取环境变量
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        Self::parse_yaml(content, None)
    }

    /// 文件内容作为底层，`<prefix>__<KEY>` 环境变量覆盖
    ///
    /// 环境变量按字符串读取，不做类型推断，`0123`、`1.10` 保持原样。
    fn load(file_path: &str, env_prefix: &str) -> Result<Self> {
        let content = fs::read_to_string(file_path).map_err(|e| {
            ConfigError::Message(format!("读取配置文件 {} 失败: {}", file_path, e))
        })?;
        let file_config = Self::parse_yaml(&content, Some(file_path))?;

        let config = Config::builder()
            .add_source(Config::try_from(&file_config)?)
            .add_source(
                Environment::with_prefix(env_prefix)
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }

    // 字符串字段取 YAML 原文，`version: 1.10` 不会变成 1.1
    fn parse_yaml(content: &str, uri: Option<&str>) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| {
            Error::Config(ConfigError::FileParse {
                uri: uri.map(str::to_string),
                cause: Box::new(e),
            })
        })
    }

    /// exporter 监听地址
    pub fn listen_addr(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }

    /// 每次抓取使用的注册中心请求
    pub fn fetch_request(&self) -> FetchRequest {
        FetchRequest {
            url: self.url.clone(),
            method: self.method.clone(),
            body: String::new(),
            user: self.user.clone(),
            password: self.password.clone(),
            auth: self.auth.clone(),
        }
    }
}
