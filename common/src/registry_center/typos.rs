use reqwest::header::HeaderMap;
use reqwest::StatusCode;

/// 对注册中心的一次请求
#[derive(Debug, Default, Clone)]
pub struct FetchRequest {
    /// 注册中心地址
    pub url: String,
    /// HTTP 方法，例如 GET
    pub method: String,
    /// 请求体，GET 时为空
    pub body: String,
    /// Basic 认证用户名，和密码同时非空时生效
    pub user: String,
    /// Basic 认证密码
    pub password: String,
    /// 原样写入 Authorization 请求头，优先于 Basic 认证
    pub auth: String,
}

impl FetchRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: "GET".to_string(),
            ..Default::default()
        }
    }

    pub fn has_basic_auth(&self) -> bool {
        !self.user.is_empty() && !self.password.is_empty()
    }
}

/// 注册中心的原始响应
#[derive(Debug, Clone)]
pub struct RegistryResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}
