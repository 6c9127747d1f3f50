use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("内部服务错误: {0}")]
    Internal(String),

    #[error("配置加载失败: {0}")]
    Config(#[from] config::ConfigError),

    /// 请求构造失败，本次抓取没有数据
    #[error("注册中心请求构造失败: {0}")]
    FetchRequest(String),

    /// 网络错误或超时，本次抓取失败
    #[error("注册中心请求失败: {0}")]
    FetchTransport(String),

    #[error("注册中心文档解析失败: {0}")]
    Decode(String),

    #[error("指标错误: {0}")]
    Metrics(#[from] prometheus::Error),

    #[error("IO错误: {0}")]
    IO(#[from] std::io::Error),
}

impl From<quick_xml::DeError> for Error {
    fn from(err: quick_xml::DeError) -> Self {
        Error::Decode(err.to_string())
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::Decode(err.to_string())
    }
}

// 从Error转换为axum::http::StatusCode，用于HTTP响应
impl From<Error> for StatusCode {
    fn from(error: Error) -> Self {
        match error {
            Error::FetchRequest(_) | Error::FetchTransport(_) => StatusCode::BAD_GATEWAY,
            Error::Decode(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let message = self.to_string();
        let status: StatusCode = self.into();

        let json = Json(json!({
            "error": status.as_u16(),
            "message": message,
        }));

        (status, json).into_response()
    }
}

pub type Result<T> = std::result::Result<T, Error>;
