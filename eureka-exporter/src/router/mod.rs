use std::sync::Arc;

use askama::Template;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use prometheus::{Encoder, Registry, TextEncoder};
use serde_json::json;
use tower_http::trace::TraceLayer;

use common::Error;

/// 路由共享状态
#[derive(Clone)]
pub struct AppState {
    pub registry: Registry,
    pub version: Arc<str>,
}

impl AppState {
    pub fn new(registry: Registry, version: &str) -> Self {
        Self {
            registry,
            version: Arc::from(version),
        }
    }
}

/// 构建 exporter 路由
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/metrics", get(metrics_handler))
        .route("/health", get(health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// 首页模板，`version` 做 HTML 转义
#[derive(Template)]
#[template(
    escape = "html",
    source = "<html>\n<head><title>eureka_exporter</title></head>\n<body>\n<h1>eureka_exporter</h1>\n<p>version: {{ version }}</p>\n<p><a href='metrics'>Metrics</a></p>\n</body>\n</html>",
    ext = "html"
)]
struct LandingPage<'a> {
    version: &'a str,
}

/// 首页
pub fn landing_page(version: &str) -> Result<String, Error> {
    LandingPage { version }
        .render()
        .map_err(|e| Error::Internal(format!("首页渲染失败: {}", e)))
}

async fn index(State(state): State<AppState>) -> Result<Html<String>, Error> {
    Ok(Html(landing_page(&state.version)?))
}

/// 指标处理函数
///
/// 采集会同步请求注册中心，放到阻塞线程池中执行
async fn metrics_handler(State(state): State<AppState>) -> Result<Response, Error> {
    let registry = state.registry.clone();
    let metric_families = tokio::task::spawn_blocking(move || registry.gather())
        .await
        .map_err(|e| Error::Internal(format!("采集任务异常退出: {}", e)))?;

    let encoder = TextEncoder::new();
    let mut metrics_text = Vec::new();
    encoder.encode(&metric_families, &mut metrics_text)?;

    Ok((
        [(header::CONTENT_TYPE, encoder.format_type().to_string())],
        metrics_text,
    )
        .into_response())
}

/// 健康检查处理函数
async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({ "status": "ok" })))
}
