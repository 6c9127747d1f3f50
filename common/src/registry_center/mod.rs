// 导入标准库和必要的依赖
use std::fmt::Debug;
use std::sync::Arc;

use crate::Error;

// 声明子模块
pub mod http_fetcher;
pub mod typos;

// 导入类型定义
pub use crate::registry_center::http_fetcher::{HttpFetcher, REQUEST_TIMEOUT};
pub use crate::registry_center::typos::{FetchRequest, RegistryResponse};

/// 注册中心客户端接口
///
/// 每次调用发起一次同步请求，不重试。调用方所在线程会阻塞直到响应或超时。
pub trait RegistryFetcher: Send + Sync + Debug {
    /// 请求注册中心，返回原始响应
    ///
    /// # 返回
    /// * `Error::FetchRequest` - 请求无法构造，本次没有数据
    /// * `Error::FetchTransport` - 网络错误或超时，响应不可解析
    fn fetch(&self, request: &FetchRequest) -> Result<RegistryResponse, Error>;
}

/// 创建注册中心客户端实例
pub fn registry_fetcher() -> Arc<dyn RegistryFetcher> {
    Arc::new(HttpFetcher::new())
}
