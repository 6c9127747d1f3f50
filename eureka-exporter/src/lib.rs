// 导出模块
pub mod cli;
pub mod collector;
pub mod router;

pub use collector::RegistryMetrics;
pub use router::{build_router, AppState};
