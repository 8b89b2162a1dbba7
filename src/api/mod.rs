// ==========================================
// 选矿厂生产数据对比系统 - API 层
// ==========================================
// 职责: 提供业务 API 接口,供命令行调用
// ==========================================

pub mod comparison_api;
pub mod error;
pub mod import_api;

// 重导出核心类型
pub use comparison_api::{ComparisonApi, ComparisonResponse};
pub use error::{ApiError, ApiResult};
pub use import_api::{ImportApi, ImportApiResponse};
