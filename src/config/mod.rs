// ==========================================
// 选矿厂生产数据对比系统 - 配置层
// ==========================================
// 职责: 对比方案预设与覆写管理
// 存储: config_kv 表
// ==========================================

pub mod comparison_profile;
pub mod config_manager;

// 重导出核心配置
pub use comparison_profile::{
    ComparisonProfile, SHIFT_PRODUCTION_PROFILE, WEIGHBRIDGE_SHIPMENT_PROFILE,
};
pub use config_manager::ConfigManager;
