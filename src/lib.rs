// ==========================================
// 选矿厂生产数据对比系统 - 核心库
// ==========================================
// 职责: 班报 / 地磅数据按分组字段聚合，输出两组差值
// 技术栈: Rust + SQLite
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "zh-CN");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 字段解析 / 聚合 / 差值
pub mod engine;

// 导入层 - 外部数据
pub mod importer;

// 配置层 - 对比方案
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一/建表）
pub mod db;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// API 层 - 业务接口
pub mod api;

// 应用层 - 共享状态
pub mod app;

// 命令行
pub mod cli;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{AggregationMethod, DataSource, GroupPair};

// 领域实体
pub use domain::{
    AggregatedField, AggregatedGroup, ComparisonResult, DateRange, DifferenceRow, Field,
    FieldSpec, FieldValue, Record, RecordSet,
};

// 引擎
pub use engine::{
    ComparisonEngine, DifferenceCalculator, FieldClassifier, FieldResolver, GroupAggregator,
};

// 配置
pub use config::{ComparisonProfile, ConfigManager};

// API
pub use api::{ApiError, ApiResult, ComparisonApi, ImportApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "选矿厂生产数据对比系统";
