// ==========================================
// 选矿厂生产数据对比系统 - 领域模型层
// ==========================================
// 职责: 定义记录、对比结果、领域类型
// 约束: 不含数据访问逻辑,不含计算逻辑
// ==========================================

pub mod comparison;
pub mod import;
pub mod record;
pub mod types;

// 重导出核心类型
pub use comparison::{
    AggregatedField, AggregatedGroup, ComparisonResult, DifferenceRow, FieldSpec,
    SIGN_CONVENTION,
};
pub use import::{ImportBatch, ImportReport, SkippedRow};
pub use record::{DateRange, Field, FieldValue, Record, RecordSet};
pub use types::{AggregationMethod, DataSource, GroupPair};
