// ==========================================
// 选矿厂生产数据对比系统 - 引擎层
// ==========================================
// 职责: 字段解析、分组聚合、差值计算
// 约束: Engine 不拼 SQL, 不做 I/O, 不抛数据形态错误
// ==========================================

pub mod aggregator;
pub mod classifier;
pub mod comparison;
pub mod difference;
pub mod field_resolver;

// 重导出核心引擎
pub use aggregator::GroupAggregator;
pub use classifier::FieldClassifier;
pub use comparison::ComparisonEngine;
pub use difference::{round3, DifferenceCalculator, DifferenceOutcome, LabelRules};
pub use field_resolver::{normalize_field_name, FieldResolver};
