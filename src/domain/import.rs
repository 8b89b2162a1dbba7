// ==========================================
// 选矿厂生产数据对比系统 - 导入批次模型
// ==========================================
// 对齐: import_batch 表
// ==========================================

use crate::domain::types::DataSource;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// ImportBatch - 导入批次
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportBatch {
    pub batch_id: String,                   // 批次 ID（UUID）
    pub source: DataSource,                 // 数据来源
    pub file_name: Option<String>,          // 源文件名
    pub total_rows: i64,                    // 总行数
    pub imported_rows: i64,                 // 成功入库行数
    pub skipped_rows: i64,                  // 跳过行数（日期缺失/不可解析）
    pub imported_at: DateTime<Utc>,         // 导入时间
}

/// 被跳过的行
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedRow {
    pub row_number: usize, // 数据行号（从 1 开始，不含表头）
    pub reason: String,
}

// ==========================================
// ImportReport - 导入结果
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportReport {
    pub batch: ImportBatch,
    pub skipped: Vec<SkippedRow>,
    pub elapsed_ms: u64,
}
