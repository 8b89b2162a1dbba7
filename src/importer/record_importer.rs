// ==========================================
// 选矿厂生产数据对比系统 - 记录导入器
// ==========================================
// 职责: 班报 / 磅单文件 → 带类型记录 → 落库
// 流程: 解析 → 定位日期列 → 清洗 → 按日期过滤 → 事务写入
// ==========================================

use crate::domain::import::{ImportBatch, ImportReport, SkippedRow};
use crate::domain::record::{DateRange, RecordSet};
use crate::domain::types::DataSource;
use crate::engine::field_resolver::normalize_field_name;
use crate::importer::data_cleaner::DataCleaner;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::file_parser::{FileParser, RawRow, UniversalFileParser};
use crate::repository::{RecordRepository, StoredRecord};
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

/// 默认日期列名
pub const DEFAULT_DATE_FIELD: &str = "日期";

// ==========================================
// RecordImporter Trait
// ==========================================
#[async_trait]
pub trait RecordImporter: Send + Sync {
    /// 导入单个文件（.csv / .xlsx / .xls）
    ///
    /// # 参数
    /// - file_path: 文件路径
    /// - source: 数据来源（班报 / 地磅）
    /// - date_field: 日期列名（支持归一化匹配，如 "日期 " / "日期(班)"）
    async fn import_file<P: AsRef<Path> + Send>(
        &self,
        file_path: P,
        source: DataSource,
        date_field: &str,
    ) -> ImportResult<ImportReport>;

    /// 批量导入多个文件（并发执行，单个失败不影响其他文件）
    async fn batch_import<P: AsRef<Path> + Send + Sync>(
        &self,
        file_paths: Vec<P>,
        source: DataSource,
        date_field: &str,
    ) -> Vec<Result<ImportReport, String>>;
}

/// 在表头中定位日期列：先精确匹配，再归一化相等匹配
fn locate_date_header(row: &RawRow, date_field: &str) -> Option<String> {
    if row.iter().any(|(h, _)| h == date_field) {
        return Some(date_field.to_string());
    }
    let wanted = normalize_field_name(date_field);
    row.iter()
        .find(|(h, _)| normalize_field_name(h) == wanted)
        .map(|(h, _)| h.clone())
}

fn cell<'a>(row: &'a RawRow, header: &str) -> Option<&'a str> {
    row.iter()
        .find(|(h, _)| h == header)
        .map(|(_, v)| v.as_str())
}

/// 清洗后的行：(行号, 日期, 记录)
struct CleanedRows {
    stored: Vec<StoredRecord>,
    skipped: Vec<SkippedRow>,
}

fn clean_rows(
    cleaner: &DataCleaner,
    file_path: &Path,
    rows: &[RawRow],
    date_field: &str,
    range: Option<DateRange>,
) -> ImportResult<CleanedRows> {
    let first = rows
        .first()
        .ok_or_else(|| ImportError::NoDataRows(file_path.display().to_string()))?;
    let date_header = locate_date_header(first, date_field)
        .ok_or_else(|| ImportError::DateColumnMissing(date_field.to_string()))?;

    let mut stored = Vec::with_capacity(rows.len());
    let mut skipped = Vec::new();

    for (idx, row) in rows.iter().enumerate() {
        let row_number = idx + 1;
        let raw_date = cell(row, &date_header).unwrap_or("");
        let record_date: NaiveDate = match cleaner.parse_record_date(raw_date) {
            Some(d) => d,
            None => {
                warn!(row_number, value = %raw_date, "日期不可解析，跳过该行");
                skipped.push(SkippedRow {
                    row_number,
                    reason: format!("日期不可解析: '{}'", raw_date),
                });
                continue;
            }
        };

        if let Some(r) = range {
            if !r.contains(record_date) {
                continue;
            }
        }

        stored.push(StoredRecord {
            record_date,
            row_number,
            record: cleaner.clean_row(row),
        });
    }

    Ok(CleanedRows { stored, skipped })
}

/// 直接从文件构建记录集（不落库）
///
/// # 参数
/// - date_field: 指定时按日期过滤并跳过日期不可解析的行；None 时保留全部行
pub fn load_record_set(
    file_path: &Path,
    date_field: Option<&str>,
    range: Option<DateRange>,
) -> ImportResult<RecordSet> {
    let cleaner = DataCleaner::new();
    let rows = UniversalFileParser.parse_to_raw_rows(file_path)?;

    let records = match date_field {
        Some(field) if !rows.is_empty() => clean_rows(&cleaner, file_path, &rows, field, range)?
            .stored
            .into_iter()
            .map(|s| s.record)
            .collect(),
        _ => rows.iter().map(|row| cleaner.clean_row(row)).collect(),
    };

    let mut set = RecordSet::new(records);
    if let Some(r) = range {
        set = set.with_range(r);
    }
    Ok(set)
}

// ==========================================
// RecordImporterImpl - 记录导入器实现
// ==========================================
pub struct RecordImporterImpl {
    repo: Arc<RecordRepository>,
    file_parser: Box<dyn FileParser>,
    data_cleaner: DataCleaner,
}

impl RecordImporterImpl {
    /// 创建导入器（自动按扩展名选择解析器）
    pub fn new(repo: Arc<RecordRepository>) -> Self {
        Self::with_parser(repo, Box::new(UniversalFileParser))
    }

    /// 指定文件解析器
    pub fn with_parser(repo: Arc<RecordRepository>, file_parser: Box<dyn FileParser>) -> Self {
        Self {
            repo,
            file_parser,
            data_cleaner: DataCleaner::new(),
        }
    }
}

#[async_trait]
impl RecordImporter for RecordImporterImpl {
    #[instrument(skip(self, file_path), fields(batch_id = tracing::field::Empty))]
    async fn import_file<P: AsRef<Path> + Send>(
        &self,
        file_path: P,
        source: DataSource,
        date_field: &str,
    ) -> ImportResult<ImportReport> {
        let start_time = Instant::now();
        let batch_id = Uuid::new_v4().to_string();
        tracing::Span::current().record("batch_id", batch_id.as_str());

        let path = file_path.as_ref();
        info!(file_path = %path.display(), source = %source, "开始导入记录");

        // === 步骤 1: 解析文件 ===
        let rows = self.file_parser.parse_to_raw_rows(path).map_err(|e| {
            error!(error = %e, "文件解析失败");
            e
        })?;
        if rows.is_empty() {
            return Err(ImportError::NoDataRows(path.display().to_string()));
        }
        debug!(total_rows = rows.len(), "文件解析完成");

        // === 步骤 2: 清洗 + 日期定位 ===
        let cleaned = clean_rows(&self.data_cleaner, path, &rows, date_field, None)?;

        // === 步骤 3: 落库 ===
        let batch = ImportBatch {
            batch_id: batch_id.clone(),
            source,
            file_name: path
                .file_name()
                .map(|n| n.to_string_lossy().to_string()),
            total_rows: rows.len() as i64,
            imported_rows: cleaned.stored.len() as i64,
            skipped_rows: cleaned.skipped.len() as i64,
            imported_at: Utc::now(),
        };
        self.repo.insert_batch(&batch, &cleaned.stored)?;

        let elapsed_ms = start_time.elapsed().as_millis() as u64;
        info!(
            imported = batch.imported_rows,
            skipped = batch.skipped_rows,
            elapsed_ms,
            "记录导入完成"
        );

        Ok(ImportReport {
            batch,
            skipped: cleaned.skipped,
            elapsed_ms,
        })
    }

    async fn batch_import<P: AsRef<Path> + Send + Sync>(
        &self,
        file_paths: Vec<P>,
        source: DataSource,
        date_field: &str,
    ) -> Vec<Result<ImportReport, String>> {
        use futures::future::join_all;

        info!(count = file_paths.len(), "开始批量导入文件");

        let tasks = file_paths.into_iter().map(|path| {
            let path_str = path.as_ref().display().to_string();
            async move {
                match self.import_file(path, source, date_field).await {
                    Ok(report) => Ok(report),
                    Err(e) => {
                        error!(file = %path_str, error = %e, "文件导入失败");
                        Err(format!("文件 {} 导入失败: {}", path_str, e))
                    }
                }
            }
        });

        let results = join_all(tasks).await;

        info!(
            total = results.len(),
            success = results.iter().filter(|r| r.is_ok()).count(),
            failed = results.iter().filter(|r| r.is_err()).count(),
            "批量导入完成"
        );
        results
    }
}
