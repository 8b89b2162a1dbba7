// ==========================================
// 选矿厂生产数据对比系统 - 导入 API
// ==========================================
// 职责: 封装班报 / 磅单文件导入与撤销
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::domain::import::{ImportReport, SkippedRow};
use crate::domain::types::DataSource;
use crate::i18n::t_with_args;
use crate::importer::{RecordImporter, RecordImporterImpl, DEFAULT_DATE_FIELD};
use crate::repository::RecordRepository;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// 导入API响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportApiResponse {
    /// 导入批次ID
    pub batch_id: String,
    pub source: DataSource,
    /// 成功入库的记录数
    pub imported: i64,
    /// 跳过的行数
    pub skipped: i64,
    /// 跳过明细
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub skipped_rows: Vec<SkippedRow>,
    /// 导入耗时（毫秒）
    pub elapsed_ms: u64,
    pub message: String,
}

fn parse_source(raw: &str) -> ApiResult<DataSource> {
    DataSource::parse(raw).ok_or_else(|| {
        ApiError::InvalidInput(t_with_args("import.unknown_source", &[("source", raw)]))
    })
}

fn to_response(source: DataSource, report: ImportReport) -> ImportApiResponse {
    let message = t_with_args(
        "import.completed",
        &[
            ("imported", &report.batch.imported_rows.to_string()),
            ("skipped", &report.batch.skipped_rows.to_string()),
        ],
    );

    ImportApiResponse {
        batch_id: report.batch.batch_id,
        source,
        imported: report.batch.imported_rows,
        skipped: report.batch.skipped_rows,
        skipped_rows: report.skipped,
        elapsed_ms: report.elapsed_ms,
        message,
    }
}

/// 导入API
pub struct ImportApi {
    record_repo: Arc<RecordRepository>,
    importer: RecordImporterImpl,
}

impl ImportApi {
    /// 创建新的ImportApi实例
    pub fn new(record_repo: Arc<RecordRepository>) -> Self {
        Self {
            importer: RecordImporterImpl::new(record_repo.clone()),
            record_repo,
        }
    }

    /// 导入生产记录文件
    ///
    /// # 参数
    /// - file_path: 文件路径（.csv / .xlsx / .xls / .json）
    /// - source: 数据来源（SHIFT_PRODUCTION / WEIGHBRIDGE）
    /// - date_field: 日期列名（None 时为 "日期"）
    pub async fn import_file(
        &self,
        file_path: &str,
        source: &str,
        date_field: Option<&str>,
    ) -> ApiResult<ImportApiResponse> {
        let source = parse_source(source)?;
        let date_field = date_field.unwrap_or(DEFAULT_DATE_FIELD);

        let report = self
            .importer
            .import_file(file_path, source, date_field)
            .await?;

        Ok(to_response(source, report))
    }

    /// 批量导入多个文件（并发执行，单个失败不影响其他文件）
    pub async fn import_files(
        &self,
        file_paths: Vec<String>,
        source: &str,
        date_field: Option<&str>,
    ) -> ApiResult<Vec<Result<ImportApiResponse, String>>> {
        if file_paths.is_empty() {
            return Err(ApiError::InvalidInput("未指定导入文件".to_string()));
        }
        let source = parse_source(source)?;
        let date_field = date_field.unwrap_or(DEFAULT_DATE_FIELD);

        let results = self
            .importer
            .batch_import(file_paths, source, date_field)
            .await;

        Ok(results
            .into_iter()
            .map(|r| r.map(|report| to_response(source, report)))
            .collect())
    }

    /// 取消导入批次（删除该批次全部记录）
    ///
    /// # 返回
    /// - Ok(usize): 删除的记录数
    pub fn cancel_import_batch(&self, batch_id: &str) -> ApiResult<usize> {
        if batch_id.trim().is_empty() {
            return Err(ApiError::InvalidInput("批次ID不能为空".to_string()));
        }
        Ok(self.record_repo.delete_batch(batch_id.trim())?)
    }
}
