// ==========================================
// 选矿厂生产数据对比系统 - 生产记录数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 存储: import_batch + plant_record（字段按列顺序存为 JSON 数组）
// ==========================================

use crate::domain::import::ImportBatch;
use crate::domain::record::{DateRange, Record, RecordSet};
use crate::domain::types::DataSource;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex};

/// 待入库记录
#[derive(Debug, Clone)]
pub struct StoredRecord {
    pub record_date: NaiveDate,
    pub row_number: usize,
    pub record: Record,
}

// ==========================================
// RecordRepository - 生产记录仓储
// ==========================================

/// 生产记录仓储
/// 职责: 管理 import_batch / plant_record 表
pub struct RecordRepository {
    conn: Arc<Mutex<Connection>>,
}

impl RecordRepository {
    /// 创建新的仓储实例（打开连接并确保 schema 就绪）
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = crate::db::open_and_migrate(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 写入一个导入批次及其记录（单事务）
    ///
    /// # 返回
    /// - Ok(usize): 写入的记录数
    pub fn insert_batch(
        &self,
        batch: &ImportBatch,
        records: &[StoredRecord],
    ) -> RepositoryResult<usize> {
        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        tx.execute(
            r#"
            INSERT INTO import_batch (
                batch_id, source, file_name, total_rows, imported_rows, skipped_rows, imported_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                batch.batch_id,
                batch.source.code(),
                batch.file_name,
                batch.total_rows,
                batch.imported_rows,
                batch.skipped_rows,
                batch.imported_at.to_rfc3339(),
            ],
        )?;

        {
            let mut stmt = tx.prepare(
                r#"
                INSERT INTO plant_record (batch_id, source, record_date, row_number, payload_json)
                VALUES (?1, ?2, ?3, ?4, ?5)
                "#,
            )?;
            for stored in records {
                let payload = serde_json::to_string(&stored.record)?;
                stmt.execute(params![
                    batch.batch_id,
                    batch.source.code(),
                    stored.record_date.format("%Y-%m-%d").to_string(),
                    stored.row_number as i64,
                    payload,
                ])?;
            }
        }

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(records.len())
    }

    /// 按数据来源和日期区间（闭区间）查询记录
    ///
    /// 排序: 记录日期 → 写入顺序
    pub fn find_by_range(
        &self,
        source: DataSource,
        range: DateRange,
    ) -> RepositoryResult<RecordSet> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT payload_json
            FROM plant_record
            WHERE source = ?1
              AND record_date BETWEEN ?2 AND ?3
            ORDER BY record_date, record_id
            "#,
        )?;

        let payloads = stmt
            .query_map(
                params![
                    source.code(),
                    range.start.format("%Y-%m-%d").to_string(),
                    range.end.format("%Y-%m-%d").to_string(),
                ],
                |row| row.get::<_, String>(0),
            )?
            .collect::<Result<Vec<_>, _>>()?;

        let records = payloads
            .iter()
            .map(|p| serde_json::from_str::<Record>(p))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(RecordSet::new(records)
            .with_source(source)
            .with_range(range))
    }

    /// 查询导入批次
    pub fn find_batch(&self, batch_id: &str) -> RepositoryResult<Option<ImportBatch>> {
        let conn = self.get_conn()?;
        let batch = conn
            .query_row(
                r#"
                SELECT batch_id, source, file_name, total_rows, imported_rows, skipped_rows, imported_at
                FROM import_batch
                WHERE batch_id = ?1
                "#,
                params![batch_id],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, Option<String>>(2)?,
                        row.get::<_, i64>(3)?,
                        row.get::<_, i64>(4)?,
                        row.get::<_, i64>(5)?,
                        row.get::<_, String>(6)?,
                    ))
                },
            )
            .optional()?;

        let Some((batch_id, source, file_name, total_rows, imported_rows, skipped_rows, at)) = batch
        else {
            return Ok(None);
        };

        let source = DataSource::parse(&source).ok_or_else(|| RepositoryError::FieldValueError {
            field: "source".to_string(),
            message: format!("未知数据来源: {}", source),
        })?;
        let imported_at = DateTime::parse_from_rfc3339(&at)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| RepositoryError::FieldValueError {
                field: "imported_at".to_string(),
                message: e.to_string(),
            })?;

        Ok(Some(ImportBatch {
            batch_id,
            source,
            file_name,
            total_rows,
            imported_rows,
            skipped_rows,
            imported_at,
        }))
    }

    /// 删除导入批次及其记录（撤销导入）
    ///
    /// # 返回
    /// - Ok(usize): 删除的记录数
    pub fn delete_batch(&self, batch_id: &str) -> RepositoryResult<usize> {
        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        let deleted = tx.execute(
            "DELETE FROM plant_record WHERE batch_id = ?1",
            params![batch_id],
        )?;
        let batches = tx.execute(
            "DELETE FROM import_batch WHERE batch_id = ?1",
            params![batch_id],
        )?;

        if batches == 0 {
            return Err(RepositoryError::NotFound {
                entity: "ImportBatch".to_string(),
                id: batch_id.to_string(),
            });
        }

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(deleted)
    }

    /// 统计某数据来源的记录数
    pub fn count_by_source(&self, source: DataSource) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let count = conn.query_row(
            "SELECT COUNT(*) FROM plant_record WHERE source = ?1",
            params![source.code()],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}
