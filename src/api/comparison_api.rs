// ==========================================
// 选矿厂生产数据对比系统 - 对比 API
// ==========================================
// 职责: 取数 → 对比 → 组装看板响应
// 约束: 只读，不写入任何数据
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::{ComparisonProfile, ConfigManager};
use crate::domain::comparison::ComparisonResult;
use crate::domain::record::{DateRange, RecordSet};
use crate::engine::ComparisonEngine;
use crate::i18n::{t, t_with_args};
use crate::repository::RecordRepository;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, instrument};

/// 对比响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonResponse {
    pub result: ComparisonResult,
    /// 是否有可展示的差值
    pub has_data: bool,
    /// 提示文案（空数据 / 完成）
    pub message: String,
    /// 差值符号说明（当前语言）
    pub sign_convention: String,
}

impl ComparisonResponse {
    fn from_result(result: ComparisonResult) -> Self {
        let has_data = !result.is_empty();
        let message = if has_data {
            t_with_args(
                "comparison.completed",
                &[("rows", &result.rows.len().to_string())],
            )
        } else {
            t("comparison.no_data")
        };
        Self {
            result,
            has_data,
            message,
            sign_convention: t("comparison.sign_convention"),
        }
    }
}

/// 解析 YYYY-MM-DD 日期
fn parse_date(field: &str, raw: &str) -> ApiResult<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|e| {
        ApiError::InvalidInput(format!("{} 日期格式错误（应为 YYYY-MM-DD）: '{}' ({})", field, raw, e))
    })
}

// ==========================================
// ComparisonApi - 对比 API
// ==========================================
pub struct ComparisonApi {
    record_repo: Arc<RecordRepository>,
    config_manager: Arc<ConfigManager>,
    engine: ComparisonEngine,
}

impl ComparisonApi {
    pub fn new(record_repo: Arc<RecordRepository>, config_manager: Arc<ConfigManager>) -> Self {
        Self {
            record_repo,
            config_manager,
            engine: ComparisonEngine::new(),
        }
    }

    /// 按方案与日期区间（闭区间）对比
    ///
    /// # 参数
    /// - profile_id: 对比方案 ID
    /// - start_date / end_date: YYYY-MM-DD
    ///
    /// # 返回
    /// - Err(InvalidInput): 日期格式错误或开始日期晚于结束日期
    /// - Err(NotFound): 方案不存在
    #[instrument(skip(self))]
    pub fn compare(
        &self,
        profile_id: &str,
        start_date: &str,
        end_date: &str,
    ) -> ApiResult<ComparisonResponse> {
        let start = parse_date("start_date", start_date)?;
        let end = parse_date("end_date", end_date)?;
        let range = DateRange::new(start, end).ok_or_else(|| {
            ApiError::InvalidInput(t_with_args(
                "comparison.invalid_range",
                &[("start", start_date), ("end", end_date)],
            ))
        })?;

        let profile = self.load_profile(profile_id)?;
        let set = self.record_repo.find_by_range(profile.source, range)?;
        debug!(records = set.len(), "记录集已加载");

        Ok(ComparisonResponse::from_result(
            self.engine.compare(&set, &profile),
        ))
    }

    /// 对调用方提供的记录集执行对比（文件直读等场景）
    pub fn compare_record_set(
        &self,
        profile_id: &str,
        set: &RecordSet,
    ) -> ApiResult<ComparisonResponse> {
        let profile = self.load_profile(profile_id)?;
        Ok(ComparisonResponse::from_result(
            self.engine.compare(set, &profile),
        ))
    }

    /// 列出全部对比方案
    pub fn list_profiles(&self) -> ApiResult<Vec<ComparisonProfile>> {
        self.config_manager
            .list_profiles()
            .map_err(|e| ApiError::ConfigError(format!("读取对比方案失败: {}", e)))
    }

    fn load_profile(&self, profile_id: &str) -> ApiResult<ComparisonProfile> {
        self.config_manager
            .get_profile(profile_id)
            .map_err(|e| ApiError::ConfigError(format!("读取对比方案失败: {}", e)))?
            .ok_or_else(|| {
                ApiError::NotFound(t_with_args(
                    "comparison.profile_not_found",
                    &[("id", profile_id)],
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("start_date", " 2025-03-01 ").unwrap(),
            NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()
        );
        assert!(matches!(
            parse_date("start_date", "2025/03/01"),
            Err(ApiError::InvalidInput(_))
        ));
    }
}
