// ==========================================
// 选矿厂生产数据对比系统 - 字段解析器
// ==========================================
// 职责: 请求字段名 → 记录中的实际字段名
// 流程: 精确匹配 → 归一化后子串匹配 → 原样返回
// ==========================================

use crate::domain::record::{Record, RecordSet};
use std::collections::HashSet;
use tracing::debug;

/// 归一化字段名：去除空白、中英文括号、连字符，转小写
pub fn normalize_field_name(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace() && !matches!(c, '(' | ')' | '（' | '）' | '-'))
        .flat_map(char::to_lowercase)
        .collect()
}

// ==========================================
// FieldResolver - 两阶段字段解析
// ==========================================
// 可用字段取自记录集的首条记录
#[derive(Debug, Clone, Default)]
pub struct FieldResolver {
    exact: HashSet<String>,
    // (归一化名, 原字段名)，保持首条记录列顺序
    normalized: Vec<(String, String)>,
}

impl FieldResolver {
    /// 基于单条记录的字段构建
    pub fn from_record(record: &Record) -> Self {
        let exact = record.field_names().map(str::to_string).collect();
        let normalized = record
            .field_names()
            .map(|name| (normalize_field_name(name), name.to_string()))
            .collect();
        Self { exact, normalized }
    }

    /// 基于记录集首条记录构建（空记录集得到空解析器）
    pub fn from_record_set(set: &RecordSet) -> Self {
        set.first().map(Self::from_record).unwrap_or_default()
    }

    /// 解析单个字段名
    pub fn resolve(&self, requested: &str) -> String {
        if self.exact.contains(requested) {
            return requested.to_string();
        }

        let wanted = normalize_field_name(requested);
        // 空串会与任何字段互相包含，不做模糊匹配
        if wanted.is_empty() {
            return requested.to_string();
        }

        let matched = self.normalized.iter().find(|(norm, _)| {
            !norm.is_empty() && (norm.contains(&wanted) || wanted.contains(norm.as_str()))
        });

        match matched {
            Some((_, original)) => {
                debug!(requested = %requested, resolved = %original, "字段模糊匹配");
                original.clone()
            }
            None => {
                debug!(requested = %requested, "字段未匹配，按原名处理");
                requested.to_string()
            }
        }
    }

    /// 批量解析（长度与顺序保持不变）
    pub fn resolve_all<S: AsRef<str>>(&self, requested: &[S]) -> Vec<String> {
        requested.iter().map(|r| self.resolve(r.as_ref())).collect()
    }
}
