// ==========================================
// 选矿厂生产数据对比系统 - 对比引擎
// ==========================================
// 流程: 字段解析 → 分组聚合 → 差值计算
// 约束: 同步、无状态、不修改输入；同一输入永远得到同一输出
// ==========================================

use crate::config::comparison_profile::ComparisonProfile;
use crate::domain::comparison::{ComparisonResult, FieldSpec, SIGN_CONVENTION};
use crate::domain::record::RecordSet;
use crate::engine::difference::DifferenceCalculator;
use crate::engine::field_resolver::FieldResolver;
use tracing::{info, instrument};

// ==========================================
// ComparisonEngine - 对比引擎
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct ComparisonEngine;

impl ComparisonEngine {
    pub fn new() -> Self {
        Self
    }

    /// 按方案解析请求字段（单位随字段保留）
    pub fn resolve_fields(&self, set: &RecordSet, requested: &[FieldSpec]) -> Vec<FieldSpec> {
        let resolver = FieldResolver::from_record_set(set);
        requested
            .iter()
            .map(|spec| FieldSpec::new(resolver.resolve(&spec.name), spec.unit.clone()))
            .collect()
    }

    /// 执行一次完整对比
    ///
    /// # 返回
    /// - 空记录集或分组不足两个时返回空结果（rows 为空）
    #[instrument(skip(self, set, profile), fields(profile_id = %profile.profile_id, records = set.len()))]
    pub fn compare(&self, set: &RecordSet, profile: &ComparisonProfile) -> ComparisonResult {
        if set.is_empty() {
            info!("记录集为空，跳过对比");
            return ComparisonResult::empty(
                &profile.profile_id,
                &profile.discriminator_field,
                0,
            );
        }

        let resolved_fields = self.resolve_fields(set, &profile.fields);
        let calculator = DifferenceCalculator::new(profile.label_rules.clone());
        let outcome = calculator.calculate(
            set,
            &resolved_fields,
            &profile.discriminator_field,
            &profile.pair,
        );

        if outcome.is_empty() {
            info!("分组不足两个，无对比数据");
            return ComparisonResult::empty(
                &profile.profile_id,
                &profile.discriminator_field,
                set.len(),
            );
        }

        info!(rows = outcome.rows.len(), "对比完成");

        ComparisonResult {
            profile_id: profile.profile_id.clone(),
            discriminator_field: profile.discriminator_field.clone(),
            record_count: set.len(),
            resolved_fields,
            group_a: outcome.group_a,
            group_b: outcome.group_b,
            rows: outcome.rows,
            sign_convention: SIGN_CONVENTION.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::record::{FieldValue, Record};

    fn shift_record(shift: &str, weight: f64, moisture: f64) -> Record {
        Record::from_pairs(vec![
            ("日期", FieldValue::from("2025-03-01")),
            ("班次", FieldValue::from(shift)),
            ("处理量湿重 (t)", FieldValue::from(weight)),
            ("水分 (%)", FieldValue::from(moisture)),
        ])
    }

    #[test]
    fn test_compare_resolves_fields_and_keeps_units() {
        let set = RecordSet::new(vec![
            shift_record("白班", 100.0, 8.0),
            shift_record("夜班", 80.0, 10.0),
        ]);
        let result = ComparisonEngine::new().compare(&set, &ComparisonProfile::shift_production());

        assert_eq!(result.rows.len(), 7);
        assert_eq!(result.resolved_fields[0].name, "处理量湿重 (t)");
        assert_eq!(result.resolved_fields[1].name, "水分 (%)");
        assert_eq!(result.resolved_fields[1].unit, "%");
        assert_eq!(result.rows[0].value, 20.0);
        assert_eq!(result.rows[1].value, -2.0);
        assert_eq!(result.rows[0].group_a, "白班");
    }

    #[test]
    fn test_compare_empty_set() {
        let result = ComparisonEngine::new()
            .compare(&RecordSet::default(), &ComparisonProfile::shift_production());
        assert!(result.is_empty());
        assert!(result.resolved_fields.is_empty());
    }
}
