// ==========================================
// 选矿厂生产数据对比系统 - 差值计算器
// ==========================================
// 职责: 在两组聚合结果之间逐字段计算带符号差值
// 约定: value = 第一组 - 第二组，保留 3 位小数
// 约束: 分组不足两个（或固定分组缺失）时不输出任何行
// ==========================================

use crate::domain::comparison::{AggregatedGroup, DifferenceRow, FieldSpec};
use crate::domain::record::RecordSet;
use crate::domain::types::GroupPair;
use crate::engine::aggregator::GroupAggregator;
use crate::engine::classifier::FieldClassifier;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, instrument};

/// 保留 3 位小数（四舍五入，远离零）
pub fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

// ==========================================
// LabelRules - 参数标签规则
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelRules {
    /// 去除的前缀（只去除第一个命中的）
    #[serde(default)]
    pub prefixes: Vec<String>,
    /// 去除的后缀（只去除第一个命中的）
    #[serde(default)]
    pub suffixes: Vec<String>,
}

impl Default for LabelRules {
    fn default() -> Self {
        Self {
            prefixes: vec!["进厂".to_string(), "出厂".to_string(), "本班".to_string()],
            suffixes: vec!["合计".to_string(), "累计".to_string()],
        }
    }
}

impl LabelRules {
    /// 字段名 → 可读标签（不含序号）
    ///
    /// 依次去除: 前缀、末尾单位括号、后缀；结果为空时退回原字段名
    pub fn strip(&self, field: &str) -> String {
        let mut label = field.trim();

        if let Some(rest) = self
            .prefixes
            .iter()
            .find_map(|p| label.strip_prefix(p.as_str()))
        {
            label = rest.trim_start();
        }

        label = strip_unit_suffix(label);

        if let Some(rest) = self
            .suffixes
            .iter()
            .find_map(|s| label.strip_suffix(s.as_str()))
        {
            label = rest.trim_end();
        }

        let label = label.trim();
        if label.is_empty() {
            field.trim().to_string()
        } else {
            label.to_string()
        }
    }

    /// 带位置序号的唯一标签
    pub fn label(&self, field: &str, index: usize) -> String {
        format!("{}_{}", self.strip(field), index)
    }
}

/// 去除末尾的单位括号，如 "水分(%)" / "湿重（t）"
fn strip_unit_suffix(label: &str) -> &str {
    let trimmed = label.trim_end();
    let open = if trimmed.ends_with(')') {
        trimmed.rfind('(')
    } else if trimmed.ends_with('）') {
        trimmed.rfind('（')
    } else {
        None
    };
    match open {
        Some(idx) => trimmed[..idx].trim_end(),
        None => trimmed,
    }
}

/// 差值计算输出：两组聚合结果 + 差值行
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DifferenceOutcome {
    pub group_a: Option<AggregatedGroup>,
    pub group_b: Option<AggregatedGroup>,
    pub rows: Vec<DifferenceRow>,
}

impl DifferenceOutcome {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// ==========================================
// DifferenceCalculator - 差值计算器
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct DifferenceCalculator {
    aggregator: GroupAggregator,
    classifier: FieldClassifier,
    label_rules: LabelRules,
}

impl DifferenceCalculator {
    pub fn new(label_rules: LabelRules) -> Self {
        Self {
            aggregator: GroupAggregator::new(),
            classifier: FieldClassifier::new(),
            label_rules,
        }
    }

    /// 计算两组之间的差值
    ///
    /// # 参数
    /// - set: 记录集
    /// - fields: 已解析的字段及单位（输出行顺序与之一致）
    /// - discriminator: 分组字段名
    /// - pair: 分组选择策略
    ///
    /// # 返回
    /// - 分组不足时返回空结果（不是错误）
    #[instrument(skip(self, set, fields), fields(records = set.len(), field_count = fields.len()))]
    pub fn calculate(
        &self,
        set: &RecordSet,
        fields: &[FieldSpec],
        discriminator: &str,
        pair: &GroupPair,
    ) -> DifferenceOutcome {
        let mut groups = self.aggregator.aggregate(set, discriminator);

        let (key_a, key_b) = match select_pair(&groups, pair) {
            Some(keys) => keys,
            None => {
                debug!(groups = groups.len(), pair = %pair, "分组不足两个，不输出差值");
                return DifferenceOutcome::default();
            }
        };

        // select_pair 保证两个键都存在
        let (group_a, group_b) = match (groups.remove(&key_a), groups.remove(&key_b)) {
            (Some(a), Some(b)) => (a, b),
            _ => return DifferenceOutcome::default(),
        };

        let rows = fields
            .iter()
            .enumerate()
            .map(|(index, spec)| {
                let value_a = group_a.value_or_zero(&spec.name);
                let value_b = group_b.value_or_zero(&spec.name);
                DifferenceRow {
                    parameter: self.label_rules.label(&spec.name, index),
                    field: spec.name.clone(),
                    unit: spec.unit.clone(),
                    method: self.classifier.classify(&spec.name),
                    group_a: key_a.clone(),
                    group_b: key_b.clone(),
                    value_a,
                    value_b,
                    value: round3(value_a - value_b),
                }
            })
            .collect();

        DifferenceOutcome {
            group_a: Some(group_a),
            group_b: Some(group_b),
            rows,
        }
    }
}

/// 按策略选出两个分组键
fn select_pair(
    groups: &BTreeMap<String, AggregatedGroup>,
    pair: &GroupPair,
) -> Option<(String, String)> {
    match pair {
        GroupPair::Fixed { first, second } => {
            if first != second && groups.contains_key(first) && groups.contains_key(second) {
                Some((first.clone(), second.clone()))
            } else {
                None
            }
        }
        GroupPair::FirstTwoSorted => {
            let mut keys = groups.keys();
            match (keys.next(), keys.next()) {
                (Some(a), Some(b)) => Some((a.clone(), b.clone())),
                _ => None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::record::{FieldValue, Record};
    use crate::domain::types::AggregationMethod;

    fn unit_record(unit: &str, weight: f64) -> Record {
        Record::from_pairs(vec![
            ("发货单位", FieldValue::from(unit)),
            ("湿重(t)", FieldValue::from(weight)),
        ])
    }

    fn fields() -> Vec<FieldSpec> {
        vec![FieldSpec::new("湿重(t)", "t")]
    }

    #[test]
    fn test_round3() {
        assert_eq!(round3(16.66666), 16.667);
        assert_eq!(round3(-16.66666), -16.667);
        assert_eq!(round3(9.0), 9.0);
    }

    #[test]
    fn test_label_strip_rules() {
        let rules = LabelRules::default();
        assert_eq!(rules.strip("水分(%)"), "水分");
        assert_eq!(rules.strip("进厂湿重（t）"), "湿重");
        assert_eq!(rules.strip("本班处理量合计(t)"), "处理量");
        assert_eq!(rules.strip("(t)"), "(t)");
        assert_eq!(rules.label("水分(%)", 2), "水分_2");
    }

    #[test]
    fn test_first_two_sorted_sum_difference() {
        let set = RecordSet::new(vec![
            unit_record("B矿业", 3.0),
            unit_record("A矿业", 5.0),
            unit_record("A矿业", 7.0),
        ]);
        let outcome = DifferenceCalculator::default().calculate(
            &set,
            &fields(),
            "发货单位",
            &GroupPair::FirstTwoSorted,
        );

        assert_eq!(outcome.rows.len(), 1);
        let row = &outcome.rows[0];
        assert_eq!(row.group_a, "A矿业");
        assert_eq!(row.group_b, "B矿业");
        assert_eq!(row.value_a, 12.0);
        assert_eq!(row.value_b, 3.0);
        assert_eq!(row.value, 9.0);
        assert_eq!(row.method, AggregationMethod::Sum);
        assert_eq!(row.unit, "t");
    }

    #[test]
    fn test_single_group_yields_empty() {
        let set = RecordSet::new(vec![unit_record("A矿业", 5.0), unit_record("A矿业", 7.0)]);
        let outcome = DifferenceCalculator::default().calculate(
            &set,
            &fields(),
            "发货单位",
            &GroupPair::FirstTwoSorted,
        );
        assert!(outcome.is_empty());
        assert!(outcome.group_a.is_none());
    }

    #[test]
    fn test_fixed_pair_missing_group_yields_empty() {
        let set = RecordSet::new(vec![unit_record("白班", 5.0), unit_record("中班", 7.0)]);
        let pair = GroupPair::Fixed {
            first: "白班".to_string(),
            second: "夜班".to_string(),
        };
        let outcome = DifferenceCalculator::default().calculate(&set, &fields(), "发货单位", &pair);
        assert!(outcome.is_empty());
    }

    #[test]
    fn test_missing_field_treated_as_zero() {
        let set = RecordSet::new(vec![unit_record("A", 5.0), unit_record("B", 2.0)]);
        let specs = vec![FieldSpec::new("湿重(t)", "t"), FieldSpec::new("金属量(t)", "t")];
        let outcome =
            DifferenceCalculator::default().calculate(&set, &specs, "发货单位", &GroupPair::FirstTwoSorted);
        assert_eq!(outcome.rows.len(), 2);
        assert_eq!(outcome.rows[1].value_a, 0.0);
        assert_eq!(outcome.rows[1].value, 0.0);
    }

    #[test]
    fn test_duplicate_labels_made_unique() {
        let set = RecordSet::new(vec![
            Record::from_pairs(vec![
                ("发货单位", FieldValue::from("A")),
                ("进厂湿重(t)", FieldValue::from(1.0)),
                ("出厂湿重(t)", FieldValue::from(2.0)),
            ]),
            Record::from_pairs(vec![
                ("发货单位", FieldValue::from("B")),
                ("进厂湿重(t)", FieldValue::from(1.0)),
                ("出厂湿重(t)", FieldValue::from(2.0)),
            ]),
        ]);
        let specs = vec![FieldSpec::new("进厂湿重(t)", "t"), FieldSpec::new("出厂湿重(t)", "t")];
        let outcome =
            DifferenceCalculator::default().calculate(&set, &specs, "发货单位", &GroupPair::FirstTwoSorted);
        assert_eq!(outcome.rows[0].parameter, "湿重_0");
        assert_eq!(outcome.rows[1].parameter, "湿重_1");
    }
}
