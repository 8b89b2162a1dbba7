// ==========================================
// 选矿厂生产数据对比系统 - 分组聚合引擎
// ==========================================
// 职责: 按分组字段拆分记录集，并把每组数值字段聚合为单值
// 输入: RecordSet + 分组字段名
// 输出: BTreeMap<分组值, AggregatedGroup>（按分组值字典序）
// ==========================================

use crate::domain::comparison::{AggregatedField, AggregatedGroup};
use crate::domain::record::{Record, RecordSet};
use crate::domain::types::AggregationMethod;
use crate::engine::classifier::FieldClassifier;
use std::collections::BTreeMap;
use tracing::{debug, instrument};

// ==========================================
// GroupAggregator - 分组聚合引擎
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct GroupAggregator {
    classifier: FieldClassifier,
}

impl GroupAggregator {
    pub fn new() -> Self {
        Self {
            classifier: FieldClassifier::new(),
        }
    }

    /// 按分组字段拆分记录（缺少分组值的记录被丢弃）
    pub fn group_by<'a>(
        &self,
        set: &'a RecordSet,
        discriminator: &str,
    ) -> BTreeMap<String, Vec<&'a Record>> {
        let mut groups: BTreeMap<String, Vec<&'a Record>> = BTreeMap::new();
        let mut dropped = 0usize;

        for record in &set.records {
            match record.text(discriminator) {
                Some(key) => groups.entry(key).or_default().push(record),
                None => dropped += 1,
            }
        }

        if dropped > 0 {
            debug!(dropped, discriminator = %discriminator, "记录缺少分组字段，已忽略");
        }
        groups
    }

    /// 分组并聚合
    #[instrument(skip(self, set), fields(records = set.len()))]
    pub fn aggregate(
        &self,
        set: &RecordSet,
        discriminator: &str,
    ) -> BTreeMap<String, AggregatedGroup> {
        self.group_by(set, discriminator)
            .into_iter()
            .map(|(key, records)| {
                let group = self.aggregate_group(&key, discriminator, &records);
                (key, group)
            })
            .collect()
    }

    /// 聚合单个分组
    ///
    /// 数值字段取自组内首条记录的列（按列顺序）；首条记录该值不可解析时，
    /// 只要组内其他记录有数值仍参与聚合。分组字段本身不参与聚合
    pub fn aggregate_group(
        &self,
        group_key: &str,
        discriminator: &str,
        records: &[&Record],
    ) -> AggregatedGroup {
        let numeric_fields: Vec<&str> = match records.first() {
            Some(first) => first
                .field_names()
                .filter(|name| *name != discriminator)
                .filter(|name| {
                    let numeric = records.iter().any(|r| r.number(name).is_some());
                    if numeric && first.number(name).is_none() {
                        debug!(field = %name, group = %group_key, "首条记录值不可解析，按其余记录聚合");
                    }
                    numeric
                })
                .collect(),
            None => Vec::new(),
        };

        let fields = numeric_fields
            .iter()
            .map(|field| self.aggregate_field(field, &numeric_fields, records))
            .collect();

        AggregatedGroup {
            group_key: group_key.to_string(),
            discriminator_field: discriminator.to_string(),
            record_count: records.len(),
            fields,
        }
    }

    fn aggregate_field(
        &self,
        field: &str,
        numeric_fields: &[&str],
        records: &[&Record],
    ) -> AggregatedField {
        match self.classifier.classify(field) {
            AggregationMethod::Sum => AggregatedField {
                field: field.to_string(),
                method: AggregationMethod::Sum,
                value: sum(field, records),
                weight_field: None,
            },
            AggregationMethod::WeightedAverage => {
                let weight_field = numeric_fields
                    .iter()
                    .copied()
                    .find(|name| *name != field && self.classifier.is_weight_field(name));

                match weight_field.and_then(|w| weighted_average(field, w, records).map(|v| (w, v)))
                {
                    Some((w, value)) => AggregatedField {
                        field: field.to_string(),
                        method: AggregationMethod::WeightedAverage,
                        value,
                        weight_field: Some(w.to_string()),
                    },
                    None => {
                        debug!(field = %field, "无可用权重，回退为简单平均");
                        AggregatedField {
                            field: field.to_string(),
                            method: AggregationMethod::Average,
                            value: average(field, records),
                            weight_field: None,
                        }
                    }
                }
            }
            AggregationMethod::Average => AggregatedField {
                field: field.to_string(),
                method: AggregationMethod::Average,
                value: average(field, records),
                weight_field: None,
            },
        }
    }
}

// ==========================================
// 聚合算子
// ==========================================
// 不可解析的值只从当前字段中剔除

fn sum(field: &str, records: &[&Record]) -> f64 {
    records.iter().filter_map(|r| r.number(field)).sum()
}

fn average(field: &str, records: &[&Record]) -> f64 {
    let values: Vec<f64> = records.iter().filter_map(|r| r.number(field)).collect();
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// Σ(value × weight) / Σ(weight)；总权重为 0 返回 None
fn weighted_average(field: &str, weight_field: &str, records: &[&Record]) -> Option<f64> {
    let mut weighted_sum = 0.0;
    let mut total_weight = 0.0;

    for record in records {
        if let Some(value) = record.number(field) {
            let weight = record.number(weight_field).unwrap_or(0.0);
            weighted_sum += value * weight;
            total_weight += weight;
        }
    }

    if total_weight == 0.0 {
        None
    } else {
        Some(weighted_sum / total_weight)
    }
}
