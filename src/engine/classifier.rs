// ==========================================
// 选矿厂生产数据对比系统 - 字段分类器
// ==========================================
// 职责: 按字段名判定聚合方式、识别权重字段
// 约束: 纯函数,同一字段名永远得到同一结果
// ==========================================

use crate::domain::types::AggregationMethod;

/// 累加类标记（累计物理量：重量/数量/金属量）
pub const SUM_MARKERS: &[&str] = &[
    "weight",
    "quantity",
    "metal content",
    "湿重",
    "干重",
    "重量",
    "数量",
    "金属量",
];

/// 加权平均类标记（强度量/比率：百分比/品位/回收率/水分）
pub const WEIGHTED_MARKERS: &[&str] = &[
    "%", "％", "grade", "recovery", "moisture", "品位", "回收率", "水分",
];

/// 权重字段标记
pub const WEIGHT_MARKERS: &[&str] = &["wet weight", "weight", "湿重", "干重", "重量"];

fn contains_any(name: &str, markers: &[&str]) -> bool {
    let lowered = name.to_lowercase();
    markers.iter().any(|m| lowered.contains(m))
}

// ==========================================
// FieldClassifier
// ==========================================
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldClassifier;

impl FieldClassifier {
    pub fn new() -> Self {
        Self
    }

    /// 判定字段聚合方式
    ///
    /// 先判累加类，再判加权平均类，其余为简单平均
    pub fn classify(&self, field_name: &str) -> AggregationMethod {
        if contains_any(field_name, SUM_MARKERS) {
            AggregationMethod::Sum
        } else if contains_any(field_name, WEIGHTED_MARKERS) {
            AggregationMethod::WeightedAverage
        } else {
            AggregationMethod::Average
        }
    }

    /// 是否可作为加权平均的权重字段
    pub fn is_weight_field(&self, field_name: &str) -> bool {
        contains_any(field_name, WEIGHT_MARKERS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_sum_fields() {
        let c = FieldClassifier::new();
        assert_eq!(c.classify("湿重(t)"), AggregationMethod::Sum);
        assert_eq!(c.classify("金属量(t)"), AggregationMethod::Sum);
        assert_eq!(c.classify("Wet Weight (t)"), AggregationMethod::Sum);
        assert_eq!(c.classify("quantity"), AggregationMethod::Sum);
    }

    #[test]
    fn test_classify_weighted_fields() {
        let c = FieldClassifier::new();
        assert_eq!(c.classify("水分(%)"), AggregationMethod::WeightedAverage);
        assert_eq!(c.classify("原矿品位"), AggregationMethod::WeightedAverage);
        assert_eq!(c.classify("Recovery"), AggregationMethod::WeightedAverage);
        assert_eq!(c.classify("grade"), AggregationMethod::WeightedAverage);
    }

    #[test]
    fn test_classify_default_average() {
        let c = FieldClassifier::new();
        assert_eq!(c.classify("运行时间(h)"), AggregationMethod::Average);
        assert_eq!(c.classify("temperature"), AggregationMethod::Average);
    }

    #[test]
    fn test_classify_sum_checked_first() {
        let c = FieldClassifier::new();
        // 同时含两类标记时按累加处理
        assert_eq!(c.classify("重量占比(%)"), AggregationMethod::Sum);
    }

    #[test]
    fn test_classify_deterministic() {
        let c = FieldClassifier::new();
        for name in ["湿重(t)", "水分(%)", "台时"] {
            assert_eq!(c.classify(name), c.classify(name));
        }
    }

    #[test]
    fn test_weight_field_detection() {
        let c = FieldClassifier::new();
        assert!(c.is_weight_field("湿重(t)"));
        assert!(c.is_weight_field("weight"));
        assert!(!c.is_weight_field("水分(%)"));
        assert!(!c.is_weight_field("金属量(t)"));
    }
}
