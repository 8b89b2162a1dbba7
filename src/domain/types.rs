// ==========================================
// 选矿厂生产数据对比系统 - 领域类型定义
// ==========================================
// 聚合方式 / 数据来源 / 对比分组策略
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 聚合方式 (Aggregation Method)
// ==========================================
// 由字段名决定,同一字段名永远得到同一种方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AggregationMethod {
    Sum,             // 累加(重量/数量/金属量)
    #[serde(rename = "WEIGHTED_AVG")]
    WeightedAverage, // 按重量加权平均(品位/水分/回收率/%)
    #[serde(rename = "AVG")]
    Average,         // 简单平均
}

impl AggregationMethod {
    /// 国际化键
    pub fn i18n_key(&self) -> &'static str {
        match self {
            AggregationMethod::Sum => "method.sum",
            AggregationMethod::WeightedAverage => "method.weighted_avg",
            AggregationMethod::Average => "method.avg",
        }
    }
}

impl fmt::Display for AggregationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AggregationMethod::Sum => write!(f, "SUM"),
            AggregationMethod::WeightedAverage => write!(f, "WEIGHTED_AVG"),
            AggregationMethod::Average => write!(f, "AVG"),
        }
    }
}

// ==========================================
// 数据来源 (Data Source)
// ==========================================
// 序列化格式: SCREAMING_SNAKE_CASE (与数据库一致)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DataSource {
    ShiftProduction, // 班次生产报表
    Weighbridge,     // 地磅进出厂数据
}

impl DataSource {
    /// 数据库存储代码
    pub fn code(&self) -> &'static str {
        match self {
            DataSource::ShiftProduction => "SHIFT_PRODUCTION",
            DataSource::Weighbridge => "WEIGHBRIDGE",
        }
    }

    /// 解析数据库代码或命令行简写
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_uppercase().as_str() {
            "SHIFT_PRODUCTION" | "PRODUCTION" | "SHIFT" => Some(DataSource::ShiftProduction),
            "WEIGHBRIDGE" | "SHIPMENT" => Some(DataSource::Weighbridge),
            _ => None,
        }
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

// ==========================================
// 对比分组策略 (Group Pair)
// ==========================================
// Fixed: 生产数据固定比较两个班次(如 白班 vs 夜班)
// FirstTwoSorted: 发货数据取字典序最小的两个发货单位
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GroupPair {
    Fixed { first: String, second: String },
    FirstTwoSorted,
}

impl GroupPair {
    /// 交换比较顺序（仅 Fixed 有意义）
    pub fn swapped(&self) -> Self {
        match self {
            GroupPair::Fixed { first, second } => GroupPair::Fixed {
                first: second.clone(),
                second: first.clone(),
            },
            GroupPair::FirstTwoSorted => GroupPair::FirstTwoSorted,
        }
    }
}

impl fmt::Display for GroupPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupPair::Fixed { first, second } => write!(f, "FIXED({} vs {})", first, second),
            GroupPair::FirstTwoSorted => write!(f, "FIRST_TWO_SORTED"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_serde_codes() {
        assert_eq!(
            serde_json::to_string(&AggregationMethod::WeightedAverage).unwrap(),
            "\"WEIGHTED_AVG\""
        );
        assert_eq!(
            serde_json::to_string(&AggregationMethod::Sum).unwrap(),
            "\"SUM\""
        );
        assert_eq!(AggregationMethod::Average.to_string(), "AVG");
    }

    #[test]
    fn test_data_source_parse() {
        assert_eq!(DataSource::parse("production"), Some(DataSource::ShiftProduction));
        assert_eq!(DataSource::parse(" WEIGHBRIDGE "), Some(DataSource::Weighbridge));
        assert_eq!(DataSource::parse("unknown"), None);
    }

    #[test]
    fn test_group_pair_serde() {
        let pair = GroupPair::Fixed {
            first: "白班".to_string(),
            second: "夜班".to_string(),
        };
        let json = serde_json::to_string(&pair).unwrap();
        assert!(json.contains("\"type\":\"FIXED\""));
        let back: GroupPair = serde_json::from_str(&json).unwrap();
        assert_eq!(back, pair);
        assert_eq!(pair.swapped().swapped(), pair);
    }
}
