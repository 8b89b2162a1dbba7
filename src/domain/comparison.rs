// ==========================================
// 选矿厂生产数据对比系统 - 对比结果模型
// ==========================================
// 职责: 聚合分组 / 差值行 / 对比结果
// 约束: 全部为一次性计算结果，不持久化
// ==========================================

use crate::domain::types::AggregationMethod;
use serde::{Deserialize, Serialize};

/// 差值符号约定（随每次结果下发给图表消费方；展示文案见 comparison.sign_convention）
pub const SIGN_CONVENTION: &str = "value = group_a - group_b";

// ==========================================
// FieldSpec - 请求字段
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// 字段名（请求名或解析后的实际字段名）
    pub name: String,
    /// 单位标签（如 "t" / "%"）
    #[serde(default)]
    pub unit: String,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, unit: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            unit: unit.into(),
        }
    }
}

// ==========================================
// AggregatedField - 单字段聚合值
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedField {
    pub field: String,
    /// 实际采用的聚合方式（加权平均无权重时回退为 AVG）
    pub method: AggregationMethod,
    pub value: f64,
    /// 加权平均使用的权重字段
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight_field: Option<String>,
}

// ==========================================
// AggregatedGroup - 聚合分组
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedGroup {
    /// 分组值（班次名 / 发货单位名）
    pub group_key: String,
    /// 分组字段名
    pub discriminator_field: String,
    pub record_count: usize,
    /// 数值字段聚合结果（按组内首条记录的字段顺序）
    pub fields: Vec<AggregatedField>,
}

impl AggregatedGroup {
    pub fn get(&self, field: &str) -> Option<&AggregatedField> {
        self.fields.iter().find(|f| f.field == field)
    }

    /// 字段聚合值；组内不存在该数值字段时为 0
    pub fn value_or_zero(&self, field: &str) -> f64 {
        self.get(field).map(|f| f.value).unwrap_or(0.0)
    }
}

// ==========================================
// DifferenceRow - 差值行
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DifferenceRow {
    /// 图表参数标签（去除前后缀并追加位置序号，保证唯一）
    pub parameter: String,
    /// 实际字段名
    pub field: String,
    pub unit: String,
    /// 由字段名判定的聚合方式
    pub method: AggregationMethod,
    pub group_a: String,
    pub group_b: String,
    pub value_a: f64,
    pub value_b: f64,
    /// value_a - value_b，保留 3 位小数
    pub value: f64,
}

// ==========================================
// ComparisonResult - 一次对比的完整输出
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub profile_id: String,
    pub discriminator_field: String,
    /// 输入记录数
    pub record_count: usize,
    /// 解析后的字段（与请求字段一一对应）
    pub resolved_fields: Vec<FieldSpec>,
    pub group_a: Option<AggregatedGroup>,
    pub group_b: Option<AggregatedGroup>,
    pub rows: Vec<DifferenceRow>,
    pub sign_convention: String,
}

impl ComparisonResult {
    /// 空结果（分组不足两个时）
    pub fn empty(profile_id: &str, discriminator_field: &str, record_count: usize) -> Self {
        Self {
            profile_id: profile_id.to_string(),
            discriminator_field: discriminator_field.to_string(),
            record_count,
            resolved_fields: Vec::new(),
            group_a: None,
            group_b: None,
            rows: Vec::new(),
            sign_convention: SIGN_CONVENTION.to_string(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
