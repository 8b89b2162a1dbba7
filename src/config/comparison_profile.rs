// ==========================================
// 选矿厂生产数据对比系统 - 对比方案
// ==========================================
// 职责: 对比看板的字段清单/单位/分组字段/分组策略
// 存储: 内置预设 + config_kv 覆写（JSON）
// ==========================================

use crate::domain::comparison::FieldSpec;
use crate::domain::types::{DataSource, GroupPair};
use crate::engine::difference::LabelRules;
use serde::{Deserialize, Serialize};

/// 班次生产对比方案 ID
pub const SHIFT_PRODUCTION_PROFILE: &str = "shift_production";
/// 地磅发货单位对比方案 ID
pub const WEIGHBRIDGE_SHIPMENT_PROFILE: &str = "weighbridge_shipment";

// ==========================================
// ComparisonProfile - 对比方案
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonProfile {
    pub profile_id: String,
    pub display_name: String,
    pub source: DataSource,
    /// 分组字段（班次 / 发货单位）
    pub discriminator_field: String,
    pub pair: GroupPair,
    /// 请求字段（顺序即输出顺序）
    pub fields: Vec<FieldSpec>,
    #[serde(default)]
    pub label_rules: LabelRules,
}

impl ComparisonProfile {
    /// 班次生产数据：白班 vs 夜班
    pub fn shift_production() -> Self {
        Self {
            profile_id: SHIFT_PRODUCTION_PROFILE.to_string(),
            display_name: "班次生产数据对比".to_string(),
            source: DataSource::ShiftProduction,
            discriminator_field: "班次".to_string(),
            pair: GroupPair::Fixed {
                first: "白班".to_string(),
                second: "夜班".to_string(),
            },
            fields: vec![
                FieldSpec::new("处理量湿重(t)", "t"),
                FieldSpec::new("水分(%)", "%"),
                FieldSpec::new("原矿品位(%)", "%"),
                FieldSpec::new("精矿品位(%)", "%"),
                FieldSpec::new("尾矿品位(%)", "%"),
                FieldSpec::new("回收率(%)", "%"),
                FieldSpec::new("精矿金属量(t)", "t"),
            ],
            label_rules: LabelRules::default(),
        }
    }

    /// 地磅数据：字典序前两个发货单位
    pub fn weighbridge_shipment() -> Self {
        Self {
            profile_id: WEIGHBRIDGE_SHIPMENT_PROFILE.to_string(),
            display_name: "发货单位数据对比".to_string(),
            source: DataSource::Weighbridge,
            discriminator_field: "发货单位".to_string(),
            pair: GroupPair::FirstTwoSorted,
            fields: vec![
                FieldSpec::new("湿重(t)", "t"),
                FieldSpec::new("水分(%)", "%"),
                FieldSpec::new("干重(t)", "t"),
                FieldSpec::new("品位(%)", "%"),
                FieldSpec::new("金属量(t)", "t"),
            ],
            label_rules: LabelRules::default(),
        }
    }

    /// 全部内置预设
    pub fn presets() -> Vec<Self> {
        vec![Self::shift_production(), Self::weighbridge_shipment()]
    }

    /// 按 ID 查内置预设
    pub fn preset(profile_id: &str) -> Option<Self> {
        Self::presets()
            .into_iter()
            .find(|p| p.profile_id == profile_id)
    }

    /// 方案自检：分组字段与字段清单不能为空
    pub fn validate(&self) -> Result<(), String> {
        if self.profile_id.trim().is_empty() {
            return Err("方案ID不能为空".to_string());
        }
        if self.discriminator_field.trim().is_empty() {
            return Err("分组字段不能为空".to_string());
        }
        if self.fields.is_empty() {
            return Err("对比字段不能为空".to_string());
        }
        if let GroupPair::Fixed { first, second } = &self.pair {
            if first == second {
                return Err(format!("固定分组的两个值不能相同: {}", first));
            }
        }
        Ok(())
    }

    /// 请求字段名
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }
}
