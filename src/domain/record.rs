// ==========================================
// 选矿厂生产数据对比系统 - 记录模型
// ==========================================
// 职责: 定义扁平记录 (Record) 与记录集 (RecordSet)
// 约束: 字段值在导入时一次性判定为 数值/文本/缺失
// ==========================================

use crate::domain::types::DataSource;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// FieldValue - 字段值
// ==========================================
// 序列化为 number / string / null
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Text(String),
    #[default]
    Absent,
}

impl FieldValue {
    /// 取有限数值（NaN / 无穷视为非数值）
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(v) if v.is_finite() => Some(*v),
            _ => None,
        }
    }

    /// 取文本值（数值按最短表示转换）
    pub fn as_text(&self) -> Option<String> {
        match self {
            FieldValue::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed.to_string())
                }
            }
            FieldValue::Number(v) if v.is_finite() => Some(v.to_string()),
            _ => None,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, FieldValue::Absent)
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Number(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::Text(v.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        FieldValue::Text(v)
    }
}

/// 单个字段（保持源列顺序）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub value: FieldValue,
    /// 源单元格原文；仅在数值的最短表示与原文不同时保留（如 "012" / "1,000"）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
}

impl Field {
    /// 文本形式：优先源单元格原文，分组值据此区分 "012" 与 "12"
    pub fn text(&self) -> Option<String> {
        match &self.raw {
            Some(raw) if !raw.trim().is_empty() => Some(raw.trim().to_string()),
            _ => self.value.as_text(),
        }
    }
}

// ==========================================
// Record - 扁平记录
// ==========================================
// 一条班报 / 一张磅单
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: Vec<Field>,
}

impl Record {
    pub fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// 从 (字段名, 值) 列表构建；重名字段后者覆盖前者
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<FieldValue>,
    {
        let mut record = Self::new();
        for (k, v) in pairs {
            record.insert(k, v);
        }
        record
    }

    /// 写入字段；已存在则原位替换
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) {
        self.insert_cell(name, value, None);
    }

    /// 写入字段并保留源单元格原文
    pub fn insert_cell(
        &mut self,
        name: impl Into<String>,
        value: impl Into<FieldValue>,
        raw: Option<String>,
    ) {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|f| f.name == name) {
            Some(existing) => {
                existing.value = value;
                existing.raw = raw;
            }
            None => self.fields.push(Field { name, value, raw }),
        }
    }

    fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.field(name).map(|f| &f.value)
    }

    /// 数值字段（缺失或不可解析返回 None）
    pub fn number(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(FieldValue::as_number)
    }

    /// 文本字段（缺失或空白返回 None；数值字段返回源单元格原文）
    pub fn text(&self, name: &str) -> Option<String> {
        self.field(name).and_then(Field::text)
    }

    /// 字段名（源列顺序）
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

// ==========================================
// DateRange - 日期区间（闭区间）
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// 构建日期区间；start > end 返回 None
    pub fn new(start: NaiveDate, end: NaiveDate) -> Option<Self> {
        if start > end {
            None
        } else {
            Some(Self { start, end })
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

// ==========================================
// RecordSet - 记录集
// ==========================================
// 由外部取数协作方提供，对比引擎只读
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RecordSet {
    pub source: Option<DataSource>,
    pub range: Option<DateRange>,
    pub records: Vec<Record>,
}

impl RecordSet {
    pub fn new(records: Vec<Record>) -> Self {
        Self {
            source: None,
            range: None,
            records,
        }
    }

    pub fn with_source(mut self, source: DataSource) -> Self {
        self.source = Some(source);
        self
    }

    pub fn with_range(mut self, range: DateRange) -> Self {
        self.range = Some(range);
        self
    }

    pub fn first(&self) -> Option<&Record> {
        self.records.first()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_preserves_column_order() {
        let record = Record::from_pairs(vec![
            ("班次", FieldValue::from("白班")),
            ("湿重(t)", FieldValue::from(10.0)),
            ("水分(%)", FieldValue::from(8.5)),
        ]);
        let names: Vec<&str> = record.field_names().collect();
        assert_eq!(names, vec!["班次", "湿重(t)", "水分(%)"]);
    }

    #[test]
    fn test_record_insert_replaces_in_place() {
        let mut record = Record::from_pairs(vec![("a", 1.0), ("b", 2.0)]);
        record.insert("a", 5.0);
        assert_eq!(record.len(), 2);
        assert_eq!(record.number("a"), Some(5.0));
        assert_eq!(record.field_names().next(), Some("a"));
    }

    #[test]
    fn test_field_value_number_only_finite() {
        assert_eq!(FieldValue::Number(f64::NAN).as_number(), None);
        assert_eq!(FieldValue::Number(f64::INFINITY).as_number(), None);
        assert_eq!(FieldValue::Text("12".to_string()).as_number(), None);
        assert_eq!(FieldValue::Number(1.5).as_number(), Some(1.5));
    }

    #[test]
    fn test_field_value_serde_untagged() {
        let record = Record::from_pairs(vec![
            ("w", FieldValue::Number(1.5)),
            ("s", FieldValue::Text("N/A".to_string())),
            ("n", FieldValue::Absent),
        ]);
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(
            json,
            r#"[{"name":"w","value":1.5},{"name":"s","value":"N/A"},{"name":"n","value":null}]"#
        );
        let back: Record = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_text_prefers_source_cell() {
        let mut record = Record::new();
        record.insert_cell("发货单位", 12.0, Some("012".to_string()));
        record.insert("班次", 2.0);

        assert_eq!(record.text("发货单位").as_deref(), Some("012"));
        assert_eq!(record.number("发货单位"), Some(12.0));
        assert_eq!(record.text("班次").as_deref(), Some("2"));

        // 覆盖写入时原文随之清除
        record.insert("发货单位", 12.0);
        assert_eq!(record.text("发货单位").as_deref(), Some("12"));
    }

    #[test]
    fn test_source_cell_survives_json() {
        let mut record = Record::new();
        record.insert_cell("发货单位", 1000.0, Some("1,000".to_string()));
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"[{"name":"发货单位","value":1000.0,"raw":"1,000"}]"#);
        let back: Record = serde_json::from_str(&json).unwrap();
        assert_eq!(back.text("发货单位").as_deref(), Some("1,000"));
    }

    #[test]
    fn test_date_range_rejects_inverted() {
        let a = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let b = NaiveDate::from_ymd_opt(2025, 3, 5).unwrap();
        assert!(DateRange::new(b, a).is_none());
        let range = DateRange::new(a, b).unwrap();
        assert!(range.contains(a));
        assert!(range.contains(b));
        assert!(!range.contains(NaiveDate::from_ymd_opt(2025, 3, 6).unwrap()));
    }
}
