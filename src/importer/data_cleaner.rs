// ==========================================
// 选矿厂生产数据对比系统 - 数据清洗器
// ==========================================
// 职责: 单元格文本 → 带类型的字段值（数值/文本/缺失）
//       记录日期解析
// 约束: 类型在导入时一次性判定，下游不再反复解析字符串
// ==========================================

use crate::domain::record::{FieldValue, Record};
use crate::importer::file_parser::RawRow;
use chrono::{Duration, NaiveDate, NaiveDateTime};

/// 视为缺失的文本
const NULL_TOKENS: &[&str] = &["", "null", "none", "nil", "undefined"];

/// Excel 日期序列号起点（1900 日期系统）
fn excel_epoch() -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(1899, 12, 30)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DataCleaner;

impl DataCleaner {
    pub fn new() -> Self {
        Self
    }

    /// 单元格文本判定为字段值
    ///
    /// - 空白/null 类 → Absent
    /// - 数值（允许千分位逗号、末尾 %）→ Number
    /// - 其他（如 "N/A"）→ Text
    pub fn tag_value(&self, raw: &str) -> FieldValue {
        let trimmed = raw.trim();
        if NULL_TOKENS.contains(&trimmed.to_lowercase().as_str()) {
            return FieldValue::Absent;
        }

        match self.parse_number(trimmed) {
            Some(v) => FieldValue::Number(v),
            None => FieldValue::Text(trimmed.to_string()),
        }
    }

    /// 解析数值文本；非有限数返回 None
    pub fn parse_number(&self, text: &str) -> Option<f64> {
        let cleaned: String = text
            .trim()
            .trim_end_matches(['%', '％'])
            .trim()
            .chars()
            .filter(|c| *c != ',')
            .collect();

        if cleaned.is_empty() {
            return None;
        }
        // 拒绝 "inf" / "NaN" 等 Rust 可解析但非业务数值的写法
        if !cleaned
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E'))
        {
            return None;
        }

        cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
    }

    /// 解析记录日期
    ///
    /// 支持: YYYYMMDD / YYYY-MM-DD / YYYY/MM/DD（可带时间部分）/ Excel 日期序列号
    pub fn parse_record_date(&self, raw: &str) -> Option<NaiveDate> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }

        for fmt in ["%Y-%m-%d", "%Y/%m/%d", "%Y%m%d"] {
            if let Ok(date) = NaiveDate::parse_from_str(trimmed, fmt) {
                return Some(date);
            }
        }

        for fmt in ["%Y-%m-%d %H:%M:%S", "%Y/%m/%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
            if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, fmt) {
                return Some(dt.date());
            }
        }

        // Excel 日期序列号（约 1954 ~ 2119 年）
        let serial = trimmed.parse::<f64>().ok()?;
        if (20_000.0..80_000.0).contains(&serial) {
            return excel_epoch()
                .and_then(|epoch| epoch.checked_add_signed(Duration::days(serial.trunc() as i64)));
        }
        None
    }

    /// 原始行 → Record（表头去空白，列顺序保持）
    ///
    /// 数值单元格的原文与数值最短表示不同时一并保留，
    /// 以免 "012" / "1,000" 作为分组值时被合并
    pub fn clean_row(&self, row: &RawRow) -> Record {
        let mut record = Record::new();
        for (header, cell) in row {
            let name = header.trim();
            if name.is_empty() {
                continue;
            }
            let value = self.tag_value(cell);
            let raw = match &value {
                FieldValue::Number(v) if cell.trim() != v.to_string() => {
                    Some(cell.trim().to_string())
                }
                _ => None,
            };
            record.insert_cell(name, value, raw);
        }
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_value_kinds() {
        let cleaner = DataCleaner::new();
        assert_eq!(cleaner.tag_value(" 12.5 "), FieldValue::Number(12.5));
        assert_eq!(cleaner.tag_value("1,234.5"), FieldValue::Number(1234.5));
        assert_eq!(cleaner.tag_value("60%"), FieldValue::Number(60.0));
        assert_eq!(cleaner.tag_value("N/A"), FieldValue::Text("N/A".to_string()));
        assert_eq!(cleaner.tag_value("  "), FieldValue::Absent);
        assert_eq!(cleaner.tag_value("NULL"), FieldValue::Absent);
    }

    #[test]
    fn test_parse_number_rejects_special_floats() {
        let cleaner = DataCleaner::new();
        assert_eq!(cleaner.parse_number("inf"), None);
        assert_eq!(cleaner.parse_number("NaN"), None);
        assert_eq!(cleaner.parse_number("-3.5"), Some(-3.5));
        assert_eq!(cleaner.parse_number("1e3"), Some(1000.0));
        assert_eq!(cleaner.parse_number("%"), None);
    }

    #[test]
    fn test_parse_record_date_formats() {
        let cleaner = DataCleaner::new();
        let expected = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        assert_eq!(cleaner.parse_record_date("20250301"), Some(expected));
        assert_eq!(cleaner.parse_record_date("2025-03-01"), Some(expected));
        assert_eq!(cleaner.parse_record_date("2025/3/1"), Some(expected));
        assert_eq!(cleaner.parse_record_date("2025-03-01 08:30:00"), Some(expected));
        assert_eq!(cleaner.parse_record_date("45717"), Some(expected));
        assert_eq!(cleaner.parse_record_date("白班"), None);
        assert_eq!(cleaner.parse_record_date("12"), None);
    }

    #[test]
    fn test_clean_row_keeps_order() {
        let row: RawRow = vec![
            ("班次".to_string(), "白班".to_string()),
            (" 湿重(t) ".to_string(), "10".to_string()),
            ("".to_string(), "ignored".to_string()),
        ];
        let record = DataCleaner::new().clean_row(&row);
        let names: Vec<&str> = record.field_names().collect();
        assert_eq!(names, vec!["班次", "湿重(t)"]);
        assert_eq!(record.number("湿重(t)"), Some(10.0));
    }

    #[test]
    fn test_clean_row_keeps_numeric_code_text() {
        let cleaner = DataCleaner::new();
        let row = |unit: &str| -> RawRow { vec![("发货单位".to_string(), unit.to_string())] };

        let padded = cleaner.clean_row(&row("012"));
        let plain = cleaner.clean_row(&row("12"));
        assert_eq!(padded.number("发货单位"), Some(12.0));
        assert_eq!(padded.text("发货单位").as_deref(), Some("012"));
        assert_eq!(plain.text("发货单位").as_deref(), Some("12"));
        assert_eq!(plain.fields()[0].raw, None);

        let grouped = cleaner.clean_row(&row("1,000"));
        assert_eq!(grouped.text("发货单位").as_deref(), Some("1,000"));
    }
}
