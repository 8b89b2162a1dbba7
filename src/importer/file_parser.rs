// ==========================================
// 选矿厂生产数据对比系统 - 文件解析器实现
// ==========================================
// 支持: Excel (.xlsx/.xls) / CSV (.csv) / JSON (.json，取数接口导出的对象数组)
// 输出: 按列顺序保存的 (表头, 单元格) 行
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use calamine::{open_workbook_auto, Reader};
use csv::ReaderBuilder;
use serde_json::Value;
use std::fs::File;
use std::path::Path;

/// 原始行：按列顺序的 (表头, 单元格文本)
pub type RawRow = Vec<(String, String)>;

// ==========================================
// FileParser Trait
// ==========================================
pub trait FileParser: Send + Sync {
    /// 解析文件为原始行（跳过完全空白的行）
    fn parse_to_raw_rows(&self, file_path: &Path) -> ImportResult<Vec<RawRow>>;
}

fn ensure_exists(path: &Path) -> ImportResult<()> {
    if !path.exists() {
        return Err(ImportError::FileNotFound(path.display().to_string()));
    }
    Ok(())
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

/// 表头与单元格配对；空表头列忽略
fn zip_row<I>(headers: &[String], cells: I) -> Option<RawRow>
where
    I: Iterator<Item = String>,
{
    let row: RawRow = headers
        .iter()
        .zip(cells)
        .filter(|(h, _)| !h.is_empty())
        .map(|(h, v)| (h.clone(), v.trim().to_string()))
        .collect();

    if row.iter().all(|(_, v)| v.is_empty()) {
        None
    } else {
        Some(row)
    }
}

// ==========================================
// CSV Parser 实现
// ==========================================
pub struct CsvParser;

impl FileParser for CsvParser {
    fn parse_to_raw_rows(&self, file_path: &Path) -> ImportResult<Vec<RawRow>> {
        ensure_exists(file_path)?;

        let ext = extension_of(file_path);
        if ext != "csv" {
            return Err(ImportError::UnsupportedFormat(ext));
        }

        let file = File::open(file_path)?;
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true) // 允许行长度不一致
            .from_reader(file);

        // 去除 UTF-8 BOM（Excel 导出的 CSV 常带）
        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
            .collect();

        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result?;
            if let Some(row) = zip_row(&headers, record.iter().map(str::to_string)) {
                rows.push(row);
            }
        }

        Ok(rows)
    }
}

// ==========================================
// Excel Parser 实现
// ==========================================
// 只读取第一个工作表
pub struct ExcelParser;

impl FileParser for ExcelParser {
    fn parse_to_raw_rows(&self, file_path: &Path) -> ImportResult<Vec<RawRow>> {
        ensure_exists(file_path)?;

        let ext = extension_of(file_path);
        if ext != "xlsx" && ext != "xls" {
            return Err(ImportError::UnsupportedFormat(ext));
        }

        let mut workbook = open_workbook_auto(file_path)?;

        let sheet_name = workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| ImportError::ExcelParseError("Excel 文件无工作表".to_string()))?;

        let range = workbook.worksheet_range(&sheet_name)?;

        let mut sheet_rows = range.rows();
        let header_row = sheet_rows
            .next()
            .ok_or_else(|| ImportError::NoDataRows(file_path.display().to_string()))?;

        let headers: Vec<String> = header_row
            .iter()
            .map(|cell| cell.to_string().trim().to_string())
            .collect();

        let rows = sheet_rows
            .filter_map(|data_row| zip_row(&headers, data_row.iter().map(|c| c.to_string())))
            .collect();

        Ok(rows)
    }
}

// ==========================================
// JSON Parser 实现
// ==========================================
// 输入为对象数组；数值与数值字符串统一转为单元格文本，
// 交由 DataCleaner 判定类型
pub struct JsonParser;

fn json_cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl FileParser for JsonParser {
    fn parse_to_raw_rows(&self, file_path: &Path) -> ImportResult<Vec<RawRow>> {
        ensure_exists(file_path)?;

        let ext = extension_of(file_path);
        if ext != "json" {
            return Err(ImportError::UnsupportedFormat(ext));
        }

        let file = File::open(file_path)?;
        let value: Value = serde_json::from_reader(std::io::BufReader::new(file))?;
        let items = match value {
            Value::Array(items) => items,
            _ => {
                return Err(ImportError::JsonParseError(
                    "顶层应为记录对象数组".to_string(),
                ))
            }
        };

        let mut rows = Vec::with_capacity(items.len());
        for (idx, item) in items.iter().enumerate() {
            let object = item.as_object().ok_or_else(|| {
                ImportError::JsonParseError(format!("第 {} 项不是对象", idx + 1))
            })?;
            let row: RawRow = object
                .iter()
                .map(|(k, v)| (k.trim().to_string(), json_cell(v).trim().to_string()))
                .filter(|(k, _)| !k.is_empty())
                .collect();
            if row.iter().any(|(_, v)| !v.is_empty()) {
                rows.push(row);
            }
        }

        Ok(rows)
    }
}

// ==========================================
// 通用文件解析器（根据扩展名自动选择）
// ==========================================
pub struct UniversalFileParser;

impl FileParser for UniversalFileParser {
    fn parse_to_raw_rows(&self, file_path: &Path) -> ImportResult<Vec<RawRow>> {
        match extension_of(file_path).as_str() {
            "csv" => CsvParser.parse_to_raw_rows(file_path),
            "xlsx" | "xls" => ExcelParser.parse_to_raw_rows(file_path),
            "json" => JsonParser.parse_to_raw_rows(file_path),
            other => Err(ImportError::UnsupportedFormat(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    fn csv_file(lines: &[&str]) -> tempfile::NamedTempFile {
        let mut file = Builder::new().suffix(".csv").tempfile().unwrap();
        for line in lines {
            writeln!(file, "{}", line).unwrap();
        }
        file
    }

    #[test]
    fn test_csv_parser_keeps_column_order() {
        let file = csv_file(&["日期,班次,湿重(t),水分(%)", "2025-03-01,白班,120.5,8.2"]);
        let rows = CsvParser.parse_to_raw_rows(file.path()).unwrap();

        assert_eq!(rows.len(), 1);
        let headers: Vec<&str> = rows[0].iter().map(|(h, _)| h.as_str()).collect();
        assert_eq!(headers, vec!["日期", "班次", "湿重(t)", "水分(%)"]);
        assert_eq!(rows[0][2].1, "120.5");
    }

    #[test]
    fn test_csv_parser_skip_empty_rows() {
        let file = csv_file(&["班次,湿重(t)", "白班,2.5", ",", "夜班,3.0"]);
        let rows = CsvParser.parse_to_raw_rows(file.path()).unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn test_csv_parser_strips_bom() {
        let file = csv_file(&["\u{feff}班次,湿重(t)", "白班,2.5"]);
        let rows = CsvParser.parse_to_raw_rows(file.path()).unwrap();
        assert_eq!(rows[0][0].0, "班次");
    }

    #[test]
    fn test_csv_parser_file_not_found() {
        let result = CsvParser.parse_to_raw_rows(Path::new("non_existent.csv"));
        assert!(matches!(result, Err(ImportError::FileNotFound(_))));
    }

    #[test]
    fn test_json_parser_stringifies_numbers() {
        let mut file = Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"[{{"日期":"2025-03-01","班次":"白班","湿重(t)":"8.5","水分(%)":6,"备注":null}},{{"班次":null}}]"#
        )
        .unwrap();

        let rows = UniversalFileParser.parse_to_raw_rows(file.path()).unwrap();
        assert_eq!(rows.len(), 1);
        let headers: Vec<&str> = rows[0].iter().map(|(h, _)| h.as_str()).collect();
        assert_eq!(headers, vec!["日期", "班次", "湿重(t)", "水分(%)", "备注"]);
        assert_eq!(rows[0][2].1, "8.5");
        assert_eq!(rows[0][3].1, "6");
        assert_eq!(rows[0][4].1, "");
    }

    #[test]
    fn test_json_parser_rejects_non_array() {
        let mut file = Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{"班次":"白班"}}"#).unwrap();
        let result = JsonParser.parse_to_raw_rows(file.path());
        assert!(matches!(result, Err(ImportError::JsonParseError(_))));
    }

    #[test]
    fn test_universal_parser_rejects_unknown_extension() {
        let file = Builder::new().suffix(".txt").tempfile().unwrap();
        let result = UniversalFileParser.parse_to_raw_rows(file.path());
        assert!(matches!(result, Err(ImportError::UnsupportedFormat(_))));
    }
}
