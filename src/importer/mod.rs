// ==========================================
// 选矿厂生产数据对比系统 - 导入层
// ==========================================
// 职责: 班报 / 磅单文件导入,生成带类型记录
// 支持: Excel, CSV, JSON
// ==========================================

// 模块声明
pub mod data_cleaner;
pub mod error;
pub mod file_parser;
pub mod record_importer;

// 重导出核心类型
pub use data_cleaner::DataCleaner;
pub use error::{ImportError, ImportResult};
pub use file_parser::{
    CsvParser, ExcelParser, FileParser, JsonParser, RawRow, UniversalFileParser,
};
pub use record_importer::{
    load_record_set, RecordImporter, RecordImporterImpl, DEFAULT_DATE_FIELD,
};
