// ==========================================
// 选矿厂生产数据对比系统 - 命令行接口
// ==========================================
// 职责: clap 参数定义 + 对比 / 导入结果的文本渲染
// 渲染函数独立于 main，便于单元测试
// ==========================================

use crate::api::{ComparisonResponse, ImportApiResponse};
use crate::config::ComparisonProfile;
use crate::i18n::method_name;
use crate::logging::LogFormat;
use clap::{Parser, Subcommand};
use std::fmt::Write as _;
use std::path::PathBuf;

/// 选矿厂生产数据对比系统
///
/// 示例:
///   plant-compare import --source shift ./班报-2025-03.xlsx
///   plant-compare compare --profile shift_production --start 2025-03-01 --end 2025-03-31
///   plant-compare compare-file --profile weighbridge_shipment ./磅单.csv
///   plant-compare profiles
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// SQLite 数据库路径
    #[arg(long, value_name = "FILE", env = "PLANT_COMPARE_DB_PATH", global = true)]
    pub db: Option<String>,

    /// 输出格式
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table, global = true)]
    pub format: OutputFormat,

    /// 消息语言（zh-CN / en）
    #[arg(long, default_value = "zh-CN", global = true)]
    pub locale: String,

    /// 输出调试日志
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// 日志格式（写入 stderr）
    #[arg(long, value_enum, default_value_t = LogFormat::Text, global = true)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// 导入班报或磅单（.csv / .xlsx / .xls / .json）
    Import {
        /// 数据来源: SHIFT_PRODUCTION 或 WEIGHBRIDGE
        #[arg(short, long)]
        source: String,

        /// 日期列名
        #[arg(long, default_value = crate::importer::DEFAULT_DATE_FIELD)]
        date_field: String,

        #[arg(required = true, value_name = "FILE")]
        files: Vec<PathBuf>,
    },

    /// 按日期区间（闭区间）对比已导入记录
    Compare {
        #[arg(short, long)]
        profile: String,

        /// 开始日期（YYYY-MM-DD）
        #[arg(long)]
        start: String,

        /// 结束日期（YYYY-MM-DD）
        #[arg(long)]
        end: String,
    },

    /// 直接读取文件对比（不落库）
    CompareFile {
        #[arg(short, long)]
        profile: String,

        /// 日期列名；指定后丢弃日期不可解析的行
        #[arg(long)]
        date_field: Option<String>,

        #[arg(long, requires = "end", requires = "date_field")]
        start: Option<String>,

        #[arg(long, requires = "start")]
        end: Option<String>,

        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// 撤销导入批次及其全部记录
    CancelImport {
        batch_id: String,
    },

    /// 列出对比方案
    Profiles,
}

/// 结果输出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// 文本表格（默认）
    #[default]
    Table,
    /// JSON
    Json,
}

impl Args {
    /// 解析命令行参数
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

/// 对比结果 → 文本表格
pub fn render_comparison(response: &ComparisonResponse) -> String {
    let mut out = String::new();
    let result = &response.result;

    if !response.has_data {
        let _ = writeln!(out, "{}", response.message);
        return out;
    }

    let group_a = result.group_a.as_ref().map(|g| g.group_key.as_str()).unwrap_or("-");
    let group_b = result.group_b.as_ref().map(|g| g.group_key.as_str()).unwrap_or("-");

    let _ = writeln!(
        out,
        "{} ({}; {}: {} vs {})",
        result.profile_id, response.sign_convention, result.discriminator_field, group_a, group_b
    );
    let _ = writeln!(
        out,
        "{:<20} {:>12} {:>12} {:>12} {:<6} {}",
        "parameter", group_a, group_b, "diff", "unit", "method"
    );
    for row in &result.rows {
        let _ = writeln!(
            out,
            "{:<20} {:>12.3} {:>12.3} {:>12.3} {:<6} {}",
            row.parameter,
            row.value_a,
            row.value_b,
            row.value,
            row.unit,
            method_name(row.method)
        );
    }
    let _ = writeln!(out, "{}", response.message);
    out
}

/// 导入结果 → 文本
pub fn render_import(response: &ImportApiResponse) -> String {
    let mut out = format!("[{}] {}\n", response.batch_id, response.message);
    for skipped in &response.skipped_rows {
        let _ = writeln!(out, "  row {}: {}", skipped.row_number, skipped.reason);
    }
    out
}

/// 对比方案列表 → 文本
pub fn render_profiles(profiles: &[ComparisonProfile]) -> String {
    let mut out = String::new();
    for p in profiles {
        let _ = writeln!(
            out,
            "{:<24} {:<18} {} [{}] {}",
            p.profile_id,
            p.source,
            p.display_name,
            p.discriminator_field,
            p.field_names().join(", ")
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_parse_compare_command() {
        let args = Args::try_parse_from([
            "plant-compare",
            "--format",
            "json",
            "compare",
            "--profile",
            "shift_production",
            "--start",
            "2025-03-01",
            "--end",
            "2025-03-31",
        ])
        .unwrap();
        assert_eq!(args.format, OutputFormat::Json);
        assert_eq!(args.log_format, LogFormat::Text);
        assert!(matches!(args.command, Command::Compare { ref profile, .. } if profile == "shift_production"));
    }

    #[test]
    fn test_parse_json_log_format() {
        let args = Args::try_parse_from(["plant-compare", "--log-format", "json", "profiles"]).unwrap();
        assert_eq!(args.log_format, LogFormat::Json);
        assert!(matches!(args.command, Command::Profiles));
    }

    #[test]
    fn test_import_requires_files() {
        assert!(Args::try_parse_from(["plant-compare", "import", "--source", "shift"]).is_err());
    }

    #[test]
    fn test_render_profiles() {
        let text = render_profiles(&ComparisonProfile::presets());
        assert!(text.contains("shift_production"));
        assert!(text.contains("发货单位"));
    }
}
