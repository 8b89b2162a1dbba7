// ==========================================
// 选矿厂生产数据对比系统 - 日志初始化
// ==========================================
// 输出: stderr（stdout 留给对比结果 / JSON 输出）
// 级别: RUST_LOG 优先，未设置时按 --verbose 取 debug / info
// 格式: 文本（终端）或 JSON（交给厂区日志采集）
// ==========================================

use tracing_subscriber::{fmt, EnvFilter};

/// 默认日志级别
pub const DEFAULT_LOG_LEVEL: &str = "info";
/// --verbose 时的日志级别
pub const VERBOSE_LOG_LEVEL: &str = "debug";

/// 日志输出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum LogFormat {
    /// 单行文本
    #[default]
    Text,
    /// 每行一个 JSON 事件，附带当前 span（含导入 batch_id）
    Json,
}

/// 命令行开关 → 默认级别
pub fn level_for(verbose: bool) -> &'static str {
    if verbose {
        VERBOSE_LOG_LEVEL
    } else {
        DEFAULT_LOG_LEVEL
    }
}

fn env_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

/// 初始化日志系统（文本格式，默认 info）
///
/// # 环境变量
/// - RUST_LOG: 日志级别过滤器
///   例如: RUST_LOG=mineral_plant_compare::engine=trace
pub fn init() {
    init_with(DEFAULT_LOG_LEVEL, LogFormat::Text);
}

/// 按给定默认级别与格式初始化；重复调用时忽略
pub fn init_with(default_level: &str, format: LogFormat) {
    let builder = fmt()
        .with_env_filter(env_filter(default_level))
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_line_number(true);

    let _ = match format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().with_current_span(true).try_init(),
    };
}

/// 初始化测试环境的日志系统（debug，走测试输出捕获）
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new(VERBOSE_LOG_LEVEL))
        .with_test_writer()
        .try_init();
}
