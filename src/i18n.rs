// ==========================================
// 选矿厂生产数据对比系统 - 国际化
// ==========================================
// 文案: 空数据提示 / 对比与导入完成 / 汇总方式名 / 差值符号说明
// 语言: zh-CN（默认）、en；词条见 locales/*.yml
// 注意: rust_i18n::i18n! 宏已在 lib.rs 中初始化
// ==========================================

use crate::domain::types::AggregationMethod;

/// 获取当前语言
pub fn current_locale() -> String {
    rust_i18n::locale().to_string()
}

/// 设置语言
///
/// # 参数
/// - locale: 语言代码（"zh-CN" 或 "en"）
pub fn set_locale(locale: &str) {
    rust_i18n::set_locale(locale);
}

/// 翻译消息（无参数）
///
/// # 示例
/// ```no_run
/// use mineral_plant_compare::i18n::t;
/// let msg = t("comparison.no_data");
/// ```
pub fn t(key: &str) -> String {
    rust_i18n::t!(key).to_string()
}

/// 翻译消息（带参数，占位符形如 %{rows}）
///
/// # 示例
/// ```no_run
/// use mineral_plant_compare::i18n::t_with_args;
/// let msg = t_with_args("comparison.completed", &[("rows", "7")]);
/// ```
pub fn t_with_args(key: &str, args: &[(&str, &str)]) -> String {
    let mut result = rust_i18n::t!(key).to_string();
    for (k, v) in args {
        let placeholder = format!("%{{{}}}", k);
        result = result.replace(&placeholder, v);
    }
    result
}

/// 汇总方式的展示名
pub fn method_name(method: AggregationMethod) -> String {
    t(method.i18n_key())
}
