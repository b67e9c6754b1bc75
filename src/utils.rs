//! 通用辅助函数：
//! - 环境变量读取与解析（`GALAXY_*` 覆盖项）
//! - 展示名、ID 等文本转换
//! - 交互模式判定

use std::{env, io::IsTerminal};

/// 可选读取 String 环境变量（去除首尾空白，空串视为未设置）。
pub(crate) fn env_opt_string(key: &str) -> Option<String> {
    env::var(key).ok().map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

/// 读取布尔环境变量的真值（1/true/on/yes/y）。
pub(crate) fn env_bool_truthy(key: &str) -> Option<bool> {
    env_opt_string(key).map(|v| parse_truthy(&v))
}

fn parse_truthy(v: &str) -> bool {
    matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "on" | "yes" | "y")
}

/// CLI 开关优先，其次环境变量
pub(crate) fn flag_or_env(flag: bool, key: &str) -> bool {
    flag || env_bool_truthy(key).unwrap_or(false)
}

/// 是否需要以非交互方式运行：`--yes`、`GALAXY_YES` 或 stdin 不是终端
pub(crate) fn non_interactive(yes: bool) -> bool {
    flag_or_env(yes, "GALAXY_YES") || !std::io::stdin().is_terminal()
}

/// `my-cool-app` → `My Cool App`
pub(crate) fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut at_word_start = true;
    for c in s.chars() {
        let c = if c == '-' { ' ' } else { c };
        if at_word_start && c.is_alphanumeric() {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        at_word_start = !(c.is_alphanumeric() || c == '_');
    }
    out
}

/// 小写并把连续空白换成 `-`，用于由显示名推导配置 ID
pub(crate) fn slugify(s: &str) -> String {
    s.trim().to_lowercase().split_whitespace().collect::<Vec<_>>().join("-")
}

/// `billing-v2` → `NEXT_PUBLIC_FEATURE_BILLING_V2_URL`
pub(crate) fn feature_env_var(id: &str) -> String {
    format!("NEXT_PUBLIC_FEATURE_{}_URL", id.to_uppercase().replace('-', "_"))
}
