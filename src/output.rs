//! 终端输出：成功/提示/警告/错误、标题、键值对与进度指示
//! 面向用户的内容写到 stdout（错误写 stderr），诊断日志走 tracing。

use std::time::Duration;

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

pub(crate) fn success(msg: &str) {
    println!("{} {}", "✔".green().bold(), msg.green());
}

pub(crate) fn info(msg: &str) {
    println!("{} {}", "ℹ".blue().bold(), msg);
}

pub(crate) fn warn(msg: &str) {
    println!("{} {}", "⚠".yellow().bold(), msg.yellow());
}

pub(crate) fn error(msg: &str) {
    eprintln!("{} {}", "✖".red().bold(), msg.red());
}

/// 暗色提示行
pub(crate) fn hint(msg: &str) {
    println!("  {}", msg.dimmed());
}

/// 命令行示例（青色缩进）
pub(crate) fn step(msg: &str) {
    println!("  {}", msg.cyan());
}

pub(crate) fn header(msg: &str) {
    println!("\n{}", msg.bold());
}

pub(crate) fn rule(width: usize) {
    println!("{}", "━".repeat(width));
}

pub(crate) fn kv(key: &str, value: &str) {
    println!("{} {}", format!("{}:", key).cyan(), value);
}

/// 创建 spinner；非终端环境下 indicatif 会自动隐藏
pub(crate) fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    let style = ProgressStyle::with_template("{spinner:.blue} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏");
    pb.set_style(style);
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}
