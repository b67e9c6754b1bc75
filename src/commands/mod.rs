//! 命令调度模块：
//! - 接收解析好的 CLI 参数，确定工作目录与交互方式
//! - 调用各子命令的处理函数

mod create;
mod features;
mod init;
mod theme;

use std::env;

use anyhow::{Context, Result};

use crate::{
    cli::{Cli, Command},
    prompt,
    utils::non_interactive,
};

/// 运行指定的子命令
pub(crate) fn run(cli: Cli) -> Result<()> {
    let cwd = env::current_dir().context("Failed to read the current directory")?;
    let mut prompter = prompt::prompter(non_interactive(cli.yes));
    let prompter = prompter.as_mut();
    match cli.command {
        Command::Create(args) => create::run(args, &cwd, prompter),
        Command::Init(args) => init::run(args, &cwd, prompter),
        Command::Theme(args) => theme::run(args, &cwd, prompter),
        Command::AddFeature(args) => features::add(args, &cwd, prompter),
        Command::ListFeatures => features::list(&cwd),
        Command::RemoveFeature(args) => features::remove(args, &cwd, prompter),
    }
}
