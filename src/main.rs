//! Galaxy CLI：创建并维护 Galaxy 核心/功能应用

mod cli;
mod colors;
mod commands;
mod config;
mod env_file;
mod error;
mod external;
mod output;
mod package_json;
mod package_manager;
mod presets;
mod prompt;
mod scaffold;
mod utils;
mod validation;

use std::{env, process};

use clap::Parser;
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::{cli::Cli, error::GalaxyError, utils::env_opt_string};

fn main() {
    // 用法错误同样以 1 退出；--help / --version 以 0 退出
    let cli = match Cli::try_parse_from(cli::preprocess_args(env::args_os().collect())) {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            process::exit(if err.use_stderr() { 1 } else { 0 });
        }
    };
    init_tracing(cli.verbose, cli.quiet);

    if let Err(err) = commands::run(cli) {
        output::error(&format!("{:#}", err));
        if let Some(galaxy_err) = err.chain().find_map(|cause| cause.downcast_ref::<GalaxyError>()) {
            debug!(kind = %galaxy_err.kind(), "command failed");
            if matches!(galaxy_err, GalaxyError::NotAProject(_)) {
                output::hint("Run \"galaxy init\" first to initialize your project");
            }
        }
        for cause in err.chain() {
            debug!(cause = %cause, "error chain");
        }
        process::exit(1);
    }
}

/// 日志级别：GALAXY_LOG 优先，其次 -q / -v 计数
fn init_tracing(verbose: u8, quiet: bool) {
    let filter = match env_opt_string("GALAXY_LOG") {
        Some(directives) => EnvFilter::new(directives),
        None if quiet => EnvFilter::new("error"),
        None => match verbose {
            0 => EnvFilter::new("warn"),
            1 => EnvFilter::new("info"),
            2 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        },
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}
